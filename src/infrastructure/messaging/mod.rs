mod amqp_acknowledger;
mod amqp_connection;
mod amqp_job_consumer;
mod amqp_job_publisher;

pub use amqp_acknowledger::AmqpAcknowledger;
pub use amqp_connection::{QueueTopology, connect_with_retry};
pub use amqp_job_consumer::{AmqpJobConsumer, ConsumeError};
pub use amqp_job_publisher::AmqpJobPublisher;
