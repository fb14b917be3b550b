//! Publishes a job for an audio object that is already in storage.

use anyhow::Context;
use clap::Parser;
use uuid::Uuid;

use whispai::application::ports::JobPublisher;
use whispai::domain::{AudioId, JobDescriptor, ObjectName, TranscriptionMode};
use whispai::infrastructure::messaging::{AmqpJobPublisher, QueueTopology};
use whispai::infrastructure::observability::{TracingConfig, init_tracing};
use whispai::presentation::config::Settings;

#[derive(Debug, Parser)]
#[command(name = "enqueue")]
#[command(about = "Publishes a transcription job for a stored audio object", long_about = None)]
struct Cli {
    /// Object name in the audio bucket, e.g. `3f0c...e1.wav`
    #[arg(long)]
    object_name: String,

    /// Job id; taken from the object name stem when omitted
    #[arg(long)]
    audio_id: Option<Uuid>,

    /// fast, balanced, accurate or auto
    #[arg(long, default_value = "auto")]
    mode: String,

    #[arg(long, default_value = "text")]
    output_format: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (environment, settings) = Settings::load().context("failed to load settings")?;
    init_tracing(
        &TracingConfig::from_settings(environment.as_str(), &settings.logging),
        &settings.broker.queue,
    );

    let audio_id = match cli.audio_id {
        Some(id) => AudioId::from_uuid(id),
        None => cli
            .object_name
            .split('.')
            .next()
            .unwrap_or_default()
            .parse::<AudioId>()
            .with_context(|| {
                format!(
                    "cannot derive an audio id from '{}', pass --audio-id",
                    cli.object_name
                )
            })?,
    };

    let descriptor = JobDescriptor::new(
        audio_id,
        ObjectName::from_raw(cli.object_name),
        TranscriptionMode::from(cli.mode),
        cli.output_format,
    );

    let topology = QueueTopology::new(&settings.broker.queue)
        .with_dead_letter_exchange(settings.broker.dead_letter_exchange.clone());
    let publisher = AmqpJobPublisher::new(
        settings.broker.amqp_uri(),
        topology,
        settings.broker.connect_retries,
    );

    publisher.publish(&descriptor).await?;
    println!("{}", audio_id);
    Ok(())
}
