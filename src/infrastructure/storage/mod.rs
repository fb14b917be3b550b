mod object_audio_store;
mod store_factory;

pub use object_audio_store::{ObjectAudioStore, S3Location};
pub use store_factory::AudioStoreFactory;
