mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    BrokerSettings, DatabaseSettings, LlmSettings, LoggingSettings, Settings, StorageProviderSetting,
    StorageSettings, SubmissionSettings, TierModels, TranscriptionProviderSetting,
    TranscriptionSettings, WorkerSettings,
};
