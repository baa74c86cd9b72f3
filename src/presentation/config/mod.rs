mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    DatabaseSettings, ExtractionSettings, LlmProviderSetting, LlmSettings, LoggingSettings,
    PersistenceProviderSetting, QueueProviderSetting, QueueSettings, RenderSettings, Role,
    ServerSettings, Settings, StorageProviderSetting, StorageSettings, WorkerSettings,
};
