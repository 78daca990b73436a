pub mod ai_config;
pub mod cv;

pub use ai_config::{AiConfig, ProviderKind};
pub use cv::{CvDocument, ExperienceEntry, SchemaError};
