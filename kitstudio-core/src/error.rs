use kitstudio_markup::MarkupError;
use thiserror::Error;

pub type StudioResult<T> = Result<T, StudioError>;

#[derive(Error, Debug, Clone)]
pub enum StudioError {
    #[error("No renderer registered for '{component_type}' and no generic fallback")]
    RendererNotFound { component_type: String },

    #[error("No component data registered for source '{source_id}'")]
    MountSourceMissing { source_id: String },

    #[error("Page parse error: {0}")]
    PageParse(String),

    #[error("No element with id '{id}'")]
    TargetNotFound { id: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Mount task failed: {0}")]
    TaskFailed(String),

    #[error(transparent)]
    Markup(#[from] MarkupError),
}

impl From<roxmltree::Error> for StudioError {
    fn from(err: roxmltree::Error) -> Self {
        StudioError::PageParse(err.to_string())
    }
}

impl From<std::io::Error> for StudioError {
    fn from(err: std::io::Error) -> Self {
        StudioError::Io(err.to_string())
    }
}

impl From<serde_yaml::Error> for StudioError {
    fn from(err: serde_yaml::Error) -> Self {
        StudioError::Config(err.to_string())
    }
}
