use thiserror::Error;

pub type MarkupResult<T> = Result<T, MarkupError>;

#[derive(Error, Debug, Clone)]
pub enum MarkupError {
    #[error("Malformed element spec: {reason}")]
    MalformedSpec { reason: String },

    #[error("Variant '{variant}' has no items sequence")]
    MissingVariantItems { variant: String },

    #[error("YAML error: {0}")]
    YamlError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid component type '{component_type}': must be lowercase kebab-case")]
    InvalidComponentType { component_type: String },

    #[error("Invalid tag '{tag}': tags must start with a lowercase letter and contain only [a-z0-9-]")]
    InvalidTag { tag: String },

    #[error("Invalid attribute '{attribute}' on <{tag}>: {reason}")]
    InvalidAttribute {
        tag: String,
        attribute: String,
        reason: String,
    },

    #[error("Maximum nesting depth ({max_depth}) exceeded")]
    MaxNestingDepthExceeded { max_depth: usize },

    #[error("Duplicate variant title '{title}' in component '{component_type}'")]
    DuplicateVariant {
        component_type: String,
        title: String,
    },

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<serde_yaml::Error> for MarkupError {
    fn from(err: serde_yaml::Error) -> Self {
        MarkupError::YamlError(err.to_string())
    }
}

impl From<std::io::Error> for MarkupError {
    fn from(err: std::io::Error) -> Self {
        MarkupError::Io(err.to_string())
    }
}
