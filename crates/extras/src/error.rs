//! Error types for report extras

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtrasError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Unexpected input: expected {expected}, found {found}")]
    UnexpectedInput {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("No persistence gateway configured")]
    NoGateway,

    #[error(
        "Step lists differ in length: {comments} comments, {multimedia} multimedia, \
         {sources} sources, {attachments} attachments"
    )]
    StepLengthMismatch {
        comments: usize,
        multimedia: usize,
        sources: usize,
        attachments: usize,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type ExtrasResult<T> = Result<T, ExtrasError>;
