use thiserror::Error;

/// Errors that can occur when translating to or from a provider.
#[derive(Error, Debug)]
pub enum Error {
    /// A canonical part cannot be expressed for the target provider.
    #[error("{}: {message}", location(.content, .part))]
    InvalidInput {
        content: usize,
        part: Option<usize>,
        message: String,
    },

    /// The request produced no provider messages at all.
    #[error("no messages to send")]
    NoMessages,

    /// A part variant reached a mapper that has no representation for it.
    #[error("content[{content}] part[{part}]: unsupported part")]
    Unsupported { content: usize, part: usize },

    /// An inbound provider payload was missing or had nothing to convert.
    #[error("Invalid payload: {0}")]
    Payload(String),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// A failure reported by the provider mid-stream, or a transport error.
    #[error("Streaming error: {0}")]
    Stream(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

fn location(content: &usize, part: &Option<usize>) -> String {
    match part {
        Some(part) => format!("content[{content}] part[{part}]"),
        None => format!("content[{content}]"),
    }
}

impl Error {
    pub fn invalid_part(content: usize, part: usize, message: impl Into<String>) -> Self {
        Error::InvalidInput {
            content,
            part: Some(part),
            message: message.into(),
        }
    }

    pub fn invalid_content(content: usize, message: impl Into<String>) -> Self {
        Error::InvalidInput {
            content,
            part: None,
            message: message.into(),
        }
    }

    pub fn unsupported(content: usize, part: usize) -> Self {
        Error::Unsupported { content, part }
    }

    pub fn payload(message: impl Into<String>) -> Self {
        Error::Payload(message.into())
    }

    pub fn stream(message: impl Into<String>) -> Self {
        Error::Stream(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }
}
