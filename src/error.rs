pub type RenderResult<T> = Result<T, RenderError>;

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("decode error: {0}")]
    Decode(String),

    #[error("entry {0} not found in extlist")]
    EntryNotFound(u32),

    #[error("unsupported asset format (neither TEX nor BBIN)")]
    UnsupportedFormat,

    #[error("surface error: {0}")]
    Surface(String),

    #[error("encoder sink error: {0}")]
    Sink(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RenderError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn surface(msg: impl Into<String>) -> Self {
        Self::Surface(msg.into())
    }

    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
