use std::borrow::Cow;

/// Failures of the embedding provider. Messages stay free of provider response bodies.
#[sgate_derive::sgate_error]
pub enum EmbeddingError {
    #[error("Embedding client misconfigured{}: {message}", format_context(.context))]
    Config { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid embedding input{}: {message}", format_context(.context))]
    InvalidInput { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Embedding request failed{}: {source}", format_context(.context))]
    Request { source: reqwest::Error, context: Option<Cow<'static, str>> },

    #[error("Embedding request timed out after {after_secs}s{}", format_context(.context))]
    Timeout { after_secs: u64, context: Option<Cow<'static, str>> },

    #[error("Embedding provider responded with HTTP {status}{}", format_context(.context))]
    Status { status: u16, context: Option<Cow<'static, str>> },

    #[error("Embedding response could not be decoded{}: {message}", format_context(.context))]
    Decode { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Embedding provider returned no vector{}", format_context(.context))]
    EmptyResponse { context: Option<Cow<'static, str>> },
}

impl EmbeddingError {
    /// Whether the failure is on the provider side (as opposed to bad input/config).
    #[must_use]
    pub const fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Request { .. }
                | Self::Timeout { .. }
                | Self::Status { .. }
                | Self::Decode { .. }
                | Self::EmptyResponse { .. }
        )
    }
}
