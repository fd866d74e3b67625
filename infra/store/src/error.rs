use std::borrow::Cow;

/// Failures of the data store. Messages stay free of response bodies.
#[sgate_derive::sgate_error]
pub enum StoreError {
    #[error("Store client misconfigured{}: {message}", format_context(.context))]
    Config { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Store request failed{}: {source}", format_context(.context))]
    Request { source: reqwest::Error, context: Option<Cow<'static, str>> },

    #[error("Store request timed out after {after_secs}s{}", format_context(.context))]
    Timeout { after_secs: u64, context: Option<Cow<'static, str>> },

    #[error("Store responded with HTTP {status}{}", format_context(.context))]
    Status { status: u16, context: Option<Cow<'static, str>> },

    #[error("Store response could not be decoded{}: {message}", format_context(.context))]
    Decode { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl StoreError {
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
