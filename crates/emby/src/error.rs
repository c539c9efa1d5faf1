#[derive(Debug, thiserror::Error)]
pub enum EmbyError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Emby API error ({status_code}): {message}")]
    Api { status_code: u16, message: String },

    #[error("Emby is not configured")]
    NotConfigured,
}
