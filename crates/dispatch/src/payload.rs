use std::io::Write;
use std::path::Path;

/// What to deliver: plain text, or an image with a mime hint.
#[derive(Debug, Clone)]
pub enum DeliveryPayload {
    Text(String),
    Image { bytes: Vec<u8>, mime: String },
}

impl DeliveryPayload {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn image(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self::Image {
            bytes,
            mime: mime.into(),
        }
    }
}

/// Result of one dispatch attempt, for logging and tests.
///
/// Per-adapter failures never surface as errors; a dispatch either found a
/// working adapter/strategy pair or it did not.
#[derive(Debug, Clone)]
pub struct DeliveryOutcome {
    pub succeeded: bool,
    /// Names of every adapter that was attempted, in order.
    pub attempted: Vec<String>,
    /// Name of the adapter that delivered, when one did.
    pub via: Option<String>,
}

impl DeliveryOutcome {
    pub(crate) fn success(attempted: Vec<String>, via: String) -> Self {
        Self {
            succeeded: true,
            attempted,
            via: Some(via),
        }
    }

    pub(crate) fn failure(attempted: Vec<String>) -> Self {
        Self {
            succeeded: false,
            attempted,
            via: None,
        }
    }
}

/// A rendered image written to a temporary file for the duration of one
/// dispatch. The file is removed on drop, on every exit path.
pub struct ScopedImageFile {
    file: tempfile::NamedTempFile,
}

impl ScopedImageFile {
    pub fn write(bytes: &[u8]) -> std::io::Result<Self> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
