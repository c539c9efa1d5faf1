/// A parsed delivery target.
///
/// Targets come from configuration as `platform:recipient` or a bare
/// recipient id. A missing platform means "try every adapter". Targets are
/// re-parsed on every send and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryTarget {
    pub platform: Option<String>,
    pub recipient: String,
}

impl DeliveryTarget {
    /// Split on the first `:`; everything after it is the recipient as-is.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((platform, recipient)) if !platform.is_empty() => Self {
                platform: Some(platform.to_string()),
                recipient: recipient.to_string(),
            },
            _ => Self {
                platform: None,
                recipient: raw.to_string(),
            },
        }
    }

    /// Recipient as a numeric id, required by the raw-action strategy.
    pub fn numeric_recipient(&self) -> Option<i64> {
        self.recipient.parse().ok()
    }

    /// Whether `adapter_name` should be attempted for this target.
    pub fn matches(&self, adapter_name: &str) -> bool {
        match &self.platform {
            Some(platform) => platform == adapter_name,
            None => true,
        }
    }
}
