use serde::{Deserialize, Serialize};

/// Per-field overrides for the captured host environment.
///
/// Any field left unset falls back to what the host reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentProfile {
    /// User-agent string reported to the classifier and fingerprint
    pub user_agent: Option<String>,

    /// BCP 47 language tag (e.g. "en-US")
    pub language: Option<String>,

    /// Platform string (e.g. "Win32", "MacIntel")
    pub platform: Option<String>,

    /// Screen width in pixels
    pub screen_width: Option<u32>,

    /// Screen height in pixels
    pub screen_height: Option<u32>,

    /// Minutes to add to local time to reach UTC (UTC+2 is -120)
    pub timezone_offset_minutes: Option<i32>,

    /// Whether cookies are reported as enabled
    pub cookie_enabled: Option<bool>,

    /// Whether the device is reported as online
    pub online: Option<bool>,

    /// Disable the offscreen drawing surface entirely
    #[serde(default)]
    pub disable_canvas: bool,
}

impl EnvironmentProfile {
    /// Check if the profile overrides anything at all
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
