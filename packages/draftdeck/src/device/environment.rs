//! Read-only snapshot of the environment a device identity is derived from.
//!
//! In a browser these values come from `navigator`, `screen` and the clock.
//! Here they are captured once from the host and may be overridden per field
//! through [`EnvironmentProfile`].

use chrono::Local;

use super::canvas::RenderProfile;
use crate::config::EnvironmentProfile;

const DEFAULT_LANGUAGE: &str = "en-US";
const DEFAULT_SCREEN_WIDTH: u32 = 1920;
const DEFAULT_SCREEN_HEIGHT: u32 = 1080;

/// Host operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingSystem {
    Windows,
    MacOs,
    Linux,
    Other,
}

impl OperatingSystem {
    /// Detect the OS this binary runs on
    pub fn current() -> Self {
        match std::env::consts::OS {
            "windows" => Self::Windows,
            "macos" => Self::MacOs,
            "linux" => Self::Linux,
            _ => Self::Other,
        }
    }

    /// Get the platform string as `navigator.platform` would report it
    pub fn platform(&self) -> &'static str {
        match self {
            Self::Windows => "Win32",
            Self::MacOs => "MacIntel",
            Self::Linux => "Linux x86_64",
            Self::Other => "",
        }
    }

    /// Get a browser-style User-Agent string naming this OS
    pub fn user_agent(&self, version: &str) -> String {
        let system = match self {
            Self::Windows => "Windows NT 10.0; Win64; x64",
            Self::MacOs => "Macintosh; Intel Mac OS X 10_15_7",
            Self::Linux => "X11; Linux x86_64",
            Self::Other => std::env::consts::OS,
        };
        format!("Mozilla/5.0 ({}) draftdeck/{}", system, version)
    }

    /// Font family the platform's default sans-serif resolves to
    pub fn default_font_family(&self) -> &'static str {
        match self {
            Self::Windows => "Arial",
            Self::MacOs => "Helvetica",
            Self::Linux => "DejaVu Sans",
            Self::Other => "sans-serif",
        }
    }
}

/// Captured environment attributes
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    pub user_agent: String,
    pub language: String,
    pub screen_width: u32,
    pub screen_height: u32,
    /// Minutes to add to local time to reach UTC (UTC+2 is -120)
    pub timezone_offset_minutes: i32,
    /// Human-readable zone label, e.g. "UTC+02:00"
    pub timezone: String,
    pub platform: String,
    pub cookie_enabled: bool,
    pub online: bool,
    /// Rendering characteristics of the offscreen surface; `None` when unavailable
    pub render: Option<RenderProfile>,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            user_agent: String::new(),
            language: DEFAULT_LANGUAGE.to_string(),
            screen_width: DEFAULT_SCREEN_WIDTH,
            screen_height: DEFAULT_SCREEN_HEIGHT,
            timezone_offset_minutes: 0,
            timezone: timezone_label(0),
            platform: String::new(),
            cookie_enabled: true,
            online: true,
            render: None,
        }
    }
}

impl Environment {
    /// Capture the host environment, then apply any profile overrides
    pub fn capture(profile: &EnvironmentProfile) -> Self {
        let os = OperatingSystem::current();
        let local_minus_utc = Local::now().offset().local_minus_utc();
        let host = Self {
            user_agent: os.user_agent(env!("CARGO_PKG_VERSION")),
            language: host_language().unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            timezone_offset_minutes: -(local_minus_utc / 60),
            platform: os.platform().to_string(),
            render: Some(RenderProfile::for_os(os)),
            ..Default::default()
        };

        host.with_overrides(profile)
    }

    /// Apply the fields set in `profile` on top of this snapshot
    pub fn with_overrides(mut self, profile: &EnvironmentProfile) -> Self {
        if let Some(ref ua) = profile.user_agent {
            self.user_agent = ua.clone();
        }
        if let Some(ref language) = profile.language {
            self.language = language.clone();
        }
        if let Some(ref platform) = profile.platform {
            self.platform = platform.clone();
        }
        if let Some(width) = profile.screen_width {
            self.screen_width = width;
        }
        if let Some(height) = profile.screen_height {
            self.screen_height = height;
        }
        if let Some(cookie_enabled) = profile.cookie_enabled {
            self.cookie_enabled = cookie_enabled;
        }
        if let Some(online) = profile.online {
            self.online = online;
        }
        if profile.disable_canvas {
            self.render = None;
        }
        self.timezone_offset_minutes = profile
            .timezone_offset_minutes
            .unwrap_or(self.timezone_offset_minutes);
        self.timezone = timezone_label(self.timezone_offset_minutes);

        self
    }

    /// Screen resolution formatted as "WxH"
    pub fn screen_resolution(&self) -> String {
        format!("{}x{}", self.screen_width, self.screen_height)
    }
}

/// Label for a browser-convention offset: -120 becomes "UTC+02:00"
pub fn timezone_label(offset_minutes: i32) -> String {
    let east = -offset_minutes;
    let sign = if east < 0 { '-' } else { '+' };
    let abs = east.unsigned_abs();
    format!("UTC{}{:02}:{:02}", sign, abs / 60, abs % 60)
}

fn host_language() -> Option<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find_map(|value| locale_to_language_tag(&value))
}

/// Convert a POSIX locale ("en_US.UTF-8") into a language tag ("en-US")
pub fn locale_to_language_tag(locale: &str) -> Option<String> {
    let base = locale.split(['.', '@']).next()?.trim();
    if base.is_empty() || base == "C" || base == "POSIX" {
        return None;
    }
    Some(base.replace('_', "-"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_conversion() {
        assert_eq!(
            locale_to_language_tag("en_US.UTF-8").as_deref(),
            Some("en-US")
        );
        assert_eq!(locale_to_language_tag("de_DE@euro").as_deref(), Some("de-DE"));
        assert_eq!(locale_to_language_tag("fr").as_deref(), Some("fr"));
        assert_eq!(locale_to_language_tag("C.UTF-8"), None);
        assert_eq!(locale_to_language_tag("POSIX"), None);
        assert_eq!(locale_to_language_tag(""), None);
    }

    #[test]
    fn timezone_labels_follow_browser_offset_sign() {
        assert_eq!(timezone_label(0), "UTC+00:00");
        assert_eq!(timezone_label(-120), "UTC+02:00");
        assert_eq!(timezone_label(300), "UTC-05:00");
        assert_eq!(timezone_label(-330), "UTC+05:30");
    }

    #[test]
    fn overrides_replace_only_set_fields() {
        let base = Environment {
            user_agent: "host".to_string(),
            platform: "Linux x86_64".to_string(),
            render: Some(RenderProfile::default()),
            ..Default::default()
        };
        let profile = EnvironmentProfile {
            user_agent: Some("Mozilla/5.0 (iPhone)".to_string()),
            screen_width: Some(390),
            timezone_offset_minutes: Some(-60),
            disable_canvas: true,
            ..Default::default()
        };

        let env = base.with_overrides(&profile);
        assert_eq!(env.user_agent, "Mozilla/5.0 (iPhone)");
        assert_eq!(env.platform, "Linux x86_64");
        assert_eq!(env.screen_resolution(), "390x1080");
        assert_eq!(env.timezone, "UTC+01:00");
        assert!(env.render.is_none());
    }

    #[test]
    fn captured_user_agent_names_the_os() {
        let env = Environment::capture(&EnvironmentProfile::default());
        assert!(env.user_agent.starts_with("Mozilla/5.0 ("));
        assert!(env.user_agent.contains("draftdeck/"));
        assert!(env.render.is_some());
    }

    #[test]
    fn platform_strings() {
        assert_eq!(OperatingSystem::Windows.platform(), "Win32");
        assert_eq!(OperatingSystem::MacOs.platform(), "MacIntel");
        assert!(OperatingSystem::Windows
            .user_agent("1.0")
            .contains("Windows NT 10.0"));
    }
}
