use std::fmt;

use serde::{Deserialize, Serialize};

const MOBILE_MARKERS: &[&str] = &["Mobile", "Android", "iPhone", "iPad"];
// "iPad" never reaches this list: the mobile markers claim it first.
const TABLET_MARKERS: &[&str] = &["Tablet", "iPad"];

const DEVICE_NAMES: &[(&str, &str)] = &[
    ("Windows NT", "Windows PC"),
    ("Macintosh", "Mac"),
    ("iPhone", "iPhone"),
    ("Android", "Android Device"),
    ("iPad", "iPad"),
    ("Linux", "Linux PC"),
];

pub const UNKNOWN_DEVICE: &str = "Unknown Device";

/// Coarse device category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    #[default]
    Desktop,
    Mobile,
    Tablet,
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceType::Desktop => write!(f, "desktop"),
            DeviceType::Mobile => write!(f, "mobile"),
            DeviceType::Tablet => write!(f, "tablet"),
        }
    }
}

fn contains_any(ua: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| ua.contains(marker))
}

/// Classify a user agent; matching is case-sensitive
pub fn get_device_type(ua: &str) -> DeviceType {
    if contains_any(ua, MOBILE_MARKERS) {
        DeviceType::Mobile
    } else if contains_any(ua, TABLET_MARKERS) {
        DeviceType::Tablet
    } else {
        DeviceType::Desktop
    }
}

/// Human-readable device label; the first matching pattern wins
pub fn get_device_name(ua: &str) -> &'static str {
    DEVICE_NAMES
        .iter()
        .find(|(marker, _)| ua.contains(marker))
        .map(|(_, name)| *name)
        .unwrap_or(UNKNOWN_DEVICE)
}
