//! Best-effort browser fingerprint.
//!
//! The fingerprint is advisory correlation data. It uses a 32-bit rolling
//! hash with expected collisions and must not be treated as proof of
//! identity.

use super::canvas::{DrawingSurface, SoftwareCanvas};
use super::environment::Environment;

/// Text drawn onto the offscreen surface
pub const CANVAS_TEXT: &str = "Device fingerprint";
const CANVAS_FONT_PX: u32 = 14;

/// Generate the fingerprint for an environment snapshot
pub fn generate_browser_fingerprint(env: &Environment) -> String {
    let canvas_data = match env.render.clone() {
        Some(profile) => {
            let mut canvas = SoftwareCanvas::new(profile);
            canvas_signature(&mut canvas)
        }
        None => String::new(),
    };

    let source = fingerprint_source(env, &canvas_data);
    to_base36(rolling_hash(&source).unsigned_abs() as u64)
}

/// Draw the fixed text and export the surface
pub fn canvas_signature(surface: &mut dyn DrawingSurface) -> String {
    surface.fill_text(CANVAS_TEXT, 2, 2, CANVAS_FONT_PX);
    surface.to_data_url()
}

/// Pipe-delimited string the hash runs over
pub fn fingerprint_source(env: &Environment, canvas_data: &str) -> String {
    [
        env.user_agent.clone(),
        env.language.clone(),
        env.screen_resolution(),
        env.timezone_offset_minutes.to_string(),
        env.platform.clone(),
        env.cookie_enabled.to_string(),
        canvas_data.to_string(),
    ]
    .join("|")
}

/// `h = h * 31 + c` over UTF-16 code units, wrapped to a signed 32-bit value
pub fn rolling_hash(input: &str) -> i32 {
    input.encode_utf16().fold(0i32, |hash, unit| {
        (hash << 5).wrapping_sub(hash).wrapping_add(unit as i32)
    })
}

/// Lowercase base-36 rendering of `value`
pub fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".to_string();
    }

    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::canvas::RenderProfile;

    fn sample_env() -> Environment {
        Environment {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64)".to_string(),
            language: "en-US".to_string(),
            screen_width: 1920,
            screen_height: 1080,
            timezone_offset_minutes: -60,
            timezone: "UTC+01:00".to_string(),
            platform: "Win32".to_string(),
            cookie_enabled: true,
            online: true,
            render: Some(RenderProfile::default()),
        }
    }

    #[test]
    fn rolling_hash_known_values() {
        assert_eq!(rolling_hash(""), 0);
        assert_eq!(rolling_hash("a"), 97);
        assert_eq!(rolling_hash("ab"), 3105);
    }

    #[test]
    fn rolling_hash_wraps_to_32_bits() {
        let long = "z".repeat(64);
        let expected = long
            .bytes()
            .fold(0i64, |h, c| ((h * 31 + c as i64) as i32) as i64);
        assert_eq!(rolling_hash(&long) as i64, expected);
    }

    #[test]
    fn rolling_hash_uses_utf16_units() {
        // U+1F600 is a surrogate pair: 0xD83D 0xDE00
        let expected = (0xD83Di32 << 5)
            .wrapping_sub(0xD83D)
            .wrapping_add(0xDE00);
        assert_eq!(rolling_hash("\u{1F600}"), expected);
    }

    #[test]
    fn base36_rendering() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(97), "2p");
        assert_eq!(to_base36(3105), "2e9");
        assert_eq!(to_base36(i32::MIN.unsigned_abs() as u64), "zik0zk");
    }

    #[test]
    fn source_is_pipe_delimited_in_order() {
        let source = fingerprint_source(&sample_env(), "data:x");
        assert_eq!(
            source,
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64)|en-US|1920x1080|-60|Win32|true|data:x"
        );
    }

    #[test]
    fn fingerprint_is_deterministic_for_fixed_environment() {
        let env = sample_env();
        assert_eq!(
            generate_browser_fingerprint(&env),
            generate_browser_fingerprint(&env)
        );
    }

    #[test]
    fn fingerprint_tracks_environment_changes() {
        let env = sample_env();
        let mut changed = sample_env();
        changed.language = "de-DE".to_string();

        assert_ne!(
            generate_browser_fingerprint(&env),
            generate_browser_fingerprint(&changed)
        );
    }

    #[test]
    fn missing_surface_hashes_empty_canvas_component() {
        let mut env = sample_env();
        env.render = None;

        let expected = to_base36(rolling_hash(&fingerprint_source(&env, "")).unsigned_abs() as u64);
        assert_eq!(generate_browser_fingerprint(&env), expected);
    }

    #[test]
    fn fingerprint_is_base36() {
        let fp = generate_browser_fingerprint(&sample_env());
        assert!(!fp.is_empty());
        assert!(fp.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }
}
