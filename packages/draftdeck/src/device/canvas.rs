//! Offscreen 2-D drawing surface used as a rendering-engine signal.
//!
//! A browser canvas leaks font metrics and anti-aliasing through its pixel
//! export. [`SoftwareCanvas`] reproduces that shape: text is rasterized with
//! glyph metrics and edge coverage that depend on the [`RenderProfile`], so
//! the exported data differs between platforms but is stable on one host.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use super::environment::OperatingSystem;

/// Default surface size of an unsized HTML canvas
pub const DEFAULT_WIDTH: u32 = 300;
pub const DEFAULT_HEIGHT: u32 = 150;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0100_0000_01b3;

/// Something text can be drawn onto and exported from
pub trait DrawingSurface {
    /// Fill `text` with its top edge at `(x, y)` using a `font_px` font
    fn fill_text(&mut self, text: &str, x: i32, y: i32, font_px: u32);

    /// Serialize the surface as a data URL
    fn to_data_url(&self) -> String;
}

/// Rendering characteristics of a platform's text stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderProfile {
    pub font_family: String,
    pub antialias: bool,
    /// Horizontal subpixel phase applied to every glyph, 0..=3
    pub subpixel_phase: u8,
}

impl Default for RenderProfile {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            antialias: true,
            subpixel_phase: 0,
        }
    }
}

impl RenderProfile {
    pub fn for_os(os: OperatingSystem) -> Self {
        Self {
            font_family: os.default_font_family().to_string(),
            antialias: true,
            subpixel_phase: match os {
                OperatingSystem::Windows => 1,
                OperatingSystem::MacOs => 2,
                OperatingSystem::Linux | OperatingSystem::Other => 0,
            },
        }
    }

    fn family_seed(&self) -> u64 {
        fnv1a(self.font_family.as_bytes())
    }
}

fn fnv1a(data: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for &byte in data {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// RGBA software raster
#[derive(Debug, Clone)]
pub struct SoftwareCanvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    profile: RenderProfile,
}

impl SoftwareCanvas {
    pub fn new(profile: RenderProfile) -> Self {
        Self::with_size(profile, DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }

    pub fn with_size(profile: RenderProfile, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width as usize) * (height as usize) * 4],
            profile,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Alpha of the pixel at `(x, y)`, or `None` outside the surface
    pub fn alpha_at(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) as usize) * 4 + 3;
        Some(self.pixels[idx])
    }

    /// Advance width of `ch` at `font_px`
    fn glyph_advance(&self, ch: char, font_px: u32) -> u32 {
        let base = font_px * 6 / 10;
        let scaled = match ch {
            ' ' => base / 2,
            'i' | 'l' | 'j' | 't' | 'f' | 'r' | '.' | ',' | '\'' | '!' | '|' => base / 2,
            'm' | 'w' | 'M' | 'W' => base * 3 / 2,
            _ => base,
        };
        // Families differ slightly in their metrics
        scaled + (self.profile.family_seed() % 2) as u32
    }

    fn blend(&mut self, x: i32, y: i32, coverage: u8) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return;
        }
        let idx = ((y as u32 * self.width + x as u32) as usize) * 4;
        // Black fill: colour channels stay 0, alpha accumulates
        let alpha = &mut self.pixels[idx + 3];
        *alpha = alpha.saturating_add(coverage);
    }

    fn draw_glyph(&mut self, ch: char, origin_x: i32, origin_y: i32, font_px: u32) -> u32 {
        let advance = self.glyph_advance(ch, font_px);
        if ch.is_whitespace() || advance == 0 {
            return advance;
        }

        let seed = (ch as u64)
            .wrapping_mul(0x9e37_79b9_7f4a_7c15)
            ^ self.profile.family_seed();
        let ink_width = advance.saturating_sub(1).max(1);
        let phase = self.profile.subpixel_phase as i32 % 4;

        for row in 0..font_px {
            let row_bits = seed.rotate_left(row * 7 % 64);
            for col in 0..ink_width {
                if (row_bits >> (col % 64)) & 1 == 0 {
                    continue;
                }
                let edge = col == 0 || col + 1 == ink_width || row == 0 || row + 1 == font_px;
                let coverage = if self.profile.antialias && edge { 128 } else { 255 };
                self.blend(origin_x + col as i32, origin_y + row as i32, coverage);
                if self.profile.antialias && phase > 0 {
                    // Subpixel bleed into the next column
                    self.blend(origin_x + col as i32 + 1, origin_y + row as i32, (16 * phase) as u8);
                }
            }
        }

        advance
    }
}

impl DrawingSurface for SoftwareCanvas {
    fn fill_text(&mut self, text: &str, x: i32, y: i32, font_px: u32) {
        let mut pen_x = x;
        for ch in text.chars() {
            let advance = self.draw_glyph(ch, pen_x, y, font_px);
            pen_x = pen_x.saturating_add(advance as i32);
        }
    }

    fn to_data_url(&self) -> String {
        format!("data:image/x-rgba;base64,{}", BASE64.encode(&self.pixels))
    }
}
