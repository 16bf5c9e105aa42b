// Sequential yellow-orange-red color ramp for rank cells.

use crate::config::ColorConfig;

/// Nine-class YlOrRd scheme, light to dark.
const YL_OR_RD: [(u8, u8, u8); 9] = [
    (0xff, 0xff, 0xcc),
    (0xff, 0xed, 0xa0),
    (0xfe, 0xd9, 0x76),
    (0xfe, 0xb2, 0x4c),
    (0xfd, 0x8d, 0x3c),
    (0xfc, 0x4e, 0x2a),
    (0xe3, 0x1a, 0x1c),
    (0xbd, 0x00, 0x26),
    (0x80, 0x00, 0x26),
];

/// Maps a value in `domain` onto the YlOrRd ramp. The first domain value
/// gives the lightest color and the second the darkest; values outside the
/// domain are clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorRamp {
    domain: (f64, f64),
}

impl ColorRamp {
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            domain: (start, end),
        }
    }

    pub fn from_config(config: &ColorConfig) -> Self {
        Self::new(config.domain[0], config.domain[1])
    }

    /// Position of `value` along the ramp, in `[0, 1]`.
    fn position(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        if d1 == d0 || !value.is_finite() {
            return 0.0;
        }
        ((value - d0) / (d1 - d0)).clamp(0.0, 1.0)
    }

    /// CSS hex color for `value`.
    pub fn color(&self, value: f64) -> String {
        let t = self.position(value) * (YL_OR_RD.len() - 1) as f64;
        let i = (t.floor() as usize).min(YL_OR_RD.len() - 2);
        let frac = t - i as f64;
        let (a, b) = (YL_OR_RD[i], YL_OR_RD[i + 1]);
        let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
        format!("#{:02x}{:02x}{:02x}", mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
    }
}

impl Default for ColorRamp {
    fn default() -> Self {
        Self::from_config(&ColorConfig::default())
    }
}
