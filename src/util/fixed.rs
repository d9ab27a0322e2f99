//! Fixed-point scalars and packed colors.
//!
//! Material factors (metallic, roughness, emissive, texture scale/strength)
//! are stored as 16-bit fixed point with a scale of 400, i.e.
//! `stored = round(value * 400)`. Base-color factors pack into a single
//! little-endian RGBA8 word.

/// Fixed-point scale factor for material scalars.
pub const FIXED_SCALE: f32 = 400.0;

/// Convert a real value to its 16-bit fixed-point representation.
#[inline]
pub fn to_fixed16(v: f32) -> i16 {
    (v * FIXED_SCALE).round() as i16
}

/// Convert a 16-bit fixed-point value back to a real.
#[inline]
pub fn from_fixed16(v: i16) -> f32 {
    v as f32 / FIXED_SCALE
}

/// Pack four [0,1] channels into a little-endian RGBA8 word.
/// Channels are clamped before quantization.
#[inline]
pub fn pack_rgba8(c: [f32; 4]) -> u32 {
    let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0) as u32;
    q(c[0]) | (q(c[1]) << 8) | (q(c[2]) << 16) | (q(c[3]) << 24)
}

/// Unpack a little-endian RGBA8 word into four [0,1] channels.
#[inline]
pub fn unpack_rgba8(c: u32) -> [f32; 4] {
    [
        (c & 0xff) as f32 / 255.0,
        ((c >> 8) & 0xff) as f32 / 255.0,
        ((c >> 16) & 0xff) as f32 / 255.0,
        ((c >> 24) & 0xff) as f32 / 255.0,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed16_roundtrip() {
        // |stored/400 - v| < 1/400 over the material factor domain
        let mut v = 0.0f32;
        while v <= 2.0 {
            let s = to_fixed16(v);
            assert!(
                (from_fixed16(s) - v).abs() < 1.0 / FIXED_SCALE,
                "v={v} s={s}"
            );
            v += 0.013;
        }
    }

    #[test]
    fn test_fixed16_known_values() {
        assert_eq!(to_fixed16(1.0), 400);
        assert_eq!(to_fixed16(0.5), 200);
        assert_eq!(to_fixed16(0.0), 0);
        assert_eq!(to_fixed16(-1.0), -400);
    }

    #[test]
    fn test_pack_rgba8_roundtrip() {
        let c = [1.0, 0.5, 0.25, 0.0];
        let packed = pack_rgba8(c);
        let back = unpack_rgba8(packed);
        for (a, b) in c.iter().zip(back.iter()) {
            assert!((a - b).abs() <= 1.0 / 255.0, "{a} vs {b}");
        }
    }

    #[test]
    fn test_pack_rgba8_layout() {
        // red in the low byte, alpha in the high byte
        assert_eq!(pack_rgba8([1.0, 0.0, 0.0, 0.0]), 0x0000_00ff);
        assert_eq!(pack_rgba8([0.0, 0.0, 0.0, 1.0]), 0xff00_0000);
        // out-of-range channels clamp
        assert_eq!(pack_rgba8([2.0, -1.0, 0.0, 0.0]), 0x0000_00ff);
    }
}
