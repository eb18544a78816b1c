use bytemuck::{Pod, Zeroable};

/// Straight-alpha RGBA colour, one byte per channel.
///
/// Memory layout matches `Rgba8Unorm` texels so a slice of colours can be
/// uploaded to the GPU without conversion.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Pod, Zeroable)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);

    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Builds a colour from script-style integer channels.
    ///
    /// `g` and `b` default to `r` (a grey level), `a` defaults to opaque.
    /// Out-of-range values are clamped to `0..=255`.
    pub fn from_channels(r: i64, g: Option<i64>, b: Option<i64>, a: Option<i64>) -> Self {
        Self {
            r: channel(r),
            g: channel(g.unwrap_or(r)),
            b: channel(b.unwrap_or(r)),
            a: channel(a.unwrap_or(255)),
        }
    }

    /// Multiplies every channel by `tint` (texture colour modulation).
    #[inline]
    pub fn modulate(self, tint: Color) -> Color {
        Color {
            r: mul_u8(self.r, tint.r),
            g: mul_u8(self.g, tint.g),
            b: mul_u8(self.b, tint.b),
            a: mul_u8(self.a, tint.a),
        }
    }

    /// Source-over compositing of `self` onto `dst`.
    ///
    /// Matches the classic `src * a + dst * (1 - a)` blend for colour and
    /// `a + dst.a * (1 - a)` for alpha.
    pub fn over(self, dst: Color) -> Color {
        match self.a {
            0 => dst,
            255 => self,
            a => {
                let inv = 255 - a;
                Color {
                    r: mix(self.r, a, dst.r, inv),
                    g: mix(self.g, a, dst.g, inv),
                    b: mix(self.b, a, dst.b, inv),
                    a: a.saturating_add(mul_u8(dst.a, inv)),
                }
            }
        }
    }
}

#[inline]
fn channel(v: i64) -> u8 {
    v.clamp(0, 255) as u8
}

#[inline]
fn mul_u8(a: u8, b: u8) -> u8 {
    ((a as u32 * b as u32 + 127) / 255) as u8
}

#[inline]
fn mix(src: u8, a: u8, dst: u8, inv: u8) -> u8 {
    ((src as u32 * a as u32 + dst as u32 * inv as u32 + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_channel_is_grey_and_opaque() {
        assert_eq!(Color::from_channels(80, None, None, None), Color::rgba(80, 80, 80, 255));
    }

    #[test]
    fn explicit_channels_are_kept() {
        assert_eq!(
            Color::from_channels(1, Some(2), Some(3), Some(4)),
            Color::rgba(1, 2, 3, 4)
        );
    }

    #[test]
    fn out_of_range_channels_clamp() {
        assert_eq!(
            Color::from_channels(300, Some(-5), None, Some(1000)),
            Color::rgba(255, 0, 255, 255)
        );
    }

    #[test]
    fn modulate_by_white_is_identity() {
        let c = Color::rgba(10, 20, 30, 40);
        assert_eq!(c.modulate(Color::WHITE), c);
    }

    #[test]
    fn modulate_by_black_keeps_alpha() {
        let c = Color::rgba(10, 20, 30, 255);
        assert_eq!(c.modulate(Color::BLACK), Color::rgba(0, 0, 0, 255));
    }

    #[test]
    fn over_opaque_replaces() {
        assert_eq!(Color::WHITE.over(Color::BLACK), Color::WHITE);
    }

    #[test]
    fn over_transparent_keeps_destination() {
        let dst = Color::rgba(1, 2, 3, 4);
        assert_eq!(Color::TRANSPARENT.over(dst), dst);
    }

    #[test]
    fn over_half_alpha_mixes() {
        let out = Color::rgba(255, 0, 0, 128).over(Color::rgba(0, 0, 255, 255));
        assert_eq!(out.a, 255);
        assert!((127..=129).contains(&out.r));
        assert!((126..=128).contains(&out.b));
    }
}
