/// An 8 bits per channel RGBA color.
///
/// The parser packs colors into a single `u32` with red in the least
/// significant byte, followed by green, blue and alpha.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Color::rgba(0, 0, 0, 255);
    pub const WHITE: Self = Color::rgba(255, 255, 255, 255);
    pub const TRANSPARENT: Self = Color::rgba(0, 0, 0, 0);

    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    /// Unpacks a color in the parser's byte order (byte 0 is red, byte 3 is alpha).
    #[inline]
    pub const fn from_packed(packed: u32) -> Self {
        Color {
            r: (packed & 0xFF) as u8,
            g: ((packed >> 8) & 0xFF) as u8,
            b: ((packed >> 16) & 0xFF) as u8,
            a: ((packed >> 24) & 0xFF) as u8,
        }
    }

    /// Inverse of `from_packed`.
    #[inline]
    pub const fn to_packed(self) -> u32 {
        (self.r as u32) | (self.g as u32) << 8 | (self.b as u32) << 16 | (self.a as u32) << 24
    }

    /// Normalized `[r, g, b, a]` components, handy for GPU uniforms.
    #[inline]
    pub fn to_f32_array(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }
}

#[test]
fn packed_round_trip() {
    let color = Color::rgba(0x33, 0x33, 0xF8, 0xFF);
    let packed = color.to_packed();
    assert_eq!(packed, 0xFFF8_3333);
    assert_eq!(Color::from_packed(packed), color);
}

#[test]
fn packed_byte_order() {
    let color = Color::from_packed(0x4433_2211);
    assert_eq!(color.r, 0x11);
    assert_eq!(color.g, 0x22);
    assert_eq!(color.b, 0x33);
    assert_eq!(color.a, 0x44);
}

#[test]
fn normalized_components() {
    assert_eq!(Color::WHITE.to_f32_array(), [1.0, 1.0, 1.0, 1.0]);
    assert_eq!(Color::TRANSPARENT.to_f32_array(), [0.0; 4]);
}
