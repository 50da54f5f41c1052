//! Conversions between the RGB565 pixels used throughout the public API and the pixel formats
//! carried on the wire.

/// Number of bits per pixel transferred over the command channel. The write and read paths are
/// configured independently because some panels only read back reliably at 24 bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WireDepth {
    /// 16 bits per pixel, sent as two bytes in RGB565 layout.
    Rgb565,
    /// 24 bits per pixel, sent as one byte per channel with the color in the high bits.
    Rgb888,
}

impl WireDepth {
    /// Parameter byte of the COLMOD (interface pixel format) command selecting this depth.
    pub fn colmod(self) -> u8 {
        match self {
            WireDepth::Rgb565 => 0x55,
            WireDepth::Rgb888 => 0x66,
        }
    }

    /// Bytes per pixel on the wire.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            WireDepth::Rgb565 => 2,
            WireDepth::Rgb888 => 3,
        }
    }
}

/// Expand an RGB565 value to one byte per channel by shifting each channel into the high bits.
/// The low bits are left zero.
pub fn rgb565_to_rgb888(color: u16) -> [u8; 3] {
    let r = ((color >> 11) & 0x1F) as u8;
    let g = ((color >> 5) & 0x3F) as u8;
    let b = (color & 0x1F) as u8;
    [r << 3, g << 2, b << 3]
}

/// Reduce a 3-byte pixel to RGB565 by keeping the high bits of each channel.
pub fn rgb888_to_rgb565(r: u8, g: u8, b: u8) -> u16 {
    (u16::from(r & 0xF8) << 8) | (u16::from(g & 0xFC) << 3) | u16::from(b >> 3)
}

/// Encode one pixel for the wire into `out`, returning the number of bytes used.
pub fn encode(depth: WireDepth, color: u16, out: &mut [u8; 3]) -> usize {
    match depth {
        WireDepth::Rgb565 => {
            out[..2].copy_from_slice(&color.to_be_bytes());
        }
        WireDepth::Rgb888 => {
            *out = rgb565_to_rgb888(color);
        }
    }
    depth.bytes_per_pixel()
}
