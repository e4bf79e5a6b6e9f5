// NES master palette and framebuffer conversion
//
// Framebuffer pixels are 9-bit values: bits 0-5 index the 64-entry master
// palette, bits 6-8 are the red/green/blue emphasis bits from PPUMASK.
// Indices $xE-$xF are unused and render black.

use crate::ppu::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// NES master palette in RGB format (64 colors), each entry 0xRRGGBB
pub const NES_PALETTE: [u32; 64] = [
    // $00-$0F
    0x656565, 0x002D69, 0x131F7F, 0x3C137C, 0x600B62, 0x730A37, 0x710F07, 0x5A1A00,
    0x342800, 0x0B3400, 0x003C00, 0x003D10, 0x003840, 0x000000, 0x000000, 0x000000,
    // $10-$1F
    0xAEAEAE, 0x0F63B3, 0x4051D0, 0x7841CC, 0xA736A9, 0xC03470, 0xBD3C30, 0x9F4A00,
    0x6D5C00, 0x366D00, 0x077704, 0x00793D, 0x00727D, 0x000000, 0x000000, 0x000000,
    // $20-$2F
    0xFEFEFF, 0x5DB3FF, 0x8FA1FF, 0xC890FF, 0xF785FA, 0xFF83C0, 0xFF8B7F, 0xEF9A49,
    0xBDAC2C, 0x85BC2F, 0x55C753, 0x3CC98C, 0x3EC2CD, 0x4E4E4E, 0x000000, 0x000000,
    // $30-$3F
    0xFEFEFF, 0xBCDFFF, 0xD1D8FF, 0xE8D1FF, 0xFBCDFD, 0xFFCCE5, 0xFFCFCA, 0xF8D5B4,
    0xE4DCA8, 0xCCE3A9, 0xB9E8B8, 0xAEE8D0, 0xAFE5EA, 0xB6B6B6, 0x000000, 0x000000,
];

/// Bytes needed for one RGBA frame
pub const RGBA_FRAME_SIZE: usize = SCREEN_WIDTH * SCREEN_HEIGHT * 4;

const EMPHASIS_RED: u16 = 0x040;
const EMPHASIS_GREEN: u16 = 0x080;
const EMPHASIS_BLUE: u16 = 0x100;

/// Convert a NES palette index to RGB color (0xRRGGBB)
#[inline]
pub fn palette_to_rgb(index: u8) -> u32 {
    NES_PALETTE[(index & 0x3F) as usize]
}

/// Convert a packed framebuffer pixel to RGBA
///
/// Each emphasis bit scales its own channel by 1.1 and the other two by 0.9.
pub fn pixel_to_rgba(pixel: u16) -> [u8; 4] {
    let rgb = palette_to_rgb((pixel & 0x3F) as u8);
    let mut channels = [
        ((rgb >> 16) & 0xFF) as f32,
        ((rgb >> 8) & 0xFF) as f32,
        (rgb & 0xFF) as f32,
    ];
    for (channel, bit) in [EMPHASIS_RED, EMPHASIS_GREEN, EMPHASIS_BLUE].into_iter().enumerate() {
        if pixel & bit == 0 {
            continue;
        }
        for (i, value) in channels.iter_mut().enumerate() {
            *value *= if i == channel { 1.1 } else { 0.9 };
        }
    }
    let [r, g, b] = channels.map(|c| c.min(255.0) as u8);
    [r, g, b, 0xFF]
}

/// Convert a whole framebuffer into RGBA bytes
///
/// Stops at whichever of `framebuffer` or `output` runs out first.
pub fn render_rgba(framebuffer: &[u16], output: &mut [u8]) {
    for (&pixel, out) in framebuffer.iter().zip(output.chunks_exact_mut(4)) {
        out.copy_from_slice(&pixel_to_rgba(pixel));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_to_rgb() {
        assert_eq!(palette_to_rgb(0x00), 0x656565);
        assert_eq!(palette_to_rgb(0x30), 0xFEFEFF);
        assert_eq!(palette_to_rgb(0x0F), 0x000000);
        // Only the low 6 bits select a color
        assert_eq!(palette_to_rgb(0x41), palette_to_rgb(0x01));
    }

    #[test]
    fn test_pixel_without_emphasis() {
        assert_eq!(pixel_to_rgba(0x16), [0xBD, 0x3C, 0x30, 0xFF]);
    }

    #[test]
    fn test_red_emphasis() {
        // $00 is (101, 101, 101)
        let [r, g, b, a] = pixel_to_rgba(EMPHASIS_RED);
        assert_eq!((r, g, b, a), (111, 90, 90, 0xFF));
    }

    #[test]
    fn test_emphasis_clamps() {
        // $20 is (254, 254, 255); blue emphasis would push blue past 255
        let [_, _, b, _] = pixel_to_rgba(EMPHASIS_BLUE | 0x20);
        assert_eq!(b, 255);
    }

    #[test]
    fn test_render_rgba() {
        let framebuffer = vec![0x0Fu16; SCREEN_WIDTH * SCREEN_HEIGHT];
        let mut output = vec![0xAAu8; RGBA_FRAME_SIZE];
        render_rgba(&framebuffer, &mut output);
        assert!(output.chunks_exact(4).all(|px| px == [0, 0, 0, 0xFF]));
    }
}
