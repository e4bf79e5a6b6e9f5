// PPU pixel pipeline
//
// Every eighth dot the next tile's nametable byte, attribute bits and both
// pattern planes are fetched. The pattern planes shift into the low byte of
// two 16-bit registers, so the high byte always holds the tile being drawn
// and fine X selects a bit that may reach into the next tile.

use super::constants::{MASK_BG_LEFT, MASK_SPRITE_LEFT, SCREEN_WIDTH};
use super::Ppu;
use crate::cartridge::Mapper;

/// Winning sprite pixel for the current dot
#[derive(Debug, Clone, Copy)]
struct SpritePixel {
    /// Palette entry within the sprite half (1-15)
    color: u8,
    behind_background: bool,
    /// Slot in secondary OAM; slot 0 may hold sprite 0
    slot: usize,
}

#[inline]
fn plane_bits(lo: u16, hi: u16, shift: u16) -> u8 {
    (((lo >> shift) & 1) | (((hi >> shift) & 1) << 1)) as u8
}

impl Ppu {
    /// Fetch the next background tile at v into the pipeline
    pub(super) fn read_tile_buffers(&mut self, mapper: &mut dyn Mapper) {
        let tile = self.read_internal(mapper, 0x2000 | (self.v & 0x0FFF)) as u16;

        self.attr_left = self.attr_right;
        let attr_addr = 0x23C0
            | (self.v & 0x0C00)
            | ((self.v >> 4) & 0x38)
            | ((self.v >> 2) & 0x07);
        let mut attr = self.read_internal(mapper, attr_addr);
        if self.v & 0x0040 != 0 {
            attr >>= 4;
        }
        if self.v & 0x0002 != 0 {
            attr >>= 2;
        }
        self.attr_right = attr & 0x03;

        let fine_y = (self.v >> 12) & 0x07;
        let row = self.background_pattern_base() + tile * 16 + fine_y;
        let lo = self.read_internal(mapper, row) as u16;
        let hi = self.read_internal(mapper, row + 8) as u16;
        self.pattern_lo = ((self.pattern_lo & 0x00FF) << 8) | lo;
        self.pattern_hi = ((self.pattern_hi & 0x00FF) << 8) | hi;
    }

    /// First opaque sprite pixel at the current dot, in slot order
    fn sprite_pixel(&self) -> Option<SpritePixel> {
        if !self.sprites_enabled() || (self.dot < 8 && self.mask & MASK_SPRITE_LEFT == 0) {
            return None;
        }
        for slot in 0..self.sprite_count as usize {
            let attributes = self.secondary_oam[slot * 4 + 2];
            let column = self.dot as i32 - self.secondary_oam[slot * 4 + 3] as i32;
            if !(0..8).contains(&column) {
                continue;
            }
            let column = if attributes & 0x40 != 0 { 7 - column } else { column };
            let shift = (7 - column) as u16;
            let color = plane_bits(
                self.sprite_tiles[slot] as u16,
                self.sprite_tiles[slot + 8] as u16,
                shift,
            );
            if color != 0 {
                return Some(SpritePixel {
                    color: color | ((attributes & 0x03) << 2),
                    behind_background: attributes & 0x20 != 0,
                    slot,
                });
            }
        }
        None
    }

    /// Background palette entry (0-15) at the current dot; 0 is transparent
    fn background_pixel(&self) -> u8 {
        if !self.background_enabled() || (self.dot < 8 && self.mask & MASK_BG_LEFT == 0) {
            return 0;
        }
        let offset = self.dot & 0x07;
        let shift = 15 - offset - self.fine_x as u16;
        let color = plane_bits(self.pattern_lo, self.pattern_hi, shift);
        if color == 0 {
            return 0;
        }
        let attr = if offset + self.fine_x as u16 > 7 {
            self.attr_right
        } else {
            self.attr_left
        };
        color | (attr << 2)
    }

    /// Produce the pixel for (scanline, dot) on a visible line
    ///
    /// With rendering off the backdrop is shown, or the palette entry v points
    /// at when v is inside palette space.
    pub(super) fn generate_dot(&mut self) {
        let color = if !self.rendering_enabled() {
            let addr = self.v & 0x3FFF;
            if addr >= 0x3F00 {
                self.read_palette(addr)
            } else {
                self.read_palette(0)
            }
        } else {
            let sprite = self.sprite_pixel();
            let background = self.background_pixel();
            match sprite {
                Some(sprite) if background == 0 => self.read_palette(0x10 + sprite.color as u16),
                None if background == 0 => self.read_palette(0),
                Some(sprite) => {
                    if sprite.slot == 0 && self.sprite_zero_in && self.dot != 255 {
                        self.sprite_zero_hit = true;
                    }
                    if sprite.behind_background {
                        self.read_palette(background as u16)
                    } else {
                        self.read_palette(0x10 + sprite.color as u16)
                    }
                }
                None => self.read_palette(background as u16),
            }
        };

        let index = self.scanline as usize * SCREEN_WIDTH + self.dot as usize;
        self.frame_buffer[index] = (self.emphasis() << 6) | (color & 0x3F) as u16;
    }
}
