// Sprite evaluation
//
// OAM entry layout: Y, tile, attributes (vhp---pp), X. Evaluation for the
// next line happens in one pass at dot 270 and fetches both pattern planes
// of every selected sprite, so mapper A12 watchers see the sprite fetches
// at that point in the line.

use super::constants::{MAX_SPRITES_PER_LINE, OAM_SIZE};
use super::Ppu;
use crate::cartridge::Mapper;

impl Ppu {
    /// Select up to eight sprites that cover the current scanline
    ///
    /// Sets the overflow flag on a ninth match and notes whether sprite 0
    /// was selected.
    pub(super) fn evaluate_sprites(&mut self, mapper: &mut dyn Mapper) {
        let height = self.sprite_height() as i32;

        for entry in (0..OAM_SIZE).step_by(4) {
            let mut row = self.scanline as i32 - self.oam[entry] as i32;
            if !(0..height).contains(&row) {
                continue;
            }
            let slot = self.sprite_count as usize;
            if slot == MAX_SPRITES_PER_LINE {
                self.sprite_overflow = true;
                break;
            }
            if entry == 0 {
                self.sprite_zero_in = true;
            }
            self.secondary_oam[slot * 4..slot * 4 + 4].copy_from_slice(&self.oam[entry..entry + 4]);

            if self.oam[entry + 2] & 0x80 != 0 {
                row = height - 1 - row;
            }
            let mut base = self.sprite_pattern_base();
            let mut tile = self.oam[entry + 1] as u16;
            let mut row = row as u16;
            if height == 16 {
                base = (tile & 0x01) * 0x1000;
                tile = (tile & 0xFE) + ((row & 0x08) >> 3);
                row &= 0x07;
            }
            let addr = base + tile * 16 + row;
            self.sprite_tiles[slot] = self.read_internal(mapper, addr);
            self.sprite_tiles[slot + MAX_SPRITES_PER_LINE] = self.read_internal(mapper, addr + 8);
            self.sprite_count += 1;
        }

        if (self.sprite_count as usize) < MAX_SPRITES_PER_LINE {
            self.dummy_sprite_fetch(mapper);
        }
    }

    /// Fetch from tile $FF of the sprite table for an empty sprite slot
    pub(super) fn dummy_sprite_fetch(&mut self, mapper: &mut dyn Mapper) {
        let base = if self.sprite_height() == 16 {
            0x1000
        } else {
            self.sprite_pattern_base()
        };
        self.read_internal(mapper, base + 0x0FFF);
    }
}
