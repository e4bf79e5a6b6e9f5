// PPU memory access and VRAM address arithmetic
//
// # PPU Address Space
//
// ```text
// $0000-$1FFF: Pattern tables (cartridge CHR)
// $2000-$3EFF: Nametables (cartridge-owned VRAM, mirrored by the mapper)
// $3F00-$3F1F: Palette RAM (internal to the PPU, mirrored up to $3FFF)
// ```
//
// # v / t layout
//
// ```text
// yyy NN YYYYY XXXXX
// ||| || ||||| +++++-- coarse X scroll
// ||| || +++++-------- coarse Y scroll
// ||| ++-------------- nametable select
// +++----------------- fine Y scroll
// ```

use super::constants::{MASK_GREYSCALE, POSTRENDER_SCANLINE, PRERENDER_SCANLINE};
use super::Ppu;
use crate::cartridge::Mapper;

/// Map a palette address onto the 32-byte palette RAM
///
/// $3F10/$3F14/$3F18/$3F1C mirror $3F00/$3F04/$3F08/$3F0C.
#[inline]
pub(super) fn palette_index(addr: u16) -> usize {
    let index = (addr & 0x1F) as usize;
    if index >= 0x10 && index & 0x03 == 0 {
        index - 0x10
    } else {
        index
    }
}

impl Ppu {
    // ========================================
    // Bus Access
    // ========================================

    /// Read from PPU address space through the cartridge
    ///
    /// The address is shown to the mapper first so boards that watch A12
    /// see every fetch.
    #[inline]
    pub(super) fn read_internal(&self, mapper: &mut dyn Mapper, addr: u16) -> u8 {
        let addr = addr & 0x3FFF;
        mapper.ppu_address(addr);
        mapper.ppu_read(addr)
    }

    #[inline]
    pub(super) fn write_internal(&self, mapper: &mut dyn Mapper, addr: u16, value: u8) {
        mapper.ppu_write(addr & 0x3FFF, value);
    }

    // ========================================
    // Palette RAM
    // ========================================

    /// Read a palette entry, applying greyscale
    pub(super) fn read_palette(&self, addr: u16) -> u8 {
        let value = self.palette[palette_index(addr)];
        if self.mask & MASK_GREYSCALE != 0 {
            value & 0x30
        } else {
            value
        }
    }

    pub(super) fn write_palette(&mut self, addr: u16, value: u8) {
        self.palette[palette_index(addr)] = value;
    }

    // ========================================
    // Scroll Increments
    // ========================================

    /// Coarse X increment, wrapping into the horizontally adjacent nametable
    pub(super) fn increment_x(&mut self) {
        if self.v & 0x001F == 0x001F {
            self.v &= 0x7FE0;
            self.v ^= 0x0400;
        } else {
            self.v += 1;
        }
    }

    /// Fine Y increment, carrying into coarse Y
    ///
    /// Coarse Y 29 wraps to 0 and flips the vertical nametable. Coarse Y 31
    /// (only reachable by writing it) wraps to 0 without the flip.
    pub(super) fn increment_y(&mut self) {
        if self.v & 0x7000 != 0x7000 {
            self.v += 0x1000;
            return;
        }
        self.v &= 0x0FFF;
        let mut coarse_y = (self.v & 0x03E0) >> 5;
        match coarse_y {
            29 => {
                coarse_y = 0;
                self.v ^= 0x0800;
            }
            31 => coarse_y = 0,
            _ => coarse_y += 1,
        }
        self.v = (self.v & 0x7C1F) | (coarse_y << 5);
    }

    /// Copy coarse X and the horizontal nametable bit from t to v
    #[inline]
    pub(super) fn copy_horizontal(&mut self) {
        self.v = (self.v & 0x7BE0) | (self.t & 0x041F);
    }

    /// Copy fine Y, coarse Y and the vertical nametable bit from t to v
    #[inline]
    pub(super) fn copy_vertical(&mut self) {
        self.v = (self.v & 0x041F) | (self.t & 0x7BE0);
    }

    /// PPUDATA address step
    ///
    /// Outside rendering v advances by 1 or 32. While the PPU is rendering
    /// (visible and pre-render lines) the access instead triggers both scroll
    /// increments.
    pub(super) fn advance_vram_address(&mut self) {
        let rendering_line =
            self.scanline < POSTRENDER_SCANLINE || self.scanline == PRERENDER_SCANLINE;
        if self.rendering_enabled() && rendering_line {
            self.increment_y();
            self.increment_x();
        } else {
            self.v = self.v.wrapping_add(self.vram_increment()) & 0x7FFF;
        }
    }
}
