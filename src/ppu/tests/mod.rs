//! PPU unit tests
//!
//! Organized by functionality: register behavior, VRAM address arithmetic,
//! frame timing and pixel output.

use super::*;
use crate::cartridge::mappers::create_mapper;
use crate::cartridge::{test_rom, Cartridge};

// ========================================
// Test Constants (register numbers)
// ========================================

pub(crate) const PPUCTRL: u16 = 0;
pub(crate) const PPUMASK: u16 = 1;
pub(crate) const PPUSTATUS: u16 = 2;
pub(crate) const OAMADDR: u16 = 3;
pub(crate) const OAMDATA: u16 = 4;
pub(crate) const PPUSCROLL: u16 = 5;
pub(crate) const PPUADDR: u16 = 6;
pub(crate) const PPUDATA: u16 = 7;

// ========================================
// Test Helper Functions
// ========================================

/// NROM board with CHR-RAM and vertical mirroring
pub(crate) fn chr_ram_mapper() -> Box<dyn Mapper> {
    let rom = test_rom::build(0, 1, 0, 0x01, &[]);
    create_mapper(Cartridge::from_bytes(&rom).unwrap()).unwrap()
}

pub(crate) fn set_address(ppu: &mut Ppu, mapper: &mut dyn Mapper, addr: u16) {
    ppu.write_register(PPUADDR, (addr >> 8) as u8, mapper);
    ppu.write_register(PPUADDR, addr as u8, mapper);
}

/// Write a run of bytes through PPUDATA starting at `addr`
pub(crate) fn fill(ppu: &mut Ppu, mapper: &mut dyn Mapper, addr: u16, data: &[u8]) {
    set_address(ppu, mapper, addr);
    for &byte in data {
        ppu.write_register(PPUDATA, byte, mapper);
    }
}

/// Step until the PPU sits at (scanline, dot)
pub(crate) fn run_to(ppu: &mut Ppu, mapper: &mut dyn Mapper, scanline: u16, dot: u16) {
    while ppu.scanline() != scanline || ppu.dot() != dot {
        ppu.step(mapper);
    }
}

/// Step until the next frame completes; returns the dots taken
pub(crate) fn run_frame(ppu: &mut Ppu, mapper: &mut dyn Mapper) -> u32 {
    let mut dots = 0;
    loop {
        ppu.step(mapper);
        dots += 1;
        if ppu.take_frame_complete() {
            return dots;
        }
    }
}

// ========================================
// Test Modules
// ========================================

mod memory;
mod registers;
mod timing;
