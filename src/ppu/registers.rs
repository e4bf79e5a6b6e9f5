// PPU register handling ($2000-$2007, mirrored through $3FFF)
//
// | Reg | Name      | Access |
// |-----|-----------|--------|
// | 0   | PPUCTRL   | W      |
// | 1   | PPUMASK   | W      |
// | 2   | PPUSTATUS | R      |
// | 3   | OAMADDR   | W      |
// | 4   | OAMDATA   | R/W    |
// | 5   | PPUSCROLL | W x2   |
// | 6   | PPUADDR   | W x2   |
// | 7   | PPUDATA   | R/W    |

use super::constants::{CTRL_NAMETABLE, CTRL_NMI};
use super::Ppu;
use crate::cartridge::Mapper;

impl Ppu {
    fn status_bits(&self) -> u8 {
        ((self.vblank as u8) << 7)
            | ((self.sprite_zero_hit as u8) << 6)
            | ((self.sprite_overflow as u8) << 5)
    }

    /// Read from a PPU register
    ///
    /// `register` is the CPU address masked to 0-7. Write-only registers
    /// read back as 0.
    ///
    /// - PPUSTATUS: clears VBlank and the write toggle
    /// - PPUDATA: returns the read buffer, except palette addresses which
    ///   return directly; the buffer is refilled from the VRAM address
    pub fn read_register(&mut self, register: u16, mapper: &mut dyn Mapper) -> u8 {
        match register & 0x07 {
            2 => {
                self.write_latch = false;
                let status = self.status_bits();
                self.vblank = false;
                status
            }
            4 => self.oam[self.oam_addr as usize],
            7 => {
                let addr = self.v & 0x3FFF;
                self.advance_vram_address();
                let value = if addr >= 0x3F00 {
                    self.read_palette(addr)
                } else {
                    self.read_buffer
                };
                // Palette reads still fill the buffer with the nametable byte underneath
                self.read_buffer = self.read_internal(mapper, addr);
                value
            }
            _ => 0,
        }
    }

    /// Side-effect-free register read for debuggers and tracing
    pub fn peek_register(&self, register: u16) -> u8 {
        match register & 0x07 {
            2 => self.status_bits(),
            4 => self.oam[self.oam_addr as usize],
            7 => {
                let addr = self.v & 0x3FFF;
                if addr >= 0x3F00 {
                    self.read_palette(addr)
                } else {
                    self.read_buffer
                }
            }
            _ => 0,
        }
    }

    /// Write to a PPU register
    pub fn write_register(&mut self, register: u16, value: u8, mapper: &mut dyn Mapper) {
        match register & 0x07 {
            0 => {
                let nmi_was_enabled = self.nmi_enabled();
                self.t = (self.t & 0x73FF) | (((value & CTRL_NAMETABLE) as u16) << 10);
                self.ctrl = value;
                // Enabling NMI during vblank fires one immediately
                if !nmi_was_enabled && value & CTRL_NMI != 0 && self.vblank {
                    self.nmi_pending = true;
                }
            }
            1 => self.mask = value,
            3 => self.oam_addr = value,
            4 => {
                self.oam[self.oam_addr as usize] = value;
                self.oam_addr = self.oam_addr.wrapping_add(1);
            }
            5 => {
                if !self.write_latch {
                    self.t = (self.t & 0x7FE0) | (value >> 3) as u16;
                    self.fine_x = value & 0x07;
                } else {
                    self.t = (self.t & 0x0C1F)
                        | (((value & 0x07) as u16) << 12)
                        | (((value & 0xF8) as u16) << 2);
                }
                self.write_latch = !self.write_latch;
            }
            6 => {
                if !self.write_latch {
                    self.t = (self.t & 0x00FF) | (((value & 0x3F) as u16) << 8);
                } else {
                    self.t = (self.t & 0x7F00) | value as u16;
                    self.v = self.t;
                }
                self.write_latch = !self.write_latch;
            }
            7 => {
                let addr = self.v & 0x3FFF;
                self.advance_vram_address();
                if addr >= 0x3F00 {
                    self.write_palette(addr, value);
                } else {
                    self.write_internal(mapper, addr, value);
                }
            }
            // PPUSTATUS is read-only
            _ => {}
        }
    }
}
