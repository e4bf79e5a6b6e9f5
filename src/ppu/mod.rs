// PPU module - Picture Processing Unit (2C02) implementation
//
// The PPU is advanced one dot at a time. Background tiles are fetched every
// eighth dot into two 16-bit pattern registers; sprites for the next line are
// evaluated in one go at dot 270. All pattern and nametable traffic goes
// through the cartridge mapper, which owns nametable VRAM.
//
// # Frame Layout (NTSC)
//
// ```text
// Lines 0-239:   visible, one pixel per dot for dots 0-255
// Line 240:      post-render, reaching dot 0 completes the frame
// Lines 241-260: vblank (flag and NMI at line 241, dot 1)
// Line 261:      pre-render, flags cleared, vertical scroll reloaded
// ```

pub mod constants;
mod memory;
mod registers;
mod rendering;
mod sprites;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

use crate::cartridge::Mapper;
use constants::*;

pub use constants::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Serializable PPU snapshot
///
/// The framebuffer is not included; it is regenerated by the next frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PpuState {
    pub ctrl: u8,
    pub mask: u8,
    pub v: u16,
    pub t: u16,
    pub fine_x: u8,
    pub write_latch: bool,
    pub scanline: u16,
    pub dot: u16,
    pub even_frame: bool,
    pub frame_count: u64,
    pub oam_addr: u8,
    pub read_buffer: u8,
    pub vblank: bool,
    pub sprite_zero_hit: bool,
    pub sprite_overflow: bool,
    pub palette: Vec<u8>,
    pub oam: Vec<u8>,
    pub secondary_oam: Vec<u8>,
    pub sprite_tiles: Vec<u8>,
    pub sprite_count: u8,
    pub sprite_zero_in: bool,
    pub attr_left: u8,
    pub attr_right: u8,
    pub pattern_lo: u16,
    pub pattern_hi: u16,
    pub nmi_pending: bool,
}

/// PPU structure representing the Picture Processing Unit state
pub struct Ppu {
    // ========================================
    // Registers
    // ========================================
    /// $2000 PPUCTRL as last written
    ctrl: u8,
    /// $2001 PPUMASK as last written
    mask: u8,

    // ========================================
    // Internal Scroll Registers
    // ========================================
    /// Current VRAM address (15 bits)
    v: u16,
    /// Temporary VRAM address (15 bits)
    t: u16,
    /// Fine X scroll (3 bits)
    fine_x: u8,
    /// First/second write toggle shared by $2005 and $2006
    write_latch: bool,

    // ========================================
    // Timing
    // ========================================
    scanline: u16,
    dot: u16,
    /// Odd frames skip the last dot of the pre-render line while rendering
    even_frame: bool,
    frame_count: u64,
    frame_complete: bool,

    // ========================================
    // Status and Buffers
    // ========================================
    oam_addr: u8,
    /// PPUDATA read-ahead buffer
    read_buffer: u8,
    vblank: bool,
    sprite_zero_hit: bool,
    sprite_overflow: bool,
    nmi_pending: bool,

    // ========================================
    // Memory
    // ========================================
    palette: [u8; PALETTE_SIZE],
    oam: [u8; OAM_SIZE],
    secondary_oam: [u8; SECONDARY_OAM_SIZE],
    /// Pattern rows for the sprites on the next line: low planes in 0-7,
    /// high planes in 8-15
    sprite_tiles: [u8; MAX_SPRITES_PER_LINE * 2],
    sprite_count: u8,
    sprite_zero_in: bool,

    // ========================================
    // Background Pipeline
    // ========================================
    /// Palette selects for the current and next tile
    attr_left: u8,
    attr_right: u8,
    /// Pattern planes for the current tile (high byte) and next tile (low byte)
    pattern_lo: u16,
    pattern_hi: u16,

    /// 256×240 packed pixels: `emphasis << 6 | color`
    frame_buffer: Vec<u16>,
}

impl Ppu {
    /// Create a new PPU instance in the power-on state
    pub fn new() -> Self {
        Ppu {
            ctrl: 0,
            mask: 0,
            v: 0,
            t: 0,
            fine_x: 0,
            write_latch: false,
            scanline: 0,
            dot: 0,
            even_frame: true,
            frame_count: 0,
            frame_complete: false,
            oam_addr: 0,
            read_buffer: 0,
            vblank: false,
            sprite_zero_hit: false,
            sprite_overflow: false,
            nmi_pending: false,
            palette: [0; PALETTE_SIZE],
            oam: [0; OAM_SIZE],
            secondary_oam: [0; SECONDARY_OAM_SIZE],
            sprite_tiles: [0; MAX_SPRITES_PER_LINE * 2],
            sprite_count: 0,
            sprite_zero_in: false,
            attr_left: 0,
            attr_right: 0,
            pattern_lo: 0,
            pattern_hi: 0,
            frame_buffer: vec![0; SCREEN_WIDTH * SCREEN_HEIGHT],
        }
    }

    /// Return every register, memory and counter to zero
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    // ========================================
    // Decoded Control Bits
    // ========================================

    #[inline]
    fn rendering_enabled(&self) -> bool {
        self.mask & (MASK_BG | MASK_SPRITES) != 0
    }

    #[inline]
    fn background_enabled(&self) -> bool {
        self.mask & MASK_BG != 0
    }

    #[inline]
    fn sprites_enabled(&self) -> bool {
        self.mask & MASK_SPRITES != 0
    }

    #[inline]
    fn vram_increment(&self) -> u16 {
        if self.ctrl & CTRL_INCREMENT_32 != 0 {
            32
        } else {
            1
        }
    }

    #[inline]
    fn sprite_height(&self) -> u16 {
        if self.ctrl & CTRL_SPRITE_16 != 0 {
            16
        } else {
            8
        }
    }

    #[inline]
    fn sprite_pattern_base(&self) -> u16 {
        if self.ctrl & CTRL_SPRITE_TABLE != 0 {
            0x1000
        } else {
            0
        }
    }

    #[inline]
    fn background_pattern_base(&self) -> u16 {
        if self.ctrl & CTRL_BG_TABLE != 0 {
            0x1000
        } else {
            0
        }
    }

    #[inline]
    fn nmi_enabled(&self) -> bool {
        self.ctrl & CTRL_NMI != 0
    }

    /// Emphasis bits (red, green, blue) from PPUMASK bits 5-7
    #[inline]
    fn emphasis(&self) -> u16 {
        (self.mask >> 5) as u16
    }

    // ========================================
    // Timing
    // ========================================

    /// Advance the PPU by one dot
    ///
    /// Does the work scheduled for the current (scanline, dot) and then
    /// moves to the next position. Pattern and nametable fetches are issued
    /// through `mapper`.
    pub fn step(&mut self, mapper: &mut dyn Mapper) {
        if self.scanline < POSTRENDER_SCANLINE {
            self.visible_line_dot(mapper);
        } else if self.scanline == FIRST_VBLANK_SCANLINE {
            if self.dot == 1 {
                self.enter_vblank();
            }
        } else if self.scanline == PRERENDER_SCANLINE {
            self.prerender_line_dot(mapper);
        }

        self.advance();
    }

    fn visible_line_dot(&mut self, mapper: &mut dyn Mapper) {
        match self.dot {
            0..=255 => {
                self.generate_dot();
                if (self.dot + 1) & 0x07 == 0 && self.rendering_enabled() {
                    self.read_tile_buffers(mapper);
                    self.increment_x();
                }
            }
            DOT_INCREMENT_Y => {
                if self.rendering_enabled() {
                    self.increment_y();
                }
            }
            DOT_COPY_X => {
                if self.rendering_enabled() {
                    self.copy_horizontal();
                }
            }
            DOT_SPRITE_EVAL => {
                self.sprite_zero_in = false;
                self.sprite_count = 0;
                if self.rendering_enabled() {
                    self.evaluate_sprites(mapper);
                }
            }
            DOT_PREFETCH_1 | DOT_PREFETCH_2 => {
                if self.rendering_enabled() {
                    self.read_tile_buffers(mapper);
                    self.increment_x();
                }
            }
            _ => {}
        }
    }

    fn prerender_line_dot(&mut self, mapper: &mut dyn Mapper) {
        match self.dot {
            1 => {
                self.vblank = false;
                self.sprite_zero_hit = false;
                self.sprite_overflow = false;
            }
            DOT_COPY_X => {
                if self.rendering_enabled() {
                    self.copy_horizontal();
                }
            }
            DOT_SPRITE_EVAL => {
                // Drop sprites evaluated on line 239
                self.sprite_zero_in = false;
                self.sprite_count = 0;
                if self.rendering_enabled() {
                    self.dummy_sprite_fetch(mapper);
                }
            }
            DOT_COPY_Y => {
                if self.rendering_enabled() {
                    self.copy_vertical();
                }
            }
            DOT_PREFETCH_1 | DOT_PREFETCH_2 => {
                if self.rendering_enabled() {
                    self.read_tile_buffers(mapper);
                    self.increment_x();
                }
            }
            _ => {}
        }
    }

    fn enter_vblank(&mut self) {
        self.vblank = true;
        if self.nmi_enabled() {
            self.nmi_pending = true;
        }
        if self.rendering_enabled() {
            self.even_frame = !self.even_frame;
        } else {
            self.even_frame = true;
        }
    }

    fn advance(&mut self) {
        self.dot += 1;
        let short_line =
            self.dot == DOTS_PER_SCANLINE - 1 && self.scanline == PRERENDER_SCANLINE && !self.even_frame;
        if self.dot == DOTS_PER_SCANLINE || short_line {
            self.dot = 0;
            self.scanline += 1;
            if self.scanline == SCANLINES_PER_FRAME {
                self.scanline = 0;
            }
            if self.scanline == POSTRENDER_SCANLINE {
                self.frame_complete = true;
                self.frame_count += 1;
            }
        }
    }

    // ========================================
    // Outputs
    // ========================================

    /// Take the pending NMI request, if any
    pub fn take_nmi(&mut self) -> bool {
        std::mem::take(&mut self.nmi_pending)
    }

    /// Take the frame-complete signal raised at line 240, dot 0
    pub fn take_frame_complete(&mut self) -> bool {
        std::mem::take(&mut self.frame_complete)
    }

    /// Packed pixels, row-major, 256×240
    pub fn framebuffer(&self) -> &[u16] {
        &self.frame_buffer
    }

    pub fn scanline(&self) -> u16 {
        self.scanline
    }

    pub fn dot(&self) -> u16 {
        self.dot
    }

    /// Frames completed since reset
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn oam(&self) -> &[u8] {
        &self.oam
    }

    pub fn palette_ram(&self) -> &[u8] {
        &self.palette
    }

    /// Current VRAM address register
    pub fn vram_address(&self) -> u16 {
        self.v
    }

    // ========================================
    // Save States
    // ========================================

    pub fn save_state(&self) -> PpuState {
        PpuState {
            ctrl: self.ctrl,
            mask: self.mask,
            v: self.v,
            t: self.t,
            fine_x: self.fine_x,
            write_latch: self.write_latch,
            scanline: self.scanline,
            dot: self.dot,
            even_frame: self.even_frame,
            frame_count: self.frame_count,
            oam_addr: self.oam_addr,
            read_buffer: self.read_buffer,
            vblank: self.vblank,
            sprite_zero_hit: self.sprite_zero_hit,
            sprite_overflow: self.sprite_overflow,
            palette: self.palette.to_vec(),
            oam: self.oam.to_vec(),
            secondary_oam: self.secondary_oam.to_vec(),
            sprite_tiles: self.sprite_tiles.to_vec(),
            sprite_count: self.sprite_count,
            sprite_zero_in: self.sprite_zero_in,
            attr_left: self.attr_left,
            attr_right: self.attr_right,
            pattern_lo: self.pattern_lo,
            pattern_hi: self.pattern_hi,
            nmi_pending: self.nmi_pending,
        }
    }

    /// Check a snapshot without applying it
    pub fn validate_state(state: &PpuState) -> Result<(), String> {
        let buffers = [
            ("palette", state.palette.len(), PALETTE_SIZE),
            ("OAM", state.oam.len(), OAM_SIZE),
            ("secondary OAM", state.secondary_oam.len(), SECONDARY_OAM_SIZE),
            ("sprite tiles", state.sprite_tiles.len(), MAX_SPRITES_PER_LINE * 2),
        ];
        for (name, found, expected) in buffers {
            if found != expected {
                return Err(format!("{} is {} bytes, expected {}", name, found, expected));
            }
        }
        if state.scanline >= SCANLINES_PER_FRAME || state.dot >= DOTS_PER_SCANLINE {
            return Err(format!(
                "position ({}, {}) out of range",
                state.scanline, state.dot
            ));
        }
        if state.sprite_count as usize > MAX_SPRITES_PER_LINE || state.fine_x > 7 {
            return Err("sprite count or fine X out of range".to_string());
        }
        Ok(())
    }

    /// Apply a snapshot; nothing changes if it fails validation
    pub fn load_state(&mut self, state: &PpuState) -> Result<(), String> {
        Self::validate_state(state)?;
        self.ctrl = state.ctrl;
        self.mask = state.mask;
        self.v = state.v & 0x7FFF;
        self.t = state.t & 0x7FFF;
        self.fine_x = state.fine_x;
        self.write_latch = state.write_latch;
        self.scanline = state.scanline;
        self.dot = state.dot;
        self.even_frame = state.even_frame;
        self.frame_count = state.frame_count;
        self.frame_complete = false;
        self.oam_addr = state.oam_addr;
        self.read_buffer = state.read_buffer;
        self.vblank = state.vblank;
        self.sprite_zero_hit = state.sprite_zero_hit;
        self.sprite_overflow = state.sprite_overflow;
        self.palette.copy_from_slice(&state.palette);
        self.oam.copy_from_slice(&state.oam);
        self.secondary_oam.copy_from_slice(&state.secondary_oam);
        self.sprite_tiles.copy_from_slice(&state.sprite_tiles);
        self.sprite_count = state.sprite_count;
        self.sprite_zero_in = state.sprite_zero_in;
        self.attr_left = state.attr_left;
        self.attr_right = state.attr_right;
        self.pattern_lo = state.pattern_lo;
        self.pattern_hi = state.pattern_hi;
        self.nmi_pending = state.nmi_pending;
        Ok(())
    }
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}
