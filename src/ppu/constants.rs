// PPU constants

/// Screen width in pixels
pub const SCREEN_WIDTH: usize = 256;

/// Screen height in pixels
pub const SCREEN_HEIGHT: usize = 240;

/// Size of palette RAM in bytes
pub(super) const PALETTE_SIZE: usize = 32;

/// Primary OAM: 64 sprites × 4 bytes
pub(super) const OAM_SIZE: usize = 256;

/// Secondary OAM: 8 sprites × 4 bytes
pub(super) const SECONDARY_OAM_SIZE: usize = 32;

/// Sprites that fit on one scanline
pub(super) const MAX_SPRITES_PER_LINE: usize = 8;

// ========================================
// PPU Timing Constants (NTSC)
// ========================================

/// Number of PPU dots per scanline
pub const DOTS_PER_SCANLINE: u16 = 341;

/// Number of scanlines per frame (NTSC)
pub const SCANLINES_PER_FRAME: u16 = 262;

/// Total PPU dots in an even frame
/// 341 dots/scanline × 262 scanlines = 89,342 dots
pub const DOTS_PER_FRAME: u32 = (DOTS_PER_SCANLINE as u32) * (SCANLINES_PER_FRAME as u32);

/// Pre-render scanline number
/// This is scanline 261 (or -1 in some documentation)
pub(super) const PRERENDER_SCANLINE: u16 = 261;

/// Post-render scanline; reaching its first dot completes a frame
pub(super) const POSTRENDER_SCANLINE: u16 = 240;

/// First VBlank scanline
pub(super) const FIRST_VBLANK_SCANLINE: u16 = 241;

// ========================================
// Dots with special work on rendering lines
// ========================================

/// Vertical scroll increment
pub(super) const DOT_INCREMENT_Y: u16 = 256;

/// Horizontal scroll bits copied from t to v
pub(super) const DOT_COPY_X: u16 = 257;

/// Sprite evaluation and sprite pattern fetches for the next line
pub(super) const DOT_SPRITE_EVAL: u16 = 270;

/// Vertical scroll bits copied from t to v (pre-render line only)
pub(super) const DOT_COPY_Y: u16 = 280;

/// Prefetch of the first two tiles of the next line
pub(super) const DOT_PREFETCH_1: u16 = 321;
pub(super) const DOT_PREFETCH_2: u16 = 329;

// ========================================
// PPUCTRL / PPUMASK bits
// ========================================

pub(super) const CTRL_NAMETABLE: u8 = 0x03;
pub(super) const CTRL_INCREMENT_32: u8 = 0x04;
pub(super) const CTRL_SPRITE_TABLE: u8 = 0x08;
pub(super) const CTRL_BG_TABLE: u8 = 0x10;
pub(super) const CTRL_SPRITE_16: u8 = 0x20;
pub(super) const CTRL_NMI: u8 = 0x80;

pub(super) const MASK_GREYSCALE: u8 = 0x01;
pub(super) const MASK_BG_LEFT: u8 = 0x02;
pub(super) const MASK_SPRITE_LEFT: u8 = 0x04;
pub(super) const MASK_BG: u8 = 0x08;
pub(super) const MASK_SPRITES: u8 = 0x10;
