//! VRAM address arithmetic and palette mirroring

use crate::ppu::memory::palette_index;
use super::*;

#[test]
fn test_palette_index_mirrors_backdrop_entries() {
    assert_eq!(palette_index(0x3F10), 0x00);
    assert_eq!(palette_index(0x3F14), 0x04);
    assert_eq!(palette_index(0x3F1C), 0x0C);
    assert_eq!(palette_index(0x3F11), 0x11);
    assert_eq!(palette_index(0x3F25), 0x05, "mirrored every 32 bytes");
}

#[test]
fn test_palette_write_through_mirror() {
    let mut mapper = chr_ram_mapper();
    let mut ppu = Ppu::new();
    fill(&mut ppu, mapper.as_mut(), 0x3F10, &[0x0C]);
    assert_eq!(ppu.palette_ram()[0], 0x0C);

    fill(&mut ppu, mapper.as_mut(), 0x3F00, &[0x30]);
    set_address(&mut ppu, mapper.as_mut(), 0x3F10);
    assert_eq!(ppu.read_register(PPUDATA, mapper.as_mut()), 0x30);
}

#[test]
fn test_nametable_mirroring_through_mapper() {
    // Vertical: $2000 and $2800 share memory
    let mut mapper = chr_ram_mapper();
    let mut ppu = Ppu::new();
    fill(&mut ppu, mapper.as_mut(), 0x2005, &[0xAB]);

    set_address(&mut ppu, mapper.as_mut(), 0x2805);
    ppu.read_register(PPUDATA, mapper.as_mut());
    assert_eq!(ppu.read_register(PPUDATA, mapper.as_mut()), 0xAB);
}

#[test]
fn test_increment_x_wraps_into_next_nametable() {
    let mut ppu = Ppu::new();
    ppu.v = 0x001E;
    ppu.increment_x();
    assert_eq!(ppu.v, 0x001F);
    ppu.increment_x();
    assert_eq!(ppu.v, 0x0400);
    ppu.v = 0x041F;
    ppu.increment_x();
    assert_eq!(ppu.v, 0x0000);
}

#[test]
fn test_increment_y() {
    let mut ppu = Ppu::new();
    ppu.v = 0x0000;
    ppu.increment_y();
    assert_eq!(ppu.v, 0x1000, "fine Y first");

    // Fine Y 7, coarse Y 5 -> coarse Y 6
    ppu.v = 0x70A0;
    ppu.increment_y();
    assert_eq!(ppu.v, 0x00C0);

    // Coarse Y 29 wraps and flips the vertical nametable
    ppu.v = 0x73A0;
    ppu.increment_y();
    assert_eq!(ppu.v, 0x0800);

    // Coarse Y 31 wraps without flipping
    ppu.v = 0x73E0;
    ppu.increment_y();
    assert_eq!(ppu.v, 0x0000);
}

#[test]
fn test_copy_horizontal_and_vertical() {
    let mut ppu = Ppu::new();
    ppu.t = 0x7FFF;
    ppu.v = 0x0000;
    ppu.copy_horizontal();
    assert_eq!(ppu.v, 0x041F);

    ppu.v = 0x0000;
    ppu.copy_vertical();
    assert_eq!(ppu.v, 0x7BE0);
}

#[test]
fn test_ppudata_access_while_rendering_bumps_scroll() {
    let mut mapper = chr_ram_mapper();
    let mut ppu = Ppu::new();
    ppu.write_register(PPUMASK, 0x08, mapper.as_mut());
    ppu.scanline = 100;
    ppu.v = 0x0000;
    ppu.read_register(PPUDATA, mapper.as_mut());
    assert_eq!(ppu.v, 0x1001, "fine Y and coarse X both advance");

    ppu.scanline = 250;
    ppu.v = 0x0000;
    ppu.read_register(PPUDATA, mapper.as_mut());
    assert_eq!(ppu.v, 0x0001, "plain increment during vblank");
}
