//! PPU Register Tests
//!
//! Status side effects, the shared write toggle, scroll/address latching,
//! buffered PPUDATA reads and OAM access.

use super::*;

#[test]
fn test_ppu_initialization() {
    let ppu = Ppu::new();
    assert_eq!(ppu.ctrl, 0x00);
    assert_eq!(ppu.mask, 0x00);
    assert_eq!(ppu.peek_register(PPUSTATUS), 0x00);
    assert_eq!((ppu.scanline(), ppu.dot()), (0, 0));
    assert!(ppu.even_frame);
    assert!(!ppu.write_latch);
}

#[test]
fn test_reset_clears_registers() {
    let mut mapper = chr_ram_mapper();
    let mut ppu = Ppu::new();
    ppu.write_register(PPUCTRL, 0x80, mapper.as_mut());
    ppu.write_register(PPUMASK, 0x1E, mapper.as_mut());
    ppu.write_register(OAMDATA, 0x42, mapper.as_mut());

    ppu.reset();

    assert_eq!(ppu.ctrl, 0x00);
    assert_eq!(ppu.mask, 0x00);
    assert_eq!(ppu.oam()[0], 0x00);
}

#[test]
fn test_status_read_clears_vblank_and_toggle() {
    let mut mapper = chr_ram_mapper();
    let mut ppu = Ppu::new();
    ppu.vblank = true;
    ppu.sprite_zero_hit = true;
    ppu.write_register(PPUSCROLL, 0x10, mapper.as_mut());
    assert!(ppu.write_latch);

    assert_eq!(ppu.read_register(PPUSTATUS, mapper.as_mut()), 0xC0);
    assert!(!ppu.write_latch);
    assert_eq!(ppu.read_register(PPUSTATUS, mapper.as_mut()), 0x40);
}

#[test]
fn test_peek_status_has_no_side_effects() {
    let mut ppu = Ppu::new();
    ppu.vblank = true;
    ppu.write_latch = true;
    assert_eq!(ppu.peek_register(PPUSTATUS), 0x80);
    assert!(ppu.vblank);
    assert!(ppu.write_latch);
}

#[test]
fn test_write_only_registers_read_zero() {
    let mut mapper = chr_ram_mapper();
    let mut ppu = Ppu::new();
    ppu.write_register(PPUCTRL, 0xFF, mapper.as_mut());
    for reg in [PPUCTRL, PPUMASK, OAMADDR, PPUSCROLL, PPUADDR] {
        assert_eq!(ppu.read_register(reg, mapper.as_mut()), 0, "register {}", reg);
    }
}

#[test]
fn test_ctrl_sets_nametable_bits_of_t() {
    let mut mapper = chr_ram_mapper();
    let mut ppu = Ppu::new();
    ppu.t = 0x7FFF;
    ppu.write_register(PPUCTRL, 0x00, mapper.as_mut());
    assert_eq!(ppu.t, 0x73FF);
    ppu.write_register(PPUCTRL, 0x03, mapper.as_mut());
    assert_eq!(ppu.t, 0x7FFF);
}

#[test]
fn test_scroll_writes() {
    let mut mapper = chr_ram_mapper();
    let mut ppu = Ppu::new();
    ppu.write_register(PPUCTRL, 0x00, mapper.as_mut());
    ppu.write_register(PPUSCROLL, 0x7D, mapper.as_mut());
    assert_eq!(ppu.t, 0x000F);
    assert_eq!(ppu.fine_x, 5);

    ppu.write_register(PPUSCROLL, 0x5E, mapper.as_mut());
    assert_eq!(ppu.t, 0x616F);
    assert!(!ppu.write_latch);
}

#[test]
fn test_address_writes_load_v_on_second_write() {
    let mut mapper = chr_ram_mapper();
    let mut ppu = Ppu::new();
    ppu.write_register(PPUADDR, 0xFD, mapper.as_mut());
    assert_eq!(ppu.t, 0x3D00, "bit 14 is cleared");
    assert_eq!(ppu.vram_address(), 0x0000);

    ppu.write_register(PPUADDR, 0xF0, mapper.as_mut());
    assert_eq!(ppu.vram_address(), 0x3DF0);
}

#[test]
fn test_ppudata_read_is_buffered() {
    let mut mapper = chr_ram_mapper();
    let mut ppu = Ppu::new();
    fill(&mut ppu, mapper.as_mut(), 0x2400, &[0x55, 0x66]);

    set_address(&mut ppu, mapper.as_mut(), 0x2400);
    assert_eq!(ppu.read_register(PPUDATA, mapper.as_mut()), 0x00, "stale buffer");
    assert_eq!(ppu.read_register(PPUDATA, mapper.as_mut()), 0x55);
    assert_eq!(ppu.read_register(PPUDATA, mapper.as_mut()), 0x66);
}

#[test]
fn test_palette_read_is_immediate() {
    let mut mapper = chr_ram_mapper();
    let mut ppu = Ppu::new();
    fill(&mut ppu, mapper.as_mut(), 0x2F01, &[0x99]);
    fill(&mut ppu, mapper.as_mut(), 0x3F01, &[0x21]);

    set_address(&mut ppu, mapper.as_mut(), 0x3F01);
    assert_eq!(ppu.read_register(PPUDATA, mapper.as_mut()), 0x21);
    // Buffer now holds the nametable byte under the palette
    assert_eq!(ppu.read_buffer, 0x99);
}

#[test]
fn test_peek_ppudata_does_not_advance() {
    let mut mapper = chr_ram_mapper();
    let mut ppu = Ppu::new();
    fill(&mut ppu, mapper.as_mut(), 0x3F00, &[0x0F]);
    set_address(&mut ppu, mapper.as_mut(), 0x3F00);

    assert_eq!(ppu.peek_register(PPUDATA), 0x0F);
    assert_eq!(ppu.vram_address(), 0x3F00);
}

#[test]
fn test_vram_increment_32() {
    let mut mapper = chr_ram_mapper();
    let mut ppu = Ppu::new();
    ppu.write_register(PPUCTRL, 0x04, mapper.as_mut());
    fill(&mut ppu, mapper.as_mut(), 0x2000, &[1, 2]);
    assert_eq!(ppu.vram_address(), 0x2040);

    ppu.write_register(PPUCTRL, 0x00, mapper.as_mut());
    set_address(&mut ppu, mapper.as_mut(), 0x2020);
    ppu.read_register(PPUDATA, mapper.as_mut());
    assert_eq!(ppu.read_register(PPUDATA, mapper.as_mut()), 2);
}

#[test]
fn test_oam_data_access() {
    let mut mapper = chr_ram_mapper();
    let mut ppu = Ppu::new();
    ppu.write_register(OAMADDR, 0xFE, mapper.as_mut());
    ppu.write_register(OAMDATA, 0x11, mapper.as_mut());
    ppu.write_register(OAMDATA, 0x22, mapper.as_mut());
    ppu.write_register(OAMDATA, 0x33, mapper.as_mut());

    assert_eq!(ppu.oam()[0xFE], 0x11);
    assert_eq!(ppu.oam()[0xFF], 0x22);
    assert_eq!(ppu.oam()[0x00], 0x33, "OAMADDR wraps");

    ppu.write_register(OAMADDR, 0xFF, mapper.as_mut());
    assert_eq!(ppu.read_register(OAMDATA, mapper.as_mut()), 0x22);
    assert_eq!(ppu.read_register(OAMDATA, mapper.as_mut()), 0x22, "reads do not advance");
}

#[test]
fn test_enabling_nmi_during_vblank_fires() {
    let mut mapper = chr_ram_mapper();
    let mut ppu = Ppu::new();
    ppu.write_register(PPUCTRL, 0x80, mapper.as_mut());
    assert!(!ppu.take_nmi(), "not in vblank");

    ppu.write_register(PPUCTRL, 0x00, mapper.as_mut());
    ppu.vblank = true;
    ppu.write_register(PPUCTRL, 0x80, mapper.as_mut());
    assert!(ppu.take_nmi());

    // Already enabled: rewriting does not fire again
    ppu.write_register(PPUCTRL, 0x80, mapper.as_mut());
    assert!(!ppu.take_nmi());
}

#[test]
fn test_greyscale_masks_palette_reads() {
    let mut mapper = chr_ram_mapper();
    let mut ppu = Ppu::new();
    fill(&mut ppu, mapper.as_mut(), 0x3F02, &[0x2C]);
    ppu.write_register(PPUMASK, 0x01, mapper.as_mut());

    set_address(&mut ppu, mapper.as_mut(), 0x3F02);
    assert_eq!(ppu.read_register(PPUDATA, mapper.as_mut()), 0x20);
    assert_eq!(ppu.palette_ram()[2], 0x2C, "stored value untouched");
}
