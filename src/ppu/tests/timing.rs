//! Frame timing: vblank, NMI, pre-render flag clearing and the odd-frame skip

use super::*;

#[test]
fn test_first_frame_completes_at_line_240() {
    let mut mapper = chr_ram_mapper();
    let mut ppu = Ppu::new();
    assert_eq!(run_frame(&mut ppu, mapper.as_mut()), 240 * 341);
    assert_eq!((ppu.scanline(), ppu.dot()), (240, 0));
    assert_eq!(ppu.frame_count(), 1);
    assert!(!ppu.take_frame_complete(), "signal is consumed");
}

#[test]
fn test_vblank_starts_at_line_241_dot_1() {
    let mut mapper = chr_ram_mapper();
    let mut ppu = Ppu::new();
    ppu.write_register(PPUCTRL, 0x80, mapper.as_mut());

    run_to(&mut ppu, mapper.as_mut(), 241, 1);
    assert!(!ppu.vblank);
    assert!(!ppu.take_nmi());

    ppu.step(mapper.as_mut());
    assert!(ppu.vblank);
    assert!(ppu.take_nmi());
}

#[test]
fn test_no_nmi_when_disabled() {
    let mut mapper = chr_ram_mapper();
    let mut ppu = Ppu::new();
    run_to(&mut ppu, mapper.as_mut(), 241, 2);
    assert!(ppu.vblank);
    assert!(!ppu.take_nmi());
}

#[test]
fn test_prerender_clears_status_flags() {
    let mut mapper = chr_ram_mapper();
    let mut ppu = Ppu::new();
    run_to(&mut ppu, mapper.as_mut(), 261, 1);
    ppu.sprite_zero_hit = true;
    ppu.sprite_overflow = true;
    assert!(ppu.vblank);

    ppu.step(mapper.as_mut());
    assert_eq!(ppu.peek_register(PPUSTATUS), 0x00);
}

#[test]
fn test_frame_length_with_rendering_off() {
    let mut mapper = chr_ram_mapper();
    let mut ppu = Ppu::new();
    run_frame(&mut ppu, mapper.as_mut());
    assert_eq!(run_frame(&mut ppu, mapper.as_mut()), DOTS_PER_FRAME);
    assert_eq!(run_frame(&mut ppu, mapper.as_mut()), DOTS_PER_FRAME);
}

#[test]
fn test_odd_frames_skip_a_dot_while_rendering() {
    let mut mapper = chr_ram_mapper();
    let mut ppu = Ppu::new();
    run_frame(&mut ppu, mapper.as_mut());
    ppu.write_register(PPUMASK, 0x08, mapper.as_mut());

    assert_eq!(run_frame(&mut ppu, mapper.as_mut()), DOTS_PER_FRAME - 1);
    assert_eq!(run_frame(&mut ppu, mapper.as_mut()), DOTS_PER_FRAME);
    assert_eq!(run_frame(&mut ppu, mapper.as_mut()), DOTS_PER_FRAME - 1);
}

#[test]
fn test_status_read_during_vblank_acknowledges() {
    let mut mapper = chr_ram_mapper();
    let mut ppu = Ppu::new();
    run_to(&mut ppu, mapper.as_mut(), 250, 0);
    assert_eq!(ppu.read_register(PPUSTATUS, mapper.as_mut()) & 0x80, 0x80);
    assert_eq!(ppu.read_register(PPUSTATUS, mapper.as_mut()) & 0x80, 0x00);
}

#[test]
fn test_state_round_trip_preserves_position() {
    let mut mapper = chr_ram_mapper();
    let mut ppu = Ppu::new();
    run_to(&mut ppu, mapper.as_mut(), 100, 200);
    ppu.write_register(OAMDATA, 0x5A, mapper.as_mut());
    let state = ppu.save_state();

    let mut restored = Ppu::new();
    restored.load_state(&state).unwrap();
    assert_eq!(restored.save_state(), state);
    assert_eq!((restored.scanline(), restored.dot()), (100, 200));
}

#[test]
fn test_load_state_rejects_bad_buffers() {
    let mut ppu = Ppu::new();
    let mut state = ppu.save_state();
    state.oam.truncate(10);
    assert!(ppu.load_state(&state).is_err());

    let mut state = ppu.save_state();
    state.dot = 400;
    assert!(Ppu::validate_state(&state).is_err());
}
