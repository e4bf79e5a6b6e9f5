// End-to-end functionality tests
//
// Small hand-assembled programs run through the whole machine.

mod common;

use common::{emulator_with, nrom_program};
use nes_core::palette::{RGBA_FRAME_SIZE, NES_PALETTE};
use nes_core::{Button, Emulator, INesError, Player};

#[test]
fn test_store_to_prg_ram() {
    // LDA #$42; STA $6000
    let mut emulator = emulator_with(&nrom_program(&[0xA9, 0x42, 0x8D, 0x00, 0x60]));
    while emulator.cpu().pc != 0x8005 {
        emulator.step_cycle();
    }
    // The STA has executed; the bus sees it right away
    assert_eq!(emulator.bus().peek(0x6000), 0x42);
}

#[test]
fn test_rom_errors() {
    let mut emulator = Emulator::new();
    assert!(matches!(emulator.load_rom(&[0x4E, 0x45]), Err(INesError::TooShort(2))));
    assert!(matches!(emulator.load_rom(&[0u8; 32]), Err(INesError::InvalidMagic)));

    let mut truncated = nrom_program(&[]);
    truncated.truncate(0x3000);
    assert!(matches!(
        emulator.load_rom(&truncated),
        Err(INesError::Truncated { .. })
    ));

    let unknown = common::build_rom(99, 1, 1, 0, &[], &[]);
    assert!(matches!(
        emulator.load_rom(&unknown),
        Err(INesError::UnsupportedMapper(99))
    ));
    assert!(emulator.header().is_none());
}

#[test]
fn test_controller_read_by_program() {
    // Strobe, then shift eight bits of pad 1 into $00-$07
    let mut emulator = emulator_with(&nrom_program(&[
        0xA9, 0x01, 0x8D, 0x16, 0x40, // LDA #$01; STA $4016
        0xA9, 0x00, 0x8D, 0x16, 0x40, // LDA #$00; STA $4016
        0xA2, 0x00, // LDX #$00
        0xAD, 0x16, 0x40, // loop: LDA $4016
        0x95, 0x00, // STA $00,X
        0xE8, // INX
        0xE0, 0x09, // CPX #$09
        0xD0, 0xF6, // BNE loop
    ]));
    emulator.set_button(Player::One, Button::A, true);
    emulator.set_button(Player::One, Button::Up, true);
    for _ in 0..300 {
        emulator.step_cycle();
    }
    let reads: Vec<u8> = (0..9).map(|i| emulator.bus().peek(i)).collect();
    assert_eq!(
        reads,
        vec![0x41, 0x40, 0x40, 0x40, 0x41, 0x40, 0x40, 0x40, 0x41],
        "bit order A B Select Start Up Down Left Right, then 1s"
    );
}

#[test]
fn test_backdrop_color_fills_frame() {
    // Palette entry 0 = $21 (light blue), rendering left off
    let mut emulator = emulator_with(&nrom_program(&[
        0xA9, 0x3F, 0x8D, 0x06, 0x20, // LDA #$3F; STA $2006
        0xA9, 0x00, 0x8D, 0x06, 0x20, // LDA #$00; STA $2006
        0xA9, 0x21, 0x8D, 0x07, 0x20, // LDA #$21; STA $2007
        0xA9, 0x00, 0x8D, 0x06, 0x20, // LDA #$00; STA $2006
        0x8D, 0x06, 0x20, // STA $2006
    ]));
    emulator.run_frame();
    emulator.run_frame();

    assert!(emulator.read_framebuffer().iter().all(|&p| p == 0x21));

    let mut rgba = vec![0u8; RGBA_FRAME_SIZE];
    emulator.render_rgba(&mut rgba);
    let rgb = NES_PALETTE[0x21];
    assert_eq!(
        &rgba[..4],
        &[(rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 0xFF]
    );
}

#[test]
fn test_audio_follows_pulse_channel() {
    let mut silent = emulator_with(&nrom_program(&[]));
    silent.run_frame();
    silent.run_frame();
    assert!(silent.frame_samples().iter().all(|&s| s == 0.0));

    // Pulse 1: 50% duty, constant volume 15, period $100
    let mut playing = emulator_with(&nrom_program(&[
        0xA9, 0x01, 0x8D, 0x15, 0x40, // LDA #$01; STA $4015
        0xA9, 0xBF, 0x8D, 0x00, 0x40, // LDA #$BF; STA $4000
        0xA9, 0x00, 0x8D, 0x02, 0x40, // LDA #$00; STA $4002
        0xA9, 0x01, 0x8D, 0x03, 0x40, // LDA #$01; STA $4003
    ]));
    playing.run_frame();
    playing.run_frame();
    let samples = playing.frame_samples();
    assert!(samples.iter().any(|&s| s > 0.0));
    assert!(samples.iter().all(|&s| s < 1.0));
}

#[test]
fn test_vblank_flag_seen_by_program() {
    // Spin on BIT $2002 until bit 7, then store a marker
    let mut emulator = emulator_with(&nrom_program(&[
        0x2C, 0x02, 0x20, // wait: BIT $2002
        0x10, 0xFB, // BPL wait
        0xA9, 0x01, 0x85, 0x10, // LDA #$01; STA $10
    ]));
    emulator.run_frame();
    assert_eq!(emulator.bus().peek(0x10), 0);
    for _ in 0..400 {
        emulator.step_cycle();
    }
    assert_eq!(emulator.bus().peek(0x10), 1);
}
