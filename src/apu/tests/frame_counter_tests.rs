//! Frame counter integration tests

use super::run;
use crate::apu::components::FrameMode;
use crate::apu::Apu;
use crate::bus::MemoryMappedDevice;

/// Pulse 1 enabled, length index 1 (254), no halt, decaying envelope
fn apu_with_pulse() -> Apu {
    let mut apu = Apu::new();
    apu.write(0x4015, 0x01);
    apu.write(0x4000, 0x00);
    apu.write(0x4003, 0x08);
    apu
}

#[test]
fn test_frame_counter_default_mode() {
    let apu = Apu::new();
    assert_eq!(apu.frame_counter.mode(), FrameMode::FourStep);
    assert!(!apu.irq_pending());
}

#[test]
fn test_4_step_irq_at_29829() {
    let mut apu = Apu::new();
    run(&mut apu, 29828);
    assert!(!apu.irq_pending());
    run(&mut apu, 1);
    assert!(apu.irq_pending());
}

#[test]
fn test_4_step_period_wraps() {
    let mut apu = Apu::new();
    run(&mut apu, 29830);
    assert_eq!(apu.frame_counter.cycle(), 29830);
    run(&mut apu, 1);
    assert_eq!(apu.frame_counter.cycle(), 1);
}

#[test]
fn test_quarter_frame_clocks_envelope_only() {
    let mut apu = apu_with_pulse();
    run(&mut apu, 7457);
    assert_eq!(apu.pulse1.envelope.decay_level, 15);
    assert_eq!(apu.pulse1.length_counter.counter, 254);
}

#[test]
fn test_half_frame_clocks_length() {
    let mut apu = apu_with_pulse();
    run(&mut apu, 14912);
    assert_eq!(apu.pulse1.length_counter.counter, 254);
    run(&mut apu, 1);
    assert_eq!(apu.pulse1.length_counter.counter, 253);
    run(&mut apu, 29829 - 14913);
    assert_eq!(apu.pulse1.length_counter.counter, 252);
}

#[test]
fn test_irq_inhibit() {
    let mut apu = Apu::new();
    apu.write(0x4017, 0x40);
    run(&mut apu, 29829);
    assert!(!apu.irq_pending());
}

#[test]
fn test_inhibit_write_clears_pending_irq() {
    let mut apu = Apu::new();
    run(&mut apu, 29829);
    assert!(apu.irq_pending());
    apu.write(0x4017, 0x40);
    assert!(!apu.irq_pending());
}

#[test]
fn test_status_read_acknowledges_frame_irq() {
    let mut apu = Apu::new();
    run(&mut apu, 29829);
    assert_eq!(apu.peek(0x4015) & 0x40, 0x40);
    assert_eq!(apu.read(0x4015) & 0x40, 0x40);
    assert_eq!(apu.read(0x4015) & 0x40, 0x00);
}

#[test]
fn test_5_step_mode_has_no_irq() {
    let mut apu = Apu::new();
    apu.write(0x4017, 0x80);
    assert_eq!(apu.frame_counter.mode(), FrameMode::FiveStep);
    run(&mut apu, 37282);
    assert!(!apu.irq_pending());
    assert_eq!(apu.frame_counter.cycle(), 37282);
    run(&mut apu, 1);
    assert_eq!(apu.frame_counter.cycle(), 1);
}

#[test]
fn test_5_step_write_clocks_half_frame_immediately() {
    let mut apu = apu_with_pulse();
    apu.write(0x4017, 0x80);
    assert_eq!(apu.pulse1.length_counter.counter, 253);
    assert_eq!(apu.pulse1.envelope.decay_level, 15);
}

#[test]
fn test_5_step_half_frames() {
    let mut apu = apu_with_pulse();
    apu.write(0x4017, 0x80);
    // 253 after the write; steps 2 and 5 clock the length counter
    run(&mut apu, 29829);
    assert_eq!(apu.pulse1.length_counter.counter, 252);
    run(&mut apu, 37281 - 29829);
    assert_eq!(apu.pulse1.length_counter.counter, 251);
}

#[test]
fn test_frame_counter_write_restarts_sequence() {
    let mut apu = Apu::new();
    run(&mut apu, 20000);
    apu.write(0x4017, 0x00);
    assert_eq!(apu.frame_counter.cycle(), 0);
    run(&mut apu, 29828);
    assert!(!apu.irq_pending());
    run(&mut apu, 1);
    assert!(apu.irq_pending());
}
