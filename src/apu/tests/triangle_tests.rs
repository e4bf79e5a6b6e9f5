//! Triangle channel through $4008-$400B

use super::run;
use crate::apu::Apu;
use crate::bus::MemoryMappedDevice;

#[test]
fn test_triangle_registers() {
    let mut apu = Apu::new();
    apu.write(0x4015, 0x04);
    apu.write(0x4008, 0x81);
    apu.write(0x400A, 0x22);
    apu.write(0x400B, 0x0B);

    assert!(apu.triangle.linear_counter.control_flag);
    assert!(apu.triangle.length_counter.halt);
    assert_eq!(apu.triangle.linear_counter.reload_value, 1);
    assert_eq!(apu.triangle.timer.period, 0x322);
    assert_eq!(apu.triangle.length_counter.counter, 254);
    assert!(apu.triangle.linear_counter.reload_flag);
}

#[test]
fn test_triangle_silent_until_linear_counter_loads() {
    let mut apu = Apu::new();
    apu.write(0x4015, 0x04);
    apu.write(0x4008, 0x7F);
    apu.write(0x400A, 0x40);
    apu.write(0x400B, 0x08);

    run(&mut apu, 7456);
    assert!(apu.samples().iter().all(|&s| s == 0.0));

    // The first quarter frame loads the linear counter
    run(&mut apu, 200);
    assert!(apu.samples().iter().any(|&s| s > 0.0));
}

#[test]
fn test_linear_counter_expires() {
    let mut apu = Apu::new();
    apu.write(0x4015, 0x04);
    apu.write(0x4008, 0x02);
    apu.write(0x400B, 0x08);
    // Reload at the first quarter frame, then count down on the next two
    run(&mut apu, 22371);
    assert_eq!(apu.triangle.linear_counter.counter, 0);
}

#[test]
fn test_disable_clears_length() {
    let mut apu = Apu::new();
    apu.write(0x4015, 0x04);
    apu.write(0x400B, 0x08);
    assert_eq!(apu.read(0x4015) & 0x04, 0x04);
    apu.write(0x4015, 0x00);
    assert_eq!(apu.read(0x4015) & 0x04, 0x00);
}
