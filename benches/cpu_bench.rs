// CPU Benchmarks
// Instruction throughput for common instruction patterns

use criterion::{criterion_group, criterion_main, Criterion};
use nes_core::{create_mapper, Bus, Cartridge, Cpu};
use std::hint::black_box;

/// NROM bus whose PRG is `pattern` repeated, with the reset vector at $8000
///
/// The pattern ends in a `JMP $8000` so execution loops forever.
fn bus_with_loop(pattern: &[u8]) -> Bus {
    let mut prg = vec![0xEA; 0x4000];
    let mut offset = 0;
    while offset + pattern.len() + 3 <= 0x1000 {
        prg[offset..offset + pattern.len()].copy_from_slice(pattern);
        offset += pattern.len();
    }
    prg[offset..offset + 3].copy_from_slice(&[0x4C, 0x00, 0x80]);
    prg[0x3FFC] = 0x00;
    prg[0x3FFD] = 0x80;

    let mut rom = vec![0x4E, 0x45, 0x53, 0x1A, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
    rom.extend_from_slice(&prg);
    rom.extend(std::iter::repeat(0).take(0x2000));

    let cartridge = Cartridge::from_bytes(&rom).expect("valid image");
    Bus::with_mapper(create_mapper(cartridge).expect("NROM"))
}

fn bench_pattern(c: &mut Criterion, group_name: &str, cases: &[(&str, &[u8])]) {
    let mut group = c.benchmark_group(group_name);
    for (name, pattern) in cases {
        group.bench_function(*name, |b| {
            let mut bus = bus_with_loop(pattern);
            let mut cpu = Cpu::new();
            cpu.reset(&mut bus);
            b.iter(|| {
                cpu.step_instruction(black_box(&mut bus));
            });
        });
    }
    group.finish();
}

/// Benchmark CPU instruction execution
fn bench_cpu_instructions(c: &mut Criterion) {
    bench_pattern(
        c,
        "cpu_instructions",
        &[
            ("nop", &[0xEA]),
            ("lda_immediate", &[0xA9, 0x42]),
            ("adc_immediate", &[0x69, 0x01]),
            ("sta_absolute", &[0x8D, 0x00, 0x02]),
            ("lda_indirect_y", &[0xB1, 0x10]),
            ("inc_zero_page", &[0xE6, 0x20]),
        ],
    );
}

/// Benchmark a small loop with a taken branch
fn bench_cpu_loop(c: &mut Criterion) {
    // LDX #$10; loop: DEX; BNE loop
    bench_pattern(c, "cpu_loops", &[("dex_bne", &[0xA2, 0x10, 0xCA, 0xD0, 0xFD])]);
}

/// Side-effect-free trace line generation
fn bench_trace(c: &mut Criterion) {
    c.bench_function("cpu_trace_line", |b| {
        let mut bus = bus_with_loop(&[0xBD, 0x00, 0x02]);
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);
        b.iter(|| black_box(cpu.trace(&bus)));
    });
}

criterion_group!(benches, bench_cpu_instructions, bench_cpu_loop, bench_trace);
criterion_main!(benches);
