// Blargg-style conformance ROMs
//
// These ROMs report through $6000 (see `common::run_status_rom`). They are
// not distributed with the crate; drop them under tests/roms/ and run with:
//
//     cargo test --test blargg_tests -- --ignored --nocapture

mod common;

use common::{format_result, run_status_rom, TestResult, ROM_DIR};
use std::path::PathBuf;

fn run_rom(name: &str) {
    let path: PathBuf = [ROM_DIR, name].iter().collect();
    match run_status_rom(&path) {
        Ok((result, message)) => {
            println!("\n{}: {}\n{}", name, format_result(&result), message);
            assert_eq!(result, TestResult::Passed, "{}", message);
        }
        Err(e) => panic!("Test error: {}", e),
    }
}

// ============================================================================
// CPU
// ============================================================================

#[test]
#[ignore]
fn instr_test_v5_all() {
    run_rom("instr_test-v5/all_instrs.nes");
}

#[test]
#[ignore]
fn instr_timing() {
    run_rom("instr_timing/instr_timing.nes");
}

#[test]
#[ignore]
fn cpu_interrupts() {
    run_rom("cpu_interrupts_v2/cpu_interrupts.nes");
}

// ============================================================================
// PPU
// ============================================================================

#[test]
#[ignore]
fn ppu_vbl_nmi() {
    run_rom("ppu_vbl_nmi/ppu_vbl_nmi.nes");
}

#[test]
#[ignore]
fn oam_read() {
    run_rom("oam_read/oam_read.nes");
}

// ============================================================================
// APU
// ============================================================================

#[test]
#[ignore]
fn apu_test() {
    run_rom("apu_test/apu_test.nes");
}

// ============================================================================
// Mappers
// ============================================================================

#[test]
#[ignore]
fn mmc3_test() {
    run_rom("mmc3_test_2/rom_singles/4-scanline_timing.nes");
}
