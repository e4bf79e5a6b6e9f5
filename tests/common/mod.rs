// Common test utilities for integration tests
//
// Builds small iNES and NSF images in memory and runs ROMs that report through the
// $6000 status protocol used by blargg's test suites.

#![allow(dead_code)]

use nes_core::Emulator;
use std::fs;
use std::path::Path;

/// Maximum number of frames to run a test ROM before timing out
pub const MAX_TEST_FRAMES: u32 = 3600;

/// Directory holding third-party test ROMs (not checked in)
pub const ROM_DIR: &str = "tests/roms";

/// Build an iNES image
///
/// `prg` is padded to `prg_banks * 16KB` and `chr` to `chr_banks * 8KB`.
pub fn build_rom(mapper: u8, prg_banks: u8, chr_banks: u8, flags6: u8, prg: &[u8], chr: &[u8]) -> Vec<u8> {
    let mut rom = vec![0u8; 16];
    rom[..4].copy_from_slice(b"NES\x1A");
    rom[4] = prg_banks;
    rom[5] = chr_banks;
    rom[6] = (mapper << 4) | (flags6 & 0x0F);
    rom[7] = mapper & 0xF0;

    let mut prg_data = prg.to_vec();
    prg_data.resize(prg_banks as usize * 0x4000, 0);
    rom.extend_from_slice(&prg_data);

    let mut chr_data = chr.to_vec();
    chr_data.resize(chr_banks as usize * 0x2000, 0);
    rom.extend_from_slice(&chr_data);
    rom
}

/// Unbanked NSF file with `songs` songs and its program loaded at $8000
pub fn build_nsf(songs: u8, init: u16, play: u16, name: &str, program: &[u8]) -> Vec<u8> {
    let mut nsf = vec![0u8; 0x80];
    nsf[..5].copy_from_slice(b"NESM\x1A");
    nsf[5] = 1;
    nsf[6] = songs;
    nsf[7] = 1;
    nsf[8..10].copy_from_slice(&0x8000u16.to_le_bytes());
    nsf[0x0A..0x0C].copy_from_slice(&init.to_le_bytes());
    nsf[0x0C..0x0E].copy_from_slice(&play.to_le_bytes());
    nsf[0x0E..0x0E + name.len()].copy_from_slice(name.as_bytes());
    nsf[0x6E..0x70].copy_from_slice(&16639u16.to_le_bytes());
    nsf.extend_from_slice(program);
    nsf
}

/// 16KB NROM image with `program` at $8000 and every vector pointing at it
///
/// A `JMP` to itself is appended so the CPU parks after the program.
pub fn nrom_program(program: &[u8]) -> Vec<u8> {
    let mut prg = vec![0u8; 0x4000];
    prg[..program.len()].copy_from_slice(program);
    let spin = 0x8000 + program.len() as u16;
    prg[program.len()..program.len() + 3].copy_from_slice(&[0x4C, spin as u8, (spin >> 8) as u8]);
    prg[0x3FFA..0x4000].copy_from_slice(&[0x00, 0x80, 0x00, 0x80, 0x00, 0x80]);
    build_rom(0, 1, 1, 0, &prg, &[])
}

/// Emulator with `rom` loaded
pub fn emulator_with(rom: &[u8]) -> Emulator {
    let mut emulator = Emulator::new();
    emulator.load_rom(rom).expect("test ROM should load");
    emulator
}

/// Result of running a ROM with the $6000 status protocol
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestResult {
    Passed,
    /// Nonzero result code
    Failed(u8),
    Timeout,
}

/// Read a NUL-terminated string from CPU space without side effects
pub fn read_string(emulator: &Emulator, addr: u16, max_len: usize) -> String {
    (0..max_len as u16)
        .map(|i| emulator.bus().peek(addr.wrapping_add(i)))
        .take_while(|&b| b != 0)
        .filter(|b| (0x20..=0x7E).contains(b) || *b == b'\n')
        .map(|b| b as char)
        .collect()
}

/// Run a ROM until it reports through $6000
///
/// $6001-$6003 hold the signature DE B0 61 once the ROM is reporting.
/// $6000 is $80 while running, $81 when it asks for a reset, and the
/// result code when done. Text output sits at $6004.
pub fn run_status_rom(path: &Path) -> Result<(TestResult, String), String> {
    let data = fs::read(path).map_err(|e| format!("Failed to load ROM from {}: {}", path.display(), e))?;
    let mut emulator = Emulator::new();
    emulator.load_rom(&data).map_err(|e| e.to_string())?;

    let mut reset_at = None;
    for frame in 0..MAX_TEST_FRAMES {
        emulator.run_frame();

        let bus = emulator.bus();
        let signature = [bus.peek(0x6001), bus.peek(0x6002), bus.peek(0x6003)];
        if signature != [0xDE, 0xB0, 0x61] {
            continue;
        }
        match bus.peek(0x6000) {
            0x80 => {}
            0x81 => {
                // Reset is requested; give it a few frames first
                match reset_at {
                    None => reset_at = Some(frame + 6),
                    Some(at) if frame >= at => {
                        emulator.reset(false);
                        reset_at = None;
                    }
                    Some(_) => {}
                }
            }
            code => {
                let message = read_string(&emulator, 0x6004, 1024);
                let result = if code == 0 {
                    TestResult::Passed
                } else {
                    TestResult::Failed(code)
                };
                return Ok((result, message));
            }
        }
    }
    Ok((TestResult::Timeout, String::new()))
}

/// Format test result for display
pub fn format_result(result: &TestResult) -> String {
    match result {
        TestResult::Passed => "PASSED".to_string(),
        TestResult::Failed(code) => format!("FAILED (error code: ${:02X})", code),
        TestResult::Timeout => "TIMEOUT".to_string(),
    }
}
