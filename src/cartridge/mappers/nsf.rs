// NSF board - Program data for music rips, with optional 4KB bank switching
//
// Memory Layout:
// - CPU $5FE0-$5FEF: Player call stub (JSR init / JSR play, NOP padding)
// - CPU $5FF8-$5FFF: Bank registers for $8000, $9000, ... $F000
// - CPU $6000-$7FFF: 8KB PRG-RAM
// - CPU $8000-$FFFF: Program data, flat or eight 4KB banks
//
// There is no CHR or nametable memory; PPU reads return 0.

use serde::{Deserialize, Serialize};

use super::{check_len, wrong_kind, MapperError, MapperState, PRG_RAM_SIZE};
use crate::cartridge::nsf::{NsfHeader, NSF_HEADER_SIZE};
use crate::cartridge::{Mapper, Mirroring};

/// Bank size for bank-switched files (4KB)
const BANK_SIZE: usize = 0x1000;

/// Start of the call stub the player jumps into
pub const CALL_STUB: u16 = 0x5FE0;

/// First NOP after `JSR init`
pub const INIT_RETURN: u16 = CALL_STUB + 3;

/// `JSR play`
pub const PLAY_CALL: u16 = CALL_STUB + 8;

/// First NOP after `JSR play`
pub const PLAY_RETURN: u16 = PLAY_CALL + 3;

/// Mutable NSF board state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NsfState {
    pub banks: [u8; 8],
    pub prg_ram: Vec<u8>,
}

/// NSF board implementation
pub struct NsfMapper {
    /// Flat 32KB image, or `bank_count` 4KB banks
    rom: Vec<u8>,
    banked: bool,
    bank_count: usize,
    initial_banks: [u8; 8],
    call_stub: [u8; 16],
    state: NsfState,
}

impl NsfMapper {
    /// Lay out the program data of a complete NSF file
    pub fn new(data: &[u8], header: &NsfHeader) -> Self {
        let payload = data.get(NSF_HEADER_SIZE..).unwrap_or(&[]);
        let banked = header.is_banked();

        let (rom, bank_count) = if banked {
            let offset = (header.load_addr & 0x0FFF) as usize;
            let bank_count = (payload.len() + offset).div_ceil(BANK_SIZE).max(1);
            let mut rom = vec![0u8; bank_count * BANK_SIZE];
            rom[offset..offset + payload.len()].copy_from_slice(payload);
            (rom, bank_count)
        } else {
            let offset = (header.load_addr - 0x8000) as usize;
            let mut rom = vec![0u8; 0x8000];
            let len = payload.len().min(rom.len() - offset);
            rom[offset..offset + len].copy_from_slice(&payload[..len]);
            (rom, 0x8000 / BANK_SIZE)
        };

        let initial_banks = header.banks.map(|bank| (bank as usize % bank_count) as u8);

        let mut call_stub = [0xEA; 16];
        let [init_lo, init_hi] = header.init_addr.to_le_bytes();
        let [play_lo, play_hi] = header.play_addr.to_le_bytes();
        call_stub[0..3].copy_from_slice(&[0x20, init_lo, init_hi]);
        call_stub[8..11].copy_from_slice(&[0x20, play_lo, play_hi]);

        NsfMapper {
            rom,
            banked,
            bank_count,
            initial_banks,
            call_stub,
            state: NsfState {
                banks: initial_banks,
                prg_ram: vec![0; PRG_RAM_SIZE],
            },
        }
    }

    /// Number of 4KB banks in the program image
    pub fn bank_count(&self) -> usize {
        self.bank_count
    }
}

impl Mapper for NsfMapper {
    fn name(&self) -> &'static str {
        "NSF"
    }

    fn reset(&mut self, _hard: bool) {
        self.state.prg_ram.fill(0);
        self.state.banks = self.initial_banks;
    }

    fn cpu_read(&self, addr: u16) -> u8 {
        match addr {
            0x5FE0..=0x5FEF => self.call_stub[(addr - CALL_STUB) as usize],
            0x6000..=0x7FFF => self.state.prg_ram[(addr & 0x1FFF) as usize],
            0x8000..=0xFFFF if self.banked => {
                let slot = ((addr >> 12) - 8) as usize;
                let bank = self.state.banks[slot] as usize;
                self.rom[bank * BANK_SIZE + (addr as usize & 0x0FFF)]
            }
            0x8000..=0xFFFF => self.rom[(addr & 0x7FFF) as usize],
            _ => 0,
        }
    }

    fn cpu_write(&mut self, addr: u16, value: u8) {
        match addr {
            0x5FF8..=0x5FFF => {
                self.state.banks[(addr - 0x5FF8) as usize] =
                    (value as usize % self.bank_count) as u8;
            }
            0x6000..=0x7FFF => self.state.prg_ram[(addr & 0x1FFF) as usize] = value,
            _ => {}
        }
    }

    fn ppu_read(&self, _addr: u16) -> u8 {
        0
    }

    fn ppu_write(&mut self, _addr: u16, _value: u8) {}

    fn mirroring(&self) -> Mirroring {
        Mirroring::Horizontal
    }

    fn save_state(&self) -> MapperState {
        MapperState::Nsf(self.state.clone())
    }

    fn load_state(&mut self, state: &MapperState) -> Result<(), MapperError> {
        let MapperState::Nsf(state) = state else {
            return Err(wrong_kind("NSF", state));
        };
        check_len("PRG-RAM", PRG_RAM_SIZE, state.prg_ram.len())?;
        if let Some(bank) = state.banks.iter().find(|&&b| b as usize >= self.bank_count) {
            return Err(MapperError::StateMismatch(format!(
                "bank {} out of range ({} banks)",
                bank, self.bank_count
            )));
        }
        self.state = state.clone();
        Ok(())
    }
}
