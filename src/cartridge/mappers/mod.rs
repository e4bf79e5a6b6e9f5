// Mappers module - Board implementations and the mapper factory
//
// Each board keeps its ROM apart from a serializable state struct holding
// every mutable byte (bank registers, PRG-RAM, CHR-RAM and nametable VRAM).
// Snapshots clone the state struct; ROM is never part of a snapshot.

mod mapper0;
mod mapper1;
mod mapper2;
mod mapper3;
mod mapper4;
mod mapper7;
mod nsf;

pub use mapper0::{Mapper0, NromState};
pub use mapper1::{Mapper1, Mmc1State};
pub use mapper2::{Mapper2, UxromState};
pub use mapper3::{Mapper3, CnromState};
pub use mapper4::{Mapper4, Mmc3State};
pub use mapper7::{AxromState, Mapper7};
pub use nsf::{CALL_STUB, INIT_RETURN, NsfMapper, NsfState, PLAY_CALL, PLAY_RETURN};

use serde::{Deserialize, Serialize};

use super::{Cartridge, Mapper, Mirroring};

/// PRG-RAM size shared by every board that has it (8KB)
pub const PRG_RAM_SIZE: usize = 8 * 1024;

/// CHR-RAM size for boards without CHR-ROM (8KB)
pub const CHR_RAM_SIZE: usize = 8 * 1024;

/// Error type for mapper creation and state transfer
#[derive(Debug)]
pub enum MapperError {
    /// The requested mapper number is not supported
    UnsupportedMapper(u8),
    /// Invalid cartridge configuration for the mapper
    InvalidConfiguration(String),
    /// Battery image does not match the board's PRG-RAM size
    BatterySize { expected: usize, found: usize },
    /// Snapshot was taken from a different board or has malformed buffers
    StateMismatch(String),
}

impl std::fmt::Display for MapperError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapperError::UnsupportedMapper(num) => {
                write!(f, "Mapper {} is not supported", num)
            }
            MapperError::InvalidConfiguration(msg) => {
                write!(f, "Invalid mapper configuration: {}", msg)
            }
            MapperError::BatterySize { expected, found } => write!(
                f,
                "Battery data is {} bytes, board expects {}",
                found, expected
            ),
            MapperError::StateMismatch(msg) => write!(f, "Mapper state mismatch: {}", msg),
        }
    }
}

impl std::error::Error for MapperError {}

/// Serializable snapshot of a board's mutable state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MapperState {
    /// No cartridge inserted
    None,
    Nrom(NromState),
    Mmc1(Mmc1State),
    Uxrom(UxromState),
    Cnrom(CnromState),
    Mmc3(Mmc3State),
    Axrom(AxromState),
    Nsf(NsfState),
}

impl MapperState {
    /// Short board name used in mismatch errors
    pub fn kind(&self) -> &'static str {
        match self {
            MapperState::None => "none",
            MapperState::Nrom(_) => "NROM",
            MapperState::Mmc1(_) => "MMC1",
            MapperState::Uxrom(_) => "UxROM",
            MapperState::Cnrom(_) => "CNROM",
            MapperState::Mmc3(_) => "MMC3",
            MapperState::Axrom(_) => "AxROM",
            MapperState::Nsf(_) => "NSF",
        }
    }
}

/// Create a mapper instance based on the mapper number in the cartridge
///
/// # Errors
/// Returns `MapperError::UnsupportedMapper` if the mapper number is not implemented
/// and `MapperError::InvalidConfiguration` when the board has no PRG-ROM.
///
/// # Example
/// ```no_run
/// use nes_core::cartridge::{create_mapper, Cartridge};
///
/// let data = std::fs::read("game.nes").unwrap();
/// let cartridge = Cartridge::from_bytes(&data).unwrap();
/// let mapper = create_mapper(cartridge).unwrap();
/// ```
pub fn create_mapper(cartridge: Cartridge) -> Result<Box<dyn Mapper>, MapperError> {
    if cartridge.prg_rom.is_empty() {
        return Err(MapperError::InvalidConfiguration(
            "cartridge has no PRG-ROM".to_string(),
        ));
    }

    match cartridge.header.mapper {
        0 => Ok(Box::new(Mapper0::new(cartridge))),
        1 => Ok(Box::new(Mapper1::new(cartridge))),
        2 => Ok(Box::new(Mapper2::new(cartridge))),
        3 => Ok(Box::new(Mapper3::new(cartridge))),
        4 => Ok(Box::new(Mapper4::new(cartridge))),
        7 => Ok(Box::new(Mapper7::new(cartridge))),
        mapper_num => Err(MapperError::UnsupportedMapper(mapper_num)),
    }
}

/// Placeholder board used before a ROM is loaded
///
/// Every read returns 0 and every write is dropped.
#[derive(Debug, Default)]
pub struct NoCartridge;

impl Mapper for NoCartridge {
    fn name(&self) -> &'static str {
        "none"
    }

    fn reset(&mut self, _hard: bool) {}

    fn cpu_read(&self, _addr: u16) -> u8 {
        0
    }

    fn cpu_write(&mut self, _addr: u16, _value: u8) {}

    fn ppu_read(&self, _addr: u16) -> u8 {
        0
    }

    fn ppu_write(&mut self, _addr: u16, _value: u8) {}

    fn mirroring(&self) -> Mirroring {
        Mirroring::Horizontal
    }

    fn save_state(&self) -> MapperState {
        MapperState::None
    }

    fn load_state(&mut self, state: &MapperState) -> Result<(), MapperError> {
        match state {
            MapperState::None => Ok(()),
            other => Err(MapperError::StateMismatch(format!(
                "expected no cartridge, found {}",
                other.kind()
            ))),
        }
    }
}

// ========================================
// Helpers shared by the boards
// ========================================

/// Read a nametable byte through the given mirroring
pub(crate) fn read_nametable(vram: &[u8], mirroring: Mirroring, addr: u16) -> u8 {
    vram[mirroring.vram_index(addr) % vram.len()]
}

/// Write a nametable byte through the given mirroring
pub(crate) fn write_nametable(vram: &mut [u8], mirroring: Mirroring, addr: u16, value: u8) {
    let len = vram.len();
    vram[mirroring.vram_index(addr) % len] = value;
}

/// Reject a snapshot buffer whose length differs from the live one
pub(crate) fn check_len(what: &str, expected: usize, found: usize) -> Result<(), MapperError> {
    if expected != found {
        return Err(MapperError::StateMismatch(format!(
            "{} is {} bytes, expected {}",
            what, found, expected
        )));
    }
    Ok(())
}

/// Build the mismatch error for a snapshot of the wrong board kind
pub(crate) fn wrong_kind(expected: &str, state: &MapperState) -> MapperError {
    MapperError::StateMismatch(format!("expected {}, found {}", expected, state.kind()))
}
