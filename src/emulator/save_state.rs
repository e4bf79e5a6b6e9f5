// Save state functionality
//
// A snapshot is one serde struct per component, composed under a version
// number and the iNES header of the cartridge it was taken from. Loading
// checks every part before touching the machine, so a rejected snapshot
// leaves the emulator exactly as it was.

use serde::{Deserialize, Serialize};

use crate::apu::ApuState;
use crate::bus::BusState;
use crate::cartridge::mappers::{MapperError, MapperState};
use crate::cartridge::INesHeader;
use crate::cpu::CpuState;
use crate::ppu::PpuState;

/// Current save state format version
pub const SAVE_STATE_VERSION: u32 = 1;

/// Errors that can occur during save state operations
#[derive(Debug)]
pub enum SaveStateError {
    /// JSON serialization/deserialization error
    Serialization(serde_json::Error),
    /// Save state version mismatch
    VersionMismatch { expected: u32, found: u32 },
    /// Snapshot belongs to a different cartridge
    HeaderMismatch {
        expected: INesHeader,
        found: INesHeader,
    },
    /// No ROM loaded
    NoRomLoaded,
    /// A component rejected its part of the snapshot
    Malformed(String),
    /// The mapper rejected its part of the snapshot
    Mapper(MapperError),
}

impl std::fmt::Display for SaveStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveStateError::Serialization(e) => write!(f, "Serialization error: {}", e),
            SaveStateError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Version mismatch: expected {}, found {}",
                    expected, found
                )
            }
            SaveStateError::HeaderMismatch { expected, found } => write!(
                f,
                "Save state is for mapper {} ({}x16KB PRG, {}x8KB CHR), loaded ROM is mapper {} ({}x16KB PRG, {}x8KB CHR)",
                found.mapper,
                found.prg_banks,
                found.chr_banks,
                expected.mapper,
                expected.prg_banks,
                expected.chr_banks
            ),
            SaveStateError::NoRomLoaded => write!(f, "No ROM loaded"),
            SaveStateError::Malformed(msg) => write!(f, "Malformed save state: {}", msg),
            SaveStateError::Mapper(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SaveStateError {}

impl From<serde_json::Error> for SaveStateError {
    fn from(e: serde_json::Error) -> Self {
        SaveStateError::Serialization(e)
    }
}

impl From<MapperError> for SaveStateError {
    fn from(e: MapperError) -> Self {
        SaveStateError::Mapper(e)
    }
}

/// Complete emulator save state
///
/// The framebuffer and the pending audio samples are not included; both are
/// regenerated within a frame of loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveState {
    /// Version number for compatibility checking
    pub version: u32,
    /// RFC 3339 creation time, informational only
    pub timestamp: String,
    /// Header of the cartridge the snapshot was taken from
    pub header: INesHeader,
    pub cpu: CpuState,
    pub ppu: PpuState,
    pub apu: ApuState,
    pub bus: BusState,
    pub mapper: MapperState,
}

impl SaveState {
    /// Capture the state of a running emulator
    ///
    /// # Errors
    /// Returns [`SaveStateError::NoRomLoaded`] when no cartridge is inserted.
    pub fn from_emulator(emulator: &super::Emulator) -> Result<Self, SaveStateError> {
        let header = emulator.header().ok_or(SaveStateError::NoRomLoaded)?;
        let bus = emulator.bus();

        Ok(SaveState {
            version: SAVE_STATE_VERSION,
            timestamp: chrono::Local::now().to_rfc3339(),
            header,
            cpu: emulator.cpu().save_state(),
            ppu: bus.ppu().save_state(),
            apu: bus.apu().save_state(),
            bus: bus.save_state(),
            mapper: bus.mapper().save_state(),
        })
    }

    /// Check everything that can be checked without the mapper
    fn validate(&self, header: Option<INesHeader>) -> Result<(), SaveStateError> {
        if self.version != SAVE_STATE_VERSION {
            return Err(SaveStateError::VersionMismatch {
                expected: SAVE_STATE_VERSION,
                found: self.version,
            });
        }
        let header = header.ok_or(SaveStateError::NoRomLoaded)?;
        if header != self.header {
            return Err(SaveStateError::HeaderMismatch {
                expected: header,
                found: self.header,
            });
        }

        crate::cpu::Cpu::validate_state(&self.cpu)
            .map_err(|e| SaveStateError::Malformed(format!("CPU: {}", e)))?;
        crate::ppu::Ppu::validate_state(&self.ppu)
            .map_err(|e| SaveStateError::Malformed(format!("PPU: {}", e)))?;
        crate::apu::Apu::validate_state(&self.apu)
            .map_err(|e| SaveStateError::Malformed(format!("APU: {}", e)))?;
        crate::bus::Bus::validate_state(&self.bus)
            .map_err(|e| SaveStateError::Malformed(format!("bus: {}", e)))?;
        Ok(())
    }

    /// Restore emulator state from this save state
    ///
    /// The mapper goes first since it is the last part that can still
    /// refuse; it checks its snapshot before changing anything.
    pub fn restore_to_emulator(
        &self,
        emulator: &mut super::Emulator,
    ) -> Result<(), SaveStateError> {
        self.validate(emulator.header())?;

        let bus = emulator.bus_mut();
        bus.mapper_mut().load_state(&self.mapper)?;
        bus.ppu_mut()
            .load_state(&self.ppu)
            .map_err(SaveStateError::Malformed)?;
        bus.apu_mut()
            .load_state(&self.apu)
            .map_err(SaveStateError::Malformed)?;
        bus.load_state(&self.bus);
        emulator.cpu_mut().load_state(&self.cpu);

        log::debug!("Loaded save state taken at {}", self.timestamp);
        Ok(())
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String, SaveStateError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a snapshot produced by [`SaveState::to_json`]
    pub fn from_json(json: &str) -> Result<Self, SaveStateError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::test_rom;
    use crate::emulator::Emulator;

    fn running_emulator() -> Emulator {
        // LDX #$00; INX; STX $0200; JMP $8002
        let rom = test_rom::nrom_with_program(&[0xA2, 0x00, 0xE8, 0x8E, 0x00, 0x02, 0x4C, 0x02, 0x80]);
        let mut emulator = Emulator::new();
        emulator.load_rom(&rom).expect("test ROM loads");
        for _ in 0..500 {
            emulator.step_cycle();
        }
        emulator
    }

    #[test]
    fn test_no_rom_loaded() {
        let emulator = Emulator::new();
        assert!(matches!(
            SaveState::from_emulator(&emulator),
            Err(SaveStateError::NoRomLoaded)
        ));
    }

    #[test]
    fn test_version_mismatch_is_rejected() {
        let mut emulator = running_emulator();
        let mut state = SaveState::from_emulator(&emulator).unwrap();
        state.version = SAVE_STATE_VERSION + 1;
        assert!(matches!(
            state.restore_to_emulator(&mut emulator),
            Err(SaveStateError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn test_malformed_part_leaves_emulator_untouched() {
        let mut emulator = running_emulator();
        let before = SaveState::from_emulator(&emulator).unwrap();

        let mut bad = before.clone();
        bad.cpu.a = bad.cpu.a.wrapping_add(1);
        bad.bus.ram.truncate(16);
        assert!(matches!(
            bad.restore_to_emulator(&mut emulator),
            Err(SaveStateError::Malformed(_))
        ));

        let after = SaveState::from_emulator(&emulator).unwrap();
        assert_eq!(after.cpu, before.cpu);
        assert_eq!(after.bus, before.bus);
    }

    #[test]
    fn test_json_round_trip() {
        let emulator = running_emulator();
        let state = SaveState::from_emulator(&emulator).unwrap();
        let json = state.to_json().unwrap();
        assert_eq!(SaveState::from_json(&json).unwrap(), state);
    }

    #[test]
    fn test_garbage_json() {
        assert!(matches!(
            SaveState::from_json("{ not json"),
            Err(SaveStateError::Serialization(_))
        ));
    }
}
