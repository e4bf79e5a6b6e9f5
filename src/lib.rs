// NES Emulator Core Library
//
// A cycle-stepped NES: 6502 CPU, PPU, APU, cartridge mappers and the bus
// that ties them together. Hosts drive it through `Emulator` (or `NsfPlayer`
// for music rips) and take care of presentation and file I/O themselves.

// Public modules
pub mod apu;
pub mod bus;
pub mod cartridge;
pub mod cpu;
pub mod emulator;
pub mod input;
pub mod palette;
pub mod ppu;
pub mod ram;

// Re-export main types for convenience
pub use apu::{Apu, ApuState};
pub use bus::{Bus, BusState, MemoryMappedDevice};
pub use cartridge::{
    create_mapper, Cartridge, INesError, INesHeader, Mapper, MapperError, MapperState, Mirroring,
    NsfError, NsfHeader, NsfMapper,
};
pub use cpu::{Cpu, CpuState};
pub use emulator::{
    ConfigError, Emulator, EmulatorConfig, NsfPlayer, SaveState, SaveStateError,
};
pub use input::{Button, Controller, ControllerPorts, Player};
pub use ppu::{Ppu, PpuState};
pub use ram::Ram;
