// Cartridge module - iNES parsing, nametable mirroring and the mapper interface
//
// # iNES Layout
//
// ```text
// $00-$03: "NES" followed by MS-DOS EOF ($1A)
// $04:     PRG-ROM size in 16KB units
// $05:     CHR-ROM size in 8KB units (0 = board uses 8KB CHR-RAM)
// $06:     Flags 6 - mirroring, battery, trainer, four-screen, mapper low nibble
// $07:     Flags 7 - mapper high nibble
// $08-$0F: Unused here
// [512-byte trainer if flags 6 bit 2]
// PRG-ROM, then CHR-ROM
// ```

pub mod mappers;
pub mod nsf;

use serde::{Deserialize, Serialize};

pub use mappers::{create_mapper, MapperError, MapperState, NsfMapper};
pub use nsf::{NsfError, NsfHeader};

/// iNES magic bytes
const INES_MAGIC: [u8; 4] = [0x4E, 0x45, 0x53, 0x1A];

/// Header size in bytes
const HEADER_SIZE: usize = 16;

/// Trainer size in bytes
const TRAINER_SIZE: usize = 512;

/// PRG-ROM bank size (16KB)
pub const PRG_BANK_SIZE: usize = 0x4000;

/// CHR-ROM bank size (8KB)
pub const CHR_BANK_SIZE: usize = 0x2000;

/// Size of one nametable (1KB)
pub const NAMETABLE_SIZE: usize = 0x400;

/// Nametable mirroring arrangement
///
/// The PPU addresses four 1KB nametables at $2000-$2FFF, but consoles only
/// carry 2KB of VRAM. The cartridge decides how the four logical tables fold
/// onto physical memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mirroring {
    /// $2000=$2400, $2800=$2C00
    Horizontal,
    /// $2000=$2800, $2400=$2C00
    Vertical,
    /// All four tables map to the first physical table
    SingleScreenLower,
    /// All four tables map to the second physical table
    SingleScreenUpper,
    /// Cartridge supplies 2KB extra VRAM, no mirroring
    FourScreen,
}

impl Mirroring {
    /// Bytes of nametable VRAM a board needs for this arrangement
    pub fn vram_size(self) -> usize {
        match self {
            Mirroring::FourScreen => 4 * NAMETABLE_SIZE,
            _ => 2 * NAMETABLE_SIZE,
        }
    }

    /// Map a PPU nametable address ($2000-$3EFF) to a VRAM offset
    pub fn vram_index(self, addr: u16) -> usize {
        let addr = (addr & 0x0FFF) as usize;
        let table = addr / NAMETABLE_SIZE;
        let offset = addr % NAMETABLE_SIZE;

        let physical = match self {
            Mirroring::Horizontal => table >> 1,
            Mirroring::Vertical => table & 1,
            Mirroring::SingleScreenLower => 0,
            Mirroring::SingleScreenUpper => 1,
            Mirroring::FourScreen => table,
        };

        physical * NAMETABLE_SIZE + offset
    }
}

/// Errors raised while parsing an iNES image
#[derive(Debug)]
pub enum INesError {
    /// Image is smaller than the 16-byte header
    TooShort(usize),
    /// First four bytes are not "NES\x1A"
    InvalidMagic,
    /// Image ends before the PRG/CHR data the header declares
    Truncated { expected: usize, found: usize },
    /// Header names a mapper this core does not implement
    UnsupportedMapper(u8),
    /// Mapper rejected the cartridge layout
    Mapper(MapperError),
}

impl std::fmt::Display for INesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            INesError::TooShort(len) => {
                write!(f, "ROM image is {} bytes, smaller than an iNES header", len)
            }
            INesError::InvalidMagic => write!(f, "Missing iNES magic bytes"),
            INesError::Truncated { expected, found } => write!(
                f,
                "ROM image is truncated: expected {} bytes, found {}",
                expected, found
            ),
            INesError::UnsupportedMapper(num) => write!(f, "Mapper {} is not supported", num),
            INesError::Mapper(e) => write!(f, "Mapper error: {}", e),
        }
    }
}

impl std::error::Error for INesError {}

impl From<MapperError> for INesError {
    fn from(e: MapperError) -> Self {
        match e {
            MapperError::UnsupportedMapper(num) => INesError::UnsupportedMapper(num),
            other => INesError::Mapper(other),
        }
    }
}

/// Parsed iNES header fields
///
/// Doubles as the cartridge identity tag inside save states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct INesHeader {
    /// Number of 16KB PRG-ROM banks
    pub prg_banks: u8,
    /// Number of 8KB CHR-ROM banks (0 = CHR-RAM)
    pub chr_banks: u8,
    /// iNES mapper number
    pub mapper: u8,
    /// Mirroring selected by the header
    pub mirroring: Mirroring,
    /// PRG-RAM is battery backed
    pub battery: bool,
    /// 512-byte trainer precedes PRG-ROM
    pub trainer: bool,
    /// Four-screen VRAM flag
    pub four_screen: bool,
}

impl INesHeader {
    /// Parse the 16-byte header at the start of an image
    pub fn parse(data: &[u8]) -> Result<Self, INesError> {
        if data.len() < HEADER_SIZE {
            return Err(INesError::TooShort(data.len()));
        }
        if data[0..4] != INES_MAGIC {
            return Err(INesError::InvalidMagic);
        }

        let flags6 = data[6];
        let flags7 = data[7];
        let four_screen = flags6 & 0x08 != 0;

        let mirroring = if four_screen {
            Mirroring::FourScreen
        } else if flags6 & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };

        Ok(INesHeader {
            prg_banks: data[4],
            chr_banks: data[5],
            mapper: (flags6 >> 4) | (flags7 & 0xF0),
            mirroring,
            battery: flags6 & 0x02 != 0,
            trainer: flags6 & 0x04 != 0,
            four_screen,
        })
    }

    /// Offset of PRG-ROM inside the image
    pub fn prg_offset(&self) -> usize {
        HEADER_SIZE + if self.trainer { TRAINER_SIZE } else { 0 }
    }

    /// Offset of CHR-ROM inside the image
    pub fn chr_offset(&self) -> usize {
        self.prg_offset() + self.prg_banks as usize * PRG_BANK_SIZE
    }

    /// Total image size the header declares
    pub fn expected_len(&self) -> usize {
        self.chr_offset() + self.chr_banks as usize * CHR_BANK_SIZE
    }
}

/// Cartridge contents split out of an iNES image
#[derive(Debug, Clone)]
pub struct Cartridge {
    pub header: INesHeader,
    pub prg_rom: Vec<u8>,
    /// CHR-ROM, empty when the board uses CHR-RAM
    pub chr_rom: Vec<u8>,
    pub trainer: Option<Vec<u8>>,
}

impl Cartridge {
    /// Parse a complete iNES image
    ///
    /// # Errors
    /// Returns an [`INesError`] when the header is malformed or the image is
    /// shorter than the header declares. The mapper number is not checked here;
    /// [`create_mapper`] rejects unknown boards.
    pub fn from_bytes(data: &[u8]) -> Result<Self, INesError> {
        let header = INesHeader::parse(data)?;

        let expected = header.expected_len();
        if data.len() < expected {
            return Err(INesError::Truncated {
                expected,
                found: data.len(),
            });
        }

        let trainer = header
            .trainer
            .then(|| data[HEADER_SIZE..HEADER_SIZE + TRAINER_SIZE].to_vec());
        let prg_rom = data[header.prg_offset()..header.chr_offset()].to_vec();
        let chr_rom = data[header.chr_offset()..expected].to_vec();

        Ok(Cartridge {
            header,
            prg_rom,
            chr_rom,
            trainer,
        })
    }

    pub fn has_chr_ram(&self) -> bool {
        self.chr_rom.is_empty()
    }
}

/// Cartridge board interface
///
/// A mapper owns everything on the cartridge side of the two buses: PRG/CHR
/// memory, bank registers, PRG-RAM and the nametable VRAM. The PPU never
/// touches nametable memory directly; every access in $0000-$3FFF goes
/// through [`Mapper::ppu_read`] and [`Mapper::ppu_write`].
pub trait Mapper {
    /// Board name for logs
    fn name(&self) -> &'static str;

    /// Return registers to power-on state; a hard reset also clears RAM
    fn reset(&mut self, hard: bool);

    /// Read from CPU space $4020-$FFFF
    fn cpu_read(&self, addr: u16) -> u8;

    /// Write to CPU space $4020-$FFFF
    fn cpu_write(&mut self, addr: u16, value: u8);

    /// Read from PPU space $0000-$3FFF (pattern tables and nametables)
    fn ppu_read(&self, addr: u16) -> u8;

    /// Write to PPU space $0000-$3FFF
    fn ppu_write(&mut self, addr: u16, value: u8);

    /// Observe an address the PPU drives onto its bus for a read
    ///
    /// Boards with a scanline counter watch pattern-table address line A12
    /// here. Everything else ignores it.
    fn ppu_address(&mut self, _addr: u16) {}

    /// Current nametable arrangement
    fn mirroring(&self) -> Mirroring;

    /// Level of the cartridge IRQ line
    fn irq_pending(&self) -> bool {
        false
    }

    /// PRG-RAM contents eligible for battery backup
    fn prg_ram(&self) -> Option<&[u8]> {
        None
    }

    /// Mutable PRG-RAM for battery restore
    fn prg_ram_mut(&mut self) -> Option<&mut [u8]> {
        None
    }

    /// Snapshot registers and RAM
    fn save_state(&self) -> MapperState;

    /// Restore a snapshot taken from the same board kind
    ///
    /// Implementations validate the snapshot fully before mutating anything.
    fn load_state(&mut self, state: &MapperState) -> Result<(), MapperError>;
}

/// Split CHR storage: ROM when the header declares banks, 8KB RAM otherwise
#[derive(Debug, Clone)]
pub(crate) struct ChrMemory {
    rom: Vec<u8>,
}

impl ChrMemory {
    pub(crate) fn new(rom: Vec<u8>) -> Self {
        ChrMemory { rom }
    }

    pub(crate) fn is_ram(&self) -> bool {
        self.rom.is_empty()
    }

    /// Read a byte from ROM at a physical offset, or from `ram` when the board has no ROM
    pub(crate) fn read(&self, ram: &[u8], offset: usize) -> u8 {
        if self.is_ram() {
            ram[offset % ram.len()]
        } else {
            self.rom[offset % self.rom.len()]
        }
    }

    /// Number of 1KB CHR units available (ROM or RAM)
    pub(crate) fn kilobytes(&self) -> usize {
        if self.is_ram() {
            CHR_BANK_SIZE / 0x400
        } else {
            self.rom.len() / 0x400
        }
    }
}
