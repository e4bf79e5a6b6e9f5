// NSF module - NES Sound Format header parsing
//
// # NSF Layout
//
// ```text
// $00-$04: "NESM" followed by MS-DOS EOF ($1A)
// $05:     Version (only 1 is supported)
// $06:     Total songs
// $07:     Starting song (1-based)
// $08-$09: Load address
// $0A-$0B: Init address
// $0C-$0D: Play address
// $0E-$2D: Song name, NUL-terminated
// $2E-$4D: Artist
// $4E-$6D: Copyright
// $6E-$6F: NTSC play speed in microseconds
// $70-$77: Initial bank values (all zero = not bank-switched)
// $78-$79: PAL play speed
// $7A:     Region (bit 0 PAL, bit 1 dual)
// $7B:     Extra sound chips
// $80-:    Program data
// ```

/// NSF magic bytes
const NSF_MAGIC: [u8; 5] = [0x4E, 0x45, 0x53, 0x4D, 0x1A];

/// Header size in bytes; program data starts here
pub const NSF_HEADER_SIZE: usize = 0x80;

/// Length of each text tag field
const TAG_SIZE: usize = 32;

/// Errors raised while loading or playing an NSF file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NsfError {
    /// File is smaller than the 128-byte header
    TooShort(usize),
    /// First five bytes are not "NESM\x1A"
    InvalidMagic,
    /// Only version 1 files are understood
    UnsupportedVersion(u8),
    /// Program data must load into $8000-$FFFF
    UnsupportedLoadAddress(u16),
    /// Header declares zero songs
    NoSongs,
    /// Song number outside 1..=total
    SongOutOfRange { song: u8, total: u8 },
    /// No NSF file loaded
    NotLoaded,
}

impl std::fmt::Display for NsfError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NsfError::TooShort(len) => {
                write!(f, "NSF file is {} bytes, smaller than its header", len)
            }
            NsfError::InvalidMagic => write!(f, "Missing NSF magic bytes"),
            NsfError::UnsupportedVersion(v) => write!(f, "Unknown NSF version: {}", v),
            NsfError::UnsupportedLoadAddress(addr) => write!(
                f,
                "Load address ${:04X} is below $8000 and not supported",
                addr
            ),
            NsfError::NoSongs => write!(f, "NSF file contains no songs"),
            NsfError::SongOutOfRange { song, total } => {
                write!(f, "Song {} does not exist (file has {})", song, total)
            }
            NsfError::NotLoaded => write!(f, "No NSF file loaded"),
        }
    }
}

impl std::error::Error for NsfError {}

/// Parsed NSF header fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NsfHeader {
    pub version: u8,
    pub total_songs: u8,
    /// 1-based
    pub start_song: u8,
    pub load_addr: u16,
    pub init_addr: u16,
    pub play_addr: u16,
    pub name: String,
    pub artist: String,
    pub copyright: String,
    /// Play routine period in microseconds (NTSC)
    pub ntsc_speed: u16,
    /// Initial values for the eight 4KB bank registers
    pub banks: [u8; 8],
    /// Region byte: bit 0 PAL, bit 1 dual
    pub region: u8,
    /// Expansion audio chips the file expects
    pub extra_chips: u8,
}

impl NsfHeader {
    /// Parse the 128-byte header at the start of a file
    ///
    /// # Errors
    /// Returns an [`NsfError`] for short files, bad magic, versions other
    /// than 1, load addresses below $8000 and files with no songs.
    pub fn parse(data: &[u8]) -> Result<Self, NsfError> {
        if data.len() < NSF_HEADER_SIZE {
            return Err(NsfError::TooShort(data.len()));
        }
        if data[0..5] != NSF_MAGIC {
            return Err(NsfError::InvalidMagic);
        }
        if data[5] != 1 {
            return Err(NsfError::UnsupportedVersion(data[5]));
        }

        let word = |offset: usize| u16::from_le_bytes([data[offset], data[offset + 1]]);
        let load_addr = word(0x08);
        if load_addr < 0x8000 {
            return Err(NsfError::UnsupportedLoadAddress(load_addr));
        }
        if data[6] == 0 {
            return Err(NsfError::NoSongs);
        }

        let mut banks = [0u8; 8];
        banks.copy_from_slice(&data[0x70..0x78]);

        Ok(NsfHeader {
            version: data[5],
            total_songs: data[6],
            start_song: data[7],
            load_addr,
            init_addr: word(0x0A),
            play_addr: word(0x0C),
            name: read_tag(&data[0x0E..0x0E + TAG_SIZE]),
            artist: read_tag(&data[0x2E..0x2E + TAG_SIZE]),
            copyright: read_tag(&data[0x4E..0x4E + TAG_SIZE]),
            ntsc_speed: word(0x6E),
            banks,
            region: data[0x7A],
            extra_chips: data[0x7B],
        })
    }

    /// Any nonzero initial bank value turns on bank switching
    pub fn is_banked(&self) -> bool {
        self.banks.iter().any(|&bank| bank != 0)
    }

    /// Whether the file is meant for PAL machines only
    pub fn is_pal_only(&self) -> bool {
        self.region & 0x03 == 0x01
    }

    /// Starting song clamped into 1..=total
    pub fn first_song(&self) -> u8 {
        self.start_song.clamp(1, self.total_songs)
    }
}

/// Tag text up to the first NUL, one character per byte
fn read_tag(field: &[u8]) -> String {
    field
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| b as char)
        .collect()
}
