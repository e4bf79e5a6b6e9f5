// RAM module - CPU internal RAM implementation
//
// The 2KB internal RAM sits at $0000-$07FF and is mirrored three times
// at $0800-$0FFF, $1000-$17FF, and $1800-$1FFF.
//
// # Memory Layout
//
// ```text
// $0000-$07FF: 2KB internal RAM (actual physical memory)
// $0800-$1FFF: Mirrors of $0000-$07FF
// ```
//
// # Zero Page and Stack
//
// - Zero Page: $0000-$00FF - Fast access memory area with special addressing modes
// - Stack: $0100-$01FF - Hardware stack used by the 6502 processor

use crate::bus::MemoryMappedDevice;

/// Size of the internal RAM in bytes (2KB)
pub const RAM_SIZE: usize = 0x0800;

/// Mask for RAM address mirroring
const RAM_MIRROR_MASK: u16 = 0x07FF;

/// CPU internal RAM (2KB with mirroring)
///
/// Any address in $0000-$1FFF maps onto the same 2KB of physical memory.
/// Power-on contents are zero so runs are deterministic.
///
/// # Examples
///
/// ```
/// use nes_core::ram::Ram;
/// use nes_core::bus::MemoryMappedDevice;
///
/// let mut ram = Ram::new();
/// ram.write(0x0000, 0x42);
///
/// assert_eq!(ram.read(0x0800), 0x42);
/// assert_eq!(ram.read(0x1800), 0x42);
/// ```
#[derive(Clone)]
pub struct Ram {
    memory: [u8; RAM_SIZE],
}

impl Ram {
    /// Create a new zero-filled RAM
    pub fn new() -> Self {
        Ram {
            memory: [0x00; RAM_SIZE],
        }
    }

    /// Clear RAM to its power-on state
    pub fn clear(&mut self) {
        self.memory.fill(0x00);
    }

    /// Apply mirroring to an address
    #[inline]
    pub const fn mirror_address(addr: u16) -> u16 {
        addr & RAM_MIRROR_MASK
    }

    /// Side-effect-free read
    pub fn peek(&self, addr: u16) -> u8 {
        self.memory[Self::mirror_address(addr) as usize]
    }

    /// Physical contents, for save states
    pub fn as_slice(&self) -> &[u8] {
        &self.memory
    }

    /// Overwrite the physical contents
    ///
    /// Returns `false` without touching memory if `data` is not exactly 2KB.
    pub fn load(&mut self, data: &[u8]) -> bool {
        if data.len() != RAM_SIZE {
            return false;
        }
        self.memory.copy_from_slice(data);
        true
    }
}

impl MemoryMappedDevice for Ram {
    fn read(&mut self, addr: u16) -> u8 {
        self.peek(addr)
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.memory[Self::mirror_address(addr) as usize] = data;
    }
}

impl Default for Ram {
    fn default() -> Self {
        Self::new()
    }
}
