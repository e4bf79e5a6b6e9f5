// Addressing modes module for 6502 CPU
// Resolves the 13 addressing modes into an effective address

use crate::bus::Bus;
use crate::cpu::Cpu;

/// Result of an addressing mode calculation
///
/// For branches `address` is the branch target, and `page_crossed` tells
/// whether the target lies on a different page than the next instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressingResult {
    /// The effective address where the data is located
    pub address: u16,

    /// Whether indexing moved the address onto another page
    pub page_crossed: bool,
}

impl AddressingResult {
    /// Create a new addressing result with an address
    pub fn new(address: u16) -> Self {
        Self {
            address,
            page_crossed: false,
        }
    }

    /// Set the page_crossed flag
    pub fn with_page_cross(mut self, crossed: bool) -> Self {
        self.page_crossed = crossed;
        self
    }
}

/// Addressing modes supported by the 6502
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    /// Implied - No operand (e.g., CLC, NOP)
    Implied,

    /// Accumulator - Operate on accumulator (e.g., LSR A)
    Accumulator,

    /// Immediate - 8-bit constant (e.g., LDA #$01)
    Immediate,

    /// Zero Page - 8-bit address in page 0 (e.g., LDA $00)
    ZeroPage,

    /// Zero Page,X - wraps within page 0 (e.g., LDA $00,X)
    ZeroPageX,

    /// Zero Page,Y - wraps within page 0 (e.g., LDX $00,Y)
    ZeroPageY,

    /// Relative - signed 8-bit branch offset (e.g., BEQ label)
    Relative,

    /// Absolute - full 16-bit address (e.g., JMP $1234)
    Absolute,

    /// Absolute,X (e.g., LDA $1234,X)
    AbsoluteX,

    /// Absolute,Y (e.g., LDA $1234,Y)
    AbsoluteY,

    /// Indirect - JMP only, with the page-wrap bug (e.g., JMP ($1234))
    Indirect,

    /// Indexed Indirect - (zp,X)
    IndexedIndirect,

    /// Indirect Indexed - (zp),Y
    IndirectIndexed,
}

impl AddressingMode {
    /// Operand bytes following the opcode
    pub const fn operand_bytes(self) -> u8 {
        match self {
            AddressingMode::Implied | AddressingMode::Accumulator => 0,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::Indirect => 2,
            _ => 1,
        }
    }
}

#[inline]
fn crosses_page(base: u16, addr: u16) -> bool {
    (base & 0xFF00) != (addr & 0xFF00)
}

impl Cpu {
    /// Fetch the byte at PC and advance PC
    #[inline]
    pub(crate) fn fetch_byte(&mut self, bus: &mut Bus) -> u8 {
        let value = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        value
    }

    /// Fetch a little-endian word at PC and advance PC by two
    #[inline]
    pub(crate) fn fetch_word(&mut self, bus: &mut Bus) -> u16 {
        let lo = self.fetch_byte(bus) as u16;
        let hi = self.fetch_byte(bus) as u16;
        (hi << 8) | lo
    }

    /// Read a pointer from zero page; the high byte wraps within page 0
    fn read_zero_page_pointer(&self, bus: &mut Bus, ptr: u8) -> u16 {
        let lo = bus.read(ptr as u16) as u16;
        let hi = bus.read(ptr.wrapping_add(1) as u16) as u16;
        (hi << 8) | lo
    }

    /// Resolve the operand of the current instruction
    ///
    /// PC must point just past the opcode; it is left pointing at the next
    /// instruction. Operand bytes and pointers are read through the bus.
    pub(crate) fn resolve_address(&mut self, mode: AddressingMode, bus: &mut Bus) -> AddressingResult {
        match mode {
            AddressingMode::Implied | AddressingMode::Accumulator => AddressingResult::new(0),
            AddressingMode::Immediate => {
                let addr = self.pc;
                self.pc = self.pc.wrapping_add(1);
                AddressingResult::new(addr)
            }
            AddressingMode::ZeroPage => AddressingResult::new(self.fetch_byte(bus) as u16),
            AddressingMode::ZeroPageX => {
                let base = self.fetch_byte(bus);
                AddressingResult::new(base.wrapping_add(self.x) as u16)
            }
            AddressingMode::ZeroPageY => {
                let base = self.fetch_byte(bus);
                AddressingResult::new(base.wrapping_add(self.y) as u16)
            }
            AddressingMode::Relative => {
                let offset = self.fetch_byte(bus) as i8;
                let target = self.pc.wrapping_add(offset as u16);
                AddressingResult::new(target).with_page_cross(crosses_page(self.pc, target))
            }
            AddressingMode::Absolute => AddressingResult::new(self.fetch_word(bus)),
            AddressingMode::AbsoluteX => {
                let base = self.fetch_word(bus);
                let addr = base.wrapping_add(self.x as u16);
                AddressingResult::new(addr).with_page_cross(crosses_page(base, addr))
            }
            AddressingMode::AbsoluteY => {
                let base = self.fetch_word(bus);
                let addr = base.wrapping_add(self.y as u16);
                AddressingResult::new(addr).with_page_cross(crosses_page(base, addr))
            }
            AddressingMode::Indirect => {
                let ptr = self.fetch_word(bus);
                // The high byte is fetched without carrying into the pointer's page
                let lo = bus.read(ptr) as u16;
                let hi = bus.read((ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF)) as u16;
                AddressingResult::new((hi << 8) | lo)
            }
            AddressingMode::IndexedIndirect => {
                let ptr = self.fetch_byte(bus).wrapping_add(self.x);
                AddressingResult::new(self.read_zero_page_pointer(bus, ptr))
            }
            AddressingMode::IndirectIndexed => {
                let ptr = self.fetch_byte(bus);
                let base = self.read_zero_page_pointer(bus, ptr);
                let addr = base.wrapping_add(self.y as u16);
                AddressingResult::new(addr).with_page_cross(crosses_page(base, addr))
            }
        }
    }
}
