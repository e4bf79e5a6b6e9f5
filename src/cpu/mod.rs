// CPU module - 6502 processor implementation
//
// The CPU is stepped one cycle at a time. All of an instruction's bus
// traffic happens on its first cycle; the remaining cycles only count down.
// Interrupts are sampled when the next opcode is due.

pub mod addressing;
mod execute;
mod instructions;
pub mod opcodes;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::bus::Bus;

pub use addressing::{AddressingMode, AddressingResult};
pub use opcodes::{Instruction, OpcodeInfo, OPCODE_TABLE};

/// Processor Status Flags (P register)
///
/// Bit layout:
/// ```text
/// 7  6  5  4  3  2  1  0
/// N  V  -  B  D  I  Z  C
/// ```
///
/// - N: Negative flag (bit 7)
/// - V: Overflow flag (bit 6)
/// - -: Unused flag (bit 5, always 1)
/// - B: Break command flag (bit 4, only exists on the stack)
/// - D: Decimal mode flag (bit 3, no effect on the NES)
/// - I: Interrupt disable flag (bit 2)
/// - Z: Zero flag (bit 1)
/// - C: Carry flag (bit 0)
pub mod flags {
    pub const CARRY: u8 = 0b0000_0001; // Bit 0: C
    pub const ZERO: u8 = 0b0000_0010; // Bit 1: Z
    pub const INTERRUPT_DISABLE: u8 = 0b0000_0100; // Bit 2: I
    pub const DECIMAL: u8 = 0b0000_1000; // Bit 3: D (unused in NES)
    pub const BREAK: u8 = 0b0001_0000; // Bit 4: B
    pub const UNUSED: u8 = 0b0010_0000; // Bit 5: - (always 1)
    pub const OVERFLOW: u8 = 0b0100_0000; // Bit 6: V
    pub const NEGATIVE: u8 = 0b1000_0000; // Bit 7: N
}

/// Reset vector location
pub const RESET_VECTOR: u16 = 0xFFFC;
/// NMI vector location
pub const NMI_VECTOR: u16 = 0xFFFA;
/// IRQ/BRK vector location
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Cycles spent in the reset sequence before the first fetch
const RESET_CYCLES: i32 = 7;

/// Serializable CPU snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuState {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: u8,
    pub irq_pending: bool,
    pub nmi_pending: bool,
    pub cycles_left: i32,
    pub cycles: u64,
}

/// CPU structure representing the 6502 processor state
pub struct Cpu {
    // Registers
    pub a: u8,      // Accumulator
    pub x: u8,      // Index Register X
    pub y: u8,      // Index Register Y
    pub sp: u8,     // Stack Pointer
    pub pc: u16,    // Program Counter
    pub status: u8, // Processor Status flags

    /// IRQ line level, refreshed by the system every cycle
    pub irq_pending: bool,
    /// Edge-latched NMI request, cleared when the NMI is taken
    pub nmi_pending: bool,

    /// Cycles left in the current instruction
    pub(crate) cycles_left: i32,
    /// Total cycles executed since power-on
    pub cycles: u64,

    /// Emit a trace line through `log::trace!` before each instruction
    trace_enabled: bool,
    /// Unstable opcodes already reported
    warned_opcodes: HashSet<u8>,
}

impl Cpu {
    /// Create a new CPU instance in the power-on state
    ///
    /// The program counter is left at 0 until [`Cpu::reset`] loads the
    /// reset vector.
    pub fn new() -> Self {
        Cpu {
            a: 0,
            x: 0,
            y: 0,
            sp: 0xFD,
            pc: 0,
            status: flags::UNUSED | flags::INTERRUPT_DISABLE,
            irq_pending: false,
            nmi_pending: false,
            cycles_left: 0,
            cycles: 0,
            trace_enabled: false,
            warned_opcodes: HashSet::new(),
        }
    }

    /// Reset the CPU
    ///
    /// Clears A, X and Y, sets SP to $FD with only I set, drops pending
    /// interrupts and loads PC from the reset vector. The first opcode is
    /// fetched after 7 cycles.
    pub fn reset(&mut self, bus: &mut Bus) {
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.sp = 0xFD;
        self.status = flags::UNUSED | flags::INTERRUPT_DISABLE;
        self.irq_pending = false;
        self.nmi_pending = false;
        self.pc = bus.read_u16(RESET_VECTOR);
        self.cycles_left = RESET_CYCLES;
        self.cycles = 0;
    }

    /// Enable or disable per-instruction trace logging
    pub fn set_trace(&mut self, enabled: bool) {
        self.trace_enabled = enabled;
    }

    /// Whether the next `step` will start a new instruction
    pub fn at_instruction_boundary(&self) -> bool {
        self.cycles_left == 0
    }

    // ========================================
    // Status Flag Manipulation Methods
    // ========================================

    /// Get the value of a specific flag
    #[inline]
    pub fn get_flag(&self, flag: u8) -> bool {
        (self.status & flag) != 0
    }

    /// Set a specific flag to 1
    #[inline]
    pub fn set_flag(&mut self, flag: u8) {
        self.status |= flag;
    }

    /// Clear a specific flag (set to 0)
    #[inline]
    pub fn clear_flag(&mut self, flag: u8) {
        self.status &= !flag;
    }

    /// Update a flag based on a condition
    #[inline]
    pub fn update_flag(&mut self, flag: u8, condition: bool) {
        if condition {
            self.set_flag(flag);
        } else {
            self.clear_flag(flag);
        }
    }

    #[inline]
    pub fn get_carry(&self) -> bool {
        self.get_flag(flags::CARRY)
    }

    #[inline]
    pub fn get_zero(&self) -> bool {
        self.get_flag(flags::ZERO)
    }

    #[inline]
    pub fn get_interrupt_disable(&self) -> bool {
        self.get_flag(flags::INTERRUPT_DISABLE)
    }

    #[inline]
    pub fn get_decimal(&self) -> bool {
        self.get_flag(flags::DECIMAL)
    }

    #[inline]
    pub fn get_overflow(&self) -> bool {
        self.get_flag(flags::OVERFLOW)
    }

    #[inline]
    pub fn get_negative(&self) -> bool {
        self.get_flag(flags::NEGATIVE)
    }

    #[inline]
    pub fn set_carry(&mut self, value: bool) {
        self.update_flag(flags::CARRY, value);
    }

    #[inline]
    pub fn set_zero(&mut self, value: bool) {
        self.update_flag(flags::ZERO, value);
    }

    #[inline]
    pub fn set_interrupt_disable(&mut self, value: bool) {
        self.update_flag(flags::INTERRUPT_DISABLE, value);
    }

    #[inline]
    pub fn set_decimal(&mut self, value: bool) {
        self.update_flag(flags::DECIMAL, value);
    }

    #[inline]
    pub fn set_overflow(&mut self, value: bool) {
        self.update_flag(flags::OVERFLOW, value);
    }

    #[inline]
    pub fn set_negative(&mut self, value: bool) {
        self.update_flag(flags::NEGATIVE, value);
    }

    /// Update Zero and Negative flags based on a value
    #[inline]
    pub fn update_zero_and_negative_flags(&mut self, value: u8) {
        self.set_zero(value == 0);
        self.set_negative((value & 0x80) != 0);
    }

    /// Status byte as pushed to the stack
    #[inline]
    pub(crate) fn status_for_push(&self, brk: bool) -> u8 {
        let status = (self.status & !flags::BREAK) | flags::UNUSED;
        if brk {
            status | flags::BREAK
        } else {
            status
        }
    }

    /// Load the status register from a pulled byte; B and bit 5 are ignored
    #[inline]
    pub(crate) fn restore_status(&mut self, value: u8) {
        self.status = (value & !flags::BREAK) | flags::UNUSED;
    }

    // ========================================
    // Stack Helpers
    // ========================================

    /// Push a byte onto the stack at $0100 + SP
    #[inline]
    pub(crate) fn stack_push(&mut self, bus: &mut Bus, value: u8) {
        bus.write(0x0100 | self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    /// Pull a byte from the stack
    #[inline]
    pub(crate) fn stack_pop(&mut self, bus: &mut Bus) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        bus.read(0x0100 | self.sp as u16)
    }

    /// Push a word, high byte first
    #[inline]
    pub(crate) fn stack_push_u16(&mut self, bus: &mut Bus, value: u16) {
        self.stack_push(bus, (value >> 8) as u8);
        self.stack_push(bus, value as u8);
    }

    /// Pull a word, low byte first
    #[inline]
    pub(crate) fn stack_pop_u16(&mut self, bus: &mut Bus) -> u16 {
        let lo = self.stack_pop(bus) as u16;
        let hi = self.stack_pop(bus) as u16;
        (hi << 8) | lo
    }

    // ========================================
    // Save States
    // ========================================

    pub fn save_state(&self) -> CpuState {
        CpuState {
            a: self.a,
            x: self.x,
            y: self.y,
            sp: self.sp,
            pc: self.pc,
            status: self.status,
            irq_pending: self.irq_pending,
            nmi_pending: self.nmi_pending,
            cycles_left: self.cycles_left,
            cycles: self.cycles,
        }
    }

    /// Check a snapshot without applying it
    pub fn validate_state(state: &CpuState) -> Result<(), String> {
        if !(0..=16).contains(&state.cycles_left) {
            return Err(format!("cycles_left {} out of range", state.cycles_left));
        }
        Ok(())
    }

    pub fn load_state(&mut self, state: &CpuState) {
        self.a = state.a;
        self.x = state.x;
        self.y = state.y;
        self.sp = state.sp;
        self.pc = state.pc;
        self.status = state.status | flags::UNUSED;
        self.irq_pending = state.irq_pending;
        self.nmi_pending = state.nmi_pending;
        self.cycles_left = state.cycles_left;
        self.cycles = state.cycles;
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}
