// Opcode table for the 6502
//
// Every opcode value maps to an instruction, an addressing mode, a base cycle
// count and whether a page-crossing read costs an extra cycle. The table is
// laid out as three 16x16 grids (one row per high nibble) and folded into
// `OPCODE_TABLE` at compile time. NMI and IRQ are handled as two extra
// pseudo-operations outside the 256 real opcodes.

use super::addressing::AddressingMode;

/// Instruction identity, including the undocumented opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    // Documented
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,

    // Undocumented
    Kil,
    Slo,
    Rla,
    Sre,
    Rra,
    Sax,
    Lax,
    Dcp,
    Isc,
    Anc,
    Alr,
    Arr,
    Axs,
    Xaa,
    Lxa,
    Ahx,
    Tas,
    Shy,
    Shx,
    Las,

    // Interrupt sequences
    Nmi,
    Irq,
}

impl Instruction {
    /// Assembler mnemonic as printed in trace logs
    pub const fn mnemonic(self) -> &'static str {
        use Instruction::*;
        match self {
            Adc => "ADC",
            And => "AND",
            Asl => "ASL",
            Bcc => "BCC",
            Bcs => "BCS",
            Beq => "BEQ",
            Bit => "BIT",
            Bmi => "BMI",
            Bne => "BNE",
            Bpl => "BPL",
            Brk => "BRK",
            Bvc => "BVC",
            Bvs => "BVS",
            Clc => "CLC",
            Cld => "CLD",
            Cli => "CLI",
            Clv => "CLV",
            Cmp => "CMP",
            Cpx => "CPX",
            Cpy => "CPY",
            Dec => "DEC",
            Dex => "DEX",
            Dey => "DEY",
            Eor => "EOR",
            Inc => "INC",
            Inx => "INX",
            Iny => "INY",
            Jmp => "JMP",
            Jsr => "JSR",
            Lda => "LDA",
            Ldx => "LDX",
            Ldy => "LDY",
            Lsr => "LSR",
            Nop => "NOP",
            Ora => "ORA",
            Pha => "PHA",
            Php => "PHP",
            Pla => "PLA",
            Plp => "PLP",
            Rol => "ROL",
            Ror => "ROR",
            Rti => "RTI",
            Rts => "RTS",
            Sbc => "SBC",
            Sec => "SEC",
            Sed => "SED",
            Sei => "SEI",
            Sta => "STA",
            Stx => "STX",
            Sty => "STY",
            Tax => "TAX",
            Tay => "TAY",
            Tsx => "TSX",
            Txa => "TXA",
            Txs => "TXS",
            Tya => "TYA",
            Kil => "KIL",
            Slo => "SLO",
            Rla => "RLA",
            Sre => "SRE",
            Rra => "RRA",
            Sax => "SAX",
            Lax => "LAX",
            Dcp => "DCP",
            Isc => "ISB",
            Anc => "ANC",
            Alr => "ALR",
            Arr => "ARR",
            Axs => "AXS",
            Xaa => "XAA",
            Lxa => "LXA",
            Ahx => "AHX",
            Tas => "TAS",
            Shy => "SHY",
            Shx => "SHX",
            Las => "LAS",
            Nmi => "NMI",
            Irq => "IRQ",
        }
    }
}

/// Decoded opcode information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeInfo {
    pub instruction: Instruction,
    pub mode: AddressingMode,
    /// Base cycle count
    pub cycles: u8,
    /// Extra cycle when an indexed read crosses a page
    pub page_cycle: bool,
    /// Instruction length including the opcode byte
    pub bytes: u8,
    /// Part of the documented instruction set
    pub official: bool,
}

impl OpcodeInfo {
    pub const fn mnemonic(&self) -> &'static str {
        self.instruction.mnemonic()
    }
}

/// Pseudo-operation run in place of a fetched opcode when NMI is taken
pub const NMI_SEQUENCE: OpcodeInfo = OpcodeInfo {
    instruction: Instruction::Nmi,
    mode: AddressingMode::Implied,
    cycles: 7,
    page_cycle: false,
    bytes: 1,
    official: true,
};

/// Pseudo-operation run in place of a fetched opcode when IRQ is taken
pub const IRQ_SEQUENCE: OpcodeInfo = OpcodeInfo {
    instruction: Instruction::Irq,
    mode: AddressingMode::Implied,
    cycles: 7,
    page_cycle: false,
    bytes: 1,
    official: true,
};

/// Full 256-entry decode table
pub static OPCODE_TABLE: [OpcodeInfo; 256] = build_table();

// ========================================
// Table Data
// ========================================

type Mode = (AddressingMode, bool);

const IMP: Mode = (AddressingMode::Implied, false);
const ACC: Mode = (AddressingMode::Accumulator, false);
const IMM: Mode = (AddressingMode::Immediate, false);
const ZP_: Mode = (AddressingMode::ZeroPage, false);
const ZPX: Mode = (AddressingMode::ZeroPageX, false);
const ZPY: Mode = (AddressingMode::ZeroPageY, false);
const IZX: Mode = (AddressingMode::IndexedIndirect, false);
const IZY: Mode = (AddressingMode::IndirectIndexed, false);
const IYR: Mode = (AddressingMode::IndirectIndexed, true);
const ABS: Mode = (AddressingMode::Absolute, false);
const ABX: Mode = (AddressingMode::AbsoluteX, false);
const AXR: Mode = (AddressingMode::AbsoluteX, true);
const ABY: Mode = (AddressingMode::AbsoluteY, false);
const AYR: Mode = (AddressingMode::AbsoluteY, true);
const IND: Mode = (AddressingMode::Indirect, false);
const REL: Mode = (AddressingMode::Relative, false);

#[rustfmt::skip]
const MODES: [Mode; 256] = [
//  x0   x1   x2   x3   x4   x5   x6   x7   x8   x9   xA   xB   xC   xD   xE   xF
    IMP, IZX, IMP, IZX, ZP_, ZP_, ZP_, ZP_, IMP, IMM, ACC, IMM, ABS, ABS, ABS, ABS, // 0x
    REL, IYR, IMP, IZY, ZPX, ZPX, ZPX, ZPX, IMP, AYR, IMP, ABY, AXR, AXR, ABX, ABX, // 1x
    ABS, IZX, IMP, IZX, ZP_, ZP_, ZP_, ZP_, IMP, IMM, ACC, IMM, ABS, ABS, ABS, ABS, // 2x
    REL, IYR, IMP, IZY, ZPX, ZPX, ZPX, ZPX, IMP, AYR, IMP, ABY, AXR, AXR, ABX, ABX, // 3x
    IMP, IZX, IMP, IZX, ZP_, ZP_, ZP_, ZP_, IMP, IMM, ACC, IMM, ABS, ABS, ABS, ABS, // 4x
    REL, IYR, IMP, IZY, ZPX, ZPX, ZPX, ZPX, IMP, AYR, IMP, ABY, AXR, AXR, ABX, ABX, // 5x
    IMP, IZX, IMP, IZX, ZP_, ZP_, ZP_, ZP_, IMP, IMM, ACC, IMM, IND, ABS, ABS, ABS, // 6x
    REL, IYR, IMP, IZY, ZPX, ZPX, ZPX, ZPX, IMP, AYR, IMP, ABY, AXR, AXR, ABX, ABX, // 7x
    IMM, IZX, IMM, IZX, ZP_, ZP_, ZP_, ZP_, IMP, IMM, IMP, IMM, ABS, ABS, ABS, ABS, // 8x
    REL, IZY, IMP, IZY, ZPX, ZPX, ZPY, ZPY, IMP, ABY, IMP, ABY, ABX, ABX, ABY, ABY, // 9x
    IMM, IZX, IMM, IZX, ZP_, ZP_, ZP_, ZP_, IMP, IMM, IMP, IMM, ABS, ABS, ABS, ABS, // Ax
    REL, IYR, IMP, IYR, ZPX, ZPX, ZPY, ZPY, IMP, AYR, IMP, AYR, AXR, AXR, AYR, AYR, // Bx
    IMM, IZX, IMM, IZX, ZP_, ZP_, ZP_, ZP_, IMP, IMM, IMP, IMM, ABS, ABS, ABS, ABS, // Cx
    REL, IYR, IMP, IZY, ZPX, ZPX, ZPX, ZPX, IMP, AYR, IMP, ABY, AXR, AXR, ABX, ABX, // Dx
    IMM, IZX, IMM, IZX, ZP_, ZP_, ZP_, ZP_, IMP, IMM, IMP, IMM, ABS, ABS, ABS, ABS, // Ex
    REL, IYR, IMP, IZY, ZPX, ZPX, ZPX, ZPX, IMP, AYR, IMP, ABY, AXR, AXR, ABX, ABX, // Fx
];

#[rustfmt::skip]
const CYCLES: [u8; 256] = [
//  x0 x1 x2 x3 x4 x5 x6 x7 x8 x9 xA xB xC xD xE xF
    7, 6, 2, 8, 3, 3, 5, 5, 3, 2, 2, 2, 4, 4, 6, 6, // 0x
    2, 5, 2, 8, 4, 4, 6, 6, 2, 4, 2, 7, 4, 4, 7, 7, // 1x
    6, 6, 2, 8, 3, 3, 5, 5, 4, 2, 2, 2, 4, 4, 6, 6, // 2x
    2, 5, 2, 8, 4, 4, 6, 6, 2, 4, 2, 7, 4, 4, 7, 7, // 3x
    6, 6, 2, 8, 3, 3, 5, 5, 3, 2, 2, 2, 3, 4, 6, 6, // 4x
    2, 5, 2, 8, 4, 4, 6, 6, 2, 4, 2, 7, 4, 4, 7, 7, // 5x
    6, 6, 2, 8, 3, 3, 5, 5, 4, 2, 2, 2, 5, 4, 6, 6, // 6x
    2, 5, 2, 8, 4, 4, 6, 6, 2, 4, 2, 7, 4, 4, 7, 7, // 7x
    2, 6, 2, 6, 3, 3, 3, 3, 2, 2, 2, 2, 4, 4, 4, 4, // 8x
    2, 6, 2, 6, 4, 4, 4, 4, 2, 5, 2, 5, 5, 5, 5, 5, // 9x
    2, 6, 2, 6, 3, 3, 3, 3, 2, 2, 2, 2, 4, 4, 4, 4, // Ax
    2, 5, 2, 5, 4, 4, 4, 4, 2, 4, 2, 4, 4, 4, 4, 4, // Bx
    2, 6, 2, 8, 3, 3, 5, 5, 2, 2, 2, 2, 4, 4, 6, 6, // Cx
    2, 5, 2, 8, 4, 4, 6, 6, 2, 4, 2, 7, 4, 4, 7, 7, // Dx
    2, 6, 2, 8, 3, 3, 5, 5, 2, 2, 2, 2, 4, 4, 6, 6, // Ex
    2, 5, 2, 8, 4, 4, 6, 6, 2, 4, 2, 7, 4, 4, 7, 7, // Fx
];

#[rustfmt::skip]
const INSTRUCTIONS: [Instruction; 256] = {
    use Instruction::*;
    [
//  x0   x1   x2   x3   x4   x5   x6   x7   x8   x9   xA   xB   xC   xD   xE   xF
    Brk, Ora, Kil, Slo, Nop, Ora, Asl, Slo, Php, Ora, Asl, Anc, Nop, Ora, Asl, Slo, // 0x
    Bpl, Ora, Kil, Slo, Nop, Ora, Asl, Slo, Clc, Ora, Nop, Slo, Nop, Ora, Asl, Slo, // 1x
    Jsr, And, Kil, Rla, Bit, And, Rol, Rla, Plp, And, Rol, Anc, Bit, And, Rol, Rla, // 2x
    Bmi, And, Kil, Rla, Nop, And, Rol, Rla, Sec, And, Nop, Rla, Nop, And, Rol, Rla, // 3x
    Rti, Eor, Kil, Sre, Nop, Eor, Lsr, Sre, Pha, Eor, Lsr, Alr, Jmp, Eor, Lsr, Sre, // 4x
    Bvc, Eor, Kil, Sre, Nop, Eor, Lsr, Sre, Cli, Eor, Nop, Sre, Nop, Eor, Lsr, Sre, // 5x
    Rts, Adc, Kil, Rra, Nop, Adc, Ror, Rra, Pla, Adc, Ror, Arr, Jmp, Adc, Ror, Rra, // 6x
    Bvs, Adc, Kil, Rra, Nop, Adc, Ror, Rra, Sei, Adc, Nop, Rra, Nop, Adc, Ror, Rra, // 7x
    Nop, Sta, Nop, Sax, Sty, Sta, Stx, Sax, Dey, Nop, Txa, Xaa, Sty, Sta, Stx, Sax, // 8x
    Bcc, Sta, Kil, Ahx, Sty, Sta, Stx, Sax, Tya, Sta, Txs, Tas, Shy, Sta, Shx, Ahx, // 9x
    Ldy, Lda, Ldx, Lax, Ldy, Lda, Ldx, Lax, Tay, Lda, Tax, Lxa, Ldy, Lda, Ldx, Lax, // Ax
    Bcs, Lda, Kil, Lax, Ldy, Lda, Ldx, Lax, Clv, Lda, Tsx, Las, Ldy, Lda, Ldx, Lax, // Bx
    Cpy, Cmp, Nop, Dcp, Cpy, Cmp, Dec, Dcp, Iny, Cmp, Dex, Axs, Cpy, Cmp, Dec, Dcp, // Cx
    Bne, Cmp, Kil, Dcp, Nop, Cmp, Dec, Dcp, Cld, Cmp, Nop, Dcp, Nop, Cmp, Dec, Dcp, // Dx
    Cpx, Sbc, Nop, Isc, Cpx, Sbc, Inc, Isc, Inx, Sbc, Nop, Sbc, Cpx, Sbc, Inc, Isc, // Ex
    Beq, Sbc, Kil, Isc, Nop, Sbc, Inc, Isc, Sed, Sbc, Nop, Isc, Nop, Sbc, Inc, Isc, // Fx
    ]
};

/// Whether an opcode belongs to the documented set
const fn is_official(opcode: usize, instruction: Instruction) -> bool {
    use Instruction::*;
    match instruction {
        Nop => opcode == 0xEA,
        Sbc => opcode != 0xEB,
        Kil | Slo | Rla | Sre | Rra | Sax | Lax | Dcp | Isc | Anc | Alr | Arr | Axs | Xaa
        | Lxa | Ahx | Tas | Shy | Shx | Las => false,
        _ => true,
    }
}

const fn build_table() -> [OpcodeInfo; 256] {
    let mut table = [NMI_SEQUENCE; 256];
    let mut opcode = 0;
    while opcode < 256 {
        let (mode, page_cycle) = MODES[opcode];
        let instruction = INSTRUCTIONS[opcode];
        table[opcode] = OpcodeInfo {
            instruction,
            mode,
            cycles: CYCLES[opcode],
            page_cycle,
            bytes: mode.operand_bytes() + 1,
            official: is_official(opcode, instruction),
        };
        opcode += 1;
    }
    table
}
