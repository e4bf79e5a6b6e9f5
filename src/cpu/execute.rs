// CPU execution and trace logging module

use crate::bus::Bus;
use crate::cpu::addressing::{AddressingMode, AddressingResult};
use crate::cpu::opcodes::{Instruction, OpcodeInfo, IRQ_SEQUENCE, NMI_SEQUENCE, OPCODE_TABLE};
use crate::cpu::Cpu;

impl Cpu {
    /// Advance the CPU by one cycle
    ///
    /// When no cycles remain from the previous instruction, the pending
    /// interrupts are sampled and the next opcode (or interrupt sequence) is
    /// fetched and executed in full. Its cycle cost is then paid out one
    /// `step` at a time.
    pub fn step(&mut self, bus: &mut Bus) {
        if self.cycles_left == 0 {
            self.begin_instruction(bus);
        }
        self.cycles_left -= 1;
        self.cycles = self.cycles.wrapping_add(1);
    }

    /// Run cycles until the current instruction finishes and the next one
    /// has been executed. Returns the number of cycles that took.
    pub fn step_instruction(&mut self, bus: &mut Bus) -> u32 {
        let mut cycles = 0;
        // Finish whatever is in flight first
        while self.cycles_left > 0 {
            self.step(bus);
            cycles += 1;
        }
        self.step(bus);
        cycles += 1;
        while self.cycles_left > 0 {
            self.step(bus);
            cycles += 1;
        }
        cycles
    }

    fn begin_instruction(&mut self, bus: &mut Bus) {
        let interrupt = self.nmi_pending || (self.irq_pending && !self.get_interrupt_disable());

        if !interrupt && self.trace_enabled {
            log::trace!("{}", self.trace(bus));
        }

        let start_pc = self.pc;
        let opcode = self.fetch_byte(bus);
        let info: &OpcodeInfo = if interrupt {
            // The fetched opcode is discarded
            self.pc = start_pc;
            if self.nmi_pending {
                self.nmi_pending = false;
                &NMI_SEQUENCE
            } else {
                &IRQ_SEQUENCE
            }
        } else {
            &OPCODE_TABLE[opcode as usize]
        };

        self.cycles_left = info.cycles as i32;
        let result = self.resolve_address(info.mode, bus);
        if info.page_cycle && result.page_crossed {
            self.cycles_left += 1;
        }
        self.execute_instruction(opcode, info, &result, bus);
    }

    /// Execute a decoded instruction
    #[allow(clippy::too_many_lines)]
    fn execute_instruction(
        &mut self,
        opcode: u8,
        info: &OpcodeInfo,
        addr_result: &AddressingResult,
        bus: &mut Bus,
    ) {
        let accumulator = info.mode == AddressingMode::Accumulator;

        match info.instruction {
            // Load/Store instructions
            Instruction::Lda => self.lda(bus, addr_result),
            Instruction::Ldx => self.ldx(bus, addr_result),
            Instruction::Ldy => self.ldy(bus, addr_result),
            Instruction::Sta => self.sta(bus, addr_result),
            Instruction::Stx => self.stx(bus, addr_result),
            Instruction::Sty => self.sty(bus, addr_result),

            // Arithmetic instructions
            Instruction::Adc => self.adc(bus, addr_result),
            Instruction::Sbc => self.sbc(bus, addr_result),
            Instruction::Inc => self.inc(bus, addr_result),
            Instruction::Inx => self.inx(),
            Instruction::Iny => self.iny(),
            Instruction::Dec => self.dec(bus, addr_result),
            Instruction::Dex => self.dex(),
            Instruction::Dey => self.dey(),

            // Logical instructions
            Instruction::And => self.and(bus, addr_result),
            Instruction::Ora => self.ora(bus, addr_result),
            Instruction::Eor => self.eor(bus, addr_result),
            Instruction::Bit => self.bit(bus, addr_result),

            // Shift/Rotate instructions
            Instruction::Asl => self.asl(bus, addr_result, accumulator),
            Instruction::Lsr => self.lsr(bus, addr_result, accumulator),
            Instruction::Rol => self.rol(bus, addr_result, accumulator),
            Instruction::Ror => self.ror(bus, addr_result, accumulator),

            // Compare instructions
            Instruction::Cmp => self.cmp(bus, addr_result),
            Instruction::Cpx => self.cpx(bus, addr_result),
            Instruction::Cpy => self.cpy(bus, addr_result),

            // Branch instructions
            Instruction::Bcc => self.branch(!self.get_carry(), addr_result),
            Instruction::Bcs => self.branch(self.get_carry(), addr_result),
            Instruction::Beq => self.branch(self.get_zero(), addr_result),
            Instruction::Bne => self.branch(!self.get_zero(), addr_result),
            Instruction::Bmi => self.branch(self.get_negative(), addr_result),
            Instruction::Bpl => self.branch(!self.get_negative(), addr_result),
            Instruction::Bvc => self.branch(!self.get_overflow(), addr_result),
            Instruction::Bvs => self.branch(self.get_overflow(), addr_result),

            // Jump/Subroutine instructions
            Instruction::Jmp => self.jmp(addr_result),
            Instruction::Jsr => self.jsr(bus, addr_result),
            Instruction::Rts => self.rts(bus),

            // Stack instructions
            Instruction::Pha => self.pha(bus),
            Instruction::Pla => self.pla(bus),
            Instruction::Php => self.php(bus),
            Instruction::Plp => self.plp(bus),

            // Transfer instructions
            Instruction::Tax => self.tax(),
            Instruction::Tay => self.tay(),
            Instruction::Txa => self.txa(),
            Instruction::Tya => self.tya(),
            Instruction::Tsx => self.tsx(),
            Instruction::Txs => self.txs(),

            // Flag instructions
            Instruction::Clc => self.set_carry(false),
            Instruction::Cld => self.set_decimal(false),
            Instruction::Cli => self.set_interrupt_disable(false),
            Instruction::Clv => self.set_overflow(false),
            Instruction::Sec => self.set_carry(true),
            Instruction::Sed => self.set_decimal(true),
            Instruction::Sei => self.set_interrupt_disable(true),

            // Interrupts and miscellaneous
            Instruction::Brk => self.brk(bus),
            Instruction::Rti => self.rti(bus),
            Instruction::Nmi => self.interrupt(bus, super::NMI_VECTOR),
            Instruction::Irq => self.interrupt(bus, super::IRQ_VECTOR),
            Instruction::Nop => {}
            Instruction::Kil => self.kil(),

            // Undocumented instructions
            Instruction::Slo => self.slo(bus, addr_result),
            Instruction::Rla => self.rla(bus, addr_result),
            Instruction::Sre => self.sre(bus, addr_result),
            Instruction::Rra => self.rra(bus, addr_result),
            Instruction::Sax => self.sax(bus, addr_result),
            Instruction::Lax => self.lax(bus, addr_result),
            Instruction::Dcp => self.dcp(bus, addr_result),
            Instruction::Isc => self.isc(bus, addr_result),
            Instruction::Anc => self.anc(bus, addr_result),
            Instruction::Alr => self.alr(bus, addr_result),
            Instruction::Arr => self.arr(bus, addr_result),
            Instruction::Axs => self.axs(bus, addr_result),
            Instruction::Ahx => self.ahx(bus, addr_result),
            Instruction::Tas => self.tas(bus, addr_result),
            Instruction::Shy => self.shy(bus, addr_result),
            Instruction::Shx => self.shx(bus, addr_result),
            Instruction::Las => self.las(bus, addr_result),
            Instruction::Xaa | Instruction::Lxa => self.unstable(opcode, info),
        }
    }

    /// Report an unstable opcode once and otherwise treat it as a NOP
    fn unstable(&mut self, opcode: u8, info: &OpcodeInfo) {
        if self.warned_opcodes.insert(opcode) {
            log::warn!(
                "unstable opcode ${:02X} ({}) at ${:04X} executed as NOP",
                opcode,
                info.mnemonic(),
                self.pc.wrapping_sub(info.bytes as u16)
            );
        }
    }

    /// Generate a trace log line in Nestest format
    ///
    /// Format: PC  OP OP OP  MNEMONIC $ADDR    A:XX X:XX Y:XX P:XX SP:XX CYC:XXXX
    /// Example: C000  4C F5 C5  JMP $C5F5                       A:00 X:00 Y:00 P:24 SP:FD CYC:7
    ///
    /// Undocumented opcodes are marked with `*` in front of the mnemonic.
    /// Memory is inspected with side-effect-free peeks.
    pub fn trace(&self, bus: &Bus) -> String {
        let pc = self.pc;
        let opcode = bus.peek(pc);
        let opcode_info = &OPCODE_TABLE[opcode as usize];

        let byte2 = bus.peek(pc.wrapping_add(1));
        let byte3 = bus.peek(pc.wrapping_add(2));

        let hex_bytes = match opcode_info.bytes {
            2 => format!("{:02X} {:02X}", opcode, byte2),
            3 => format!("{:02X} {:02X} {:02X}", opcode, byte2, byte3),
            _ => format!("{:02X}", opcode),
        };

        let disassembly = self.disassemble_instruction(pc, bus, opcode_info, byte2, byte3);
        let marker = if opcode_info.official { ' ' } else { '*' };

        format!(
            "{:04X}  {:<8} {}{:<32}A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
            pc,
            hex_bytes,
            marker,
            disassembly,
            self.a,
            self.x,
            self.y,
            self.status,
            self.sp,
            self.cycles
        )
    }

    /// Disassemble an instruction into human-readable format
    fn disassemble_instruction(
        &self,
        pc: u16,
        bus: &Bus,
        opcode_info: &OpcodeInfo,
        byte2: u8,
        byte3: u8,
    ) -> String {
        let mnemonic = opcode_info.mnemonic();

        match opcode_info.mode {
            AddressingMode::Implied => mnemonic.to_string(),
            AddressingMode::Accumulator => format!("{} A", mnemonic),
            AddressingMode::Immediate => format!("{} #${:02X}", mnemonic, byte2),
            AddressingMode::ZeroPage => {
                let value = bus.peek(byte2 as u16);
                format!("{} ${:02X} = {:02X}", mnemonic, byte2, value)
            }
            AddressingMode::ZeroPageX => {
                let addr = byte2.wrapping_add(self.x);
                let value = bus.peek(addr as u16);
                format!("{} ${:02X},X @ {:02X} = {:02X}", mnemonic, byte2, addr, value)
            }
            AddressingMode::ZeroPageY => {
                let addr = byte2.wrapping_add(self.y);
                let value = bus.peek(addr as u16);
                format!("{} ${:02X},Y @ {:02X} = {:02X}", mnemonic, byte2, addr, value)
            }
            AddressingMode::Relative => {
                let target = pc.wrapping_add(2).wrapping_add(byte2 as i8 as u16);
                format!("{} ${:04X}", mnemonic, target)
            }
            AddressingMode::Absolute => {
                let addr = u16::from_le_bytes([byte2, byte3]);
                match opcode_info.instruction {
                    Instruction::Jmp | Instruction::Jsr => format!("{} ${:04X}", mnemonic, addr),
                    _ => format!("{} ${:04X} = {:02X}", mnemonic, addr, bus.peek(addr)),
                }
            }
            AddressingMode::AbsoluteX => {
                let base = u16::from_le_bytes([byte2, byte3]);
                let addr = base.wrapping_add(self.x as u16);
                let value = bus.peek(addr);
                format!("{} ${:04X},X @ {:04X} = {:02X}", mnemonic, base, addr, value)
            }
            AddressingMode::AbsoluteY => {
                let base = u16::from_le_bytes([byte2, byte3]);
                let addr = base.wrapping_add(self.y as u16);
                let value = bus.peek(addr);
                format!("{} ${:04X},Y @ {:04X} = {:02X}", mnemonic, base, addr, value)
            }
            AddressingMode::Indirect => {
                let ptr = u16::from_le_bytes([byte2, byte3]);
                let lo = bus.peek(ptr);
                let hi = bus.peek((ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF));
                let target = u16::from_le_bytes([lo, hi]);
                format!("{} (${:04X}) = {:04X}", mnemonic, ptr, target)
            }
            AddressingMode::IndexedIndirect => {
                let ptr = byte2.wrapping_add(self.x);
                let lo = bus.peek(ptr as u16);
                let hi = bus.peek(ptr.wrapping_add(1) as u16);
                let addr = u16::from_le_bytes([lo, hi]);
                format!(
                    "{} (${:02X},X) @ {:02X} = {:04X} = {:02X}",
                    mnemonic,
                    byte2,
                    ptr,
                    addr,
                    bus.peek(addr)
                )
            }
            AddressingMode::IndirectIndexed => {
                let lo = bus.peek(byte2 as u16);
                let hi = bus.peek(byte2.wrapping_add(1) as u16);
                let base = u16::from_le_bytes([lo, hi]);
                let addr = base.wrapping_add(self.y as u16);
                format!(
                    "{} (${:02X}),Y = {:04X} @ {:04X} = {:02X}",
                    mnemonic,
                    byte2,
                    base,
                    addr,
                    bus.peek(addr)
                )
            }
        }
    }
}
