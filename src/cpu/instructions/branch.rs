// Branch instructions for 6502 CPU
// All eight conditional branches share one implementation; the condition is
// picked by the dispatcher. None of them modify flags.

use crate::cpu::addressing::AddressingResult;
use crate::cpu::Cpu;

impl Cpu {
    // ========================================
    // Branch Instructions
    // ========================================

    /// Take a relative branch if `condition` holds
    ///
    /// Cycles:
    /// - 2 cycles if branch not taken
    /// - 3 cycles if branch taken
    /// - 4 cycles if branch taken and crosses page boundary
    ///
    /// `addr_result` carries the target and whether it lies on a different
    /// page than the following instruction.
    pub fn branch(&mut self, condition: bool, addr_result: &AddressingResult) {
        if condition {
            self.cycles_left += 1;
            if addr_result.page_crossed {
                self.cycles_left += 1;
            }
            self.pc = addr_result.address;
        }
    }
}
