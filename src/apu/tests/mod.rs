//! APU tests driven through the register interface

mod frame_counter_tests;
mod triangle_tests;

use crate::apu::Apu;

/// Clock the APU `cycles` times
pub(crate) fn run(apu: &mut Apu, cycles: u32) {
    for _ in 0..cycles {
        apu.step();
    }
}
