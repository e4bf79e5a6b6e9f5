// Emulator module - Main emulator coordinator
//
// The Emulator owns the CPU and the Bus (which owns everything else) and is
// the only thing that steps them. One `tick` is one PPU dot; every third dot
// also carries a CPU (or DMA) cycle and an APU cycle, in the fixed order
// below. The order matters: a register write made by the CPU in a cycle is
// seen by the APU in that same cycle and by the PPU on the dots that follow.
//
// ```text
// every 3rd dot:  controller latch -> IRQ line -> CPU or DMA -> APU + DMC fetch
// every dot:      PPU -> NMI to CPU
// ```

mod config;
mod nsf_player;
mod save_state;

pub use config::{
    AudioConfig, ConfigError, DebugConfig, EmulatorConfig, DEFAULT_SAMPLES_PER_FRAME,
};
pub use nsf_player::NsfPlayer;
pub use save_state::{SaveState, SaveStateError, SAVE_STATE_VERSION};

use crate::bus::Bus;
use crate::cartridge::{create_mapper, Cartridge, INesError, INesHeader, MapperError};
use crate::cpu::Cpu;
use crate::input::{Button, Player};
use crate::palette;

/// CPU cycles the audio averaging spreads over one frame
const CPU_CYCLES_PER_FRAME: f64 = 29780.0;

/// Main emulator structure
///
/// Coordinates all NES components and exposes the surface a host needs:
/// ROM loading, stepping, video and audio output, input, battery RAM and
/// save states. File I/O and presentation are left to the host.
pub struct Emulator {
    /// CPU (6502 processor)
    cpu: Cpu,

    /// Bus (connects all components)
    bus: Bus,

    /// Header of the loaded cartridge, if any
    header: Option<INesHeader>,

    /// Configuration
    config: EmulatorConfig,

    /// Output of the last `drain_audio_samples`
    audio_out: Vec<f64>,
}

impl Emulator {
    /// Create a new emulator with the default configuration
    ///
    /// # Example
    ///
    /// ```
    /// use nes_core::emulator::Emulator;
    ///
    /// let mut emulator = Emulator::new();
    /// emulator.run_frame(); // no cartridge: nothing happens
    /// ```
    pub fn new() -> Self {
        Self::with_config(EmulatorConfig::default())
    }

    pub fn with_config(config: EmulatorConfig) -> Self {
        let mut cpu = Cpu::new();
        cpu.set_trace(config.debug.trace_cpu);
        Emulator {
            cpu,
            bus: Bus::new(),
            header: None,
            config,
            audio_out: Vec::new(),
        }
    }

    /// Load an iNES image and hard-reset
    ///
    /// On error the previous cartridge (if any) stays inserted and the
    /// machine is left as it was.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use nes_core::emulator::Emulator;
    ///
    /// let rom = std::fs::read("game.nes").expect("Failed to read ROM");
    /// let mut emulator = Emulator::new();
    /// emulator.load_rom(&rom).expect("Failed to load ROM");
    /// ```
    pub fn load_rom(&mut self, data: &[u8]) -> Result<(), INesError> {
        let cartridge = Cartridge::from_bytes(data)?;
        let header = cartridge.header;
        let mapper = create_mapper(cartridge)?;

        log::info!(
            "Loaded {} ROM: {}x16KB PRG, {}x8KB CHR{}, {:?} mirroring{}",
            mapper.name(),
            header.prg_banks,
            header.chr_banks,
            if header.chr_banks == 0 { " (RAM)" } else { "" },
            header.mirroring,
            if header.battery { ", battery" } else { "" }
        );

        self.bus.set_mapper(mapper);
        self.header = Some(header);
        self.reset(true);
        Ok(())
    }

    /// Reset the machine
    ///
    /// A hard reset is a power cycle and also clears work RAM and cartridge
    /// RAM. Does nothing without a cartridge.
    pub fn reset(&mut self, hard: bool) {
        if self.header.is_none() {
            return;
        }
        log::debug!("{} reset", if hard { "Hard" } else { "Soft" });
        self.bus.reset(hard);
        self.cpu.reset(&mut self.bus);
        self.audio_out.clear();
    }

    // ========================================
    // Stepping
    // ========================================

    /// Advance one PPU dot
    fn tick(&mut self) {
        if self.bus.begin_dot() {
            self.bus.poll_controllers();
            self.cpu.irq_pending = self.bus.irq_line();
            if self.bus.is_dma_active() {
                self.bus.step_dma();
            } else {
                self.cpu.step(&mut self.bus);
            }
            self.bus.step_apu();
        }
        if self.bus.step_ppu() {
            self.cpu.nmi_pending = true;
        }
    }

    /// Advance one CPU cycle (three PPU dots)
    pub fn step_cycle(&mut self) {
        if self.header.is_none() {
            return;
        }
        for _ in 0..3 {
            self.tick();
        }
    }

    /// Run until the PPU finishes the visible part of a frame
    ///
    /// Returns with the PPU at scanline 240, dot 0.
    pub fn run_frame(&mut self) {
        if self.header.is_none() {
            return;
        }
        loop {
            self.tick();
            if self.bus.ppu_mut().take_frame_complete() {
                break;
            }
        }
    }

    // ========================================
    // Video and Audio
    // ========================================

    /// 256x240 packed pixels: bits 0-5 palette index, bits 6-8 emphasis
    pub fn read_framebuffer(&self) -> &[u16] {
        self.bus.ppu().framebuffer()
    }

    /// Convert the framebuffer to RGBA bytes
    pub fn render_rgba(&self, output: &mut [u8]) {
        palette::render_rgba(self.bus.ppu().framebuffer(), output);
    }

    /// Average the raw per-cycle samples down to `count` values and clear
    /// the APU's buffer
    ///
    /// Each output value averages the next `29780 / count` raw samples (the
    /// fraction carried into the next value). Slots past the samples
    /// actually produced come out as 0.
    pub fn drain_audio_samples(&mut self, count: usize) -> &[f64] {
        self.audio_out.clear();
        if count == 0 {
            self.bus.apu_mut().clear_samples();
            return &self.audio_out;
        }

        if !self.config.audio.enabled {
            self.audio_out.resize(count, 0.0);
        } else {
            average_samples(self.bus.apu().samples(), count, &mut self.audio_out);
        }

        self.bus.apu_mut().clear_samples();
        &self.audio_out
    }

    /// `drain_audio_samples` with the configured samples per frame
    pub fn frame_samples(&mut self) -> &[f64] {
        let count = self.config.audio.samples_per_frame;
        self.drain_audio_samples(count)
    }

    // ========================================
    // Input
    // ========================================

    pub fn set_button(&mut self, player: Player, button: Button, pressed: bool) {
        self.bus
            .controllers_mut()
            .controller_mut(player)
            .set_button(button, pressed);
    }

    // ========================================
    // Battery RAM
    // ========================================

    /// PRG-RAM contents of a battery-backed cartridge
    pub fn get_battery(&self) -> Option<Vec<u8>> {
        if !self.header?.battery {
            return None;
        }
        self.bus.mapper().prg_ram().map(|ram| ram.to_vec())
    }

    /// Restore PRG-RAM saved by [`Emulator::get_battery`]
    ///
    /// Does nothing unless the loaded cartridge is battery backed.
    pub fn set_battery(&mut self, data: &[u8]) -> Result<(), MapperError> {
        match self.header {
            Some(header) if header.battery => {}
            _ => return Ok(()),
        }
        let ram = self.bus.mapper_mut().prg_ram_mut().ok_or_else(|| {
            MapperError::InvalidConfiguration("cartridge has no PRG-RAM".to_string())
        })?;
        if ram.len() != data.len() {
            log::warn!(
                "Battery data is {} bytes, cartridge RAM is {}",
                data.len(),
                ram.len()
            );
            return Err(MapperError::BatterySize {
                expected: ram.len(),
                found: data.len(),
            });
        }
        ram.copy_from_slice(data);
        Ok(())
    }

    // ========================================
    // Save States
    // ========================================

    pub fn get_savestate(&self) -> Result<SaveState, SaveStateError> {
        SaveState::from_emulator(self)
    }

    /// Restore a snapshot; on error nothing changes
    pub fn set_savestate(&mut self, state: &SaveState) -> Result<(), SaveStateError> {
        state.restore_to_emulator(self).map_err(|e| {
            log::warn!("Rejected save state: {}", e);
            e
        })
    }

    // ========================================
    // Accessors
    // ========================================

    /// Header of the loaded cartridge
    pub fn header(&self) -> Option<INesHeader> {
        self.header
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub(crate) fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }

    /// Replace the configuration; CPU tracing follows the new setting
    pub fn set_config(&mut self, config: EmulatorConfig) {
        self.cpu.set_trace(config.debug.trace_cpu);
        self.config = config;
    }
}

/// Average raw per-cycle samples down to `count` values appended to `out`
fn average_samples(samples: &[f64], count: usize, out: &mut Vec<f64>) {
    let step = CPU_CYCLES_PER_FRAME / count as f64;
    let mut running = 0.0;
    let mut pos = 0;
    for _ in 0..count {
        running += step;
        let width = running.floor() as usize;
        let start = pos.min(samples.len());
        let end = (pos + width).min(samples.len());
        let value = if end > start {
            samples[start..end].iter().sum::<f64>() / (end - start) as f64
        } else {
            0.0
        };
        out.push(value);
        pos += width;
        running -= width as f64;
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::test_rom;
    use crate::ppu::constants::DOTS_PER_FRAME;

    /// NROM image running `program` at $8000, with an infinite loop after it
    fn emulator_with(program: &[u8]) -> Emulator {
        let mut code = program.to_vec();
        let spin = 0x8000 + code.len() as u16;
        code.extend_from_slice(&[0x4C, spin as u8, (spin >> 8) as u8]);
        let mut emulator = Emulator::new();
        emulator.load_rom(&test_rom::nrom_with_program(&code)).unwrap();
        emulator
    }

    #[test]
    fn test_stepping_without_rom_is_a_no_op() {
        let mut emulator = Emulator::new();
        emulator.step_cycle();
        emulator.run_frame();
        assert_eq!(emulator.cpu().cycles, 0);
        assert_eq!(emulator.bus().ppu().frame_count(), 0);
        assert!(emulator.header().is_none());
    }

    #[test]
    fn test_load_rom_resets_to_vector() {
        let emulator = emulator_with(&[]);
        assert_eq!(emulator.cpu().pc, 0x8000);
        assert_eq!(emulator.header().unwrap().mapper, 0);
    }

    #[test]
    fn test_bad_rom_keeps_previous_cartridge() {
        let mut emulator = emulator_with(&[]);
        assert!(emulator.load_rom(b"not a rom at all").is_err());
        assert!(emulator.header().is_some());
        assert_eq!(emulator.cpu().pc, 0x8000);
    }

    #[test]
    fn test_step_cycle_is_three_dots() {
        let mut emulator = emulator_with(&[]);
        emulator.step_cycle();
        assert_eq!(emulator.cpu().cycles, 1);
        assert_eq!(emulator.bus().ppu().dot(), 3);
    }

    #[test]
    fn test_store_reaches_prg_ram() {
        // LDA #$42; STA $6000
        let mut emulator = emulator_with(&[0xA9, 0x42, 0x8D, 0x00, 0x60]);
        // Reset sequence (7) + LDA (2) + first cycle of STA
        for _ in 0..10 {
            emulator.step_cycle();
        }
        assert_eq!(emulator.bus().peek(0x6000), 0x42);
    }

    #[test]
    fn test_run_frame_stops_at_vblank_line() {
        let mut emulator = emulator_with(&[]);
        emulator.run_frame();
        assert_eq!(emulator.bus().ppu().scanline(), 240);
        assert_eq!(emulator.bus().ppu().dot(), 0);

        let before = emulator.cpu().cycles;
        emulator.run_frame();
        let cycles = emulator.cpu().cycles - before;
        // Rendering is off, so every frame is the full length
        assert!((cycles as i64 - DOTS_PER_FRAME as i64 / 3).abs() <= 1);
    }

    #[test]
    fn test_nmi_reaches_cpu() {
        // LDA #$80; STA $2000, then spin; the NMI handler at $8010 stores to $0300
        let mut prg = vec![0u8; 0x4000];
        prg[..8].copy_from_slice(&[0xA9, 0x80, 0x8D, 0x00, 0x20, 0x4C, 0x05, 0x80]);
        prg[0x10..0x18].copy_from_slice(&[0xA9, 0x55, 0x8D, 0x00, 0x03, 0x4C, 0x15, 0x80]);
        prg[0x3FFA] = 0x10;
        prg[0x3FFB] = 0x80;
        prg[0x3FFD] = 0x80;
        let mut emulator = Emulator::new();
        emulator
            .load_rom(&test_rom::build(0, 1, 1, 0, &prg))
            .unwrap();

        emulator.run_frame();
        assert_eq!(emulator.bus().peek(0x0300), 0x00);
        // One line to vblank, then the interrupt sequence and the handler
        for _ in 0..200 {
            emulator.step_cycle();
        }
        assert_eq!(emulator.bus().peek(0x0300), 0x55);
    }

    #[test]
    fn test_oam_dma_stalls_cpu() {
        // LDA #$02; STA $4014
        let mut emulator = emulator_with(&[0xA9, 0x02, 0x8D, 0x14, 0x40]);
        for i in 0..=255u16 {
            emulator.bus_mut().write(0x0200 + i, i as u8);
        }
        // Reset (7) + LDA (2); the STA runs on the next cycle and DMA takes over
        for _ in 0..10 {
            emulator.step_cycle();
        }
        assert!(emulator.bus().is_dma_active());
        let cycles = emulator.cpu().cycles;
        for _ in 0..513 {
            emulator.step_cycle();
        }
        assert!(!emulator.bus().is_dma_active());
        assert_eq!(emulator.cpu().cycles, cycles);
        assert_eq!(emulator.bus().ppu().oam()[0x7F], 0x7F);
        assert_eq!(emulator.bus().ppu().oam()[0xFF], 0xFF);
    }

    #[test]
    fn test_drain_audio_samples() {
        let mut emulator = emulator_with(&[]);
        emulator.run_frame();
        let samples = emulator.drain_audio_samples(100).to_vec();
        assert_eq!(samples.len(), 100);
        assert!(samples.iter().all(|s| (0.0..=1.0).contains(s)));
        assert!(emulator.bus().apu().samples().is_empty());
        assert_eq!(emulator.frame_samples().len(), DEFAULT_SAMPLES_PER_FRAME);
    }

    #[test]
    fn test_audio_disabled_is_silent() {
        let mut config = EmulatorConfig::default();
        config.audio.enabled = false;
        let mut emulator = Emulator::with_config(config);
        emulator
            .load_rom(&test_rom::nrom_with_program(&[0x4C, 0x00, 0x80]))
            .unwrap();
        emulator.run_frame();
        assert!(emulator.drain_audio_samples(64).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_controller_through_bus() {
        let mut emulator = emulator_with(&[]);
        emulator.set_button(Player::One, Button::Start, true);
        emulator.bus_mut().write(0x4016, 1);
        emulator.step_cycle();
        emulator.bus_mut().write(0x4016, 0);
        let bits: Vec<u8> = (0..8).map(|_| emulator.bus_mut().read(0x4016) & 1).collect();
        assert_eq!(bits, vec![0, 0, 0, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_battery_round_trip() {
        let mut emulator = Emulator::new();
        emulator
            .load_rom(&test_rom::build(0, 1, 1, 0x02, &[]))
            .unwrap();
        let mut data = vec![0u8; 0x2000];
        data[0] = 0xAB;
        emulator.set_battery(&data).unwrap();
        assert_eq!(emulator.bus().peek(0x6000), 0xAB);
        assert_eq!(emulator.get_battery().unwrap(), data);

        assert!(matches!(
            emulator.set_battery(&[0; 16]),
            Err(MapperError::BatterySize { .. })
        ));
    }

    #[test]
    fn test_no_battery_without_flag() {
        let emulator = emulator_with(&[]);
        assert!(emulator.get_battery().is_none());
    }

    #[test]
    fn test_set_battery_ignored_without_flag() {
        // MMC1 with PRG-RAM but no battery flag
        let mut emulator = Emulator::new();
        emulator
            .load_rom(&test_rom::build(1, 2, 1, 0x00, &[]))
            .unwrap();
        assert!(emulator.set_battery(&[0xAB; 0x2000]).is_ok());
        assert_eq!(emulator.bus().mapper().prg_ram().unwrap()[0], 0);
        assert!(emulator.get_battery().is_none());

        // UxROM has no PRG-RAM at all
        emulator
            .load_rom(&test_rom::build(2, 1, 0, 0x00, &[]))
            .unwrap();
        assert!(emulator.set_battery(&[0xAB; 0x2000]).is_ok());
    }

    #[test]
    fn test_set_battery_without_rom() {
        let mut emulator = Emulator::new();
        assert!(emulator.set_battery(&[0; 0x2000]).is_ok());
    }

    #[test]
    fn test_savestate_restores_position() {
        let mut emulator = emulator_with(&[0xE8, 0x4C, 0x00, 0x80]);
        for _ in 0..1000 {
            emulator.step_cycle();
        }
        let state = emulator.get_savestate().unwrap();
        let x = emulator.cpu().x;
        for _ in 0..1000 {
            emulator.step_cycle();
        }
        assert_ne!(emulator.cpu().x, x);

        emulator.set_savestate(&state).unwrap();
        assert_eq!(emulator.cpu().x, x);
        assert_eq!(emulator.get_savestate().unwrap().cpu, state.cpu);
    }
}
