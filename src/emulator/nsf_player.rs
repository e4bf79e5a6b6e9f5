// NSF player - Music playback on the CPU and APU alone
//
// The player hard-resets the machine for each song, calls the file's init
// routine through the board's call stub and then enters the play routine
// once per frame. The PPU is never stepped.
//
// ```text
// play_song:  reset -> APU register init -> JSR init (A = song - 1, X = 0)
// run_frame:  JSR play (if the last call returned) -> 29780 APU cycles
// ```

use super::{average_samples, EmulatorConfig};
use crate::bus::Bus;
use crate::cartridge::mappers::{CALL_STUB, INIT_RETURN, PLAY_CALL, PLAY_RETURN};
use crate::cartridge::{NsfError, NsfHeader, NsfMapper};
use crate::cpu::Cpu;

/// CPU cycles run per `run_frame`
const FRAME_CYCLES: u32 = 29780;

/// Cycles the init routine may take before it is abandoned (10 frames)
const INIT_CYCLE_LIMIT: u32 = FRAME_CYCLES * 10;

/// NSF music player
///
/// Owns its own CPU and Bus; shares the APU, audio output and
/// configuration handling with [`Emulator`](super::Emulator).
pub struct NsfPlayer {
    cpu: Cpu,
    bus: Bus,
    header: Option<NsfHeader>,
    /// 1-based; 0 before a file is loaded
    current_song: u8,
    /// Whether the last play call has reached its RTS
    play_returned: bool,
    config: EmulatorConfig,
    audio_out: Vec<f64>,
}

impl NsfPlayer {
    /// Create a player with the default configuration
    ///
    /// # Example
    ///
    /// ```no_run
    /// use nes_core::emulator::NsfPlayer;
    ///
    /// let nsf = std::fs::read("music.nsf").expect("Failed to read NSF");
    /// let mut player = NsfPlayer::new();
    /// player.load_nsf(&nsf).expect("Failed to load NSF");
    /// player.run_frame();
    /// let _samples = player.frame_samples();
    /// ```
    pub fn new() -> Self {
        Self::with_config(EmulatorConfig::default())
    }

    pub fn with_config(config: EmulatorConfig) -> Self {
        let mut cpu = Cpu::new();
        cpu.set_trace(config.debug.trace_cpu);
        NsfPlayer {
            cpu,
            bus: Bus::new(),
            header: None,
            current_song: 0,
            play_returned: false,
            config,
            audio_out: Vec::new(),
        }
    }

    /// Load an NSF file and start its first song
    ///
    /// On error the previous file (if any) stays loaded.
    pub fn load_nsf(&mut self, data: &[u8]) -> Result<(), NsfError> {
        let header = NsfHeader::parse(data)?;
        let mapper = NsfMapper::new(data, &header);

        log::info!(
            "Loaded NSF \"{}\" by {}: {} songs, load ${:04X}{}",
            header.name,
            header.artist,
            header.total_songs,
            header.load_addr,
            if header.is_banked() {
                format!(", {} banks", mapper.bank_count())
            } else {
                String::new()
            }
        );
        if header.extra_chips != 0 {
            log::warn!(
                "NSF uses expansion audio (${:02X}); only the built-in channels play",
                header.extra_chips
            );
        }
        if header.is_pal_only() {
            log::warn!("NSF is PAL only; playing at NTSC rate");
        }

        let first = header.first_song();
        self.bus.set_mapper(Box::new(mapper));
        self.header = Some(header);
        self.play_song(first)
    }

    /// Restart the machine and run the init routine for `song` (1-based)
    pub fn play_song(&mut self, song: u8) -> Result<(), NsfError> {
        let total = self.header.as_ref().ok_or(NsfError::NotLoaded)?.total_songs;
        if song == 0 || song > total {
            return Err(NsfError::SongOutOfRange { song, total });
        }

        self.bus.reset(true);
        self.cpu.reset(&mut self.bus);
        for addr in 0x4000..=0x4013 {
            self.bus.write(addr, 0);
        }
        self.bus.write(0x4015, 0x00);
        self.bus.write(0x4015, 0x0F);
        self.bus.write(0x4017, 0x40);

        self.cpu.a = song - 1;
        self.cpu.x = 0;
        self.cpu.pc = CALL_STUB;

        let mut cycles = 0;
        while !self.returned_to(INIT_RETURN) {
            if cycles == INIT_CYCLE_LIMIT {
                log::warn!(
                    "NSF init for song {} did not return within {} cycles",
                    song,
                    INIT_CYCLE_LIMIT
                );
                break;
            }
            self.cycle(true);
            cycles += 1;
        }
        log::debug!("Song {} of {} initialized in {} cycles", song, total, cycles);

        self.current_song = song;
        self.play_returned = true;
        self.bus.apu_mut().clear_samples();
        self.audio_out.clear();
        Ok(())
    }

    /// Switch to the following song, staying on the last one
    pub fn next_song(&mut self) -> Result<(), NsfError> {
        let total = self.header.as_ref().ok_or(NsfError::NotLoaded)?.total_songs;
        self.play_song(self.current_song.saturating_add(1).min(total))
    }

    /// Switch to the preceding song, staying on the first one
    pub fn previous_song(&mut self) -> Result<(), NsfError> {
        if self.header.is_none() {
            return Err(NsfError::NotLoaded);
        }
        self.play_song(self.current_song.saturating_sub(1).max(1))
    }

    // ========================================
    // Stepping
    // ========================================

    fn returned_to(&self, addr: u16) -> bool {
        self.cpu.pc == addr && self.cpu.at_instruction_boundary()
    }

    /// One CPU cycle: IRQ line, CPU or DMA, then the APU
    fn cycle(&mut self, run_cpu: bool) {
        self.cpu.irq_pending = self.bus.irq_line();
        if self.bus.is_dma_active() {
            self.bus.step_dma();
        } else if run_cpu {
            self.cpu.step(&mut self.bus);
        }
        self.bus.step_apu();
    }

    /// Run one frame of music
    pub fn run_frame(&mut self) {
        if self.header.is_none() {
            return;
        }
        if self.play_returned {
            self.cpu.pc = PLAY_CALL;
            self.play_returned = false;
        }
        for _ in 0..FRAME_CYCLES {
            let run_cpu = !self.play_returned;
            self.cycle(run_cpu);
            if run_cpu && self.returned_to(PLAY_RETURN) {
                self.play_returned = true;
            }
        }
    }

    // ========================================
    // Audio
    // ========================================

    /// Average the raw per-cycle samples down to `count` values and clear
    /// the APU's buffer; same rules as `Emulator::drain_audio_samples`
    pub fn drain_audio_samples(&mut self, count: usize) -> &[f64] {
        self.audio_out.clear();
        if count > 0 {
            if self.config.audio.enabled {
                average_samples(self.bus.apu().samples(), count, &mut self.audio_out);
            } else {
                self.audio_out.resize(count, 0.0);
            }
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
    // Accessors
    // ========================================

    pub fn header(&self) -> Option<&NsfHeader> {
        self.header.as_ref()
    }

    /// Current song, 1-based (0 when nothing is loaded)
    pub fn current_song(&self) -> u8 {
        self.current_song
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }
}

impl Default for NsfPlayer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::nsf::test_nsf;
    use crate::emulator::DEFAULT_SAMPLES_PER_FRAME;

    /// Init at $8000 stores A to $6000; play at $8004 increments $6001
    const PROGRAM: [u8; 8] = [
        0x8D, 0x00, 0x60, // STA $6000
        0x60, // RTS
        0xEE, 0x01, 0x60, // INC $6001
        0x60, // RTS
    ];

    fn player_with(songs: u8, play: u16, program: &[u8]) -> NsfPlayer {
        let mut player = NsfPlayer::new();
        player
            .load_nsf(&test_nsf::build(songs, 0x8000, 0x8000, play, [0; 8], program))
            .unwrap();
        player
    }

    #[test]
    fn test_stepping_without_file_is_a_no_op() {
        let mut player = NsfPlayer::new();
        player.run_frame();
        assert_eq!(player.cpu().cycles, 0);
        assert_eq!(player.current_song(), 0);
        assert_eq!(player.play_song(1), Err(NsfError::NotLoaded));
        assert_eq!(player.next_song(), Err(NsfError::NotLoaded));
        assert!(player.header().is_none());
    }

    #[test]
    fn test_load_runs_init_with_song_index() {
        let mut player = player_with(4, 0x8004, &PROGRAM);
        assert_eq!(player.current_song(), 1);
        assert_eq!(player.header().unwrap().name, "Tune");
        assert_eq!(player.bus().peek(0x6000), 0);
        assert_eq!(player.cpu().pc, INIT_RETURN);

        player.play_song(3).unwrap();
        assert_eq!(player.current_song(), 3);
        assert_eq!(player.bus().peek(0x6000), 2);
        assert_eq!(player.cpu().x, 0);
    }

    #[test]
    fn test_play_called_once_per_frame() {
        let mut player = player_with(1, 0x8004, &PROGRAM);
        assert_eq!(player.bus().peek(0x6001), 0);
        for _ in 0..3 {
            player.run_frame();
        }
        assert_eq!(player.bus().peek(0x6001), 3);
        assert_eq!(player.cpu().pc, PLAY_RETURN);
    }

    #[test]
    fn test_cpu_idles_after_play_returns() {
        let mut player = player_with(1, 0x8004, &PROGRAM);
        player.run_frame();
        // Init: reset latency (7) + JSR (6) + STA (4) + RTS (6)
        // Play: JSR (6) + INC (6) + RTS (6)
        assert_eq!(player.cpu().cycles, 7 + 6 + 4 + 6 + 6 + 6 + 6);
    }

    #[test]
    fn test_play_not_reentered_while_running() {
        // Play increments $6001 once and then spins
        let mut program = PROGRAM.to_vec();
        program.extend_from_slice(&[0xEE, 0x01, 0x60, 0x4C, 0x0B, 0x80]);
        let mut player = player_with(1, 0x8008, &program);
        player.run_frame();
        player.run_frame();
        assert_eq!(player.bus().peek(0x6001), 1);
    }

    #[test]
    fn test_song_selection() {
        let mut player = player_with(3, 0x8004, &PROGRAM);
        assert_eq!(
            player.play_song(0),
            Err(NsfError::SongOutOfRange { song: 0, total: 3 })
        );
        assert_eq!(
            player.play_song(4),
            Err(NsfError::SongOutOfRange { song: 4, total: 3 })
        );
        assert_eq!(player.current_song(), 1);

        player.previous_song().unwrap();
        assert_eq!(player.current_song(), 1);
        player.next_song().unwrap();
        assert_eq!(player.bus().peek(0x6000), 1);
        player.next_song().unwrap();
        player.next_song().unwrap();
        assert_eq!(player.current_song(), 3);
        assert_eq!(player.bus().peek(0x6000), 2);
    }

    #[test]
    fn test_new_song_clears_play_state() {
        let mut player = player_with(2, 0x8004, &PROGRAM);
        player.run_frame();
        player.run_frame();
        assert_eq!(player.bus().peek(0x6001), 2);
        player.play_song(2).unwrap();
        assert_eq!(player.bus().peek(0x6001), 0);
    }

    #[test]
    fn test_init_bank_switch() {
        // Code in bank 1 at $9000 maps bank 1 into $8000 and copies $8FFF
        let mut data = vec![0u8; 0x2000];
        data[0x1000..0x100C].copy_from_slice(&[
            0xA9, 0x01, // LDA #$01
            0x8D, 0xF8, 0x5F, // STA $5FF8
            0xAD, 0xFF, 0x8F, // LDA $8FFF
            0x8D, 0x00, 0x60, // STA $6000
            0x60, // RTS
        ]);
        data[0x1FFF] = 0x77;
        let banks = [0, 1, 0, 0, 0, 0, 0, 0];
        let nsf = test_nsf::build(1, 0x8000, 0x9000, 0x900B, banks, &data);

        let mut player = NsfPlayer::new();
        player.load_nsf(&nsf).unwrap();
        assert_eq!(player.bus().peek(0x6000), 0x77);
        assert_eq!(player.bus().peek(0x8000), 0xA9);
    }

    #[test]
    fn test_init_that_never_returns() {
        // JMP $8000
        let mut player = player_with(1, 0x8000, &[0x4C, 0x00, 0x80]);
        assert_eq!(player.cpu().cycles, INIT_CYCLE_LIMIT as u64);
        assert_eq!(player.current_song(), 1);
    }

    #[test]
    fn test_rejected_file_keeps_previous() {
        let mut player = player_with(2, 0x8004, &PROGRAM);
        assert_eq!(player.load_nsf(b"NESM"), Err(NsfError::TooShort(4)));
        assert_eq!(player.header().unwrap().total_songs, 2);
        assert_eq!(player.current_song(), 1);
    }

    #[test]
    fn test_frame_samples() {
        let mut player = player_with(1, 0x8004, &PROGRAM);
        assert!(player.bus().apu().samples().is_empty());
        player.run_frame();
        assert_eq!(player.bus().apu().samples().len(), FRAME_CYCLES as usize);

        let samples = player.frame_samples().to_vec();
        assert_eq!(samples.len(), DEFAULT_SAMPLES_PER_FRAME);
        assert!(samples.iter().all(|s| (0.0..=1.0).contains(s)));
        assert!(player.bus().apu().samples().is_empty());
        assert!(player.drain_audio_samples(0).is_empty());
    }
}
