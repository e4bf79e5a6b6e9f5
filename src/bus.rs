// Bus module - CPU address decoding and the devices behind it
//
// The Bus owns every device the CPU can see and routes each access to the
// right one. It also carries the OAM DMA engine and the PPU/CPU phase
// counter, since both live between the CPU and the rest of the system.
//
// # NES Memory Map (CPU Address Space)
//
// ```text
// $0000-$07FF: 2KB Internal RAM
// $0800-$1FFF: Mirrors of RAM (3 times)
// $2000-$2007: PPU Registers
// $2008-$3FFF: Mirrors of PPU Registers (repeating every 8 bytes)
// $4000-$4013: APU Registers
// $4014:       OAM DMA trigger
// $4015:       APU status / channel enable
// $4016-$4017: Controller ports ($4017 writes go to the APU frame counter)
// $4018-$401F: APU and I/O test functionality (unused)
// $4020-$FFFF: Cartridge space (PRG-ROM, PRG-RAM, and mapper registers)
// ```

use serde::{Deserialize, Serialize};

use crate::apu::Apu;
use crate::cartridge::mappers::NoCartridge;
use crate::cartridge::Mapper;
use crate::input::{ControllerPorts, ControllerState};
use crate::ppu::Ppu;
use crate::ram::{Ram, RAM_SIZE};

/// Trait for memory-mapped components
///
/// Components implementing this trait handle CPU reads and writes for their
/// own slice of the address space. The address passed in is the full CPU
/// address; mirroring is the device's business.
pub trait MemoryMappedDevice {
    /// Read a byte from the device
    ///
    /// Some devices have side effects on read (controller shift registers,
    /// APU status), so this method takes &mut self.
    fn read(&mut self, addr: u16) -> u8;

    /// Write a byte to the device
    fn write(&mut self, addr: u16, data: u8);
}

/// OAM DMA steps per transfer (one idle step, then 256 read/write pairs)
pub const DMA_STEPS: u16 = 513;

/// PPU dots per CPU cycle
pub const PPU_DOTS_PER_CPU_CYCLE: u8 = 3;

/// OAM DMA engine state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DmaState {
    pub active: bool,
    /// Steps taken so far (0-512)
    pub timer: u16,
    /// Source page, already shifted into the high byte
    pub base: u16,
    /// Byte latched by the last read step
    pub value: u8,
}

/// Serializable bus-level state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusState {
    pub ram: Vec<u8>,
    /// PPU dots left until the next CPU cycle
    pub phase: u8,
    pub dma: DmaState,
    pub controllers: ControllerState,
}

/// Main memory bus structure
///
/// The Bus connects the CPU to RAM, the PPU and APU registers, the controller
/// ports and the cartridge mapper. The PPU reaches pattern and nametable
/// memory only through the mapper the Bus lends it on each call.
pub struct Bus {
    /// Internal RAM: 2KB, mirrored through $1FFF
    pub(crate) ram: Ram,

    /// PPU (Picture Processing Unit)
    pub(crate) ppu: Ppu,

    /// APU (Audio Processing Unit)
    pub(crate) apu: Apu,

    /// Controller ports at $4016/$4017
    pub(crate) controllers: ControllerPorts,

    /// Active cartridge board
    pub(crate) mapper: Box<dyn Mapper>,

    // ========================================
    // Timing State
    // ========================================
    dma: DmaState,
    phase: u8,
}

impl Bus {
    /// Create a bus with no cartridge inserted
    pub fn new() -> Self {
        Self::with_mapper(Box::new(NoCartridge))
    }

    /// Create a bus around the given cartridge board
    pub fn with_mapper(mapper: Box<dyn Mapper>) -> Self {
        Bus {
            ram: Ram::new(),
            ppu: Ppu::new(),
            apu: Apu::new(),
            controllers: ControllerPorts::new(),
            mapper,
            dma: DmaState::default(),
            phase: 0,
        }
    }

    /// Swap in a new cartridge board, returning the old one
    pub fn set_mapper(&mut self, mapper: Box<dyn Mapper>) -> Box<dyn Mapper> {
        std::mem::replace(&mut self.mapper, mapper)
    }

    /// Reset every device on the bus
    ///
    /// A hard reset also clears work RAM and the mapper's RAM. Live button
    /// state is kept either way.
    pub fn reset(&mut self, hard: bool) {
        if hard {
            self.ram.clear();
        }
        self.ppu.reset();
        self.apu.reset();
        self.mapper.reset(hard);
        self.controllers.reset();
        self.dma = DmaState::default();
        self.phase = 0;
    }

    // ========================================
    // CPU Address Space
    // ========================================

    /// Read a byte from the CPU address space
    pub fn read(&mut self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram.read(addr),
            0x2000..=0x3FFF => self.ppu.read_register(addr & 0x07, self.mapper.as_mut()),
            0x4014 => 0,
            0x4016 | 0x4017 => self.controllers.read(addr),
            0x4000..=0x401F => self.apu.read(addr),
            _ => self.mapper.cpu_read(addr),
        }
    }

    /// Write a byte to the CPU address space
    pub fn write(&mut self, addr: u16, data: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram.write(addr, data),
            0x2000..=0x3FFF => self
                .ppu
                .write_register(addr & 0x07, data, self.mapper.as_mut()),
            0x4014 => {
                self.dma.active = true;
                self.dma.base = (data as u16) << 8;
            }
            0x4016 => self.controllers.write(addr, data),
            0x4000..=0x401F => self.apu.write(addr, data),
            _ => self.mapper.cpu_write(addr, data),
        }
    }

    /// Read without side effects, for tracing and debuggers
    pub fn peek(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram.peek(addr),
            0x2000..=0x3FFF => self.ppu.peek_register(addr & 0x07),
            0x4014 => 0,
            0x4016 | 0x4017 => self.controllers.peek(addr),
            0x4000..=0x401F => self.apu.peek(addr),
            _ => self.mapper.cpu_read(addr),
        }
    }

    /// Read a little-endian word
    pub fn read_u16(&mut self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    /// Side-effect-free little-endian word read
    pub fn peek_u16(&self, addr: u16) -> u16 {
        let lo = self.peek(addr) as u16;
        let hi = self.peek(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    // ========================================
    // Per-Cycle Helpers
    // ========================================

    /// Count down one PPU dot; returns true when a CPU cycle is due first
    pub(crate) fn begin_dot(&mut self) -> bool {
        let cpu_due = self.phase == 0;
        if cpu_due {
            self.phase = PPU_DOTS_PER_CPU_CYCLE;
        }
        self.phase -= 1;
        cpu_due
    }

    /// Combined level of the three IRQ sources
    pub fn irq_line(&self) -> bool {
        self.mapper.irq_pending() || self.apu.irq_pending()
    }

    /// Reload controller shift registers while the strobe is high
    pub(crate) fn poll_controllers(&mut self) {
        self.controllers.poll_strobe();
    }

    /// Whether an OAM DMA transfer is stalling the CPU
    pub fn is_dma_active(&self) -> bool {
        self.dma.active
    }

    /// Run one CPU cycle of OAM DMA
    ///
    /// Step 0 idles. Odd steps read the next source byte; even steps write
    /// the latched byte through OAMDATA.
    pub(crate) fn step_dma(&mut self) {
        if self.dma.timer > 0 {
            if self.dma.timer & 1 == 0 {
                let value = self.dma.value;
                self.ppu.write_register(4, value, self.mapper.as_mut());
            } else {
                let addr = self.dma.base + ((self.dma.timer / 2) & 0xFF);
                self.dma.value = self.read(addr);
            }
        }
        self.dma.timer += 1;
        if self.dma.timer == DMA_STEPS {
            self.dma.timer = 0;
            self.dma.active = false;
        }
    }

    /// Run one APU cycle and service the DMC's memory fetch, if any
    pub(crate) fn step_apu(&mut self) {
        self.apu.step();
        if let Some(addr) = self.apu.dmc_fetch_address() {
            let value = self.read(addr);
            self.apu.dmc_fetch_complete(value);
        }
    }

    /// Advance the PPU one dot; returns true if it raised an NMI
    pub(crate) fn step_ppu(&mut self) -> bool {
        self.ppu.step(self.mapper.as_mut());
        self.ppu.take_nmi()
    }

    // ========================================
    // Component Access
    // ========================================

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    pub fn ppu_mut(&mut self) -> &mut Ppu {
        &mut self.ppu
    }

    pub fn apu(&self) -> &Apu {
        &self.apu
    }

    pub fn apu_mut(&mut self) -> &mut Apu {
        &mut self.apu
    }

    pub fn controllers_mut(&mut self) -> &mut ControllerPorts {
        &mut self.controllers
    }

    pub fn mapper(&self) -> &dyn Mapper {
        self.mapper.as_ref()
    }

    pub fn mapper_mut(&mut self) -> &mut dyn Mapper {
        self.mapper.as_mut()
    }

    pub fn ram(&self) -> &Ram {
        &self.ram
    }

    // ========================================
    // Save States
    // ========================================

    pub fn save_state(&self) -> BusState {
        BusState {
            ram: self.ram.as_slice().to_vec(),
            phase: self.phase,
            dma: self.dma,
            controllers: self.controllers.save_state(),
        }
    }

    /// Check a snapshot without applying it
    pub fn validate_state(state: &BusState) -> Result<(), String> {
        if state.ram.len() != RAM_SIZE {
            return Err(format!(
                "RAM is {} bytes, expected {}",
                state.ram.len(),
                RAM_SIZE
            ));
        }
        if state.phase >= PPU_DOTS_PER_CPU_CYCLE {
            return Err(format!("phase {} out of range", state.phase));
        }
        if state.dma.timer >= DMA_STEPS {
            return Err(format!("DMA step {} out of range", state.dma.timer));
        }
        Ok(())
    }

    /// Apply a snapshot previously checked with [`Bus::validate_state`]
    pub fn load_state(&mut self, state: &BusState) {
        self.ram.load(&state.ram);
        self.phase = state.phase;
        self.dma = state.dma;
        self.controllers.load_state(&state.controllers);
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}
