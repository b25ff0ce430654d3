use anyhow::{Context, Result};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tetanes_core::input::JoypadBtnState;
use tetanes_core::mem::Read;
use tetanes_core::prelude::*;

use crate::env::{Backend, BackendStep};
use crate::fighter::Info;
use crate::frame::Frame;
use crate::input::{Button, InputFrame};

pub const NES_WIDTH: usize = 256;
pub const NES_HEIGHT: usize = 240;

// =============================================================================
// RAM Variables
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RamKind {
    U8,
    I8,
    /// Little-endian.
    U16,
    /// Little-endian.
    I16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RamVariable {
    pub address: u16,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: RamKind,
}

fn default_kind() -> RamKind {
    RamKind::U8
}

impl RamVariable {
    pub fn read(&self, peek: impl Fn(u16) -> u8) -> i64 {
        let lo = peek(self.address);
        match self.kind {
            RamKind::U8 => lo as i64,
            RamKind::I8 => lo as i8 as i64,
            RamKind::U16 | RamKind::I16 => {
                let hi = peek(self.address.wrapping_add(1));
                let word = u16::from_le_bytes([lo, hi]);
                if self.kind == RamKind::I16 {
                    word as i16 as i64
                } else {
                    word as i64
                }
            }
        }
    }
}

/// Status dictionary layout: field name to RAM location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RamMap(pub BTreeMap<String, RamVariable>);

impl RamMap {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open RAM map: {}", path.display()))?;
        serde_json::from_reader(file)
            .with_context(|| format!("Failed to parse RAM map: {}", path.display()))
    }

    pub fn read(&self, peek: impl Fn(u16) -> u8) -> Info {
        self.0
            .iter()
            .map(|(name, var)| (name.clone(), var.read(&peek)))
            .collect()
    }
}

// =============================================================================
// Controller Mapping
// =============================================================================

/// Folds the twelve arcade channels onto the NES pad: punches on B, kicks on
/// A, MODE on SELECT.
pub fn to_joypad(input: InputFrame) -> JoypadBtnState {
    let mut state = JoypadBtnState::empty();
    for button in input.buttons() {
        let btn = match button {
            Button::Up => JoypadBtnState::UP,
            Button::Down => JoypadBtnState::DOWN,
            Button::Left => JoypadBtnState::LEFT,
            Button::Right => JoypadBtnState::RIGHT,
            Button::Start => JoypadBtnState::START,
            Button::Mode => JoypadBtnState::SELECT,
            Button::LightPunch | Button::MediumPunch | Button::HeavyPunch => JoypadBtnState::B,
            Button::LightKick | Button::MediumKick | Button::HeavyKick => JoypadBtnState::A,
        };
        state.set(btn, true);
    }
    state
}

// =============================================================================
// NES Backend
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NesConfig {
    /// Idle frames after a soft reset, drawn from `noop_min..noop_max`.
    pub noop_min: u32,
    pub noop_max: u32,
}

impl Default for NesConfig {
    fn default() -> Self {
        Self {
            noop_min: 1,
            noop_max: 30,
        }
    }
}

pub struct NesBackend {
    deck: ControlDeck,
    ram_map: RamMap,
    config: NesConfig,
    rng: SmallRng,
    window: Option<minifb::Window>,
    buf: Vec<u32>,
}

impl NesBackend {
    pub fn new(rom_path: PathBuf, ram_map: RamMap, config: NesConfig) -> Result<Self> {
        let mut deck = ControlDeck::new();
        deck.set_headless_mode(tetanes_core::control_deck::HeadlessMode::NO_AUDIO);
        deck.load_rom_path(&rom_path)
            .with_context(|| format!("Failed to load ROM: {}", rom_path.display()))?;

        Ok(Self {
            deck,
            ram_map,
            config,
            rng: SmallRng::from_os_rng(),
            window: None,
            buf: vec![0u32; NES_WIDTH * NES_HEIGHT],
        })
    }

    pub fn open_window(&mut self, title: &str) -> Result<()> {
        let window = minifb::Window::new(
            title,
            NES_WIDTH,
            NES_HEIGHT,
            minifb::WindowOptions {
                resize: true,
                scale: minifb::Scale::X2,
                ..Default::default()
            },
        )?;
        self.window = Some(window);
        Ok(())
    }

    pub fn is_window_open(&self) -> bool {
        self.window.as_ref().is_some_and(|w| w.is_open())
    }

    pub fn peek(&self, addr: u16) -> u8 {
        self.deck.bus().peek(addr)
    }

    fn set_input_state(&mut self, btn_state: JoypadBtnState) {
        let joypad = self.deck.joypad_mut(Player::One);
        for button in [
            JoypadBtnState::LEFT,
            JoypadBtnState::RIGHT,
            JoypadBtnState::UP,
            JoypadBtnState::DOWN,
            JoypadBtnState::A,
            JoypadBtnState::B,
            JoypadBtnState::START,
            JoypadBtnState::SELECT,
        ] {
            joypad.set_button(button, btn_state.contains(button));
        }
    }

    fn current_frame(&mut self) -> Result<Frame> {
        Frame::from_rgba(NES_HEIGHT, NES_WIDTH, self.deck.frame_buffer())
            .context("Unexpected frame buffer size")
    }

    fn read_info(&self) -> Info {
        self.ram_map.read(|addr| self.peek(addr))
    }
}

impl Backend for NesBackend {
    fn reset(&mut self) -> Result<Frame> {
        self.deck.reset(ResetKind::Soft);
        self.set_input_state(JoypadBtnState::empty());

        let noops = if self.config.noop_max > self.config.noop_min {
            self.rng
                .random_range(self.config.noop_min..self.config.noop_max)
        } else {
            self.config.noop_min
        };
        for _ in 0..noops {
            self.deck.clock_frame()?;
        }
        self.current_frame()
    }

    fn step(&mut self, input: InputFrame) -> Result<BackendStep> {
        self.set_input_state(to_joypad(input));
        self.deck.clock_frame()?;
        Ok(BackendStep {
            frame: self.current_frame()?,
            reward: 0.0,
            done: false,
            info: self.read_info(),
        })
    }

    fn render(&mut self) -> Result<()> {
        if self.window.is_none() {
            return Ok(());
        }
        let frame = self.current_frame()?;
        frame.to_u32(&mut self.buf);
        if let Some(window) = self.window.as_mut() {
            if !window.is_open() {
                anyhow::bail!("render window closed");
            }
            window.update_with_buffer(&self.buf, NES_WIDTH, NES_HEIGHT)?;
        }
        Ok(())
    }

    fn frame_shape(&self) -> (usize, usize) {
        (NES_HEIGHT, NES_WIDTH)
    }
}
