use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::FighterError;

// =============================================================================
// Controller Channels
// =============================================================================

/// Number of boolean channels in one controller frame.
pub const CHANNELS: usize = 12;

/// One controller channel, numbered the way the emulator's filtered button
/// layout numbers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Button {
    #[serde(rename = "LK")]
    LightKick = 0,
    #[serde(rename = "MK")]
    MediumKick = 1,
    #[serde(rename = "MODE")]
    Mode = 2,
    #[serde(rename = "START")]
    Start = 3,
    #[serde(rename = "UP")]
    Up = 4,
    #[serde(rename = "DOWN")]
    Down = 5,
    #[serde(rename = "LEFT")]
    Left = 6,
    #[serde(rename = "RIGHT")]
    Right = 7,
    #[serde(rename = "HK")]
    HeavyKick = 8,
    #[serde(rename = "HP")]
    HeavyPunch = 9,
    #[serde(rename = "MP")]
    MediumPunch = 10,
    #[serde(rename = "LP")]
    LightPunch = 11,
}

impl Button {
    pub const ALL: [Button; CHANNELS] = [
        Button::LightKick,
        Button::MediumKick,
        Button::Mode,
        Button::Start,
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
        Button::HeavyKick,
        Button::HeavyPunch,
        Button::MediumPunch,
        Button::LightPunch,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Up/down/left/right.
    pub fn is_directional(self) -> bool {
        matches!(
            self,
            Button::Up | Button::Down | Button::Left | Button::Right
        )
    }

    /// Punch or kick of any strength.
    pub fn is_attack(self) -> bool {
        matches!(
            self,
            Button::LightKick
                | Button::MediumKick
                | Button::HeavyKick
                | Button::LightPunch
                | Button::MediumPunch
                | Button::HeavyPunch
        )
    }

    /// Horizontal reflection: swaps left and right, leaves everything else.
    pub fn mirrored(self) -> Self {
        match self {
            Button::Left => Button::Right,
            Button::Right => Button::Left,
            other => other,
        }
    }
}

impl TryFrom<usize> for Button {
    type Error = FighterError;

    fn try_from(i: usize) -> Result<Self, Self::Error> {
        Button::ALL
            .get(i)
            .copied()
            .ok_or(FighterError::InvalidChannel(i))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Punch {
    #[serde(rename = "HP")]
    Heavy,
    #[serde(rename = "MP")]
    Medium,
    #[serde(rename = "LP")]
    Light,
}

impl Punch {
    pub fn button(self) -> Button {
        match self {
            Punch::Heavy => Button::HeavyPunch,
            Punch::Medium => Button::MediumPunch,
            Punch::Light => Button::LightPunch,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kick {
    #[serde(rename = "HK")]
    Heavy,
    #[serde(rename = "MK")]
    Medium,
    #[serde(rename = "LK")]
    Light,
}

impl Kick {
    pub fn button(self) -> Button {
        match self {
            Kick::Heavy => Button::HeavyKick,
            Kick::Medium => Button::MediumKick,
            Kick::Light => Button::LightKick,
        }
    }
}

// =============================================================================
// Input Frame
// =============================================================================

/// Controller state held for one emulator tick.
///
/// Serialized as the list of pressed buttons, e.g. `["DOWN", "RIGHT"]`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Button>", into = "Vec<Button>")]
pub struct InputFrame(u16);

impl InputFrame {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn from_buttons(buttons: &[Button]) -> Self {
        buttons.iter().fold(Self::empty(), |f, &b| f.with(b))
    }

    /// Builds a frame from a raw channel vector (one entry per channel,
    /// non-zero means pressed). Vectors longer than [`CHANNELS`] are rejected.
    pub fn from_channels(channels: &[u8]) -> Result<Self, FighterError> {
        if channels.len() > CHANNELS {
            return Err(FighterError::InvalidChannel(CHANNELS));
        }
        let mut frame = Self::empty();
        for (i, &v) in channels.iter().enumerate() {
            if v != 0 {
                frame.set(Button::try_from(i)?, true);
            }
        }
        Ok(frame)
    }

    pub fn with(mut self, button: Button) -> Self {
        self.set(button, true);
        self
    }

    pub fn without(mut self, button: Button) -> Self {
        self.set(button, false);
        self
    }

    pub fn set(&mut self, button: Button, pressed: bool) {
        let bit = 1u16 << button.index();
        if pressed {
            self.0 |= bit;
        } else {
            self.0 &= !bit;
        }
    }

    pub fn contains(self, button: Button) -> bool {
        self.0 & (1u16 << button.index()) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn buttons(self) -> impl Iterator<Item = Button> {
        Button::ALL.into_iter().filter(move |&b| self.contains(b))
    }

    pub fn directional_count(self) -> usize {
        self.buttons().filter(|b| b.is_directional()).count()
    }

    pub fn attack_count(self) -> usize {
        self.buttons().filter(|b| b.is_attack()).count()
    }

    /// True when a direction and its opposite are held together.
    pub fn has_opposing_directions(self) -> bool {
        (self.contains(Button::Left) && self.contains(Button::Right))
            || (self.contains(Button::Up) && self.contains(Button::Down))
    }

    pub fn mirrored(self) -> Self {
        self.buttons()
            .fold(Self::empty(), |f, b| f.with(b.mirrored()))
    }

    /// One `0`/`1` entry per channel, in channel order.
    pub fn to_channels(self) -> [u8; CHANNELS] {
        let mut out = [0u8; CHANNELS];
        for b in self.buttons() {
            out[b.index()] = 1;
        }
        out
    }
}

impl From<Vec<Button>> for InputFrame {
    fn from(buttons: Vec<Button>) -> Self {
        Self::from_buttons(&buttons)
    }
}

impl From<InputFrame> for Vec<Button> {
    fn from(frame: InputFrame) -> Self {
        frame.buttons().collect()
    }
}

impl fmt::Debug for InputFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.buttons()).finish()
    }
}

// =============================================================================
// Move Sequence
// =============================================================================

/// Ordered controller frames making up one combo. Each frame is replayed for
/// a fixed number of ticks by the stepper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveSequence(Vec<InputFrame>);

impl MoveSequence {
    pub fn new(frames: Vec<InputFrame>) -> Self {
        Self(frames)
    }

    pub fn frames(&self) -> &[InputFrame] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<InputFrame> {
        self.0.last().copied()
    }

    pub fn mirrored(&self) -> Self {
        Self(self.0.iter().map(|f| f.mirrored()).collect())
    }
}

impl<'a> IntoIterator for &'a MoveSequence {
    type Item = &'a InputFrame;
    type IntoIter = std::slice::Iter<'a, InputFrame>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
