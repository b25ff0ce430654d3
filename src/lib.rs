pub mod config;
pub mod env;
pub mod error;
pub mod fighter;
pub mod frame;
pub mod input;
pub mod moves;
pub mod nes;
pub mod policy;
pub mod reward;

pub use config::FighterConfig;
pub use env::{
    Backend, BackendStep, EnvConfig, Episode, FighterEnv, ObservationSpace, StepResult,
};
pub use error::{FighterError, Result};
pub use fighter::{AirborneDetection, Fighter, Info, Status, keys};
pub use frame::{Frame, FrameStack};
pub use input::{Button, CHANNELS, InputFrame, Kick, MoveSequence, Punch};
pub use moves::Move;
pub use nes::{NesBackend, NesConfig, RamMap};
pub use policy::{Condition, Decision, Policy, Rule};
pub use reward::{HealthTracker, RewardBreakdown, RewardConfig, RewardOutcome, RoundResult};
