use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::error::{FighterError, Result};
use crate::fighter::Info;
use crate::frame::{FRAME_CHANNELS, Frame, FrameStack};
use crate::input::InputFrame;
use crate::policy::Policy;
use crate::reward::{HealthTracker, RewardBreakdown, RewardConfig, RoundResult, read_health};

// =============================================================================
// Underlying Emulator
// =============================================================================

/// What the emulator returns for one tick.
#[derive(Debug, Clone)]
pub struct BackendStep {
    pub frame: Frame,
    /// Emulator's own reward; the wrapper computes its own.
    pub reward: f64,
    /// Emulator's own termination flag; the wrapper decides from health.
    pub done: bool,
    pub info: Info,
}

/// Frame-stepping emulator the fighter is played against.
///
/// Errors are passed through to the caller untouched.
pub trait Backend {
    fn reset(&mut self) -> anyhow::Result<Frame>;

    /// Holds `input` for exactly one tick.
    fn step(&mut self, input: InputFrame) -> anyhow::Result<BackendStep>;

    /// Presents the latest frame. Headless backends need not override this.
    fn render(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// `(height, width)` of raw frames.
    fn frame_shape(&self) -> (usize, usize);
}

// =============================================================================
// Environment Constants
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Frames kept in the ring; a multiple of three.
    pub num_frames: usize,
    /// Emulator ticks each input frame is held for.
    pub step_frames: u32,
    pub rendering: bool,
    /// When false, a round never ends the episode.
    pub reset_round: bool,
    /// Render rate cap in frames per second.
    pub frame_rate: u32,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            num_frames: 9,
            step_frames: 6,
            rendering: false,
            reset_round: true,
            frame_rate: 60,
        }
    }
}

impl EnvConfig {
    pub fn validate(&self) -> Result<()> {
        if self.num_frames == 0 || self.num_frames % FRAME_CHANNELS != 0 {
            return Err(FighterError::Config(format!(
                "num_frames must be a positive multiple of {FRAME_CHANNELS}, got {}",
                self.num_frames
            )));
        }
        if self.step_frames == 0 {
            return Err(FighterError::Config("step_frames must be positive".into()));
        }
        if self.frame_rate == 0 {
            return Err(FighterError::Config("frame_rate must be positive".into()));
        }
        Ok(())
    }
}

/// Shape and value range of observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservationSpace {
    pub shape: (usize, usize, usize),
    pub low: u8,
    pub high: u8,
}

// =============================================================================
// Episode State
// =============================================================================

/// Per-episode accumulators, owned by the environment and only touched
/// inside `reset`/`step`.
#[derive(Debug, Clone)]
pub struct Episode {
    pub health: HealthTracker,
    /// Emulator ticks issued since reset.
    pub ticks: u64,
    pub steps: u64,
    pub total_reward: f64,
    pub frames: FrameStack,
    /// Status dictionary at the end of the last step.
    pub last_info: Option<Info>,
}

impl Episode {
    fn new(config: &EnvConfig, rc: &RewardConfig) -> Self {
        Self {
            health: HealthTracker::new(rc.full_hp),
            ticks: 0,
            steps: 0,
            total_reward: 0.0,
            frames: FrameStack::new(config.num_frames),
            last_info: None,
        }
    }

    fn reset(&mut self, rc: &RewardConfig, first: Frame) {
        self.health.reset(rc.full_hp);
        self.ticks = 0;
        self.steps = 0;
        self.total_reward = 0.0;
        self.last_info = None;
        self.frames.fill(first);
    }
}

struct FrameClock {
    frame_duration: Duration,
    next_frame_deadline: Option<Instant>,
}

impl FrameClock {
    fn new(frame_rate: u32) -> Self {
        Self {
            frame_duration: Duration::from_nanos(1_000_000_000 / frame_rate as u64),
            next_frame_deadline: None,
        }
    }

    fn reset(&mut self) {
        self.next_frame_deadline = None;
    }

    fn throttle(&mut self) {
        let now = Instant::now();
        match self.next_frame_deadline {
            Some(deadline) if deadline > now => {
                std::thread::sleep(deadline - now);
                self.next_frame_deadline = Some(deadline + self.frame_duration);
            }
            _ => {
                self.next_frame_deadline = Some(now + self.frame_duration);
            }
        }
    }
}

// =============================================================================
// Fighter Environment
// =============================================================================

pub struct StepResult {
    pub observation: Frame,
    /// Scaled shaped reward.
    pub reward: f64,
    pub done: bool,
    pub info: Info,
}

/// Plays the scripted fighter: every `step` picks a combo from the last known
/// status, replays it against the backend and scores the health exchange.
pub struct FighterEnv<B: Backend> {
    backend: B,
    policy: Policy,
    env_config: EnvConfig,
    pub reward_config: RewardConfig,
    episode: Episode,
    clock: FrameClock,
    reward_debug: bool,
    reward_breakdown: RewardBreakdown,
}

impl<B: Backend> FighterEnv<B> {
    pub fn new(
        backend: B,
        policy: Policy,
        env_config: EnvConfig,
        reward_config: RewardConfig,
    ) -> Result<Self> {
        env_config.validate()?;
        if !policy.has_catch_all() {
            warn!("rule table has no catch-all rule; some states will fail to decide");
        }
        let episode = Episode::new(&env_config, &reward_config);
        let clock = FrameClock::new(env_config.frame_rate);
        Ok(Self {
            backend,
            policy,
            env_config,
            reward_config,
            episode,
            clock,
            reward_debug: Self::debug_reward_enabled(),
            reward_breakdown: RewardBreakdown::default(),
        })
    }

    fn debug_reward_enabled() -> bool {
        match std::env::var("SF_DEBUG_REWARD") {
            Ok(val) => matches!(val.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"),
            Err(_) => false,
        }
    }

    pub fn set_reward_debug(&mut self, enabled: bool) {
        self.reward_debug = enabled;
    }

    pub fn reward_debug_enabled(&self) -> bool {
        self.reward_debug
    }

    pub fn clear_reward_breakdown(&mut self) {
        self.reward_breakdown = RewardBreakdown::default();
    }

    pub fn reward_breakdown(&self) -> RewardBreakdown {
        self.reward_breakdown
    }

    pub fn env_config(&self) -> &EnvConfig {
        &self.env_config
    }

    /// Ring size and frame rate are fixed at construction; only the two
    /// runtime switches can change.
    pub fn set_rendering(&mut self, rendering: bool) {
        self.env_config.rendering = rendering;
        self.clock.reset();
    }

    pub fn set_reset_round(&mut self, reset_round: bool) {
        self.env_config.reset_round = reset_round;
    }

    pub fn episode(&self) -> &Episode {
        &self.episode
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn observation_space(&self) -> ObservationSpace {
        let (height, width) = self.backend.frame_shape();
        ObservationSpace {
            shape: (height.div_ceil(2), width.div_ceil(2), FRAME_CHANNELS),
            low: 0,
            high: 255,
        }
    }

    pub fn reset(&mut self) -> Result<Frame> {
        info!("Reset game");
        let first = self.backend.reset()?;
        self.check_shape(&first)?;
        self.episode.reset(&self.reward_config, first.downsample());
        self.clock.reset();
        self.episode.frames.observation().ok_or(FighterError::NotReset)
    }

    /// `action` is accepted so the environment fits a training loop, but the
    /// fighter only follows its own rule table.
    pub fn step<A>(&mut self, _action: A) -> Result<StepResult> {
        if !self.episode.frames.is_full() {
            return Err(FighterError::NotReset);
        }

        let fighter = self.policy.snapshot(self.episode.last_info.as_ref());
        let decision = self.policy.decide(&fighter)?;
        debug!(
            rule = decision.rule,
            chosen = decision.chosen.name(),
            distance = fighter.distance(),
            facing_right = fighter.facing_right(),
            "decision"
        );
        let sequence = decision.sequence;

        if sequence.is_empty() {
            warn!("empty move sequence, skipping step");
            return Ok(StepResult {
                observation: self.observation()?,
                reward: 0.0,
                done: false,
                info: self.episode.last_info.clone().unwrap_or_default(),
            });
        }

        let mut last_info = None;
        for &input in &sequence {
            for _ in 0..self.env_config.step_frames {
                let out = self.backend.step(input)?;
                self.check_shape(&out.frame)?;
                self.episode.ticks += 1;
                self.episode.frames.push(out.frame.downsample());
                if self.env_config.rendering {
                    self.backend.render()?;
                    self.clock.throttle();
                }
                last_info = Some(out.info);
            }
        }
        let info = last_info
            .ok_or_else(|| FighterError::Config("step_frames must be positive".into()))?;
        self.episode.last_info = Some(info.clone());

        let (agent_hp, enemy_hp) = read_health(&info)?;
        let breakdown = self.reward_debug.then_some(&mut self.reward_breakdown);
        let outcome = self
            .episode
            .health
            .update(&self.reward_config, agent_hp, enemy_hp, breakdown);

        self.episode.steps += 1;
        self.episode.total_reward += outcome.scaled;
        if outcome.result != RoundResult::Ongoing {
            info!(
                result = ?outcome.result,
                agent_hp,
                enemy_hp,
                total_reward = self.episode.total_reward,
                ticks = self.episode.ticks,
                "round over"
            );
        }

        Ok(StepResult {
            observation: self.observation()?,
            reward: outcome.scaled,
            done: outcome.is_terminal() && self.env_config.reset_round,
            info,
        })
    }

    fn check_shape(&self, frame: &Frame) -> Result<()> {
        let expected = self.backend.frame_shape();
        let got = (frame.height(), frame.width());
        if got != expected {
            return Err(FighterError::Backend(anyhow::anyhow!(
                "backend frame is {}x{}, expected {}x{}",
                got.0,
                got.1,
                expected.0,
                expected.1
            )));
        }
        Ok(())
    }

    fn observation(&self) -> Result<Frame> {
        self.episode.frames.observation().ok_or(FighterError::NotReset)
    }
}
