use serde::{Deserialize, Serialize};

use crate::error::{FighterError, Result};
use crate::fighter::{Info, keys};

// =============================================================================
// Reward Tuning Knobs
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    pub full_hp: i64,
    /// Weight of damage dealt relative to damage taken.
    pub reward_coeff: f64,
    pub reward_scale: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            full_hp: 176,
            reward_coeff: 3.0,
            reward_scale: 0.001,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundResult {
    Ongoing,
    Won,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardOutcome {
    /// Before scaling.
    pub raw: f64,
    pub scaled: f64,
    pub result: RoundResult,
}

impl RewardOutcome {
    pub fn is_terminal(&self) -> bool {
        self.result != RoundResult::Ongoing
    }
}

/// Scaled reward split by source, only collected when debugging rewards.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RewardBreakdown {
    pub damage_dealt: f64,
    pub damage_taken: f64,
    pub win: f64,
    pub loss: f64,
}

/// Reads `(agent_hp, enemy_hp)`; both are required.
pub fn read_health(info: &Info) -> Result<(i64, i64)> {
    let get = |field: &'static str| {
        info.get(field)
            .copied()
            .ok_or(FighterError::MissingTelemetry { field })
    };
    Ok((get(keys::AGENT_HP)?, get(keys::ENEMY_HP)?))
}

// =============================================================================
// Health Tracking
// =============================================================================

/// Health seen at the end of the previous non-terminal step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthTracker {
    pub prev_agent_hp: i64,
    pub prev_enemy_hp: i64,
}

impl HealthTracker {
    pub fn new(full_hp: i64) -> Self {
        Self {
            prev_agent_hp: full_hp,
            prev_enemy_hp: full_hp,
        }
    }

    pub fn reset(&mut self, full_hp: i64) {
        *self = Self::new(full_hp);
    }

    /// Shaped reward for the health reading at the end of a step.
    ///
    /// Negative health ends the round. The terminal reward grows with the
    /// winner's remaining health; otherwise the reward is the weighted damage
    /// exchanged since the last step, and the stored health advances.
    pub fn update(
        &mut self,
        rc: &RewardConfig,
        agent_hp: i64,
        enemy_hp: i64,
        breakdown: Option<&mut RewardBreakdown>,
    ) -> RewardOutcome {
        let full = rc.full_hp as f64;
        let exponent = |hp: i64| (hp as f64 + 1.0) / (full + 1.0);

        let (raw, result) = if agent_hp < 0 {
            let raw = -full.powf(exponent(enemy_hp));
            if let Some(b) = breakdown {
                b.loss += raw * rc.reward_scale;
            }
            (raw, RoundResult::Lost)
        } else if enemy_hp < 0 {
            let raw = full.powf(exponent(agent_hp)) * rc.reward_coeff;
            if let Some(b) = breakdown {
                b.win += raw * rc.reward_scale;
            }
            (raw, RoundResult::Won)
        } else {
            let dealt = (self.prev_enemy_hp - enemy_hp) as f64;
            let taken = (self.prev_agent_hp - agent_hp) as f64;
            if let Some(b) = breakdown {
                b.damage_dealt += rc.reward_coeff * dealt * rc.reward_scale;
                b.damage_taken -= taken * rc.reward_scale;
            }
            self.prev_agent_hp = agent_hp;
            self.prev_enemy_hp = enemy_hp;
            (rc.reward_coeff * dealt - taken, RoundResult::Ongoing)
        };

        RewardOutcome {
            raw,
            scaled: raw * rc.reward_scale,
            result,
        }
    }
}
