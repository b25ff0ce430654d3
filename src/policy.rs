use serde::{Deserialize, Serialize};

use crate::error::{FighterError, Result};
use crate::fighter::{AirborneDetection, Fighter, Info};
use crate::input::{MoveSequence, Punch};
use crate::moves::Move;

// =============================================================================
// Conditions
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    EnemyAirborne,
    EnemyGrounded,
    EnemyStunned,
    EnemyNotStunned,
    /// `distance >= n`
    DistanceAtLeast(i64),
    /// `distance <= n`
    DistanceAtMost(i64),
    /// `distance < n`
    DistanceBelow(i64),
}

impl Condition {
    pub fn holds(&self, f: &Fighter) -> bool {
        match *self {
            Condition::EnemyAirborne => f.is_enemy_airborne(),
            Condition::EnemyGrounded => f.is_enemy_grounded(),
            Condition::EnemyStunned => f.is_enemy_stunned(),
            Condition::EnemyNotStunned => !f.is_enemy_stunned(),
            Condition::DistanceAtLeast(n) => f.distance() >= n,
            Condition::DistanceAtMost(n) => f.distance() <= n,
            Condition::DistanceBelow(n) => f.distance() < n,
        }
    }
}

/// One row of the decision table: all conditions must hold (an empty list
/// always holds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    #[serde(default)]
    pub when: Vec<Condition>,
    pub then: Move,
}

impl Rule {
    pub fn new(name: &str, when: Vec<Condition>, then: Move) -> Self {
        Self {
            name: name.to_string(),
            when,
            then,
        }
    }

    pub fn matches(&self, f: &Fighter) -> bool {
        self.when.iter().all(|c| c.holds(f))
    }
}

// =============================================================================
// Policy
// =============================================================================

/// Ordered rule table plus the snapshot derivation settings it relies on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    pub airborne: AirborneDetection,
    pub rules: Vec<Rule>,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            airborne: AirborneDetection::default(),
            rules: vec![
                Rule::new(
                    "anti_air",
                    vec![
                        Condition::EnemyAirborne,
                        Condition::DistanceAtLeast(90),
                        Condition::DistanceAtMost(105),
                    ],
                    Move::Shoryuken(Punch::Heavy),
                ),
                Rule::new(
                    "long_range",
                    vec![Condition::DistanceAtLeast(145), Condition::EnemyNotStunned],
                    Move::Hadouken(Punch::Heavy),
                ),
                Rule::new(
                    "close_range",
                    vec![Condition::DistanceBelow(45), Condition::EnemyGrounded],
                    Move::Attack(Punch::Heavy),
                ),
                Rule::new(
                    "punish_stun",
                    vec![Condition::EnemyStunned],
                    Move::Hadouken(Punch::Heavy),
                ),
                Rule::new("guard", vec![], Move::Defense),
            ],
        }
    }
}

/// Outcome of one decision.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision<'a> {
    pub rule: &'a str,
    pub chosen: &'a Move,
    pub sequence: MoveSequence,
}

impl Policy {
    pub fn snapshot(&self, info: Option<&Info>) -> Fighter {
        Fighter::from_info(info, self.airborne)
    }

    /// First matching rule wins.
    pub fn decide(&self, f: &Fighter) -> Result<Decision<'_>> {
        let rule = self
            .rules
            .iter()
            .find(|r| r.matches(f))
            .ok_or(FighterError::NoRuleMatched)?;
        Ok(Decision {
            rule: &rule.name,
            chosen: &rule.then,
            sequence: rule.then.sequence(f.facing_right()),
        })
    }

    pub fn select_move(&self, f: &Fighter) -> Result<MoveSequence> {
        self.decide(f).map(|d| d.sequence)
    }

    /// A table without a catch-all row can fail to decide.
    pub fn has_catch_all(&self) -> bool {
        self.rules.iter().any(|r| r.when.is_empty())
    }
}
