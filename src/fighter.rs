use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Status dictionary reported by the emulator after every tick.
pub type Info = HashMap<String, i64>;

/// Field names of the status dictionary.
pub mod keys {
    pub const AGENT_X: &str = "agent_x";
    pub const AGENT_Y: &str = "agent_y";
    pub const ENEMY_X: &str = "enemy_x";
    pub const ENEMY_Y: &str = "enemy_y";
    pub const AGENT_STATUS: &str = "agent_status";
    pub const ENEMY_STATUS: &str = "enemy_status";
    pub const AGENT_HP: &str = "agent_hp";
    pub const ENEMY_HP: &str = "enemy_hp";
}

/// Distance assumed before the first status dictionary of an episode arrives.
pub const DEFAULT_DISTANCE: i64 = 145;

// =============================================================================
// Status Codes
// =============================================================================

/// Animation/state code of one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Standing,
    Crouching,
    Jumping,
    Blocking,
    NormalAttack,
    SpecialAttack,
    HitStun,
    Thrown,
    Other(i64),
}

impl Status {
    pub fn from_code(code: i64) -> Self {
        match code {
            512 => Status::Standing,
            514 => Status::Crouching,
            516 => Status::Jumping,
            518 => Status::Blocking,
            522 => Status::NormalAttack,
            524 => Status::SpecialAttack,
            526 => Status::HitStun,
            532 => Status::Thrown,
            other => Status::Other(other),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Status::Standing => 512,
            Status::Crouching => 514,
            Status::Jumping => 516,
            Status::Blocking => 518,
            Status::NormalAttack => 522,
            Status::SpecialAttack => 524,
            Status::HitStun => 526,
            Status::Thrown => 532,
            Status::Other(code) => code,
        }
    }
}

/// How "enemy is in the air" is derived from the status dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AirborneDetection {
    /// `min < enemy_y < max`.
    HeightBand { min: i64, max: i64 },
    /// `enemy_status == JUMPING`.
    Status,
}

impl Default for AirborneDetection {
    fn default() -> Self {
        AirborneDetection::HeightBand { min: 105, max: 130 }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Situational snapshot of both characters, derived once per decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fighter {
    agent_x: i64,
    agent_y: i64,
    enemy_x: i64,
    enemy_y: i64,
    agent_status: Status,
    enemy_status: Status,
    facing_right: bool,
    distance: i64,
    enemy_airborne: bool,
}

impl Fighter {
    /// Builds a snapshot from the last status dictionary. Missing position
    /// and status fields read as zero; no dictionary at all gives the
    /// start-of-round default.
    pub fn from_info(info: Option<&Info>, airborne: AirborneDetection) -> Self {
        let Some(info) = info else {
            return Self::initial();
        };
        let get = |key: &str| info.get(key).copied().unwrap_or(0);

        let agent_x = get(keys::AGENT_X);
        let enemy_x = get(keys::ENEMY_X);
        let enemy_y = get(keys::ENEMY_Y);
        let enemy_status = Status::from_code(get(keys::ENEMY_STATUS));
        let enemy_airborne = match airborne {
            AirborneDetection::HeightBand { min, max } => enemy_y > min && enemy_y < max,
            AirborneDetection::Status => enemy_status == Status::Jumping,
        };

        Self {
            agent_x,
            agent_y: get(keys::AGENT_Y),
            enemy_x,
            enemy_y,
            agent_status: Status::from_code(get(keys::AGENT_STATUS)),
            enemy_status,
            facing_right: agent_x < enemy_x,
            distance: (enemy_x - agent_x).abs(),
            enemy_airborne,
        }
    }

    /// Facing right, 145 units apart, both standing.
    pub fn initial() -> Self {
        Self {
            agent_x: 0,
            agent_y: 0,
            enemy_x: 0,
            enemy_y: 0,
            agent_status: Status::Standing,
            enemy_status: Status::Standing,
            facing_right: true,
            distance: DEFAULT_DISTANCE,
            enemy_airborne: false,
        }
    }

    pub fn agent_pos(&self) -> (i64, i64) {
        (self.agent_x, self.agent_y)
    }

    pub fn enemy_pos(&self) -> (i64, i64) {
        (self.enemy_x, self.enemy_y)
    }

    pub fn agent_status(&self) -> Status {
        self.agent_status
    }

    pub fn enemy_status(&self) -> Status {
        self.enemy_status
    }

    pub fn facing_right(&self) -> bool {
        self.facing_right
    }

    pub fn distance(&self) -> i64 {
        self.distance
    }

    pub fn is_standing(&self) -> bool {
        self.agent_status == Status::Standing
    }

    pub fn is_enemy_airborne(&self) -> bool {
        self.enemy_airborne
    }

    /// Anything but being thrown counts as grounded.
    pub fn is_enemy_grounded(&self) -> bool {
        self.enemy_status != Status::Thrown
    }

    pub fn is_enemy_stunned(&self) -> bool {
        self.enemy_status == Status::HitStun
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(agent_x: i64, enemy_x: i64, enemy_y: i64, enemy_status: i64) -> Info {
        Info::from([
            (keys::AGENT_X.to_string(), agent_x),
            (keys::AGENT_Y.to_string(), 192),
            (keys::ENEMY_X.to_string(), enemy_x),
            (keys::ENEMY_Y.to_string(), enemy_y),
            (keys::AGENT_STATUS.to_string(), 512),
            (keys::ENEMY_STATUS.to_string(), enemy_status),
        ])
    }

    #[test]
    fn test_status_codes_round_trip_through_boundary() {
        assert_eq!(Status::from_code(526), Status::HitStun);
        assert_eq!(Status::from_code(532), Status::Thrown);
        assert_eq!(Status::from_code(600), Status::Other(600));
        assert_eq!(Status::Jumping.code(), 516);
    }

    #[test]
    fn test_default_snapshot() {
        let f = Fighter::from_info(None, AirborneDetection::default());
        assert!(f.facing_right());
        assert_eq!(f.distance(), 145);
        assert!(f.is_standing());
        assert_eq!(f.enemy_status(), Status::Standing);
        assert!(!f.is_enemy_airborne());
        assert!(!f.is_enemy_stunned());
        assert!(f.is_enemy_grounded());
    }

    #[test]
    fn test_facing_and_distance() {
        let right = Fighter::from_info(Some(&info(100, 180, 192, 512)), AirborneDetection::default());
        assert!(right.facing_right());
        assert_eq!(right.distance(), 80);

        let left = Fighter::from_info(Some(&info(300, 180, 192, 512)), AirborneDetection::default());
        assert!(!left.facing_right());
        assert_eq!(left.distance(), 120);
    }

    #[test]
    fn test_snapshot_derivation_is_idempotent() {
        let i = info(150, 250, 120, 526);
        let a = Fighter::from_info(Some(&i), AirborneDetection::default());
        let b = Fighter::from_info(Some(&i), AirborneDetection::default());
        assert_eq!(a, b);
        assert_eq!(a.distance(), b.distance());
        assert_eq!(a.facing_right(), b.facing_right());
    }

    #[test]
    fn test_airborne_height_band_is_exclusive() {
        let det = AirborneDetection::default();
        assert!(!Fighter::from_info(Some(&info(0, 100, 105, 512)), det).is_enemy_airborne());
        assert!(Fighter::from_info(Some(&info(0, 100, 106, 512)), det).is_enemy_airborne());
        assert!(Fighter::from_info(Some(&info(0, 100, 129, 512)), det).is_enemy_airborne());
        assert!(!Fighter::from_info(Some(&info(0, 100, 130, 512)), det).is_enemy_airborne());
    }

    #[test]
    fn test_airborne_from_status() {
        let det = AirborneDetection::Status;
        assert!(Fighter::from_info(Some(&info(0, 100, 192, 516)), det).is_enemy_airborne());
        assert!(!Fighter::from_info(Some(&info(0, 100, 120, 512)), det).is_enemy_airborne());
    }

    #[test]
    fn test_missing_fields_read_as_zero() {
        let partial = Info::from([(keys::ENEMY_X.to_string(), 40)]);
        let f = Fighter::from_info(Some(&partial), AirborneDetection::default());
        assert_eq!(f.agent_pos(), (0, 0));
        assert_eq!(f.distance(), 40);
        assert_eq!(f.enemy_status(), Status::Other(0));
    }

    #[test]
    fn test_enemy_flags() {
        let det = AirborneDetection::default();
        let thrown = Fighter::from_info(Some(&info(0, 30, 192, 532)), det);
        assert!(!thrown.is_enemy_grounded());
        let stunned = Fighter::from_info(Some(&info(0, 30, 192, 526)), det);
        assert!(stunned.is_enemy_stunned());
        assert!(stunned.is_enemy_grounded());
    }
}
