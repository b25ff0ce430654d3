use serde::{Deserialize, Serialize};

use crate::input::{Button, InputFrame, Kick, MoveSequence, Punch};

/// Canned moves the fighter knows.
///
/// Every move is written down facing right; [`Move::sequence`] mirrors it when
/// the agent faces left. Motions are split into one frame per joystick
/// position since single-tick diagonals do not always register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Move {
    /// → , → + P
    Attack(Punch),
    /// ↓ , ↘ , → , P
    Hadouken(Punch),
    /// → , ↓ , ↘ , P
    Shoryuken(Punch),
    /// ↓ , ↙ , ← , K
    HurricaneKick(Kick),
    /// → , → + P
    Throw(Punch),
    /// ↗ , K
    JumpKick(Kick),
    /// hold ←
    Defense,
    /// Facing-right frames supplied by configuration.
    Custom(Vec<InputFrame>),
}

impl Move {
    pub fn name(&self) -> &'static str {
        match self {
            Move::Attack(_) => "attack",
            Move::Hadouken(_) => "hadouken",
            Move::Shoryuken(_) => "shoryuken",
            Move::HurricaneKick(_) => "hurricane_kick",
            Move::Throw(_) => "throw",
            Move::JumpKick(_) => "jump_kick",
            Move::Defense => "defense",
            Move::Custom(_) => "custom",
        }
    }

    pub fn sequence(&self, facing_right: bool) -> MoveSequence {
        let seq = self.facing_right_sequence();
        if facing_right { seq } else { seq.mirrored() }
    }

    fn facing_right_sequence(&self) -> MoveSequence {
        let fwd = InputFrame::empty().with(Button::Right);
        let back = InputFrame::empty().with(Button::Left);
        let down = InputFrame::empty().with(Button::Down);

        let frames = match self {
            Move::Attack(p) | Move::Throw(p) => vec![fwd, fwd.with(p.button())],
            Move::Hadouken(p) => vec![
                down,
                down.with(Button::Right),
                fwd,
                InputFrame::empty().with(p.button()),
            ],
            Move::Shoryuken(p) => vec![
                fwd,
                down,
                down.with(Button::Right),
                InputFrame::empty().with(p.button()),
            ],
            Move::HurricaneKick(k) => vec![
                down,
                down.with(Button::Left),
                back,
                InputFrame::empty().with(k.button()),
            ],
            Move::JumpKick(k) => vec![
                InputFrame::empty().with(Button::Up).with(Button::Right),
                InputFrame::empty().with(k.button()),
            ],
            Move::Defense => vec![back],
            Move::Custom(frames) => frames.clone(),
        };
        MoveSequence::new(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> Vec<Move> {
        vec![
            Move::Attack(Punch::Heavy),
            Move::Hadouken(Punch::Medium),
            Move::Shoryuken(Punch::Heavy),
            Move::HurricaneKick(Kick::Light),
            Move::Throw(Punch::Heavy),
            Move::JumpKick(Kick::Heavy),
            Move::Defense,
        ]
    }

    #[test]
    fn test_hadouken_motion_facing_right() {
        let seq = Move::Hadouken(Punch::Heavy).sequence(true);
        let f = seq.frames();
        assert_eq!(f.len(), 4);
        assert_eq!(f[0], InputFrame::from_buttons(&[Button::Down]));
        assert_eq!(f[1], InputFrame::from_buttons(&[Button::Down, Button::Right]));
        assert_eq!(f[2], InputFrame::from_buttons(&[Button::Right]));
        assert_eq!(f[3], InputFrame::from_buttons(&[Button::HeavyPunch]));
    }

    #[test]
    fn test_shoryuken_ends_on_bare_punch() {
        for facing_right in [true, false] {
            let last = Move::Shoryuken(Punch::Heavy)
                .sequence(facing_right)
                .last()
                .unwrap();
            assert_eq!(last.attack_count(), 1);
            assert_eq!(last.directional_count(), 0);
            assert!(last.contains(Button::HeavyPunch));
        }
    }

    #[test]
    fn test_mirroring_flips_directions_and_keeps_attacks() {
        for mv in library() {
            let right = mv.sequence(true);
            let left = mv.sequence(false);
            assert_eq!(right.len(), left.len(), "{}", mv.name());
            for (r, l) in right.frames().iter().zip(left.frames()) {
                assert_eq!(r.contains(Button::Left), l.contains(Button::Right));
                assert_eq!(r.contains(Button::Right), l.contains(Button::Left));
                assert_eq!(r.contains(Button::Up), l.contains(Button::Up));
                assert_eq!(r.contains(Button::Down), l.contains(Button::Down));
                let r_attacks: Vec<_> = r.buttons().filter(|b| b.is_attack()).collect();
                let l_attacks: Vec<_> = l.buttons().filter(|b| b.is_attack()).collect();
                assert_eq!(r_attacks, l_attacks);
            }
        }
    }

    #[test]
    fn test_no_frame_holds_opposing_directions() {
        for mv in library() {
            for facing_right in [true, false] {
                for frame in &mv.sequence(facing_right) {
                    assert!(!frame.has_opposing_directions(), "{}", mv.name());
                }
            }
        }
    }

    #[test]
    fn test_defense_holds_away_from_opponent() {
        let right = Move::Defense.sequence(true);
        assert_eq!(right.frames(), &[InputFrame::empty().with(Button::Left)]);
        let left = Move::Defense.sequence(false);
        assert_eq!(left.frames(), &[InputFrame::empty().with(Button::Right)]);
    }

    #[test]
    fn test_throw_uses_forward_and_punch() {
        let seq = Move::Throw(Punch::Heavy).sequence(false);
        assert_eq!(
            seq.last().unwrap(),
            InputFrame::from_buttons(&[Button::Left, Button::HeavyPunch])
        );
    }

    #[test]
    fn test_custom_move_is_mirrored() {
        let mv = Move::Custom(vec![
            InputFrame::from_buttons(&[Button::Right]),
            InputFrame::from_buttons(&[Button::MediumKick]),
        ]);
        let seq = mv.sequence(false);
        assert_eq!(seq.frames()[0], InputFrame::from_buttons(&[Button::Left]));
        assert_eq!(seq.frames()[1], InputFrame::from_buttons(&[Button::MediumKick]));
    }

    #[test]
    fn test_move_serde() {
        let json = serde_json::to_string(&Move::Shoryuken(Punch::Heavy)).unwrap();
        assert_eq!(json, r#"{"shoryuken":"HP"}"#);
        let back: Move = serde_json::from_str(r#""defense""#).unwrap();
        assert_eq!(back, Move::Defense);
    }
}
