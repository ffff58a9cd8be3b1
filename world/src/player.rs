//! Player avatar state.

use std::time::Duration;

use boss_arena_core::{
    ArenaBounds, Direction, DirectionSet, GameOverCause, ObjectId, Position, Timestamp,
};

/// Walking speed used when no configuration overrides it.
pub const DEFAULT_PLAYER_SPEED: u32 = 120;

const ATTACK_DURATION: Duration = Duration::from_millis(400);
const MICROS_PER_SECOND: i64 = 1_000_000;

/// Player avatar controlled by input.
#[derive(Clone, Debug)]
pub struct Player {
    anchor: ObjectId,
    position: Position,
    speed: u32,
    carry: (i64, i64),
    facing: Direction,
    last_attack: Option<Timestamp>,
    game_over: Option<GameOverCause>,
    game_over_triggers: u32,
    bounds: Option<ArenaBounds>,
}

impl Player {
    pub(crate) fn new(
        anchor: ObjectId,
        position: Position,
        speed: u32,
        bounds: Option<ArenaBounds>,
    ) -> Self {
        Self {
            anchor,
            position,
            speed,
            carry: (0, 0),
            facing: Direction::Down,
            last_attack: None,
            game_over: None,
            game_over_triggers: 0,
            bounds,
        }
    }

    /// Registry identifier representing the player.
    #[must_use]
    pub fn anchor(&self) -> ObjectId {
        self.anchor
    }

    /// Current position.
    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    /// Walking speed in pixels per second.
    #[must_use]
    pub fn speed(&self) -> u32 {
        self.speed
    }

    /// Direction the player last walked toward.
    #[must_use]
    pub fn facing(&self) -> Direction {
        self.facing
    }

    /// Whether the attack animation is still playing at `now`.
    #[must_use]
    pub fn is_attacking(&self, now: Timestamp) -> bool {
        self.last_attack
            .is_some_and(|started| now.saturating_since(started) < ATTACK_DURATION)
    }

    /// Whether the run has ended.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.game_over.is_some()
    }

    /// First reason the run ended, if it did.
    #[must_use]
    pub fn game_over_cause(&self) -> Option<GameOverCause> {
        self.game_over
    }

    /// Number of times a game-over condition was triggered.
    #[must_use]
    pub fn game_over_triggers(&self) -> u32 {
        self.game_over_triggers
    }

    /// Walks toward the held directions for `dt`, returning the new position if it changed.
    ///
    /// Sub-pixel progress is carried between frames so slow frames and fast
    /// frames cover the same distance.
    pub(crate) fn step(&mut self, directions: DirectionSet, dt: Duration) -> Option<Position> {
        let (axis_x, axis_y) = directions.axis();
        if axis_x == 0 && axis_y == 0 {
            self.carry = (0, 0);
            return None;
        }

        if let Some(direction) = Direction::ALL
            .into_iter()
            .find(|direction| directions.contains(*direction))
        {
            self.facing = direction;
        }

        let micros = i64::try_from(dt.as_micros()).unwrap_or(i64::MAX);
        let travel = i64::from(self.speed).saturating_mul(micros);
        self.carry.0 = self
            .carry
            .0
            .saturating_add(travel.saturating_mul(i64::from(axis_x)));
        self.carry.1 = self
            .carry
            .1
            .saturating_add(travel.saturating_mul(i64::from(axis_y)));

        let dx = self.carry.0 / MICROS_PER_SECOND;
        let dy = self.carry.1 / MICROS_PER_SECOND;
        self.carry.0 -= dx * MICROS_PER_SECOND;
        self.carry.1 -= dy * MICROS_PER_SECOND;

        let next = self.position.translated(
            i32::try_from(dx).unwrap_or(0),
            i32::try_from(dy).unwrap_or(0),
            self.bounds,
        );
        if next == self.position {
            return None;
        }
        self.position = next;
        Some(next)
    }

    pub(crate) fn attack(&mut self, now: Timestamp) {
        self.last_attack = Some(now);
    }

    /// Records a game-over trigger. Returns true when this call ended the run.
    pub(crate) fn trigger_game_over(&mut self, cause: GameOverCause) -> bool {
        self.game_over_triggers = self.game_over_triggers.saturating_add(1);
        if self.game_over.is_some() {
            return false;
        }
        self.game_over = Some(cause);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(
            ObjectId::new(0),
            Position::new(100, 100),
            DEFAULT_PLAYER_SPEED,
            None,
        )
    }

    #[test]
    fn walking_accumulates_sub_pixel_progress() {
        let mut player = player();
        let right = DirectionSet {
            right: true,
            ..DirectionSet::default()
        };

        for _ in 0..10 {
            let _ = player.step(right, Duration::from_millis(5));
        }
        // 120 px/s over 50 ms.
        assert_eq!(player.position(), Position::new(106, 100));
        assert_eq!(player.facing(), Direction::Right);
    }

    #[test]
    fn walking_stops_at_the_origin() {
        let mut player = player();
        let up_left = DirectionSet {
            up: true,
            left: true,
            ..DirectionSet::default()
        };
        let _ = player.step(up_left, Duration::from_secs(5));
        assert_eq!(player.position(), Position::new(0, 0));
    }

    #[test]
    fn game_over_keeps_first_cause_and_counts_triggers() {
        let mut player = player();
        assert!(player.trigger_game_over(GameOverCause::CorpseHazard));
        assert!(!player.trigger_game_over(GameOverCause::Scripted));
        assert_eq!(player.game_over_cause(), Some(GameOverCause::CorpseHazard));
        assert_eq!(player.game_over_triggers(), 2);
    }

    #[test]
    fn attack_animation_has_fixed_length() {
        let mut player = player();
        player.attack(Timestamp::from_millis(1_000));
        assert!(player.is_attacking(Timestamp::from_millis(1_399)));
        assert!(!player.is_attacking(Timestamp::from_millis(1_400)));
    }
}
