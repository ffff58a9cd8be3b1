//! Boss state machine, damage model, and the mutex boundary that guards it.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use boss_arena_core::{
    ActionKind, ArenaBounds, BossState, DamageRejection, Direction, Event, Position, Timestamp,
    BOSS_DAMAGE_ANIMATION, BOSS_DAMAGE_COOLDOWN, BOSS_MOVE_INTERVAL, BOSS_MOVE_SETTLE_DELAY,
    BOSS_STEP_PIXELS, CONTACT_TOLERANCE_PIXELS, DAMAGE_FALLOFF_NORMALIZATION,
    DEFAULT_BOSS_MAX_HIT_POINTS, DISTANCE_UNIT_PIXELS, MAX_DAMAGE_RANGE_UNITS,
    MIN_DAMAGE_MULTIPLIER,
};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

/// Random source used to pick movement directions.
pub type BossRng = Box<dyn RngCore + Send>;

const MAX_RANGE_PIXELS_SQUARED: i64 =
    (MAX_DAMAGE_RANGE_UNITS * DISTANCE_UNIT_PIXELS) * (MAX_DAMAGE_RANGE_UNITS * DISTANCE_UNIT_PIXELS);

/// Parameters fixed when the boss is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BossConfig {
    /// Hit points the boss starts with.
    pub max_hit_points: u32,
    /// Seed for the default movement random source.
    pub rng_seed: u64,
    /// Optional arena the boss may not leave.
    pub bounds: Option<ArenaBounds>,
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            max_hit_points: DEFAULT_BOSS_MAX_HIT_POINTS,
            rng_seed: 0x5eed_b055_a7e4_a001,
            bounds: None,
        }
    }
}

/// Outcome of a damage application that landed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppliedDamage {
    /// Damage requested before falloff.
    pub requested: u32,
    /// Damage applied after falloff.
    pub applied: u32,
    /// Hit points left after the hit.
    pub remaining_hit_points: u32,
    /// Whether the hit killed the boss.
    pub killed: bool,
}

/// Plain copy of the boss used for rendering and queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BossSnapshot {
    /// Current state.
    pub state: BossState,
    /// Current hit points.
    pub hit_points: u32,
    /// Hit points at creation.
    pub max_hit_points: u32,
    /// Current position.
    pub position: Position,
    /// Whether the boss has died.
    pub is_dead: bool,
}

/// Autonomous enemy with a four-state machine.
pub struct Boss {
    state: BossState,
    hit_points: u32,
    max_hit_points: u32,
    position: Position,
    last_damage: Option<Timestamp>,
    last_move: Timestamp,
    is_dead: bool,
    bounds: Option<ArenaBounds>,
    rng: BossRng,
}

impl fmt::Debug for Boss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Boss")
            .field("state", &self.state)
            .field("hit_points", &self.hit_points)
            .field("max_hit_points", &self.max_hit_points)
            .field("position", &self.position)
            .field("last_damage", &self.last_damage)
            .field("last_move", &self.last_move)
            .field("is_dead", &self.is_dead)
            .finish_non_exhaustive()
    }
}

impl Boss {
    /// Creates an idle boss at `position`, seeding movement from the config.
    #[must_use]
    pub fn new(config: BossConfig, position: Position, now: Timestamp) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        Self::with_rng(config, position, now, Box::new(rng))
    }

    /// Creates an idle boss that draws movement directions from `rng`.
    #[must_use]
    pub fn with_rng(config: BossConfig, position: Position, now: Timestamp, rng: BossRng) -> Self {
        Self {
            state: BossState::Idle,
            hit_points: config.max_hit_points,
            max_hit_points: config.max_hit_points,
            position,
            last_damage: None,
            last_move: now,
            is_dead: false,
            bounds: config.bounds,
            rng,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> BossState {
        self.state
    }

    /// Current hit points.
    #[must_use]
    pub fn hit_points(&self) -> u32 {
        self.hit_points
    }

    /// Hit points at creation.
    #[must_use]
    pub fn max_hit_points(&self) -> u32 {
        self.max_hit_points
    }

    /// Current position.
    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    /// Whether the boss has reached the death state.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.is_dead
    }

    /// Time of the last accepted hit.
    #[must_use]
    pub fn last_damage_time(&self) -> Option<Timestamp> {
        self.last_damage
    }

    /// Time of the last move, or of creation when the boss never moved.
    #[must_use]
    pub fn last_move_time(&self) -> Timestamp {
        self.last_move
    }

    /// Captures a plain copy of the boss.
    #[must_use]
    pub fn snapshot(&self) -> BossSnapshot {
        BossSnapshot {
            state: self.state,
            hit_points: self.hit_points,
            max_hit_points: self.max_hit_points,
            position: self.position,
            is_dead: self.is_dead,
        }
    }

    /// Applies damage from `source`, returning whether it landed.
    pub fn take_damage(&mut self, amount: u32, source: Position, now: Timestamp) -> bool {
        self.try_take_damage(amount, source, now).is_ok()
    }

    /// Applies damage from `source` with inverse-square falloff.
    ///
    /// The hit is rejected while dead, while the damage animation plays,
    /// within the damage cooldown, or beyond the maximum range. An accepted
    /// hit may round down to zero damage and still counts as landed.
    pub fn try_take_damage(
        &mut self,
        amount: u32,
        source: Position,
        now: Timestamp,
    ) -> Result<AppliedDamage, DamageRejection> {
        if self.is_dead {
            return Err(DamageRejection::Dead);
        }
        if self.state == BossState::TakingDamage {
            return Err(DamageRejection::AlreadyTakingDamage);
        }
        if let Some(last) = self.last_damage {
            let elapsed = now.saturating_since(last);
            if elapsed < BOSS_DAMAGE_COOLDOWN {
                return Err(DamageRejection::CoolingDown {
                    remaining: BOSS_DAMAGE_COOLDOWN - elapsed,
                });
            }
        }

        let distance_pixels_squared = source.distance_squared(self.position);
        if distance_pixels_squared > MAX_RANGE_PIXELS_SQUARED {
            return Err(DamageRejection::OutOfRange {
                distance_pixels_squared,
            });
        }

        let multiplier = damage_multiplier(source.distance_units_squared(self.position));
        let applied = (f64::from(amount) * multiplier).floor() as u32;
        self.hit_points = self.hit_points.saturating_sub(applied);
        self.last_damage = Some(now);

        let killed = self.hit_points == 0;
        if killed {
            self.state = BossState::Death;
            self.is_dead = true;
            info!(position = %self.position, "boss defeated");
        } else {
            self.state = BossState::TakingDamage;
        }

        Ok(AppliedDamage {
            requested: amount,
            applied,
            remaining_hit_points: self.hit_points,
            killed,
        })
    }

    /// Reports whether the player touches the corpse of a defeated boss.
    #[must_use]
    pub fn check_player_collision(&self, player: Position) -> bool {
        self.is_dead
            && self.state == BossState::Death
            && self
                .position
                .within_tolerance(player, CONTACT_TOLERANCE_PIXELS)
    }

    /// Advances timers and autonomous movement.
    pub fn update(&mut self, player: Position, now: Timestamp, out_events: &mut Vec<Event>) {
        if self.is_dead {
            return;
        }

        if self.state == BossState::TakingDamage {
            let since_hit = self
                .last_damage
                .map_or(Duration::MAX, |last| now.saturating_since(last));
            if since_hit >= BOSS_DAMAGE_ANIMATION {
                self.transition(BossState::Idle, out_events);
            }
            return;
        }

        let since_move = now.saturating_since(self.last_move);
        if self.state == BossState::Move && since_move >= BOSS_MOVE_SETTLE_DELAY {
            self.transition(BossState::Idle, out_events);
        }

        if since_move >= BOSS_MOVE_INTERVAL {
            self.random_move(player, now, out_events);
        }
    }

    fn random_move(&mut self, player: Position, now: Timestamp, out_events: &mut Vec<Event>) {
        let direction = Direction::ALL[self.rng.gen_range(0..Direction::ALL.len())];
        let from = self.position;
        self.position = from.stepped(direction, BOSS_STEP_PIXELS, self.bounds);
        self.last_move = now;
        debug!(
            %from,
            to = %self.position,
            ?direction,
            distance_to_player = self.position.distance_squared(player),
            "boss moved"
        );
        out_events.push(Event::BossMoved {
            from,
            to: self.position,
            direction,
        });
        self.transition(BossState::Move, out_events);
    }

    fn transition(&mut self, to: BossState, out_events: &mut Vec<Event>) {
        if self.state == to {
            return;
        }
        out_events.push(Event::BossStateChanged {
            from: self.state,
            to,
        });
        self.state = to;
    }
}

/// Falloff multiplier for a source `distance_units_squared` away.
///
/// Equals 1 at distance zero and reaches the floor at the maximum range.
#[must_use]
pub fn damage_multiplier(distance_units_squared: f64) -> f64 {
    let max_range = MAX_DAMAGE_RANGE_UNITS as f64;
    let ratio_squared = distance_units_squared / (max_range * max_range);
    (1.0 / (1.0 + ratio_squared * DAMAGE_FALLOFF_NORMALIZATION)).max(MIN_DAMAGE_MULTIPLIER)
}

/// Shared handle to the boss.
///
/// Every path that reads or mutates the boss, including delayed effects
/// resolved off the frame thread, goes through this single lock.
#[derive(Clone, Debug)]
pub struct BossHandle {
    inner: Arc<Mutex<Boss>>,
}

impl BossHandle {
    /// Wraps `boss` in a new shared handle.
    #[must_use]
    pub fn new(boss: Boss) -> Self {
        Self {
            inner: Arc::new(Mutex::new(boss)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Boss> {
        // Every boss method leaves the fields consistent, so a poisoned lock is still usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` with exclusive access to the boss.
    pub fn with<R>(&self, f: impl FnOnce(&mut Boss) -> R) -> R {
        let mut boss = self.lock();
        f(&mut boss)
    }

    /// Captures a plain copy of the boss.
    #[must_use]
    pub fn snapshot(&self) -> BossSnapshot {
        self.lock().snapshot()
    }

    /// Advances the boss under the lock.
    pub fn update(&self, player: Position, now: Timestamp, out_events: &mut Vec<Event>) {
        self.lock().update(player, now, out_events);
    }

    /// Reports whether the player touches the corpse of a defeated boss.
    #[must_use]
    pub fn check_player_collision(&self, player: Position) -> bool {
        self.lock().check_player_collision(player)
    }

    /// Applies damage atomically and reports the outcome as events.
    pub fn apply_damage(
        &self,
        action: Option<ActionKind>,
        amount: u32,
        source: Position,
        now: Timestamp,
        out_events: &mut Vec<Event>,
    ) -> Result<AppliedDamage, DamageRejection> {
        let mut boss = self.lock();
        let previous = boss.state();
        let outcome = boss.try_take_damage(amount, source, now);
        match outcome {
            Ok(applied) => {
                out_events.push(Event::BossDamaged {
                    action,
                    requested: applied.requested,
                    applied: applied.applied,
                    remaining_hit_points: applied.remaining_hit_points,
                });
                out_events.push(Event::BossStateChanged {
                    from: previous,
                    to: boss.state(),
                });
                if applied.killed {
                    out_events.push(Event::BossDied {
                        position: boss.position(),
                    });
                }
            }
            Err(reason) => out_events.push(Event::DamageRejected { action, reason }),
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boss_at_origin() -> Boss {
        Boss::new(
            BossConfig::default(),
            Position::new(320, 320),
            Timestamp::ZERO,
        )
    }

    #[test]
    fn multiplier_is_one_at_zero_distance_and_floors_at_max_range() {
        assert!((damage_multiplier(0.0) - 1.0).abs() < f64::EPSILON);
        let at_max = damage_multiplier(400.0);
        assert!((at_max - MIN_DAMAGE_MULTIPLIER).abs() < 1e-12);
        assert!(damage_multiplier(10_000.0) >= MIN_DAMAGE_MULTIPLIER);
    }

    #[test]
    fn multiplier_decreases_with_distance() {
        let near = damage_multiplier(1.0);
        let mid = damage_multiplier(100.0);
        let far = damage_multiplier(300.0);
        assert!(near > mid && mid > far);
    }

    #[test]
    fn zero_distance_hit_applies_nearly_full_damage() {
        let mut boss = boss_at_origin();
        let outcome = boss
            .try_take_damage(100, boss.position(), Timestamp::from_millis(10))
            .expect("hit should land");
        assert!(outcome.applied >= 99);
        assert_eq!(boss.hit_points(), 50);
        assert_eq!(boss.state(), BossState::TakingDamage);
    }

    #[test]
    fn hit_at_max_range_applies_at_most_one_point() {
        let mut boss = boss_at_origin();
        let source = Position::new(320 + 20 * 16, 320);
        let outcome = boss
            .try_take_damage(100, source, Timestamp::from_millis(10))
            .expect("hit at exactly max range should land");
        assert!(outcome.applied <= 1);
    }

    #[test]
    fn hit_beyond_max_range_is_rejected() {
        let mut boss = boss_at_origin();
        let source = Position::new(320 + 20 * 16 + 1, 320);
        let outcome = boss.try_take_damage(100, source, Timestamp::from_millis(10));
        assert!(matches!(outcome, Err(DamageRejection::OutOfRange { .. })));
        assert_eq!(boss.hit_points(), DEFAULT_BOSS_MAX_HIT_POINTS);
        assert_eq!(boss.state(), BossState::Idle);
    }

    #[test]
    fn second_hit_within_cooldown_is_rejected() {
        let mut boss = boss_at_origin();
        assert!(boss.take_damage(10, boss.position(), Timestamp::from_millis(0)));
        let hp = boss.hit_points();
        assert!(!boss.take_damage(10, boss.position(), Timestamp::from_millis(400)));
        assert_eq!(boss.hit_points(), hp);
    }

    #[test]
    fn cooldown_is_reported_when_animation_already_finished() {
        let mut boss = boss_at_origin();
        assert!(boss.take_damage(10, boss.position(), Timestamp::from_millis(1_000)));
        // Force the animation to end early to isolate the cooldown gate.
        boss.state = BossState::Idle;
        let outcome = boss.try_take_damage(10, boss.position(), Timestamp::from_millis(1_200));
        assert_eq!(
            outcome,
            Err(DamageRejection::CoolingDown {
                remaining: Duration::from_millis(300)
            })
        );
    }

    #[test]
    fn hit_points_never_underflow() {
        let mut boss = Boss::new(
            BossConfig {
                max_hit_points: 10,
                ..BossConfig::default()
            },
            Position::new(0, 0),
            Timestamp::ZERO,
        );
        let outcome = boss
            .try_take_damage(500, Position::new(0, 0), Timestamp::ZERO)
            .expect("hit should land");
        assert_eq!(outcome.remaining_hit_points, 0);
        assert!(outcome.killed);
        assert!(boss.is_dead());
        assert_eq!(boss.state(), BossState::Death);
    }

    #[test]
    fn update_reverts_damage_state_without_moving() {
        let mut boss = boss_at_origin();
        let start = boss.position();
        assert!(boss.take_damage(10, start, Timestamp::from_millis(100)));
        let mut events = Vec::new();

        boss.update(start, Timestamp::from_millis(900), &mut events);
        assert_eq!(boss.state(), BossState::TakingDamage);

        boss.update(start, Timestamp::from_millis(1_200), &mut events);
        assert_eq!(boss.state(), BossState::Idle);
        assert_eq!(boss.position(), start);
        assert_eq!(
            events,
            vec![Event::BossStateChanged {
                from: BossState::TakingDamage,
                to: BossState::Idle
            }]
        );
    }

    #[test]
    fn boss_moves_one_step_after_interval_then_settles() {
        let mut boss = boss_at_origin();
        let start = boss.position();
        let mut events = Vec::new();

        boss.update(start, Timestamp::from_millis(999), &mut events);
        assert!(events.is_empty());

        boss.update(start, Timestamp::from_millis(1_000), &mut events);
        assert_eq!(boss.state(), BossState::Move);
        assert_eq!(boss.last_move_time(), Timestamp::from_millis(1_000));
        assert_eq!(
            boss.position().distance_squared(start),
            i64::from(BOSS_STEP_PIXELS * BOSS_STEP_PIXELS)
        );

        boss.update(start, Timestamp::from_millis(1_299), &mut events);
        assert_eq!(boss.state(), BossState::Move);
        boss.update(start, Timestamp::from_millis(1_300), &mut events);
        assert_eq!(boss.state(), BossState::Idle);
    }

    #[test]
    fn repeated_updates_at_same_instant_are_idempotent() {
        let mut boss = boss_at_origin();
        let mut first = Vec::new();
        boss.update(Position::default(), Timestamp::from_millis(1_500), &mut first);
        let after_first = boss.snapshot();

        let mut second = Vec::new();
        boss.update(Position::default(), Timestamp::from_millis(1_500), &mut second);
        assert!(second.is_empty());
        assert_eq!(boss.snapshot(), after_first);
    }

    #[test]
    fn same_seed_produces_same_path() {
        let mut first = boss_at_origin();
        let mut second = boss_at_origin();
        let mut first_events = Vec::new();
        let mut second_events = Vec::new();
        for step in 1..=12 {
            let now = Timestamp::from_millis(step * 1_000);
            first.update(Position::default(), now, &mut first_events);
            second.update(Position::default(), now, &mut second_events);
        }
        assert_eq!(first_events, second_events);
        assert_eq!(first.position(), second.position());
    }

    #[test]
    fn corpse_collision_requires_death() {
        let mut boss = boss_at_origin();
        let nearby = Position::new(330, 300);
        assert!(!boss.check_player_collision(nearby));

        assert!(boss.take_damage(1_000, boss.position(), Timestamp::ZERO));
        assert!(boss.check_player_collision(nearby));
        assert!(!boss.check_player_collision(Position::new(400, 320)));
    }

    #[test]
    fn handle_reports_damage_and_death_events() {
        let handle = BossHandle::new(Boss::new(
            BossConfig {
                max_hit_points: 20,
                ..BossConfig::default()
            },
            Position::new(64, 64),
            Timestamp::ZERO,
        ));
        let mut events = Vec::new();
        let outcome = handle.apply_damage(
            Some(ActionKind::Light),
            25,
            Position::new(64, 64),
            Timestamp::from_millis(10),
            &mut events,
        );
        assert!(matches!(outcome, Ok(AppliedDamage { killed: true, .. })));
        assert_eq!(
            events,
            vec![
                Event::BossDamaged {
                    action: Some(ActionKind::Light),
                    requested: 25,
                    applied: 25,
                    remaining_hit_points: 0,
                },
                Event::BossStateChanged {
                    from: BossState::Idle,
                    to: BossState::Death,
                },
                Event::BossDied {
                    position: Position::new(64, 64),
                },
            ]
        );

        events.clear();
        let again = handle.apply_damage(
            Some(ActionKind::Heavy),
            75,
            Position::new(64, 64),
            Timestamp::from_millis(5_000),
            &mut events,
        );
        assert_eq!(again, Err(DamageRejection::Dead));
        assert_eq!(
            events,
            vec![Event::DamageRejected {
                action: Some(ActionKind::Heavy),
                reason: DamageRejection::Dead,
            }]
        );
    }
}
