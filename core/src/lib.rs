#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Boss Arena engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! describing what actually happened. All timing is expressed through
//! [`Timestamp`] values produced by a [`Clock`] so that simulations can be
//! replayed deterministically.

use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Boss Arena.";

/// Minimum time the boss waits between two autonomous moves.
pub const BOSS_MOVE_INTERVAL: Duration = Duration::from_secs(1);
/// Time the boss lingers in the move state before settling back to idle.
pub const BOSS_MOVE_SETTLE_DELAY: Duration = Duration::from_millis(300);
/// Length of the damage animation during which further hits are ignored.
pub const BOSS_DAMAGE_ANIMATION: Duration = Duration::from_millis(1000);
/// Minimum time between two accepted hits on the boss.
pub const BOSS_DAMAGE_COOLDOWN: Duration = Duration::from_millis(500);
/// Pixels travelled by the boss on a single move.
pub const BOSS_STEP_PIXELS: i32 = 32;
/// Hit points assigned to the boss when no configuration overrides them.
pub const DEFAULT_BOSS_MAX_HIT_POINTS: u32 = 150;

/// Number of world pixels that make up one distance unit.
pub const DISTANCE_UNIT_PIXELS: i64 = 16;
/// Maximum distance, in distance units, at which damage still lands.
pub const MAX_DAMAGE_RANGE_UNITS: i64 = 20;
/// Scales the inverse-square falloff so the multiplier bottoms out at the maximum range.
pub const DAMAGE_FALLOFF_NORMALIZATION: f64 = 99.0;
/// Lower bound applied to the damage falloff multiplier.
pub const MIN_DAMAGE_MULTIPLIER: f64 = 0.01;

/// Half-width of the square box used for contact checks against hazards.
pub const CONTACT_TOLERANCE_PIXELS: i32 = 32;

/// Delay between triggering the light action and its damage landing.
pub const LIGHT_ACTION_DELAY: Duration = Duration::from_millis(500);
/// Damage requested by the light action.
pub const LIGHT_ACTION_DAMAGE: u32 = 25;
/// Delay between triggering the heavy action and its damage landing.
pub const HEAVY_ACTION_DELAY: Duration = Duration::from_millis(1000);
/// Damage requested by the heavy action.
pub const HEAVY_ACTION_DAMAGE: u32 = 75;
/// Cooldown gating consecutive heavy actions.
pub const HEAVY_ACTION_COOLDOWN: Duration = Duration::from_secs(5);

/// Lifetime of a bomb placed by the player.
pub const BOMB_LIFETIME: Duration = Duration::from_millis(2100);

/// Point in simulated time measured from the epoch of the owning [`Clock`].
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Timestamp(Duration);

impl Timestamp {
    /// Timestamp located exactly at the clock epoch.
    pub const ZERO: Self = Self(Duration::ZERO);

    /// Creates a timestamp located `offset` after the clock epoch.
    #[must_use]
    pub const fn from_offset(offset: Duration) -> Self {
        Self(offset)
    }

    /// Creates a timestamp located the provided number of milliseconds after the epoch.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    /// Offset of the timestamp from the clock epoch.
    #[must_use]
    pub const fn offset(&self) -> Duration {
        self.0
    }

    /// Time elapsed since `earlier`, or zero when `earlier` lies in the future.
    #[must_use]
    pub fn saturating_since(self, earlier: Timestamp) -> Duration {
        self.0.saturating_sub(earlier.0)
    }

    /// Returns the timestamp shifted forward by `delta`.
    #[must_use]
    pub fn saturating_add(self, delta: Duration) -> Self {
        Self(self.0.saturating_add(delta))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.0.as_secs_f64())
    }
}

/// Source of monotonically advancing timestamps.
pub trait Clock: Send + Sync {
    /// Reads the current time.
    fn now(&self) -> Timestamp;
}

/// Wall clock measuring time since its construction.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    /// Creates a clock whose epoch is the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.epoch.elapsed())
    }
}

/// Manually advanced clock shared between threads.
///
/// Clones observe the same time, which lets tests drive a timer thread and the
/// frame loop from one place.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock positioned at the epoch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        let nanos = u64::try_from(delta.as_nanos()).unwrap_or(u64::MAX);
        let _ = self.nanos.fetch_add(nanos, Ordering::SeqCst);
    }

    /// Positions the clock at `timestamp`.
    pub fn set(&self, timestamp: Timestamp) {
        let nanos = u64::try_from(timestamp.offset().as_nanos()).unwrap_or(u64::MAX);
        self.nanos.store(nanos, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(Duration::from_nanos(self.nanos.load(Ordering::SeqCst)))
    }
}

/// Minimum spacing enforced between two occurrences of a gated action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CooldownWindow {
    last_trigger: Option<Timestamp>,
    duration: Duration,
}

impl CooldownWindow {
    /// Creates a window that has never been triggered.
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self {
            last_trigger: None,
            duration,
        }
    }

    /// Length of the window.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Time of the most recent trigger, if any.
    #[must_use]
    pub const fn last_trigger(&self) -> Option<Timestamp> {
        self.last_trigger
    }

    /// Reports whether the gated action is permitted at `now`.
    #[must_use]
    pub fn is_ready(&self, now: Timestamp) -> bool {
        self.remaining(now).is_zero()
    }

    /// Time left before the action becomes permitted again.
    #[must_use]
    pub fn remaining(&self, now: Timestamp) -> Duration {
        match self.last_trigger {
            Some(last) => self.duration.saturating_sub(now.saturating_since(last)),
            None => Duration::ZERO,
        }
    }

    /// Records that the gated action happened at `now`.
    pub fn trigger(&mut self, now: Timestamp) {
        self.last_trigger = Some(now);
    }
}

/// Cardinal movement directions in screen space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing y.
    Up,
    /// Movement toward increasing y.
    Down,
    /// Movement toward decreasing x.
    Left,
    /// Movement toward increasing x.
    Right,
}

impl Direction {
    /// Every direction in a fixed order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit offset of the direction along both axes.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

/// Set of directional inputs held during a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DirectionSet {
    /// Whether the up input is held.
    pub up: bool,
    /// Whether the down input is held.
    pub down: bool,
    /// Whether the left input is held.
    pub left: bool,
    /// Whether the right input is held.
    pub right: bool,
}

impl DirectionSet {
    /// Reports whether the provided direction is part of the set.
    #[must_use]
    pub const fn contains(&self, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    /// Number of directions held.
    #[must_use]
    pub fn count(&self) -> usize {
        Direction::ALL
            .iter()
            .filter(|direction| self.contains(**direction))
            .count()
    }

    /// Net movement along both axes, each component in `-1..=1`.
    #[must_use]
    pub fn axis(&self) -> (i32, i32) {
        Direction::ALL
            .iter()
            .filter(|direction| self.contains(**direction))
            .fold((0, 0), |(x, y), direction| {
                let (dx, dy) = direction.delta();
                (x + dx, y + dy)
            })
    }
}

/// Upper bounds of the playable area in world pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArenaBounds {
    width: i32,
    height: i32,
}

impl ArenaBounds {
    /// Creates bounds spanning `width` by `height` pixels.
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Width of the arena in pixels.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Height of the arena in pixels.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }
}

/// Integer location in world pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Creates a position at the provided pixel coordinates.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal pixel coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical pixel coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Moves `pixels` toward `direction`, never crossing zero on either axis.
    ///
    /// When `bounds` are supplied the result is also kept inside the arena.
    #[must_use]
    pub fn stepped(self, direction: Direction, pixels: i32, bounds: Option<ArenaBounds>) -> Self {
        let (dx, dy) = direction.delta();
        self.translated(dx.saturating_mul(pixels), dy.saturating_mul(pixels), bounds)
    }

    /// Shifts the position by the provided offsets, clamped like [`Position::stepped`].
    #[must_use]
    pub fn translated(self, dx: i32, dy: i32, bounds: Option<ArenaBounds>) -> Self {
        let mut x = self.x.saturating_add(dx).max(0);
        let mut y = self.y.saturating_add(dy).max(0);
        if let Some(bounds) = bounds {
            x = x.min(bounds.width.max(0));
            y = y.min(bounds.height.max(0));
        }
        Self { x, y }
    }

    /// Squared Euclidean distance in pixels.
    #[must_use]
    pub fn distance_squared(self, other: Position) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        dx * dx + dy * dy
    }

    /// Squared Euclidean distance expressed in distance units.
    #[must_use]
    pub fn distance_units_squared(self, other: Position) -> f64 {
        let unit = DISTANCE_UNIT_PIXELS as f64;
        self.distance_squared(other) as f64 / (unit * unit)
    }

    /// Reports whether `other` lies strictly inside the square box of the given half-width.
    #[must_use]
    pub fn within_tolerance(self, other: Position, tolerance: i32) -> bool {
        let tolerance = i64::from(tolerance);
        (i64::from(self.x) - i64::from(other.x)).abs() < tolerance
            && (i64::from(self.y) - i64::from(other.y)).abs() < tolerance
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Unique identifier assigned to an entry of the world object registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(u32);

impl ObjectId {
    /// Creates a new object identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Animation-linked states of the boss.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossState {
    /// Standing still between moves.
    #[default]
    Idle,
    /// Just completed a step and is settling.
    Move,
    /// Playing the hurt animation; further hits are ignored.
    TakingDamage,
    /// Defeated. Terminal.
    Death,
}

/// Player actions that schedule delayed damage against the boss.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Short-range action without a cooldown gate.
    Light,
    /// Stronger action gated by its own cooldown.
    Heavy,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => f.write_str("fart"),
            Self::Heavy => f.write_str("mega fart"),
        }
    }
}

/// Reasons a damage application against the boss may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageRejection {
    /// The boss is already dead.
    Dead,
    /// The boss is still playing its damage animation.
    AlreadyTakingDamage,
    /// The previous hit landed too recently.
    CoolingDown {
        /// Time left before another hit is accepted.
        remaining: Duration,
    },
    /// The damage source is farther than the maximum effective range.
    OutOfRange {
        /// Squared distance between source and boss in pixels.
        distance_pixels_squared: i64,
    },
}

/// What ended the player's run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOverCause {
    /// The player touched the defeated boss.
    CorpseHazard,
    /// An expiring bomb caught the player.
    Bomb {
        /// Identifier of the bomb that went off.
        object: ObjectId,
    },
    /// A script ended the run.
    Scripted,
}

/// Sprites the world knows how to reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpriteKey {
    /// The player avatar.
    Player,
    /// The player mid-attack, facing the given direction.
    PlayerAttack(Direction),
    /// A placed bomb.
    Bomb,
    /// The boss in the provided state.
    Boss(BossState),
    /// Generic marker used by decorations spawned from scripts.
    Marker,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Moves the player according to the held directions.
    StepPlayer {
        /// Directions held during the frame.
        directions: DirectionSet,
        /// Time elapsed since the previous frame.
        dt: Duration,
    },
    /// Starts a player attack.
    PlayerAttack {
        /// Time of the attack.
        now: Timestamp,
    },
    /// Advances the boss state machine.
    UpdateBoss {
        /// Time of the update.
        now: Timestamp,
    },
    /// Places a bomb into the registry.
    SpawnBomb {
        /// Location of the bomb.
        position: Position,
        /// Creation time of the bomb.
        now: Timestamp,
    },
    /// Places a purely visual object into the registry.
    SpawnDecoration {
        /// Location of the decoration.
        position: Position,
        /// Sprite drawn for the decoration.
        sprite: SpriteKey,
    },
    /// Removes an object from the registry.
    RemoveObject {
        /// Identifier of the object to remove.
        object: ObjectId,
    },
    /// Removes a transient object whose lifetime ran out.
    ExpireObject {
        /// Identifier of the expired object.
        object: ObjectId,
    },
    /// Ends the player's run.
    TriggerGameOver {
        /// Reason for ending the run.
        cause: GameOverCause,
    },
}

/// Events broadcast after commands, actions, and render passes are processed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// The player moved between two positions.
    PlayerMoved {
        /// Position before the move.
        from: Position,
        /// Position after the move.
        to: Position,
    },
    /// The player started an attack.
    PlayerAttacked {
        /// Player position at the time of the attack.
        position: Position,
    },
    /// The boss changed state.
    BossStateChanged {
        /// State before the transition.
        from: BossState,
        /// State after the transition.
        to: BossState,
    },
    /// The boss stepped in a random direction.
    BossMoved {
        /// Position before the step.
        from: Position,
        /// Position after the step.
        to: Position,
        /// Direction chosen for the step.
        direction: Direction,
    },
    /// Damage landed on the boss.
    BossDamaged {
        /// Action responsible for the damage, if any.
        action: Option<ActionKind>,
        /// Damage requested before falloff.
        requested: u32,
        /// Damage applied after falloff.
        applied: u32,
        /// Hit points left after the hit.
        remaining_hit_points: u32,
    },
    /// The boss reached its terminal state.
    BossDied {
        /// Final resting position of the boss.
        position: Position,
    },
    /// Damage against the boss was rejected.
    DamageRejected {
        /// Action responsible for the attempt, if any.
        action: Option<ActionKind>,
        /// Reason for the rejection.
        reason: DamageRejection,
    },
    /// A delayed action was scheduled.
    ActionTriggered {
        /// Action that was triggered.
        action: ActionKind,
        /// Position the damage will originate from.
        source: Position,
        /// Time at which the damage resolves.
        due: Timestamp,
    },
    /// A cooldown-gated action was attempted too early.
    ActionOnCooldown {
        /// Action that was attempted.
        action: ActionKind,
        /// Time left on the cooldown.
        remaining: Duration,
    },
    /// An object entered the registry.
    ObjectSpawned {
        /// Identifier allocated to the object.
        object: ObjectId,
        /// Location of the object.
        position: Position,
    },
    /// A transient object reached the end of its lifetime and left the registry.
    ObjectExpired {
        /// Identifier of the expired object.
        object: ObjectId,
        /// Location of the object at expiry.
        position: Position,
    },
    /// An object was removed on request.
    ObjectRemoved {
        /// Identifier of the removed object.
        object: ObjectId,
    },
    /// A game-over condition fired. Repeats every frame the condition holds.
    GameOver {
        /// Reason for ending the run.
        cause: GameOverCause,
        /// Whether this trigger ended a run that was still going.
        first: bool,
    },
    /// A click was resolved to a terrain cell.
    TileInspected {
        /// Clicked location in world pixels.
        position: Position,
        /// Tile column under the click, if inside the level.
        column: Option<u32>,
        /// Tile row under the click, if inside the level.
        row: Option<u32>,
        /// Raw tile id of the topmost non-empty layer, if any.
        tile: Option<u32>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stepping_clamps_at_zero() {
        let origin = Position::new(10, 5);
        assert_eq!(
            origin.stepped(Direction::Left, BOSS_STEP_PIXELS, None),
            Position::new(0, 5)
        );
        assert_eq!(
            origin.stepped(Direction::Up, BOSS_STEP_PIXELS, None),
            Position::new(10, 0)
        );
        assert_eq!(
            origin.stepped(Direction::Right, BOSS_STEP_PIXELS, None),
            Position::new(42, 5)
        );
    }

    #[test]
    fn stepping_respects_arena_bounds() {
        let bounds = ArenaBounds::new(64, 64);
        let near_edge = Position::new(50, 60);
        assert_eq!(
            near_edge.stepped(Direction::Down, BOSS_STEP_PIXELS, Some(bounds)),
            Position::new(50, 64)
        );
    }

    #[test]
    fn distance_units_divide_by_sixteen_pixels() {
        let origin = Position::new(0, 0);
        let target = Position::new(32, 0);
        assert_eq!(origin.distance_squared(target), 1024);
        assert!((origin.distance_units_squared(target) - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn tolerance_box_is_strict_on_both_axes() {
        let anchor = Position::new(100, 100);
        assert!(anchor.within_tolerance(Position::new(131, 69), CONTACT_TOLERANCE_PIXELS));
        assert!(!anchor.within_tolerance(Position::new(132, 100), CONTACT_TOLERANCE_PIXELS));
        assert!(!anchor.within_tolerance(Position::new(100, 68), CONTACT_TOLERANCE_PIXELS));
    }

    #[test]
    fn cooldown_window_reports_remaining_time() {
        let mut window = CooldownWindow::new(Duration::from_secs(5));
        assert!(window.is_ready(Timestamp::ZERO));

        window.trigger(Timestamp::from_millis(1_000));
        assert!(!window.is_ready(Timestamp::from_millis(3_000)));
        assert_eq!(
            window.remaining(Timestamp::from_millis(3_000)),
            Duration::from_secs(3)
        );
        assert!(window.is_ready(Timestamp::from_millis(6_000)));
    }

    #[test]
    fn timestamps_never_go_backwards() {
        let later = Timestamp::from_millis(200);
        let earlier = Timestamp::from_millis(100);
        assert_eq!(earlier.saturating_since(later), Duration::ZERO);
        assert_eq!(later.saturating_since(earlier), Duration::from_millis(100));
    }

    #[test]
    fn manual_clock_is_shared_between_clones() {
        let clock = ManualClock::new();
        let observer = clock.clone();
        clock.advance(Duration::from_millis(250));
        assert_eq!(observer.now(), Timestamp::from_millis(250));
        observer.set(Timestamp::from_millis(40));
        assert_eq!(clock.now(), Timestamp::from_millis(40));
    }

    #[test]
    fn direction_set_counts_and_combines_axes() {
        let set = DirectionSet {
            up: true,
            right: true,
            ..DirectionSet::default()
        };
        assert_eq!(set.count(), 2);
        assert_eq!(set.axis(), (1, -1));
        assert_eq!(DirectionSet::default().count(), 0);
    }
}
