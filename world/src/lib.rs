#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Boss Arena.
//!
//! The world is an explicit context object: terrain, the player, the shared
//! boss handle, and the object registry. It is constructed once at setup and
//! threaded through the frame driver, the render pass, and the script hook.
//! All mutations flow through [`apply`].

mod boss;
mod player;
mod registry;
mod terrain;

use std::time::Duration;

use boss_arena_core::{Command, Event, Position, BOMB_LIFETIME, WELCOME_BANNER};
use tracing::{debug, warn};

pub use boss::{damage_multiplier, AppliedDamage, Boss, BossConfig, BossHandle, BossRng, BossSnapshot};
pub use player::{Player, DEFAULT_PLAYER_SPEED};
pub use registry::{Bomb, ObjectKind, ObjectRegistry, WorldObject};
pub use terrain::{tileset_index, Terrain, TerrainError, TileLayer};

/// Represents the authoritative Boss Arena world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    terrain: Terrain,
    player: Player,
    boss: Option<BossHandle>,
    registry: ObjectRegistry,
    bomb_lifetime: Duration,
}

impl World {
    /// Creates a world on `terrain` with the player standing at `player_spawn`.
    #[must_use]
    pub fn new(terrain: Terrain, player_spawn: Position, player_speed: u32) -> Self {
        let mut registry = ObjectRegistry::new();
        let anchor = registry.insert(player_spawn, ObjectKind::PlayerAnchor);
        let player = Player::new(anchor, player_spawn, player_speed, Some(terrain.bounds()));
        Self {
            banner: WELCOME_BANNER,
            terrain,
            player,
            boss: None,
            registry,
            bomb_lifetime: BOMB_LIFETIME,
        }
    }

    /// Overrides how long placed bombs live.
    #[must_use]
    pub fn with_bomb_lifetime(mut self, lifetime: Duration) -> Self {
        self.bomb_lifetime = lifetime;
        self
    }

    /// Installs the boss and returns a handle sharing it.
    pub fn install_boss(&mut self, boss: Boss) -> BossHandle {
        let handle = BossHandle::new(boss);
        self.boss = Some(handle.clone());
        handle
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StepPlayer { directions, dt } => {
            if world.player.is_game_over() {
                return;
            }
            let from = world.player.position();
            if let Some(to) = world.player.step(directions, dt) {
                let _ = world.registry.relocate(world.player.anchor(), to);
                out_events.push(Event::PlayerMoved { from, to });
            }
        }
        Command::PlayerAttack { now } => {
            if world.player.is_game_over() {
                return;
            }
            world.player.attack(now);
            out_events.push(Event::PlayerAttacked {
                position: world.player.position(),
            });
        }
        Command::UpdateBoss { now } => {
            if let Some(boss) = &world.boss {
                boss.update(world.player.position(), now, out_events);
            }
        }
        Command::SpawnBomb { position, now } => {
            let bomb = Bomb::new(now, world.bomb_lifetime);
            let object = world.registry.insert(position, ObjectKind::Bomb(bomb));
            debug!(object = object.get(), %position, "bomb placed");
            out_events.push(Event::ObjectSpawned { object, position });
        }
        Command::SpawnDecoration { position, sprite } => {
            let object = world
                .registry
                .insert(position, ObjectKind::Decoration { sprite });
            out_events.push(Event::ObjectSpawned { object, position });
        }
        Command::RemoveObject { object } => {
            if object == world.player.anchor() {
                debug!(object = object.get(), "refusing to remove the player anchor");
                return;
            }
            if world.registry.remove(object).is_some() {
                out_events.push(Event::ObjectRemoved { object });
            }
        }
        Command::ExpireObject { object } => {
            if let Some(removed) = world.registry.remove(object) {
                out_events.push(Event::ObjectExpired {
                    object,
                    position: removed.position(),
                });
            }
        }
        Command::TriggerGameOver { cause } => {
            let first = world.player.trigger_game_over(cause);
            if first {
                warn!(?cause, position = %world.player.position(), "game over");
            }
            out_events.push(Event::GameOver { cause, first });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{BossHandle, BossSnapshot, ObjectRegistry, Player, Terrain, World, WorldObject};
    use boss_arena_core::{ObjectId, Position};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the terrain.
    #[must_use]
    pub fn terrain(world: &World) -> &Terrain {
        &world.terrain
    }

    /// Provides read-only access to the player.
    #[must_use]
    pub fn player(world: &World) -> &Player {
        &world.player
    }

    /// Current player position.
    #[must_use]
    pub fn player_position(world: &World) -> Position {
        world.player.position()
    }

    /// Shared handle to the boss, if one was installed.
    #[must_use]
    pub fn boss_handle(world: &World) -> Option<&BossHandle> {
        world.boss.as_ref()
    }

    /// Plain copy of the boss, if one was installed.
    #[must_use]
    pub fn boss(world: &World) -> Option<BossSnapshot> {
        world.boss.as_ref().map(BossHandle::snapshot)
    }

    /// Provides read-only access to the object registry.
    #[must_use]
    pub fn registry(world: &World) -> &ObjectRegistry {
        &world.registry
    }

    /// Looks up a registry object by identifier.
    #[must_use]
    pub fn object(world: &World, id: ObjectId) -> Option<&WorldObject> {
        world.registry.get(id)
    }
}
