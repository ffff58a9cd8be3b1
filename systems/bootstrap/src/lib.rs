#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares a Boss Arena session.

use std::time::Duration;

use boss_arena_core::{Position, Timestamp, BOMB_LIFETIME, DEFAULT_BOSS_MAX_HIT_POINTS};
use boss_arena_world::{
    query, Boss, BossConfig, BossHandle, BossSnapshot, Terrain, World, DEFAULT_PLAYER_SPEED,
};
use tracing::info;

/// Gameplay parameters chosen at session start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArenaSettings {
    /// Hit points the boss starts with.
    pub boss_max_hit_points: u32,
    /// Where the boss appears; the centre of the map when absent.
    pub boss_spawn: Option<Position>,
    /// Where the player appears; two tiles in from the top-left corner when absent.
    pub player_spawn: Option<Position>,
    /// Player walking speed in pixels per second.
    pub player_speed: u32,
    /// Lifetime of placed bombs.
    pub bomb_lifetime: Duration,
    /// Seed for boss movement; a fixed default keeps runs reproducible.
    pub seed: Option<u64>,
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            boss_max_hit_points: DEFAULT_BOSS_MAX_HIT_POINTS,
            boss_spawn: None,
            player_spawn: None,
            player_speed: DEFAULT_PLAYER_SPEED,
            bomb_lifetime: BOMB_LIFETIME,
            seed: None,
        }
    }
}

/// Builds worlds and exposes the data adapters need at startup.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Assembles a world on `terrain` with the player and boss in place.
    #[must_use]
    pub fn build(&self, terrain: Terrain, settings: &ArenaSettings, now: Timestamp) -> World {
        let bounds = terrain.bounds();
        let player_spawn = settings.player_spawn.unwrap_or_else(|| {
            Position::new(
                saturating_i32(terrain.tile_width().saturating_mul(2)),
                saturating_i32(terrain.tile_height().saturating_mul(2)),
            )
        });
        let boss_spawn = settings
            .boss_spawn
            .unwrap_or_else(|| Position::new(bounds.width() / 2, bounds.height() / 2));

        let defaults = BossConfig::default();
        let config = BossConfig {
            max_hit_points: settings.boss_max_hit_points,
            rng_seed: settings.seed.unwrap_or(defaults.rng_seed),
            bounds: Some(bounds),
        };

        let mut world = World::new(terrain, player_spawn, settings.player_speed)
            .with_bomb_lifetime(settings.bomb_lifetime);
        let _ = world.install_boss(Boss::new(config, boss_spawn, now));
        info!(
            %player_spawn,
            %boss_spawn,
            hit_points = config.max_hit_points,
            seed = config.rng_seed,
            "arena ready"
        );
        world
    }

    /// Derives the banner that should be shown when the session starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Exposes the terrain required for rendering.
    #[must_use]
    pub fn terrain<'world>(&self, world: &'world World) -> &'world Terrain {
        query::terrain(world)
    }

    /// Shared boss handle for systems that resolve damage off the frame thread.
    #[must_use]
    pub fn boss_handle(&self, world: &World) -> Option<BossHandle> {
        query::boss_handle(world).cloned()
    }

    /// Boss as it stands when the session begins.
    #[must_use]
    pub fn boss(&self, world: &World) -> Option<BossSnapshot> {
        query::boss(world)
    }
}

fn saturating_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use boss_arena_core::{BossState, WELCOME_BANNER};
    use boss_arena_world::TileLayer;

    fn terrain() -> Terrain {
        Terrain::new(20, 10, 32, 32, vec![TileLayer::new("ground", vec![1; 200])])
            .expect("valid terrain")
    }

    #[test]
    fn default_spawns_follow_the_map() {
        let bootstrap = Bootstrap;
        let world = bootstrap.build(terrain(), &ArenaSettings::default(), Timestamp::ZERO);

        assert_eq!(query::player_position(&world), Position::new(64, 64));
        let boss = bootstrap.boss(&world).expect("boss installed");
        assert_eq!(boss.position, Position::new(320, 160));
        assert_eq!(boss.hit_points, DEFAULT_BOSS_MAX_HIT_POINTS);
        assert_eq!(boss.state, BossState::Idle);
        assert_eq!(bootstrap.welcome_banner(&world), WELCOME_BANNER);
    }

    #[test]
    fn explicit_settings_override_defaults() {
        let settings = ArenaSettings {
            boss_max_hit_points: 40,
            boss_spawn: Some(Position::new(100, 96)),
            player_spawn: Some(Position::new(10, 12)),
            player_speed: 60,
            ..ArenaSettings::default()
        };
        let bootstrap = Bootstrap;
        let world = bootstrap.build(terrain(), &settings, Timestamp::ZERO);

        let player = query::player(&world);
        assert_eq!(player.position(), Position::new(10, 12));
        assert_eq!(player.speed(), 60);
        let boss = bootstrap.boss_handle(&world).expect("boss installed").snapshot();
        assert_eq!(boss.max_hit_points, 40);
        assert_eq!(boss.position, Position::new(100, 96));
        assert_eq!(bootstrap.terrain(&world).columns(), 20);
    }
}
