//! TOML session configuration.
//!
//! Every field has a default, so an empty file (or no file at all) starts the
//! bundled arena. Relative asset paths are resolved against the directory of
//! the configuration file.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use boss_arena_core::{
    BossState, Direction, Position, SpriteKey, BOMB_LIFETIME, DEFAULT_BOSS_MAX_HIT_POINTS,
};
use boss_arena_system_bootstrap::ArenaSettings;
use boss_arena_world::DEFAULT_PLAYER_SPEED;
use serde::Deserialize;

/// Complete session configuration.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) window: WindowConfig,
    pub(crate) assets: AssetConfig,
    pub(crate) gameplay: GameplayConfig,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct WindowConfig {
    pub(crate) title: String,
    pub(crate) width: u32,
    pub(crate) height: u32,
    /// Background as `[r, g, b]` bytes.
    pub(crate) clear_color: [u8; 3],
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Boss Arena".to_owned(),
            width: 960,
            height: 720,
            clear_color: [24, 20, 37],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct AssetConfig {
    pub(crate) level: PathBuf,
    pub(crate) sprites: SpriteConfig,
    pub(crate) sounds: Vec<SoundEntry>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            level: PathBuf::from("level.json"),
            sprites: SpriteConfig::default(),
            sounds: Vec::new(),
        }
    }
}

/// Image per sprite. Missing boss states fall back to the idle image and
/// missing attack poses to the player image.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SpriteConfig {
    pub(crate) player: Option<PathBuf>,
    pub(crate) player_attack_up: Option<PathBuf>,
    pub(crate) player_attack_down: Option<PathBuf>,
    pub(crate) player_attack_left: Option<PathBuf>,
    pub(crate) player_attack_right: Option<PathBuf>,
    pub(crate) bomb: Option<PathBuf>,
    pub(crate) marker: Option<PathBuf>,
    pub(crate) boss_idle: Option<PathBuf>,
    pub(crate) boss_move: Option<PathBuf>,
    pub(crate) boss_taking_damage: Option<PathBuf>,
    pub(crate) boss_death: Option<PathBuf>,
}

impl SpriteConfig {
    /// Configured images paired with the sprite they draw.
    pub(crate) fn entries(&self) -> impl Iterator<Item = (SpriteKey, &Path)> + '_ {
        [
            (SpriteKey::Player, &self.player),
            (SpriteKey::PlayerAttack(Direction::Up), &self.player_attack_up),
            (SpriteKey::PlayerAttack(Direction::Down), &self.player_attack_down),
            (SpriteKey::PlayerAttack(Direction::Left), &self.player_attack_left),
            (
                SpriteKey::PlayerAttack(Direction::Right),
                &self.player_attack_right,
            ),
            (SpriteKey::Bomb, &self.bomb),
            (SpriteKey::Marker, &self.marker),
            (SpriteKey::Boss(BossState::Idle), &self.boss_idle),
            (SpriteKey::Boss(BossState::Move), &self.boss_move),
            (
                SpriteKey::Boss(BossState::TakingDamage),
                &self.boss_taking_damage,
            ),
            (SpriteKey::Boss(BossState::Death), &self.boss_death),
        ]
        .into_iter()
        .filter_map(|(key, path)| path.as_deref().map(|path| (key, path)))
    }
}

/// Sound file registered under `key`. Keys like `fart_2` are variants of `fart`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SoundEntry {
    pub(crate) key: String,
    pub(crate) path: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameplayConfig {
    pub(crate) boss_max_hit_points: u32,
    pub(crate) boss_spawn: Option<Position>,
    pub(crate) player_spawn: Option<Position>,
    pub(crate) player_speed: u32,
    pub(crate) bomb_lifetime_ms: u64,
    pub(crate) seed: Option<u64>,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            boss_max_hit_points: DEFAULT_BOSS_MAX_HIT_POINTS,
            boss_spawn: None,
            player_spawn: None,
            player_speed: DEFAULT_PLAYER_SPEED,
            bomb_lifetime_ms: BOMB_LIFETIME.as_millis() as u64,
            seed: None,
        }
    }
}

impl GameplayConfig {
    pub(crate) fn settings(&self) -> ArenaSettings {
        ArenaSettings {
            boss_max_hit_points: self.boss_max_hit_points,
            boss_spawn: self.boss_spawn,
            player_spawn: self.player_spawn,
            player_speed: self.player_speed,
            bomb_lifetime: Duration::from_millis(self.bomb_lifetime_ms),
            seed: self.seed,
        }
    }
}

impl GameConfig {
    /// Reads and parses the file at `path`, resolving asset paths against its directory.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration at {}", path.display()))?;
        let config = Self::parse(&contents)
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.resolved_against(base))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse configuration toml")
    }

    /// Joins every relative asset path onto `base`.
    pub(crate) fn resolved_against(mut self, base: &Path) -> Self {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        let assets = &mut self.assets;
        resolve(&mut assets.level);
        let sprites = &mut assets.sprites;
        for path in [
            &mut sprites.player,
            &mut sprites.player_attack_up,
            &mut sprites.player_attack_down,
            &mut sprites.player_attack_left,
            &mut sprites.player_attack_right,
            &mut sprites.bomb,
            &mut sprites.marker,
            &mut sprites.boss_idle,
            &mut sprites.boss_move,
            &mut sprites.boss_taking_damage,
            &mut sprites.boss_death,
        ]
        .into_iter()
        .flatten()
        {
            resolve(path);
        }
        for sound in &mut assets.sounds {
            resolve(&mut sound.path);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_files_use_defaults() {
        let config = GameConfig::parse("").expect("empty config parses");
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.gameplay.settings(), ArenaSettings::default());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = GameConfig::parse(
            r#"
            [window]
            title = "Practice"

            [gameplay]
            boss_max_hit_points = 300
            boss_spawn = { x = 320, y = 160 }
            seed = 7
            "#,
        )
        .expect("partial config parses");

        assert_eq!(config.window.title, "Practice");
        assert_eq!(config.window.width, WindowConfig::default().width);

        let settings = config.gameplay.settings();
        assert_eq!(settings.boss_max_hit_points, 300);
        assert_eq!(settings.boss_spawn, Some(Position::new(320, 160)));
        assert_eq!(settings.player_spawn, None);
        assert_eq!(settings.bomb_lifetime, BOMB_LIFETIME);
        assert_eq!(settings.seed, Some(7));
    }

    #[test]
    fn asset_paths_resolve_next_to_the_config_file() {
        let config = GameConfig::parse(
            r#"
            [assets]
            level = "levels/arena.json"
            sprites = { player = "sprites/player.png", player_attack_left = "sprites/swing.png", boss_idle = "/abs/boss.png" }
            sounds = [{ key = "fart_1", path = "sounds/fart_1.wav" }]
            "#,
        )
        .expect("asset config parses")
        .resolved_against(Path::new("assets"));

        assert_eq!(
            config.assets.level,
            Path::new("assets").join("levels/arena.json")
        );
        assert_eq!(
            config.assets.sounds[0].path,
            Path::new("assets").join("sounds/fart_1.wav")
        );

        let sprites: Vec<_> = config.assets.sprites.entries().collect();
        let player = Path::new("assets").join("sprites/player.png");
        let swing = Path::new("assets").join("sprites/swing.png");
        assert_eq!(
            sprites,
            vec![
                (SpriteKey::Player, player.as_path()),
                (SpriteKey::PlayerAttack(Direction::Left), swing.as_path()),
                (SpriteKey::Boss(BossState::Idle), Path::new("/abs/boss.png")),
            ]
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(GameConfig::parse("[window]\nfullscreen = true\n").is_err());
    }
}
