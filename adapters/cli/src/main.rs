#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Boss Arena experience.

mod config;
mod session;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use boss_arena_audio::AudioManager;
use boss_arena_core::{Clock, SystemClock};
use boss_arena_rendering::{Color, Presentation, RenderingBackend};
use boss_arena_rendering_macroquad::MacroquadBackend;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    config::GameConfig,
    session::{Session, SessionSetup},
};

const DEFAULT_CONFIG_PATH: &str = "assets/game.toml";
const DEFAULT_AUDIO_SEED: u64 = 0xb0a7_5eed;

/// Command-line options for the Boss Arena binary.
#[derive(Debug, Parser)]
#[command(name = "boss-arena", about = "Fight the boss, mind the corpse.")]
struct CliArgs {
    /// Session configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Overrides the gameplay seed from the configuration.
    #[arg(long)]
    seed: Option<u64>,
    /// Logs frame timing once per second.
    #[arg(long)]
    show_fps: bool,
    /// Synchronises presentation with the display refresh rate.
    #[arg(long, overrides_with = "no_vsync")]
    vsync: bool,
    /// Renders as fast as possible.
    #[arg(long = "no-vsync", overrides_with = "vsync")]
    no_vsync: bool,
    /// Resolves delayed damage on a dedicated timer thread.
    #[arg(long)]
    threaded_effects: bool,
}

impl CliArgs {
    fn vsync_enabled(&self) -> bool {
        self.vsync || !self.no_vsync
    }
}

/// Entry point for the Boss Arena command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();

    let config = load_config(args.config.as_deref())?;
    let mut settings = config.gameplay.settings();
    if args.seed.is_some() {
        settings.seed = args.seed;
    }

    let level = boss_arena_assets::load_level(&config.assets.level)
        .with_context(|| format!("failed to load level {}", config.assets.level.display()))?;

    let mut audio =
        AudioManager::with_default_device(settings.seed.unwrap_or(DEFAULT_AUDIO_SEED));
    for sound in &config.assets.sounds {
        let _ = audio.load_sound(&sound.path, &sound.key);
    }

    let [red, green, blue] = config.window.clear_color;
    let clear_color = Color::from_rgb_u8(red, green, blue);
    let setup = SessionSetup {
        level,
        settings,
        sprites: config
            .assets
            .sprites
            .entries()
            .map(|(key, path)| (key, path.to_path_buf()))
            .collect(),
        clear_color,
        threaded_effects: args.threaded_effects,
    };

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    let mut session = Session::new(setup, clock, audio)?;

    let mut presentation = Presentation::new(
        config.window.title.clone(),
        config.window.width,
        config.window.height,
        clear_color,
    );
    presentation.vsync = args.vsync_enabled();
    presentation.show_fps = args.show_fps;

    MacroquadBackend::new().run(presentation, move |renderer, input| {
        session.frame(renderer, input)
    })?;
    info!("session closed");
    Ok(())
}

fn load_config(explicit: Option<&Path>) -> Result<GameConfig> {
    match explicit {
        Some(path) => GameConfig::load(path),
        None => {
            let path = Path::new(DEFAULT_CONFIG_PATH);
            if path.exists() {
                GameConfig::load(path)
            } else {
                warn!(path = %path.display(), "no configuration found, using defaults");
                Ok(GameConfig::default().resolved_against(Path::new("assets")))
            }
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vsync_is_on_unless_disabled() {
        let parse = |args: &[&str]| CliArgs::try_parse_from(args).expect("valid arguments");

        assert!(parse(&["boss-arena"]).vsync_enabled());
        assert!(!parse(&["boss-arena", "--no-vsync"]).vsync_enabled());
        assert!(parse(&["boss-arena", "--no-vsync", "--vsync"]).vsync_enabled());
    }

    #[test]
    fn flags_parse_into_options() {
        let args = CliArgs::try_parse_from([
            "boss-arena",
            "--config",
            "custom.toml",
            "--seed",
            "42",
            "--show-fps",
            "--threaded-effects",
        ])
        .expect("valid arguments");

        assert_eq!(args.config, Some(PathBuf::from("custom.toml")));
        assert_eq!(args.seed, Some(42));
        assert!(args.show_fps);
        assert!(args.threaded_effects);
    }
}
