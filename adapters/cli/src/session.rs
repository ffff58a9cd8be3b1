//! One play session: the world, its frame driver and the assets it draws with.

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use boss_arena_assets::{Level, TileImage};
use boss_arena_audio::{AudioManager, SoundCue};
use boss_arena_core::{Clock, Event, SpriteKey};
use boss_arena_rendering::{Color, FrameControl, FrameInput, InputSource, Renderer};
use boss_arena_system_bootstrap::{ArenaSettings, Bootstrap};
use boss_arena_system_frame::{render_frame, FrameDriver, RenderAssets};
use boss_arena_world::World;
use tracing::{debug, info};

const TIMER_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Inputs needed to start a session.
#[derive(Debug)]
pub(crate) struct SessionSetup {
    pub(crate) level: Level,
    pub(crate) settings: ArenaSettings,
    pub(crate) sprites: Vec<(SpriteKey, PathBuf)>,
    pub(crate) clear_color: Color,
    pub(crate) threaded_effects: bool,
}

/// Images that still have to be uploaded to the renderer.
#[derive(Debug)]
struct PendingTextures {
    tiles: Vec<TileImage>,
    sprites: Vec<(SpriteKey, PathBuf)>,
}

pub(crate) struct Session {
    world: World,
    driver: FrameDriver,
    clock: Arc<dyn Clock>,
    audio: AudioManager,
    assets: RenderAssets,
    pending_textures: Option<PendingTextures>,
    events: Vec<Event>,
}

impl Session {
    pub(crate) fn new(
        setup: SessionSetup,
        clock: Arc<dyn Clock>,
        audio: AudioManager,
    ) -> Result<Self> {
        let SessionSetup {
            level,
            settings,
            sprites,
            clear_color,
            threaded_effects,
        } = setup;

        let start = clock.now();
        let bootstrap = Bootstrap;
        let world = bootstrap.build(level.terrain, &settings, start);
        info!(banner = bootstrap.welcome_banner(&world), "session starting");

        let mut driver = FrameDriver::new(start);
        if threaded_effects {
            if let Some(boss) = bootstrap.boss_handle(&world) {
                driver
                    .spawn_timer_thread(boss, Arc::clone(&clock), TIMER_POLL_INTERVAL)
                    .context("failed to start the effect timer thread")?;
            }
        }

        Ok(Self {
            world,
            driver,
            clock,
            audio,
            assets: RenderAssets {
                clear_color,
                ..RenderAssets::default()
            },
            pending_textures: Some(PendingTextures {
                tiles: level.tiles,
                sprites,
            }),
            events: Vec::new(),
        })
    }

    /// Runs one update and render pass.
    ///
    /// Textures are uploaded on the first call, once the renderer exists.
    pub(crate) fn frame(
        &mut self,
        renderer: &mut dyn Renderer,
        input: &mut dyn InputSource,
    ) -> Result<FrameControl> {
        if let Some(pending) = self.pending_textures.take() {
            load_textures(renderer, &pending, &mut self.assets)?;
        }

        let now = self.clock.now();
        let sampled = FrameInput::sample(input);
        self.driver.update(
            &mut self.world,
            &sampled,
            now,
            &|screen| renderer.to_world_coordinates(screen),
            &mut self.events,
        );
        let hud = self.driver.hud(&self.world, now);
        render_frame(
            &mut self.world,
            renderer,
            &self.assets,
            Some(&hud),
            now,
            &mut self.events,
        );

        let audible = self.audio.has_device();
        for event in self.events.drain(..) {
            if let Some(cue) = SoundCue::for_event(&event).filter(|_| audible) {
                debug!(?cue, "playing sound cue");
                self.audio.play_random_variant(cue.category());
            }
        }

        Ok(FrameControl::Continue)
    }

    #[cfg(test)]
    fn world(&self) -> &World {
        &self.world
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.driver.shutdown();
    }
}

fn load_textures(
    renderer: &mut dyn Renderer,
    pending: &PendingTextures,
    assets: &mut RenderAssets,
) -> Result<()> {
    for tile in &pending.tiles {
        let texture = renderer
            .load_texture(&tile.path)
            .with_context(|| format!("failed to load image for tile {}", tile.index))?;
        assets.tiles.insert(tile.index, texture);
    }
    for (key, path) in &pending.sprites {
        let texture = renderer
            .load_texture(path)
            .with_context(|| format!("failed to load sprite {key:?}"))?;
        assets.sprites.insert(*key, texture);
    }
    info!(
        tiles = pending.tiles.len(),
        sprites = pending.sprites.len(),
        "textures loaded"
    );
    Ok(())
}
