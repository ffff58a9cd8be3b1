#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-frame update and render orchestration for Boss Arena.

mod render;
mod script;

use std::{io, sync::Arc, time::Duration};

use boss_arena_core::{ActionKind, Clock, Command, Event, GameOverCause, Position, Timestamp};
use boss_arena_rendering::{FrameInput, HudOverlay, InputEvent};
use boss_arena_system_actions::{resolve_due, ActionHandlers, TimerThread};
use boss_arena_world::{apply, query, BossHandle, World};
use glam::Vec2;
use tracing::{debug, warn};

pub use render::{render_frame, RenderAssets, SpriteBook, TileTextures};
pub use script::{Script, ScriptContext, ScriptHook, ScriptHost};

enum EffectResolution {
    Inline,
    Threaded(TimerThread),
}

/// Advances the world once per frame in a fixed order.
pub struct FrameDriver {
    last_update: Timestamp,
    actions: ActionHandlers,
    resolution: EffectResolution,
    scripts: Box<dyn ScriptHook>,
}

impl std::fmt::Debug for FrameDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameDriver")
            .field("last_update", &self.last_update)
            .field("actions", &self.actions)
            .field(
                "threaded_effects",
                &matches!(self.resolution, EffectResolution::Threaded(_)),
            )
            .finish_non_exhaustive()
    }
}

impl FrameDriver {
    /// Creates a driver whose first frame measures elapsed time from `start`.
    #[must_use]
    pub fn new(start: Timestamp) -> Self {
        Self {
            last_update: start,
            actions: ActionHandlers::new(),
            resolution: EffectResolution::Inline,
            scripts: Box::new(ScriptHost::new()),
        }
    }

    /// Replaces the per-frame script hook.
    #[must_use]
    pub fn with_script_hook(mut self, scripts: Box<dyn ScriptHook>) -> Self {
        self.scripts = scripts;
        self
    }

    /// Hands delayed-effect resolution to a dedicated thread.
    pub fn spawn_timer_thread(
        &mut self,
        boss: BossHandle,
        clock: Arc<dyn Clock>,
        poll_interval: Duration,
    ) -> io::Result<()> {
        let timer = TimerThread::spawn(Arc::clone(self.actions.queue()), boss, clock, poll_interval)?;
        self.resolution = EffectResolution::Threaded(timer);
        Ok(())
    }

    /// Timestamp of the last processed frame.
    #[must_use]
    pub fn last_update(&self) -> Timestamp {
        self.last_update
    }

    /// Action handlers owned by the driver.
    #[must_use]
    pub fn actions(&self) -> &ActionHandlers {
        &self.actions
    }

    /// Runs the update half of a frame.
    ///
    /// `to_world` converts click positions from screen space into world pixels.
    pub fn update(
        &mut self,
        world: &mut World,
        input: &FrameInput,
        now: Timestamp,
        to_world: &dyn Fn(Vec2) -> Vec2,
        out_events: &mut Vec<Event>,
    ) {
        let dt = now.saturating_since(self.last_update);
        self.last_update = self.last_update.max(now);
        let accepts_input = !query::player(world).is_game_over();

        if input.directions.count() <= 1 && input.attack {
            apply(world, Command::PlayerAttack { now }, out_events);
        }
        apply(
            world,
            Command::StepPlayer {
                directions: input.directions,
                dt,
            },
            out_events,
        );

        for event in &input.events {
            match *event {
                InputEvent::LightAction if accepts_input => {
                    self.trigger(world, ActionKind::Light, now, out_events);
                }
                InputEvent::HeavyAction if accepts_input => {
                    self.trigger(world, ActionKind::Heavy, now, out_events);
                }
                InputEvent::LightAction | InputEvent::HeavyAction => {}
                InputEvent::ClickAt(screen) => inspect_tile(world, to_world(screen), out_events),
            }
        }

        match &self.resolution {
            EffectResolution::Inline => {
                if let Some(boss) = query::boss_handle(world) {
                    let _ = resolve_due(self.actions.queue(), boss, now, out_events);
                }
            }
            EffectResolution::Threaded(timer) => timer.drain_events(out_events),
        }

        apply(world, Command::UpdateBoss { now }, out_events);

        let player = query::player_position(world);
        let touches_corpse = query::boss_handle(world)
            .is_some_and(|boss| boss.check_player_collision(player));
        if touches_corpse {
            if !query::player(world).is_game_over() {
                warn!(%player, "player touched the boss corpse");
            }
            apply(
                world,
                Command::TriggerGameOver {
                    cause: GameOverCause::CorpseHazard,
                },
                out_events,
            );
        }

        self.scripts
            .execute_all(&mut ScriptContext::new(world, now, out_events));

        if input.place_bomb && !query::player(world).is_game_over() {
            apply(
                world,
                Command::SpawnBomb {
                    position: query::player_position(world),
                    now,
                },
                out_events,
            );
        }
    }

    fn trigger(
        &mut self,
        world: &World,
        action: ActionKind,
        now: Timestamp,
        out_events: &mut Vec<Event>,
    ) {
        let source = query::player_position(world);
        if self.actions.trigger(action, source, now, out_events).is_none() {
            debug!(?action, "action still cooling down");
        }
    }

    /// Status overlay for the current state of `world`.
    #[must_use]
    pub fn hud(&self, world: &World, now: Timestamp) -> HudOverlay {
        let player = query::player(world);
        HudOverlay {
            banner: query::welcome_banner(world).to_owned(),
            boss_hit_points: query::boss(world)
                .map(|boss| (boss.hit_points, boss.max_hit_points)),
            heavy_cooldown: self.actions.heavy_cooldown_remaining(now),
            game_over: player.game_over_cause().map(|cause| match cause {
                GameOverCause::CorpseHazard => "You touched the boss corpse.".to_owned(),
                GameOverCause::Bomb { .. } => "You were caught in a bomb blast.".to_owned(),
                GameOverCause::Scripted => "Game over.".to_owned(),
            }),
        }
    }

    /// Cancels pending effects and stops the timer thread, if any.
    pub fn shutdown(&mut self) {
        self.actions.queue().cancel_all();
        self.resolution = EffectResolution::Inline;
    }
}

fn inspect_tile(world: &World, point: Vec2, out_events: &mut Vec<Event>) {
    let position = Position::new(point.x.floor() as i32, point.y.floor() as i32);
    let terrain = query::terrain(world);
    let cell = terrain.cell_at(position);
    let tile = cell.and_then(|(column, row)| terrain.topmost_tile(column, row));
    debug!(%position, ?cell, ?tile, "tile inspected");
    out_events.push(Event::TileInspected {
        position,
        column: cell.map(|(column, _)| column),
        row: cell.map(|(_, row)| row),
        tile,
    });
}
