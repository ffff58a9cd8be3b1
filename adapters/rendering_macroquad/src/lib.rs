#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Boss Arena.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! The adapter therefore depends on macroquad without its default `audio`
//! feature; sound goes through the dedicated audio adapter instead.

mod hud;
mod input;
mod textures;

pub use input::{
    direction_keys, held_action_key, PendingInput, HEAVY_ACTION_KEY, LIGHT_ACTION_KEY,
};

use std::{
    collections::VecDeque,
    path::Path,
    sync::mpsc,
    time::{Duration, Instant},
};

use anyhow::Result;
use boss_arena_rendering::{
    Color, FrameControl, HudOverlay, InputSource, PixelRect, Presentation, Renderer,
    RenderingBackend, TextureId, WorldRect,
};
use glam::Vec2;
use macroquad::{
    camera::{set_camera, set_default_camera, Camera2D},
    color::WHITE,
    input::{is_key_pressed, KeyCode},
    math::{Rect, Vec2 as MacroquadVec2},
    texture::{draw_texture_ex, DrawTextureParams, Texture2D},
    window::{clear_background, screen_height, screen_width},
};
use tracing::{debug, info};

use self::{input::MacroquadInput, textures::TextureStore};

const DEFAULT_HUD_FONT_SIZE: f32 = 24.0;

/// Rendering backend implemented on top of macroquad.
#[derive(Clone, Copy, Debug)]
pub struct MacroquadBackend {
    hud_font_size: f32,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            hud_font_size: DEFAULT_HUD_FONT_SIZE,
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend with the default HUD styling.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the font size used by the HUD overlay.
    #[must_use]
    pub fn with_hud_font_size(mut self, size: f32) -> Self {
        self.hud_font_size = size.max(1.0);
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut frame: F) -> Result<()>
    where
        F: FnMut(&mut dyn Renderer, &mut dyn InputSource) -> Result<FrameControl> + 'static,
    {
        let Presentation {
            window_title,
            width,
            height,
            clear_color,
            vsync,
            show_fps,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: i32::try_from(width).unwrap_or(i32::MAX),
            window_height: i32::try_from(height).unwrap_or(i32::MAX),
            ..macroquad::window::Conf::default()
        };
        config.platform.swap_interval = Some(if vsync { 1 } else { 0 });

        let hud_font_size = self.hud_font_size;
        let (outcome_sender, outcome_receiver) = mpsc::channel::<Result<()>>();

        macroquad::Window::from_config(config, async move {
            let mut renderer = MacroquadRenderer::new(hud_font_size);
            let mut input = MacroquadInput::default();
            let mut fps_counter = FpsCounter::default();
            let background = to_macroquad_color(clear_color);

            let outcome = loop {
                if is_key_pressed(KeyCode::Escape) {
                    debug!("escape pressed, closing window");
                    break Ok(());
                }

                clear_background(background);
                input.poll();

                let frame_start = Instant::now();
                match frame(&mut renderer, &mut input) {
                    Ok(FrameControl::Continue) => {}
                    Ok(FrameControl::Exit) => break Ok(()),
                    Err(error) => break Err(error),
                }

                let breakdown = FrameBreakdown {
                    frame: Duration::from_secs_f32(macroquad::time::get_frame_time().max(0.0)),
                    callback: frame_start.elapsed(),
                };
                if let Some(metrics) = fps_counter.record_frame(breakdown) {
                    if show_fps {
                        info!(
                            fps = metrics.per_second,
                            trailing_10s = metrics.trailing_ten_seconds,
                            frame_ms = metrics.avg_callback.as_secs_f64() * 1_000.0,
                            "frame timing"
                        );
                    }
                }

                macroquad::window::next_frame().await;
            };

            let _ = outcome_sender.send(outcome);
        });

        outcome_receiver.recv().unwrap_or_else(|_| Ok(()))
    }
}

/// Renderer drawing through macroquad's immediate-mode API.
struct MacroquadRenderer {
    textures: TextureStore<Texture2D>,
    bounds: Option<WorldRect>,
    camera: Camera2D,
    hud_font_size: f32,
}

impl MacroquadRenderer {
    fn new(hud_font_size: f32) -> Self {
        Self {
            textures: TextureStore::default(),
            bounds: None,
            camera: screen_camera(Vec2::new(screen_width(), screen_height()) * 0.5),
            hud_font_size,
        }
    }
}

impl Renderer for MacroquadRenderer {
    fn clear(&mut self, color: Color) {
        clear_background(to_macroquad_color(color));
    }

    fn present(&mut self) {
        set_default_camera();
    }

    fn set_world_bounds(&mut self, bounds: WorldRect) {
        self.bounds = Some(bounds);
    }

    fn camera_look_at(&mut self, x: f32, y: f32) {
        let view = Vec2::new(screen_width(), screen_height());
        let target = match self.bounds {
            Some(bounds) => camera_target(Vec2::new(x, y), view, bounds),
            None => Vec2::new(x, y),
        };
        self.camera = screen_camera(target);
        set_camera(&self.camera);
    }

    fn draw_texture(&mut self, texture: TextureId, source: PixelRect, dest: PixelRect) {
        let Some(handle) = self.textures.texture(texture) else {
            return;
        };
        draw_texture_ex(
            handle,
            dest.x,
            dest.y,
            WHITE,
            DrawTextureParams {
                dest_size: Some(MacroquadVec2::new(dest.width, dest.height)),
                source: Some(Rect::new(source.x, source.y, source.width, source.height)),
                ..DrawTextureParams::default()
            },
        );
    }

    fn load_texture(&mut self, path: &Path) -> Result<TextureId> {
        self.textures.load_with(path, textures::load_from_disk)
    }

    fn to_world_coordinates(&self, screen: Vec2) -> Vec2 {
        let world = self
            .camera
            .screen_to_world(MacroquadVec2::new(screen.x, screen.y));
        Vec2::new(world.x, world.y)
    }

    fn texture_size(&self, texture: TextureId) -> Option<Vec2> {
        self.textures.size(texture)
    }

    fn draw_hud(&mut self, hud: &HudOverlay) {
        hud::draw_overlay(hud, self.hud_font_size);
    }
}

fn screen_camera(target: Vec2) -> Camera2D {
    let (width, height) = (screen_width(), screen_height());
    Camera2D::from_display_rect(Rect::new(
        target.x - width * 0.5,
        target.y - height * 0.5,
        width,
        height,
    ))
}

/// Centre of the camera when following `look_at` with a `view` sized window.
///
/// The view never leaves `bounds`; an axis narrower than the view is centred.
fn camera_target(look_at: Vec2, view: Vec2, bounds: WorldRect) -> Vec2 {
    let axis = |look: f32, view: f32, start: f32, extent: f32| {
        if extent <= view {
            start + extent * 0.5
        } else {
            look.clamp(start + view * 0.5, start + extent - view * 0.5)
        }
    };
    Vec2::new(
        axis(look_at.x, view.x, bounds.x, bounds.width),
        axis(look_at.y, view.y, bounds.y, bounds.height),
    )
}

#[derive(Clone, Copy, Debug, Default)]
struct FrameBreakdown {
    frame: Duration,
    callback: Duration,
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
    callback_accum: Duration,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
    avg_callback: Duration,
}

impl FpsCounter {
    /// Records a frame and reports averages once a second has elapsed.
    fn record_frame(&mut self, breakdown: FrameBreakdown) -> Option<FpsMetrics> {
        self.elapsed += breakdown.frame;
        self.frames = self.frames.saturating_add(1);
        self.callback_accum += breakdown.callback;

        self.frame_times.push_back(breakdown.frame);
        self.window_duration += breakdown.frame;

        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            if let Some(removed) = self.frame_times.pop_front() {
                self.window_duration = self.window_duration.saturating_sub(removed);
            } else {
                break;
            }
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let per_second = self.frames as f32 / seconds;
        let window_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if window_seconds <= f32::EPSILON {
            per_second
        } else {
            self.frame_times.len() as f32 / window_seconds
        };
        let avg_callback = self.callback_accum / self.frames.max(1);

        self.elapsed = Duration::ZERO;
        self.frames = 0;
        self.callback_accum = Duration::ZERO;
        Some(FpsMetrics {
            per_second,
            trailing_ten_seconds,
            avg_callback,
        })
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
