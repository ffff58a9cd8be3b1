#![allow(dead_code)]

use std::{collections::VecDeque, path::Path};

use anyhow::{bail, Result};
use boss_arena_core::{Direction, Position, Timestamp};
use boss_arena_rendering::{
    Color, FrameInput, HeldAction, HudOverlay, InputEvent, InputSource, PixelRect, Renderer,
    TextureId, WorldRect,
};
use boss_arena_world::{Boss, BossConfig, Terrain, TileLayer, World, DEFAULT_PLAYER_SPEED};
use glam::Vec2;

/// Draw calls observed by [`RecordingRenderer`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    Clear,
    Bounds(WorldRect),
    LookAt(f32, f32),
    Texture(TextureId, PixelRect),
    Hud,
    Present,
}

#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub calls: Vec<DrawCall>,
}

impl RecordingRenderer {
    pub fn textures_drawn(&self) -> Vec<TextureId> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Texture(texture, _) => Some(*texture),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn clear(&mut self, _color: Color) {
        self.calls.push(DrawCall::Clear);
    }

    fn present(&mut self) {
        self.calls.push(DrawCall::Present);
    }

    fn set_world_bounds(&mut self, bounds: WorldRect) {
        self.calls.push(DrawCall::Bounds(bounds));
    }

    fn camera_look_at(&mut self, x: f32, y: f32) {
        self.calls.push(DrawCall::LookAt(x, y));
    }

    fn draw_texture(&mut self, texture: TextureId, _source: PixelRect, dest: PixelRect) {
        self.calls.push(DrawCall::Texture(texture, dest));
    }

    fn load_texture(&mut self, path: &Path) -> Result<TextureId> {
        bail!("recording renderer cannot load {}", path.display())
    }

    fn to_world_coordinates(&self, screen: Vec2) -> Vec2 {
        screen
    }

    fn texture_size(&self, _texture: TextureId) -> Option<Vec2> {
        Some(Vec2::splat(16.0))
    }

    fn draw_hud(&mut self, _hud: &HudOverlay) {
        self.calls.push(DrawCall::Hud);
    }
}

/// Plays back one prepared input snapshot per frame.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    frames: VecDeque<FrameInput>,
    current: FrameInput,
}

impl ScriptedInput {
    pub fn new(frames: impl IntoIterator<Item = FrameInput>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            current: FrameInput::default(),
        }
    }

    /// Moves to the next scripted frame; idle input once the script runs out.
    pub fn advance(&mut self) {
        self.current = self.frames.pop_front().unwrap_or_default();
    }
}

impl InputSource for ScriptedInput {
    fn is_direction_down(&self, direction: Direction) -> bool {
        self.current.directions.contains(direction)
    }

    fn is_action_down(&self, action: HeldAction) -> bool {
        match action {
            HeldAction::Attack => self.current.attack,
            HeldAction::PlaceBomb => self.current.place_bomb,
        }
    }

    fn drain_events(&mut self, out: &mut Vec<InputEvent>) {
        out.append(&mut self.current.events);
    }
}

pub fn open_field() -> World {
    let terrain = Terrain::new(40, 40, 16, 16, vec![TileLayer::new("ground", vec![1; 1_600])])
        .expect("valid terrain");
    World::new(terrain, Position::new(96, 96), DEFAULT_PLAYER_SPEED)
}

pub fn open_field_with_boss(boss_at: Position, seed: u64) -> World {
    let mut world = open_field();
    let _ = world.install_boss(Boss::new(
        BossConfig {
            rng_seed: seed,
            ..BossConfig::default()
        },
        boss_at,
        Timestamp::ZERO,
    ));
    world
}
