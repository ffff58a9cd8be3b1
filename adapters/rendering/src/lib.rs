#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering and input contracts for Boss Arena adapters.

use std::{path::Path, time::Duration};

use anyhow::Result as AnyResult;
use boss_arena_core::{Direction, DirectionSet};
use glam::Vec2;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Handle to a texture owned by a renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(u32);

impl TextureId {
    /// Wraps a renderer-allocated index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Raw index of the texture.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Axis-aligned rectangle in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct PixelRect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl PixelRect {
    /// Creates a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering the tile at `column`, `row` of a grid of `width` by `height` tiles.
    #[must_use]
    pub fn tile(column: u32, row: u32, width: u32, height: u32) -> Self {
        Self::new(
            column as f32 * width as f32,
            row as f32 * height as f32,
            width as f32,
            height as f32,
        )
    }

    /// Rectangle of the given size whose top-left corner sits at `position`.
    #[must_use]
    pub fn at(position: Vec2, size: Vec2) -> Self {
        Self::new(position.x, position.y, size.x, size.y)
    }
}

/// Visible extent of the world, used to bound the camera.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct WorldRect {
    /// Left edge in world pixels.
    pub x: f32,
    /// Top edge in world pixels.
    pub y: f32,
    /// Width in world pixels.
    pub width: f32,
    /// Height in world pixels.
    pub height: f32,
}

impl WorldRect {
    /// Creates a world extent anchored at the origin.
    #[must_use]
    pub const fn sized(width: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }
}

/// Status lines drawn on top of the world in screen space.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct HudOverlay {
    /// Banner shown at the top of the screen.
    pub banner: String,
    /// Boss hit points out of the maximum, when a boss is present.
    pub boss_hit_points: Option<(u32, u32)>,
    /// Time left on the heavy action cooldown.
    pub heavy_cooldown: Duration,
    /// Message shown once the run ended.
    pub game_over: Option<String>,
}

/// Drawing surface used by the render pass.
pub trait Renderer {
    /// Clears the frame.
    fn clear(&mut self, color: Color);

    /// Finishes the frame.
    fn present(&mut self);

    /// Declares the extent the camera may show.
    fn set_world_bounds(&mut self, bounds: WorldRect);

    /// Centres the camera on the given world position.
    fn camera_look_at(&mut self, x: f32, y: f32);

    /// Draws the `source` region of `texture` into `dest` world pixels.
    fn draw_texture(&mut self, texture: TextureId, source: PixelRect, dest: PixelRect);

    /// Loads a texture from disk.
    fn load_texture(&mut self, path: &Path) -> AnyResult<TextureId>;

    /// Converts a screen-space point into world pixels.
    fn to_world_coordinates(&self, screen: Vec2) -> Vec2;

    /// Pixel size of a loaded texture, if known.
    fn texture_size(&self, texture: TextureId) -> Option<Vec2>;

    /// Draws status text over the world.
    fn draw_hud(&mut self, hud: &HudOverlay) {
        let _ = hud;
    }
}

/// Actions that stay active while their key is held.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HeldAction {
    /// Swing at the boss.
    Attack,
    /// Drop a bomb at the player's feet.
    PlaceBomb,
}

/// Edge-triggered input, fired once per physical press.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// Mouse click at a screen-space position.
    ClickAt(Vec2),
    /// Light delayed-damage action.
    LightAction,
    /// Heavy delayed-damage action.
    HeavyAction,
}

/// Raw input polled once per frame.
pub trait InputSource {
    /// Whether the key bound to `direction` is held.
    fn is_direction_down(&self, direction: Direction) -> bool;

    /// Whether the key bound to `action` is held.
    fn is_action_down(&self, action: HeldAction) -> bool;

    /// Moves the edge-triggered events observed since the last call into `out`.
    fn drain_events(&mut self, out: &mut Vec<InputEvent>);
}

/// Input snapshot gathered before updating the world.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Directions held this frame.
    pub directions: DirectionSet,
    /// Whether the attack key is held.
    pub attack: bool,
    /// Whether the bomb key is held.
    pub place_bomb: bool,
    /// Edge-triggered events in the order they occurred.
    pub events: Vec<InputEvent>,
}

impl FrameInput {
    /// Polls every input the frame driver consumes.
    pub fn sample(source: &mut dyn InputSource) -> Self {
        let directions = DirectionSet {
            up: source.is_direction_down(Direction::Up),
            down: source.is_direction_down(Direction::Down),
            left: source.is_direction_down(Direction::Left),
            right: source.is_direction_down(Direction::Right),
        };
        let mut events = Vec::new();
        source.drain_events(&mut events);
        Self {
            directions,
            attack: source.is_action_down(HeldAction::Attack),
            place_bomb: source.is_action_down(HeldAction::PlaceBomb),
            events,
        }
    }
}

/// Whether the run loop should keep going after a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    /// Render another frame.
    Continue,
    /// Close the window.
    Exit,
}

/// Window and presentation settings consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Initial window width in pixels.
    pub width: u32,
    /// Initial window height in pixels.
    pub height: u32,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Whether presentation waits for vertical sync.
    pub vsync: bool,
    /// Whether frame timing is logged.
    pub show_fps: bool,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, width: u32, height: u32, clear_color: Color) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            width,
            height,
            clear_color,
            vsync: true,
            show_fps: false,
        }
    }
}

/// Rendering backend capable of running the Boss Arena window loop.
pub trait RenderingBackend {
    /// Runs the window loop until the closure asks to exit or fails.
    ///
    /// The closure is called once per frame with the backend's renderer and
    /// input source. An error returned from the closure stops the loop and is
    /// propagated to the caller.
    fn run<F>(self, presentation: Presentation, frame: F) -> AnyResult<()>
    where
        F: FnMut(&mut dyn Renderer, &mut dyn InputSource) -> AnyResult<FrameControl> + 'static;
}
