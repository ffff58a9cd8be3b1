//! Render pass: draws one frame and retires expired transient objects.

use std::collections::{BTreeMap, HashMap};

use boss_arena_core::{
    BossState, Command, Event, GameOverCause, ObjectId, Position, SpriteKey, Timestamp,
    CONTACT_TOLERANCE_PIXELS,
};
use boss_arena_rendering::{Color, HudOverlay, PixelRect, Renderer, TextureId, WorldRect};
use boss_arena_world::{apply, query, tileset_index, World};
use glam::Vec2;
use tracing::warn;

const FALLBACK_SPRITE_SIZE: Vec2 = Vec2::splat(32.0);

/// Textures used for the player, bombs, markers, and each boss state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpriteBook {
    entries: HashMap<SpriteKey, TextureId>,
}

impl SpriteBook {
    /// Creates an empty sprite book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `texture` to `key`.
    pub fn insert(&mut self, key: SpriteKey, texture: TextureId) {
        let _ = self.entries.insert(key, texture);
    }

    /// Texture for `key`.
    ///
    /// Boss states without their own texture fall back to the idle one, and
    /// attack poses fall back to the plain player.
    #[must_use]
    pub fn texture(&self, key: SpriteKey) -> Option<TextureId> {
        let fallback = match key {
            SpriteKey::Boss(_) => Some(SpriteKey::Boss(BossState::Idle)),
            SpriteKey::PlayerAttack(_) => Some(SpriteKey::Player),
            SpriteKey::Player | SpriteKey::Bomb | SpriteKey::Marker => None,
        };
        self.entries
            .get(&key)
            .or_else(|| fallback.and_then(|fallback| self.entries.get(&fallback)))
            .copied()
    }
}

/// Textures for tileset entries keyed by zero-based tileset index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TileTextures {
    textures: BTreeMap<u32, TextureId>,
}

impl TileTextures {
    /// Creates an empty tile texture table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `texture` to the tileset entry at `index`.
    pub fn insert(&mut self, index: u32, texture: TextureId) {
        let _ = self.textures.insert(index, texture);
    }

    /// Texture of the tileset entry at `index`.
    #[must_use]
    pub fn get(&self, index: u32) -> Option<TextureId> {
        self.textures.get(&index).copied()
    }

    /// Number of known tileset entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Reports whether no tileset entries are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

/// Everything the render pass draws with.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderAssets {
    /// Sprite textures.
    pub sprites: SpriteBook,
    /// Terrain tile textures.
    pub tiles: TileTextures,
    /// Color the frame is cleared to.
    pub clear_color: Color,
}

impl Default for RenderAssets {
    fn default() -> Self {
        Self {
            sprites: SpriteBook::new(),
            tiles: TileTextures::new(),
            clear_color: Color::from_rgb_u8(0, 0, 0),
        }
    }
}

/// Draws one frame of `world` and removes transient objects that expired by `now`.
///
/// Expired objects are collected during the traversal and removed afterwards,
/// so removal never disturbs iteration. The player dies when an expired bomb
/// goes off within contact range.
pub fn render_frame(
    world: &mut World,
    renderer: &mut dyn Renderer,
    assets: &RenderAssets,
    hud: Option<&HudOverlay>,
    now: Timestamp,
    out_events: &mut Vec<Event>,
) {
    renderer.clear(assets.clear_color);

    let terrain = query::terrain(world);
    let bounds = terrain.bounds();
    renderer.set_world_bounds(WorldRect::sized(
        bounds.width() as f32,
        bounds.height() as f32,
    ));
    let player = query::player_position(world);
    renderer.camera_look_at(player.x() as f32, player.y() as f32);

    let (tile_width, tile_height) = (terrain.tile_width(), terrain.tile_height());
    for layer in terrain.layers() {
        for (column, row, raw) in terrain.cells(layer) {
            let Some(texture) = tileset_index(raw).and_then(|index| assets.tiles.get(index)) else {
                continue;
            };
            let dest = PixelRect::tile(column, row, tile_width, tile_height);
            let source = PixelRect::new(0.0, 0.0, dest.width, dest.height);
            renderer.draw_texture(texture, source, dest);
        }
    }

    let mut expired: Vec<(ObjectId, Position)> = Vec::new();
    for object in query::registry(world).iter() {
        let Some(sprite) = object.sprite() else {
            continue;
        };
        if object.is_expired(now) {
            expired.push((object.id(), object.position()));
            continue;
        }
        draw_sprite(renderer, &assets.sprites, sprite, object.position());
    }

    for (object, position) in expired {
        apply(world, Command::ExpireObject { object }, out_events);
        let player = query::player_position(world);
        if position.within_tolerance(player, CONTACT_TOLERANCE_PIXELS) {
            warn!(object = object.get(), %position, "player caught in bomb blast");
            apply(
                world,
                Command::TriggerGameOver {
                    cause: GameOverCause::Bomb { object },
                },
                out_events,
            );
        }
    }

    let player = query::player(world);
    let pose = if player.is_attacking(now) {
        SpriteKey::PlayerAttack(player.facing())
    } else {
        SpriteKey::Player
    };
    draw_sprite(renderer, &assets.sprites, pose, player.position());
    if let Some(boss) = query::boss(world) {
        draw_sprite(
            renderer,
            &assets.sprites,
            SpriteKey::Boss(boss.state),
            boss.position,
        );
    }

    if let Some(hud) = hud {
        renderer.draw_hud(hud);
    }
    renderer.present();
}

fn draw_sprite(
    renderer: &mut dyn Renderer,
    sprites: &SpriteBook,
    key: SpriteKey,
    position: Position,
) {
    let Some(texture) = sprites.texture(key) else {
        return;
    };
    let size = renderer
        .texture_size(texture)
        .unwrap_or(FALLBACK_SPRITE_SIZE);
    let origin = Vec2::new(position.x() as f32, position.y() as f32);
    renderer.draw_texture(
        texture,
        PixelRect::at(Vec2::ZERO, size),
        PixelRect::at(origin, size),
    );
}
