#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level and tileset loading for Boss Arena.
//!
//! Levels use the Tiled JSON map layout: grid and tile sizes, ordered tile
//! layers of one-based global tile ids, and external tilesets whose tiles each
//! reference their own image. Every problem is fatal and reported as an
//! [`AssetError`] so a session never starts from a half-loaded level.

use std::{
    fs,
    path::{Path, PathBuf},
};

use boss_arena_world::{Terrain, TerrainError, TileLayer};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while loading level assets.
#[derive(Debug, Error)]
pub enum AssetError {
    /// A file could not be read.
    #[error("failed to read {}", path.display())]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A file is not valid JSON of the expected shape.
    #[error("failed to parse {}", path.display())]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
    /// A tile layer carries no tile data.
    #[error("tile layer `{layer}` has no data")]
    MissingLayerData {
        /// Name of the offending layer.
        layer: String,
    },
    /// Tileset first ids must be at least one.
    #[error("tileset {} has first id 0", tileset.display())]
    InvalidFirstId {
        /// Tileset reference with the bad first id.
        tileset: PathBuf,
    },
    /// Level dimensions and layer contents disagree.
    #[error("level {} is malformed", path.display())]
    Terrain {
        /// Level file.
        path: PathBuf,
        /// Validation failure.
        #[source]
        source: TerrainError,
    },
}

#[derive(Debug, Deserialize)]
struct LevelFile {
    width: u32,
    height: u32,
    tilewidth: u32,
    tileheight: u32,
    layers: Vec<LayerFile>,
    #[serde(default)]
    tilesets: Vec<TilesetRefFile>,
}

#[derive(Debug, Deserialize)]
struct LayerFile {
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default = "tile_layer_kind")]
    kind: String,
    #[serde(default)]
    data: Option<Vec<u32>>,
}

fn tile_layer_kind() -> String {
    "tilelayer".to_owned()
}

#[derive(Debug, Deserialize)]
struct TilesetRefFile {
    firstgid: u32,
    source: PathBuf,
}

#[derive(Debug, Deserialize)]
struct TilesetFile {
    #[serde(default)]
    tiles: Vec<TileFile>,
}

#[derive(Debug, Deserialize)]
struct TileFile {
    id: u32,
    image: PathBuf,
}

/// External tileset referenced by a level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TilesetRef {
    /// Global id of the tileset's first tile.
    pub first_id: u32,
    /// Path of the tileset file, resolved against the level directory.
    pub source: PathBuf,
}

/// Image backing one tileset entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileImage {
    /// Zero-based index the terrain uses for this tile (global id minus one).
    pub index: u32,
    /// Image path, resolved against the tileset directory.
    pub path: PathBuf,
}

/// Level whose tileset references have not been resolved yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelDescription {
    /// Validated terrain.
    pub terrain: Terrain,
    /// Tilesets in declaration order.
    pub tilesets: Vec<TilesetRef>,
}

/// Fully loaded level: terrain plus the image of every known tile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Level {
    /// Validated terrain.
    pub terrain: Terrain,
    /// Images keyed by zero-based tile index, in ascending index order.
    pub tiles: Vec<TileImage>,
}

/// Parses level JSON. Relative tileset paths are resolved against `level_dir`.
pub fn parse_level(
    json: &str,
    origin: &Path,
    level_dir: &Path,
) -> Result<LevelDescription, AssetError> {
    let file: LevelFile = serde_json::from_str(json).map_err(|source| AssetError::Parse {
        path: origin.to_path_buf(),
        source,
    })?;

    let mut layers = Vec::new();
    for layer in file.layers {
        if layer.kind != "tilelayer" {
            debug!(layer = %layer.name, kind = %layer.kind, "skipping non-tile layer");
            continue;
        }
        let data = layer.data.ok_or_else(|| AssetError::MissingLayerData {
            layer: layer.name.clone(),
        })?;
        layers.push(TileLayer::new(layer.name, data));
    }

    let terrain = Terrain::new(
        file.width,
        file.height,
        file.tilewidth,
        file.tileheight,
        layers,
    )
    .map_err(|source| AssetError::Terrain {
        path: origin.to_path_buf(),
        source,
    })?;

    let tilesets = file
        .tilesets
        .into_iter()
        .map(|tileset| {
            if tileset.firstgid == 0 {
                return Err(AssetError::InvalidFirstId {
                    tileset: tileset.source,
                });
            }
            Ok(TilesetRef {
                first_id: tileset.firstgid,
                source: level_dir.join(tileset.source),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(LevelDescription { terrain, tilesets })
}

/// Parses tileset JSON. Relative image paths are resolved against `tileset_dir`.
pub fn parse_tileset(
    json: &str,
    origin: &Path,
    first_id: u32,
    tileset_dir: &Path,
) -> Result<Vec<TileImage>, AssetError> {
    let file: TilesetFile = serde_json::from_str(json).map_err(|source| AssetError::Parse {
        path: origin.to_path_buf(),
        source,
    })?;

    Ok(file
        .tiles
        .into_iter()
        .map(|tile| TileImage {
            index: first_id.saturating_add(tile.id).saturating_sub(1),
            path: tileset_dir.join(tile.image),
        })
        .collect())
}

/// Loads a level and every tileset it references.
pub fn load_level(path: &Path) -> Result<Level, AssetError> {
    let level_dir = parent_dir(path);
    let description = parse_level(&read(path)?, path, &level_dir)?;

    let mut tiles = Vec::new();
    for tileset in &description.tilesets {
        let json = read(&tileset.source)?;
        let images = parse_tileset(
            &json,
            &tileset.source,
            tileset.first_id,
            &parent_dir(&tileset.source),
        )?;
        debug!(tileset = %tileset.source.display(), tiles = images.len(), "tileset loaded");
        tiles.extend(images);
    }
    tiles.sort_by_key(|tile| tile.index);
    tiles.dedup_by_key(|tile| tile.index);

    let terrain = description.terrain;
    info!(
        level = %path.display(),
        columns = terrain.columns(),
        rows = terrain.rows(),
        layers = terrain.layers().len(),
        tiles = tiles.len(),
        "level loaded"
    );
    Ok(Level { terrain, tiles })
}

fn read(path: &Path) -> Result<String, AssetError> {
    fs::read_to_string(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL: &str = r#"{
        "width": 3,
        "height": 2,
        "tilewidth": 16,
        "tileheight": 16,
        "layers": [
            { "name": "ground", "type": "tilelayer", "data": [1, 1, 2, 2, 1, 1] },
            { "name": "spawns", "type": "objectgroup", "objects": [] },
            { "name": "props", "data": [0, 0, 5, 0, 0, 0] }
        ],
        "tilesets": [{ "firstgid": 1, "source": "tiles/arena.json" }]
    }"#;

    #[test]
    fn parses_tile_layers_and_skips_others() {
        let level = parse_level(LEVEL, Path::new("level.json"), Path::new("assets"))
            .expect("level parses");
        let names: Vec<_> = level
            .terrain
            .layers()
            .iter()
            .map(TileLayer::name)
            .collect();
        assert_eq!(names, vec!["ground", "props"]);
        assert_eq!(level.terrain.topmost_tile(2, 0), Some(5));
        assert_eq!(
            level.tilesets,
            vec![TilesetRef {
                first_id: 1,
                source: Path::new("assets").join("tiles/arena.json"),
            }]
        );
    }

    #[test]
    fn layer_size_mismatch_is_fatal() {
        let json = r#"{
            "width": 2, "height": 2, "tilewidth": 8, "tileheight": 8,
            "layers": [{ "name": "ground", "data": [1, 1, 1] }]
        }"#;
        let error = parse_level(json, Path::new("broken.json"), Path::new(""))
            .expect_err("short layer rejected");
        assert!(matches!(
            error,
            AssetError::Terrain {
                source: TerrainError::LayerSizeMismatch { .. },
                ..
            }
        ));
    }

    #[test]
    fn missing_dimensions_are_fatal() {
        let json = r#"{ "width": 2, "tilewidth": 8, "tileheight": 8, "layers": [] }"#;
        let error = parse_level(json, Path::new("broken.json"), Path::new(""))
            .expect_err("missing height rejected");
        assert!(matches!(error, AssetError::Parse { .. }));
    }

    #[test]
    fn tileset_indices_follow_first_id() {
        let json = r#"{ "tiles": [
            { "id": 0, "image": "floor.png" },
            { "id": 4, "image": "crate.png" }
        ] }"#;
        let images = parse_tileset(json, Path::new("set.json"), 3, Path::new("tiles"))
            .expect("tileset parses");
        assert_eq!(
            images,
            vec![
                TileImage {
                    index: 2,
                    path: Path::new("tiles").join("floor.png"),
                },
                TileImage {
                    index: 6,
                    path: Path::new("tiles").join("crate.png"),
                },
            ]
        );
    }
}
