//! Layered tile terrain the world is built on.

use boss_arena_core::{ArenaBounds, Position};
use thiserror::Error;

/// Errors raised when terrain dimensions and layer contents disagree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TerrainError {
    /// Grid or tile dimensions must be positive.
    #[error("terrain dimension `{name}` must be positive")]
    ZeroDimension {
        /// Name of the offending dimension.
        name: &'static str,
    },
    /// A layer does not contain exactly one tile id per cell.
    #[error("layer `{layer}` holds {actual} tiles, expected {expected}")]
    LayerSizeMismatch {
        /// Name of the offending layer.
        layer: String,
        /// Number of cells in the grid.
        expected: usize,
        /// Number of tile ids in the layer.
        actual: usize,
    },
}

/// Maps a raw layer tile id to an index into the tileset.
///
/// Raw ids are one-based and zero marks an empty cell, so the lookup index is
/// the id minus one.
#[must_use]
pub const fn tileset_index(raw_id: u32) -> Option<u32> {
    raw_id.checked_sub(1)
}

/// Ordered grid of raw tile ids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileLayer {
    name: String,
    tiles: Vec<u32>,
}

impl TileLayer {
    /// Creates a layer from row-major raw tile ids.
    #[must_use]
    pub fn new(name: impl Into<String>, tiles: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            tiles,
        }
    }

    /// Name of the layer.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Row-major raw tile ids.
    #[must_use]
    pub fn tiles(&self) -> &[u32] {
        &self.tiles
    }
}

/// Validated terrain: grid size, tile size, and layers from bottom to top.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Terrain {
    columns: u32,
    rows: u32,
    tile_width: u32,
    tile_height: u32,
    layers: Vec<TileLayer>,
}

impl Terrain {
    /// Validates and assembles terrain.
    pub fn new(
        columns: u32,
        rows: u32,
        tile_width: u32,
        tile_height: u32,
        layers: Vec<TileLayer>,
    ) -> Result<Self, TerrainError> {
        for (name, value) in [
            ("columns", columns),
            ("rows", rows),
            ("tile_width", tile_width),
            ("tile_height", tile_height),
        ] {
            if value == 0 {
                return Err(TerrainError::ZeroDimension { name });
            }
        }

        let expected = columns as usize * rows as usize;
        if let Some(layer) = layers.iter().find(|layer| layer.tiles.len() != expected) {
            return Err(TerrainError::LayerSizeMismatch {
                layer: layer.name.clone(),
                expected,
                actual: layer.tiles.len(),
            });
        }

        Ok(Self {
            columns,
            rows,
            tile_width,
            tile_height,
            layers,
        })
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Width of one tile in pixels.
    #[must_use]
    pub const fn tile_width(&self) -> u32 {
        self.tile_width
    }

    /// Height of one tile in pixels.
    #[must_use]
    pub const fn tile_height(&self) -> u32 {
        self.tile_height
    }

    /// Layers ordered from bottom to top.
    #[must_use]
    pub fn layers(&self) -> &[TileLayer] {
        &self.layers
    }

    /// Pixel extent of the whole map.
    #[must_use]
    pub fn bounds(&self) -> ArenaBounds {
        let width = u64::from(self.columns) * u64::from(self.tile_width);
        let height = u64::from(self.rows) * u64::from(self.tile_height);
        ArenaBounds::new(
            i32::try_from(width).unwrap_or(i32::MAX),
            i32::try_from(height).unwrap_or(i32::MAX),
        )
    }

    /// Tile cell containing `position`, if it lies on the map.
    #[must_use]
    pub fn cell_at(&self, position: Position) -> Option<(u32, u32)> {
        let column = u32::try_from(position.x()).ok()? / self.tile_width;
        let row = u32::try_from(position.y()).ok()? / self.tile_height;
        (column < self.columns && row < self.rows).then_some((column, row))
    }

    /// Raw id stored at the given cell of the given layer.
    #[must_use]
    pub fn tile_at(&self, layer: usize, column: u32, row: u32) -> Option<u32> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        let index = row as usize * self.columns as usize + column as usize;
        self.layers.get(layer)?.tiles.get(index).copied()
    }

    /// Raw id of the topmost non-empty layer at the given cell.
    #[must_use]
    pub fn topmost_tile(&self, column: u32, row: u32) -> Option<u32> {
        (0..self.layers.len())
            .rev()
            .filter_map(|layer| self.tile_at(layer, column, row))
            .find(|raw| *raw != 0)
    }

    /// Iterates over `(column, row, raw id)` for every cell of a layer.
    pub fn cells<'a>(&'a self, layer: &'a TileLayer) -> impl Iterator<Item = (u32, u32, u32)> + 'a {
        let columns = self.columns as usize;
        layer.tiles.iter().enumerate().map(move |(index, raw)| {
            let column = (index % columns) as u32;
            let row = (index / columns) as u32;
            (column, row, *raw)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terrain() -> Terrain {
        Terrain::new(
            3,
            2,
            16,
            16,
            vec![
                TileLayer::new("ground", vec![1, 1, 1, 2, 2, 2]),
                TileLayer::new("props", vec![0, 5, 0, 0, 0, 0]),
            ],
        )
        .expect("valid terrain")
    }

    #[test]
    fn zero_marks_an_empty_cell() {
        assert_eq!(tileset_index(0), None);
        assert_eq!(tileset_index(1), Some(0));
        assert_eq!(tileset_index(17), Some(16));
    }

    #[test]
    fn rejects_missing_dimensions() {
        let error = Terrain::new(0, 2, 16, 16, Vec::new()).expect_err("zero columns");
        assert_eq!(error, TerrainError::ZeroDimension { name: "columns" });
    }

    #[test]
    fn rejects_layers_of_wrong_size() {
        let error = Terrain::new(2, 2, 16, 16, vec![TileLayer::new("short", vec![1, 2, 3])])
            .expect_err("short layer");
        assert_eq!(
            error,
            TerrainError::LayerSizeMismatch {
                layer: "short".to_owned(),
                expected: 4,
                actual: 3,
            }
        );
    }

    #[test]
    fn resolves_cells_and_topmost_tiles() {
        let terrain = terrain();
        assert_eq!(terrain.bounds(), ArenaBounds::new(48, 32));
        assert_eq!(terrain.cell_at(Position::new(20, 3)), Some((1, 0)));
        assert_eq!(terrain.cell_at(Position::new(48, 0)), None);
        assert_eq!(terrain.topmost_tile(1, 0), Some(5));
        assert_eq!(terrain.topmost_tile(0, 1), Some(2));
    }

    #[test]
    fn cells_walk_rows_in_order() {
        let terrain = terrain();
        let cells: Vec<_> = terrain.cells(&terrain.layers()[0]).collect();
        assert_eq!(cells[0], (0, 0, 1));
        assert_eq!(cells[4], (1, 1, 2));
    }
}
