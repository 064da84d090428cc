//! Fixed-capacity tile map and its solidity queries.

use eddy_core::{Cell, GridDims, GridError, GridOracle};

use crate::tile::Tile;

/// Default tile side length in world units.
pub const DEFAULT_TILE_SIZE: u32 = 16;

/// World-space rectangle covered by one tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileBounds {
    /// Left edge.
    pub x: f32,
    /// Bottom edge.
    pub y: f32,
    /// Width (equal to the tile size).
    pub width: f32,
    /// Height (equal to the tile size).
    pub height: f32,
}

impl TileBounds {
    /// Bounds of `cell` for tiles of side `tile_size`.
    pub fn of(cell: Cell, tile_size: u32) -> Self {
        let s = tile_size as f32;
        Self {
            x: cell.col as f32 * s,
            y: cell.row as f32 * s,
            width: s,
            height: s,
        }
    }

    /// Whether the world point `(x, y)` lies inside, left/bottom inclusive.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
    }
}

/// A grid of [`Tile`]s stored `[row][col]`.
///
/// The map has a fixed maximum size chosen at construction. Levels that
/// use less space shrink the utilised extent instead of reallocating;
/// tiles outside it read as solid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileMap {
    tiles: Vec<Tile>,
    max: GridDims,
    utilised_cols: u32,
    utilised_rows: u32,
}

impl TileMap {
    /// Create a map of `max_cols × max_rows` solid tiles, fully utilised.
    pub fn new(max_cols: u32, max_rows: u32) -> Result<Self, GridError> {
        let max = GridDims::new(max_cols, max_rows)?;
        Ok(Self {
            tiles: vec![Tile::SOLID; max.cell_count()],
            max,
            utilised_cols: max_cols,
            utilised_rows: max_rows,
        })
    }

    /// Maximum dimensions the map can hold.
    pub fn max_dims(&self) -> GridDims {
        self.max
    }

    /// Dimensions of the utilised region.
    ///
    /// This is the grid a flow field over this map should be sized to.
    pub fn dims(&self) -> GridDims {
        GridDims::new(self.utilised_cols, self.utilised_rows)
            .unwrap_or(self.max)
    }

    /// Utilised column count.
    pub fn utilised_cols(&self) -> u32 {
        self.utilised_cols
    }

    /// Utilised row count.
    pub fn utilised_rows(&self) -> u32 {
        self.utilised_rows
    }

    /// Restrict walkable space to the bottom-left `cols × rows`.
    ///
    /// Values are clamped to the map's maximum and to at least one.
    pub fn set_utilised(&mut self, cols: u32, rows: u32) {
        self.utilised_cols = cols.clamp(1, self.max.width());
        self.utilised_rows = rows.clamp(1, self.max.height());
    }

    /// The stored tile at `(col, row)`, ignoring the utilised extent.
    pub fn tile(&self, col: i32, row: i32) -> Option<Tile> {
        self.max.index(Cell::new(col, row)).map(|i| self.tiles[i])
    }

    /// Overwrite the tile at `(col, row)`. Returns `false` if out of range.
    pub fn set_tile(&mut self, col: i32, row: i32, tile: Tile) -> bool {
        match self.max.index(Cell::new(col, row)) {
            Some(i) => {
                self.tiles[i] = tile;
                true
            }
            None => false,
        }
    }

    /// Overwrite the tile containing world position `(x, y)`.
    pub fn set_tile_at_world(&mut self, x: f32, y: f32, tile_size: u32, tile: Tile) -> bool {
        let cell = Cell::from_world(x, y, tile_size as f32);
        self.set_tile(cell.col, cell.row, tile)
    }

    /// Layer of the tile at `(col, row)`, or `None` if out of range.
    pub fn layer(&self, col: i32, row: i32) -> Option<u8> {
        self.tile(col, row).map(Tile::layer)
    }

    /// Whether `(col, row)` is inside the utilised region.
    fn in_utilised(&self, col: i32, row: i32) -> bool {
        col >= 0
            && row >= 0
            && (col as u32) < self.utilised_cols
            && (row as u32) < self.utilised_rows
    }

    /// Utilised-region tile, or `None` if outside it.
    fn utilised_tile(&self, col: i32, row: i32) -> Option<Tile> {
        if self.in_utilised(col, row) {
            self.tile(col, row)
        } else {
            None
        }
    }

    /// Solidity as seen from `viewer_layer`: a walkable tile more than
    /// one layer away counts as solid. Used for line of sight and
    /// per-layer collision.
    pub fn is_solid_from_layer(&self, col: i32, row: i32, viewer_layer: u8) -> bool {
        self.utilised_tile(col, row)
            .is_none_or(|t| t.is_solid_from(viewer_layer))
    }

    /// Whether the tile containing world position `(x, y)` is solid.
    pub fn is_solid_at_world(&self, x: f32, y: f32, tile_size: u32) -> bool {
        let cell = Cell::from_world(x, y, tile_size as f32);
        self.is_solid(cell.col, cell.row)
    }

    /// An oracle that answers solidity relative to `viewer_layer`.
    pub fn layer_view(&self, viewer_layer: u8) -> LayerView<'_> {
        LayerView {
            map: self,
            viewer_layer,
        }
    }

    /// Raw tiles, row-major from the bottom row.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }
}

impl GridOracle for TileMap {
    fn is_solid(&self, col: i32, row: i32) -> bool {
        self.utilised_tile(col, row).is_none_or(Tile::is_solid)
    }
}

/// A [`TileMap`] viewed from one height layer.
#[derive(Clone, Copy, Debug)]
pub struct LayerView<'a> {
    map: &'a TileMap,
    viewer_layer: u8,
}

impl LayerView<'_> {
    /// The layer solidity is measured from.
    pub fn viewer_layer(&self) -> u8 {
        self.viewer_layer
    }
}

impl GridOracle for LayerView<'_> {
    fn is_solid(&self, col: i32, row: i32) -> bool {
        self.map.is_solid_from_layer(col, row, self.viewer_layer)
    }
}
