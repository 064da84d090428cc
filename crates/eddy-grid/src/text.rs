//! Text pictures of tile maps.
//!
//! | Glyph | Tile |
//! |-------|------|
//! | `#` | solid |
//! | `.` | walkable, layer 0 |
//! | `0`..`9` | walkable on that layer |
//!
//! The first non-blank line is the top row. Leading and trailing
//! whitespace on each line is ignored so pictures can be indented.

use eddy_core::GridError;

use crate::map::TileMap;
use crate::tile::Tile;

fn parse_glyph(glyph: char) -> Option<Tile> {
    match glyph {
        '#' => Some(Tile::SOLID),
        '.' => Some(Tile::from_raw(Tile::WALKABLE_MASK)),
        d @ '0'..='9' => {
            let layer = d as u8 - b'0';
            Some(Tile::from_raw((layer << 4) | Tile::WALKABLE_MASK))
        }
        _ => None,
    }
}

fn glyph_of(tile: Tile) -> char {
    if tile.is_solid() {
        '#'
    } else if tile.layer() == 0 {
        '.'
    } else if tile.layer() <= 9 {
        (b'0' + tile.layer()) as char
    } else {
        '+'
    }
}

impl TileMap {
    /// Parse a text picture into a fully utilised map of its size.
    pub fn from_text(text: &str) -> Result<Self, GridError> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let rows = lines.len();
        let cols = lines.first().map_or(0, |l| l.chars().count());
        let mut map = TileMap::new(cols as u32, rows as u32)?;
        for (line_no, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != cols {
                return Err(GridError::RaggedRows {
                    line: line_no,
                    expected: cols,
                    found,
                });
            }
            let row = (rows - 1 - line_no) as i32;
            for (column, glyph) in line.chars().enumerate() {
                let tile = parse_glyph(glyph).ok_or(GridError::UnknownTile {
                    glyph,
                    line: line_no,
                    column,
                })?;
                map.set_tile(column as i32, row, tile);
            }
        }
        Ok(map)
    }

    /// Render the utilised region as a text picture, top row first.
    ///
    /// Layers above 9 render as `+` and do not survive a round trip.
    pub fn to_text(&self) -> String {
        let cols = self.utilised_cols() as i32;
        let rows = self.utilised_rows() as i32;
        let mut out = String::with_capacity(((cols + 1) * rows) as usize);
        for row in (0..rows).rev() {
            for col in 0..cols {
                out.push(self.tile(col, row).map_or('#', glyph_of));
            }
            out.push('\n');
        }
        out
    }
}
