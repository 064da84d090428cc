//! Layered tile maps for Eddy.
//!
//! A [`TileMap`] is a fixed-capacity grid of [`Tile`]s, each packing a
//! height layer and a walkability mask into one byte. It implements
//! [`GridOracle`](eddy_core::GridOracle) so it can be shared read-only
//! with every flow-field computation in flight.
//!
//! # Coordinates
//!
//! Row 0 is the bottom row and columns grow to the right. Only the
//! *utilised* region (`utilised_cols × utilised_rows`, anchored at the
//! origin) is walkable; everything outside it is solid, so agents can
//! never path past the level ends.
//!
//! # Text maps
//!
//! [`TileMap::from_text`] builds a map from a picture whose first line
//! is the top row:
//!
//! ```
//! use eddy_core::GridOracle;
//! use eddy_grid::TileMap;
//!
//! let map = TileMap::from_text(
//!     "#####\n\
//!      #..1#\n\
//!      ######",
//! )
//! .unwrap();
//! assert!(!map.is_solid(1, 1));
//! assert!(map.is_solid(0, 1));
//! assert!(map.is_solid(9, 9));
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod map;
pub mod text;
pub mod tile;

pub use map::{LayerView, TileBounds, TileMap, DEFAULT_TILE_SIZE};
pub use tile::Tile;
