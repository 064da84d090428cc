//! One-byte tile encoding.
//!
//! ```text
//!  7 6 5 4   3 2 1 0
//! [ layer ] [ mask  ]
//! ```
//!
//! `0x31` is a walkable tile on layer 3. A mask of zero is solid on
//! every layer.

use std::fmt;

use eddy_core::GridError;

/// A packed `(layer, mask)` tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Tile(u8);

impl Tile {
    /// Solid tile on layer 0. Fresh maps are filled with it.
    pub const SOLID: Tile = Tile(0);

    /// Mask value meaning "blocks movement".
    pub const SOLID_MASK: u8 = 0;

    /// Mask value for an ordinary walkable tile.
    pub const WALKABLE_MASK: u8 = 1;

    /// Highest layer that fits in the layer nibble.
    pub const MAX_LAYER: u8 = 0x0f;

    /// Pack a layer and mask.
    ///
    /// Fails if `layer` exceeds [`MAX_LAYER`](Self::MAX_LAYER). Only the
    /// low four bits of `mask` are kept.
    pub fn new(layer: u8, mask: u8) -> Result<Self, GridError> {
        if layer > Self::MAX_LAYER {
            return Err(GridError::LayerOutOfRange { layer });
        }
        Ok(Self((layer << 4) | (mask & 0x0f)))
    }

    /// A walkable tile on `layer`.
    pub fn walkable(layer: u8) -> Result<Self, GridError> {
        Self::new(layer, Self::WALKABLE_MASK)
    }

    /// Reinterpret a raw byte.
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// The raw byte.
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Height layer in `0..=15`.
    pub const fn layer(self) -> u8 {
        self.0 >> 4
    }

    /// Type mask in `0..=15`.
    pub const fn mask(self) -> u8 {
        self.0 & 0x0f
    }

    /// Whether the tile blocks movement regardless of layer.
    pub const fn is_solid(self) -> bool {
        self.mask() == Self::SOLID_MASK
    }

    /// Whether the tile blocks movement for something standing on
    /// `viewer_layer`: solid tiles always do, and so does any tile more
    /// than one layer above or below.
    pub fn is_solid_from(self, viewer_layer: u8) -> bool {
        self.is_solid() || self.layer().abs_diff(viewer_layer) > 1
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}
