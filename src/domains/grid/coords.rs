use serde::{Deserialize, Serialize};

/// Integer tile address on the simulation grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan(&self, other: &TilePos) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// 4-connected neighbours, no bounds check.
    pub fn neighbors(&self) -> [TilePos; 4] {
        [
            TilePos::new(self.x + 1, self.y),
            TilePos::new(self.x - 1, self.y),
            TilePos::new(self.x, self.y + 1),
            TilePos::new(self.x, self.y - 1),
        ]
    }
}

/// Continuous position in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelPos {
    pub x: f32,
    pub y: f32,
}

impl PixelPos {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &PixelPos) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Tile containing a pixel position (floor division).
pub fn pixel_to_tile(pos: PixelPos, tile_size: f32) -> TilePos {
    TilePos::new(
        (pos.x / tile_size).floor() as i32,
        (pos.y / tile_size).floor() as i32,
    )
}

/// Pixel position of a tile's centre.
pub fn tile_to_pixel(tile: TilePos, tile_size: f32) -> PixelPos {
    PixelPos::new(
        tile.x as f32 * tile_size + tile_size / 2.0,
        tile.y as f32 * tile_size + tile_size / 2.0,
    )
}
