/// Grid-to-pixel convention:
/// - `GridPosition` is in tile units, origin at the top-left of the field.
/// - The pixel origin of tile (x, y) is `(x * width_px, y * height_px)`.
///   There is no other transform between grid space and layer-visual space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPosition {
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelPosition {
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileDimensions {
    pub width_px: u32,
    pub height_px: u32,
}

pub const TILE_DIMENSIONS_DEFAULT: TileDimensions = TileDimensions {
    width_px: 64,
    height_px: 64,
};

impl TileDimensions {
    pub fn pixel_origin(self, grid: GridPosition) -> PixelPosition {
        PixelPosition {
            x: grid.x.saturating_mul(self.width_px),
            y: grid.y.saturating_mul(self.height_px),
        }
    }

    pub fn canvas_size_px(self, tiles_wide: u32, tiles_high: u32) -> (u32, u32) {
        (
            tiles_wide.saturating_mul(self.width_px),
            tiles_high.saturating_mul(self.height_px),
        )
    }
}
