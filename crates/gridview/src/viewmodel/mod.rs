mod entity;
mod root;
mod tile_field;

pub use entity::{
    EntityViewModel, HazardViewModel, RenderableEntity, StructureViewModel, UnitViewModel,
};
pub use root::RootViewModel;
pub use tile_field::TileFieldViewModel;

use crate::grid::{GridPosition, TileDimensions};
use crate::overlay::OverlayState;
use crate::visual_key::VisualKey;

/// Shared read-only configuration handed to view models at each derived-
/// property read. Passing it explicitly replaces a child-to-root back
/// pointer while preserving the same read access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewContext {
    pub tile_dimensions: TileDimensions,
    pub overlay: OverlayState,
}

/// Immutable snapshot of one renderable thing. Consumers read it and
/// re-request a fresh one when notified; they never mutate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedVisualItem {
    pub grid_position: GridPosition,
    pub visual_key: VisualKey,
    pub tooltip: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Created,
    Live,
    Disposed,
}
