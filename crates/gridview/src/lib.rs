//! View-state synchronization and rendering composition for a grid world:
//! maps live world entities and overlay state onto change-notifying view
//! models, renders them into two fixed-order layers, and exposes the result
//! as one compositable visual subtree. The world model and the windowing
//! surface are collaborators, not residents.

mod grid;
mod notify;
mod overlay;
mod render;
mod viewmodel;
mod visual_key;
mod world;

pub use grid::{
    GridPosition, PixelPosition, TileDimensions, TILE_DIMENSIONS_DEFAULT,
};
pub use notify::{ChangeBus, SubscriberId, ViewChange, ViewProperty};
pub use overlay::{OverlayMode, OverlayNotifier, OverlayState};
pub use render::{
    CompositeHost, LayerKind, LayerRenderer, LayerVisual, StyleTable, StyleTableError,
    LAYER_COUNT, PLACEHOLDER_COLOR,
};
pub use viewmodel::{
    EntityViewModel, HazardViewModel, Lifecycle, PositionedVisualItem, RenderableEntity,
    RootViewModel, StructureViewModel, TileFieldViewModel, UnitViewModel, ViewContext,
};
pub use visual_key::{VisualKey, VisualKeyError};
pub use world::{
    EntityId, EntityKind, EntityRecord, HazardKind, StructureKind, TileField, TileFieldError,
    TileKind, UnitRole, WorldEvent,
};
