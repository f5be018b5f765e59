use tracing::{debug, error};

use crate::grid::TileDimensions;
use crate::notify::{SubscriberId, ViewChange};
use crate::viewmodel::{PositionedVisualItem, RootViewModel};

use super::style::{ResolvedStyle, StyleTable, PLACEHOLDER_COLOR};
use super::visual::LayerVisual;

const LAYER_CLEAR_TRANSPARENT: [u8; 4] = [0, 0, 0, 0];
const PLACEHOLDER_INSET_DIVISOR: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Tile,
    Entity,
}

impl LayerKind {
    fn is_relevant(self, change: &ViewChange) -> bool {
        match self {
            Self::Tile => matches!(
                change,
                ViewChange::TileFieldReplaced | ViewChange::TileFieldProperty { .. }
            ),
            Self::Entity => matches!(
                change,
                ViewChange::EntityAdded(_)
                    | ViewChange::EntityRemoved(_)
                    | ViewChange::EntityProperty { .. }
            ),
        }
    }
}

/// Turns one layer's positioned-item collection into a drawable visual.
/// Pure function of the pulled collection; the kept copy of the last
/// rendered collection exists only to decide whether a redraw is needed.
#[derive(Debug)]
pub struct LayerRenderer {
    kind: LayerKind,
    subscription: SubscriberId,
    visual: LayerVisual,
    last_items: Vec<PositionedVisualItem>,
    rendered_once: bool,
}

impl LayerRenderer {
    pub fn new(kind: LayerKind, root: &mut RootViewModel) -> Self {
        Self {
            kind,
            subscription: root.subscribe(),
            visual: LayerVisual::new(0, 0),
            last_items: Vec::new(),
            rendered_once: false,
        }
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn visual(&self) -> &LayerVisual {
        &self.visual
    }

    pub fn visual_mut(&mut self) -> &mut LayerVisual {
        &mut self.visual
    }

    /// Drains this layer's change queue and re-derives the visual when a
    /// relevant change arrived. Returns whether the visual was redrawn.
    pub fn sync(&mut self, root: &mut RootViewModel, styles: &mut StyleTable) -> bool {
        let revision_at_drain = root.overlay_revision();
        let changes = root.drain_changes(self.subscription);
        let relevant =
            !self.rendered_once || changes.iter().any(|change| self.kind.is_relevant(change));
        if !relevant {
            return false;
        }

        let items = match self.kind {
            LayerKind::Tile => root.tile_items(),
            LayerKind::Entity => root.entity_items(),
        };
        check_overlay_stability(revision_at_drain, root.overlay_revision());

        let (canvas_width, canvas_height) = root.canvas_size_px();
        let resized =
            self.visual.width_px() != canvas_width || self.visual.height_px() != canvas_height;
        if self.rendered_once && !resized && items == self.last_items {
            return false;
        }

        if resized {
            self.visual.resize(canvas_width, canvas_height);
        }
        self.redraw(&items, root.tile_dimensions(), styles);
        self.last_items = items;
        self.rendered_once = true;
        self.visual.mark_dirty();
        true
    }

    fn redraw(
        &mut self,
        items: &[PositionedVisualItem],
        tile_dimensions: TileDimensions,
        styles: &mut StyleTable,
    ) {
        self.visual.clear(LAYER_CLEAR_TRANSPARENT);
        for item in items {
            let origin = tile_dimensions.pixel_origin(item.grid_position);
            match styles.resolve(&item.visual_key) {
                ResolvedStyle::Solid(color) => self.visual.fill_rect(
                    origin.x,
                    origin.y,
                    tile_dimensions.width_px,
                    tile_dimensions.height_px,
                    color,
                ),
                ResolvedStyle::Sprite(sprite) => {
                    self.visual
                        .blit_rgba(&sprite.rgba, sprite.width, sprite.height, origin.x, origin.y)
                }
                ResolvedStyle::Placeholder => {
                    let inset_x = tile_dimensions.width_px / PLACEHOLDER_INSET_DIVISOR;
                    let inset_y = tile_dimensions.height_px / PLACEHOLDER_INSET_DIVISOR;
                    self.visual.fill_rect(
                        origin.x.saturating_add(inset_x),
                        origin.y.saturating_add(inset_y),
                        tile_dimensions.width_px.saturating_sub(inset_x * 2),
                        tile_dimensions.height_px.saturating_sub(inset_y * 2),
                        PLACEHOLDER_COLOR,
                    );
                }
            }
        }
        debug!(layer = ?self.kind, items = items.len(), "layer_redraw");
    }
}

/// The overlay cannot legally mutate between draining this layer's queue
/// and pulling its items; everything runs on one update thread. Seeing it
/// happen means the fan-out ordering broke.
fn check_overlay_stability(revision_at_drain: u64, revision_at_pull: u64) {
    if revision_at_drain == revision_at_pull {
        return;
    }
    debug_assert!(false, "overlay mutated during layer sync");
    error!(
        revision_at_drain,
        revision_at_pull, "overlay_revision_changed_during_sync"
    );
}
