use crate::grid::GridPosition;
use crate::notify::{ChangeBus, ViewChange, ViewProperty};
use crate::visual_key::VisualKey;
use crate::world::{TileField, TileKind};

use super::{PositionedVisualItem, ViewContext};

/// Wraps the tile field as one view model for the background layer. Void
/// tiles produce no visual item; the renderer leaves them untouched.
#[derive(Debug)]
pub struct TileFieldViewModel {
    field: TileField,
}

impl TileFieldViewModel {
    pub fn new(field: TileField) -> Self {
        Self { field }
    }

    pub fn field(&self) -> &TileField {
        &self.field
    }

    pub(crate) fn replace_field(&mut self, field: TileField, bus: &mut ChangeBus) {
        self.field = field;
        bus.publish(ViewChange::TileFieldReplaced);
    }

    pub(crate) fn on_overlay_changed(&mut self, bus: &mut ChangeBus) {
        bus.publish(ViewChange::TileFieldProperty {
            property: ViewProperty::VisualKey,
        });
        bus.publish(ViewChange::TileFieldProperty {
            property: ViewProperty::TooltipText,
        });
    }

    pub fn items(&self, context: &ViewContext) -> Vec<PositionedVisualItem> {
        let mut items =
            Vec::with_capacity(self.field.width() as usize * self.field.height() as usize);
        for y in 0..self.field.height() {
            for x in 0..self.field.width() {
                let Some(kind) = self.field.tile_at(x, y) else {
                    continue;
                };
                let base = match kind {
                    TileKind::Floor => "tile/floor",
                    TileKind::Wall => "tile/wall",
                    TileKind::Water => "tile/water",
                    TileKind::Void => continue,
                };
                let position = GridPosition { x, y };
                let mut key = VisualKey::base(base);
                if let Some(token) = context.overlay.mode.variant_token() {
                    key = key.with_variant(token);
                }
                let highlighted = context.overlay.highlighted == Some(position);
                if highlighted {
                    key = key.with_variant("highlight");
                }
                let tooltip = if highlighted {
                    format!("{} tile ({x}, {y}) [highlighted]", tile_display_name(kind))
                } else {
                    format!("{} tile ({x}, {y})", tile_display_name(kind))
                };
                items.push(PositionedVisualItem {
                    grid_position: position,
                    visual_key: key,
                    tooltip,
                });
            }
        }
        items
    }
}

fn tile_display_name(kind: TileKind) -> &'static str {
    match kind {
        TileKind::Floor => "floor",
        TileKind::Wall => "wall",
        TileKind::Water => "water",
        TileKind::Void => "void",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::TILE_DIMENSIONS_DEFAULT;
    use crate::overlay::{OverlayMode, OverlayState};

    fn context_with_overlay(overlay: OverlayState) -> ViewContext {
        ViewContext {
            tile_dimensions: TILE_DIMENSIONS_DEFAULT,
            overlay,
        }
    }

    fn two_by_one(left: TileKind, right: TileKind) -> TileField {
        TileField::new(2, 1, vec![left, right]).expect("field")
    }

    #[test]
    fn items_cover_every_non_void_tile() {
        let view_model = TileFieldViewModel::new(two_by_one(TileKind::Floor, TileKind::Void));
        let items = view_model.items(&context_with_overlay(OverlayState::default()));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].grid_position, GridPosition { x: 0, y: 0 });
        assert_eq!(items[0].visual_key.as_str(), "tile/floor");
        assert_eq!(items[0].tooltip, "floor tile (0, 0)");
    }

    #[test]
    fn overlay_mode_changes_every_tile_key() {
        let view_model = TileFieldViewModel::new(two_by_one(TileKind::Floor, TileKind::Water));
        let items = view_model.items(&context_with_overlay(OverlayState {
            mode: OverlayMode::Thermal,
            ..OverlayState::default()
        }));
        assert_eq!(items[0].visual_key.as_str(), "tile/floor__thermal");
        assert_eq!(items[1].visual_key.as_str(), "tile/water__thermal");
    }

    #[test]
    fn highlight_marks_exactly_the_highlighted_tile() {
        let view_model = TileFieldViewModel::new(two_by_one(TileKind::Floor, TileKind::Floor));
        let items = view_model.items(&context_with_overlay(OverlayState {
            highlighted: Some(GridPosition { x: 1, y: 0 }),
            ..OverlayState::default()
        }));
        assert_eq!(items[0].visual_key.as_str(), "tile/floor");
        assert_eq!(items[1].visual_key.as_str(), "tile/floor__highlight");
        assert_eq!(items[1].tooltip, "floor tile (1, 0) [highlighted]");
    }

    #[test]
    fn replace_field_publishes_a_single_replacement_change() {
        let mut bus = ChangeBus::default();
        let subscriber = bus.subscribe();
        let mut view_model = TileFieldViewModel::new(TileField::empty());

        view_model.replace_field(two_by_one(TileKind::Wall, TileKind::Wall), &mut bus);

        assert_eq!(bus.drain(subscriber), vec![ViewChange::TileFieldReplaced]);
        assert_eq!(view_model.field().width(), 2);
    }

    #[test]
    fn empty_field_produces_no_items() {
        let view_model = TileFieldViewModel::new(TileField::empty());
        let items = view_model.items(&context_with_overlay(OverlayState::default()));
        assert!(items.is_empty());
    }
}
