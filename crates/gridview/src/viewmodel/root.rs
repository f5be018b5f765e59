use std::collections::HashMap;

use tracing::{debug, warn};

use crate::grid::{GridPosition, TileDimensions, TILE_DIMENSIONS_DEFAULT};
use crate::notify::{ChangeBus, SubscriberId, ViewChange};
use crate::overlay::{OverlayMode, OverlayNotifier, OverlayState};
use crate::world::{EntityId, TileField, WorldEvent};

use super::{EntityViewModel, PositionedVisualItem, TileFieldViewModel, ViewContext};

/// Aggregate root and single binding surface for the presentation shell.
/// Owns the keyed entity view-model collection, the tile-field view model,
/// the overlay notifier, and the change bus; children receive shared state
/// through [`ViewContext`] instead of a back-reference.
#[derive(Debug)]
pub struct RootViewModel {
    tile_dimensions: TileDimensions,
    overlay: OverlayNotifier,
    entities: HashMap<EntityId, EntityViewModel>,
    tile_field: TileFieldViewModel,
    bus: ChangeBus,
}

impl Default for RootViewModel {
    fn default() -> Self {
        Self::new(TILE_DIMENSIONS_DEFAULT)
    }
}

impl RootViewModel {
    pub fn new(tile_dimensions: TileDimensions) -> Self {
        Self {
            tile_dimensions,
            overlay: OverlayNotifier::default(),
            entities: HashMap::new(),
            tile_field: TileFieldViewModel::new(TileField::empty()),
            bus: ChangeBus::default(),
        }
    }

    pub fn tile_dimensions(&self) -> TileDimensions {
        self.tile_dimensions
    }

    pub fn view_context(&self) -> ViewContext {
        ViewContext {
            tile_dimensions: self.tile_dimensions,
            overlay: self.overlay.state(),
        }
    }

    pub fn overlay_state(&self) -> OverlayState {
        self.overlay.state()
    }

    pub fn overlay_revision(&self) -> u64 {
        self.overlay.revision()
    }

    pub fn set_overlay(&mut self, state: OverlayState) {
        let Self {
            overlay,
            entities,
            tile_field,
            bus,
            ..
        } = self;
        overlay.set_overlay(state, entities.values_mut(), tile_field, bus);
    }

    pub fn set_overlay_mode(&mut self, mode: OverlayMode) {
        let state = OverlayState {
            mode,
            ..self.overlay.state()
        };
        self.set_overlay(state);
    }

    pub fn select_entity(&mut self, selected: Option<EntityId>) {
        let state = OverlayState {
            selected,
            ..self.overlay.state()
        };
        self.set_overlay(state);
    }

    pub fn highlight_tile(&mut self, highlighted: Option<GridPosition>) {
        let state = OverlayState {
            highlighted,
            ..self.overlay.state()
        };
        self.set_overlay(state);
    }

    /// Reflects one world-model change into the view-model collection.
    /// Disposal is synchronous with removal: a removed entity's view model
    /// publishes nothing after this call returns.
    pub fn apply_world_event(&mut self, event: WorldEvent) {
        match event {
            WorldEvent::EntityAdded(record) => {
                if self.entities.contains_key(&record.id) {
                    warn!(entity_id = record.id.0, "entity_added_twice");
                    self.apply_world_event(WorldEvent::EntityChanged(record));
                    return;
                }
                let mut view_model = EntityViewModel::new(&record);
                view_model.mark_live();
                self.entities.insert(record.id, view_model);
                self.bus.publish(ViewChange::EntityAdded(record.id));
                debug!(entity_id = record.id.0, "view_model_created");
            }
            WorldEvent::EntityChanged(record) => match self.entities.get_mut(&record.id) {
                Some(view_model) => view_model.update_entity(&record, &mut self.bus),
                None => warn!(entity_id = record.id.0, "entity_changed_for_unknown_entity"),
            },
            WorldEvent::EntityRemoved(id) => match self.entities.remove(&id) {
                Some(mut view_model) => {
                    view_model.dispose();
                    self.bus.publish(ViewChange::EntityRemoved(id));
                    debug!(entity_id = id.0, "view_model_disposed");
                }
                None => warn!(entity_id = id.0, "entity_removed_for_unknown_entity"),
            },
        }
    }

    pub fn set_tile_field(&mut self, field: TileField) {
        self.tile_field.replace_field(field, &mut self.bus);
    }

    pub fn tile_field(&self) -> &TileField {
        self.tile_field.field()
    }

    pub fn entity_view_model(&self, id: EntityId) -> Option<&EntityViewModel> {
        self.entities.get(&id)
    }

    pub fn live_entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn subscribe(&mut self) -> SubscriberId {
        self.bus.subscribe()
    }

    pub fn unsubscribe(&mut self, subscriber: SubscriberId) {
        self.bus.unsubscribe(subscriber);
    }

    pub fn drain_changes(&mut self, subscriber: SubscriberId) -> Vec<ViewChange> {
        self.bus.drain(subscriber)
    }

    /// Entity-layer items, ordered by entity identity so the draw order is
    /// stable across frames regardless of map iteration order.
    pub fn entity_items(&self) -> Vec<PositionedVisualItem> {
        let context = self.view_context();
        let mut ids: Vec<EntityId> = self.entities.keys().copied().collect();
        ids.sort_unstable();
        ids.iter()
            .filter_map(|id| self.entities.get(id))
            .map(|view_model| view_model.item(&context))
            .collect()
    }

    pub fn tile_items(&self) -> Vec<PositionedVisualItem> {
        self.tile_field.items(&self.view_context())
    }

    pub fn canvas_size_px(&self) -> (u32, u32) {
        self.tile_dimensions
            .canvas_size_px(self.tile_field.field().width(), self.tile_field.field().height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::ViewProperty;
    use crate::viewmodel::{Lifecycle, RenderableEntity};
    use crate::world::{EntityKind, EntityRecord, TileKind, UnitRole};

    fn worker_record(id: u64, x: u32, y: u32) -> EntityRecord {
        EntityRecord {
            id: EntityId(id),
            position: GridPosition { x, y },
            kind: EntityKind::Unit {
                role: UnitRole::Worker,
                moving: false,
            },
        }
    }

    fn count_property_changes(
        changes: &[ViewChange],
        id: EntityId,
        property: ViewProperty,
    ) -> usize {
        changes
            .iter()
            .filter(|change| {
                **change
                    == ViewChange::EntityProperty {
                        id,
                        property,
                    }
            })
            .count()
    }

    #[test]
    fn exactly_one_live_view_model_per_world_entity() {
        let mut root = RootViewModel::default();
        root.apply_world_event(WorldEvent::EntityAdded(worker_record(1, 3, 2)));
        root.apply_world_event(WorldEvent::EntityAdded(worker_record(2, 0, 0)));

        assert_eq!(root.live_entity_count(), 2);
        let view_model = root.entity_view_model(EntityId(1)).expect("view model");
        assert_eq!(view_model.lifecycle(), Lifecycle::Live);
        assert_eq!(view_model.grid_position(), GridPosition { x: 3, y: 2 });
    }

    #[test]
    fn entity_change_keeps_position_in_agreement_with_the_world() {
        let mut root = RootViewModel::default();
        root.apply_world_event(WorldEvent::EntityAdded(worker_record(1, 0, 0)));
        root.apply_world_event(WorldEvent::EntityChanged(worker_record(1, 5, 7)));

        let view_model = root.entity_view_model(EntityId(1)).expect("view model");
        assert_eq!(view_model.grid_position(), GridPosition { x: 5, y: 7 });
    }

    #[test]
    fn overlay_transition_notifies_each_live_view_model_exactly_once_per_property() {
        let mut root = RootViewModel::default();
        root.apply_world_event(WorldEvent::EntityAdded(worker_record(1, 0, 0)));
        root.apply_world_event(WorldEvent::EntityAdded(worker_record(2, 1, 0)));
        let subscriber = root.subscribe();

        root.set_overlay_mode(OverlayMode::Thermal);

        let changes = root.drain_changes(subscriber);
        for id in [EntityId(1), EntityId(2)] {
            assert_eq!(
                count_property_changes(&changes, id, ViewProperty::VisualKey),
                1
            );
            assert_eq!(
                count_property_changes(&changes, id, ViewProperty::TooltipText),
                1
            );
        }
    }

    #[test]
    fn resetting_the_same_overlay_notifies_without_changing_derived_values() {
        let mut root = RootViewModel::default();
        root.apply_world_event(WorldEvent::EntityAdded(worker_record(1, 0, 0)));
        let before = root.entity_items();
        let subscriber = root.subscribe();

        root.set_overlay(root.overlay_state());

        let changes = root.drain_changes(subscriber);
        assert_eq!(
            count_property_changes(&changes, EntityId(1), ViewProperty::VisualKey),
            1
        );
        assert_eq!(root.entity_items(), before);
    }

    #[test]
    fn removed_entity_is_unreachable_and_silent() {
        let mut root = RootViewModel::default();
        root.apply_world_event(WorldEvent::EntityAdded(worker_record(1, 0, 0)));
        let subscriber = root.subscribe();

        root.apply_world_event(WorldEvent::EntityRemoved(EntityId(1)));
        assert!(root.entity_view_model(EntityId(1)).is_none());
        assert_eq!(root.live_entity_count(), 0);
        let removal = root.drain_changes(subscriber);
        assert_eq!(removal, vec![ViewChange::EntityRemoved(EntityId(1))]);

        root.set_overlay_mode(OverlayMode::Power);
        let after = root.drain_changes(subscriber);
        assert_eq!(
            count_property_changes(&after, EntityId(1), ViewProperty::VisualKey),
            0
        );
    }

    #[test]
    fn add_then_select_scenario_changes_key_and_fires_notification_first() {
        let mut root = RootViewModel::default();
        root.apply_world_event(WorldEvent::EntityAdded(worker_record(1, 0, 0)));
        let view_model = root.entity_view_model(EntityId(1)).expect("view model");
        assert_eq!(view_model.lifecycle(), Lifecycle::Live);
        assert_eq!(
            view_model.visual_key(&root.view_context()).as_str(),
            "unit/worker"
        );

        let subscriber = root.subscribe();
        root.select_entity(Some(EntityId(1)));

        let changes = root.drain_changes(subscriber);
        assert_eq!(
            count_property_changes(&changes, EntityId(1), ViewProperty::VisualKey),
            1
        );
        let view_model = root.entity_view_model(EntityId(1)).expect("view model");
        assert_eq!(
            view_model.visual_key(&root.view_context()).as_str(),
            "unit/worker__selected"
        );
    }

    #[test]
    fn entity_items_are_ordered_by_entity_identity() {
        let mut root = RootViewModel::default();
        root.apply_world_event(WorldEvent::EntityAdded(worker_record(9, 0, 0)));
        root.apply_world_event(WorldEvent::EntityAdded(worker_record(2, 1, 0)));
        root.apply_world_event(WorldEvent::EntityAdded(worker_record(5, 2, 0)));

        let items = root.entity_items();
        let xs: Vec<u32> = items.iter().map(|item| item.grid_position.x).collect();
        assert_eq!(xs, vec![1, 2, 0]);
    }

    #[test]
    fn tile_field_replacement_resizes_the_canvas() {
        let mut root = RootViewModel::default();
        assert_eq!(root.canvas_size_px(), (0, 0));

        let field = TileField::new(3, 2, vec![TileKind::Floor; 6]).expect("field");
        root.set_tile_field(field);

        assert_eq!(root.canvas_size_px(), (192, 128));
        assert_eq!(root.tile_items().len(), 6);
    }

    #[test]
    fn duplicate_add_degrades_to_a_change() {
        let mut root = RootViewModel::default();
        root.apply_world_event(WorldEvent::EntityAdded(worker_record(1, 0, 0)));
        root.apply_world_event(WorldEvent::EntityAdded(worker_record(1, 4, 4)));

        assert_eq!(root.live_entity_count(), 1);
        let view_model = root.entity_view_model(EntityId(1)).expect("view model");
        assert_eq!(view_model.grid_position(), GridPosition { x: 4, y: 4 });
    }

    #[test]
    fn unknown_entity_events_are_ignored_without_panicking() {
        let mut root = RootViewModel::default();
        root.apply_world_event(WorldEvent::EntityChanged(worker_record(42, 0, 0)));
        root.apply_world_event(WorldEvent::EntityRemoved(EntityId(42)));
        assert_eq!(root.live_entity_count(), 0);
    }
}
