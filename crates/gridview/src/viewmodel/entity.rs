use tracing::error;

use crate::grid::GridPosition;
use crate::notify::{ChangeBus, ViewChange, ViewProperty};
use crate::overlay::{OverlayMode, OverlayState};
use crate::visual_key::VisualKey;
use crate::world::{EntityId, EntityKind, EntityRecord, HazardKind, StructureKind, UnitRole};

use super::{Lifecycle, PositionedVisualItem, ViewContext};

/// Capability shared by everything the entity layer can draw. Derived
/// properties are pure functions of the stored entity snapshot and the
/// passed context; there is no hidden cache to invalidate.
pub trait RenderableEntity {
    fn grid_position(&self) -> GridPosition;
    fn visual_key(&self, context: &ViewContext) -> VisualKey;
    fn tooltip(&self, context: &ViewContext) -> String;
}

fn apply_overlay_variants(key: VisualKey, id: EntityId, overlay: &OverlayState) -> VisualKey {
    let mut key = key;
    if let Some(token) = overlay.mode.variant_token() {
        key = key.with_variant(token);
    }
    if overlay.selected == Some(id) {
        key = key.with_variant("selected");
    }
    key
}

fn selected_suffix(id: EntityId, overlay: &OverlayState) -> &'static str {
    if overlay.selected == Some(id) {
        " [selected]"
    } else {
        ""
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitViewModel {
    id: EntityId,
    position: GridPosition,
    role: UnitRole,
    moving: bool,
}

impl RenderableEntity for UnitViewModel {
    fn grid_position(&self) -> GridPosition {
        self.position
    }

    fn visual_key(&self, context: &ViewContext) -> VisualKey {
        let mut key = VisualKey::base(match self.role {
            UnitRole::Worker => "unit/worker",
            UnitRole::Scout => "unit/scout",
            UnitRole::Guard => "unit/guard",
        });
        if self.moving {
            key = key.with_variant("moving");
        }
        apply_overlay_variants(key, self.id, &context.overlay)
    }

    fn tooltip(&self, context: &ViewContext) -> String {
        let motion = if self.moving { ", moving" } else { "" };
        format!(
            "{} at ({}, {}){}{}",
            self.role.display_name(),
            self.position.x,
            self.position.y,
            motion,
            selected_suffix(self.id, &context.overlay),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructureViewModel {
    id: EntityId,
    position: GridPosition,
    kind: StructureKind,
    powered: bool,
}

impl RenderableEntity for StructureViewModel {
    fn grid_position(&self) -> GridPosition {
        self.position
    }

    fn visual_key(&self, context: &ViewContext) -> VisualKey {
        let mut key = VisualKey::base(match self.kind {
            StructureKind::Generator => "structure/generator",
            StructureKind::Depot => "structure/depot",
            StructureKind::Turret => "structure/turret",
        });
        if !self.powered {
            key = key.with_variant("unpowered");
        }
        apply_overlay_variants(key, self.id, &context.overlay)
    }

    fn tooltip(&self, context: &ViewContext) -> String {
        let power_note = match (context.overlay.mode, self.powered) {
            (OverlayMode::Power, true) => ", power: on",
            (OverlayMode::Power, false) => ", power: off",
            _ => "",
        };
        format!(
            "{} at ({}, {}){}{}",
            self.kind.display_name(),
            self.position.x,
            self.position.y,
            power_note,
            selected_suffix(self.id, &context.overlay),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HazardViewModel {
    id: EntityId,
    position: GridPosition,
    kind: HazardKind,
    severity: u8,
}

const HAZARD_SEVERITY_BUCKET_MAX: u8 = 3;

impl HazardViewModel {
    fn severity_bucket(&self) -> u8 {
        self.severity.min(HAZARD_SEVERITY_BUCKET_MAX)
    }
}

impl RenderableEntity for HazardViewModel {
    fn grid_position(&self) -> GridPosition {
        self.position
    }

    fn visual_key(&self, context: &ViewContext) -> VisualKey {
        let key = VisualKey::base(match self.kind {
            HazardKind::Fire => "hazard/fire",
            HazardKind::Breach => "hazard/breach",
            HazardKind::Radiation => "hazard/radiation",
        });
        let key = match self.severity_bucket() {
            0 => key.with_variant("sev0"),
            1 => key.with_variant("sev1"),
            2 => key.with_variant("sev2"),
            _ => key.with_variant("sev3"),
        };
        apply_overlay_variants(key, self.id, &context.overlay)
    }

    fn tooltip(&self, context: &ViewContext) -> String {
        let heat_note = if context.overlay.mode == OverlayMode::Thermal {
            format!(", heat {}", self.severity)
        } else {
            String::new()
        };
        format!(
            "{} at ({}, {}){}{}",
            self.kind.display_name(),
            self.position.x,
            self.position.y,
            heat_note,
            selected_suffix(self.id, &context.overlay),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntityVariant {
    Unit(UnitViewModel),
    Structure(StructureViewModel),
    Hazard(HazardViewModel),
}

/// One live view model per world entity. Holds a snapshot of the entity
/// record, so reads racing a removal see the last-known-good state rather
/// than torn world data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityViewModel {
    variant: EntityVariant,
    lifecycle: Lifecycle,
}

impl EntityViewModel {
    pub fn new(record: &EntityRecord) -> Self {
        Self {
            variant: variant_from_record(record),
            lifecycle: Lifecycle::Created,
        }
    }

    pub fn id(&self) -> EntityId {
        match &self.variant {
            EntityVariant::Unit(unit) => unit.id,
            EntityVariant::Structure(structure) => structure.id,
            EntityVariant::Hazard(hazard) => hazard.id,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub(crate) fn mark_live(&mut self) {
        debug_assert_eq!(self.lifecycle, Lifecycle::Created);
        self.lifecycle = Lifecycle::Live;
    }

    /// Entering `Disposed` is terminal; the view model must publish nothing
    /// afterwards.
    pub(crate) fn dispose(&mut self) {
        self.lifecycle = Lifecycle::Disposed;
    }

    pub(crate) fn update_entity(&mut self, record: &EntityRecord, bus: &mut ChangeBus) {
        if !self.check_not_disposed("update_entity") {
            return;
        }
        debug_assert_eq!(self.id(), record.id);
        let moved = self.grid_position() != record.position;
        self.variant = variant_from_record(record);

        if moved {
            bus.publish(ViewChange::EntityProperty {
                id: record.id,
                property: ViewProperty::GridPosition,
            });
        }
        bus.publish(ViewChange::EntityProperty {
            id: record.id,
            property: ViewProperty::VisualKey,
        });
        bus.publish(ViewChange::EntityProperty {
            id: record.id,
            property: ViewProperty::TooltipText,
        });
    }

    /// Recomputes nothing eagerly; announces that the overlay-dependent
    /// properties must be re-pulled. Exactly one notification per property.
    pub(crate) fn on_overlay_changed(&mut self, bus: &mut ChangeBus) {
        if !self.check_not_disposed("on_overlay_changed") {
            return;
        }
        bus.publish(ViewChange::EntityProperty {
            id: self.id(),
            property: ViewProperty::VisualKey,
        });
        bus.publish(ViewChange::EntityProperty {
            id: self.id(),
            property: ViewProperty::TooltipText,
        });
    }

    pub fn item(&self, context: &ViewContext) -> PositionedVisualItem {
        PositionedVisualItem {
            grid_position: self.grid_position(),
            visual_key: self.visual_key(context),
            tooltip: self.tooltip(context),
        }
    }

    fn check_not_disposed(&self, operation: &'static str) -> bool {
        if self.lifecycle == Lifecycle::Disposed {
            debug_assert!(false, "view model used after dispose: {operation}");
            error!(
                entity_id = self.id().0,
                operation, "view_model_used_after_dispose"
            );
            return false;
        }
        true
    }
}

fn variant_from_record(record: &EntityRecord) -> EntityVariant {
    match record.kind {
        EntityKind::Unit { role, moving } => EntityVariant::Unit(UnitViewModel {
            id: record.id,
            position: record.position,
            role,
            moving,
        }),
        EntityKind::Structure { kind, powered } => EntityVariant::Structure(StructureViewModel {
            id: record.id,
            position: record.position,
            kind,
            powered,
        }),
        EntityKind::Hazard { kind, severity } => EntityVariant::Hazard(HazardViewModel {
            id: record.id,
            position: record.position,
            kind,
            severity,
        }),
    }
}

impl RenderableEntity for EntityViewModel {
    fn grid_position(&self) -> GridPosition {
        match &self.variant {
            EntityVariant::Unit(unit) => unit.grid_position(),
            EntityVariant::Structure(structure) => structure.grid_position(),
            EntityVariant::Hazard(hazard) => hazard.grid_position(),
        }
    }

    fn visual_key(&self, context: &ViewContext) -> VisualKey {
        match &self.variant {
            EntityVariant::Unit(unit) => unit.visual_key(context),
            EntityVariant::Structure(structure) => structure.visual_key(context),
            EntityVariant::Hazard(hazard) => hazard.visual_key(context),
        }
    }

    fn tooltip(&self, context: &ViewContext) -> String {
        match &self.variant {
            EntityVariant::Unit(unit) => unit.tooltip(context),
            EntityVariant::Structure(structure) => structure.tooltip(context),
            EntityVariant::Hazard(hazard) => hazard.tooltip(context),
        }
    }
}
