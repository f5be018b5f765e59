use tracing::debug;

use crate::grid::GridPosition;
use crate::notify::ChangeBus;
use crate::viewmodel::{EntityViewModel, TileFieldViewModel};
use crate::world::EntityId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverlayMode {
    #[default]
    None,
    Thermal,
    Power,
}

impl OverlayMode {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Thermal => "thermal",
            Self::Power => "power",
        }
    }

    pub(crate) fn variant_token(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Thermal => Some("thermal"),
            Self::Power => Some("power"),
        }
    }
}

/// Presentation-only state layered over intrinsic entity state. Replaced
/// wholesale on every mutation; never observable half-applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlayState {
    pub mode: OverlayMode,
    pub selected: Option<EntityId>,
    pub highlighted: Option<GridPosition>,
}

/// Single point of truth for the active overlay state, plus the fan-out
/// that re-announces overlay-dependent properties on every change.
#[derive(Debug, Default)]
pub struct OverlayNotifier {
    state: OverlayState,
    revision: u64,
}

impl OverlayNotifier {
    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replaces the overlay state, then notifies every live view model in
    /// the same logical step. Every view model is visited unconditionally,
    /// even when the new state cannot affect it, and re-setting an identical
    /// state still notifies; filtering is traded away for a fan-out that is
    /// trivially atomic on the update thread.
    pub fn set_overlay<'a>(
        &mut self,
        new_state: OverlayState,
        entities: impl Iterator<Item = &'a mut EntityViewModel>,
        tile_field: &mut TileFieldViewModel,
        bus: &mut ChangeBus,
    ) {
        self.state = new_state;
        self.revision = self.revision.wrapping_add(1);

        let mut notified_entities = 0usize;
        for view_model in entities {
            view_model.on_overlay_changed(bus);
            notified_entities += 1;
        }
        tile_field.on_overlay_changed(bus);

        debug!(
            revision = self.revision,
            notified_entities,
            mode = new_state.mode.display_name(),
            "overlay_fan_out"
        );
    }
}
