//! Read-only interface to the world-model collaborator. The view layer
//! consumes entity records and change events; it never mutates world state.

use thiserror::Error;

use crate::grid::GridPosition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitRole {
    Worker,
    Scout,
    Guard,
}

impl UnitRole {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Worker => "worker",
            Self::Scout => "scout",
            Self::Guard => "guard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureKind {
    Generator,
    Depot,
    Turret,
}

impl StructureKind {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Generator => "generator",
            Self::Depot => "depot",
            Self::Turret => "turret",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HazardKind {
    Fire,
    Breach,
    Radiation,
}

impl HazardKind {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Fire => "fire",
            Self::Breach => "breach",
            Self::Radiation => "radiation",
        }
    }
}

/// Intrinsic entity state as owned by the world model. The kind set is
/// closed; adding a variant means adding a view-model variant with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Unit { role: UnitRole, moving: bool },
    Structure { kind: StructureKind, powered: bool },
    Hazard { kind: HazardKind, severity: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityRecord {
    pub id: EntityId,
    pub position: GridPosition,
    pub kind: EntityKind,
}

/// Change feed from the world model, applied in order on the update thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldEvent {
    EntityAdded(EntityRecord),
    EntityChanged(EntityRecord),
    EntityRemoved(EntityId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileKind {
    Floor,
    Wall,
    Water,
    Void,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TileFieldError {
    #[error("tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
}

/// Row-major tile grid. Tile (0,0) is the top-left corner of the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileField {
    width: u32,
    height: u32,
    tiles: Vec<TileKind>,
}

impl TileField {
    pub fn new(width: u32, height: u32, tiles: Vec<TileKind>) -> Result<Self, TileFieldError> {
        let expected = width as usize * height as usize;
        let actual = tiles.len();
        if expected != actual {
            return Err(TileFieldError::TileCountMismatch { expected, actual });
        }
        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            tiles: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_at(&self, x: u32, y: u32) -> Option<TileKind> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = y as usize * self.width as usize + x as usize;
        self.tiles.get(index).copied()
    }
}
