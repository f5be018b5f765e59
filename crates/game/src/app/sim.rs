//! Scripted stand-in for the world-model collaborator. It owns the entity
//! set and tile field, advances deterministically, and reports mutations as
//! the same event feed a real simulation would publish.

use std::collections::HashMap;

use gridview::{
    EntityId, EntityKind, EntityRecord, GridPosition, HazardKind, StructureKind, TileField,
    TileFieldError, TileKind, UnitRole, WorldEvent,
};

pub(crate) const FIELD_WIDTH: u32 = 12;
pub(crate) const FIELD_HEIGHT: u32 = 8;

const WORKER_ID: EntityId = EntityId(1);
const SCOUT_ID: EntityId = EntityId(2);
const GUARD_ID: EntityId = EntityId(3);
const GENERATOR_ID: EntityId = EntityId(4);
const DEPOT_ID: EntityId = EntityId(5);
const FIRE_ID: EntityId = EntityId(6);
const BREACH_ID: EntityId = EntityId(7);

const WORKER_ROW: u32 = 3;
const WORKER_MIN_X: u32 = 1;
const WORKER_MAX_X: u32 = 10;
const GENERATOR_POWER_PERIOD_TICKS: u64 = 12;
const BREACH_CYCLE_TICKS: u64 = 16;
const BREACH_OPEN_TICKS: u64 = 8;

pub(crate) struct SimWorld {
    tick: u64,
    current: HashMap<EntityId, EntityRecord>,
}

impl SimWorld {
    pub(crate) fn new() -> Self {
        let current = records_at(0)
            .into_iter()
            .map(|record| (record.id, record))
            .collect();
        Self { tick: 0, current }
    }

    pub(crate) fn tile_field(&self) -> Result<TileField, TileFieldError> {
        let mut tiles = vec![TileKind::Floor; (FIELD_WIDTH * FIELD_HEIGHT) as usize];
        for x in 0..FIELD_WIDTH {
            tiles[tile_index(x, 0)] = TileKind::Wall;
            tiles[tile_index(x, FIELD_HEIGHT - 1)] = TileKind::Wall;
        }
        for y in 0..FIELD_HEIGHT {
            tiles[tile_index(0, y)] = TileKind::Wall;
            tiles[tile_index(FIELD_WIDTH - 1, y)] = TileKind::Wall;
        }
        for (x, y) in [(3, 5), (4, 5), (3, 6), (4, 6)] {
            tiles[tile_index(x, y)] = TileKind::Water;
        }
        TileField::new(FIELD_WIDTH, FIELD_HEIGHT, tiles)
    }

    pub(crate) fn initial_events(&self) -> Vec<WorldEvent> {
        let mut records: Vec<&EntityRecord> = self.current.values().collect();
        records.sort_unstable_by_key(|record| record.id);
        records
            .into_iter()
            .map(|record| WorldEvent::EntityAdded(*record))
            .collect()
    }

    pub(crate) fn tick(&mut self) -> Vec<WorldEvent> {
        self.tick += 1;
        let next: HashMap<EntityId, EntityRecord> = records_at(self.tick)
            .into_iter()
            .map(|record| (record.id, record))
            .collect();

        let mut ids: Vec<EntityId> = self.current.keys().chain(next.keys()).copied().collect();
        ids.sort_unstable();
        ids.dedup();

        let mut events = Vec::new();
        for id in ids {
            match (self.current.get(&id), next.get(&id)) {
                (None, Some(record)) => events.push(WorldEvent::EntityAdded(*record)),
                (Some(_), None) => events.push(WorldEvent::EntityRemoved(id)),
                (Some(before), Some(after)) if before != after => {
                    events.push(WorldEvent::EntityChanged(*after));
                }
                _ => {}
            }
        }
        self.current = next;
        events
    }

    pub(crate) fn unit_ids(&self) -> Vec<EntityId> {
        vec![WORKER_ID, SCOUT_ID, GUARD_ID]
    }

    pub(crate) fn field_size(&self) -> (u32, u32) {
        (FIELD_WIDTH, FIELD_HEIGHT)
    }
}

fn tile_index(x: u32, y: u32) -> usize {
    (y * FIELD_WIDTH + x) as usize
}

fn records_at(tick: u64) -> Vec<EntityRecord> {
    let mut records = vec![
        EntityRecord {
            id: WORKER_ID,
            position: worker_position(tick),
            kind: EntityKind::Unit {
                role: UnitRole::Worker,
                moving: true,
            },
        },
        EntityRecord {
            id: SCOUT_ID,
            position: scout_position(tick),
            kind: EntityKind::Unit {
                role: UnitRole::Scout,
                moving: true,
            },
        },
        EntityRecord {
            id: GUARD_ID,
            position: GridPosition { x: 6, y: 4 },
            kind: EntityKind::Unit {
                role: UnitRole::Guard,
                moving: false,
            },
        },
        EntityRecord {
            id: GENERATOR_ID,
            position: GridPosition { x: 2, y: 2 },
            kind: EntityKind::Structure {
                kind: StructureKind::Generator,
                powered: (tick / GENERATOR_POWER_PERIOD_TICKS) % 2 == 0,
            },
        },
        EntityRecord {
            id: DEPOT_ID,
            position: GridPosition { x: 9, y: 2 },
            kind: EntityKind::Structure {
                kind: StructureKind::Depot,
                powered: true,
            },
        },
        EntityRecord {
            id: FIRE_ID,
            position: GridPosition { x: 8, y: 5 },
            kind: EntityKind::Hazard {
                kind: HazardKind::Fire,
                severity: (tick % 4) as u8,
            },
        },
    ];
    if tick % BREACH_CYCLE_TICKS < BREACH_OPEN_TICKS {
        records.push(EntityRecord {
            id: BREACH_ID,
            position: GridPosition { x: 5, y: 1 },
            kind: EntityKind::Hazard {
                kind: HazardKind::Breach,
                severity: 1,
            },
        });
    }
    records
}

fn worker_position(tick: u64) -> GridPosition {
    let span = (WORKER_MAX_X - WORKER_MIN_X) as u64;
    let phase = tick % (2 * span);
    let offset = if phase <= span { phase } else { 2 * span - phase };
    GridPosition {
        x: WORKER_MIN_X + offset as u32,
        y: WORKER_ROW,
    }
}

/// Clockwise walk around the inner ring of the field, one tile per tick.
fn scout_position(tick: u64) -> GridPosition {
    let ring_width = FIELD_WIDTH as u64 - 2;
    let ring_height = FIELD_HEIGHT as u64 - 2;
    let perimeter = 2 * (ring_width + ring_height) - 4;
    let phase = tick % perimeter;

    let (x, y) = if phase < ring_width {
        (1 + phase, 1)
    } else if phase < ring_width + ring_height - 1 {
        (ring_width, phase - ring_width + 2)
    } else if phase < 2 * ring_width + ring_height - 2 {
        (ring_width - 1 - (phase + 1 - ring_width - ring_height), ring_height)
    } else {
        (1, ring_height - 1 - (phase + 2 - 2 * ring_width - ring_height))
    };
    GridPosition {
        x: x as u32,
        y: y as u32,
    }
}
