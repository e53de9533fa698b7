#![allow(dead_code)]

use entity_pool::{EntityID, Pool};

pub const AGENTS_SMALL: usize = 10_000;
pub const AGENTS_MED: usize = 100_000;

#[derive(Clone, Copy)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Copy)]
pub struct Velocity {
    pub dx: f32,
    pub dy: f32,
}

#[derive(Clone, Copy)]
pub struct Flag {
    pub raised: bool,
}

pub fn populate(pool: &mut Pool, count: usize) -> Vec<EntityID> {
    (0..count)
        .map(|i| {
            let entity = pool.create_entity();
            pool.add_components(
                entity,
                (
                    Position {
                        x: i as f32,
                        y: 0.0,
                    },
                    Velocity { dx: 1.0, dy: 1.0 },
                ),
            )
            .unwrap();
            entity
        })
        .collect()
}
