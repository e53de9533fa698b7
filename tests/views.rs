use std::collections::HashSet;

use entity_pool::{build_signature, component_id_of, EntityID, Pool, PoolView, Signature};

#[derive(Clone, Copy, Debug, PartialEq)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Velocity {
    dx: f32,
    dy: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Health(u32);

fn spawn_pair(pool: &mut Pool, x: f32) -> EntityID {
    let entity = pool.create_entity();
    pool.add_components(
        entity,
        (Position { x, y: 0.0 }, Velocity { dx: 1.0, dy: 0.0 }),
    )
    .unwrap();
    entity
}

#[test]
fn view_sweeps_every_matching_archetype_exactly_once() {
    let mut pool = Pool::new();

    let entities: Vec<EntityID> = (0..1000).map(|i| spawn_pair(&mut pool, i as f32)).collect();

    // Split one entity off into a second archetype.
    pool.remove_component::<Velocity>(entities[500]).unwrap();

    let mut seen = HashSet::new();
    let mut count = 0usize;
    for (entity, position) in pool.view::<(Position,)>() {
        assert!(seen.insert(entity), "entity {entity} visited twice");
        assert_eq!(position.y, 0.0);
        count += 1;
    }

    assert_eq!(count, 1000);
    for entity in &entities {
        assert!(seen.contains(entity));
    }
}

#[test]
fn view_values_track_their_entities() {
    let mut pool = Pool::new();
    let entities: Vec<EntityID> = (0..64).map(|i| spawn_pair(&mut pool, i as f32)).collect();

    for (entity, position, velocity) in pool.view::<(Position, Velocity)>() {
        let rank = entities.iter().position(|&e| e == entity).unwrap();
        assert_eq!(position.x, rank as f32);
        assert_eq!(velocity.dx, 1.0);
    }
}

#[test]
fn view_yields_mutable_references() {
    let mut pool = Pool::new();
    let entities: Vec<EntityID> = (0..16).map(|i| spawn_pair(&mut pool, i as f32)).collect();

    for (_, position, velocity) in pool.view::<(Position, Velocity)>() {
        position.x += 100.0;
        velocity.dx = 2.0;
    }

    for (rank, entity) in entities.iter().enumerate() {
        assert_eq!(
            pool.get_component::<Position>(*entity).unwrap().x,
            rank as f32 + 100.0
        );
        assert_eq!(pool.get_component::<Velocity>(*entity).unwrap().dx, 2.0);
    }
}

#[test]
fn view_exclusion_filters_archetypes() {
    let mut pool = Pool::new();

    for i in 0..10 {
        spawn_pair(&mut pool, i as f32);
    }
    let mut bare = Vec::new();
    for i in 0..5 {
        let entity = pool.create_entity();
        pool.add_component(entity, Position { x: i as f32, y: 1.0 })
            .unwrap();
        bare.push(entity);
    }

    let without = build_signature(&[component_id_of::<Velocity>()]);
    let visited: Vec<EntityID> = pool
        .view_excluding::<(Position,)>(without)
        .map(|(entity, _)| entity)
        .collect();

    assert_eq!(visited.len(), 5);
    for entity in bare {
        assert!(visited.contains(&entity));
    }
}

#[test]
fn view_over_no_matches_is_empty() {
    let mut pool = Pool::new();
    assert_eq!(pool.view::<(Health,)>().count(), 0);

    // A populated pool without the requested type behaves the same.
    spawn_pair(&mut pool, 0.0);
    assert_eq!(pool.view::<(Health,)>().count(), 0);
}

#[test]
fn view_restarts_by_construction() {
    let mut pool = Pool::new();
    for i in 0..8 {
        spawn_pair(&mut pool, i as f32);
    }

    let first_pass = pool.view::<(Position,)>().count();
    let second_pass = pool.view::<(Position,)>().count();
    assert_eq!(first_pass, 8);
    assert_eq!(second_pass, 8);
}

#[test]
fn pool_view_constructor_accepts_exclusions() {
    let mut pool = Pool::new();
    spawn_pair(&mut pool, 0.0);

    let entity = pool.create_entity();
    pool.add_components(entity, (Position { x: 9.0, y: 9.0 }, Health(1)))
        .unwrap();

    let without = build_signature(&[component_id_of::<Health>()]);
    let mut view = PoolView::<(Position, Velocity)>::new(&mut pool, without);
    let (found, position, _) = view.next().unwrap();
    assert_ne!(found, entity);
    assert_eq!(position.y, 0.0);
    assert!(view.next().is_none());
}

#[test]
fn view_spans_multiple_archetypes() {
    let mut pool = Pool::new();

    for i in 0..6 {
        spawn_pair(&mut pool, i as f32);
    }
    for i in 0..4 {
        let entity = pool.create_entity();
        pool.add_components(
            entity,
            (
                Position {
                    x: 100.0 + i as f32,
                    y: 0.0,
                },
                Velocity { dx: 1.0, dy: 0.0 },
                Health(i),
            ),
        )
        .unwrap();
    }

    assert_eq!(pool.view::<(Position, Velocity)>().count(), 10);
    assert_eq!(pool.view::<(Position, Velocity, Health)>().count(), 4);

    let empty = Signature::default();
    let with = build_signature(&[
        component_id_of::<Position>(),
        component_id_of::<Velocity>(),
    ]);
    assert_eq!(pool.matching_clusters(&with, &empty).len(), 2);
}
