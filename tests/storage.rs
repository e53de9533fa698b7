use entity_pool::engine::component::{
    column_carry, column_copy, component_id_of, component_name_of, make_empty_column,
    set_component_name,
};
use entity_pool::{
    build_signature, Cluster, ClusterError, ClusterView, Column, ColumnError, TypeErasedColumn,
};

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

#[test]
fn column_push_and_indexed_access() {
    let mut column: Column<Health> = Column::new();
    assert_eq!(column.length(), 0);

    column.push_back(Health(1));
    column.push_back(Health(2));

    assert_eq!(column.length(), 2);
    assert_eq!(column.at(0), Some(&Health(1)));
    assert_eq!(column.at(1), Some(&Health(2)));
    assert_eq!(column.at(2), None);

    *column.at_mut(0).unwrap() = Health(9);
    assert_eq!(column.at(0), Some(&Health(9)));
}

#[test]
fn column_swap_checks_bounds() {
    let mut column: Column<u64> = Column::new();
    column.push_back(10);
    column.push_back(20);

    TypeErasedColumn::swap(&mut column, 0, 1).unwrap();
    assert_eq!(column.at(0), Some(&20));
    assert_eq!(column.at(1), Some(&10));

    let error = TypeErasedColumn::swap(&mut column, 0, 5).unwrap_err();
    assert!(matches!(error, ColumnError::Position(_)));
}

#[test]
fn column_copy_is_deep() {
    let mut column: Column<Health> = Column::new();
    column.push_back(Health(1));
    column.push_back(Health(2));

    let copy = TypeErasedColumn::copy(&column);
    let copied = copy
        .as_any()
        .downcast_ref::<Column<Health>>()
        .expect("copy keeps the element type");

    assert_eq!(copied.length(), 2);
    assert_eq!(copied.at(0), Some(&Health(1)));

    // Mutating the original must not show through the copy.
    *column.at_mut(0).unwrap() = Health(99);
    assert_eq!(copied.at(0), Some(&Health(1)));
}

#[test]
fn registry_creates_empty_columns_by_id() {
    let id = component_id_of::<Position>();
    let column = make_empty_column(id);

    assert_eq!(column.length(), 0);
    assert!(column.element_type_name().contains("Position"));
}

#[test]
fn column_carry_moves_one_row() {
    let id = component_id_of::<Health>();
    let mut source = make_empty_column(id);
    let mut destination = make_empty_column(id);

    source
        .as_any_mut()
        .downcast_mut::<Column<Health>>()
        .unwrap()
        .push_back(Health(7));

    column_carry(id, 0, source.as_mut(), destination.as_mut()).unwrap();

    let destination = destination
        .as_any()
        .downcast_ref::<Column<Health>>()
        .unwrap();
    assert_eq!(destination.length(), 1);
    assert_eq!(destination.at(0), Some(&Health(7)));
}

#[test]
fn column_copy_leaves_source_untouched() {
    let id = component_id_of::<Health>();
    let mut source = make_empty_column(id);
    let mut destination = make_empty_column(id);

    source
        .as_any_mut()
        .downcast_mut::<Column<Health>>()
        .unwrap()
        .push_back(Health(3));

    column_copy(id, 0, source.as_ref(), destination.as_mut()).unwrap();

    assert_eq!(source.length(), 1);
    assert_eq!(destination.length(), 1);
}

#[test]
fn column_ops_reject_mismatched_columns() {
    let health_id = component_id_of::<Health>();
    let position_id = component_id_of::<Position>();

    let mut source = make_empty_column(health_id);
    source
        .as_any_mut()
        .downcast_mut::<Column<Health>>()
        .unwrap()
        .push_back(Health(1));

    // Destination stores a different element type than the operation id.
    let mut destination = make_empty_column(position_id);

    let error = column_carry(health_id, 0, source.as_mut(), destination.as_mut()).unwrap_err();
    assert!(matches!(error, ColumnError::TypeMismatch(_)));
}

#[test]
fn component_rename_is_diagnostics_only() {
    let id = component_id_of::<Velocity>();
    assert!(component_name_of(id).unwrap().contains("Velocity"));

    set_component_name(id, "velocity");
    assert_eq!(component_name_of(id).as_deref(), Some("velocity"));

    // Lookups stay id-based.
    assert_eq!(component_id_of::<Velocity>(), id);
}

fn two_component_cluster() -> Cluster {
    let signature = build_signature(&[
        component_id_of::<Position>(),
        component_id_of::<Velocity>(),
    ]);
    Cluster::new(1, signature)
}

#[test]
fn cluster_push_and_typed_access() {
    let mut cluster = two_component_cluster();

    cluster.push_entity(10);
    cluster.push_component(Position { x: 1.0, y: 2.0 }).unwrap();
    cluster.push_component(Velocity { dx: 0.5, dy: 0.0 }).unwrap();

    assert_eq!(cluster.size(), 1);
    assert_eq!(cluster.entities(), &[10]);
    assert_eq!(cluster.index_of(10), Some(0));
    assert_eq!(
        cluster.get_component::<Position>(10).unwrap(),
        &Position { x: 1.0, y: 2.0 }
    );

    cluster
        .set_component(10, Velocity { dx: 9.0, dy: 9.0 })
        .unwrap();
    assert_eq!(
        cluster.get_component::<Velocity>(10).unwrap(),
        &Velocity { dx: 9.0, dy: 9.0 }
    );
}

#[test]
fn cluster_swap_remove_repairs_bookkeeping() {
    let signature = build_signature(&[component_id_of::<Health>()]);
    let mut cluster = Cluster::new(1, signature);

    for entity in 1..=3u64 {
        cluster.push_entity(entity);
        cluster.push_component(Health(entity as u32)).unwrap();
    }

    cluster.remove_entity(2).unwrap();

    assert_eq!(cluster.size(), 2);
    assert!(!cluster.contains(2));

    // Every remaining entity's recorded row must match its actual row.
    for (row, &entity) in cluster.entities().iter().enumerate() {
        assert_eq!(cluster.index_of(entity), Some(row as u32));
        assert_eq!(
            cluster.get_component::<Health>(entity).unwrap(),
            &Health(entity as u32)
        );
    }
}

#[test]
fn cluster_removes_last_entity_without_swap() {
    let signature = build_signature(&[component_id_of::<Health>()]);
    let mut cluster = Cluster::new(1, signature);

    cluster.push_entity(1);
    cluster.push_component(Health(1)).unwrap();
    cluster.push_entity(2);
    cluster.push_component(Health(2)).unwrap();

    cluster.remove_entity(2).unwrap();

    assert_eq!(cluster.size(), 1);
    assert_eq!(cluster.get_component::<Health>(1).unwrap(), &Health(1));
}

#[test]
fn cluster_rejects_unknown_entities() {
    let mut cluster = two_component_cluster();
    let error = cluster.remove_entity(42).unwrap_err();
    assert!(matches!(error, ClusterError::UnknownEntity(_)));
}

#[test]
fn cluster_rejects_columns_outside_signature() {
    let signature = build_signature(&[component_id_of::<Position>()]);
    let mut cluster = Cluster::new(1, signature);

    let error = cluster.push_component(Health(1)).unwrap_err();
    assert!(matches!(error, ClusterError::MissingColumn(_)));
}

#[test]
fn carry_entity_moves_shared_columns() {
    let mut source = two_component_cluster();
    let narrow = build_signature(&[component_id_of::<Position>()]);
    let mut destination = Cluster::new(2, narrow);

    source.push_entity(5);
    source.push_component(Position { x: 3.0, y: 4.0 }).unwrap();
    source.push_component(Velocity { dx: 1.0, dy: 1.0 }).unwrap();

    let row = source.carry_entity(&mut destination, 5).unwrap();
    source.remove_entity(5).unwrap();

    assert_eq!(row, 0);
    assert_eq!(source.size(), 0);
    assert_eq!(destination.size(), 1);
    assert_eq!(
        destination.get_component::<Position>(5).unwrap(),
        &Position { x: 3.0, y: 4.0 }
    );
}

#[test]
fn copy_entity_duplicates_without_mutating_source() {
    let signature = build_signature(&[component_id_of::<Health>()]);
    let mut source = Cluster::new(1, signature);
    let mut destination = Cluster::new(2, signature);

    source.push_entity(1);
    source.push_component(Health(11)).unwrap();
    source.push_entity(2);
    source.push_component(Health(22)).unwrap();

    let row = source.copy_entity(&mut destination, 7, 0).unwrap();

    assert_eq!(row, 0);
    assert_eq!(source.size(), 2);
    assert_eq!(source.get_component::<Health>(1).unwrap(), &Health(11));
    assert_eq!(destination.get_component::<Health>(7).unwrap(), &Health(11));
}

#[test]
fn cluster_view_iterates_rows() {
    let mut cluster = two_component_cluster();
    for entity in 1..=4u64 {
        cluster.push_entity(entity);
        cluster
            .push_component(Position {
                x: entity as f32,
                y: 0.0,
            })
            .unwrap();
        cluster
            .push_component(Velocity { dx: 0.0, dy: 1.0 })
            .unwrap();
    }

    let mut seen = Vec::new();
    for (entity, position) in ClusterView::<(Position,)>::new(&mut cluster).unwrap() {
        assert_eq!(position.x, entity as f32);
        seen.push(entity);
    }
    assert_eq!(seen.len(), 4);
}

#[test]
fn cluster_view_requires_every_column() {
    let signature = build_signature(&[component_id_of::<Position>()]);
    let mut cluster = Cluster::new(1, signature);

    let error = ClusterView::<(Velocity,)>::new(&mut cluster).unwrap_err();
    assert!(matches!(error, ClusterError::MissingColumn(_)));
}
