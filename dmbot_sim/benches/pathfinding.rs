// Benchmarks for A* on the open grid and through a placed map.
//
// Run with: cargo bench -p dmbot_sim --bench pathfinding

use criterion::{Criterion, criterion_group, criterion_main};
use dmbot_sim::components::MapPhysicsComponent;
use dmbot_sim::config::MapConfig;
use dmbot_sim::entity::Entity;
use dmbot_sim::factory::Factory;
use dmbot_sim::map::MapEntity;
use dmbot_sim::pathfinding::astar_search;
use dmbot_sim::types::{Coordinate, Layer};
use std::collections::BTreeSet;
use std::hint::black_box;

fn bench_open_grid(c: &mut Criterion) {
    let blocked = BTreeSet::new();
    c.bench_function("astar_open_grid_40", |b| {
        b.iter(|| {
            black_box(astar_search(
                Coordinate::new(0, 0),
                black_box(Coordinate::new(40, 17)),
                &blocked,
            ))
        });
    });
}

fn bench_around_wall(c: &mut Criterion) {
    // A long wall with the goal straight behind it.
    let blocked: BTreeSet<Coordinate> = (-20..=20).map(|y| Coordinate::new(10, y)).collect();
    c.bench_function("astar_around_wall", |b| {
        b.iter(|| {
            black_box(astar_search(
                Coordinate::new(0, 0),
                black_box(Coordinate::new(20, 0)),
                &blocked,
            ))
        });
    });
}

fn bench_map_move(c: &mut Criterion) {
    let mut factory = Factory::default();
    let mut map = MapEntity::new(&mut factory, "bench", MapConfig::default());
    for y in -15..=15 {
        if y == 3 {
            continue;
        }
        let mut wall = Entity::new("wall", "Item");
        wall.add_component(MapPhysicsComponent::blocking(Layer::Main));
        let uid = factory.insert(wall);
        if map.add_object(&mut factory, uid, Coordinate::new(8, y)).is_err() {
            return;
        }
    }
    let mover = factory.insert(Entity::new("mob", "Item"));
    if map.add_object(&mut factory, mover, Coordinate::new(0, 0)).is_err() {
        return;
    }

    c.bench_function("map_move_through_gap", |b| {
        b.iter(|| black_box(map.move_object(&factory, mover, Coordinate::new(16, 0))));
    });
}

criterion_group!(benches, bench_open_grid, bench_around_wall, bench_map_move);
criterion_main!(benches);
