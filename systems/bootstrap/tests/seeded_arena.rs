use std::time::Duration;

use boss_arena_core::{Command, Event, Position, Timestamp};
use boss_arena_system_bootstrap::{ArenaSettings, Bootstrap};
use boss_arena_world::{apply, query, Terrain, TileLayer, World};

fn build(seed: u64) -> World {
    let terrain = Terrain::new(30, 30, 16, 16, vec![TileLayer::new("ground", vec![1; 900])])
        .expect("valid terrain");
    Bootstrap.build(
        terrain,
        &ArenaSettings {
            seed: Some(seed),
            ..ArenaSettings::default()
        },
        Timestamp::ZERO,
    )
}

fn boss_path(world: &mut World) -> Vec<Position> {
    let mut events = Vec::new();
    for second in 1..=12u64 {
        apply(
            world,
            Command::UpdateBoss {
                now: Timestamp::from_offset(Duration::from_secs(second)),
            },
            &mut events,
        );
    }
    events
        .into_iter()
        .filter_map(|event| match event {
            Event::BossMoved { to, .. } => Some(to),
            _ => None,
        })
        .collect()
}

#[test]
fn same_seed_walks_the_same_path() {
    let first = boss_path(&mut build(7));
    let second = boss_path(&mut build(7));
    assert_eq!(first.len(), 12);
    assert_eq!(first, second);
}

#[test]
fn boss_stays_inside_the_map() {
    let mut world = build(99);
    let path = boss_path(&mut world);
    let bounds = query::terrain(&world).bounds();
    assert!(path.iter().all(|position| {
        (0..=bounds.width()).contains(&position.x()) && (0..=bounds.height()).contains(&position.y())
    }));
}
