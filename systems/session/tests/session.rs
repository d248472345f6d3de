use std::collections::{HashMap, VecDeque};

use dungeon_crawl_core::{CellCoord, Direction, Event, StatusMessage, Tile, TileGrid};
use dungeon_crawl_system_generation::GenerationError;
use dungeon_crawl_system_placement::PlacementError;
use dungeon_crawl_system_session::{Session, SessionConfig, SessionError};
use dungeon_crawl_world::query;

fn seeded(seed: u64) -> Session {
    Session::new(SessionConfig {
        seed: Some(seed),
        ..SessionConfig::default()
    })
    .expect("default configuration is valid")
}

/// Breadth-first route over walkable tiles, returned as the directions to travel.
fn route(grid: &TileGrid, from: CellCoord, to: CellCoord) -> Vec<Direction> {
    let mut came_from: HashMap<CellCoord, (CellCoord, Direction)> = HashMap::new();
    let mut queue = VecDeque::from([from]);
    while let Some(cell) = queue.pop_front() {
        if cell == to {
            break;
        }
        for direction in Direction::ALL {
            let Some(next) = cell.step(direction) else {
                continue;
            };
            if next == from || came_from.contains_key(&next) {
                continue;
            }
            if grid.tile(next).is_some_and(Tile::is_walkable) {
                let _ = came_from.insert(next, (cell, direction));
                queue.push_back(next);
            }
        }
    }

    let mut directions = Vec::new();
    let mut cursor = to;
    while cursor != from {
        let (previous, direction) = came_from[&cursor];
        directions.push(direction);
        cursor = previous;
    }
    directions.reverse();
    directions
}

fn walk(session: &mut Session, to: CellCoord) -> Vec<Event> {
    let from = query::player(session.world());
    let directions = route(query::grid(session.world()), from, to);
    let mut events = Vec::new();
    for direction in directions {
        events.extend(session.handle_move_intent(direction));
    }
    assert_eq!(query::player(session.world()), to);
    events
}

#[test]
fn first_round_uses_default_configuration() {
    let mut session = seeded(1);
    let events = session.start_new_round().expect("round starts");

    assert_eq!(
        events,
        vec![Event::RoundStarted {
            columns: 40,
            rows: 30,
            enemies: 5
        }]
    );
    let world = session.world();
    let grid = query::grid(world);
    assert_eq!(grid.count(Tile::Floor) + grid.count(Tile::Exit), 600);
    assert_eq!(grid.tile(query::exit(world)), Some(Tile::Exit));
    assert_eq!(query::enemy_count(world), 5);
    assert_eq!(query::message(world), None);
    assert_eq!(query::round(world), 1);
}

#[test]
fn same_seed_replays_the_same_rounds() {
    let mut first = seeded(0xfeed);
    let mut second = seeded(0xfeed);
    for _ in 0..3 {
        let _ = first.start_new_round().expect("round starts");
        let _ = second.start_new_round().expect("round starts");
        assert_eq!(query::grid(first.world()), query::grid(second.world()));
        assert_eq!(query::player(first.world()), query::player(second.world()));
        assert_eq!(
            query::enemy_view(first.world()).into_vec(),
            query::enemy_view(second.world()).into_vec()
        );
    }
}

#[test]
fn regeneration_discards_the_previous_round() {
    let mut session = seeded(7);
    let _ = session.start_new_round().expect("round starts");
    for direction in Direction::ALL {
        let _ = session.handle_move_intent(direction);
    }
    let previous = query::grid(session.world()).clone();

    let _ = session.start_new_round().expect("round starts");

    let world = session.world();
    assert_eq!(query::round(world), 2);
    assert_eq!(query::moves(world), 0);
    assert_eq!(query::enemy_count(world), 5);
    assert_eq!(query::message(world), None);
    assert_ne!(query::grid(world), &previous);
}

#[test]
fn move_intents_either_move_or_are_blocked() {
    let mut session = seeded(21);
    let _ = session.start_new_round().expect("round starts");

    for direction in Direction::ALL.into_iter().cycle().take(40) {
        let before = query::player(session.world());
        let events = session.handle_move_intent(direction);
        let after = query::player(session.world());
        if events
            .iter()
            .any(|event| matches!(event, Event::MoveBlocked { .. }))
        {
            assert_eq!(before, after);
        } else {
            assert_eq!(before.step(direction), Some(after));
        }
    }
}

#[test]
fn clearing_every_enemy_then_reaching_the_exit_wins() {
    for seed in 0..6 {
        let mut session = seeded(seed);
        let _ = session.start_new_round().expect("round starts");

        let targets: Vec<CellCoord> = query::enemy_view(session.world())
            .iter()
            .map(|enemy| enemy.cell)
            .collect();
        for target in targets {
            if query::enemy_view(session.world())
                .iter()
                .any(|enemy| enemy.cell == target)
            {
                let _ = walk(&mut session, target);
            }
        }
        assert_eq!(query::enemy_count(session.world()), 0);

        let exit = query::exit(session.world());
        assert_ne!(query::player(session.world()), exit);
        let events = walk(&mut session, exit);

        assert!(events.contains(&Event::ExitReached), "seed {seed}");
        assert_eq!(
            query::message(session.world()),
            Some(StatusMessage::Victory)
        );
        assert!(query::is_victorious(session.world()));
    }
}

#[test]
fn invalid_dimensions_are_reported() {
    let error = Session::new(SessionConfig {
        columns: 2,
        ..SessionConfig::default()
    })
    .expect_err("two columns leave no interior");
    assert_eq!(
        error,
        SessionError::Generation(GenerationError::TooSmall {
            columns: 2,
            rows: 30
        })
    );
}

#[test]
fn invalid_carve_fraction_names_the_generation_configuration() {
    let error = Session::new(SessionConfig {
        carve_fraction: 1.5,
        ..SessionConfig::default()
    })
    .expect_err("fraction above one is rejected");
    assert_eq!(
        error.to_string(),
        "invalid generation configuration: carve fraction 1.5 must lie in (0, 1]"
    );
}

#[test]
fn too_many_enemies_fail_the_round() {
    let mut session = Session::new(SessionConfig {
        enemy_count: 1_000,
        seed: Some(3),
        ..SessionConfig::default()
    })
    .expect("configuration is valid");

    assert_eq!(
        session.start_new_round(),
        Err(SessionError::Placement(PlacementError::InsufficientFloor {
            required: 1_002,
            available: 600
        }))
    );
    assert_eq!(query::round(session.world()), 0);
}
