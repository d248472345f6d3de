#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state management for Dungeon Crawl.

use std::collections::HashSet;

use dungeon_crawl_core::{
    CellCoord, Command, DungeonLayout, DungeonView, EnemySnapshot, EntityKind, Event, LayoutError,
    StatusMessage, Tile, TileGrid, WELCOME_BANNER,
};
use dungeon_crawl_system_interaction::{self as interaction, ExitArrival, Resolution, Step};
use log::{debug, info, warn};

/// Represents the authoritative state of the current round.
///
/// The exit is stored once as the [`Tile::Exit`] value in the grid; its cell
/// is cached alongside so lookups stay O(1).
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    grid: TileGrid,
    player: CellCoord,
    exit: CellCoord,
    enemies: Vec<EnemySnapshot>,
    message: Option<StatusMessage>,
    round: u64,
    moves: u64,
}

impl World {
    /// Creates an empty world that holds no round until a layout is installed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            banner: WELCOME_BANNER,
            grid: TileGrid::filled(0, 0, Tile::Wall),
            player: CellCoord::new(0, 0),
            exit: CellCoord::new(0, 0),
            enemies: Vec::new(),
            message: None,
            round: 0,
            moves: 0,
        }
    }

    fn install(&mut self, layout: DungeonLayout) {
        let DungeonLayout {
            grid,
            player,
            exit,
            enemies,
        } = layout;
        self.grid = grid;
        self.player = player;
        self.exit = exit;
        self.enemies = enemies;
        self.message = None;
        self.round = self.round.saturating_add(1);
        self.moves = 0;
    }

    fn view(&self) -> DungeonView<'_> {
        DungeonView::new(&self.grid, self.player, self.exit, &self.enemies)
    }

    fn commit(&mut self, step: Step, out_events: &mut Vec<Event>) {
        if let Some(enemy) = step.defeated {
            if let Some(index) = self.enemies.iter().position(|candidate| candidate.id == enemy) {
                let removed = self.enemies.swap_remove(index);
                out_events.push(Event::EnemyDefeated {
                    enemy,
                    cell: removed.cell,
                    remaining: step.remaining,
                });
            }
        }

        self.player = step.to;
        self.message = step.message();
        self.moves = self.moves.saturating_add(1);
        out_events.push(Event::PlayerMoved {
            from: step.from,
            to: step.to,
        });

        match step.exit {
            Some(ExitArrival::Sealed) => out_events.push(Event::ExitBlocked {
                remaining: step.remaining,
            }),
            Some(ExitArrival::Escaped) => {
                info!("round {} won after {} moves", self.round, self.moves);
                out_events.push(Event::ExitReached);
            }
            None => {}
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartRound { layout } => {
            if let Err(reason) = validate_layout(&layout) {
                warn!("rejected dungeon layout: {reason:?}");
                out_events.push(Event::RoundRejected { reason });
                return;
            }

            let columns = layout.grid.columns();
            let rows = layout.grid.rows();
            let enemies = u32::try_from(layout.enemies.len()).unwrap_or(u32::MAX);
            world.install(layout);
            out_events.push(Event::RoundStarted {
                columns,
                rows,
                enemies,
            });
        }
        Command::MovePlayer { direction } => {
            let resolution = interaction::resolve(&world.view(), direction);
            match resolution {
                Resolution::Blocked(reason) => {
                    debug!("move {direction:?} from {} blocked: {reason:?}", world.player);
                    out_events.push(Event::MoveBlocked { direction, reason });
                }
                Resolution::Moved(step) => {
                    debug!("player moved {direction:?} to {}", step.to);
                    world.commit(step, out_events);
                }
            }
        }
    }
}

fn validate_layout(layout: &DungeonLayout) -> Result<(), LayoutError> {
    let grid = &layout.grid;
    let entities = [
        (EntityKind::Player, layout.player),
        (EntityKind::Exit, layout.exit),
    ]
    .into_iter()
    .chain(
        layout
            .enemies
            .iter()
            .map(|enemy| (EntityKind::Enemy(enemy.id), enemy.cell)),
    );

    let mut occupied = HashSet::new();
    for (entity, cell) in entities {
        match grid.tile(cell) {
            None => return Err(LayoutError::OutOfBounds { entity }),
            Some(Tile::Wall) => return Err(LayoutError::OnWall { entity }),
            Some(Tile::Floor | Tile::Exit) => {}
        }
        if !occupied.insert(cell) {
            return Err(LayoutError::Overlapping { cell });
        }
    }

    if grid.tile(layout.exit) != Some(Tile::Exit) || grid.count(Tile::Exit) != 1 {
        return Err(LayoutError::ExitTileMismatch);
    }

    let mut identifiers = HashSet::new();
    for enemy in &layout.enemies {
        if !identifiers.insert(enemy.id) {
            return Err(LayoutError::DuplicateEnemyId { enemy: enemy.id });
        }
    }

    Ok(())
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use dungeon_crawl_core::{CellCoord, EnemySnapshot, StatusMessage, TileGrid};

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the current tile grid.
    #[must_use]
    pub fn grid(world: &World) -> &TileGrid {
        &world.grid
    }

    /// Cell currently occupied by the player.
    #[must_use]
    pub fn player(world: &World) -> CellCoord {
        world.player
    }

    /// Cell holding the exit.
    #[must_use]
    pub fn exit(world: &World) -> CellCoord {
        world.exit
    }

    /// Captures a read-only view of the enemies still alive.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let mut snapshots = world.enemies.clone();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        EnemyView { snapshots }
    }

    /// Number of enemies still alive.
    #[must_use]
    pub fn enemy_count(world: &World) -> usize {
        world.enemies.len()
    }

    /// Status message produced by the most recent move, if any.
    #[must_use]
    pub fn message(world: &World) -> Option<StatusMessage> {
        world.message
    }

    /// Number of rounds installed since the world was created.
    #[must_use]
    pub fn round(world: &World) -> u64 {
        world.round
    }

    /// Number of accepted moves in the current round.
    #[must_use]
    pub fn moves(world: &World) -> u64 {
        world.moves
    }

    /// Reports whether the player stands on the exit with every enemy defeated.
    #[must_use]
    pub fn is_victorious(world: &World) -> bool {
        world.round > 0 && world.player == world.exit && world.enemies.is_empty()
    }

    /// Read-only snapshot describing the enemies within the dungeon.
    #[derive(Clone, Debug)]
    pub struct EnemyView {
        snapshots: Vec<EnemySnapshot>,
    }

    impl EnemyView {
        /// Iterator over the captured enemy snapshots in identifier order.
        pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        pub fn into_vec(self) -> Vec<EnemySnapshot> {
            self.snapshots
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_crawl_core::{BlockReason, Direction, EnemyId};

    const EXIT: CellCoord = CellCoord::new(5, 5);

    fn arena() -> TileGrid {
        let mut grid = TileGrid::filled(9, 9, Tile::Wall);
        for row in 1..8 {
            for column in 1..8 {
                grid.set_tile(CellCoord::new(column, row), Tile::Floor);
            }
        }
        grid.set_tile(CellCoord::new(4, 2), Tile::Wall);
        grid.set_tile(EXIT, Tile::Exit);
        grid
    }

    fn enemy(id: u32, column: u32, row: u32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            cell: CellCoord::new(column, row),
        }
    }

    fn five_enemy_layout() -> DungeonLayout {
        DungeonLayout {
            grid: arena(),
            player: CellCoord::new(3, 3),
            exit: EXIT,
            enemies: vec![
                enemy(0, 4, 3),
                enemy(1, 1, 1),
                enemy(2, 7, 7),
                enemy(3, 7, 1),
                enemy(4, 1, 7),
            ],
        }
    }

    fn started(layout: DungeonLayout) -> World {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, Command::StartRound { layout }, &mut events);
        assert!(matches!(events.as_slice(), [Event::RoundStarted { .. }]));
        world
    }

    fn move_player(world: &mut World, direction: Direction) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, Command::MovePlayer { direction }, &mut events);
        events
    }

    fn rejection(layout: DungeonLayout) -> LayoutError {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, Command::StartRound { layout }, &mut events);
        match events.as_slice() {
            [Event::RoundRejected { reason }] => *reason,
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn start_round_installs_layout() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::StartRound {
                layout: five_enemy_layout(),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::RoundStarted {
                columns: 9,
                rows: 9,
                enemies: 5
            }]
        );
        assert_eq!(query::player(&world), CellCoord::new(3, 3));
        assert_eq!(query::exit(&world), EXIT);
        assert_eq!(query::enemy_count(&world), 5);
        assert_eq!(query::message(&world), None);
        assert_eq!(query::round(&world), 1);
        assert_eq!(query::grid(&world).tile(EXIT), Some(Tile::Exit));
    }

    #[test]
    fn defeating_an_enemy_reports_remaining_count() {
        let mut world = started(five_enemy_layout());

        let events = move_player(&mut world, Direction::East);

        assert_eq!(
            events,
            vec![
                Event::EnemyDefeated {
                    enemy: EnemyId::new(0),
                    cell: CellCoord::new(4, 3),
                    remaining: 4,
                },
                Event::PlayerMoved {
                    from: CellCoord::new(3, 3),
                    to: CellCoord::new(4, 3),
                },
            ]
        );
        assert_eq!(query::player(&world), CellCoord::new(4, 3));
        assert_eq!(query::enemy_count(&world), 4);
        assert!(query::enemy_view(&world)
            .iter()
            .all(|snapshot| snapshot.id != EnemyId::new(0)));
        let message = query::message(&world).expect("defeat sets a message");
        assert!(message.to_string().contains("4 left"));
    }

    #[test]
    fn blocked_moves_leave_state_untouched() {
        let mut world = started(five_enemy_layout());
        let _ = move_player(&mut world, Direction::East);
        let message_before = query::message(&world);
        let grid_before = query::grid(&world).clone();
        let enemies_before = query::enemy_view(&world).into_vec();

        let events = move_player(&mut world, Direction::North);

        assert_eq!(
            events,
            vec![Event::MoveBlocked {
                direction: Direction::North,
                reason: BlockReason::Wall,
            }]
        );
        assert_eq!(query::player(&world), CellCoord::new(4, 3));
        assert_eq!(query::message(&world), message_before);
        assert_eq!(query::grid(&world), &grid_before);
        assert_eq!(query::enemy_view(&world).into_vec(), enemies_before);
        assert_eq!(query::moves(&world), 1);
    }

    #[test]
    fn plain_move_clears_previous_message() {
        let mut world = started(five_enemy_layout());
        let _ = move_player(&mut world, Direction::East);
        assert!(query::message(&world).is_some());

        let _ = move_player(&mut world, Direction::South);

        assert_eq!(query::player(&world), CellCoord::new(4, 4));
        assert_eq!(query::message(&world), None);
    }

    #[test]
    fn sealed_exit_keeps_player_on_it() {
        let mut world = started(five_enemy_layout());
        let _ = move_player(&mut world, Direction::South);
        let _ = move_player(&mut world, Direction::South);
        let _ = move_player(&mut world, Direction::East);

        let events = move_player(&mut world, Direction::East);

        assert_eq!(query::player(&world), EXIT);
        assert!(events.contains(&Event::ExitBlocked { remaining: 5 }));
        assert_eq!(
            query::message(&world),
            Some(StatusMessage::ExitBlocked { remaining: 5 })
        );
        assert!(!query::is_victorious(&world));
    }

    #[test]
    fn empty_enemy_set_wins_on_the_exit() {
        let layout = DungeonLayout {
            grid: arena(),
            player: CellCoord::new(5, 4),
            exit: EXIT,
            enemies: Vec::new(),
        };
        let mut world = started(layout);

        let events = move_player(&mut world, Direction::South);

        assert_eq!(query::player(&world), CellCoord::new(5, 5));
        assert_eq!(events.last(), Some(&Event::ExitReached));
        assert_eq!(query::message(&world), Some(StatusMessage::Victory));
        assert!(query::is_victorious(&world));

        let _ = move_player(&mut world, Direction::North);
        let events = move_player(&mut world, Direction::South);
        assert_eq!(events.last(), Some(&Event::ExitReached));
    }

    #[test]
    fn new_round_discards_previous_state() {
        let mut world = started(five_enemy_layout());
        let _ = move_player(&mut world, Direction::East);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::StartRound {
                layout: five_enemy_layout(),
            },
            &mut events,
        );

        assert_eq!(query::enemy_count(&world), 5);
        assert_eq!(query::player(&world), CellCoord::new(3, 3));
        assert_eq!(query::message(&world), None);
        assert_eq!(query::round(&world), 2);
        assert_eq!(query::moves(&world), 0);
    }

    #[test]
    fn moves_before_first_round_are_out_of_bounds() {
        let mut world = World::new();
        let events = move_player(&mut world, Direction::East);
        assert_eq!(
            events,
            vec![Event::MoveBlocked {
                direction: Direction::East,
                reason: BlockReason::OutOfBounds,
            }]
        );
        assert!(!query::is_victorious(&world));
    }

    #[test]
    fn rejects_overlapping_entities() {
        let mut layout = five_enemy_layout();
        layout.enemies[1].cell = layout.player;
        assert_eq!(
            rejection(layout),
            LayoutError::Overlapping {
                cell: CellCoord::new(3, 3)
            }
        );
    }

    #[test]
    fn rejects_entities_on_walls() {
        let mut layout = five_enemy_layout();
        layout.enemies[2].cell = CellCoord::new(4, 2);
        assert_eq!(
            rejection(layout),
            LayoutError::OnWall {
                entity: EntityKind::Enemy(EnemyId::new(2))
            }
        );
    }

    #[test]
    fn rejects_entities_outside_grid() {
        let mut layout = five_enemy_layout();
        layout.player = CellCoord::new(9, 3);
        assert_eq!(
            rejection(layout),
            LayoutError::OutOfBounds {
                entity: EntityKind::Player
            }
        );
    }

    #[test]
    fn rejects_exit_without_exit_tile() {
        let mut layout = five_enemy_layout();
        layout.grid.set_tile(EXIT, Tile::Floor);
        assert_eq!(rejection(layout), LayoutError::ExitTileMismatch);

        let mut layout = five_enemy_layout();
        layout.grid.set_tile(CellCoord::new(6, 6), Tile::Exit);
        assert_eq!(rejection(layout), LayoutError::ExitTileMismatch);
    }

    #[test]
    fn rejects_duplicate_enemy_identifiers() {
        let mut layout = five_enemy_layout();
        layout.enemies[4].id = EnemyId::new(0);
        assert_eq!(
            rejection(layout),
            LayoutError::DuplicateEnemyId {
                enemy: EnemyId::new(0)
            }
        );
    }

    #[test]
    fn rejected_layout_keeps_previous_round() {
        let mut world = started(five_enemy_layout());
        let mut layout = five_enemy_layout();
        layout.exit = CellCoord::new(6, 6);

        let mut events = Vec::new();
        apply(&mut world, Command::StartRound { layout }, &mut events);

        assert!(matches!(
            events.as_slice(),
            [Event::RoundRejected { .. }]
        ));
        assert_eq!(query::round(&world), 1);
        assert_eq!(query::exit(&world), EXIT);
    }
}
