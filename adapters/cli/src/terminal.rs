//! Text front end: draws the dungeon with glyphs and reads keys from input lines.

use anyhow::{Context, Result};
use dungeon_crawl_rendering::{action_for_key, InputKey, KeyAction};
use dungeon_crawl_system_session::Session;
use dungeon_crawl_world::{query, World};
use log::debug;
use std::io::{BufRead, Write};

const PLAYER_GLYPH: char = '@';
const ENEMY_GLYPH: char = 'E';

/// Draws the grid one row per line, with enemies and the player on top.
pub(crate) fn render(world: &World) -> String {
    let grid = query::grid(world);
    let enemies = query::enemy_view(world);
    let player = query::player(world);

    let mut text = String::with_capacity((grid.columns() as usize + 1) * grid.rows() as usize);
    let mut current_row = 0;
    for (cell, tile) in grid.cells() {
        if cell.row() != current_row {
            text.push('\n');
            current_row = cell.row();
        }
        let glyph = if cell == player {
            PLAYER_GLYPH
        } else if enemies.iter().any(|enemy| enemy.cell == cell) {
            ENEMY_GLYPH
        } else {
            tile.glyph()
        };
        text.push(glyph);
    }
    text.push('\n');
    text
}

fn write_frame<W: Write>(world: &World, output: &mut W) -> Result<()> {
    let grid = query::grid(world);
    write!(output, "{}", render(world))?;
    writeln!(
        output,
        "{}x{} | {} | enemies left: {}",
        grid.columns(),
        grid.rows(),
        dungeon_crawl_core::ALGORITHM_NAME,
        query::enemy_count(world),
    )?;
    if let Some(message) = query::message(world) {
        writeln!(output, "{message}")?;
    }
    write!(output, "move [wasd], r = new dungeon, q = quit > ")?;
    output.flush()?;
    Ok(())
}

/// Plays rounds on the terminal until a quit key or the end of input.
///
/// Every character of an input line is treated as a key press, so `ddd`
/// moves three tiles east.
pub(crate) fn run<R, W>(session: &mut Session, input: R, mut output: W) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    writeln!(output, "{}", query::welcome_banner(session.world()))?;
    write_frame(session.world(), &mut output)?;

    for line in input.lines() {
        let line = line.context("failed to read from standard input")?;
        for key in line.chars().map(InputKey::Character) {
            match action_for_key(key) {
                Some(KeyAction::Move(direction)) => {
                    let events = session.handle_move_intent(direction);
                    debug!("{direction:?} -> {events:?}");
                }
                Some(KeyAction::Regenerate) => {
                    let _ = session
                        .start_new_round()
                        .context("failed to generate a new dungeon")?;
                }
                Some(KeyAction::Quit) => return Ok(()),
                None => {}
            }
        }
        write_frame(session.world(), &mut output)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_crawl_core::{Direction, Tile};
    use dungeon_crawl_system_session::SessionConfig;
    use std::io::Cursor;

    fn session() -> Session {
        let mut session = Session::new(SessionConfig {
            seed: Some(5),
            ..SessionConfig::default()
        })
        .expect("valid configuration");
        let _ = session.start_new_round().expect("round starts");
        session
    }

    #[test]
    fn render_draws_every_tile_and_entity() {
        let session = session();
        let text = render(session.world());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 30);
        assert!(lines.iter().all(|line| line.chars().count() == 40));
        assert_eq!(text.matches(PLAYER_GLYPH).count(), 1);
        assert_eq!(text.matches(ENEMY_GLYPH).count(), 5);
        assert_eq!(text.matches(Tile::Exit.glyph()).count(), 1);
        assert!(lines[0].chars().all(|glyph| glyph == '#'));
    }

    #[test]
    fn quit_key_ends_the_loop() {
        let mut session = session();
        let mut output = Vec::new();
        run(&mut session, Cursor::new("q\nd\n"), &mut output).expect("terminal run");

        assert_eq!(query::moves(session.world()), 0);
        let printed = String::from_utf8(output).expect("utf-8 output");
        assert!(printed.starts_with("Welcome to Dungeon Crawl."));
        assert!(printed.contains("Drunkard's Walk"));
    }

    #[test]
    fn regenerate_key_starts_a_new_round() {
        let mut session = session();
        run(&mut session, Cursor::new("R\n"), Vec::new()).expect("terminal run");
        assert_eq!(query::round(session.world()), 2);
    }

    #[test]
    fn movement_keys_reach_the_world() {
        let mut typed = session();
        run(&mut typed, Cursor::new("wasd\nDDSS\n"), Vec::new()).expect("terminal run");

        let mut direct = session();
        let directions = [
            Direction::North,
            Direction::West,
            Direction::South,
            Direction::East,
            Direction::East,
            Direction::East,
            Direction::South,
            Direction::South,
        ];
        for direction in directions {
            let _ = direct.handle_move_intent(direction);
        }

        assert_eq!(query::player(typed.world()), query::player(direct.world()));
        assert_eq!(query::moves(typed.world()), query::moves(direct.world()));
        assert_eq!(
            query::enemy_count(typed.world()),
            query::enemy_count(direct.world())
        );
    }
}
