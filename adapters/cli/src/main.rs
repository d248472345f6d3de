#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Dungeon Crawl experience.

mod config;
mod scene;
mod terminal;

use anyhow::{Context, Result};
use clap::Parser;
use config::{Overrides, Settings};
use dungeon_crawl_rendering::{Presentation, RenderingBackend, BACKGROUND_COLOR};
use dungeon_crawl_rendering_macroquad::MacroquadBackend;
use dungeon_crawl_system_session::Session;
use dungeon_crawl_world::query;
use log::{error, info};
use std::path::PathBuf;

/// Explore a freshly carved dungeon, defeat every enemy and reach the exit.
#[derive(Debug, Parser)]
#[command(name = "dungeon-crawl", version, about)]
struct Args {
    /// Number of tile columns.
    #[arg(long)]
    columns: Option<u32>,
    /// Number of tile rows.
    #[arg(long)]
    rows: Option<u32>,
    /// Number of enemies placed each round.
    #[arg(long)]
    enemies: Option<u32>,
    /// Seed for reproducible dungeons.
    #[arg(long)]
    seed: Option<u64>,
    /// Side length of a tile in pixels.
    #[arg(long)]
    tile_size: Option<f32>,
    /// TOML file providing defaults for the options above.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Play in the terminal instead of opening a window.
    #[arg(long)]
    ascii: bool,
    /// Render as fast as possible instead of waiting for the display.
    #[arg(long)]
    no_vsync: bool,
    /// Print the frame rate once per second.
    #[arg(long)]
    show_fps: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            columns: self.columns,
            rows: self.rows,
            enemies: self.enemies,
            carve_fraction: None,
            seed: self.seed,
            tile_size: self.tile_size,
        }
    }
}

/// Entry point for the Dungeon Crawl command-line interface.
fn main() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .try_init();

    if let Err(error) = run(Args::parse()) {
        error!("{error:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let file = match &args.config {
        Some(path) => config::load(path)?,
        None => Overrides::default(),
    };
    let settings = Settings::resolve(args.overrides().or(file));

    let mut session = Session::new(settings.session).context("invalid dungeon configuration")?;
    info!("session seed {}", session.seed());
    let _ = session
        .start_new_round()
        .context("failed to generate the first dungeon")?;

    if args.ascii {
        let stdin = std::io::stdin();
        return terminal::run(&mut session, stdin.lock(), std::io::stdout());
    }

    println!("{}", query::welcome_banner(session.world()));
    let scene = scene::build(session.world(), settings.tile_size)?;
    let presentation = Presentation::new("Dungeon Crawl", BACKGROUND_COLOR, scene);
    let backend = MacroquadBackend::new()
        .with_vsync(!args.no_vsync)
        .with_show_fps(args.show_fps);

    backend.run(presentation, move |input, scene| {
        if input.regenerate {
            if let Err(error) = session.start_new_round() {
                error!("failed to generate a new dungeon: {error}");
            }
        } else if let Some(direction) = input.intent {
            let _ = session.handle_move_intent(direction);
        }
        scene::refresh(session.world(), scene);
    })
}
