#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Dungeon Crawl.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! The status panel uses Macroquad's immediate-mode UI module. All UI-specific
//! calls live inside the local `ui` module to avoid leaking Macroquad UI types
//! throughout the renderer.

mod ui;

use self::ui::{draw_status_panel_ui, StatusPanelUiContext, StatusPanelUiResult};
use anyhow::Result;
use dungeon_crawl_core::Direction;
use dungeon_crawl_rendering::{
    action_for_key, tile_color, Color, FrameInput, InputKey, KeyAction, Presentation,
    RenderingBackend, Scene,
};
use glam::Vec2;
use macroquad::input::{is_key_pressed, KeyCode};
use macroquad::math::Vec2 as MacroquadVec2;
use std::time::Duration;

/// Width of the status panel drawn to the right of the grid.
const STATUS_PANEL_WIDTH: f32 = 260.0;

/// Keys polled every frame, paired with their backend-agnostic names.
const POLLED_KEYS: [(KeyCode, InputKey); 11] = [
    (KeyCode::Up, InputKey::ArrowUp),
    (KeyCode::Down, InputKey::ArrowDown),
    (KeyCode::Left, InputKey::ArrowLeft),
    (KeyCode::Right, InputKey::ArrowRight),
    (KeyCode::Escape, InputKey::Escape),
    (KeyCode::W, InputKey::Character('w')),
    (KeyCode::A, InputKey::Character('a')),
    (KeyCode::S, InputKey::Character('s')),
    (KeyCode::D, InputKey::Character('d')),
    (KeyCode::R, InputKey::Character('r')),
    (KeyCode::Q, InputKey::Character('q')),
];

/// Tracks UI-sourced interactions so they can be merged with physical input on the next frame.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default)]
pub struct ControlPanelInputState {
    regenerate_latched: bool,
}

impl ControlPanelInputState {
    /// Returns whether the UI requested a new dungeon and clears the latch so
    /// the action fires only once.
    pub fn take_regenerate(&mut self) -> bool {
        let latched = self.regenerate_latched;
        self.regenerate_latched = false;
        latched
    }

    /// Records that the panel button requested a new dungeon this frame.
    pub fn register_regenerate(&mut self) {
        self.regenerate_latched = true;
    }
}

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the game loop.
    quit_requested: bool,
    /// `R` discards the round.
    regenerate: bool,
    /// First movement key pressed this frame.
    intent: Option<Direction>,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self::from_keys(
            POLLED_KEYS
                .iter()
                .filter(|(code, _)| is_key_pressed(*code))
                .map(|(_, key)| *key),
        )
    }

    /// Folds the pressed keys into shortcuts. Only one move is taken per frame.
    fn from_keys<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = InputKey>,
    {
        let mut shortcuts = Self::default();
        for key in keys {
            match action_for_key(key) {
                Some(KeyAction::Quit) => shortcuts.quit_requested = true,
                Some(KeyAction::Regenerate) => shortcuts.regenerate = true,
                Some(KeyAction::Move(direction)) => {
                    if shortcuts.intent.is_none() {
                        shortcuts.intent = Some(direction);
                    }
                }
                None => {}
            }
        }
        shortcuts
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(mut self, enabled: bool) -> Self {
        self.swap_interval = if enabled { Some(1) } else { Some(0) };
        self
    }

    /// Configures whether the backend prints the frame rate once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

/// Counts frames and reports the rate once a second has elapsed.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
}

impl FpsCounter {
    fn record_frame(&mut self, frame: Duration) -> Option<f32> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let per_second = self.frames as f32 / self.elapsed.as_secs_f32();
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some(per_second)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: (scene.tile_grid.width() + STATUS_PANEL_WIDTH).ceil() as i32,
            window_height: scene.tile_grid.height().ceil() as i32,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();
            let mut control_panel_input = ControlPanelInputState::default();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);

                let frame_input = FrameInput {
                    intent: keyboard.intent,
                    regenerate: control_panel_input.take_regenerate() || keyboard.regenerate,
                };
                update_scene(frame_input, &mut scene);

                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();
                let metrics = SceneMetrics::from_scene(&scene, screen_width, screen_height);

                draw_tiles(&scene, &metrics);
                draw_entities(&scene, &metrics);

                let panel_left = (screen_width - STATUS_PANEL_WIDTH).max(0.0);
                let panel_context = StatusPanelUiContext {
                    origin: MacroquadVec2::new(panel_left, 0.0),
                    size: MacroquadVec2::new(STATUS_PANEL_WIDTH, screen_height),
                    background,
                };
                let mut status_panel_ui = macroquad::ui::root_ui();
                let StatusPanelUiResult { regenerate_pressed } =
                    draw_status_panel_ui(&mut status_panel_ui, panel_context, &scene.status);
                if regenerate_pressed {
                    control_panel_input.register_regenerate();
                }
                drop(status_panel_ui);

                let frame_time = macroquad::time::get_frame_time().max(0.0);
                if let Some(per_second) =
                    fps_counter.record_frame(Duration::from_secs_f32(frame_time))
                {
                    if show_fps {
                        println!("FPS: {per_second:.2}");
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Screen placement of the grid for the current window size.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SceneMetrics {
    scale: f32,
    offset: Vec2,
}

impl SceneMetrics {
    fn from_scene(scene: &Scene, screen_width: f32, screen_height: f32) -> Self {
        let tile_grid = scene.tile_grid;
        let world_width = tile_grid.width();
        let world_height = tile_grid.height();
        let available_width = (screen_width - STATUS_PANEL_WIDTH).max(0.0);

        let scale = if world_width <= f32::EPSILON || world_height <= f32::EPSILON {
            1.0
        } else {
            (available_width / world_width).min(screen_height / world_height)
        };

        let offset = Vec2::new(
            ((available_width - world_width * scale) * 0.5).max(0.0),
            ((screen_height - world_height * scale) * 0.5).max(0.0),
        );

        Self { scale, offset }
    }

    fn to_screen(&self, position: Vec2) -> Vec2 {
        self.offset + position * self.scale
    }
}

fn draw_tiles(scene: &Scene, metrics: &SceneMetrics) {
    let side = scene.tile_grid.tile_length * metrics.scale;
    if side <= f32::EPSILON {
        return;
    }

    for (cell, tile) in scene.tiles.cells() {
        let origin = metrics.to_screen(scene.tile_grid.tile_origin(cell));
        macroquad::shapes::draw_rectangle(
            origin.x,
            origin.y,
            side,
            side,
            to_macroquad_color(tile_color(tile)),
        );
    }
}

fn draw_entities(scene: &Scene, metrics: &SceneMetrics) {
    for entity in scene.entities() {
        let square = scene.tile_grid.entity_square(entity.cell);
        let origin = metrics.to_screen(square.origin);
        let side = square.size * metrics.scale;
        macroquad::shapes::draw_rectangle(
            origin.x,
            origin.y,
            side,
            side,
            to_macroquad_color(entity.color),
        );
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
