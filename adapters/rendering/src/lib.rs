#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Dungeon Crawl adapters.
//!
//! Backends receive a [`Scene`] describing the tiles, the entities and the
//! status panel, draw it, and report the player's input back as a
//! [`FrameInput`]. Raw keys are translated into logical intents by
//! [`action_for_key`] so every backend shares the same bindings.

use anyhow::Result as AnyResult;
use dungeon_crawl_core::{CellCoord, Direction, StatusMessage, Tile, TileGrid, ALGORITHM_NAME};
use glam::Vec2;
use std::{error::Error, fmt};

/// Side length of a tile in pixels when no other size is configured.
pub const DEFAULT_TILE_SIZE: f32 = 16.0;

/// Fraction of a tile left empty on each side of an entity square.
pub const ENTITY_INSET: f32 = 0.1;

/// Fill used for wall tiles.
pub const WALL_COLOR: Color = Color::from_rgb_u8(0x2c, 0x32, 0x3b);
/// Fill used for floor tiles.
pub const FLOOR_COLOR: Color = Color::from_rgb_u8(0x44, 0x4b, 0x57);
/// Fill used for the exit tile.
pub const EXIT_COLOR: Color = Color::from_rgb_u8(0xd4, 0xa7, 0x2c);
/// Fill used for the player square.
pub const PLAYER_COLOR: Color = Color::from_rgb_u8(0x4f, 0xc3, 0xf7);
/// Fill used for enemy squares.
pub const ENEMY_COLOR: Color = Color::from_rgb_u8(0xe5, 0x53, 0x4b);
/// Background behind the grid and the status panel.
pub const BACKGROUND_COLOR: Color = Color::from_rgb_u8(0x1b, 0x1f, 0x26);

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self::new(red as f32 / 255.0, green as f32 / 255.0, blue as f32 / 255.0, 1.0)
    }
}

/// Fill color for a tile type.
#[must_use]
pub const fn tile_color(tile: Tile) -> Color {
    match tile {
        Tile::Wall => WALL_COLOR,
        Tile::Floor => FLOOR_COLOR,
        Tile::Exit => EXIT_COLOR,
    }
}

/// Keys a backend may observe, independent of the windowing library.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputKey {
    /// Up arrow.
    ArrowUp,
    /// Down arrow.
    ArrowDown,
    /// Left arrow.
    ArrowLeft,
    /// Right arrow.
    ArrowRight,
    /// Escape key.
    Escape,
    /// Any key producing a printable character.
    Character(char),
}

/// Logical action bound to a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Move the player one tile.
    Move(Direction),
    /// Discard the round and generate a new dungeon.
    Regenerate,
    /// Leave the game.
    Quit,
}

/// Translates a key into its action. Letters match regardless of case.
///
/// Arrow keys and `WASD` move, `R` regenerates, `Q` and `Escape` quit;
/// every other key is ignored.
#[must_use]
pub fn action_for_key(key: InputKey) -> Option<KeyAction> {
    match key {
        InputKey::ArrowUp => Some(KeyAction::Move(Direction::North)),
        InputKey::ArrowDown => Some(KeyAction::Move(Direction::South)),
        InputKey::ArrowLeft => Some(KeyAction::Move(Direction::West)),
        InputKey::ArrowRight => Some(KeyAction::Move(Direction::East)),
        InputKey::Escape => Some(KeyAction::Quit),
        InputKey::Character(character) => match character.to_ascii_lowercase() {
            'w' => Some(KeyAction::Move(Direction::North)),
            's' => Some(KeyAction::Move(Direction::South)),
            'a' => Some(KeyAction::Move(Direction::West)),
            'd' => Some(KeyAction::Move(Direction::East)),
            'r' => Some(KeyAction::Regenerate),
            'q' => Some(KeyAction::Quit),
            _ => None,
        },
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Movement intent observed on this frame, if any.
    pub intent: Option<Direction>,
    /// Whether the adapter detected a regenerate request on this frame.
    pub regenerate: bool,
}

/// Describes the square tile grid that backends draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileGridPresentation {
    /// Number of columns contained in the grid.
    pub columns: u32,
    /// Number of rows contained in the grid.
    pub rows: u32,
    /// Side length of a single tile expressed in pixels.
    pub tile_length: f32,
}

impl TileGridPresentation {
    /// Creates a new tile grid descriptor.
    ///
    /// Returns an error when `tile_length` is not a positive finite number.
    pub fn new(
        columns: u32,
        rows: u32,
        tile_length: f32,
    ) -> std::result::Result<Self, RenderingError> {
        if !(tile_length.is_finite() && tile_length > 0.0) {
            return Err(RenderingError::InvalidTileLength { tile_length });
        }

        Ok(Self {
            columns,
            rows,
            tile_length,
        })
    }

    /// Calculates the total width of the grid.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.tile_length
    }

    /// Calculates the total height of the grid.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.tile_length
    }

    /// Top-left corner of a tile relative to the grid origin.
    #[must_use]
    pub fn tile_origin(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(cell.column() as f32, cell.row() as f32) * self.tile_length
    }

    /// Square drawn for an entity standing on `cell`.
    ///
    /// The square covers 80% of the tile and is centred within it.
    #[must_use]
    pub fn entity_square(&self, cell: CellCoord) -> EntitySquare {
        let inset = self.tile_length * ENTITY_INSET;
        EntitySquare {
            origin: self.tile_origin(cell) + Vec2::splat(inset),
            size: self.tile_length - 2.0 * inset,
        }
    }
}

/// Screen-space square covering an entity, relative to the grid origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntitySquare {
    /// Top-left corner.
    pub origin: Vec2,
    /// Side length.
    pub size: f32,
}

/// Entity drawn on top of the tiles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntityPresentation {
    /// Cell the entity stands on.
    pub cell: CellCoord,
    /// Fill used for the entity square.
    pub color: Color,
}

impl EntityPresentation {
    /// Describes the player standing on `cell`.
    #[must_use]
    pub const fn player(cell: CellCoord) -> Self {
        Self {
            cell,
            color: PLAYER_COLOR,
        }
    }

    /// Describes an enemy standing on `cell`.
    #[must_use]
    pub const fn enemy(cell: CellCoord) -> Self {
        Self {
            cell,
            color: ENEMY_COLOR,
        }
    }
}

/// Text shown in the status panel next to the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusPresentation {
    /// Number of grid columns.
    pub columns: u32,
    /// Number of grid rows.
    pub rows: u32,
    /// Enemies still alive.
    pub enemies_remaining: u32,
    /// Most recent status message, if any.
    pub message: Option<StatusMessage>,
}

impl StatusPresentation {
    /// Map size in `COLUMNSxROWS` form.
    #[must_use]
    pub fn map_size(&self) -> String {
        format!("{}x{}", self.columns, self.rows)
    }

    /// Lines of the panel from top to bottom.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Map: {}", self.map_size()),
            format!("Algorithm: {ALGORITHM_NAME}"),
            format!("Enemies left: {}", self.enemies_remaining),
        ];
        if let Some(message) = self.message {
            lines.push(message.to_string());
        }
        lines
    }
}

/// Scene description combining the tile grid, the entities and the status panel.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Geometry of the tile grid.
    pub tile_grid: TileGridPresentation,
    /// Tiles of the current round.
    pub tiles: TileGrid,
    /// Enemies still alive.
    pub enemies: Vec<EntityPresentation>,
    /// The player.
    pub player: EntityPresentation,
    /// Text shown in the status panel.
    pub status: StatusPresentation,
}

impl Scene {
    /// Creates a new scene descriptor.
    #[must_use]
    pub fn new(
        tile_grid: TileGridPresentation,
        tiles: TileGrid,
        enemies: Vec<EntityPresentation>,
        player: EntityPresentation,
        status: StatusPresentation,
    ) -> Self {
        Self {
            tile_grid,
            tiles,
            enemies,
            player,
            status,
        }
    }

    /// Entities in draw order: every enemy first, the player last so it stays on top.
    pub fn entities(&self) -> impl Iterator<Item = &EntityPresentation> {
        self.enemies.iter().chain(std::iter::once(&self.player))
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Dungeon Crawl scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the input captured on the
    /// frame and may replace the scene before it is drawn.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Tiles must have a positive size to be visible.
    InvalidTileLength {
        /// Provided tile length that failed validation.
        tile_length: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTileLength { tile_length } => {
                write!(f, "tile length must be positive (received {tile_length})")
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_presentation() -> TileGridPresentation {
        TileGridPresentation::new(40, 30, DEFAULT_TILE_SIZE).expect("positive tile length")
    }

    #[test]
    fn byte_colors_are_opaque_unit_channels() {
        assert_eq!(Color::from_rgb_u8(255, 0, 255), Color::new(1.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn tile_grid_rejects_non_positive_tile_length() {
        let error = TileGridPresentation::new(10, 5, 0.0)
            .expect_err("zero tile length must be rejected");
        assert_eq!(error, RenderingError::InvalidTileLength { tile_length: 0.0 });
        assert!(TileGridPresentation::new(10, 5, f32::NAN).is_err());
    }

    #[test]
    fn grid_dimensions_scale_with_tile_length() {
        let presentation = grid_presentation();
        assert_eq!(presentation.width(), 640.0);
        assert_eq!(presentation.height(), 480.0);
    }

    #[test]
    fn entity_square_is_inset_by_a_tenth() {
        let presentation = grid_presentation();
        let square = presentation.entity_square(CellCoord::new(2, 1));
        assert!((square.origin.x - 33.6).abs() < 1e-4);
        assert!((square.origin.y - 17.6).abs() < 1e-4);
        assert!((square.size - 12.8).abs() < 1e-4);
    }

    #[test]
    fn tiles_use_distinct_colors() {
        assert_eq!(tile_color(Tile::Wall), Color::from_rgb_u8(0x2c, 0x32, 0x3b));
        assert_eq!(tile_color(Tile::Floor), Color::from_rgb_u8(0x44, 0x4b, 0x57));
        assert_ne!(tile_color(Tile::Exit), tile_color(Tile::Floor));
    }

    #[test]
    fn arrows_and_wasd_map_to_the_same_intents() {
        let pairs = [
            (InputKey::ArrowUp, 'w', Direction::North),
            (InputKey::ArrowDown, 's', Direction::South),
            (InputKey::ArrowLeft, 'a', Direction::West),
            (InputKey::ArrowRight, 'd', Direction::East),
        ];
        for (arrow, letter, direction) in pairs {
            let expected = Some(KeyAction::Move(direction));
            assert_eq!(action_for_key(arrow), expected);
            assert_eq!(action_for_key(InputKey::Character(letter)), expected);
            assert_eq!(
                action_for_key(InputKey::Character(letter.to_ascii_uppercase())),
                expected
            );
        }
    }

    #[test]
    fn unbound_keys_are_ignored() {
        assert_eq!(action_for_key(InputKey::Character('x')), None);
        assert_eq!(action_for_key(InputKey::Character(' ')), None);
        assert_eq!(
            action_for_key(InputKey::Character('R')),
            Some(KeyAction::Regenerate)
        );
        assert_eq!(action_for_key(InputKey::Escape), Some(KeyAction::Quit));
    }

    #[test]
    fn status_lines_include_message_only_when_present() {
        let mut status = StatusPresentation {
            columns: 40,
            rows: 30,
            enemies_remaining: 5,
            message: None,
        };
        assert_eq!(
            status.lines(),
            vec![
                "Map: 40x30".to_string(),
                "Algorithm: Drunkard's Walk".to_string(),
                "Enemies left: 5".to_string(),
            ]
        );

        status.message = Some(StatusMessage::EnemyDefeated { remaining: 4 });
        assert_eq!(status.lines().len(), 4);
        assert!(status.lines()[3].contains("4 left"));
    }

    #[test]
    fn player_is_drawn_after_every_enemy() {
        let scene = Scene::new(
            grid_presentation(),
            TileGrid::filled(40, 30, Tile::Floor),
            vec![
                EntityPresentation::enemy(CellCoord::new(1, 1)),
                EntityPresentation::enemy(CellCoord::new(2, 2)),
            ],
            EntityPresentation::player(CellCoord::new(3, 3)),
            StatusPresentation {
                columns: 40,
                rows: 30,
                enemies_remaining: 2,
                message: None,
            },
        );

        let order: Vec<_> = scene.entities().collect();
        assert_eq!(order.len(), 3);
        assert_eq!(order.last().map(|entity| entity.color), Some(PLAYER_COLOR));
    }
}
