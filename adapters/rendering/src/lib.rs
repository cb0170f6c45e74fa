#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Maze Escape adapters.

use anyhow::{Context, Result as AnyResult};
use glam::Vec2;
use maze_escape_core::{
    CollectibleView, EnemyState, EnemyView, ExitSnapshot, PixelPoint, PlayerSnapshot, TileCoord,
    WallView,
};
use std::{error::Error, fmt, io::Write, ops::ControlFlow, time::Duration};

/// Vertical amplitude of the collectible float animation in pixels.
pub const COLLECTIBLE_FLOAT_AMPLITUDE: f32 = 5.0;

/// Remaining seconds under which the HUD timer is drawn as a warning.
pub const TIMER_WARNING_SECONDS: f32 = 15.0;

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
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Colors assigned to every drawable element of a maze.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Background behind the maze.
    pub floor: Color,
    /// Wall fill.
    pub wall: Color,
    /// Player body.
    pub player: Color,
    /// Enemy body while patrolling.
    pub enemy_patrol: Color,
    /// Enemy body while chasing.
    pub enemy_chase: Color,
    /// Enemy body while returning home.
    pub enemy_return: Color,
    /// Collectible star.
    pub collectible: Color,
    /// Exit while collectibles remain.
    pub exit_locked: Color,
    /// Exit once every collectible is gathered.
    pub exit_unlocked: Color,
}

impl Palette {
    /// Body color for an enemy in the provided state.
    #[must_use]
    pub const fn enemy(&self, state: EnemyState) -> Color {
        match state {
            EnemyState::Patrol => self.enemy_patrol,
            EnemyState::Chase => self.enemy_chase,
            EnemyState::Return => self.enemy_return,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        let exit = Color::from_rgb_u8(0, 200, 0);
        Self {
            floor: Color::from_rgb_u8(0, 0, 0),
            wall: Color::from_rgb_u8(80, 80, 100),
            player: Color::from_rgb_u8(0, 150, 255),
            enemy_patrol: Color::from_rgb_u8(200, 50, 50),
            enemy_chase: Color::from_rgb_u8(255, 50, 50),
            enemy_return: Color::from_rgb_u8(255, 150, 150),
            collectible: Color::from_rgb_u8(255, 215, 0),
            exit_locked: Color::from_rgb_u8(100, 100, 100),
            exit_unlocked: exit.lighten(0.2),
        }
    }
}

/// Describes the square tile grid that hosts the maze.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileGridPresentation {
    /// Number of columns contained in the grid.
    pub columns: u32,
    /// Number of rows contained in the grid.
    pub rows: u32,
    /// Side length of a single tile expressed in world units.
    pub tile_length: f32,
    /// Color used to clear the floor.
    pub floor_color: Color,
}

impl TileGridPresentation {
    /// Creates a new tile grid descriptor.
    ///
    /// Returns an error when `tile_size` is zero.
    pub fn new(
        columns: u32,
        rows: u32,
        tile_size: u32,
        floor_color: Color,
    ) -> std::result::Result<Self, RenderingError> {
        if tile_size == 0 {
            return Err(RenderingError::InvalidTileSize { tile_size });
        }

        Ok(Self {
            columns,
            rows,
            tile_length: tile_size as f32,
            floor_color,
        })
    }

    /// Calculates the total width of the grid.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.columns as f32 * self.tile_length
    }

    /// Calculates the total height of the grid.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.rows as f32 * self.tile_length
    }

    /// Tile containing a world-space position, if it lies inside the grid.
    #[must_use]
    pub fn tile_at(&self, position: Vec2) -> Option<TileCoord> {
        if position.x < 0.0
            || position.y < 0.0
            || position.x >= self.width()
            || position.y >= self.height()
        {
            return None;
        }

        let column = (position.x / self.tile_length).floor() as i32;
        let row = (position.y / self.tile_length).floor() as i32;
        Some(TileCoord::new(column, row))
    }
}

/// Wall tiles of the maze.
#[derive(Clone, Debug, PartialEq)]
pub struct WallPresentation {
    /// Every wall tile in row-major order.
    pub tiles: Vec<TileCoord>,
    /// Fill color applied to each wall tile.
    pub color: Color,
}

/// Circular actor drawn at its interpolated pixel position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorPresentation {
    /// Centre of the actor in world units.
    pub center: Vec2,
    /// Radius of the drawn body.
    pub radius: f32,
    /// Body color.
    pub color: Color,
}

impl ActorPresentation {
    fn new(position: PixelPoint, size: u32, color: Color) -> Self {
        Self {
            center: to_vec(position),
            radius: size as f32 / 2.0,
            color,
        }
    }
}

/// Enemy body together with the behaviour that chose its color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyPresentation {
    /// Drawn body.
    pub body: ActorPresentation,
    /// Behaviour the enemy was in when the scene was captured.
    pub state: EnemyState,
}

/// Uncollected star drawn with its floating offset applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollectiblePresentation {
    /// Tile the collectible occupies.
    pub tile: TileCoord,
    /// Drawn centre including the float offset.
    pub center: Vec2,
    /// Side length of the star's bounding square.
    pub size: f32,
    /// Fill color.
    pub color: Color,
}

/// Exit tile and its lock state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExitPresentation {
    /// Tile holding the exit.
    pub tile: TileCoord,
    /// Whether every collectible has been gathered.
    pub unlocked: bool,
    /// Fill color reflecting the lock state.
    pub color: Color,
}

/// Heads-up display content drawn above the maze.
#[derive(Clone, Debug, PartialEq)]
pub struct Hud {
    /// Name of the level being played.
    pub level_name: String,
    /// Seconds left on the level timer.
    pub seconds_left: f32,
    /// Collectibles gathered so far.
    pub collected: usize,
    /// Collectibles present in the level.
    pub total: usize,
    /// Optional banner such as a win or lose message.
    pub message: Option<String>,
}

impl Hud {
    /// Reports whether the timer should be drawn as a warning.
    #[must_use]
    pub fn timer_warning(&self) -> bool {
        self.seconds_left < TIMER_WARNING_SECONDS
    }

    /// Single-line textual rendition of the HUD.
    #[must_use]
    pub fn status_line(&self) -> String {
        let seconds = self.seconds_left.max(0.0) as u32;
        let mut line = format!(
            "{}  {seconds}s{}  Stars {}/{}",
            self.level_name,
            if self.timer_warning() { "!" } else { "" },
            self.collected,
            self.total
        );
        if let Some(message) = &self.message {
            line.push_str("  ");
            line.push_str(message);
        }
        line
    }
}

/// Scene description combining the maze and its inhabitants.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Tile grid that composes the play area.
    pub tile_grid: TileGridPresentation,
    /// Wall tiles.
    pub walls: WallPresentation,
    /// Player body.
    pub player: ActorPresentation,
    /// Enemies in id order.
    pub enemies: Vec<EnemyPresentation>,
    /// Collectibles that have not been gathered yet.
    pub collectibles: Vec<CollectiblePresentation>,
    /// Exit tile.
    pub exit: ExitPresentation,
    /// Heads-up display.
    pub hud: Hud,
}

impl Scene {
    /// Creates a new scene descriptor.
    #[must_use]
    pub fn new(
        tile_grid: TileGridPresentation,
        walls: WallPresentation,
        player: ActorPresentation,
        enemies: Vec<EnemyPresentation>,
        collectibles: Vec<CollectiblePresentation>,
        exit: ExitPresentation,
        hud: Hud,
    ) -> Self {
        Self {
            tile_grid,
            walls,
            player,
            enemies,
            collectibles,
            exit,
            hud,
        }
    }

    /// Builds a scene from world snapshots.
    ///
    /// Collected items are omitted and uncollected ones are shifted by their
    /// float animation.
    #[allow(clippy::too_many_arguments)] // Scene capture enumerates every world channel explicitly.
    pub fn capture(
        palette: &Palette,
        tile_size: u32,
        walls: WallView<'_>,
        player: &PlayerSnapshot,
        enemies: &EnemyView,
        collectibles: &CollectibleView,
        exit: &ExitSnapshot,
        hud: Hud,
    ) -> std::result::Result<Self, RenderingError> {
        let (columns, rows) = walls.dimensions();
        let tile_grid = TileGridPresentation::new(columns, rows, tile_size, palette.floor)?;

        let walls = WallPresentation {
            tiles: walls.iter().collect(),
            color: palette.wall,
        };
        let player =
            ActorPresentation::new(player.body.position, player.body.size, palette.player);
        let enemies = enemies
            .iter()
            .map(|enemy| EnemyPresentation {
                body: ActorPresentation::new(
                    enemy.body.position,
                    enemy.body.size,
                    palette.enemy(enemy.behavior.state),
                ),
                state: enemy.behavior.state,
            })
            .collect();
        let collectibles = collectibles
            .iter()
            .filter(|item| !item.collected)
            .map(|item| {
                let offset = item.animation_phase.sin() * COLLECTIBLE_FLOAT_AMPLITUDE;
                CollectiblePresentation {
                    tile: item.tile,
                    center: to_vec(item.position) + Vec2::new(0.0, offset),
                    size: item.size as f32,
                    color: palette.collectible,
                }
            })
            .collect();
        let exit = ExitPresentation {
            tile: exit.tile,
            unlocked: exit.unlocked,
            color: if exit.unlocked {
                palette.exit_unlocked
            } else {
                palette.exit_locked
            },
        };

        Ok(Self::new(
            tile_grid,
            walls,
            player,
            enemies,
            collectibles,
            exit,
            hud,
        ))
    }

    /// Renders the scene as text: a HUD line followed by one line per row.
    ///
    /// Glyphs: `#` wall, `X` unlocked exit, `x` locked exit, `C` collectible,
    /// `@` player, and `E`, `!`, `e` for patrolling, chasing and returning
    /// enemies. Actors are placed on the tile under their centre and drawn over
    /// static content.
    #[must_use]
    pub fn text_frame(&self) -> String {
        let columns = self.tile_grid.columns as usize;
        let rows = self.tile_grid.rows as usize;
        let mut cells = vec![vec![' '; columns]; rows];
        let mut put = |tile: TileCoord, glyph: char| {
            let (Ok(column), Ok(row)) =
                (usize::try_from(tile.column()), usize::try_from(tile.row()))
            else {
                return;
            };
            if let Some(cell) = cells.get_mut(row).and_then(|line| line.get_mut(column)) {
                *cell = glyph;
            }
        };

        for tile in &self.walls.tiles {
            put(*tile, '#');
        }
        put(self.exit.tile, if self.exit.unlocked { 'X' } else { 'x' });
        for item in &self.collectibles {
            put(item.tile, 'C');
        }
        for enemy in &self.enemies {
            if let Some(tile) = self.tile_grid.tile_at(enemy.body.center) {
                put(tile, enemy_glyph(enemy.state));
            }
        }
        if let Some(tile) = self.tile_grid.tile_at(self.player.center) {
            put(tile, '@');
        }

        let mut frame = self.hud.status_line();
        for line in cells {
            frame.push('\n');
            frame.extend(line);
        }
        frame
    }
}

fn enemy_glyph(state: EnemyState) -> char {
    match state {
        EnemyState::Patrol => 'E',
        EnemyState::Chase => '!',
        EnemyState::Return => 'e',
    }
}

fn to_vec(point: PixelPoint) -> Vec2 {
    Vec2::new(point.x, point.y)
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

/// Rendering backend capable of presenting Maze Escape scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until `update_scene` breaks the loop.
    ///
    /// The provided `update_scene` closure receives the simulated frame delta
    /// and may mutate the scene before it is rendered, allowing adapters to
    /// animate world snapshots deterministically.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, &mut Scene) -> ControlFlow<()>;
}

/// Headless backend that writes text frames to any output stream.
#[derive(Debug)]
pub struct TextBackend<W> {
    out: W,
    frame_delta: Duration,
    render_every: u64,
}

impl<W: Write> TextBackend<W> {
    /// Creates a backend that advances by `frame_delta` per frame and prints
    /// every `render_every`-th frame as well as the final one.
    ///
    /// A `render_every` of zero prints only the final frame.
    #[must_use]
    pub fn new(out: W, frame_delta: Duration, render_every: u64) -> Self {
        Self {
            out,
            frame_delta,
            render_every,
        }
    }

    fn print(&mut self, frame: u64, scene: &Scene) -> AnyResult<()> {
        writeln!(self.out, "-- frame {frame}\n{}", scene.text_frame())
            .context("failed to write text frame")
    }
}

impl<W: Write> RenderingBackend for TextBackend<W> {
    fn run<F>(mut self, presentation: Presentation, mut update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, &mut Scene) -> ControlFlow<()>,
    {
        let mut scene = presentation.scene;
        writeln!(self.out, "{}", presentation.window_title)
            .context("failed to write window title")?;

        let mut frame = 0_u64;
        loop {
            frame += 1;
            let flow = update_scene(self.frame_delta, &mut scene);
            if flow.is_break() {
                self.print(frame, &scene)?;
                break;
            }
            if self.render_every > 0 && frame % self.render_every == 0 {
                self.print(frame, &scene)?;
            }
        }

        self.out.flush().context("failed to flush text frames")
    }
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// Tile size must be positive to avoid a zero-sized grid.
    InvalidTileSize {
        /// Provided tile size that failed validation.
        tile_size: u32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTileSize { tile_size } => {
                write!(f, "tile_size must be positive (received {tile_size})")
            }
        }
    }
}

impl Error for RenderingError {}
