#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Maze Escape engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Maze Escape.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the player's pending move intent for the upcoming tick.
    ///
    /// Intents are only accepted while the player is idle; `None` clears it.
    SetPlayerIntent {
        /// Direction the player wishes to step in, if any.
        direction: Option<Direction>,
    },
    /// Advances the player and collectible animations by a single tick.
    Tick,
    /// Applies the enemy AI's decision for the current tick to one enemy.
    DriveEnemy {
        /// Identifier of the enemy being driven.
        enemy_id: EnemyId,
        /// Behaviour record the AI computed for this tick.
        behavior: EnemyBehavior,
        /// Step the enemy should attempt if a move is due this tick.
        step: Option<PlannedStep>,
    },
    /// Marks a collectible as picked up by the player.
    CollectItem {
        /// Identifier of the collectible that was touched.
        collectible: CollectibleId,
    },
    /// Ends the level with the provided outcome.
    ConcludeLevel {
        /// Result reported to presentation collaborators.
        outcome: Outcome,
    },
    /// Restores every actor and collectible to its initial state.
    ResetLevel,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced by one tick.
    TimeAdvanced {
        /// Index of the tick that just started, counted from one.
        tick: u64,
    },
    /// Confirms that the player committed a move between two tiles.
    PlayerAdvanced {
        /// Tile the player occupied before the commit.
        from: TileCoord,
        /// Tile the player occupies after the commit.
        to: TileCoord,
    },
    /// Reports that the player's pending intent pointed into a wall.
    PlayerBlocked {
        /// Direction that could not be taken.
        direction: Direction,
    },
    /// Announces that an enemy switched behavioural state.
    EnemyStateChanged {
        /// Identifier of the enemy.
        enemy_id: EnemyId,
        /// State the enemy left.
        from: EnemyState,
        /// State the enemy entered.
        to: EnemyState,
    },
    /// Confirms that an enemy committed a move between two tiles.
    EnemyAdvanced {
        /// Identifier of the enemy that advanced.
        enemy_id: EnemyId,
        /// Tile the enemy occupied before the commit.
        from: TileCoord,
        /// Tile the enemy occupies after the commit.
        to: TileCoord,
    },
    /// Reports that a due enemy move found every option blocked.
    EnemyStalled {
        /// Identifier of the enemy that failed to move.
        enemy_id: EnemyId,
        /// Consecutive failed move attempts after this one.
        stuck_counter: u32,
    },
    /// Confirms that the player picked up a collectible.
    ItemCollected {
        /// Identifier of the collectible.
        collectible: CollectibleId,
        /// Number of collectibles still waiting to be picked up.
        remaining: usize,
    },
    /// Announces that every collectible was gathered and the exit opened.
    ExitUnlocked,
    /// Reports that the player reached the unlocked exit.
    LevelWon,
    /// Reports that the player lost the level.
    LevelLost {
        /// Why the level was lost.
        reason: LoseReason,
    },
    /// Confirms that the level returned to its initial state.
    LevelReset,
}

/// Cardinal movement directions available to actors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in the order patrolling enemies evaluate them.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Column and row offset produced by a single step in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Horizontal direction matching the sign of `offset`, if it is non-zero.
    #[must_use]
    pub const fn horizontal(offset: i32) -> Option<Self> {
        if offset > 0 {
            Some(Self::East)
        } else if offset < 0 {
            Some(Self::West)
        } else {
            None
        }
    }

    /// Vertical direction matching the sign of `offset`, if it is non-zero.
    #[must_use]
    pub const fn vertical(offset: i32) -> Option<Self> {
        if offset > 0 {
            Some(Self::South)
        } else if offset < 0 {
            Some(Self::North)
        } else {
            None
        }
    }

    /// Reports whether the direction moves along the column axis.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::East | Self::West)
    }
}

/// Location of a single maze tile expressed as column and row coordinates.
///
/// Coordinates are signed so that neighbour arithmetic never wraps; tiles
/// outside the maze simply fail bounds checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    column: i32,
    row: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Tile reached by a single step in `direction`.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (column_delta, row_delta) = direction.delta();
        Self {
            column: self.column.saturating_add(column_delta),
            row: self.row.saturating_add(row_delta),
        }
    }

    /// Column and row offset from `self` to `other`.
    #[must_use]
    pub const fn offset_to(self, other: TileCoord) -> (i32, i32) {
        (
            other.column.saturating_sub(self.column),
            other.row.saturating_sub(self.row),
        )
    }

    /// Pixel-space centre of the tile for the provided tile size.
    ///
    /// The half-tile offset uses integer division so odd tile sizes land on
    /// the same pixel the movement model commits to.
    #[must_use]
    pub fn center(self, tile_size: u32) -> PixelPoint {
        let size = i64::from(tile_size);
        let half = size / 2;
        PixelPoint::new(
            (i64::from(self.column) * size + half) as f32,
            (i64::from(self.row) * size + half) as f32,
        )
    }
}

/// Position expressed in pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    /// Horizontal coordinate in pixels.
    pub x: f32,
    /// Vertical coordinate in pixels.
    pub y: f32,
}

impl PixelPoint {
    /// Creates a new pixel position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two pixel positions.
    #[must_use]
    pub fn distance_to(self, other: PixelPoint) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Tile containing the position, using floor division by the tile size.
    ///
    /// A zero tile size maps every position onto the origin tile.
    #[must_use]
    pub fn tile(self, tile_size: u32) -> TileCoord {
        if tile_size == 0 {
            return TileCoord::new(0, 0);
        }
        let size = tile_size as f32;
        TileCoord::new((self.x / size).floor() as i32, (self.y / size).floor() as i32)
    }
}

/// Axis-aligned square hitbox centred on an actor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hitbox {
    left: f32,
    top: f32,
    size: f32,
}

impl Hitbox {
    /// Creates a `size × size` hitbox centred on `center`.
    ///
    /// The half extent uses integer division of `size`, matching the way tile
    /// centres are computed.
    #[must_use]
    pub fn centered(center: PixelPoint, size: u32) -> Self {
        let half = (size / 2) as f32;
        Self {
            left: center.x - half,
            top: center.y - half,
            size: size as f32,
        }
    }

    /// Creates a hitbox covering a whole tile.
    #[must_use]
    pub fn tile(tile: TileCoord, tile_size: u32) -> Self {
        let size = tile_size as f32;
        Self {
            left: tile.column() as f32 * size,
            top: tile.row() as f32 * size,
            size,
        }
    }

    /// Left edge in pixels.
    #[must_use]
    pub const fn left(&self) -> f32 {
        self.left
    }

    /// Top edge in pixels.
    #[must_use]
    pub const fn top(&self) -> f32 {
        self.top
    }

    /// Side length in pixels.
    #[must_use]
    pub const fn size(&self) -> f32 {
        self.size
    }

    /// Reports whether two hitboxes share interior area.
    ///
    /// Boxes that merely touch along an edge do not overlap, and empty boxes
    /// never overlap anything.
    #[must_use]
    pub fn overlaps(&self, other: &Hitbox) -> bool {
        if self.size <= 0.0 || other.size <= 0.0 {
            return false;
        }
        self.left < other.left + other.size
            && other.left < self.left + self.size
            && self.top < other.top + other.size
            && other.top < self.top + self.size
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a collectible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollectibleId(u32);

impl CollectibleId {
    /// Creates a new collectible identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Behavioural state of an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EnemyState {
    /// Wanders the maze preferring rarely visited tiles.
    #[default]
    Patrol,
    /// Pursues the last tile the player was seen on.
    Chase,
    /// Heads back to the start tile after losing the player.
    Return,
}

/// Part of an enemy the AI rewrites every tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EnemyBehavior {
    /// Current behavioural state.
    pub state: EnemyState,
    /// Tile the player was last seen on while chasing.
    pub last_known_player: Option<TileCoord>,
    /// Ticks left before a chase is abandoned; may dip below zero.
    pub chase_cooldown: i32,
    /// Consecutive due moves that found every option blocked.
    pub stuck_counter: u32,
}

impl EnemyBehavior {
    /// Behaviour every enemy starts with and returns to on reset.
    #[must_use]
    pub const fn patrolling() -> Self {
        Self {
            state: EnemyState::Patrol,
            last_known_player: None,
            chase_cooldown: 0,
            stuck_counter: 0,
        }
    }
}

impl Default for EnemyBehavior {
    fn default() -> Self {
        Self::patrolling()
    }
}

/// Single-tile move chosen by the enemy AI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlannedStep {
    /// Direction of the step to commit.
    pub direction: Direction,
    /// Direction recorded as the enemy's last move if the commit succeeds.
    pub remember: Option<Direction>,
}

/// Why a level was lost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoseReason {
    /// An enemy's hitbox overlapped the player.
    CaughtByEnemy,
    /// The external level timer ran out.
    TimeUp,
}

impl LoseReason {
    /// Human readable message shown by presentation layers.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::CaughtByEnemy => "Caught by enemy!",
            Self::TimeUp => "Time's up!",
        }
    }
}

/// Final result of a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The player reached the unlocked exit.
    Won,
    /// The player lost for the provided reason.
    Lost(LoseReason),
}

/// Immutable representation of an actor's body used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorSnapshot {
    /// Tile the actor occupies; updated at commit time.
    pub tile: TileCoord,
    /// Current interpolated pixel position.
    pub position: PixelPoint,
    /// Pixel position the actor is moving toward.
    pub target: PixelPoint,
    /// Side length of the actor's square hitbox in pixels.
    pub size: u32,
    /// Maximum pixels travelled per axis per tick.
    pub speed: f32,
    /// Indicates whether an interpolation is in flight.
    pub moving: bool,
}

impl ActorSnapshot {
    /// Hitbox centred on the actor's current pixel position.
    #[must_use]
    pub fn hitbox(&self) -> Hitbox {
        Hitbox::centered(self.position, self.size)
    }
}

/// Immutable representation of the player used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Tile the player spawned on.
    pub start: TileCoord,
    /// Movement state of the player.
    pub body: ActorSnapshot,
    /// Intent waiting to be consumed on the next tick.
    pub pending_intent: Option<Direction>,
}

/// Immutable representation of a single enemy used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Tile the enemy spawned on and returns to.
    pub start: TileCoord,
    /// Movement state of the enemy.
    pub body: ActorSnapshot,
    /// Behaviour the AI computed on the previous tick.
    pub behavior: EnemyBehavior,
    /// Direction of the last remembered successful move.
    pub last_move: Option<Direction>,
    /// Indicates whether a move attempt happens on the next drive.
    pub step_due: bool,
}

/// Read-only snapshot describing all enemies within the maze.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single collectible used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollectibleSnapshot {
    /// Unique identifier assigned to the collectible.
    pub id: CollectibleId,
    /// Tile the collectible rests on.
    pub tile: TileCoord,
    /// Pixel centre of the collectible.
    pub position: PixelPoint,
    /// Side length of the collectible's hitbox in pixels.
    pub size: u32,
    /// Indicates whether the player already picked it up.
    pub collected: bool,
    /// Floating animation phase in radians.
    pub animation_phase: f32,
}

impl CollectibleSnapshot {
    /// Hitbox centred on the collectible.
    #[must_use]
    pub fn hitbox(&self) -> Hitbox {
        Hitbox::centered(self.position, self.size)
    }
}

/// Read-only snapshot describing all collectibles within the maze.
#[derive(Clone, Debug, Default)]
pub struct CollectibleView {
    snapshots: Vec<CollectibleSnapshot>,
}

impl CollectibleView {
    /// Creates a new collectible view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<CollectibleSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured collectible snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &CollectibleSnapshot> {
        self.snapshots.iter()
    }

    /// Number of collectibles that have been picked up.
    #[must_use]
    pub fn collected_count(&self) -> usize {
        self.snapshots
            .iter()
            .filter(|snapshot| snapshot.collected)
            .count()
    }

    /// Total number of collectibles in the maze.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the maze has no collectibles at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Immutable representation of the maze exit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExitSnapshot {
    /// Tile holding the exit.
    pub tile: TileCoord,
    /// Hitbox covering the exit tile.
    pub hitbox: Hitbox,
    /// Indicates whether every collectible has been gathered.
    pub unlocked: bool,
}

/// Read-only view into the dense wall grid.
#[derive(Clone, Copy, Debug)]
pub struct WallView<'a> {
    cells: &'a [bool],
    columns: u32,
    rows: u32,
}

impl<'a> WallView<'a> {
    /// Captures a new wall view backed by the provided row-major cell slice.
    #[must_use]
    pub fn new(cells: &'a [bool], columns: u32, rows: u32) -> Self {
        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Reports whether the tile holds a wall; tiles outside the grid do not.
    #[must_use]
    pub fn is_wall(&self, tile: TileCoord) -> bool {
        grid_index(tile, self.columns, self.rows)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(false)
    }

    /// Iterator over every wall tile in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = TileCoord> + 'a {
        let columns = self.columns.max(1);
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, wall)| **wall)
            .map(move |(index, _)| {
                let index = index as u64;
                let columns = u64::from(columns);
                TileCoord::new((index % columns) as i32, (index / columns) as i32)
            })
    }

    /// Provides the dimensions of the underlying wall grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }
}

/// Read-only view into an enemy's dense visit-count grid.
#[derive(Clone, Copy, Debug)]
pub struct VisitView<'a> {
    counts: &'a [u32],
    columns: u32,
    rows: u32,
}

impl<'a> VisitView<'a> {
    /// Captures a new visit view backed by the provided row-major counts.
    #[must_use]
    pub fn new(counts: &'a [u32], columns: u32, rows: u32) -> Self {
        Self {
            counts,
            columns,
            rows,
        }
    }

    /// Number of recorded arrivals on the tile; zero outside the grid.
    #[must_use]
    pub fn count(&self, tile: TileCoord) -> u32 {
        grid_index(tile, self.columns, self.rows)
            .and_then(|index| self.counts.get(index).copied())
            .unwrap_or(0)
    }

    /// Sum of every recorded arrival.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|count| u64::from(*count)).sum()
    }
}

/// Row-major index of `tile` inside a `columns × rows` grid.
///
/// Returns `None` for tiles outside the grid.
#[must_use]
pub fn grid_index(tile: TileCoord, columns: u32, rows: u32) -> Option<usize> {
    let column = u32::try_from(tile.column()).ok()?;
    let row = u32::try_from(tile.row()).ok()?;
    if column >= columns || row >= rows {
        return None;
    }
    let width = usize::try_from(columns).ok()?;
    let row = usize::try_from(row).ok()?;
    let column = usize::try_from(column).ok()?;
    row.checked_mul(width)?.checked_add(column)
}

/// Tuning shared by every actor kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorTuning {
    /// Side length of the actor's square hitbox in pixels.
    pub size: u32,
    /// Maximum pixels travelled per axis per tick.
    pub speed: f32,
}

/// Enemy tuning knobs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    /// Side length of the enemy's square hitbox in pixels.
    pub size: u32,
    /// Maximum pixels travelled per axis per tick.
    pub speed: f32,
    /// Pixel distance under which a visible player triggers a chase.
    pub chase_radius: f32,
    /// Pixel distance beyond which a chase decays faster.
    pub lose_radius: f32,
    /// Cooldown assigned when the player is spotted.
    pub chase_cooldown_ticks: i32,
    /// Failed moves tolerated before a chase is abandoned.
    pub stuck_limit: u32,
    /// Idle ticks an enemy waits between moves.
    pub move_delay_ticks: u32,
}

/// Collectible tuning knobs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectibleTuning {
    /// Side length of the collectible's hitbox in pixels.
    pub size: u32,
    /// Radians added to the floating animation phase per tick.
    pub animation_speed: f32,
}

/// Complete gameplay configuration consumed by the world and systems.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Side length of a maze tile in pixels.
    pub tile_size: u32,
    /// Player tuning.
    pub player: ActorTuning,
    /// Enemy tuning.
    pub enemy: EnemyTuning,
    /// Collectible tuning.
    pub collectible: CollectibleTuning,
}

impl Default for ActorTuning {
    fn default() -> Self {
        Self {
            size: 30,
            speed: 5.0,
        }
    }
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            size: 30,
            speed: 5.0,
            chase_radius: 200.0,
            lose_radius: 300.0,
            chase_cooldown_ticks: 180,
            stuck_limit: 6,
            move_delay_ticks: 20,
        }
    }
}

impl Default for CollectibleTuning {
    fn default() -> Self {
        Self {
            size: 20,
            animation_speed: 0.1,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tile_size: 40,
            player: ActorTuning::default(),
            enemy: EnemyTuning::default(),
            collectible: CollectibleTuning::default(),
        }
    }
}
