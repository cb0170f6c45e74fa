#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic enemy state machine that decides how each enemy behaves and moves.
//!
//! Every tick each enemy first re-evaluates its behavioural state from what it
//! can sense, then, when its move timer allows, plans a single tile step. Both
//! halves are pure functions of immutable snapshots plus an injected random
//! source, so replays with the same seed reproduce the same decisions.

use maze_escape_core::{
    Command, Direction, EnemyBehavior, EnemyId, EnemySnapshot, EnemyState, EnemyTuning,
    EnemyView, Event, PlannedStep, PlayerSnapshot, TileCoord, VisitView, WallView,
};
use maze_escape_system_sight::has_line_of_sight;
use rand::{seq::SliceRandom, Rng};

/// Fallback order tried when both greedy axes are blocked.
const FALLBACK_ORDER: [Direction; 4] = [
    Direction::East,
    Direction::West,
    Direction::South,
    Direction::North,
];

/// What an enemy perceives of the player on a given tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Senses {
    /// Tile containing the player's current pixel position.
    pub player_tile: TileCoord,
    /// Pixel distance between the enemy and the player.
    pub distance: f32,
    /// Whether the enemy's tile has an unobstructed view of the player's tile.
    pub line_of_sight: bool,
}

/// Decision produced for one enemy on one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Thought {
    /// Behaviour the enemy adopts this tick.
    pub behavior: EnemyBehavior,
    /// Step to attempt, present only when a move is due and an option exists.
    pub step: Option<PlannedStep>,
}

/// Gathers the enemy's perception of the player.
#[must_use]
pub fn sense(
    enemy: &EnemySnapshot,
    player: &PlayerSnapshot,
    walls: WallView<'_>,
    tile_size: u32,
) -> Senses {
    let player_tile = player.body.position.tile(tile_size);
    Senses {
        player_tile,
        distance: enemy.body.position.distance_to(player.body.position),
        line_of_sight: has_line_of_sight(enemy.body.tile, player_tile, walls),
    }
}

/// Evaluates the behavioural state machine for a single tick.
///
/// The chase cooldown is never clamped; it may dip below zero on the tick the
/// enemy gives up.
#[must_use]
pub fn transition(enemy: &EnemySnapshot, senses: &Senses, tuning: &EnemyTuning) -> EnemyBehavior {
    let mut behavior = enemy.behavior;
    let spotted = senses.distance < tuning.chase_radius && senses.line_of_sight;

    match behavior.state {
        EnemyState::Patrol => {
            if spotted {
                behavior.state = EnemyState::Chase;
                behavior.last_known_player = Some(senses.player_tile);
                behavior.chase_cooldown = tuning.chase_cooldown_ticks;
                behavior.stuck_counter = 0;
            }
        }
        EnemyState::Chase => {
            if spotted {
                behavior.last_known_player = Some(senses.player_tile);
                behavior.chase_cooldown = tuning.chase_cooldown_ticks;
                behavior.stuck_counter = 0;
            } else {
                if !senses.line_of_sight {
                    behavior.chase_cooldown = behavior.chase_cooldown.saturating_sub(2);
                }
                if senses.distance > tuning.lose_radius {
                    behavior.chase_cooldown = behavior.chase_cooldown.saturating_sub(2);
                }
            }

            if behavior.chase_cooldown <= 0 || behavior.stuck_counter > tuning.stuck_limit {
                behavior.state = EnemyState::Return;
                behavior.stuck_counter = 0;
            } else {
                behavior.chase_cooldown -= 1;
            }
        }
        EnemyState::Return => {
            if enemy.body.tile == enemy.start {
                behavior.state = EnemyState::Patrol;
                behavior.stuck_counter = 0;
            }
        }
    }

    behavior
}

/// Chooses the step an enemy attempts under `behavior`.
///
/// `is_blocked` reports whether the enemy's body may not enter a tile. The
/// random source is only consulted to break patrol ties, to shuffle the
/// patrol fallback, and to pick a perpendicular sign when the target is
/// exactly aligned.
pub fn plan_step<R, F>(
    enemy: &EnemySnapshot,
    behavior: &EnemyBehavior,
    visits: VisitView<'_>,
    is_blocked: F,
    rng: &mut R,
) -> Option<PlannedStep>
where
    R: Rng + ?Sized,
    F: Fn(TileCoord) -> bool,
{
    let origin = enemy.body.tile;
    match behavior.state {
        EnemyState::Patrol => patrol_step(origin, enemy.last_move, visits, &is_blocked, rng),
        EnemyState::Chase => {
            let target = behavior.last_known_player?;
            greedy_step(origin, target, &is_blocked, rng).map(|(direction, primary)| {
                PlannedStep {
                    direction,
                    remember: primary,
                }
            })
        }
        EnemyState::Return => {
            greedy_step(origin, enemy.start, &is_blocked, rng).map(|(direction, _)| {
                PlannedStep {
                    direction,
                    remember: None,
                }
            })
        }
    }
}

/// Runs the full per-tick decision for one enemy.
pub fn think<R, F>(
    enemy: &EnemySnapshot,
    senses: &Senses,
    visits: VisitView<'_>,
    is_blocked: F,
    tuning: &EnemyTuning,
    rng: &mut R,
) -> Thought
where
    R: Rng + ?Sized,
    F: Fn(TileCoord) -> bool,
{
    let behavior = transition(enemy, senses, tuning);
    let step = if enemy.step_due {
        plan_step(enemy, &behavior, visits, is_blocked, rng)
    } else {
        None
    };
    Thought { behavior, step }
}

fn patrol_step<R, F>(
    origin: TileCoord,
    last_move: Option<Direction>,
    visits: VisitView<'_>,
    is_blocked: &F,
    rng: &mut R,
) -> Option<PlannedStep>
where
    R: Rng + ?Sized,
    F: Fn(TileCoord) -> bool,
{
    let reverse = last_move.map(Direction::reverse);
    let candidates: Vec<(u32, Direction)> = Direction::ALL
        .into_iter()
        .filter(|direction| Some(*direction) != reverse)
        .map(|direction| (direction, origin.step(direction)))
        .filter(|(_, tile)| !is_blocked(*tile))
        .map(|(direction, tile)| (visits.count(tile), direction))
        .collect();

    let chosen = match candidates.iter().map(|(count, _)| *count).min() {
        Some(fewest) => {
            let least_visited: Vec<Direction> = candidates
                .iter()
                .filter(|(count, _)| *count == fewest)
                .map(|(_, direction)| *direction)
                .collect();
            least_visited.choose(rng).copied()
        }
        None => {
            let mut directions = Direction::ALL;
            directions.shuffle(rng);
            directions
                .into_iter()
                .find(|direction| !is_blocked(origin.step(*direction)))
        }
    }?;

    Some(PlannedStep {
        direction: chosen,
        remember: Some(chosen),
    })
}

/// Greedy single-axis step toward `target`.
///
/// Returns the direction to take together with the primary greedy direction,
/// which is `None` when the enemy already stands on the target.
fn greedy_step<R, F>(
    origin: TileCoord,
    target: TileCoord,
    is_blocked: &F,
    rng: &mut R,
) -> Option<(Direction, Option<Direction>)>
where
    R: Rng + ?Sized,
    F: Fn(TileCoord) -> bool,
{
    let (dx, dy) = origin.offset_to(target);
    let open = |direction: Direction| !is_blocked(origin.step(direction));

    let primary = if dx.abs() >= dy.abs() {
        Direction::horizontal(dx)
    } else {
        Direction::vertical(dy)
    };

    if let Some(direction) = primary {
        if open(direction) {
            return Some((direction, primary));
        }

        let perpendicular = if direction.is_horizontal() {
            Direction::vertical(dy)
                .unwrap_or_else(|| random_sign(rng, Direction::South, Direction::North))
        } else {
            Direction::horizontal(dx)
                .unwrap_or_else(|| random_sign(rng, Direction::East, Direction::West))
        };
        if open(perpendicular) {
            return Some((perpendicular, primary));
        }
    }

    FALLBACK_ORDER
        .into_iter()
        .find(|direction| open(*direction))
        .map(|direction| (direction, primary))
}

fn random_sign<R>(rng: &mut R, positive: Direction, negative: Direction) -> Direction
where
    R: Rng + ?Sized,
{
    if rng.gen_bool(0.5) {
        positive
    } else {
        negative
    }
}

/// Pure system that turns each tick into one drive command per enemy.
#[derive(Debug)]
pub struct EnemyAi {
    tuning: EnemyTuning,
    tile_size: u32,
}

impl EnemyAi {
    /// Creates the system for enemies tuned by `tuning` on tiles of `tile_size` pixels.
    #[must_use]
    pub fn new(tuning: EnemyTuning, tile_size: u32) -> Self {
        Self { tuning, tile_size }
    }

    /// Consumes world events and immutable views to emit enemy drive commands.
    ///
    /// Commands are only produced in response to [`Event::TimeAdvanced`], in
    /// ascending enemy id order.
    #[allow(clippy::too_many_arguments)]
    pub fn handle<'v, R, V, F>(
        &self,
        events: &[Event],
        player: &PlayerSnapshot,
        enemies: &EnemyView,
        walls: WallView<'_>,
        visits: V,
        is_blocked: F,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) where
        R: Rng + ?Sized,
        V: Fn(EnemyId) -> Option<VisitView<'v>>,
        F: Fn(TileCoord, u32) -> bool,
    {
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        for enemy in enemies.iter() {
            let senses = sense(enemy, player, walls, self.tile_size);
            let memory = visits(enemy.id).unwrap_or_else(|| VisitView::new(&[], 0, 0));
            let size = enemy.body.size;
            let thought = think(
                enemy,
                &senses,
                memory,
                |tile| is_blocked(tile, size),
                &self.tuning,
                rng,
            );
            out.push(Command::DriveEnemy {
                enemy_id: enemy.id,
                behavior: thought.behavior,
                step: thought.step,
            });
        }
    }
}
