#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Maze Escape.

mod collectible;
mod enemy;
mod grid;
mod layout;
mod motion;
mod visits;

use log::{info, warn};
use maze_escape_core::{
    CollectibleId, Command, Direction, EnemyId, Event, GameConfig, Outcome, TileCoord,
    WELCOME_BANNER,
};

pub use layout::{LayoutError, MazeLayout, TileCode};

use collectible::Collectible;
use enemy::Enemy;
use grid::GridWorld;
use motion::Actor;

#[derive(Clone, Debug)]
struct Player {
    start: TileCoord,
    body: Actor,
    pending_intent: Option<Direction>,
}

impl Player {
    fn reset(&mut self, grid: &GridWorld) {
        self.body.place(self.start, grid);
        self.pending_intent = None;
    }

    /// Consumes the pending intent when idle, otherwise keeps interpolating.
    fn advance(&mut self, grid: &GridWorld, out_events: &mut Vec<Event>) {
        if self.body.is_moving() {
            let _ = self.body.interpolate();
            return;
        }

        let Some(direction) = self.pending_intent.take() else {
            return;
        };
        let from = self.body.tile();
        match self.body.try_commit(direction, grid) {
            Some(to) => out_events.push(Event::PlayerAdvanced { from, to }),
            None => out_events.push(Event::PlayerBlocked { direction }),
        }
    }
}

/// Represents the authoritative Maze Escape world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: GameConfig,
    grid: GridWorld,
    player: Player,
    enemies: Vec<Enemy>,
    collectibles: Vec<Collectible>,
    exit_unlocked: bool,
    outcome: Option<Outcome>,
    tick_index: u64,
}

impl World {
    /// Creates a world populated from `layout` and tuned by `config`.
    ///
    /// Enemies and collectibles are numbered in row-major order of their
    /// layout tiles. The exit starts unlocked when the layout holds no
    /// collectibles.
    pub fn new(layout: &MazeLayout, config: GameConfig) -> Result<Self, LayoutError> {
        if config.tile_size == 0 {
            return Err(LayoutError::InvalidTileSize);
        }
        for (actor, speed) in [("player", config.player.speed), ("enemy", config.enemy.speed)] {
            if !speed.is_finite() || speed <= 0.0 {
                return Err(LayoutError::InvalidSpeed { actor });
            }
        }

        let grid = GridWorld::from_layout(layout, config.tile_size);

        let player_start = layout.player_start();
        if grid.is_blocked(player_start, config.player.size) {
            return Err(LayoutError::SpawnBlocked {
                actor: "player",
                tile: player_start,
            });
        }

        let mut enemies = Vec::new();
        for (index, tile) in layout.tiles_with(TileCode::EnemyStart).enumerate() {
            if grid.is_blocked(tile, config.enemy.size) {
                return Err(LayoutError::SpawnBlocked {
                    actor: "enemy",
                    tile,
                });
            }
            enemies.push(Enemy::spawn(
                EnemyId::new(index as u32),
                tile,
                &config.enemy,
                &grid,
            ));
        }

        let collectibles: Vec<Collectible> = layout
            .tiles_with(TileCode::Collectible)
            .enumerate()
            .map(|(index, tile)| {
                Collectible::spawn(
                    CollectibleId::new(index as u32),
                    tile,
                    &config.collectible,
                    &grid,
                )
            })
            .collect();

        let player = Player {
            start: player_start,
            body: Actor::spawn(player_start, config.player.size, config.player.speed, &grid),
            pending_intent: None,
        };

        Ok(Self {
            banner: WELCOME_BANNER,
            config,
            exit_unlocked: collectibles.is_empty(),
            grid,
            player,
            enemies,
            collectibles,
            outcome: None,
            tick_index: 0,
        })
    }

    fn collectible_mut(&mut self, id: CollectibleId) -> Option<&mut Collectible> {
        self.collectibles.iter_mut().find(|item| item.id() == id)
    }

    fn remaining_collectibles(&self) -> usize {
        self.collectibles
            .iter()
            .filter(|item| !item.is_collected())
            .count()
    }

    fn reset(&mut self) {
        self.player.reset(&self.grid);
        for enemy in &mut self.enemies {
            enemy.reset(&self.grid);
        }
        for item in &mut self.collectibles {
            item.reset();
        }
        self.exit_unlocked = self.collectibles.is_empty();
        self.outcome = None;
        self.tick_index = 0;
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Once the level has concluded every command other than
/// [`Command::ResetLevel`] is ignored.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.outcome.is_some() && command != Command::ResetLevel {
        warn!("ignoring {command:?} after the level concluded");
        return;
    }

    match command {
        Command::SetPlayerIntent { direction } => {
            if world.player.body.is_moving() {
                return;
            }
            world.player.pending_intent = direction;
        }
        Command::Tick => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced {
                tick: world.tick_index,
            });

            world.player.advance(&world.grid, out_events);
            for item in &mut world.collectibles {
                item.animate();
            }
        }
        Command::DriveEnemy {
            enemy_id,
            behavior,
            step,
        } => {
            let World { grid, enemies, .. } = world;
            match enemies.iter_mut().find(|enemy| enemy.id() == enemy_id) {
                Some(enemy) => enemy.drive(behavior, step, grid, out_events),
                None => warn!("ignoring drive for unknown enemy {}", enemy_id.get()),
            }
        }
        Command::CollectItem { collectible } => {
            let Some(item) = world.collectible_mut(collectible) else {
                warn!("ignoring pickup of unknown collectible {}", collectible.get());
                return;
            };
            if !item.collect() {
                return;
            }

            let remaining = world.remaining_collectibles();
            out_events.push(Event::ItemCollected {
                collectible,
                remaining,
            });
            if remaining == 0 && !world.exit_unlocked {
                world.exit_unlocked = true;
                info!("every collectible gathered, exit unlocked");
                out_events.push(Event::ExitUnlocked);
            }
        }
        Command::ConcludeLevel { outcome } => {
            world.outcome = Some(outcome);
            match outcome {
                Outcome::Won => {
                    info!("level won after {} ticks", world.tick_index);
                    out_events.push(Event::LevelWon);
                }
                Outcome::Lost(reason) => {
                    info!(
                        "level lost after {} ticks: {}",
                        world.tick_index,
                        reason.message()
                    );
                    out_events.push(Event::LevelLost { reason });
                }
            }
        }
        Command::ResetLevel => {
            world.reset();
            out_events.push(Event::LevelReset);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use maze_escape_core::{
        CollectibleView, EnemyId, EnemyView, ExitSnapshot, GameConfig, Hitbox, Outcome,
        PlayerSnapshot, TileCoord, VisitView, WallView,
    };

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Configuration the world was built with.
    #[must_use]
    pub fn config(world: &World) -> &GameConfig {
        &world.config
    }

    /// Side length of a tile in pixels.
    #[must_use]
    pub fn tile_size(world: &World) -> u32 {
        world.grid.tile_size()
    }

    /// Number of tile columns and rows in the maze.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        (world.grid.columns(), world.grid.rows())
    }

    /// Exposes a read-only view of the dense wall grid.
    #[must_use]
    pub fn wall_view(world: &World) -> WallView<'_> {
        world.grid.wall_view()
    }

    /// Reports whether an actor of `size` pixels may not stand on `tile`.
    #[must_use]
    pub fn is_tile_blocked(world: &World, tile: TileCoord, size: u32) -> bool {
        world.grid.is_blocked(tile, size)
    }

    /// Captures the player's current state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            start: world.player.start,
            body: world.player.body.snapshot(),
            pending_intent: world.player.pending_intent,
        }
    }

    /// Captures a read-only view of the enemies inhabiting the maze.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter().map(|enemy| enemy.snapshot()).collect())
    }

    /// Exposes the patrol memory of a single enemy.
    #[must_use]
    pub fn visit_view(world: &World, enemy_id: EnemyId) -> Option<VisitView<'_>> {
        world
            .enemies
            .iter()
            .find(|enemy| enemy.id() == enemy_id)
            .map(|enemy| enemy.visits())
    }

    /// Captures a read-only view of every collectible.
    #[must_use]
    pub fn collectible_view(world: &World) -> CollectibleView {
        CollectibleView::from_snapshots(
            world
                .collectibles
                .iter()
                .map(|item| item.snapshot())
                .collect(),
        )
    }

    /// Describes the exit and whether it accepts the player yet.
    #[must_use]
    pub fn exit(world: &World) -> ExitSnapshot {
        let tile = world.grid.exit();
        ExitSnapshot {
            tile,
            hitbox: Hitbox::tile(tile, world.grid.tile_size()),
            unlocked: world.exit_unlocked,
        }
    }

    /// Result of the level once it has concluded.
    #[must_use]
    pub fn outcome(world: &World) -> Option<Outcome> {
        world.outcome
    }

    /// Number of ticks simulated since the level started or was reset.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_escape_core::{
        ActorTuning, EnemyBehavior, EnemyState, LoseReason, PixelPoint, PlannedStep,
    };

    fn world(text: &str) -> World {
        let layout: MazeLayout = text.parse().expect("valid layout");
        World::new(&layout, GameConfig::default()).expect("valid world")
    }

    fn tick_until_idle(world: &mut World, events: &mut Vec<Event>) {
        apply(world, Command::Tick, events);
        while query::player(world).body.moving {
            apply(world, Command::Tick, events);
        }
    }

    #[test]
    fn new_world_exposes_layout() {
        let world = world("#####\n#P.C#\n#E.X#\n#####");

        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
        assert_eq!(query::dimensions(&world), (5, 4));
        assert_eq!(query::tile_size(&world), 40);
        assert_eq!(query::player(&world).body.tile, TileCoord::new(1, 1));
        assert_eq!(
            query::player(&world).body.position,
            PixelPoint::new(60.0, 60.0)
        );
        assert_eq!(query::enemy_view(&world).iter().count(), 1);
        assert_eq!(query::collectible_view(&world).len(), 1);
        assert!(!query::exit(&world).unlocked);
        assert_eq!(query::wall_view(&world).iter().count(), 14);
        assert_eq!(query::outcome(&world), None);
    }

    #[test]
    fn exit_starts_unlocked_without_collectibles() {
        let world = world("#####\n#P.X#\n#####");
        assert!(query::exit(&world).unlocked);
    }

    #[test]
    fn zero_tile_size_is_rejected() {
        let layout: MazeLayout = "P.X".parse().expect("layout");
        let config = GameConfig {
            tile_size: 0,
            ..GameConfig::default()
        };
        assert_eq!(
            World::new(&layout, config).unwrap_err(),
            LayoutError::InvalidTileSize
        );
    }

    #[test]
    fn non_finite_or_non_positive_speeds_are_rejected() {
        let layout: MazeLayout = "#####\n#P.X#\n#####".parse().expect("layout");
        let mut config = GameConfig::default();
        config.enemy.speed = f32::NAN;
        assert_eq!(
            World::new(&layout, config).unwrap_err(),
            LayoutError::InvalidSpeed { actor: "enemy" }
        );

        let config = GameConfig {
            player: ActorTuning {
                size: 30,
                speed: 0.0,
            },
            ..GameConfig::default()
        };
        assert_eq!(
            World::new(&layout, config).unwrap_err(),
            LayoutError::InvalidSpeed { actor: "player" }
        );
    }

    #[test]
    fn oversized_player_cannot_spawn_beside_walls() {
        let layout: MazeLayout = "#####\n#P.X#\n#####".parse().expect("layout");
        let config = GameConfig {
            player: ActorTuning {
                size: 50,
                speed: 5.0,
            },
            ..GameConfig::default()
        };
        assert_eq!(
            World::new(&layout, config).unwrap_err(),
            LayoutError::SpawnBlocked {
                actor: "player",
                tile: TileCoord::new(1, 1),
            }
        );
    }

    #[test]
    fn intent_commits_on_next_tick_and_is_consumed() {
        let mut world = world("#####\n#P.X#\n#####");
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SetPlayerIntent {
                direction: Some(Direction::East),
            },
            &mut events,
        );
        apply(&mut world, Command::Tick, &mut events);

        assert_eq!(
            events,
            vec![
                Event::TimeAdvanced { tick: 1 },
                Event::PlayerAdvanced {
                    from: TileCoord::new(1, 1),
                    to: TileCoord::new(2, 1),
                },
            ]
        );
        let player = query::player(&world);
        assert_eq!(player.pending_intent, None);
        assert!(player.body.moving);
    }

    #[test]
    fn blocked_intent_is_reported_and_cleared() {
        let mut world = world("#####\n#P.X#\n#####");
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SetPlayerIntent {
                direction: Some(Direction::North),
            },
            &mut events,
        );
        apply(&mut world, Command::Tick, &mut events);

        assert_eq!(
            events.last(),
            Some(&Event::PlayerBlocked {
                direction: Direction::North
            })
        );
        assert_eq!(query::player(&world).pending_intent, None);
        assert_eq!(query::player(&world).body.tile, TileCoord::new(1, 1));
    }

    #[test]
    fn intent_is_ignored_while_moving() {
        let mut world = world("######\n#P..X#\n######");
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SetPlayerIntent {
                direction: Some(Direction::East),
            },
            &mut events,
        );
        apply(&mut world, Command::Tick, &mut events);
        apply(
            &mut world,
            Command::SetPlayerIntent {
                direction: Some(Direction::East),
            },
            &mut events,
        );
        assert_eq!(query::player(&world).pending_intent, None);

        tick_until_idle(&mut world, &mut events);
        assert_eq!(query::player(&world).body.tile, TileCoord::new(2, 1));
        assert_eq!(
            query::player(&world).body.position,
            PixelPoint::new(100.0, 60.0)
        );
    }

    #[test]
    fn collecting_last_item_unlocks_exit_once() {
        let mut world = world("######\n#PCCX#\n######");
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::CollectItem {
                collectible: CollectibleId::new(0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::CollectItem {
                collectible: CollectibleId::new(0),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::ItemCollected {
                collectible: CollectibleId::new(0),
                remaining: 1,
            }]
        );
        assert!(!query::exit(&world).unlocked);

        events.clear();
        apply(
            &mut world,
            Command::CollectItem {
                collectible: CollectibleId::new(1),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![
                Event::ItemCollected {
                    collectible: CollectibleId::new(1),
                    remaining: 0,
                },
                Event::ExitUnlocked,
            ]
        );
        assert!(query::exit(&world).unlocked);
        assert_eq!(query::collectible_view(&world).collected_count(), 2);
    }

    #[test]
    fn concluded_level_ignores_ticks_until_reset() {
        let mut world = world("#####\n#P.X#\n#####");
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::ConcludeLevel {
                outcome: Outcome::Lost(LoseReason::TimeUp),
            },
            &mut events,
        );
        apply(&mut world, Command::Tick, &mut events);
        apply(
            &mut world,
            Command::ConcludeLevel {
                outcome: Outcome::Won,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::LevelLost {
                reason: LoseReason::TimeUp
            }]
        );
        assert_eq!(query::tick_index(&world), 0);
        assert_eq!(
            query::outcome(&world),
            Some(Outcome::Lost(LoseReason::TimeUp))
        );

        events.clear();
        apply(&mut world, Command::ResetLevel, &mut events);
        apply(&mut world, Command::Tick, &mut events);
        assert_eq!(
            events,
            vec![Event::LevelReset, Event::TimeAdvanced { tick: 1 }]
        );
        assert_eq!(query::outcome(&world), None);
    }

    #[test]
    fn reset_restores_actors_and_collectibles() {
        let mut world = world("######\n#PC.X#\n#E...#\n######");
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SetPlayerIntent {
                direction: Some(Direction::East),
            },
            &mut events,
        );
        tick_until_idle(&mut world, &mut events);
        apply(
            &mut world,
            Command::CollectItem {
                collectible: CollectibleId::new(0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::DriveEnemy {
                enemy_id: EnemyId::new(0),
                behavior: EnemyBehavior {
                    state: EnemyState::Chase,
                    last_known_player: Some(TileCoord::new(2, 1)),
                    chase_cooldown: 179,
                    stuck_counter: 0,
                },
                step: None,
            },
            &mut events,
        );

        apply(&mut world, Command::ResetLevel, &mut events);

        assert_eq!(query::player(&world).body.tile, TileCoord::new(1, 1));
        assert!(!query::player(&world).body.moving);
        assert_eq!(query::collectible_view(&world).collected_count(), 0);
        assert!(!query::exit(&world).unlocked);
        let enemy = query::enemy_view(&world).into_vec()[0];
        assert_eq!(enemy.behavior, EnemyBehavior::patrolling());
        assert_eq!(enemy.body.tile, TileCoord::new(1, 2));
        assert_eq!(query::tick_index(&world), 0);
    }

    #[test]
    fn drive_commits_enemy_step_when_due() {
        let layout: MazeLayout = "######\n#P..X#\n#E...#\n######".parse().expect("layout");
        let mut config = GameConfig::default();
        config.enemy.move_delay_ticks = 1;
        let mut world = World::new(&layout, config).expect("valid world");
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::DriveEnemy {
                enemy_id: EnemyId::new(0),
                behavior: EnemyBehavior::patrolling(),
                step: Some(PlannedStep {
                    direction: Direction::East,
                    remember: Some(Direction::East),
                }),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::EnemyAdvanced {
                enemy_id: EnemyId::new(0),
                from: TileCoord::new(1, 2),
                to: TileCoord::new(2, 2),
            }]
        );
        let visits = query::visit_view(&world, EnemyId::new(0)).expect("enemy exists");
        assert_eq!(visits.count(TileCoord::new(1, 2)), 1);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut world = world("#####\n#P.X#\n#####");
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::DriveEnemy {
                enemy_id: EnemyId::new(7),
                behavior: EnemyBehavior::patrolling(),
                step: None,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::CollectItem {
                collectible: CollectibleId::new(3),
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert!(query::visit_view(&world, EnemyId::new(7)).is_none());
    }
}
