//! Tick loop that drives the world and its systems through a level campaign.

use std::{fmt, ops::ControlFlow, time::Duration};

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use maze_escape_core::{Command, Event, GameConfig, LoseReason, Outcome};
use maze_escape_rendering::{Hud, Palette, Scene};
use maze_escape_system_enemy_ai::EnemyAi;
use maze_escape_system_objectives::{touched_collectibles, Objectives};
use maze_escape_world::{self as world, query, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{input::MoveScript, levels::Level};

/// Fixed simulation rate.
pub(crate) const TICKS_PER_SECOND: u32 = 60;

/// Wall-clock duration of a single tick.
pub(crate) const TICK_DURATION: Duration =
    Duration::from_nanos(1_000_000_000 / TICKS_PER_SECOND as u64);

/// Countdown measured in whole ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct LevelTimer {
    remaining_ticks: u64,
}

impl LevelTimer {
    /// Starts a countdown of `seconds`, rounded to the nearest tick.
    pub(crate) fn new(seconds: f32) -> Self {
        let ticks = (seconds * TICKS_PER_SECOND as f32).round().max(1.0);
        Self {
            remaining_ticks: ticks as u64,
        }
    }

    /// Consumes one tick and reports whether the time ran out.
    pub(crate) fn tick(&mut self) -> bool {
        self.remaining_ticks = self.remaining_ticks.saturating_sub(1);
        self.remaining_ticks == 0
    }

    /// Time left in seconds.
    pub(crate) fn seconds_left(&self) -> f32 {
        self.remaining_ticks as f32 / TICKS_PER_SECOND as f32
    }
}

/// Knobs that shape a session independently of the gameplay configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SessionOptions {
    /// Seed for the enemy decision RNG.
    pub(crate) seed: u64,
    /// Upper bound on simulated ticks.
    pub(crate) max_ticks: u64,
    /// Advance on a win and retry on a loss instead of stopping.
    pub(crate) campaign: bool,
}

/// Running totals reported when a session ends.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct SessionReport {
    /// Name of the level being played when the session stopped.
    pub(crate) level: String,
    /// Ticks simulated across every level.
    pub(crate) ticks: u64,
    /// Levels escaped.
    pub(crate) levels_won: u32,
    /// Levels lost for any reason.
    pub(crate) levels_lost: u32,
    /// Collectibles gathered across every attempt.
    pub(crate) items_collected: u32,
    /// Behaviour changes made by enemies.
    pub(crate) enemy_state_changes: u32,
    /// Outcome of the most recently concluded level.
    pub(crate) last_outcome: Option<Outcome>,
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = match self.last_outcome {
            None => "in progress",
            Some(Outcome::Won) => "escaped",
            Some(Outcome::Lost(reason)) => reason.message(),
        };
        write!(f, "level `{}`: {outcome} after {} ticks ", self.level, self.ticks)?;
        write!(
            f,
            "(won {}, lost {}, collected {}, enemy state changes {})",
            self.levels_won, self.levels_lost, self.items_collected, self.enemy_state_changes
        )
    }
}

/// Owns the world and its systems and advances them one tick at a time.
#[derive(Debug)]
pub(crate) struct Session {
    config: GameConfig,
    levels: Vec<Level>,
    level_index: usize,
    world: World,
    enemy_ai: EnemyAi,
    objectives: Objectives,
    timer: LevelTimer,
    script: MoveScript,
    rng: ChaCha8Rng,
    options: SessionOptions,
    palette: Palette,
    message: Option<String>,
    finished: bool,
    report: SessionReport,
}

impl Session {
    /// Loads `start_level` and prepares the systems.
    pub(crate) fn new(
        config: GameConfig,
        levels: Vec<Level>,
        start_level: usize,
        script: MoveScript,
        options: SessionOptions,
    ) -> Result<Self> {
        let level = levels.get(start_level).ok_or_else(|| {
            anyhow!(
                "level index {start_level} is out of range; {} levels are loaded",
                levels.len()
            )
        })?;
        let world = build_world(level, config)?;
        let timer = LevelTimer::new(level.time_limit_seconds);
        let report = SessionReport {
            level: level.name.clone(),
            ..SessionReport::default()
        };
        info!("{}", query::welcome_banner(&world));
        info!("starting level `{}`", level.name);

        Ok(Self {
            config,
            levels,
            level_index: start_level,
            world,
            enemy_ai: EnemyAi::new(config.enemy, config.tile_size),
            objectives: Objectives,
            timer,
            script,
            rng: ChaCha8Rng::seed_from_u64(options.seed),
            options,
            palette: Palette::default(),
            message: None,
            finished: false,
            report,
        })
    }

    /// Banner announced by the world.
    pub(crate) fn banner(&self) -> &'static str {
        query::welcome_banner(&self.world)
    }

    /// Totals gathered so far.
    pub(crate) fn report(&self) -> &SessionReport {
        &self.report
    }

    /// Runs a single tick and returns the events the world broadcast.
    ///
    /// Order: scripted intent, world tick, enemy AI, pickups, level timer,
    /// objectives.
    pub(crate) fn step(&mut self) -> Result<(ControlFlow<()>, Vec<Event>)> {
        if self.is_done() {
            return Ok((ControlFlow::Break(()), Vec::new()));
        }
        let mut events = Vec::new();

        if let Some(direction) = self.script.next_intent() {
            world::apply(
                &mut self.world,
                Command::SetPlayerIntent {
                    direction: Some(direction),
                },
                &mut events,
            );
        }
        world::apply(&mut self.world, Command::Tick, &mut events);

        let mut commands = Vec::new();
        {
            let view: &World = &self.world;
            let player = query::player(view);
            let enemies = query::enemy_view(view);
            self.enemy_ai.handle(
                &events,
                &player,
                &enemies,
                query::wall_view(view),
                |enemy_id| query::visit_view(view, enemy_id),
                |tile, size| query::is_tile_blocked(view, tile, size),
                &mut self.rng,
                &mut commands,
            );
        }
        self.apply_all(&mut commands, &mut events);

        if query::outcome(&self.world).is_none() {
            let touched = touched_collectibles(
                &query::player(&self.world),
                &query::collectible_view(&self.world),
            );
            commands.extend(
                touched
                    .into_iter()
                    .map(|collectible| Command::CollectItem { collectible }),
            );
            self.apply_all(&mut commands, &mut events);
        }

        if self.timer.tick() && query::outcome(&self.world).is_none() {
            world::apply(
                &mut self.world,
                Command::ConcludeLevel {
                    outcome: Outcome::Lost(LoseReason::TimeUp),
                },
                &mut events,
            );
        }

        if query::outcome(&self.world).is_none() {
            self.objectives.handle(
                &events,
                &query::player(&self.world),
                &query::enemy_view(&self.world),
                &query::collectible_view(&self.world),
                &query::exit(&self.world),
                &mut commands,
            );
            self.apply_all(&mut commands, &mut events);
        }

        self.report.ticks += 1;
        self.record(&events);
        if let Some(outcome) = query::outcome(&self.world) {
            self.conclude(outcome, &mut events)?;
        }

        let flow = if self.is_done() {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        };
        Ok((flow, events))
    }

    /// Runs a tick and refreshes `scene` from the resulting world state.
    pub(crate) fn advance(&mut self, scene: &mut Scene) -> Result<ControlFlow<()>> {
        let (flow, _) = self.step()?;
        *scene = self.scene()?;
        Ok(flow)
    }

    /// Captures the current world state for presentation.
    pub(crate) fn scene(&self) -> Result<Scene> {
        let collectibles = query::collectible_view(&self.world);
        let hud = Hud {
            level_name: self.current_level().name.clone(),
            seconds_left: self.timer.seconds_left(),
            collected: collectibles.collected_count(),
            total: collectibles.len(),
            message: self.message.clone(),
        };

        Scene::capture(
            &self.palette,
            query::tile_size(&self.world),
            query::wall_view(&self.world),
            &query::player(&self.world),
            &query::enemy_view(&self.world),
            &collectibles,
            &query::exit(&self.world),
            hud,
        )
        .context("failed to capture scene")
    }

    fn is_done(&self) -> bool {
        self.finished || self.report.ticks >= self.options.max_ticks
    }

    fn current_level(&self) -> &Level {
        &self.levels[self.level_index]
    }

    fn apply_all(&mut self, commands: &mut Vec<Command>, events: &mut Vec<Event>) {
        for command in commands.drain(..) {
            world::apply(&mut self.world, command, events);
        }
    }

    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::ItemCollected { remaining, .. } => {
                    self.report.items_collected += 1;
                    debug!("collectible picked up, {remaining} remaining");
                }
                Event::EnemyStateChanged { .. } => self.report.enemy_state_changes += 1,
                Event::PlayerBlocked { .. } => debug!("player bumped into a wall"),
                _ => {}
            }
        }
    }

    fn conclude(&mut self, outcome: Outcome, events: &mut Vec<Event>) -> Result<()> {
        let name = self.current_level().name.clone();
        self.report.last_outcome = Some(outcome);
        match outcome {
            Outcome::Won => {
                self.report.levels_won += 1;
                self.message = Some(String::from("Level complete!"));
                info!("escaped `{name}` with {:.1}s left", self.timer.seconds_left());
                if !self.options.campaign {
                    self.finished = true;
                } else if self.level_index + 1 < self.levels.len() {
                    self.load_level(self.level_index + 1)?;
                } else {
                    info!("campaign complete");
                    self.finished = true;
                }
            }
            Outcome::Lost(reason) => {
                self.report.levels_lost += 1;
                self.message = Some(reason.message().to_owned());
                info!("lost `{name}`: {}", reason.message());
                if self.options.campaign {
                    self.restart(events);
                } else {
                    self.finished = true;
                }
            }
        }
        Ok(())
    }

    fn restart(&mut self, events: &mut Vec<Event>) {
        world::apply(&mut self.world, Command::ResetLevel, events);
        self.timer = LevelTimer::new(self.current_level().time_limit_seconds);
        self.script.rewind();
        self.message = None;
        debug!("restarted `{}`", self.current_level().name);
    }

    fn load_level(&mut self, index: usize) -> Result<()> {
        let level = self
            .levels
            .get(index)
            .ok_or_else(|| anyhow!("level index {index} is out of range"))?;
        self.world = build_world(level, self.config)?;
        self.timer = LevelTimer::new(level.time_limit_seconds);
        self.report.level = level.name.clone();
        self.level_index = index;
        self.script.rewind();
        self.message = None;
        info!("starting level `{}`", level.name);
        Ok(())
    }
}

fn build_world(level: &Level, config: GameConfig) -> Result<World> {
    World::new(&level.layout, config)
        .with_context(|| format!("level `{}` cannot be played", level.name))
}
