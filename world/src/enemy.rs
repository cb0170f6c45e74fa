//! Enemy bodies, their patrol memory and the move cadence that gates the AI.

use log::debug;
use maze_escape_core::{
    Direction, EnemyBehavior, EnemyId, EnemySnapshot, EnemyTuning, Event, PlannedStep, TileCoord,
    VisitView,
};

use crate::{grid::GridWorld, motion::Actor, visits::VisitMap};

#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    id: EnemyId,
    start: TileCoord,
    body: Actor,
    behavior: EnemyBehavior,
    last_move: Option<Direction>,
    visits: VisitMap,
    move_timer: u32,
    move_delay: u32,
}

impl Enemy {
    pub(crate) fn spawn(
        id: EnemyId,
        start: TileCoord,
        tuning: &EnemyTuning,
        grid: &GridWorld,
    ) -> Self {
        let mut visits = VisitMap::new(grid.columns(), grid.rows());
        visits.reset_to(start);
        Self {
            id,
            start,
            body: Actor::spawn(start, tuning.size, tuning.speed, grid),
            behavior: EnemyBehavior::patrolling(),
            last_move: None,
            visits,
            move_timer: 0,
            move_delay: tuning.move_delay_ticks,
        }
    }

    pub(crate) const fn id(&self) -> EnemyId {
        self.id
    }

    pub(crate) fn visits(&self) -> VisitView<'_> {
        self.visits.view()
    }

    /// Reports whether the next drive attempts a move.
    fn step_due(&self) -> bool {
        !self.body.is_moving() && self.move_timer.saturating_add(1) >= self.move_delay
    }

    /// Adopts the behaviour chosen by the AI and advances the body by one tick.
    ///
    /// While a move is in flight the body interpolates and the planned step is
    /// ignored. Otherwise the move timer counts up and, once it reaches the
    /// configured delay, `step` is committed. A missing or blocked step counts
    /// as a stall.
    pub(crate) fn drive(
        &mut self,
        behavior: EnemyBehavior,
        step: Option<PlannedStep>,
        grid: &GridWorld,
        out_events: &mut Vec<Event>,
    ) {
        if behavior.state != self.behavior.state {
            debug!(
                "enemy {} switched from {:?} to {:?}",
                self.id.get(),
                self.behavior.state,
                behavior.state
            );
            out_events.push(Event::EnemyStateChanged {
                enemy_id: self.id,
                from: self.behavior.state,
                to: behavior.state,
            });
        }
        self.behavior = behavior;

        if self.body.is_moving() {
            if self.body.interpolate() {
                self.visits.record_arrival(self.body.tile());
            }
            return;
        }

        self.move_timer = self.move_timer.saturating_add(1);
        if self.move_timer < self.move_delay {
            return;
        }
        self.move_timer = 0;

        let from = self.body.tile();
        let committed = step.and_then(|planned| {
            self.body
                .try_commit(planned.direction, grid)
                .map(|to| (planned, to))
        });

        match committed {
            Some((planned, to)) => {
                self.behavior.stuck_counter = 0;
                if let Some(direction) = planned.remember {
                    self.last_move = Some(direction);
                }
                debug!("enemy {} committed {:?} -> {:?}", self.id.get(), from, to);
                out_events.push(Event::EnemyAdvanced {
                    enemy_id: self.id,
                    from,
                    to,
                });
            }
            None => {
                self.behavior.stuck_counter = self.behavior.stuck_counter.saturating_add(1);
                out_events.push(Event::EnemyStalled {
                    enemy_id: self.id,
                    stuck_counter: self.behavior.stuck_counter,
                });
            }
        }
    }

    /// Restores the spawn state, forgetting every visit but the start tile.
    pub(crate) fn reset(&mut self, grid: &GridWorld) {
        self.body.place(self.start, grid);
        self.behavior = EnemyBehavior::patrolling();
        self.last_move = None;
        self.visits.reset_to(self.start);
        self.move_timer = 0;
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            start: self.start,
            body: self.body.snapshot(),
            behavior: self.behavior,
            last_move: self.last_move,
            step_due: self.step_due(),
        }
    }
}
