#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Collision and objective evaluation that decides pickups, wins and losses.

use maze_escape_core::{
    CollectibleId, CollectibleView, Command, EnemyView, Event, ExitSnapshot, LoseReason, Outcome,
    PlayerSnapshot,
};

/// Reports whether any enemy's hitbox overlaps the player's.
#[must_use]
pub fn player_caught(player: &PlayerSnapshot, enemies: &EnemyView) -> bool {
    let hitbox = player.body.hitbox();
    enemies
        .iter()
        .any(|enemy| enemy.body.hitbox().overlaps(&hitbox))
}

/// Uncollected collectibles the player currently overlaps, in id order.
#[must_use]
pub fn touched_collectibles(
    player: &PlayerSnapshot,
    collectibles: &CollectibleView,
) -> Vec<CollectibleId> {
    let hitbox = player.body.hitbox();
    collectibles
        .iter()
        .filter(|item| !item.collected && item.hitbox().overlaps(&hitbox))
        .map(|item| item.id)
        .collect()
}

/// Reports whether every collectible has been gathered.
#[must_use]
pub fn all_collected(collectibles: &CollectibleView) -> bool {
    collectibles.iter().all(|item| item.collected)
}

/// Reports whether the player stands on the exit while it is unlocked.
#[must_use]
pub fn player_at_exit(player: &PlayerSnapshot, exit: &ExitSnapshot) -> bool {
    exit.unlocked && player.body.hitbox().overlaps(&exit.hitbox)
}

/// Pure system that turns collisions into pickup and level outcome commands.
#[derive(Debug, Default)]
pub struct Objectives;

impl Objectives {
    /// Consumes world events and immutable views to emit objective commands.
    ///
    /// Pickups are emitted first so that gathering the last collectible while
    /// standing on the exit wins on the same tick. Being caught takes priority
    /// over reaching the exit.
    pub fn handle(
        &mut self,
        events: &[Event],
        player: &PlayerSnapshot,
        enemies: &EnemyView,
        collectibles: &CollectibleView,
        exit: &ExitSnapshot,
        out: &mut Vec<Command>,
    ) {
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        let touched = touched_collectibles(player, collectibles);
        let unlocked = exit.unlocked
            || collectibles
                .iter()
                .all(|item| item.collected || touched.contains(&item.id));
        out.extend(
            touched
                .into_iter()
                .map(|collectible| Command::CollectItem { collectible }),
        );

        if player_caught(player, enemies) {
            out.push(Command::ConcludeLevel {
                outcome: Outcome::Lost(LoseReason::CaughtByEnemy),
            });
            return;
        }

        let exit = ExitSnapshot { unlocked, ..*exit };
        if player_at_exit(player, &exit) {
            out.push(Command::ConcludeLevel {
                outcome: Outcome::Won,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_escape_core::{
        ActorSnapshot, CollectibleSnapshot, EnemyBehavior, EnemyId, EnemySnapshot, Hitbox,
        PixelPoint, TileCoord,
    };

    fn player_at(x: f32, y: f32) -> PlayerSnapshot {
        let position = PixelPoint::new(x, y);
        PlayerSnapshot {
            start: TileCoord::new(1, 1),
            body: ActorSnapshot {
                tile: position.tile(40),
                position,
                target: position,
                size: 30,
                speed: 5.0,
                moving: false,
            },
            pending_intent: None,
        }
    }

    fn enemy_at(x: f32, y: f32) -> EnemyView {
        let position = PixelPoint::new(x, y);
        EnemyView::from_snapshots(vec![EnemySnapshot {
            id: EnemyId::new(0),
            start: position.tile(40),
            body: ActorSnapshot {
                tile: position.tile(40),
                position,
                target: position,
                size: 30,
                speed: 5.0,
                moving: false,
            },
            behavior: EnemyBehavior::patrolling(),
            last_move: None,
            step_due: false,
        }])
    }

    fn collectible(id: u32, tile: TileCoord, collected: bool) -> CollectibleSnapshot {
        CollectibleSnapshot {
            id: CollectibleId::new(id),
            tile,
            position: tile.center(40),
            size: 20,
            collected,
            animation_phase: 0.0,
        }
    }

    fn exit(tile: TileCoord, unlocked: bool) -> ExitSnapshot {
        ExitSnapshot {
            tile,
            hitbox: Hitbox::tile(tile, 40),
            unlocked,
        }
    }

    #[test]
    fn overlapping_enemy_catches_player() {
        let player = player_at(60.0, 60.0);
        assert!(player_caught(&player, &enemy_at(85.0, 60.0)));
        assert!(!player_caught(&player, &enemy_at(90.0, 60.0)));
        assert!(!player_caught(&player, &EnemyView::default()));
    }

    #[test]
    fn locked_exit_never_wins() {
        let player = player_at(60.0, 60.0);
        assert!(!player_at_exit(&player, &exit(TileCoord::new(1, 1), false)));
        assert!(player_at_exit(&player, &exit(TileCoord::new(1, 1), true)));
    }

    #[test]
    fn collected_items_are_not_touched_again() {
        let player = player_at(60.0, 60.0);
        let view = CollectibleView::from_snapshots(vec![
            collectible(0, TileCoord::new(1, 1), true),
            collectible(1, TileCoord::new(1, 1), false),
            collectible(2, TileCoord::new(3, 3), false),
        ]);

        assert_eq!(
            touched_collectibles(&player, &view),
            vec![CollectibleId::new(1)]
        );
        assert!(!all_collected(&view));
    }

    #[test]
    fn ignores_batches_without_time_advancing() {
        let mut objectives = Objectives;
        let mut out = Vec::new();

        objectives.handle(
            &[Event::LevelReset],
            &player_at(60.0, 60.0),
            &enemy_at(60.0, 60.0),
            &CollectibleView::default(),
            &exit(TileCoord::new(1, 1), true),
            &mut out,
        );

        assert!(out.is_empty());
    }

    #[test]
    fn last_pickup_on_exit_wins_same_tick() {
        let mut objectives = Objectives;
        let mut out = Vec::new();
        let tile = TileCoord::new(2, 1);
        let collectibles = CollectibleView::from_snapshots(vec![collectible(0, tile, false)]);

        objectives.handle(
            &[Event::TimeAdvanced { tick: 1 }],
            &player_at(100.0, 60.0),
            &EnemyView::default(),
            &collectibles,
            &exit(tile, false),
            &mut out,
        );

        assert_eq!(
            out,
            vec![
                Command::CollectItem {
                    collectible: CollectibleId::new(0)
                },
                Command::ConcludeLevel {
                    outcome: Outcome::Won
                },
            ]
        );
    }

    #[test]
    fn capture_beats_reaching_exit() {
        let mut objectives = Objectives;
        let mut out = Vec::new();

        objectives.handle(
            &[Event::TimeAdvanced { tick: 9 }],
            &player_at(60.0, 60.0),
            &enemy_at(70.0, 60.0),
            &CollectibleView::default(),
            &exit(TileCoord::new(1, 1), true),
            &mut out,
        );

        assert_eq!(
            out,
            vec![Command::ConcludeLevel {
                outcome: Outcome::Lost(LoseReason::CaughtByEnemy)
            }]
        );
    }
}
