use maze_escape_core::{
    CollectibleId, Command, Direction, Event, GameConfig, LoseReason, Outcome, TileCoord,
};
use maze_escape_system_objectives::Objectives;
use maze_escape_world::{self as world, query, MazeLayout, World};

fn build(layout: &str) -> World {
    let layout: MazeLayout = layout.parse().expect("valid layout");
    World::new(&layout, GameConfig::default()).expect("valid world")
}

fn step(world: &mut World, objectives: &mut Objectives, intent: Option<Direction>) -> Vec<Event> {
    let mut events = Vec::new();
    if intent.is_some() {
        world::apply(
            world,
            Command::SetPlayerIntent { direction: intent },
            &mut events,
        );
    }
    world::apply(world, Command::Tick, &mut events);

    let mut commands = Vec::new();
    objectives.handle(
        &events,
        &query::player(world),
        &query::enemy_view(world),
        &query::collectible_view(world),
        &query::exit(world),
        &mut commands,
    );
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn walk(world: &mut World, objectives: &mut Objectives, direction: Direction) -> Vec<Event> {
    let mut events = step(world, objectives, Some(direction));
    while query::player(world).body.moving && query::outcome(world).is_none() {
        events.extend(step(world, objectives, None));
    }
    events
}

fn pickups(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, Event::ItemCollected { .. }))
        .count()
}

#[test]
fn overlapping_collectible_on_successive_ticks_is_picked_up_once() {
    let mut world = build("######\n#PC.X#\n######");
    let mut objectives = Objectives::default();

    let mut events = walk(&mut world, &mut objectives, Direction::East);
    for _ in 0..5 {
        events.extend(step(&mut world, &mut objectives, None));
    }

    assert_eq!(pickups(&events), 1);
    assert!(events.contains(&Event::ItemCollected {
        collectible: CollectibleId::new(0),
        remaining: 0,
    }));
    assert!(events.contains(&Event::ExitUnlocked));
    assert!(query::collectible_view(&world)
        .iter()
        .all(|item| item.collected));
}

#[test]
fn locked_exit_does_not_win() {
    let mut world = build("######\n#P.XC#\n######");
    let mut objectives = Objectives::default();

    let mut events = walk(&mut world, &mut objectives, Direction::East);
    events.extend(walk(&mut world, &mut objectives, Direction::East));

    assert_eq!(query::player(&world).body.tile, TileCoord::new(3, 1));
    assert!(!events.contains(&Event::LevelWon));
    assert_eq!(query::outcome(&world), None);
}

#[test]
fn gathering_everything_then_reaching_exit_wins() {
    let mut world = build("######\n#CP.X#\n######");
    let mut objectives = Objectives::default();

    let mut events = walk(&mut world, &mut objectives, Direction::West);
    assert_eq!(pickups(&events), 1);
    assert!(events.contains(&Event::ExitUnlocked));

    for _ in 0..2 {
        events.extend(walk(&mut world, &mut objectives, Direction::East));
    }
    assert_eq!(query::outcome(&world), None);

    events.extend(walk(&mut world, &mut objectives, Direction::East));

    assert!(events.contains(&Event::LevelWon));
    assert_eq!(query::outcome(&world), Some(Outcome::Won));
}

#[test]
fn touching_an_enemy_loses_the_level() {
    let mut world = build("#####\n#PEX#\n#####");
    let mut objectives = Objectives::default();

    let events = walk(&mut world, &mut objectives, Direction::East);

    assert!(events.contains(&Event::LevelLost {
        reason: LoseReason::CaughtByEnemy
    }));
    assert_eq!(
        query::outcome(&world),
        Some(Outcome::Lost(LoseReason::CaughtByEnemy))
    );
}
