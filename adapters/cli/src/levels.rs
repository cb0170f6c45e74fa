//! Built-in levels and TOML level packs.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use maze_escape_world::MazeLayout;
use serde::Deserialize;

const BUILTIN_LEVELS: [(&str, f32, &str); 3] = [
    (
        "First Steps",
        60.0,
        "###############
         #P....#......C#
         #.###.#.####..#
         #.#.....#..#..#
         #.#.###.#..#.##
         #...#C..#E....#
         ###.#####.###.#
         #C........#..X#
         ###############",
    ),
    (
        "Twin Patrol",
        75.0,
        "#################
         #P......#......E#
         #.#####.#.#####.#
         #.#C..#...#..C#.#
         #.#.#.#####.#.#.#
         #...#.......#...#
         ###.#.#####.#.###
         #E..#...X...#..C#
         #################",
    ),
    (
        "Labyrinth",
        90.0,
        "###################
         #P#.......#......C#
         #.#.#####.#.####..#
         #.#.#C..#.#.#E.#..#
         #.#.#.#.#...#..#.##
         #...#.#.#####.##..#
         ###.#.#.......#..##
         #C..#.#######.#.E.#
         #.###.......#.#...#
         #.....#####.#...#X#
         ###################",
    ),
];

/// Playable level: a maze plus the time allowed to escape it.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Level {
    /// Name shown in the HUD.
    pub(crate) name: String,
    /// Seconds available before the level is lost.
    pub(crate) time_limit_seconds: f32,
    /// Validated maze layout.
    pub(crate) layout: MazeLayout,
}

impl Level {
    fn new(name: &str, time_limit_seconds: f32, layout: &str) -> Result<Self> {
        if !time_limit_seconds.is_finite() || time_limit_seconds <= 0.0 {
            bail!("level `{name}` needs a positive time limit (got {time_limit_seconds})");
        }
        let layout = layout
            .parse::<MazeLayout>()
            .with_context(|| format!("level `{name}` has an invalid layout"))?;

        Ok(Self {
            name: name.to_owned(),
            time_limit_seconds,
            layout,
        })
    }
}

#[derive(Debug, Deserialize)]
struct LevelPack {
    #[serde(rename = "level", default)]
    levels: Vec<LevelEntry>,
}

#[derive(Debug, Deserialize)]
struct LevelEntry {
    name: String,
    time_limit_seconds: f32,
    layout: String,
}

/// Levels shipped with the game, in campaign order.
pub(crate) fn builtin() -> Result<Vec<Level>> {
    BUILTIN_LEVELS
        .iter()
        .map(|(name, seconds, layout)| Level::new(name, *seconds, layout))
        .collect()
}

/// Reads a level pack from disk.
pub(crate) fn load_pack(path: &Path) -> Result<Vec<Level>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read level pack at {}", path.display()))?;
    parse_pack(&contents).with_context(|| format!("invalid level pack in {}", path.display()))
}

/// Parses a level pack made of `[[level]]` tables.
pub(crate) fn parse_pack(contents: &str) -> Result<Vec<Level>> {
    let pack: LevelPack =
        toml::from_str(contents).context("failed to parse level pack toml contents")?;
    if pack.levels.is_empty() {
        bail!("level pack does not contain any [[level]] entries");
    }

    pack.levels
        .iter()
        .map(|entry| Level::new(&entry.name, entry.time_limit_seconds, &entry.layout))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_escape_core::{GameConfig, TileCoord};
    use maze_escape_world::{query, TileCode, World};

    #[test]
    fn builtin_levels_build_worlds() {
        let levels = builtin().expect("built-in levels are valid");

        assert_eq!(levels.len(), 3);
        for level in &levels {
            let world = World::new(&level.layout, GameConfig::default())
                .unwrap_or_else(|error| panic!("{} failed: {error}", level.name));
            assert!(!query::enemy_view(&world).into_vec().is_empty());
            assert!(!query::collectible_view(&world).is_empty());
            assert!(!query::exit(&world).unlocked);
        }
        assert_eq!(levels[0].layout.player_start(), TileCoord::new(1, 1));
    }

    #[test]
    fn pack_parses_multiline_layouts() {
        let levels = parse_pack(
            r######"
[[level]]
name = "Hallway"
time_limit_seconds = 30
layout = """
#####
#P.X#
#####
"""

[[level]]
name = "Pantry"
time_limit_seconds = 12.5
layout = "#####\n#PCX#\n#####"
"######,
        )
        .expect("valid pack");

        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].name, "Hallway");
        assert_eq!(levels[0].time_limit_seconds, 30.0);
        assert_eq!(levels[1].layout.exit(), TileCoord::new(3, 1));
        assert_eq!(
            levels[1].layout.code(TileCoord::new(2, 1)),
            Some(TileCode::Collectible)
        );
    }

    #[test]
    fn pack_without_levels_is_rejected() {
        let error = parse_pack("").expect_err("empty pack");

        assert!(error.to_string().contains("[[level]]"));
    }

    #[test]
    fn invalid_layout_names_the_level() {
        let error = parse_pack(
            "[[level]]\nname = \"Broken\"\ntime_limit_seconds = 10\nlayout = \"###\\n#P#\\n###\"",
        )
        .expect_err("layout without exit");

        assert!(error.to_string().contains("Broken"));
    }

    #[test]
    fn non_positive_time_limit_is_rejected() {
        let error = parse_pack(
            "[[level]]\nname = \"Rush\"\ntime_limit_seconds = 0\nlayout = \"####\\n#PX#\\n####\"",
        )
        .expect_err("zero time limit");

        assert!(error.to_string().contains("positive time limit"));
    }
}
