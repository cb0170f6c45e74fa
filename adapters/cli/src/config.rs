//! Loading gameplay tuning from TOML files.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use maze_escape_core::GameConfig;

/// Reads the configuration at `path`, or the defaults when no path is given.
pub(crate) fn load(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read game config at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid game config in {}", path.display()))
}

/// Parses configuration TOML; omitted keys keep their default values.
pub(crate) fn parse(contents: &str) -> Result<GameConfig> {
    let config: GameConfig =
        toml::from_str(contents).context("failed to parse game config toml contents")?;

    if config.tile_size == 0 {
        bail!("tile_size must be positive");
    }
    for (actor, speed) in [("player", config.player.speed), ("enemy", config.enemy.speed)] {
        if !speed.is_finite() || speed <= 0.0 {
            bail!("{actor}.speed must be a positive finite number (got {speed})");
        }
    }
    if config.enemy.move_delay_ticks == 0 {
        bail!("enemy.move_delay_ticks must be at least 1");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        assert_eq!(parse("").expect("empty config"), GameConfig::default());
    }

    #[test]
    fn partial_tables_override_only_named_keys() {
        let config = parse(
            "tile_size = 32\n\
             [enemy]\n\
             chase_radius = 120.0\n\
             stuck_limit = 3\n",
        )
        .expect("valid config");

        assert_eq!(config.tile_size, 32);
        assert_eq!(config.enemy.chase_radius, 120.0);
        assert_eq!(config.enemy.stuck_limit, 3);
        assert_eq!(config.enemy.chase_cooldown_ticks, 180);
        assert_eq!(config.player, GameConfig::default().player);
    }

    #[test]
    fn rejects_zero_tile_size() {
        let error = parse("tile_size = 0").expect_err("zero tile size");

        assert!(error.to_string().contains("tile_size"));
    }

    #[test]
    fn rejects_nan_and_negative_speeds() {
        let error = parse("[enemy]\nspeed = nan\n").expect_err("nan speed");
        assert!(error.to_string().contains("enemy.speed"));

        let error = parse("[player]\nspeed = -1.0\n").expect_err("negative speed");
        assert!(error.to_string().contains("player.speed"));
    }

    #[test]
    fn rejects_malformed_toml() {
        let error = parse("tile_size = ").expect_err("malformed toml");

        assert!(error.to_string().contains("failed to parse"));
    }

    #[test]
    fn missing_file_reports_path() {
        let error = load(Some(Path::new("does/not/exist.toml"))).expect_err("missing file");

        assert!(error.to_string().contains("does/not/exist.toml"));
    }
}
