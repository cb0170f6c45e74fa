//! Scripted player input for headless sessions.

use anyhow::{bail, Result};
use maze_escape_core::Direction;

/// Cyclic list of per-tick move intents.
///
/// Each character of the script covers one tick: `U`, `D`, `L` and `R` press
/// a direction and `.` leaves the player idle. Whitespace is ignored so long
/// scripts can be wrapped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct MoveScript {
    moves: Vec<Option<Direction>>,
    cursor: usize,
}

impl MoveScript {
    /// Parses a script, rejecting unknown characters and empty scripts.
    pub(crate) fn parse(script: &str) -> Result<Self> {
        let mut moves = Vec::with_capacity(script.len());
        for (index, symbol) in script.chars().enumerate() {
            let intent = match symbol.to_ascii_uppercase() {
                'U' => Some(Direction::North),
                'D' => Some(Direction::South),
                'L' => Some(Direction::West),
                'R' => Some(Direction::East),
                '.' => None,
                symbol if symbol.is_whitespace() => continue,
                _ => bail!("unknown move `{symbol}` at position {index}; expected U, D, L, R or ."),
            };
            moves.push(intent);
        }

        if moves.is_empty() {
            bail!("move script must contain at least one entry");
        }

        Ok(Self { moves, cursor: 0 })
    }

    /// Intent for the next tick, wrapping around at the end of the script.
    pub(crate) fn next_intent(&mut self) -> Option<Direction> {
        let intent = self.moves.get(self.cursor).copied().flatten();
        self.cursor = (self.cursor + 1) % self.moves.len();
        intent
    }

    /// Restarts the script from its first entry.
    pub(crate) fn rewind(&mut self) {
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_cycles_through_entries() {
        let mut script = MoveScript::parse("r.U").expect("valid script");

        let intents: Vec<_> = (0..5).map(|_| script.next_intent()).collect();

        assert_eq!(
            intents,
            vec![
                Some(Direction::East),
                None,
                Some(Direction::North),
                Some(Direction::East),
                None,
            ]
        );
    }

    #[test]
    fn whitespace_is_skipped_and_rewind_restarts() {
        let mut script = MoveScript::parse("L D\n").expect("valid script");

        assert_eq!(script.next_intent(), Some(Direction::West));
        script.rewind();
        assert_eq!(script.next_intent(), Some(Direction::West));
        assert_eq!(script.next_intent(), Some(Direction::South));
    }

    #[test]
    fn rejects_unknown_symbols_and_empty_scripts() {
        assert!(MoveScript::parse("RRX")
            .expect_err("unknown symbol")
            .to_string()
            .contains("position 2"));
        assert!(MoveScript::parse("  ").is_err());
    }
}
