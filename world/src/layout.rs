//! Maze layout parsing and load-time validation.

use std::str::FromStr;

use maze_escape_core::TileCoord;
use thiserror::Error;

/// Symbolic code stored in a single layout tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileCode {
    /// Walkable floor.
    Empty,
    /// Solid wall.
    Wall,
    /// Floor tile where the player spawns.
    PlayerStart,
    /// Floor tile holding the exit.
    Exit,
    /// Floor tile where an enemy spawns.
    EnemyStart,
    /// Floor tile holding a collectible.
    Collectible,
}

impl TileCode {
    /// Decodes a layout character.
    ///
    /// Both the numeric codes `0`–`5` and the glyphs `.`, `#`, `P`, `X`, `E`
    /// and `C` are accepted.
    #[must_use]
    pub const fn from_char(symbol: char) -> Option<Self> {
        match symbol {
            '0' | '.' => Some(Self::Empty),
            '1' | '#' => Some(Self::Wall),
            '2' | 'P' => Some(Self::PlayerStart),
            '3' | 'X' => Some(Self::Exit),
            '4' | 'E' => Some(Self::EnemyStart),
            '5' | 'C' => Some(Self::Collectible),
            _ => None,
        }
    }

    /// Canonical glyph used when printing a layout.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Empty => '.',
            Self::Wall => '#',
            Self::PlayerStart => 'P',
            Self::Exit => 'X',
            Self::EnemyStart => 'E',
            Self::Collectible => 'C',
        }
    }
}

/// Errors raised while loading a maze layout.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// The layout contained no tiles.
    #[error("maze layout is empty")]
    Empty,
    /// A row's length differed from the first row.
    #[error("row {row} has {found} tiles but the layout is {expected} tiles wide")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width established by the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// A tile used a code outside the supported set.
    #[error("unknown tile code {symbol:?} at column {column}, row {row}")]
    UnknownTile {
        /// Character that failed to decode.
        symbol: char,
        /// Column of the offending tile.
        column: usize,
        /// Row of the offending tile.
        row: usize,
    },
    /// The layout is too large to address with tile coordinates.
    #[error("maze layout of {columns}x{rows} tiles exceeds the supported size")]
    TooLarge {
        /// Number of columns in the layout.
        columns: usize,
        /// Number of rows in the layout.
        rows: usize,
    },
    /// No tile marked the player's start.
    #[error("maze layout has no player start tile")]
    MissingPlayerStart,
    /// More than one tile marked the player's start.
    #[error("maze layout has a second player start at {second:?}")]
    DuplicatePlayerStart {
        /// Location of the extra player start.
        second: TileCoord,
    },
    /// No tile marked the exit.
    #[error("maze layout has no exit tile")]
    MissingExit,
    /// More than one tile marked the exit.
    #[error("maze layout has a second exit at {second:?}")]
    DuplicateExit {
        /// Location of the extra exit.
        second: TileCoord,
    },
    /// The configured tile size was zero.
    #[error("tile size must be positive")]
    InvalidTileSize,
    /// An actor's configured speed was not a positive finite number.
    #[error("{actor} speed must be a positive finite number")]
    InvalidSpeed {
        /// Kind of actor with the rejected speed.
        actor: &'static str,
    },
    /// An actor would spawn overlapping a wall.
    #[error("{actor} spawning at {tile:?} overlaps a wall")]
    SpawnBlocked {
        /// Kind of actor that failed to spawn.
        actor: &'static str,
        /// Spawn tile of the actor.
        tile: TileCoord,
    },
}

/// Validated rectangular maze layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MazeLayout {
    columns: u32,
    rows: u32,
    tiles: Vec<TileCode>,
    player_start: TileCoord,
    exit: TileCoord,
}

impl MazeLayout {
    /// Builds a layout from rows of tile codes.
    pub fn from_rows(rows: &[Vec<TileCode>]) -> Result<Self, LayoutError> {
        let width = rows.first().map_or(0, Vec::len);
        if rows.is_empty() || width == 0 {
            return Err(LayoutError::Empty);
        }

        let (Ok(columns), Ok(row_count)) = (u32::try_from(width), u32::try_from(rows.len())) else {
            return Err(LayoutError::TooLarge {
                columns: width,
                rows: rows.len(),
            });
        };
        if i32::try_from(columns).is_err() || i32::try_from(row_count).is_err() {
            return Err(LayoutError::TooLarge {
                columns: width,
                rows: rows.len(),
            });
        }

        let mut tiles = Vec::with_capacity(width * rows.len());
        let mut player_start = None;
        let mut exit = None;

        for (row_index, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(LayoutError::RaggedRow {
                    row: row_index,
                    expected: width,
                    found: row.len(),
                });
            }

            for (column_index, code) in row.iter().copied().enumerate() {
                let tile = TileCoord::new(column_index as i32, row_index as i32);
                match code {
                    TileCode::PlayerStart => {
                        if player_start.replace(tile).is_some() {
                            return Err(LayoutError::DuplicatePlayerStart { second: tile });
                        }
                    }
                    TileCode::Exit => {
                        if exit.replace(tile).is_some() {
                            return Err(LayoutError::DuplicateExit { second: tile });
                        }
                    }
                    _ => {}
                }
                tiles.push(code);
            }
        }

        Ok(Self {
            columns,
            rows: row_count,
            tiles,
            player_start: player_start.ok_or(LayoutError::MissingPlayerStart)?,
            exit: exit.ok_or(LayoutError::MissingExit)?,
        })
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Tile the player spawns on.
    #[must_use]
    pub const fn player_start(&self) -> TileCoord {
        self.player_start
    }

    /// Tile holding the exit.
    #[must_use]
    pub const fn exit(&self) -> TileCoord {
        self.exit
    }

    /// Code stored at `tile`, if it lies inside the layout.
    #[must_use]
    pub fn code(&self, tile: TileCoord) -> Option<TileCode> {
        maze_escape_core::grid_index(tile, self.columns, self.rows)
            .and_then(|index| self.tiles.get(index).copied())
    }

    /// Iterator over every tile and its code in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (TileCoord, TileCode)> + '_ {
        let columns = self.columns.max(1) as usize;
        self.tiles.iter().copied().enumerate().map(move |(index, code)| {
            (
                TileCoord::new((index % columns) as i32, (index / columns) as i32),
                code,
            )
        })
    }

    /// Tiles carrying the provided code in row-major order.
    pub fn tiles_with(&self, code: TileCode) -> impl Iterator<Item = TileCoord> + '_ {
        self.iter()
            .filter(move |(_, candidate)| *candidate == code)
            .map(|(tile, _)| tile)
    }
}

impl FromStr for MazeLayout {
    type Err = LayoutError;

    /// Parses one row per non-blank line; surrounding indentation is ignored.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut rows = Vec::new();
        for (row_index, line) in text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .enumerate()
        {
            let mut row = Vec::with_capacity(line.len());
            for (column_index, symbol) in line.chars().enumerate() {
                let code = TileCode::from_char(symbol).ok_or(LayoutError::UnknownTile {
                    symbol,
                    column: column_index,
                    row: row_index,
                })?;
                row.push(code);
            }
            rows.push(row);
        }
        Self::from_rows(&rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_glyph_and_numeric_codes() {
        let glyphs: MazeLayout = "#####\n#P.C#\n#E.X#\n#####".parse().expect("valid layout");
        let digits: MazeLayout = "11111\n12051\n14031\n11111".parse().expect("valid layout");

        assert_eq!(glyphs, digits);
        assert_eq!(glyphs.columns(), 5);
        assert_eq!(glyphs.rows(), 4);
        assert_eq!(glyphs.player_start(), TileCoord::new(1, 1));
        assert_eq!(glyphs.exit(), TileCoord::new(3, 2));
        assert_eq!(
            glyphs.tiles_with(TileCode::EnemyStart).collect::<Vec<_>>(),
            vec![TileCoord::new(1, 2)]
        );
    }

    #[test]
    fn rejects_missing_player_start() {
        let error = "###\n#X#\n###".parse::<MazeLayout>().unwrap_err();
        assert_eq!(error, LayoutError::MissingPlayerStart);
    }

    #[test]
    fn rejects_missing_exit() {
        let error = "###\n#P#\n###".parse::<MazeLayout>().unwrap_err();
        assert_eq!(error, LayoutError::MissingExit);
    }

    #[test]
    fn rejects_duplicate_markers() {
        let players = "####\n#PP#\n#X.#\n####".parse::<MazeLayout>().unwrap_err();
        assert_eq!(
            players,
            LayoutError::DuplicatePlayerStart {
                second: TileCoord::new(2, 1)
            }
        );

        let exits = "####\n#PX#\n#X.#\n####".parse::<MazeLayout>().unwrap_err();
        assert_eq!(
            exits,
            LayoutError::DuplicateExit {
                second: TileCoord::new(1, 2)
            }
        );
    }

    #[test]
    fn rejects_ragged_rows() {
        let error = "####\n#PX\n####".parse::<MazeLayout>().unwrap_err();
        assert_eq!(
            error,
            LayoutError::RaggedRow {
                row: 1,
                expected: 4,
                found: 3
            }
        );
    }

    #[test]
    fn rejects_unknown_codes() {
        let error = "###\n#P?\n#X#".parse::<MazeLayout>().unwrap_err();
        assert_eq!(
            error,
            LayoutError::UnknownTile {
                symbol: '?',
                column: 2,
                row: 1
            }
        );
    }

    #[test]
    fn rejects_empty_layout() {
        assert_eq!("\n  \n".parse::<MazeLayout>().unwrap_err(), LayoutError::Empty);
    }
}
