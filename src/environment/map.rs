//! Frozen Lake map layouts

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    types::{Action, StateId},
};

/// Built-in 4x4 layout.
pub const MAP_4X4: [&str; 4] = ["SFFF", "FHFH", "FFFH", "HFFG"];

/// Built-in 8x8 layout.
pub const MAP_8X8: [&str; 8] = [
    "SFFFFFFF", "FFFFFFFF", "FFFHFFFF", "FFFFFHFF", "FFFHFFFF", "FHHFFFHF", "FHFFHFHF", "FFFHFFFG",
];

/// One cell of the lake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    Start,
    Frozen,
    Hole,
    Goal,
}

impl Tile {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'S' => Some(Tile::Start),
            'F' => Some(Tile::Frozen),
            'H' => Some(Tile::Hole),
            'G' => Some(Tile::Goal),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Tile::Start => 'S',
            Tile::Frozen => 'F',
            Tile::Hole => 'H',
            Tile::Goal => 'G',
        }
    }

    /// Holes and goals end the episode.
    pub fn is_terminal(self) -> bool {
        matches!(self, Tile::Hole | Tile::Goal)
    }
}

/// Rectangular grid of tiles. States are numbered row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LakeMap {
    rows: usize,
    cols: usize,
    tiles: Vec<Tile>,
}

impl LakeMap {
    /// Parse a map from its rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMap`] for empty or ragged maps, unknown tile
    /// characters, a start count other than one, or a map without a goal.
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidMap { reason };

        let cols = rows.first().map_or(0, |row| row.as_ref().chars().count());
        if rows.is_empty() || cols == 0 {
            return Err(invalid("map has no cells".to_string()));
        }

        let mut tiles = Vec::with_capacity(rows.len() * cols);
        for (row_idx, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.chars().count() != cols {
                return Err(invalid(format!(
                    "row {row_idx} has {} cells, expected {cols}",
                    row.chars().count()
                )));
            }
            for (col_idx, c) in row.chars().enumerate() {
                let tile = Tile::from_char(c).ok_or_else(|| {
                    invalid(format!(
                        "unknown tile '{c}' at row {row_idx}, column {col_idx}"
                    ))
                })?;
                tiles.push(tile);
            }
        }

        let starts = tiles.iter().filter(|t| **t == Tile::Start).count();
        if starts != 1 {
            return Err(invalid(format!("expected exactly one start, found {starts}")));
        }
        if !tiles.contains(&Tile::Goal) {
            return Err(invalid("map has no goal".to_string()));
        }

        Ok(Self {
            rows: rows.len(),
            cols,
            tiles,
        })
    }

    /// Look up a built-in layout by name (`4x4` or `8x8`).
    pub fn named(name: &str) -> Result<Self> {
        match name {
            "4x4" => Self::parse(&MAP_4X4),
            "8x8" => Self::parse(&MAP_8X8),
            other => Err(Error::UnknownMap {
                name: other.to_string(),
                expected: "4x4, 8x8".to_string(),
            }),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn state_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn tile(&self, state: StateId) -> Result<Tile> {
        self.tiles
            .get(state)
            .copied()
            .ok_or(Error::StateOutOfRange {
                state,
                state_count: self.tiles.len(),
            })
    }

    pub fn start_state(&self) -> StateId {
        self.tiles
            .iter()
            .position(|t| *t == Tile::Start)
            .unwrap_or_default()
    }

    pub fn coords(&self, state: StateId) -> (usize, usize) {
        (state / self.cols, state % self.cols)
    }

    pub fn state_at(&self, row: usize, col: usize) -> StateId {
        row * self.cols + col
    }

    /// Cell reached by moving from `state`; walls leave the agent in place.
    pub fn neighbor(&self, state: StateId, action: Action) -> StateId {
        let (row, col) = self.coords(state);
        let (d_row, d_col) = action.offset();
        let row = row
            .checked_add_signed(d_row)
            .filter(|r| *r < self.rows)
            .unwrap_or(row);
        let col = col
            .checked_add_signed(d_col)
            .filter(|c| *c < self.cols)
            .unwrap_or(col);
        self.state_at(row, col)
    }

    /// Map rows as strings.
    pub fn row_strings(&self) -> Vec<String> {
        self.tiles
            .chunks(self.cols)
            .map(|row| row.iter().map(|t| t.as_char()).collect())
            .collect()
    }
}

impl FromStr for LakeMap {
    type Err = Error;

    /// Accepts a built-in name or rows separated by newlines, commas or `/`.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed == "4x4" || trimmed == "8x8" {
            return Self::named(trimmed);
        }
        let rows: Vec<&str> = trimmed
            .split(['\n', ',', '/'])
            .map(str::trim)
            .filter(|row| !row.is_empty())
            .collect();
        Self::parse(&rows)
    }
}

impl fmt::Display for LakeMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.row_strings() {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}
