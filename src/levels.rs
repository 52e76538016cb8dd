use std::fs;
use std::io;

use thiserror::Error;

use crate::grid::ParseError;
use crate::state::PuzzleState;

/// Error type for level loading operations.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid blueprint #{index}: {source}")]
    InvalidLevel {
        index: usize,
        #[source]
        source: ParseError,
    },
}

/// A collection of blueprints read from one file.
#[derive(Debug)]
pub struct Levels {
    levels: Vec<PuzzleState>,
}

impl Levels {
    /// Parse blueprints from a string.
    ///
    /// Blueprints are separated by empty lines. Lines starting with `;` are
    /// comments and also end the current blueprint.
    pub fn from_text(contents: &str) -> Result<Self, LevelError> {
        let mut levels = Vec::new();
        let mut current_level = String::new();

        for line in contents.lines() {
            let is_separator = line.trim().is_empty() || line.trim_start().starts_with(';');
            if is_separator {
                if !current_level.is_empty() {
                    levels.push(Self::parse_level(&current_level, levels.len() + 1)?);
                    current_level.clear();
                }
                continue;
            }

            if !current_level.is_empty() {
                current_level.push('\n');
            }
            current_level.push_str(line.trim_end());
        }

        // Last level if the file doesn't end with an empty line
        if !current_level.is_empty() {
            levels.push(Self::parse_level(&current_level, levels.len() + 1)?);
        }

        Ok(Levels { levels })
    }

    fn parse_level(text: &str, index: usize) -> Result<PuzzleState, LevelError> {
        PuzzleState::parse(text).map_err(|source| LevelError::InvalidLevel { index, source })
    }

    /// Parse blueprints from a text file.
    pub fn from_file(path: &str) -> Result<Self, LevelError> {
        let contents = fs::read_to_string(path)?;
        Self::from_text(&contents)
    }

    /// Get the nth level (0-indexed).
    pub fn get(&self, index: usize) -> Option<&PuzzleState> {
        self.levels.get(index)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
