//! Choice highlight state machine.
//!
//! Tracks which rendered choice is under keyboard/pointer focus. Positions index the ordered
//! sequence of *eligible* choices as last rendered (group headers and disabled choices are not
//! part of it). The machine remembers a position, not a choice identity: after the list changes
//! shape the highlight is restored at the same index, falling back to the last entry.

use crate::ids::ChoiceId;

/// Movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Towards the start of the list.
    Up,
    /// Towards the end of the list.
    #[default]
    Down,
}

/// Observable machine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HighlightState {
    /// Nothing highlighted.
    #[default]
    None,
    /// The entry at this position is highlighted.
    At(usize),
}

/// Highlight state machine over a list of eligible choice ids.
#[derive(Debug, Clone, Default)]
pub struct HighlightMachine {
    state: HighlightState,
    remembered: usize,
}

impl HighlightMachine {
    /// Create a machine with nothing highlighted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> HighlightState {
        self.state
    }

    /// Position that [`restore`](Self::restore) will try first.
    pub fn remembered(&self) -> usize {
        self.remembered
    }

    /// The highlighted choice in `candidates`, if any.
    pub fn current(&self, candidates: &[ChoiceId]) -> Option<ChoiceId> {
        match self.state {
            HighlightState::None => None,
            HighlightState::At(index) => candidates.get(index).copied(),
        }
    }

    fn set(&mut self, candidates: &[ChoiceId], index: usize) -> Option<ChoiceId> {
        self.state = HighlightState::At(index);
        self.remembered = index;
        candidates.get(index).copied()
    }

    /// Highlight a specific choice (pointer hover/click). No-op if it is not eligible.
    pub fn target(&mut self, candidates: &[ChoiceId], id: ChoiceId) -> Option<ChoiceId> {
        match candidates.iter().position(|candidate| *candidate == id) {
            Some(index) => self.set(candidates, index),
            None => self.current(candidates),
        }
    }

    /// Move one step. Enters at the first entry when nothing is highlighted; clamps at both ends.
    pub fn step(&mut self, candidates: &[ChoiceId], direction: Direction) -> Option<ChoiceId> {
        let last = candidates.len().checked_sub(1)?;
        let next = match self.state {
            HighlightState::None => 0,
            HighlightState::At(index) => {
                let index = index.min(last);
                match direction {
                    Direction::Up => index.saturating_sub(1),
                    Direction::Down => (index + 1).min(last),
                }
            }
        };
        self.set(candidates, next)
    }

    /// Jump to the first or last entry (page keys).
    pub fn jump(&mut self, candidates: &[ChoiceId], direction: Direction) -> Option<ChoiceId> {
        let last = candidates.len().checked_sub(1)?;
        let next = match direction {
            Direction::Up => 0,
            Direction::Down => last,
        };
        self.set(candidates, next)
    }

    /// Re-assert a highlight after the list was re-rendered without an explicit target.
    ///
    /// Uses the remembered position if it still exists, otherwise the last entry; clears the
    /// highlight when the list is empty. The remembered position itself is kept.
    pub fn restore(&mut self, candidates: &[ChoiceId]) -> Option<ChoiceId> {
        let Some(last) = candidates.len().checked_sub(1) else {
            self.state = HighlightState::None;
            return None;
        };
        let index = if self.remembered <= last {
            self.remembered
        } else {
            last
        };
        self.state = HighlightState::At(index);
        candidates.get(index).copied()
    }

    /// Drop the highlight and rewind the remembered position to the top.
    pub fn reset(&mut self) {
        self.state = HighlightState::None;
        self.remembered = 0;
    }
}
