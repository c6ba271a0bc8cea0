use minesweeper_common::{
    models::Pos,
    protocol::{CellUpdate, RevealOutcome},
};
use tracing::{debug, warn};

use super::neighbors;
use crate::data::{CellState, Field};

impl Field {
    /// Reveals `pos`, flooding outward from zero-adjacency cells.
    ///
    /// Out-of-bounds, flagged and already revealed targets are ignored. Every
    /// newly revealed cell is pushed onto `updates` exactly once.
    pub fn reveal(&mut self, pos: Pos, updates: &mut Vec<CellUpdate>) -> RevealOutcome {
        let Some(cell) = self.cell_mut(pos) else {
            warn!("Invalid reveal position: {}", pos);
            return self.outcome();
        };

        match cell.state {
            CellState::Revealed => {
                debug!("Ignoring reveal on revealed cell {}", pos);
                return self.outcome();
            }
            CellState::Flagged => {
                debug!("Ignoring reveal on flagged cell {}", pos);
                return self.outcome();
            }
            CellState::Hidden => {}
        }

        if cell.mine {
            cell.state = CellState::Revealed;
            updates.push(CellUpdate {
                pos,
                value: (&*cell).into(),
            });
            return RevealOutcome::Loss;
        }

        let before = self.revealed;
        self.flood_reveal(pos, updates);
        debug!(
            "Revealed {} cells from {}, {} of {} safe cells open",
            self.revealed - before,
            pos,
            self.revealed,
            self.safe_cells()
        );

        self.outcome()
    }

    // The revealed state doubles as the visited set, so every cell is expanded at most once.
    fn flood_reveal(&mut self, start: Pos, updates: &mut Vec<CellUpdate>) {
        let size = self.size();
        let mut pending = vec![start];

        while let Some(pos) = pending.pop() {
            let Some(cell) = self.cell_mut(pos) else {
                continue;
            };
            if cell.state != CellState::Hidden || cell.mine {
                continue;
            }

            cell.state = CellState::Revealed;
            let adjacent = cell.adjacent;
            updates.push(CellUpdate {
                pos,
                value: (&*cell).into(),
            });
            self.revealed += 1;

            if adjacent == 0 {
                pending.extend(neighbors(size, pos).filter(|&p| !self.is_revealed(p)));
            }
        }
    }

    fn outcome(&self) -> RevealOutcome {
        if self.is_cleared() {
            RevealOutcome::Win
        } else {
            RevealOutcome::Continue
        }
    }

    /// Toggles the flag on a hidden cell and returns whether it is now flagged.
    ///
    /// Revealed and out-of-bounds cells are left alone and yield `None`.
    pub fn toggle_flag(&mut self, pos: Pos) -> Option<bool> {
        let Some(cell) = self.cell_mut(pos) else {
            warn!("Invalid flag position: {}", pos);
            return None;
        };

        let flagged = match cell.state {
            CellState::Hidden => {
                cell.state = CellState::Flagged;
                true
            }
            CellState::Flagged => {
                cell.state = CellState::Hidden;
                false
            }
            CellState::Revealed => {
                debug!("Ignoring flag action on revealed cell {}", pos);
                return None;
            }
        };

        if flagged {
            self.flags += 1;
        } else {
            self.flags -= 1;
        }
        debug!("Cell {} {}", pos, if flagged { "flagged" } else { "unflagged" });

        Some(flagged)
    }

    /// Hides every cell again and clears the counters. Mines stay put.
    pub fn reset(&mut self) {
        if self.revealed > 0 || self.flags > 0 {
            debug!("Resetting field with {} revealed, {} flagged", self.revealed, self.flags);
        }
        for cell in &mut self.cells {
            cell.state = CellState::Hidden;
        }
        self.revealed = 0;
        self.flags = 0;
    }
}
