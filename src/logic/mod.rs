use std::collections::HashSet;

use minesweeper_common::models::{self, BoardSize, GameParams, Pos};
use rand::Rng;
use tracing::{debug, instrument};

use crate::{
    data::{Cell, CellState, Field},
    error::ConfigError,
};

pub mod reveal;

fn validate_params(params: &GameParams) -> Result<usize, ConfigError> {
    let invalid = ConfigError::InvalidConfig {
        rows: params.rows,
        cols: params.cols,
        mines: params.mines,
    };

    let area = params.rows.checked_mul(params.cols).ok_or(invalid.clone())?;
    if params.rows == 0 || params.cols == 0 || params.mines == 0 || params.mines >= area {
        return Err(invalid);
    }

    Ok(area)
}

/// Rejection sampling: draw random coordinates until enough distinct ones are collected.
fn generate_mines<R: Rng>(params: &GameParams, rng: &mut R) -> HashSet<Pos> {
    let mut mines = HashSet::with_capacity(params.mines);
    let mut draws = 0usize;

    while mines.len() < params.mines {
        draws += 1;
        mines.insert(Pos {
            row: rng.random_range(0..params.rows),
            col: rng.random_range(0..params.cols),
        });
    }

    debug!("Placed {} mines in {} draws", params.mines, draws);
    mines
}

/// Positions in the Moore neighborhood of `pos`, clipped at the grid edges.
pub(crate) fn neighbors(size: BoardSize, pos: Pos) -> impl Iterator<Item = Pos> {
    (-1isize..=1)
        .flat_map(|dr| (-1isize..=1).map(move |dc| (dr, dc)))
        .filter(|&(dr, dc)| dr != 0 || dc != 0)
        .filter_map(move |(dr, dc)| {
            let row = pos.row.checked_add_signed(dr)?;
            let col = pos.col.checked_add_signed(dc)?;
            (row < size.rows && col < size.cols).then_some(Pos { row, col })
        })
}

fn count_adjacent_mines(mines: &HashSet<Pos>, pos: Pos, size: BoardSize) -> u8 {
    neighbors(size, pos).filter(|p| mines.contains(p)).count() as u8
}

fn generate_cells(size: BoardSize, mines: &HashSet<Pos>) -> Vec<Cell> {
    (0..size.rows)
        .flat_map(|row| (0..size.cols).map(move |col| Pos { row, col }))
        .map(|pos| {
            let mine = mines.contains(&pos);
            Cell {
                mine,
                adjacent: if mine {
                    0
                } else {
                    count_adjacent_mines(mines, pos, size)
                },
                state: CellState::Hidden,
            }
        })
        .collect()
}

impl From<&Cell> for models::Cell {
    fn from(value: &Cell) -> Self {
        match value.state {
            CellState::Hidden => Self::Hidden,
            CellState::Flagged => Self::Flagged,
            CellState::Revealed if value.mine => Self::Mine,
            CellState::Revealed => Self::Revealed {
                adjacent: value.adjacent,
            },
        }
    }
}

impl Field {
    /// Generates a field using the thread-local RNG.
    pub fn new(params: GameParams) -> Result<Self, ConfigError> {
        Self::generate(params, &mut rand::rng())
    }

    #[instrument(level = "trace", skip(rng))]
    pub fn generate<R: Rng>(params: GameParams, rng: &mut R) -> Result<Self, ConfigError> {
        validate_params(&params)?;
        let mines = generate_mines(&params, rng);
        Ok(Self::from_mine_set(params, &mines))
    }

    /// Builds a field with mines at exactly the given positions.
    ///
    /// Duplicate positions count once. Fails like [`Field::generate`] when the
    /// resulting layout is not playable or a position lies outside the grid.
    pub fn with_mines(rows: usize, cols: usize, mines: &[Pos]) -> Result<Self, ConfigError> {
        let mine_set: HashSet<Pos> = mines.iter().copied().collect();
        let params = GameParams {
            rows,
            cols,
            mines: mine_set.len(),
        };
        validate_params(&params)?;

        if mine_set.iter().any(|p| p.row >= rows || p.col >= cols) {
            return Err(ConfigError::InvalidConfig {
                rows,
                cols,
                mines: mine_set.len(),
            });
        }

        Ok(Self::from_mine_set(params, &mine_set))
    }

    fn from_mine_set(params: GameParams, mines: &HashSet<Pos>) -> Self {
        let size = params.size();
        Self {
            rows: params.rows,
            cols: params.cols,
            mines: params.mines,
            revealed: 0,
            flags: 0,
            cells: generate_cells(size, mines),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn size(&self) -> BoardSize {
        BoardSize {
            rows: self.rows,
            cols: self.cols,
        }
    }

    pub fn params(&self) -> GameParams {
        GameParams {
            rows: self.rows,
            cols: self.cols,
            mines: self.mines,
        }
    }

    pub fn mine_count(&self) -> usize {
        self.mines
    }

    /// Number of non-mine cells; revealing all of them wins the game.
    pub fn safe_cells(&self) -> usize {
        self.rows * self.cols - self.mines
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed
    }

    pub fn flag_count(&self) -> usize {
        self.flags
    }

    pub fn is_cleared(&self) -> bool {
        self.revealed == self.safe_cells()
    }

    pub fn validate_pos(&self, pos: &Pos) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    pub(crate) fn cell(&self, pos: Pos) -> Option<&Cell> {
        if !self.validate_pos(&pos) {
            return None;
        }
        self.cells.get(pos.col + pos.row * self.cols)
    }

    pub(crate) fn cell_mut(&mut self, pos: Pos) -> Option<&mut Cell> {
        if !self.validate_pos(&pos) {
            return None;
        }
        self.cells.get_mut(pos.col + pos.row * self.cols)
    }

    pub fn is_mine(&self, pos: Pos) -> bool {
        self.cell(pos).is_some_and(|cell| cell.mine)
    }

    /// Adjacency count of a safe cell; `None` for mines and out-of-bounds positions.
    pub fn adjacent(&self, pos: Pos) -> Option<u8> {
        self.cell(pos)
            .filter(|cell| !cell.mine)
            .map(|cell| cell.adjacent)
    }

    pub fn is_revealed(&self, pos: Pos) -> bool {
        self.cell(pos)
            .is_some_and(|cell| cell.state == CellState::Revealed)
    }

    pub fn is_flagged(&self, pos: Pos) -> bool {
        self.cell(pos)
            .is_some_and(|cell| cell.state == CellState::Flagged)
    }

    pub fn neighbors(&self, pos: Pos) -> impl Iterator<Item = Pos> {
        neighbors(self.size(), pos)
    }

    /// All mine positions in row-major order.
    pub fn mine_positions(&self) -> Vec<Pos> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.mine)
            .map(|(i, _)| Pos {
                row: i / self.cols,
                col: i % self.cols,
            })
            .collect()
    }

    pub fn cell_view(&self, pos: Pos) -> Option<models::Cell> {
        self.cell(pos).map(models::Cell::from)
    }

    pub fn board_view(&self) -> Vec<Vec<models::Cell>> {
        self.cells
            .iter()
            .map(|cell| cell.into())
            .collect::<Vec<models::Cell>>()
            .chunks(self.cols)
            .map(|chunk| chunk.to_vec())
            .collect()
    }

    /// Board view with every mine shown, for the end-of-game screen.
    ///
    /// Does not change any cell state.
    pub fn board_view_with_mines(&self) -> Vec<Vec<models::Cell>> {
        self.cells
            .iter()
            .map(|cell| {
                if cell.mine {
                    models::Cell::Mine
                } else {
                    cell.into()
                }
            })
            .collect::<Vec<models::Cell>>()
            .chunks(self.cols)
            .map(|chunk| chunk.to_vec())
            .collect()
    }
}
