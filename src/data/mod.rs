#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Hidden,
    Flagged,
    Revealed,
}

#[derive(Debug, Clone)]
pub struct Cell {
    pub mine: bool,
    pub adjacent: u8,
    pub state: CellState,
}

/// A generated minefield. Cells are stored row-major.
#[derive(Debug, Clone)]
pub struct Field {
    pub(crate) rows: usize,
    pub(crate) cols: usize,
    pub(crate) mines: usize,
    pub(crate) revealed: usize,
    pub(crate) flags: usize,
    pub(crate) cells: Vec<Cell>,
}
