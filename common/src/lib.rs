//! Types shared between the minesweeper engine and whatever presents it.

pub mod models;
pub mod protocol;
