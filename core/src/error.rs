use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Grid has no rows")]
    EmptyGrid,
    #[error("Grid rows differ in width")]
    RaggedGrid,
    #[error("Grid exceeds the addressable size")]
    GridTooLarge,
    #[error("Solution count does not match row count")]
    SolutionRowMismatch,
    #[error("Solution must pick exactly five columns")]
    WrongSolutionSize,
    #[error("Solution column outside the grid")]
    SolutionOutOfBounds,
    #[error("Solution lists a column twice")]
    DuplicateSolutionColumn,
}

pub type Result<T> = core::result::Result<T, GameError>;
