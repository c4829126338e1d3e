use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Coordinates outside the board")]
    InvalidCoordinate,
    #[error("Invalid board configuration: {0}")]
    InvalidConfiguration(&'static str),
}

pub type Result<T> = core::result::Result<T, GameError>;
