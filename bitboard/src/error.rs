use thiserror::Error;

/// Reasons a game coming from the PGN source can't be used
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedGame {
    #[error("missing or unfinished Result header")]
    MissingResult,
    #[error("PlyCount header says {declared} plies but the game has {actual} moves")]
    PlyCountMismatch { declared: usize, actual: usize },
    #[error("unreadable PlyCount header `{0}`")]
    InvalidPlyCount(String),
    #[error("invalid FEN header `{0}`")]
    InvalidFen(String),
    #[error("illegal move `{san}` at ply {ply}")]
    IllegalMove { ply: usize, san: String },
}

/// Errors while sampling a single game
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleError {
    #[error("only {found} eligible positions, {required} required")]
    InsufficientEligiblePositions { found: usize, required: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SamplerConfigError {
    #[error("inclusion probability must be in [0, 1], got {0}")]
    InvalidProbability(f64),
}
