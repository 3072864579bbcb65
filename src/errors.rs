use thiserror::Error;

#[derive(Error, Debug)]
pub enum AeroError {
    #[error("Not enough points: found {found}, at least {required} required")]
    NotEnoughPoints { found: usize, required: usize },

    #[error("Non-finite coordinate at index {index}")]
    NonFiniteCoordinate { index: usize },

    #[error("Non-finite latent component at index {index}")]
    NonFiniteLatent { index: usize },

    #[error("Empty input")]
    EmptyInput,

    #[error("Unknown airfoil family: {0}")]
    UnknownFamily(String),

    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AeroError>;
