use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScreenError {
    #[error("insufficient history for {symbol}: {got} bars, need {need}")]
    InsufficientHistory {
        symbol: String,
        got: usize,
        need: usize,
    },

    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    #[error("computation error: {0}")]
    Computation(String),

    #[error("invalid criteria: {0}")]
    InvalidCriteria(String),

    #[error("API error: {0}")]
    ApiError(String),
}
