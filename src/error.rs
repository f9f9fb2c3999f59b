use thiserror::Error;

#[derive(Error, Debug)]
pub enum HearthError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("coefficient {0} is not valid")]
    InvalidCoefficient(i32),

    #[error("no route between chunks {from} and {to}")]
    Topology { from: usize, to: usize },

    #[error("transport failure between chunks {from} and {to}: {reason}")]
    Comms {
        from: usize,
        to: usize,
        reason: String,
    },
}

pub type HearthResult<T> = Result<T, HearthError>;
