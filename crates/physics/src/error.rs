use compute::ComputeError;
use thiserror::Error;

use crate::types::BodyId;

#[derive(Error, Debug)]
pub enum PhysicsError {
    #[error("compute backend error: {0}")]
    Compute(#[from] ComputeError),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("unknown body {0}")]
    UnknownBody(BodyId),
}
