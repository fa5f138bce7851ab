use super::{BytecodeCheck, Divergence};
use thiserror::Error;

/// A failed bytecode check together with the place where the values diverge.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[error("{check} mismatch: {divergence}")]
pub struct BytecodeMismatch {
    pub check: BytecodeCheck,
    pub divergence: Divergence,
}

#[derive(Error, Clone, Debug, PartialEq)]
pub enum ReconcileError {
    #[error("invalid hex encoding: {0}")]
    InvalidEncoding(#[from] hex::FromHexError),
    #[error(
        "deployment salt {salt} was not found at the end of the bytecode ({bytecode_len} bytes)"
    )]
    SaltNotFound { salt: String, bytecode_len: usize },
    #[error("no bytecode comparison was requested")]
    NoComparisonRequested,
}
