use super::{decode_hex, BytecodeMismatch, ReconcileError};
use crate::types::Mismatch;
use serde::Serialize;
use std::fmt;

/// Names the comparison a result belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BytecodeCheck {
    /// Creation bytecode of two deployments, constructor arguments stripped.
    Initialization,
    /// Deployed bytecode of two deployments as reported by their explorers.
    Deployment,
    /// Deployed bytecode reported by an explorer against the code returned by rpc.
    Runtime,
}

impl fmt::Display for BytecodeCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BytecodeCheck::Initialization => "initialization bytecode",
            BytecodeCheck::Deployment => "deployed bytecode",
            BytecodeCheck::Runtime => "runtime bytecode",
        };
        f.write_str(name)
    }
}

/// First differing byte of two bytecode values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Divergence {
    /// Offset of the first byte that differs. Equals the shorter length
    /// when one value is a prefix of the other.
    pub offset: usize,
    pub length: Mismatch<usize>,
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "values differ starting at byte {}; byte length {}",
            self.offset, self.length
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ComparisonResult {
    pub matched: bool,
    pub mismatch_detail: Option<Divergence>,
}

impl ComparisonResult {
    fn matched() -> Self {
        Self {
            matched: true,
            mismatch_detail: None,
        }
    }

    /// Converts the result into an error naming the check that failed.
    pub fn into_result(self, check: BytecodeCheck) -> Result<(), BytecodeMismatch> {
        match self.mismatch_detail {
            Some(divergence) => Err(BytecodeMismatch { check, divergence }),
            None => Ok(()),
        }
    }
}

pub fn compare_bytes(expected: &[u8], found: &[u8]) -> ComparisonResult {
    if expected == found {
        return ComparisonResult::matched();
    }

    let offset = expected
        .iter()
        .zip(found)
        .position(|(expected, found)| expected != found)
        .unwrap_or_else(|| expected.len().min(found.len()));

    ComparisonResult {
        matched: false,
        mismatch_detail: Some(Divergence {
            offset,
            length: Mismatch::new(expected.len(), found.len()),
        }),
    }
}

/// Compares two hex encoded bytecode values.
///
/// Both values are decoded first, so the `0x` prefix and hex digit case
/// do not affect the result.
pub fn compare_bytecode(expected: &str, found: &str) -> Result<ComparisonResult, ReconcileError> {
    let expected = decode_hex(expected)?;
    let found = decode_hex(found)?;
    Ok(compare_bytes(&expected, &found))
}
