//! Reconciliation of reported bytecode.
//!
//! Bytecode is treated as an opaque byte sequence: values are decoded from
//! hex (optional `0x` prefix, any case) and compared byte by byte. No
//! instruction level parsing happens here.

mod compare;
mod errors;
mod salt;

pub use compare::{compare_bytecode, compare_bytes, BytecodeCheck, ComparisonResult, Divergence};
pub use errors::{BytecodeMismatch, ReconcileError};
pub use salt::{remove_deployment_salt, DeploymentSalt};

use bytes::Bytes;

pub(crate) fn strip_hex_prefix(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

/// Decodes hex encoded bytecode with an optional `0x` prefix.
pub fn decode_hex(value: &str) -> Result<Bytes, ReconcileError> {
    let bytes = hex::decode(strip_hex_prefix(value))?;
    Ok(Bytes::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decode_with_and_without_prefix() {
        assert_eq!(decode_hex("0x6080").unwrap(), Bytes::from_static(&[0x60, 0x80]));
        assert_eq!(decode_hex("0X6080").unwrap(), Bytes::from_static(&[0x60, 0x80]));
        assert_eq!(decode_hex("6080").unwrap(), Bytes::from_static(&[0x60, 0x80]));
        assert_eq!(decode_hex("0xAbCd").unwrap(), Bytes::from_static(&[0xab, 0xcd]));
        assert!(decode_hex("0x").unwrap().is_empty());
        assert!(decode_hex("").unwrap().is_empty());
    }

    #[test]
    fn decode_invalid_hex() {
        for value in ["0x608", "0xzz", "0x0x60", "60 80"] {
            let err = decode_hex(value).expect_err("value should not be decoded");
            assert!(
                matches!(err, ReconcileError::InvalidEncoding(_)),
                "unexpected error for {value}: {err:?}"
            );
        }
    }
}
