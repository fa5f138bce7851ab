use super::{decode_hex, strip_hex_prefix, ReconcileError};
use bytes::Bytes;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::{fmt, str::FromStr};

/// Non-functional suffix appended to creation bytecode: ABI encoded
/// constructor arguments and/or a metadata hash.
///
/// The salt length is always the byte length of its own encoding.
/// An empty salt is a valid value meaning "nothing to strip".
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct DeploymentSalt {
    bytes: Bytes,
}

impl DeploymentSalt {
    pub fn new(bytes: Bytes) -> Self {
        Self { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Returns `bytecode` without the salt, which must be its suffix.
    pub fn strip_from<'a>(&self, bytecode: &'a [u8]) -> Result<&'a [u8], ReconcileError> {
        match bytecode.strip_suffix(self.bytes.as_ref()) {
            Some(stripped) => Ok(stripped),
            None => Err(ReconcileError::SaltNotFound {
                salt: self.to_string(),
                bytecode_len: bytecode.len(),
            }),
        }
    }
}

impl FromStr for DeploymentSalt {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_hex(s).map(Self::new)
    }
}

impl fmt::Display for DeploymentSalt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.bytes))
    }
}

/// Removes the deployment salt from the tail of hex encoded bytecode.
///
/// The returned value keeps the prefix and the digit case of `bytecode`,
/// so for a salt found at the end `result + salt == bytecode` holds
/// textually whenever both inputs share the same case and the salt has
/// no prefix.
pub fn remove_deployment_salt(bytecode: &str, salt: &str) -> Result<String, ReconcileError> {
    let salt = DeploymentSalt::from_str(salt)?;
    let decoded = decode_hex(bytecode)?;
    let stripped = salt.strip_from(&decoded)?;

    let prefix_len = bytecode.len() - strip_hex_prefix(bytecode).len();
    Ok(bytecode[..prefix_len + stripped.len() * 2].to_string())
}
