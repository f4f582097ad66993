// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Newtype wrappers for validated inputs.
//!
//! All types validate their invariants at creation time.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Maximum length of an arm name.
const MAX_ARM_NAME_LEN: usize = 64;

/// Validated arm name.
/// Must be non-empty, alphanumeric with hyphens/underscores/dots, max 64 chars.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArmName(String);

impl ArmName {
    /// Create a new ArmName with validation.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();

        if name.is_empty() {
            return Err(ValidationError::InvalidFieldValue {
                field: "arm_name",
                value: name,
                reason: "Arm name cannot be empty".to_string(),
            });
        }

        if name.len() > MAX_ARM_NAME_LEN {
            return Err(ValidationError::InvalidFieldValue {
                field: "arm_name",
                value: name.clone(),
                reason: format!(
                    "Arm name too long: {} chars (max {})",
                    name.len(),
                    MAX_ARM_NAME_LEN
                ),
            });
        }

        if !name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
        {
            return Err(ValidationError::InvalidFieldValue {
                field: "arm_name",
                value: name,
                reason: "Arm name must contain only alphanumeric characters, hyphens, underscores, and dots".to_string(),
            });
        }

        Ok(Self(name))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArmName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ArmName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ArmName> for String {
    fn from(name: ArmName) -> Self {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_arm_names() {
        assert!(ArmName::new("rpc").is_ok());
        assert!(ArmName::new("http-get").is_ok());
        assert!(ArmName::new("ws_v2.1").is_ok());
    }

    #[test]
    fn test_invalid_arm_names() {
        assert!(ArmName::new("").is_err());
        assert!(ArmName::new("has space").is_err());
        assert!(ArmName::new("a".repeat(65)).is_err());
    }

    #[test]
    fn test_serde_roundtrip_validates() {
        let name: ArmName = serde_json::from_str("\"rpc\"").unwrap();
        assert_eq!(name.as_str(), "rpc");
        assert!(serde_json::from_str::<ArmName>("\"\"").is_err());
    }
}
