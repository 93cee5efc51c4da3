//! Dispatch key derivation
//!
//! A dispatch key packs an (opcode, element type) pair into one integer:
//!
//! ```text
//! key = opcode_ordinal * BASE + type_ordinal
//! ```
//!
//! The encoding is injective exactly when `BASE` exceeds every type ordinal,
//! so [`KeyScheme::new`] refuses any base that does not. Keys are `u64` while
//! ordinals and the base are `u32`, so the arithmetic cannot overflow.

use crate::catalog::{ElementType, Opcode, TypeCatalog};
use crate::error::{ConfigError, ConfigResult};
use serde::Serialize;
use std::fmt;

/// Base used when a catalog does not set one
pub const DEFAULT_BASE: u32 = 100;

/// Integer discriminant for an (opcode, element type) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DispatchKey(pub u64);

impl DispatchKey {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DispatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Validated key encoding for one type catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyScheme {
    base: u32,
}

impl KeyScheme {
    /// Check that `base` keeps every key distinct for this type catalog
    pub fn new(base: u32, types: &TypeCatalog) -> ConfigResult<Self> {
        let max_type_ordinal = types.max_ordinal();
        if base <= max_type_ordinal {
            return Err(ConfigError::BaseTooSmall {
                base,
                max_type_ordinal,
            });
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn derive(&self, op: &Opcode, ty: &ElementType) -> DispatchKey {
        self.derive_raw(op.ordinal, ty.ordinal)
    }

    /// Derive from runtime ordinals, as the generated routine does
    pub fn derive_raw(&self, opcode: u32, element: u32) -> DispatchKey {
        DispatchKey(u64::from(opcode) * u64::from(self.base) + u64::from(element))
    }

    /// Inverse of [`derive_raw`](Self::derive_raw)
    pub fn split(&self, key: DispatchKey) -> (u64, u64) {
        let base = u64::from(self.base);
        (key.0 / base, key.0 % base)
    }
}
