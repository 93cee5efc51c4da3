//! Error types for catalog loading and dispatch generation
//!
//! Every failure the generator can hit is a configuration problem found
//! before anything is emitted, so a single error enum covers file loading,
//! catalog validation and the post-emission exhaustiveness check.

use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize catalog: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Catalog file not found: {0}")]
    NotFound(String),

    #[error("Type catalog is empty")]
    EmptyTypeCatalog,

    #[error("Element type '{0}' is declared more than once")]
    DuplicateType(String),

    #[error("Element types '{first}' and '{second}' share ordinal {ordinal}")]
    DuplicateTypeOrdinal {
        ordinal: u32,
        first: String,
        second: String,
    },

    #[error("Excluded type '{0}' is not in the type catalog")]
    UnknownExcludedType(String),

    #[error("Arity group {0} has no opcodes")]
    EmptyGroup(u32),

    #[error("Arity {0} is declared by more than one group")]
    DuplicateArityGroup(u32),

    #[error("Opcode '{name}' appears in both {first} and {second}")]
    DuplicateOpcode {
        name: String,
        first: String,
        second: String,
    },

    #[error("Opcodes '{first}' and '{second}' share ordinal {ordinal}")]
    DuplicateOpcodeOrdinal {
        ordinal: u32,
        first: String,
        second: String,
    },

    #[error("Control opcode '{name}' also appears in arity group {arity}")]
    ControlInNumericGroup { name: String, arity: u32 },

    #[error("Arity {0} is not supported by the handler calling convention (expected 1..={max})", max = crate::catalog::MAX_ARITY)]
    UnsupportedArity(i64),

    #[error("Key base {base} must be greater than the largest type ordinal {max_type_ordinal}")]
    BaseTooSmall { base: u32, max_type_ordinal: u32 },

    #[error("No dispatch arms: every (opcode, type) pair is excluded or no numeric opcodes exist")]
    EmptyDispatch,

    #[error("Opcodes '{first}' and '{second}' both map to handler '{handler}'")]
    DuplicateHandler {
        handler: String,
        first: String,
        second: String,
    },

    #[error("'{0}' is not a valid identifier for generated code")]
    InvalidIdentifier(String),

    #[error("Dispatch key {key} is shared by {first} and {second}")]
    KeyCollision {
        key: u64,
        first: String,
        second: String,
    },

    #[error("No dispatch arm for opcode '{opcode}' with type '{element}'")]
    MissingArm { opcode: String, element: String },

    #[error("Dispatch arm for opcode '{opcode}' with type '{element}' has no catalog pair")]
    UnexpectedArm { opcode: String, element: String },

    #[error("Dispatch arm for opcode '{opcode}' names handler '{handler}', which is not declared")]
    UnknownHandler { handler: String, opcode: String },
}

/// Result type for configuration and generation operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
