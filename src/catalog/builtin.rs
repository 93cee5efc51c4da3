//! Built-in vector engine catalog
//!
//! The opcode and type table the engine ships with. Arity counts every
//! operand the handler touches, output included: `VE_ADD` reads two inputs
//! and writes one output, so it sits in the 3-operand group.

use super::{Catalog, CatalogBuilder, Naming};
use crate::error::ConfigResult;
use crate::key::DEFAULT_BASE;

pub const NAME: &str = "vector-engine";

/// Element types in runtime enum order
pub const TYPES: &[&str] = &[
    "VE_BOOL",
    "VE_INT8",
    "VE_INT16",
    "VE_INT32",
    "VE_INT64",
    "VE_UINT8",
    "VE_UINT16",
    "VE_UINT32",
    "VE_UINT64",
    "VE_FLOAT16",
    "VE_FLOAT32",
    "VE_FLOAT64",
    "VE_COMPLEX64",
    "VE_COMPLEX128",
    "VE_UNKNOWN",
];

/// Placeholder types with no numeric meaning
pub const EXCLUDED: &[&str] = &["VE_UNKNOWN"];

/// Opcodes that never reach numeric dispatch
pub const CONTROL: &[&str] = &["VE_NONE", "VE_DISCARD", "VE_RELEASE", "VE_SYNC"];

/// One row of the opcode table
pub struct GroupRow {
    pub arity: i64,
    pub opcodes: &'static [&'static str],
}

pub const GROUPS: &[GroupRow] = &[
    GroupRow {
        arity: 1,
        opcodes: &["VE_RANDOM", "VE_RANGE"],
    },
    GroupRow {
        arity: 2,
        opcodes: &[
            "VE_IDENTITY",
            "VE_ABSOLUTE",
            "VE_NEGATIVE",
            "VE_INVERT",
            "VE_LOGICAL_NOT",
            "VE_SQRT",
            "VE_EXP",
            "VE_LOG",
            "VE_SIN",
            "VE_COS",
            "VE_TAN",
            "VE_FLOOR",
            "VE_CEIL",
            "VE_ADD_REDUCE",
            "VE_MULTIPLY_REDUCE",
            "VE_MINIMUM_REDUCE",
            "VE_MAXIMUM_REDUCE",
        ],
    },
    GroupRow {
        arity: 3,
        opcodes: &[
            "VE_ADD",
            "VE_SUBTRACT",
            "VE_MULTIPLY",
            "VE_DIVIDE",
            "VE_POWER",
            "VE_MOD",
            "VE_MAXIMUM",
            "VE_MINIMUM",
            "VE_ARCTAN2",
            "VE_EQUAL",
            "VE_NOT_EQUAL",
            "VE_GREATER",
            "VE_GREATER_EQUAL",
            "VE_LESS",
            "VE_LESS_EQUAL",
            "VE_LOGICAL_AND",
            "VE_LOGICAL_OR",
            "VE_BITWISE_AND",
            "VE_BITWISE_OR",
            "VE_BITWISE_XOR",
            "VE_LEFT_SHIFT",
            "VE_RIGHT_SHIFT",
        ],
    },
];

/// Builder pre-loaded with the built-in table
pub fn builder() -> CatalogBuilder {
    GROUPS.iter().fold(
        Catalog::builder()
            .name(NAME)
            .base(DEFAULT_BASE)
            .naming(Naming::new("VE_", "ve_"))
            .types(TYPES.iter().copied())
            .exclude(EXCLUDED.iter().copied())
            .control(CONTROL.iter().copied()),
        |builder, row| builder.group(row.arity, row.opcodes.iter().copied()),
    )
}

pub fn catalog() -> ConfigResult<Catalog> {
    builder().build()
}
