//! vedispatch - dispatch generator for vector-engine bytecode
//!
//! Generates the instruction-dispatch routine of a vector engine from a
//! catalog of element types and opcodes. Each non-control opcode is paired
//! with each dispatchable type under a collision-free integer key
//! (`opcode * BASE + type`), and every key gets one arm that calls the
//! opcode's handler specialized for that type through an arity-specific
//! operand iterator.
//!
//! # Features
//!
//! - **Validated catalogs**: duplicate names, ordinal clashes, unsupported
//!   arities and key collisions are rejected before any text is produced
//! - **Exhaustive dispatch**: exactly one arm per (opcode, type) pair
//! - **Two targets**: C++ `switch` (the engine's native form) and Rust `match`
//! - **Handler stubs**: one generic declaration per numeric opcode
//! - **Catalog files**: TOML description of types, groups and naming rules
//! - **In-process dispatch**: [`exec::Dispatcher`] routes with the same table
//!
//! # Example
//!
//! ```rust
//! use vedispatch::catalog::Catalog;
//! use vedispatch::generator::generate;
//! use vedispatch::render::Emit;
//!
//! let catalog = Catalog::builder()
//!     .types(["INT32", "FLOAT64"])
//!     .control(["SYNC"])
//!     .group(3, ["ADD", "MUL"])
//!     .build()
//!     .unwrap();
//!
//! let artifact = generate(&catalog, Emit::All).unwrap();
//! assert_eq!(artifact.table.len(), 4);
//! assert!(artifact.source().contains("iter_3<int32>(instr, &add);"));
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │ vedispatch.toml │  or the built-in vector-engine table
//! └────────┬────────┘
//!          ▼
//! ┌─────────────────┐
//! │    Catalog      │  types + opcodes + key scheme + naming
//! └────────┬────────┘
//!     ┌────┴──────┐
//!     ▼           ▼
//! ┌────────┐  ┌────────┐
//! │  arms  │  │ stubs  │  emit
//! └───┬────┘  └───┬────┘
//!     └────┬──────┘
//!          ▼
//! ┌─────────────────┐
//! │ C++ / Rust text │  render
//! └─────────────────┘
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod build_support;
pub mod catalog;
pub mod config;
pub mod emit;
pub mod error;
pub mod exec;
pub mod generator;
pub mod key;
pub mod render;

// Re-export commonly used types
pub use catalog::{
    Arity, Catalog, CatalogBuilder, ElementType, Naming, Opcode, OpcodeCatalog, OpcodeKind,
    TypeCatalog, MAX_ARITY,
};
pub use config::CatalogFile;
pub use emit::{emit_dispatch, emit_stub, emit_stubs, DispatchArm, DispatchTable, HandlerSignature};
pub use error::{ConfigError, ConfigResult};
pub use exec::{Dispatcher, ExecStatus};
pub use generator::{generate, Generator};
pub use key::{DispatchKey, KeyScheme, DEFAULT_BASE};
pub use render::{render, DispatchArtifact, Emit, KeyStyle, RenderOptions, Target};
