//! Handler stub emission
//!
//! One type-parameterized handler per numeric opcode. The signature (name,
//! operand count) is derived from the catalog; the kernel body is left for a
//! kernel author to write.

use crate::catalog::{Catalog, Opcode};
use log::debug;
use serde::Serialize;

/// Generic handler declaration for one opcode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerSignature {
    /// Handler symbol, e.g. `ve_add`
    pub name: String,
    /// Opcode the handler implements
    pub opcode: String,
    pub arity: u32,
    /// Operand parameter names, `op1..=opN`; the first is the output
    pub operands: Vec<String>,
}

impl HandlerSignature {
    pub fn operand_count(&self) -> usize {
        self.operands.len()
    }
}

/// Derive the stub for an opcode.
///
/// Control opcodes have no handler; they get an empty operand list and are
/// never passed here by [`emit_stubs`].
pub fn emit_stub(catalog: &Catalog, op: &Opcode) -> HandlerSignature {
    let arity = op.arity().map_or(0, |a| a.get());
    HandlerSignature {
        name: catalog.naming().handler_name(op),
        opcode: op.name.clone(),
        arity,
        operands: (1..=arity).map(|i| format!("op{}", i)).collect(),
    }
}

/// Stubs for every numeric opcode, in declaration order
pub fn emit_stubs(catalog: &Catalog) -> Vec<HandlerSignature> {
    let stubs: Vec<_> = catalog
        .opcodes()
        .numeric()
        .map(|op| emit_stub(catalog, op))
        .collect();
    debug!(
        "emitted {} handler stubs for catalog '{}'",
        stubs.len(),
        catalog.name()
    );
    stubs
}
