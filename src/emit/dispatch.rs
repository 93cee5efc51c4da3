//! Dispatch arm emission
//!
//! Expands the catalog's cross product into one arm per (numeric opcode,
//! dispatchable type) pair. Order is groups, then opcodes within a group,
//! then types, all in declaration order, so identical catalogs always yield
//! identical tables.

use crate::catalog::{Catalog, Opcode};
use crate::error::{ConfigError, ConfigResult};
use crate::key::DispatchKey;
use log::debug;
use serde::Serialize;
use std::collections::HashMap;

/// One case of the numeric dispatch switch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchArm {
    pub key: DispatchKey,
    pub opcode: String,
    pub opcode_ordinal: u32,
    pub element: String,
    pub element_ordinal: u32,
    /// Generated-code token of the element type
    pub token: String,
    pub arity: u32,
    /// Handler the arm invokes
    pub handler: String,
}

impl DispatchArm {
    fn describe(&self) -> String {
        format!("{} x {}", self.opcode, self.element)
    }
}

/// Control opcode as seen by the routine's first-level branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlEntry {
    pub name: String,
    pub ordinal: u32,
}

impl From<&Opcode> for ControlEntry {
    fn from(op: &Opcode) -> Self {
        Self {
            name: op.name.clone(),
            ordinal: op.ordinal,
        }
    }
}

/// Everything the renderer needs to lay out the dispatch routine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchTable {
    pub catalog: String,
    pub base: u32,
    pub controls: Vec<ControlEntry>,
    pub arms: Vec<DispatchArm>,
}

impl DispatchTable {
    pub fn arms(&self) -> &[DispatchArm] {
        &self.arms
    }

    pub fn len(&self) -> usize {
        self.arms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arms.is_empty()
    }

    pub fn lookup(&self, key: DispatchKey) -> Option<&DispatchArm> {
        self.arms.iter().find(|arm| arm.key == key)
    }

    pub fn is_control(&self, opcode_ordinal: u32) -> bool {
        self.controls.iter().any(|c| c.ordinal == opcode_ordinal)
    }

    /// Check the table against its catalog.
    ///
    /// Every (numeric opcode, dispatchable type) pair must have exactly one arm
    /// carrying its derived key, and no key may appear twice.
    pub fn verify(&self, catalog: &Catalog) -> ConfigResult<()> {
        let mut by_key: HashMap<DispatchKey, &DispatchArm> = HashMap::with_capacity(self.len());
        for arm in &self.arms {
            if let Some(first) = by_key.insert(arm.key, arm) {
                return Err(ConfigError::KeyCollision {
                    key: arm.key.get(),
                    first: first.describe(),
                    second: arm.describe(),
                });
            }
        }

        for op in catalog.opcodes().numeric() {
            for ty in catalog.types().dispatchable() {
                let key = catalog.derive_key(op, ty);
                match by_key.remove(&key) {
                    Some(arm) if arm.opcode == op.name && arm.element == ty.name => {}
                    _ => {
                        return Err(ConfigError::MissingArm {
                            opcode: op.name.clone(),
                            element: ty.name.clone(),
                        });
                    }
                }
            }
        }

        // Anything left over has no catalog pair: an excluded type, a control
        // opcode, or a name the catalog never declared.
        if let Some(arm) = self.arms.iter().find(|arm| by_key.contains_key(&arm.key)) {
            return Err(ConfigError::UnexpectedArm {
                opcode: arm.opcode.clone(),
                element: arm.element.clone(),
            });
        }

        Ok(())
    }
}

/// Emit every dispatch arm for a catalog and verify the result
pub fn emit_dispatch(catalog: &Catalog) -> ConfigResult<DispatchTable> {
    let mut arms = Vec::with_capacity(catalog.pair_count());

    for group in catalog.opcodes().groups() {
        for op in &group.opcodes {
            let handler = catalog.naming().handler_name(op);
            for ty in catalog.types().dispatchable() {
                arms.push(DispatchArm {
                    key: catalog.derive_key(op, ty),
                    opcode: op.name.clone(),
                    opcode_ordinal: op.ordinal,
                    element: ty.name.clone(),
                    element_ordinal: ty.ordinal,
                    token: ty.token.clone(),
                    arity: group.arity.get(),
                    handler: handler.clone(),
                });
            }
        }
    }

    if arms.is_empty() {
        return Err(ConfigError::EmptyDispatch);
    }

    let table = DispatchTable {
        catalog: catalog.name().to_string(),
        base: catalog.scheme().base(),
        controls: catalog
            .opcodes()
            .controls()
            .iter()
            .map(ControlEntry::from)
            .collect(),
        arms,
    };
    table.verify(catalog)?;

    debug!(
        "emitted {} dispatch arms for catalog '{}'",
        table.len(),
        table.catalog
    );
    Ok(table)
}
