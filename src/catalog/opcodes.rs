//! Opcode catalog
//!
//! Dispatchable opcodes are partitioned into arity groups; each group lists
//! the opcodes whose handlers take that many operands. Control opcodes
//! (no-op, release, synchronize, discard) sit outside the partition and never
//! reach numeric dispatch.

use super::{validate_identifier, MAX_ARITY};
use crate::error::{ConfigError, ConfigResult};
use std::collections::HashMap;
use std::fmt;

/// Number of operand references a handler receives
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Arity(u32);

impl Arity {
    pub const UNARY: Arity = Arity(1);
    pub const BINARY: Arity = Arity(2);
    pub const TERNARY: Arity = Arity(3);

    /// Validate a raw operand count against the calling convention
    pub fn new(count: i64) -> ConfigResult<Self> {
        if count >= 1 && count <= i64::from(MAX_ARITY) {
            Ok(Arity(count as u32))
        } else {
            Err(ConfigError::UnsupportedArity(count))
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether an opcode reaches numeric dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpcodeKind {
    /// Element-wise or reduction opcode handled by a kernel of this arity
    Numeric(Arity),
    /// Pass-through opcode with no numeric meaning
    Control,
}

/// An instruction kind in the engine's bytecode
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Opcode {
    /// Canonical name, as the engine's opcode enum spells it (e.g. `VE_ADD`)
    pub name: String,
    /// Runtime ordinal of the opcode enum value
    pub ordinal: u32,
    pub kind: OpcodeKind,
}

impl Opcode {
    pub fn arity(&self) -> Option<Arity> {
        match self.kind {
            OpcodeKind::Numeric(arity) => Some(arity),
            OpcodeKind::Control => None,
        }
    }

    pub fn is_control(&self) -> bool {
        self.kind == OpcodeKind::Control
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Opcode as declared, before ordinals are resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpcodeDecl {
    pub name: String,
    pub ordinal: Option<u32>,
}

impl OpcodeDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ordinal: None,
        }
    }

    pub fn with_ordinal(mut self, ordinal: u32) -> Self {
        self.ordinal = Some(ordinal);
        self
    }
}

impl From<&str> for OpcodeDecl {
    fn from(name: &str) -> Self {
        OpcodeDecl::new(name)
    }
}

/// Arity group as declared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDecl {
    /// Raw operand count; validated into an [`Arity`]
    pub arity: i64,
    pub opcodes: Vec<OpcodeDecl>,
}

impl GroupDecl {
    pub fn new<I, D>(arity: i64, opcodes: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<OpcodeDecl>,
    {
        Self {
            arity,
            opcodes: opcodes.into_iter().map(Into::into).collect(),
        }
    }
}

/// All opcodes sharing one arity
#[derive(Debug, Clone)]
pub struct OpcodeGroup {
    pub arity: Arity,
    pub opcodes: Vec<Opcode>,
}

/// Validated, immutable opcode catalog
#[derive(Debug, Clone)]
pub struct OpcodeCatalog {
    groups: Vec<OpcodeGroup>,
    controls: Vec<Opcode>,
}

impl OpcodeCatalog {
    /// Build a catalog from arity groups and control opcodes.
    ///
    /// An opcode without an explicit ordinal takes its position in the
    /// sequence of all declarations: controls first, then each group in order.
    pub fn new(groups: Vec<GroupDecl>, controls: Vec<OpcodeDecl>) -> ConfigResult<Self> {
        // Arity and emptiness are checked up front so a bad group is reported
        // as such rather than as a side effect of opcode resolution.
        let mut seen_arity: Vec<Arity> = Vec::with_capacity(groups.len());
        for group in &groups {
            let arity = Arity::new(group.arity)?;
            if group.opcodes.is_empty() {
                return Err(ConfigError::EmptyGroup(arity.get()));
            }
            if seen_arity.contains(&arity) {
                return Err(ConfigError::DuplicateArityGroup(arity.get()));
            }
            seen_arity.push(arity);
        }

        let mut position = 0u32;
        let mut next_ordinal = |decl: &OpcodeDecl| {
            let ordinal = decl.ordinal.unwrap_or(position);
            position += 1;
            ordinal
        };

        let mut owner: HashMap<String, String> = HashMap::new();

        let mut control_ops = Vec::with_capacity(controls.len());
        for decl in &controls {
            validate_identifier(&decl.name)?;
            if owner.contains_key(&decl.name) {
                return Err(ConfigError::DuplicateOpcode {
                    name: decl.name.clone(),
                    first: "the control set".to_string(),
                    second: "the control set".to_string(),
                });
            }
            owner.insert(decl.name.clone(), "the control set".to_string());
            control_ops.push(Opcode {
                name: decl.name.clone(),
                ordinal: next_ordinal(decl),
                kind: OpcodeKind::Control,
            });
        }

        let mut numeric_groups = Vec::with_capacity(groups.len());
        for (group, arity) in groups.iter().zip(seen_arity) {
            let label = format!("arity {}", arity);
            let mut opcodes = Vec::with_capacity(group.opcodes.len());
            for decl in &group.opcodes {
                validate_identifier(&decl.name)?;
                match owner.get(&decl.name) {
                    Some(first) if first == "the control set" => {
                        return Err(ConfigError::ControlInNumericGroup {
                            name: decl.name.clone(),
                            arity: arity.get(),
                        });
                    }
                    Some(first) => {
                        return Err(ConfigError::DuplicateOpcode {
                            name: decl.name.clone(),
                            first: first.clone(),
                            second: label,
                        });
                    }
                    None => {}
                }
                owner.insert(decl.name.clone(), label.clone());
                opcodes.push(Opcode {
                    name: decl.name.clone(),
                    ordinal: next_ordinal(decl),
                    kind: OpcodeKind::Numeric(arity),
                });
            }
            numeric_groups.push(OpcodeGroup { arity, opcodes });
        }

        let catalog = Self {
            groups: numeric_groups,
            controls: control_ops,
        };
        catalog.check_ordinals()?;
        Ok(catalog)
    }

    fn check_ordinals(&self) -> ConfigResult<()> {
        let mut by_ordinal: HashMap<u32, &str> = HashMap::new();
        for op in self.all() {
            if let Some(first) = by_ordinal.insert(op.ordinal, op.name.as_str()) {
                return Err(ConfigError::DuplicateOpcodeOrdinal {
                    ordinal: op.ordinal,
                    first: first.to_string(),
                    second: op.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Arity groups in declaration order
    pub fn groups(&self) -> &[OpcodeGroup] {
        &self.groups
    }

    /// Control opcodes in declaration order
    pub fn controls(&self) -> &[Opcode] {
        &self.controls
    }

    pub fn is_control(&self, op: &Opcode) -> bool {
        self.controls.iter().any(|c| c.name == op.name)
    }

    /// Numeric opcodes, group by group, in declaration order
    pub fn numeric(&self) -> impl Iterator<Item = &Opcode> {
        self.groups.iter().flat_map(|g| g.opcodes.iter())
    }

    /// Every opcode: controls first, then numeric
    pub fn all(&self) -> impl Iterator<Item = &Opcode> {
        self.controls.iter().chain(self.numeric())
    }

    pub fn get(&self, name: &str) -> Option<&Opcode> {
        self.all().find(|op| op.name == name)
    }

    /// Look up an opcode by runtime ordinal
    pub fn lookup(&self, ordinal: u32) -> Option<&Opcode> {
        self.all().find(|op| op.ordinal == ordinal)
    }

    pub fn max_ordinal(&self) -> u32 {
        self.all().map(|op| op.ordinal).max().unwrap_or(0)
    }
}
