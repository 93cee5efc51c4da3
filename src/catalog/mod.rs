//! Opcode and element type catalogs
//!
//! A [`Catalog`] is the generator's whole input: which opcodes exist, how
//! many operands each takes, which element types operands may hold, and how
//! the two combine into dispatch keys. It is validated once on construction
//! and immutable afterwards, so every later stage can assume a well-formed
//! table.
//!
//! # Example
//!
//! ```rust
//! use vedispatch::catalog::Catalog;
//!
//! let catalog = Catalog::builder()
//!     .types(["INT32", "FLOAT64"])
//!     .group(2, ["ADD", "MUL"])
//!     .control(["SYNC"])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(catalog.pair_count(), 4);
//! ```

pub mod builtin;
pub mod opcodes;
pub mod types;

pub use opcodes::{Arity, GroupDecl, Opcode, OpcodeCatalog, OpcodeDecl, OpcodeGroup, OpcodeKind};
pub use types::{ElementType, TypeCatalog, TypeDecl};

use crate::error::{ConfigError, ConfigResult};
use crate::key::{DispatchKey, KeyScheme, DEFAULT_BASE};
use log::{debug, warn};
use std::collections::HashMap;

/// Largest operand count the handler calling convention supports
pub const MAX_ARITY: u32 = 8;

/// Identifiers must be usable as C and Rust symbols.
///
/// Names flow verbatim into generated source, so anything else would let a
/// catalog inject arbitrary text into the artifact.
pub(crate) fn validate_identifier(name: &str) -> ConfigResult<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidIdentifier(name.to_string()))
    }
}

/// Type tokens may additionally be paths or template instances
/// (`std::complex<float>`, `num::Complex<f32>`).
pub(crate) fn validate_token(token: &str) -> ConfigResult<()> {
    let valid = !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '<' | '>'));
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidIdentifier(token.to_string()))
    }
}

/// How opcode names become handler names.
///
/// The handler for an opcode is its lowercased name with `opcode_prefix`
/// stripped and `handler_prefix` prepended, so `VE_ADD` becomes `ve_add`
/// with the default prefixes, or `score_add` with `handler_prefix = "score_"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Naming {
    pub opcode_prefix: String,
    pub handler_prefix: String,
}

impl Naming {
    pub fn new(opcode_prefix: impl Into<String>, handler_prefix: impl Into<String>) -> Self {
        Self {
            opcode_prefix: opcode_prefix.into(),
            handler_prefix: handler_prefix.into(),
        }
    }

    pub fn handler_name(&self, op: &Opcode) -> String {
        let lower = op.name.to_lowercase();
        let prefix = self.opcode_prefix.to_lowercase();
        let stem = if !prefix.is_empty() && lower.starts_with(&prefix) && lower.len() > prefix.len()
        {
            &lower[prefix.len()..]
        } else {
            lower.as_str()
        };
        format!("{}{}", self.handler_prefix, stem)
    }
}

/// Validated generator input
#[derive(Debug, Clone)]
pub struct Catalog {
    name: String,
    types: TypeCatalog,
    opcodes: OpcodeCatalog,
    scheme: KeyScheme,
    naming: Naming,
}

impl Catalog {
    /// Combine validated type and opcode catalogs.
    ///
    /// Checks the key base against the types, that handler names are distinct
    /// identifiers, and that at least one (opcode, type) pair survives the
    /// exclusions.
    pub fn new(
        name: impl Into<String>,
        types: TypeCatalog,
        opcodes: OpcodeCatalog,
        base: u32,
        naming: Naming,
    ) -> ConfigResult<Self> {
        let name = name.into();
        let scheme = KeyScheme::new(base, &types)?;

        let mut handlers: HashMap<String, &str> = HashMap::new();
        for op in opcodes.numeric() {
            let handler = naming.handler_name(op);
            validate_identifier(&handler)?;
            if let Some(first) = handlers.insert(handler.clone(), op.name.as_str()) {
                return Err(ConfigError::DuplicateHandler {
                    handler,
                    first: first.to_string(),
                    second: op.name.clone(),
                });
            }
        }

        let dispatchable = types.dispatchable().count();
        if dispatchable == 0 || opcodes.numeric().next().is_none() {
            return Err(ConfigError::EmptyDispatch);
        }
        if dispatchable * 2 < types.len() {
            warn!(
                "catalog '{}': exclusions leave {} of {} types dispatchable",
                name,
                dispatchable,
                types.len()
            );
        }

        debug!(
            "catalog '{}' validated: {} groups, {} numeric opcodes, {} control opcodes, {} types ({} excluded), base {}",
            name,
            opcodes.groups().len(),
            opcodes.numeric().count(),
            opcodes.controls().len(),
            types.len(),
            types.len() - dispatchable,
            scheme.base()
        );

        Ok(Self {
            name,
            types,
            opcodes,
            scheme,
            naming,
        })
    }

    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn types(&self) -> &TypeCatalog {
        &self.types
    }

    pub fn opcodes(&self) -> &OpcodeCatalog {
        &self.opcodes
    }

    pub fn scheme(&self) -> &KeyScheme {
        &self.scheme
    }

    pub fn naming(&self) -> &Naming {
        &self.naming
    }

    pub fn derive_key(&self, op: &Opcode, ty: &ElementType) -> DispatchKey {
        self.scheme.derive(op, ty)
    }

    /// Number of dispatch arms this catalog produces
    pub fn pair_count(&self) -> usize {
        self.opcodes.numeric().count() * self.types.dispatchable().count()
    }
}

/// Incremental construction of a [`Catalog`]
#[derive(Debug, Clone)]
pub struct CatalogBuilder {
    name: String,
    base: u32,
    types: Vec<TypeDecl>,
    exclude: Vec<String>,
    groups: Vec<GroupDecl>,
    controls: Vec<OpcodeDecl>,
    naming: Naming,
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self {
            name: "catalog".to_string(),
            base: DEFAULT_BASE,
            types: Vec::new(),
            exclude: Vec::new(),
            groups: Vec::new(),
            controls: Vec::new(),
            naming: Naming::default(),
        }
    }
}

impl CatalogBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn base(mut self, base: u32) -> Self {
        self.base = base;
        self
    }

    pub fn naming(mut self, naming: Naming) -> Self {
        self.naming = naming;
        self
    }

    /// Append element types in declaration order
    pub fn types<I, D>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<TypeDecl>,
    {
        self.types.extend(types.into_iter().map(Into::into));
        self
    }

    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn group<I, D>(mut self, arity: i64, opcodes: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<OpcodeDecl>,
    {
        self.groups.push(GroupDecl::new(arity, opcodes));
        self
    }

    pub fn control<I, D>(mut self, opcodes: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<OpcodeDecl>,
    {
        self.controls.extend(opcodes.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> ConfigResult<Catalog> {
        let types = self
            .types
            .iter()
            .enumerate()
            .map(|(position, decl)| decl.resolve(position as u32))
            .collect();
        let types = TypeCatalog::new(types, &self.exclude)?;
        let opcodes = OpcodeCatalog::new(self.groups, self.controls)?;
        Catalog::new(self.name, types, opcodes, self.base, self.naming)
    }
}
