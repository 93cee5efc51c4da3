//! Element type catalog
//!
//! The closed, ordered set of scalar kinds an operand may hold at runtime,
//! plus the exclusion set of types that are never paired with an opcode.

use super::{validate_identifier, validate_token};
use crate::error::{ConfigError, ConfigResult};
use std::collections::HashMap;
use std::fmt;

/// A scalar kind operands may hold at runtime
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementType {
    /// Canonical name, as the engine's type enum spells it (e.g. `VE_INT32`)
    pub name: String,
    /// Type token used in generated code (e.g. `ve_int32`)
    pub token: String,
    /// Runtime ordinal of the type enum value
    pub ordinal: u32,
}

impl ElementType {
    /// Create a type whose token is the lowercased name
    pub fn new(name: impl Into<String>, ordinal: u32) -> Self {
        let name = name.into();
        let token = name.to_lowercase();
        Self {
            name,
            token,
            ordinal,
        }
    }

    /// Override the generated-code token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Element type as declared, before ordinals and tokens are resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: String,
    pub token: Option<String>,
    pub ordinal: Option<u32>,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            token: None,
            ordinal: None,
        }
    }

    /// Resolve into an [`ElementType`], using `position` when no ordinal was given
    pub fn resolve(&self, position: u32) -> ElementType {
        let ty = ElementType::new(self.name.clone(), self.ordinal.unwrap_or(position));
        match &self.token {
            Some(token) => ty.with_token(token.clone()),
            None => ty,
        }
    }
}

impl From<&str> for TypeDecl {
    fn from(name: &str) -> Self {
        TypeDecl::new(name)
    }
}

/// Validated, immutable type catalog
#[derive(Debug, Clone)]
pub struct TypeCatalog {
    types: Vec<ElementType>,
    /// Indices into `types` of excluded entries
    excluded: Vec<usize>,
}

impl TypeCatalog {
    /// Build a catalog from types in declaration order and the names to exclude.
    ///
    /// Fails if the catalog is empty, a name or ordinal repeats, a name or
    /// token is unusable in generated code, or an exclusion names an unknown type.
    pub fn new<S: AsRef<str>>(types: Vec<ElementType>, exclude: &[S]) -> ConfigResult<Self> {
        if types.is_empty() {
            return Err(ConfigError::EmptyTypeCatalog);
        }

        let mut by_name: HashMap<&str, usize> = HashMap::new();
        let mut by_ordinal: HashMap<u32, &str> = HashMap::new();
        for (index, ty) in types.iter().enumerate() {
            validate_identifier(&ty.name)?;
            validate_token(&ty.token)?;
            if by_name.insert(ty.name.as_str(), index).is_some() {
                return Err(ConfigError::DuplicateType(ty.name.clone()));
            }
            if let Some(first) = by_ordinal.insert(ty.ordinal, ty.name.as_str()) {
                return Err(ConfigError::DuplicateTypeOrdinal {
                    ordinal: ty.ordinal,
                    first: first.to_string(),
                    second: ty.name.clone(),
                });
            }
        }

        let mut excluded = Vec::with_capacity(exclude.len());
        for name in exclude {
            let name = name.as_ref();
            let index = *by_name
                .get(name)
                .ok_or_else(|| ConfigError::UnknownExcludedType(name.to_string()))?;
            if !excluded.contains(&index) {
                excluded.push(index);
            }
        }
        excluded.sort_unstable();

        Ok(Self { types, excluded })
    }

    /// All types in declaration order, excluded ones included
    pub fn types(&self) -> &[ElementType] {
        &self.types
    }

    /// Whether a type must never be paired with an opcode
    pub fn is_excluded(&self, ty: &ElementType) -> bool {
        self.excluded
            .iter()
            .any(|&index| self.types[index].name == ty.name)
    }

    /// Excluded types in declaration order
    pub fn excluded(&self) -> impl Iterator<Item = &ElementType> {
        self.excluded.iter().map(move |&index| &self.types[index])
    }

    /// Types that receive dispatch arms, in declaration order
    pub fn dispatchable(&self) -> impl Iterator<Item = &ElementType> {
        self.types
            .iter()
            .enumerate()
            .filter(move |(index, _)| !self.excluded.contains(index))
            .map(|(_, ty)| ty)
    }

    /// Look up a type by canonical name
    pub fn get(&self, name: &str) -> Option<&ElementType> {
        self.types.iter().find(|ty| ty.name == name)
    }

    /// Look up a type by runtime ordinal
    pub fn by_ordinal(&self, ordinal: u32) -> Option<&ElementType> {
        self.types.iter().find(|ty| ty.ordinal == ordinal)
    }

    /// Largest ordinal in the catalog, excluded types included.
    ///
    /// Excluded types still reach the dispatch switch at runtime, so their
    /// ordinals bound the key base as well.
    pub fn max_ordinal(&self) -> u32 {
        self.types.iter().map(|ty| ty.ordinal).max().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(names: &[&str]) -> Vec<ElementType> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| ElementType::new(*n, i as u32))
            .collect()
    }

    #[test]
    fn test_token_defaults_to_lowercase() {
        let ty = ElementType::new("VE_INT32", 3);
        assert_eq!(ty.token, "ve_int32");
        assert_eq!(ty.with_token("int32_t").token, "int32_t");
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let err = TypeCatalog::new::<&str>(Vec::new(), &[]).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyTypeCatalog));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut list = types(&["INT32", "FLOAT64"]);
        list.push(ElementType::new("INT32", 7));
        let err = TypeCatalog::new::<&str>(list, &[]).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateType(name) if name == "INT32"));
    }

    #[test]
    fn test_duplicate_ordinal_rejected() {
        let list = vec![ElementType::new("INT32", 1), ElementType::new("FLOAT64", 1)];
        let err = TypeCatalog::new::<&str>(list, &[]).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateTypeOrdinal { ordinal: 1, .. }));
    }

    #[test]
    fn test_exclusion_must_be_subset() {
        let err = TypeCatalog::new(types(&["INT32"]), &["UNKNOWN"]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownExcludedType(name) if name == "UNKNOWN"));
    }

    #[test]
    fn test_dispatchable_skips_excluded() {
        let catalog =
            TypeCatalog::new(types(&["BOOL", "INT32", "UNKNOWN", "FLOAT64"]), &["UNKNOWN"])
                .unwrap();
        let names: Vec<_> = catalog.dispatchable().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["BOOL", "INT32", "FLOAT64"]);
        assert!(catalog.is_excluded(catalog.get("UNKNOWN").unwrap()));
        assert!(!catalog.is_excluded(catalog.get("BOOL").unwrap()));
        assert_eq!(catalog.max_ordinal(), 3);
    }

    #[test]
    fn test_invalid_name_rejected() {
        let err = TypeCatalog::new::<&str>(vec![ElementType::new("INT 32", 0)], &[]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidIdentifier(_)));
    }
}
