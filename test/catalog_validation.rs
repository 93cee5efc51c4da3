//! Catalog validation tests
//!
//! Every malformed catalog must be rejected with a `ConfigError` while the
//! catalog is being built, before any dispatch text exists.

use vedispatch::catalog::{builtin, Catalog, ElementType, OpcodeCatalog, OpcodeDecl, TypeCatalog};
use vedispatch::catalog::{GroupDecl, TypeDecl};
use vedispatch::config::CatalogFile;
use vedispatch::ConfigError;

fn types(names: &[&str]) -> Vec<ElementType> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| ElementType::new(*name, i as u32))
        .collect()
}

// ============================================================================
// Type catalog
// ============================================================================

#[test]
fn test_type_catalog_lists_in_declaration_order() {
    let catalog = TypeCatalog::new(types(&["INT32", "FLOAT64", "BOOL"]), &["BOOL"]).unwrap();
    let names: Vec<&str> = catalog.types().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["INT32", "FLOAT64", "BOOL"]);

    let bool_ty = catalog.get("BOOL").unwrap();
    assert!(catalog.is_excluded(bool_ty));
    assert!(!catalog.is_excluded(catalog.get("INT32").unwrap()));
    assert_eq!(catalog.dispatchable().count(), 2);
}

#[test]
fn test_empty_type_catalog() {
    let err = TypeCatalog::new::<&str>(Vec::new(), &[]).unwrap_err();
    assert!(matches!(err, ConfigError::EmptyTypeCatalog));
}

#[test]
fn test_duplicate_type_name() {
    let err = TypeCatalog::new::<&str>(types(&["INT32", "FLOAT64", "INT32"]), &[]).unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateType(name) if name == "INT32"));
}

#[test]
fn test_duplicate_type_ordinal() {
    let clash = vec![ElementType::new("INT32", 3), ElementType::new("FLOAT64", 3)];
    let err = TypeCatalog::new::<&str>(clash, &[]).unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateTypeOrdinal { ordinal: 3, .. }));
}

#[test]
fn test_exclusion_must_name_a_known_type() {
    let err = TypeCatalog::new(types(&["INT32"]), &["COMPLEX64"]).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownExcludedType(name) if name == "COMPLEX64"));
}

#[test]
fn test_type_name_must_be_identifier() {
    let err = TypeCatalog::new::<&str>(types(&["int 32"]), &[]).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidIdentifier(_)));
}

// ============================================================================
// Opcode catalog
// ============================================================================

#[test]
fn test_opcode_in_two_groups() {
    let err = OpcodeCatalog::new(
        vec![GroupDecl::new(2, ["ADD", "MUL"]), GroupDecl::new(3, ["FMA", "ADD"])],
        Vec::new(),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateOpcode { name, .. } if name == "ADD"));
}

#[test]
fn test_opcode_twice_in_one_group() {
    let err = OpcodeCatalog::new(vec![GroupDecl::new(2, ["ADD", "ADD"])], Vec::new()).unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateOpcode { .. }));
}

#[test]
fn test_empty_group() {
    let err = OpcodeCatalog::new(
        vec![GroupDecl::new(2, Vec::<OpcodeDecl>::new())],
        Vec::new(),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::EmptyGroup(2)));
}

#[test]
fn test_control_opcode_in_numeric_group() {
    let err = OpcodeCatalog::new(
        vec![GroupDecl::new(1, ["SYNC", "ADD"])],
        vec![OpcodeDecl::new("SYNC")],
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::ControlInNumericGroup { name, arity: 1 } if name == "SYNC"
    ));
}

#[test]
fn test_unsupported_arities() {
    for arity in [0, -1, 9] {
        let err = OpcodeCatalog::new(vec![GroupDecl::new(arity, ["ADD"])], Vec::new()).unwrap_err();
        assert!(
            matches!(err, ConfigError::UnsupportedArity(a) if a == arity),
            "arity {} accepted",
            arity
        );
    }
}

#[test]
fn test_arity_declared_twice() {
    let err = OpcodeCatalog::new(
        vec![GroupDecl::new(2, ["ADD"]), GroupDecl::new(2, ["MUL"])],
        Vec::new(),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateArityGroup(2)));
}

#[test]
fn test_explicit_opcode_ordinals_must_be_unique() {
    let err = OpcodeCatalog::new(
        vec![GroupDecl::new(
            2,
            [
                OpcodeDecl::new("ADD").with_ordinal(5),
                OpcodeDecl::new("MUL").with_ordinal(5),
            ],
        )],
        Vec::new(),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateOpcodeOrdinal { ordinal: 5, .. }));
}

#[test]
fn test_opcode_ordinals_follow_declaration() {
    let catalog = OpcodeCatalog::new(
        vec![GroupDecl::new(1, ["RANGE"]), GroupDecl::new(2, ["ADD", "MUL"])],
        vec![OpcodeDecl::new("NONE"), OpcodeDecl::new("SYNC")],
    )
    .unwrap();
    let ordinal = |name: &str| catalog.get(name).unwrap().ordinal;
    assert_eq!(ordinal("NONE"), 0);
    assert_eq!(ordinal("SYNC"), 1);
    assert_eq!(ordinal("RANGE"), 2);
    assert_eq!(ordinal("MUL"), 4);
    assert_eq!(catalog.lookup(3).unwrap().name, "ADD");
    assert!(catalog.is_control(catalog.get("SYNC").unwrap()));
}

// ============================================================================
// Combined catalog
// ============================================================================

#[test]
fn test_base_too_small_for_types() {
    // Eleven types need ordinals 0..=10, which BASE = 10 cannot separate.
    let names: Vec<String> = (0..11).map(|i| format!("T{}", i)).collect();
    let err = Catalog::builder()
        .base(10)
        .types(names.iter().map(|n| TypeDecl::new(n.clone())))
        .group(2, ["ADD"])
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::BaseTooSmall {
            base: 10,
            max_type_ordinal: 10
        }
    ));
}

#[test]
fn test_base_counts_excluded_types() {
    let err = Catalog::builder()
        .base(2)
        .types(["INT32", "FLOAT64", "UNKNOWN"])
        .exclude(["UNKNOWN"])
        .group(2, ["ADD"])
        .build()
        .unwrap_err();
    assert!(matches!(err, ConfigError::BaseTooSmall { .. }));
}

#[test]
fn test_everything_excluded_is_empty_dispatch() {
    let err = Catalog::builder()
        .types(["INT32"])
        .exclude(["INT32"])
        .group(2, ["ADD", "MUL"])
        .build()
        .unwrap_err();
    assert!(matches!(err, ConfigError::EmptyDispatch));
}

#[test]
fn test_builtin_catalog_is_valid() {
    let catalog = builtin::catalog().unwrap();
    assert_eq!(catalog.name(), "vector-engine");
    assert_eq!(catalog.types().len(), 15);
    assert_eq!(catalog.types().dispatchable().count(), 14);
    assert_eq!(catalog.opcodes().controls().len(), 4);
    assert!(catalog.types().max_ordinal() < catalog.scheme().base());
}

// ============================================================================
// Catalog files
// ============================================================================

#[test]
fn test_file_with_opcode_in_two_groups() {
    let file = CatalogFile::parse(
        r#"
[[types]]
name = "INT32"

[[groups]]
arity = 2
opcodes = ["ADD"]

[[groups]]
arity = 3
opcodes = ["ADD"]
"#,
    )
    .unwrap();
    assert!(matches!(
        file.into_catalog(),
        Err(ConfigError::DuplicateOpcode { .. })
    ));
}

#[test]
fn test_file_found_in_parent_directory() {
    let root = tempfile::tempdir().unwrap();
    let nested = root.path().join("a").join("b");
    std::fs::create_dir_all(&nested).unwrap();

    let mut file = CatalogFile::builtin();
    file.name = "from-disk".to_string();
    file.save(&root.path().join("vedispatch.toml")).unwrap();

    let found = CatalogFile::find_and_load(&nested).unwrap();
    assert_eq!(found.name, "from-disk");
    assert_eq!(found.into_catalog().unwrap().name(), "from-disk");
}

#[test]
fn test_shipped_catalog_matches_builtin() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("catalogs/vector_engine.toml");
    let file = CatalogFile::load(&path).unwrap();
    let shipped = file.into_catalog().unwrap();
    let builtin = builtin::catalog().unwrap();

    assert_eq!(shipped.name(), builtin.name());
    assert_eq!(shipped.types().types(), builtin.types().types());
    let ops = |c: &Catalog| c.opcodes().all().map(|op| (op.name.clone(), op.ordinal)).collect::<Vec<_>>();
    assert_eq!(ops(&shipped), ops(&builtin));
}
