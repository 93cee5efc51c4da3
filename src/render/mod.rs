//! Artifact rendering
//!
//! Lays the emitted dispatch table and handler stubs out as source text for
//! one target language. The routine has a fixed shape on every target:
//!
//! ```text
//! for each instruction:
//!     control opcode?          -> nothing to do, next instruction
//!     otherwise key = opcode * BASE + operand[0].type
//!         known key            -> iter_<arity><type>(instr, handler), next instruction
//!         unknown key          -> report the opcode, return the unsupported status
//! return success
//! ```
//!
//! Rendering is pure: identical inputs give byte-identical text, and nothing
//! here touches the filesystem.

pub mod cpp;
pub mod rust;
pub mod writer;

pub use cpp::CppBackend;
pub use rust::RustBackend;
pub use writer::{IndentStyle, IndentWriter};

use crate::catalog::{validate_identifier, validate_token};
use crate::emit::{DispatchArm, DispatchTable, HandlerSignature};
use crate::error::ConfigResult;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    #[default]
    Cpp,
    Rust,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Cpp => f.write_str("cpp"),
            Target::Rust => f.write_str("rust"),
        }
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cpp" | "c++" => Ok(Target::Cpp),
            "rust" | "rs" => Ok(Target::Rust),
            other => Err(format!("unknown target '{}' (expected cpp or rust)", other)),
        }
    }
}

/// How case labels spell dispatch keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStyle {
    /// `case 1203:` with the pair named in a trailing comment
    #[default]
    Literal,
    /// `case VE_ADD*100+VE_INT32:`, resolved by the engine's own enums.
    /// Only meaningful for C++; Rust patterns cannot hold arithmetic.
    Symbolic,
}

impl FromStr for KeyStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "literal" => Ok(KeyStyle::Literal),
            "symbolic" => Ok(KeyStyle::Symbolic),
            other => Err(format!(
                "unknown key style '{}' (expected literal or symbolic)",
                other
            )),
        }
    }
}

/// Which parts of the artifact to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emit {
    Dispatch,
    Stubs,
    All,
}

impl Emit {
    pub fn routine(self) -> bool {
        matches!(self, Emit::Dispatch | Emit::All)
    }

    pub fn stubs(self) -> bool {
        matches!(self, Emit::Stubs | Emit::All)
    }
}

/// Names of the engine symbols the generated code refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub target: Target,
    pub key_style: KeyStyle,
    pub indent: IndentStyle,
    /// Name the pair behind each literal key in a comment
    pub emit_comments: bool,
    pub routine_name: String,
    pub instruction_type: String,
    /// Integer type of the instruction count (C++ only)
    pub index_type: String,
    pub status_type: String,
    pub success_status: String,
    pub unsupported_status: String,
    /// Engine function mapping an opcode to its printable name
    pub opcode_text_fn: String,
    /// Arity-indexed operand iterators are `<iterate_prefix><arity>`
    pub iterate_prefix: String,
}

impl RenderOptions {
    /// Engine symbol defaults for a target
    pub fn for_target(target: Target) -> Self {
        match target {
            Target::Cpp => Self {
                target,
                key_style: KeyStyle::Literal,
                indent: IndentStyle::default(),
                emit_comments: true,
                routine_name: "ve_execute".to_string(),
                instruction_type: "ve_instruction".to_string(),
                index_type: "ve_intp".to_string(),
                status_type: "ve_error".to_string(),
                success_status: "VE_SUCCESS".to_string(),
                unsupported_status: "VE_INST_NOT_SUPPORTED".to_string(),
                opcode_text_fn: "ve_opcode_text".to_string(),
                iterate_prefix: "iter_".to_string(),
            },
            Target::Rust => Self {
                target,
                key_style: KeyStyle::Literal,
                indent: IndentStyle::default(),
                emit_comments: true,
                routine_name: "execute".to_string(),
                instruction_type: "Instruction".to_string(),
                index_type: "usize".to_string(),
                status_type: "Status".to_string(),
                success_status: "Status::Success".to_string(),
                unsupported_status: "Status::UnsupportedInstruction".to_string(),
                opcode_text_fn: "opcode_text".to_string(),
                iterate_prefix: "iter_".to_string(),
            },
        }
    }

    pub fn with_key_style(mut self, key_style: KeyStyle) -> Self {
        self.key_style = key_style;
        self
    }

    pub fn with_comments(mut self, emit_comments: bool) -> Self {
        self.emit_comments = emit_comments;
        self
    }

    pub fn with_routine_name(mut self, name: impl Into<String>) -> Self {
        self.routine_name = name.into();
        self
    }

    /// Every symbol name lands verbatim in the generated source, so each must
    /// be a plain identifier, or a type/path token where the target allows one.
    pub fn validate(&self) -> ConfigResult<()> {
        for name in [&self.routine_name, &self.opcode_text_fn, &self.iterate_prefix] {
            validate_identifier(name)?;
        }
        for token in [
            &self.instruction_type,
            &self.index_type,
            &self.status_type,
            &self.success_status,
            &self.unsupported_status,
        ] {
            validate_token(token)?;
        }
        Ok(())
    }

    /// Backend for the configured target
    pub fn backend(&self) -> Box<dyn Backend + '_> {
        match self.target {
            Target::Cpp => Box::new(CppBackend::new(self)),
            Target::Rust => Box::new(RustBackend::new(self)),
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::for_target(Target::default())
    }
}

/// A target language's layout of the routine and stubs
pub trait Backend {
    fn target(&self) -> Target;

    fn file_extension(&self) -> &'static str;

    /// Comment line opening the artifact
    fn emit_header(&self, w: &mut IndentWriter, catalog: &str);

    /// One handler declaration
    fn emit_stub(&self, w: &mut IndentWriter, stub: &HandlerSignature);

    /// One case of the numeric switch
    fn emit_arm(&self, w: &mut IndentWriter, arm: &DispatchArm, base: u32);

    /// The whole routine, calling [`emit_arm`](Self::emit_arm) per arm
    fn emit_routine(&self, w: &mut IndentWriter, table: &DispatchTable);
}

/// Rendered dispatch routine and handler declarations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchArtifact {
    pub target: Target,
    pub header: String,
    pub routine: Option<String>,
    pub stubs: Option<String>,
    pub table: DispatchTable,
    pub handlers: Vec<HandlerSignature>,
    extension: &'static str,
}

impl DispatchArtifact {
    /// Complete file: header, then stubs (declared before use), then routine
    pub fn source(&self) -> String {
        let mut out = self.header.clone();
        for part in [&self.stubs, &self.routine].into_iter().flatten() {
            out.push('\n');
            out.push_str(part);
        }
        out
    }

    pub fn file_name(&self) -> String {
        format!("ve_dispatch.{}", self.extension)
    }

    /// Machine-readable listing of arms and handlers
    pub fn manifest(&self) -> Manifest<'_> {
        Manifest {
            catalog: &self.table.catalog,
            target: self.target,
            base: self.table.base,
            controls: &self.table.controls,
            arms: &self.table.arms,
            handlers: &self.handlers,
        }
    }
}

/// Serializable view of an artifact's structure
#[derive(Debug, Serialize)]
pub struct Manifest<'a> {
    pub catalog: &'a str,
    pub target: Target,
    pub base: u32,
    pub controls: &'a [crate::emit::ControlEntry],
    pub arms: &'a [DispatchArm],
    pub handlers: &'a [HandlerSignature],
}

/// Assemble arms and stubs into an artifact
pub fn render(
    table: &DispatchTable,
    stubs: &[HandlerSignature],
    options: &RenderOptions,
    emit: Emit,
) -> DispatchArtifact {
    let backend = options.backend();

    let mut w = IndentWriter::with_style(options.indent);
    backend.emit_header(&mut w, &table.catalog);
    let header = w.into_output();

    let stubs_text = emit.stubs().then(|| {
        let mut w = IndentWriter::with_style(options.indent);
        for (i, stub) in stubs.iter().enumerate() {
            if i > 0 {
                w.blank();
            }
            backend.emit_stub(&mut w, stub);
        }
        w.into_output()
    });

    let routine = emit.routine().then(|| {
        let mut w = IndentWriter::with_style(options.indent);
        backend.emit_routine(&mut w, table);
        w.into_output()
    });

    debug!(
        "rendered {} artifact for '{}': routine={}, stubs={}",
        backend.target(),
        table.catalog,
        routine.is_some(),
        stubs_text.is_some()
    );

    DispatchArtifact {
        target: backend.target(),
        header,
        routine,
        stubs: stubs_text,
        table: table.clone(),
        handlers: stubs.to_vec(),
        extension: backend.file_extension(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::emit::{emit_dispatch, emit_stubs};

    fn parts() -> (DispatchTable, Vec<HandlerSignature>) {
        let catalog = Catalog::builder()
            .name("tiny")
            .types(["INT32", "FLOAT64"])
            .control(["SYNC"])
            .group(2, ["ADD", "MUL"])
            .build()
            .unwrap();
        (emit_dispatch(&catalog).unwrap(), emit_stubs(&catalog))
    }

    #[test]
    fn test_target_parse() {
        assert_eq!("cpp".parse::<Target>(), Ok(Target::Cpp));
        assert_eq!("rs".parse::<Target>(), Ok(Target::Rust));
        assert!("go".parse::<Target>().is_err());
        assert_eq!("symbolic".parse::<KeyStyle>(), Ok(KeyStyle::Symbolic));
    }

    #[test]
    fn test_emit_selection() {
        let (table, stubs) = parts();
        let options = RenderOptions::default();

        let routine_only = render(&table, &stubs, &options, Emit::Dispatch);
        assert!(routine_only.routine.is_some());
        assert!(routine_only.stubs.is_none());

        let stubs_only = render(&table, &stubs, &options, Emit::Stubs);
        assert!(stubs_only.routine.is_none());
        assert!(stubs_only.stubs.is_some());
    }

    #[test]
    fn test_source_orders_stubs_before_routine() {
        let (table, stubs) = parts();
        let artifact = render(&table, &stubs, &RenderOptions::default(), Emit::All);
        let source = artifact.source();
        let stub_at = source.find("template <typename T>").unwrap();
        let routine_at = source.find("ve_error ve_execute(").unwrap();
        assert!(source.starts_with("// Generated by ve-gen"));
        assert!(stub_at < routine_at);
        assert_eq!(artifact.file_name(), "ve_dispatch.cpp");
    }

    #[test]
    fn test_render_is_deterministic() {
        let (table, stubs) = parts();
        for target in [Target::Cpp, Target::Rust] {
            let options = RenderOptions::for_target(target);
            let a = render(&table, &stubs, &options, Emit::All).source();
            let b = render(&table, &stubs, &options, Emit::All).source();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_target_defaults_validate() {
        for target in [Target::Cpp, Target::Rust] {
            assert!(RenderOptions::for_target(target).validate().is_ok());
        }
    }

    #[test]
    fn test_symbol_names_reject_source_text() {
        let options = RenderOptions::default().with_routine_name("run(); abort");
        assert!(matches!(
            options.validate(),
            Err(crate::ConfigError::InvalidIdentifier(name)) if name == "run(); abort"
        ));

        let mut options = RenderOptions::for_target(Target::Rust);
        options.unsupported_status = "Status::Bad(0) }".to_string();
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_manifest_serializes() {
        let (table, stubs) = parts();
        let artifact = render(&table, &stubs, &RenderOptions::default(), Emit::All);
        let json = serde_json::to_value(artifact.manifest()).unwrap();
        assert_eq!(json["catalog"], "tiny");
        assert_eq!(json["target"], "cpp");
        assert_eq!(json["arms"].as_array().unwrap().len(), 4);
        assert_eq!(json["handlers"][1]["name"], "mul");
    }
}
