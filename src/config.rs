//! Catalog file handling
//!
//! Parses `vedispatch.toml` catalog files into a validated [`Catalog`] plus
//! [`RenderOptions`].
//!
//! ```toml
//! name = "vector-engine"
//! base = 100
//! exclude = ["VE_UNKNOWN"]
//! control = ["VE_NONE", "VE_SYNC"]
//!
//! [naming]
//! opcode_prefix = "VE_"
//! handler_prefix = "ve_"
//!
//! [[types]]
//! name = "VE_INT32"
//!
//! [[groups]]
//! arity = 3
//! opcodes = ["VE_ADD", { name = "VE_MUL", ordinal = 12 }]
//! ```

use crate::catalog::{builtin, Catalog, Naming, OpcodeDecl, TypeDecl};
use crate::error::{ConfigError, ConfigResult};
use crate::key::DEFAULT_BASE;
use crate::render::{KeyStyle, RenderOptions, Target};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name searched for by [`CatalogFile::find_and_load`]
pub const CATALOG_FILE: &str = "vedispatch.toml";

/// Root structure of a catalog file.
///
/// Plain values come before tables so the file serializes back to valid TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogFile {
    /// Catalog name, echoed in generated headers
    #[serde(default = "default_name")]
    pub name: String,

    /// Key base; must exceed every type ordinal
    #[serde(default = "default_base")]
    pub base: u32,

    /// Types never paired with an opcode
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Opcodes that bypass numeric dispatch
    #[serde(default)]
    pub control: Vec<OpcodeEntry>,

    #[serde(default)]
    pub naming: NamingConfig,

    #[serde(default)]
    pub render: RenderConfig,

    /// Element types in declaration order
    #[serde(default)]
    pub types: Vec<TypeEntry>,

    /// Arity groups in declaration order
    #[serde(default)]
    pub groups: Vec<GroupEntry>,
}

fn default_name() -> String {
    "catalog".to_string()
}

fn default_base() -> u32 {
    DEFAULT_BASE
}

/// An opcode given either by name or with an explicit ordinal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OpcodeEntry {
    Name(String),
    Detailed { name: String, ordinal: u32 },
}

impl From<OpcodeEntry> for OpcodeDecl {
    fn from(entry: OpcodeEntry) -> Self {
        match entry {
            OpcodeEntry::Name(name) => OpcodeDecl::new(name),
            OpcodeEntry::Detailed { name, ordinal } => OpcodeDecl::new(name).with_ordinal(ordinal),
        }
    }
}

/// One element type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeEntry {
    pub name: String,

    /// Generated-code token; defaults to the lowercased name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Runtime ordinal; defaults to the declaration position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordinal: Option<u32>,
}

/// One arity group.
///
/// The arity is read as a signed integer so that zero and negative values
/// surface as an unsupported-arity error rather than a parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupEntry {
    pub arity: i64,
    pub opcodes: Vec<OpcodeEntry>,
}

/// Handler naming rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Stripped from opcode names (case-insensitive)
    #[serde(default)]
    pub opcode_prefix: String,

    /// Prepended to handler names
    #[serde(default)]
    pub handler_prefix: String,
}

/// Render overrides; unset fields take the target's defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Target>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_style: Option<KeyStyle>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indent: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routine_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unsupported_status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opcode_text_fn: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterate_prefix: Option<String>,
}

impl RenderConfig {
    /// Resolve against the defaults of `target`, or of the configured target.
    ///
    /// Overridden symbol names are checked before they can reach generated
    /// source; an empty `iterate_prefix` is rejected like any other name.
    pub fn options(&self, target: Option<Target>) -> ConfigResult<RenderOptions> {
        let target = target.or(self.target).unwrap_or_default();
        let mut options = RenderOptions::for_target(target);

        if let Some(style) = self.key_style {
            options.key_style = style;
        }
        if let Some(comments) = self.comments {
            options.emit_comments = comments;
        }
        if let Some(size) = self.indent {
            options.indent.size = size;
        }
        let overrides = [
            (&self.routine_name, &mut options.routine_name),
            (&self.instruction_type, &mut options.instruction_type),
            (&self.index_type, &mut options.index_type),
            (&self.status_type, &mut options.status_type),
            (&self.success_status, &mut options.success_status),
            (&self.unsupported_status, &mut options.unsupported_status),
            (&self.opcode_text_fn, &mut options.opcode_text_fn),
            (&self.iterate_prefix, &mut options.iterate_prefix),
        ];
        for (value, slot) in overrides {
            if let Some(value) = value {
                *slot = value.clone();
            }
        }
        options.validate()?;
        Ok(options)
    }
}

impl CatalogFile {
    /// Load a catalog file from a path.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let file = Self::parse(&content)?;
        debug!("loaded catalog file {}", path.display());
        Ok(file)
    }

    pub fn parse(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Find a catalog file by searching up from the given directory.
    pub fn find(start_dir: &Path) -> Option<PathBuf> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(CATALOG_FILE);
            if candidate.exists() {
                return Some(candidate);
            }
            if !dir.pop() {
                return None;
            }
        }
    }

    /// Load the nearest catalog file, or the built-in catalog if there is none.
    pub fn find_and_load(start_dir: &Path) -> ConfigResult<Self> {
        match Self::find(start_dir) {
            Some(path) => Self::load(&path),
            None => {
                debug!(
                    "no {} above {}, using built-in catalog",
                    CATALOG_FILE,
                    start_dir.display()
                );
                Ok(Self::builtin())
            }
        }
    }

    /// Save the catalog file to a path.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The built-in vector engine table as a file
    pub fn builtin() -> Self {
        let names = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            name: builtin::NAME.to_string(),
            base: DEFAULT_BASE,
            exclude: names(builtin::EXCLUDED),
            control: builtin::CONTROL
                .iter()
                .map(|s| OpcodeEntry::Name(s.to_string()))
                .collect(),
            naming: NamingConfig {
                opcode_prefix: "VE_".to_string(),
                handler_prefix: "ve_".to_string(),
            },
            render: RenderConfig::default(),
            types: builtin::TYPES
                .iter()
                .map(|s| TypeEntry {
                    name: s.to_string(),
                    token: None,
                    ordinal: None,
                })
                .collect(),
            groups: builtin::GROUPS
                .iter()
                .map(|row| GroupEntry {
                    arity: row.arity,
                    opcodes: row
                        .opcodes
                        .iter()
                        .map(|s| OpcodeEntry::Name(s.to_string()))
                        .collect(),
                })
                .collect(),
        }
    }

    /// Validate into a catalog
    pub fn into_catalog(self) -> ConfigResult<Catalog> {
        let types = self.types.into_iter().map(|t| TypeDecl {
            name: t.name,
            token: t.token,
            ordinal: t.ordinal,
        });

        let mut builder = Catalog::builder()
            .name(self.name)
            .base(self.base)
            .naming(Naming::new(
                self.naming.opcode_prefix,
                self.naming.handler_prefix,
            ))
            .types(types)
            .exclude(self.exclude)
            .control(self.control.into_iter().map(OpcodeDecl::from));

        for group in self.groups {
            builder = builder.group(group.arity, group.opcodes.into_iter().map(OpcodeDecl::from));
        }
        builder.build()
    }

    /// Render options with an optional target override
    pub fn render_options(&self, target: Option<Target>) -> ConfigResult<RenderOptions> {
        self.render.options(target)
    }
}
