//! Build-script helper
//!
//! ```ignore
//! // build.rs
//! let catalog = vedispatch::catalog::builtin::catalog()?;
//! let options = vedispatch::render::RenderOptions::for_target(vedispatch::render::Target::Rust);
//! let out_dir = std::path::PathBuf::from(std::env::var("OUT_DIR")?);
//! vedispatch::build_support::generate_into(&out_dir, &catalog, &options)?;
//! ```
//!
//! The engine then pulls the routine in with
//! `include!(concat!(env!("OUT_DIR"), "/ve_dispatch.rs"))`.

use crate::catalog::Catalog;
use crate::error::ConfigResult;
use crate::generator::Generator;
use crate::render::{Emit, RenderOptions};
use log::info;
use std::path::{Path, PathBuf};

/// Render the routine and stubs and write them under `out_dir`.
///
/// The file is only rewritten when its content changes, so cargo does not
/// rebuild dependents on every build script run.
pub fn generate_into(
    out_dir: &Path,
    catalog: &Catalog,
    options: &RenderOptions,
) -> ConfigResult<PathBuf> {
    let artifact = Generator::new(catalog)
        .with_options(options.clone())
        .generate(Emit::All)?;

    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(artifact.file_name());
    let source = artifact.source();

    let unchanged = std::fs::read_to_string(&path)
        .map(|existing| existing == source)
        .unwrap_or(false);
    if unchanged {
        info!("{} is up to date", path.display());
    } else {
        std::fs::write(&path, source)?;
        info!("wrote {}", path.display());
    }
    Ok(path)
}
