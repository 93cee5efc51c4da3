//! Generation pipeline
//!
//! Catalog -> dispatch arms + handler stubs -> rendered artifact. Validation
//! has already happened when the [`Catalog`] was built, and the emitted table
//! is re-checked before rendering, so a generation run either fails before
//! producing any text or returns the complete artifact.

use crate::catalog::Catalog;
use crate::emit::{emit_dispatch, emit_stubs};
use crate::error::ConfigResult;
use crate::render::{render, DispatchArtifact, Emit, RenderOptions};
use log::info;

/// One-shot dispatch generator over a validated catalog
pub struct Generator<'a> {
    catalog: &'a Catalog,
    options: RenderOptions,
}

impl<'a> Generator<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            options: RenderOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn generate(&self, emit: Emit) -> ConfigResult<DispatchArtifact> {
        self.options.validate()?;
        let table = emit_dispatch(self.catalog)?;
        let stubs = emit_stubs(self.catalog);
        let artifact = render(&table, &stubs, &self.options, emit);

        info!(
            "generated {} dispatch for '{}': {} arms, {} handlers, {} control opcodes",
            artifact.target,
            self.catalog.name(),
            artifact.table.len(),
            artifact.handlers.len(),
            artifact.table.controls.len()
        );
        Ok(artifact)
    }
}

/// Generate with default render options
pub fn generate(catalog: &Catalog, emit: Emit) -> ConfigResult<DispatchArtifact> {
    Generator::new(catalog).generate(emit)
}
