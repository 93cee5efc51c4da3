//! Dispatch arm and handler stub emitters
//!
//! Both emitters turn a validated [`Catalog`](crate::catalog::Catalog) into
//! plain data; laying that data out as source text is the renderer's job.

pub mod dispatch;
pub mod stubs;

pub use dispatch::{emit_dispatch, ControlEntry, DispatchArm, DispatchTable};
pub use stubs::{emit_stub, emit_stubs, HandlerSignature};
