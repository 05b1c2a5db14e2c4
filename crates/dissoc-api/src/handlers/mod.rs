//! HTTP handlers.

pub mod diagnostics;
pub mod dissociate;
pub mod stubs;
pub mod system;
