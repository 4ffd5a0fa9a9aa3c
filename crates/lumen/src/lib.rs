//! Top-level facade crate for Lumen.
//!
//! Re-exports the metric core and the service library so users can depend on a single crate.

pub mod core {
    pub use lumen_core::*;
}

pub mod server {
    pub use lumen_server::*;
}
