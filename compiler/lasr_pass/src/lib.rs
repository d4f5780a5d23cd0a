//! ASR verifier and pass pipeline.
//!
//! - [`verify`] checks the structural invariants of a tree
//! - [`passes`] holds the ASR-to-ASR rewrites
//! - [`PassManager`] runs passes by name, optionally re-verifying after each
//!
//! All passes share one signature, [`PassFn`], and are configured through
//! [`PassOptions`].

mod diagnostic;
mod error;
mod manager;
mod options;
pub mod passes;
mod verify;

use std::sync::Once;

pub use diagnostic::{render, Diagnostic, ErrorCode, Label, Severity};
pub use error::{PassError, VerifyError};
pub use manager::{PassManager, PassTiming, DEFAULT_PASSES};
pub use options::PassOptions;
pub use passes::PassFn;
pub use verify::{verify, verify_unit};

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing unless `RUST_LOG` is set, and only the first call has any
/// effect.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
