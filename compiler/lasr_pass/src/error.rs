//! Pass pipeline errors.

use lasr_ir::symtab::SymtabError;
use thiserror::Error;

use crate::diagnostic::{render, Diagnostic};

/// The tree broke at least one structural invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("ASR verification failed:\n{}", render(diagnostics))]
pub struct VerifyError {
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PassError {
    #[error("unknown pass '{0}'")]
    UnknownPass(String),

    /// The tree no longer verifies after `pass` ran.
    #[error("ASR verification failed after pass '{pass}':\n{diagnostics}")]
    VerifyFailed { pass: String, diagnostics: String },

    /// The pass met a construct it cannot lower.
    #[error("{pass}: {message}")]
    Unsupported { pass: &'static str, message: String },

    #[error("{pass}: {source}")]
    Symtab {
        pass: &'static str,
        #[source]
        source: SymtabError,
    },
}

impl PassError {
    pub(crate) fn unsupported(pass: &'static str, message: impl Into<String>) -> Self {
        PassError::Unsupported {
            pass,
            message: message.into(),
        }
    }

    pub(crate) fn symtab(pass: &'static str) -> impl Fn(SymtabError) -> Self {
        move |source| PassError::Symtab { pass, source }
    }
}
