//! Diagnostics reported by the verifier.
//!
//! A [`Diagnostic`] names the broken invariant with an [`ErrorCode`], says
//! what is wrong, and points at the offending node's [`Location`].

use std::fmt;

use lasr_ir::Location;

/// Verifier error codes.
///
/// All live in the internal-error range: a failed check means a pass or the
/// semantic analysis that built the tree is broken, never the user's code.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    /// Global scope has a parent or is not owned by the unit
    E9001,
    /// Two scopes share a counter
    E9002,
    /// Scope parent is not the enclosing scope
    E9003,
    /// Scope owner does not point at the symbol holding the scope
    E9004,
    /// Program or module outside the global scope
    E9005,
    /// Symbol is not held by its own parent scope under its own name
    E9006,
    /// Symbol reference does not resolve from the current scope
    E9007,
    /// Dependency is not a valid identifier
    E9008,
    /// Symbol node among the unit items
    E9009,
    /// Loop variable is not an integer
    E9010,
    /// External symbol link is missing or wrong
    E9011,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::E9001 => "E9001",
            ErrorCode::E9002 => "E9002",
            ErrorCode::E9003 => "E9003",
            ErrorCode::E9004 => "E9004",
            ErrorCode::E9005 => "E9005",
            ErrorCode::E9006 => "E9006",
            ErrorCode::E9007 => "E9007",
            ErrorCode::E9008 => "E9008",
            ErrorCode::E9009 => "E9009",
            ErrorCode::E9010 => "E9010",
            ErrorCode::E9011 => "E9011",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A location with a message.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
    pub loc: Location,
    pub message: String,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: Severity,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn error(code: ErrorCode) -> Self {
        Diagnostic {
            code,
            severity: Severity::Error,
            message: String::new(),
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_label(mut self, loc: Location, message: impl Into<String>) -> Self {
        self.labels.push(Label {
            loc,
            message: message.into(),
        });
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.code, self.message)?;
        for label in &self.labels {
            write!(f, "\n  --> {}: {}", label.loc, label.message)?;
        }
        for note in &self.notes {
            write!(f, "\n  = note: {note}")?;
        }
        Ok(())
    }
}

/// One diagnostic per line block, in report order.
pub fn render(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
