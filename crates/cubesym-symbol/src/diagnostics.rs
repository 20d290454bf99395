//! Diagnostic events raised while building a symbol.
//!
//! The merger, classifier and emitter never print. They report what they did
//! to a [`DiagnosticSink`]; the command line tool forwards events to `log`
//! with [`LogSink`], tests collect them in a `Vec<Diagnostic>`.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Diagnostic {
    /// Two records with the same pin number were combined.
    PinMerged {
        number: String,
        name: String,
        merged_name: String,
        pin_type: String,
        alternates: Vec<String>,
    },
    /// A pin carries an electrical type outside the known vocabulary.
    UnrecognizedPinType { pin: String, pin_type: String },
    /// A pin carries no electrical type at all.
    EmptyPinType { pin: String },
    /// An exposed pad pin was added for a QFN package.
    PadSynthesized {
        package: String,
        number: String,
        pin_type: String,
    },
    /// A QFN package name without a pin count, so no pad could be numbered.
    PadCountMissing { package: String },
    /// The package data already lists a pin with the exposed pad's number.
    PadNumberTaken { package: String, number: String },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::PinMerged { .. } | Diagnostic::PadSynthesized { .. } => Severity::Info,
            Diagnostic::UnrecognizedPinType { .. }
            | Diagnostic::EmptyPinType { .. }
            | Diagnostic::PadCountMissing { .. }
            | Diagnostic::PadNumberTaken { .. } => Severity::Warning,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::PinMerged {
                number,
                name,
                merged_name,
                pin_type,
                alternates,
            } => write!(
                f,
                "merged pin {number} ({merged_name}) into {name}: type {pin_type}, functions [{}]",
                alternates.join(", ")
            ),
            Diagnostic::UnrecognizedPinType { pin, pin_type } => write!(
                f,
                "pin '{pin}' has unknown type '{pin_type}', using bidirectional"
            ),
            Diagnostic::EmptyPinType { pin } => {
                write!(f, "pin '{pin}' has no type, using bidirectional")
            }
            Diagnostic::PadSynthesized {
                package,
                number,
                pin_type,
            } => write!(f, "added exposed pad {number} ({pin_type}) for {package}"),
            Diagnostic::PadCountMissing { package } => write!(
                f,
                "package '{package}' has an exposed pad but no pin count, pad skipped"
            ),
            Diagnostic::PadNumberTaken { package, number } => write!(
                f,
                "package '{package}' already has a pin {number}, exposed pad skipped"
            ),
        }
    }
}

/// Receiver for [`Diagnostic`] events.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Forwards diagnostics to the `log` facade, tagged with the chip they
/// belong to.
#[derive(Debug, Clone, Default)]
pub struct LogSink {
    context: String,
}

impl LogSink {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
        }
    }
}

impl DiagnosticSink for LogSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity() {
            Severity::Info => log::debug!("{}: {diagnostic}", self.context),
            Severity::Warning => log::warn!("{}: {diagnostic}", self.context),
        }
    }
}

/// Discards every diagnostic.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&mut self, _diagnostic: Diagnostic) {}
}
