//! Diagnostics and the error report the middle-end accumulates into.

use crate::Span;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "Warning"),
            Severity::Error => write!(f, "Error"),
        }
    }
}

/// A message with an optional source location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub text: String,
    pub loc: Option<Span>,
}

impl DiagnosticMessage {
    pub fn new(text: impl Into<String>, loc: Span) -> Self {
        DiagnosticMessage {
            text: text.into(),
            loc: Some(loc),
        }
    }

    pub fn unlocated(text: impl Into<String>) -> Self {
        DiagnosticMessage {
            text: text.into(),
            loc: None,
        }
    }
}

impl fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)?;
        if let Some(loc) = &self.loc {
            write!(f, " in {}", loc)?;
        }
        Ok(())
    }
}

/// A diagnostic: a primary message plus associated notes (e.g. the previous
/// definition site of a redefined relation)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: DiagnosticMessage,
    pub notes: Vec<DiagnosticMessage>,
}

impl Diagnostic {
    pub fn error(message: DiagnosticMessage) -> Self {
        Diagnostic {
            severity: Severity::Error,
            message,
            notes: Vec::new(),
        }
    }

    pub fn warning(message: DiagnosticMessage) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            message,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: DiagnosticMessage) -> Self {
        self.notes.push(note);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        for note in &self.notes {
            write!(f, "\n  {}", note)?;
        }
        Ok(())
    }
}

/// Collects the diagnostics produced while building and transforming a
/// program. Errors are recorded, not thrown; the driver decides when to stop
/// based on the error count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorReport {
    diagnostics: Vec<Diagnostic>,
}

impl ErrorReport {
    pub fn new() -> Self {
        ErrorReport::default()
    }

    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn add_error(&mut self, text: impl Into<String>, loc: Span) {
        self.add_diagnostic(Diagnostic::error(DiagnosticMessage::new(text, loc)));
    }

    pub fn add_warning(&mut self, text: impl Into<String>, loc: Span) {
        self.add_diagnostic(Diagnostic::warning(DiagnosticMessage::new(text, loc)));
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.diagnostics {
            writeln!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}
