//! Error types for constraint compilation and sequencing

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::host::HostError;
use crate::parser::ast::{CapturedGroup, Span};

/// Everything that can go wrong while compiling or sequencing constraints.
///
/// Every error is fatal to the operation that raised it: nothing is applied
/// to the host when compilation fails.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("metric `{name}` was not provided")]
    UnknownMetric { name: String },

    #[error("`{token}` is not a valid number")]
    MalformedNumber { token: String },

    #[error("attribute `{name}` is not valid. Use one of: {valid}")]
    UnknownAttribute { name: String, valid: String },

    #[error("relation `{symbol}` is not valid. Use one of: {valid}")]
    UnknownRelation { symbol: String, valid: String },

    #[error("no view was added with key `{key}`")]
    UnknownViewKey {
        key: String,
        suggestions: Vec<String>,
    },

    #[error("parent key `{key}` has no container view")]
    ParentKeyUnresolved { key: String },

    #[error("key `{key}` is reserved for the container view")]
    ReservedKey { key: String },

    #[error("invalid constraint `{raw}`: {reason}")]
    InvalidConstraintSyntax {
        raw: String,
        reason: String,
        span: Option<Span>,
        groups: Vec<CapturedGroup>,
    },

    #[error("cannot compile `{raw}`: {message}")]
    HostFormatError {
        raw: String,
        message: String,
        span: Option<Span>,
    },

    #[error("sequence has no views yet")]
    EmptySequence,

    /// A resolution error raised while compiling `raw`
    #[error("in constraint `{raw}`: {source}")]
    Constraint {
        raw: String,
        span: Option<Span>,
        #[source]
        source: Box<CompileError>,
    },

    #[error("host rejected constraint: {0}")]
    Host(#[from] HostError),
}

impl CompileError {
    /// Attach the constraint text (and the offending token's span) to a resolution error
    pub fn in_constraint(self, raw: &str, span: Option<Span>) -> Self {
        match self {
            err @ (CompileError::InvalidConstraintSyntax { .. }
            | CompileError::HostFormatError { .. }
            | CompileError::Constraint { .. }) => err,
            other => CompileError::Constraint {
                raw: raw.to_string(),
                span,
                source: Box::new(other),
            },
        }
    }

    /// The underlying error kind, looking through constraint context
    pub fn root(&self) -> &CompileError {
        match self {
            CompileError::Constraint { source, .. } => source.root(),
            other => other,
        }
    }

    /// Constraint text the error was raised for, if any
    pub fn raw(&self) -> Option<&str> {
        match self {
            CompileError::InvalidConstraintSyntax { raw, .. }
            | CompileError::HostFormatError { raw, .. }
            | CompileError::Constraint { raw, .. } => Some(raw),
            _ => None,
        }
    }

    /// Get the span of the offending text inside the constraint, if known
    pub fn span(&self) -> Option<&Span> {
        match self {
            CompileError::InvalidConstraintSyntax { span, .. }
            | CompileError::HostFormatError { span, .. }
            | CompileError::Constraint { span, .. } => span.as_ref(),
            _ => None,
        }
    }

    /// Format the error with the constraint text as context using ariadne
    pub fn format(&self, filename: &str) -> String {
        let Some(raw) = self.raw() else {
            return self.to_string();
        };
        let span = self.span().cloned().unwrap_or(0..raw.len());
        let message = match self {
            CompileError::Constraint { source, .. } => source.to_string(),
            CompileError::InvalidConstraintSyntax { reason, .. } => reason.clone(),
            CompileError::HostFormatError { message, .. } => message.clone(),
            other => other.to_string(),
        };

        let mut report = Report::build(ReportKind::Error, filename, span.start)
            .with_message(format!("invalid constraint `{}`", raw))
            .with_label(
                Label::new((filename, span))
                    .with_message(message)
                    .with_color(Color::Red),
            );
        if let CompileError::InvalidConstraintSyntax { groups, .. } = self {
            if !groups.is_empty() {
                report = report.with_note(dump_groups(groups));
            }
        }
        if let CompileError::UnknownViewKey { suggestions, .. } = self.root() {
            if !suggestions.is_empty() {
                report = report.with_help(format!("did you mean: {}", suggestions.join(", ")));
            }
        }

        let mut buf = Vec::new();
        match report
            .finish()
            .write((filename, Source::from(raw)), &mut buf)
        {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}

/// One line per captured group, in capture order
pub fn dump_groups(groups: &[CapturedGroup]) -> String {
    groups
        .iter()
        .map(|group| match &group.text {
            Some(text) => format!("group {}: {}", group.index, text),
            None => format!("group {}: NOT FOUND", group.index),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
