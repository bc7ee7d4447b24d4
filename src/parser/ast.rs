//! Syntax trees produced by the two constraint grammars

use crate::vocab::Axis;

/// Byte range in constraint text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// One numbered capture of an extended constraint match.
///
/// Group 0 is the whole constraint; optional clauses that were not written
/// have no text.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedGroup {
    pub index: usize,
    pub text: Option<String>,
    pub span: Option<Span>,
}

impl CapturedGroup {
    pub fn found(index: usize, text: impl Into<String>, span: Span) -> Self {
        Self {
            index,
            text: Some(text.into()),
            span: Some(span),
        }
    }

    pub fn missing(index: usize) -> Self {
        Self {
            index,
            text: None,
            span: None,
        }
    }

    pub fn as_spanned(&self) -> Option<Spanned<&str>> {
        match (&self.text, &self.span) {
            (Some(text), Some(span)) => Some(Spanned::new(text.as_str(), span.clone())),
            _ => None,
        }
    }
}

/// A parsed standard-format string:
/// `orientation? (| connection)? view (connection view)* (connection |)?`
#[derive(Debug, Clone, PartialEq)]
pub struct VisualFormat {
    pub orientation: Option<Axis>,
    /// Connection from the container's leading edge to the first view
    pub leading: Option<Connection>,
    pub first: ViewSpec,
    pub rest: Vec<(Connection, ViewSpec)>,
    /// Connection from the last view to the container's trailing edge
    pub trailing: Option<Connection>,
}

impl VisualFormat {
    pub fn views(&self) -> impl Iterator<Item = &ViewSpec> {
        std::iter::once(&self.first).chain(self.rest.iter().map(|(_, view)| view))
    }

    pub fn last(&self) -> &ViewSpec {
        self.rest.last().map(|(_, view)| view).unwrap_or(&self.first)
    }
}

/// `[name(predicates)]`
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSpec {
    pub name: Spanned<String>,
    pub predicates: Vec<Predicate>,
}

/// Spacing between two adjacent items in a chain
#[derive(Debug, Clone, PartialEq)]
pub enum Connection {
    /// `[a][b]`: no gap
    Flush,
    /// `[a]-[b]`: the standard gap
    Standard,
    /// `[a]-(…)-[b]` or `[a]-20-[b]`
    Explicit(Vec<Predicate>),
}

/// `relation? object (@priority)?`
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub relation: Option<Spanned<String>>,
    pub object: Spanned<PredicateObject>,
    pub priority: Option<Spanned<PredicateObject>>,
}

impl Predicate {
    /// A bare metric or number, as in `-20-`
    pub fn simple(object: Spanned<PredicateObject>) -> Self {
        Self {
            relation: None,
            object,
            priority: None,
        }
    }
}

/// Right-hand side of a predicate
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateObject {
    /// Metric name, or a view key inside a view's size predicate
    Name(String),
    /// Decimal literal, possibly negative
    Number(String),
}

impl PredicateObject {
    pub fn text(&self) -> &str {
        match self {
            PredicateObject::Name(s) | PredicateObject::Number(s) => s,
        }
    }
}
