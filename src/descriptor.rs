//! Compiled, engine-agnostic constraints

use std::fmt;

use serde::Deserialize;

use crate::vocab::{Attribute, Relation};

/// Layout priority on the 0..=1000 scale
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize)]
#[serde(transparent)]
pub struct Priority(pub f32);

impl Priority {
    pub const REQUIRED: Priority = Priority(1000.0);
    pub const DEFAULT_HIGH: Priority = Priority(750.0);
    pub const DEFAULT_LOW: Priority = Priority(250.0);

    pub fn value(self) -> f32 {
        self.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One compiled constraint:
/// `item1.attr1 <relation> item2.attr2 * multiplier + constant`.
///
/// `item2`/`attr2` are absent for constant constraints such as
/// `a.width == 100`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintDescriptor {
    pub item1: String,
    pub attr1: Attribute,
    pub relation: Relation,
    pub item2: Option<String>,
    pub attr2: Option<Attribute>,
    pub multiplier: f64,
    pub constant: f64,
    /// `None` leaves the host default untouched
    pub priority: Option<Priority>,
}

impl ConstraintDescriptor {
    /// `item1.attr1 <relation> item2.attr2`, multiplier 1, constant 0
    pub fn new(
        item1: impl Into<String>,
        attr1: Attribute,
        relation: Relation,
        item2: impl Into<String>,
        attr2: Attribute,
    ) -> Self {
        Self {
            item1: item1.into(),
            attr1,
            relation,
            item2: Some(item2.into()),
            attr2: Some(attr2),
            multiplier: 1.0,
            constant: 0.0,
            priority: None,
        }
    }

    /// `item.attr <relation> constant`
    pub fn constant(
        item: impl Into<String>,
        attr: Attribute,
        relation: Relation,
        constant: f64,
    ) -> Self {
        Self {
            item1: item.into(),
            attr1: attr,
            relation,
            item2: None,
            attr2: None,
            multiplier: 1.0,
            constant,
            priority: None,
        }
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn with_constant(mut self, constant: f64) -> Self {
        self.constant = constant;
        self
    }

    pub fn with_priority(mut self, priority: Option<Priority>) -> Self {
        self.priority = priority;
        self
    }

    /// Keys this descriptor refers to
    pub fn items(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.item1.as_str()).chain(self.item2.as_deref())
    }
}

/// Displays as extended-format text when there is a second item. The output
/// compiles back to an equal descriptor only when there is no priority and
/// the multiplier is non-negative; the grammar has no signed multiplier, so
/// `* -2` (from a negative metric) is rejected.
impl fmt::Display for ConstraintDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.item2, self.attr2) {
            (Some(item2), Some(attr2)) => {
                write!(
                    f,
                    "X: {}.{} {} {}.{}",
                    self.item1, self.attr1, self.relation, item2, attr2
                )?;
                if self.multiplier != 1.0 {
                    write!(f, " * {}", self.multiplier)?;
                }
                if self.constant != 0.0 {
                    let sign = if self.constant < 0.0 { '-' } else { '+' };
                    write!(f, " {} {}", sign, self.constant.abs())?;
                }
            }
            _ => write!(
                f,
                "{}.{} {} {}",
                self.item1, self.attr1, self.relation, self.constant
            )?,
        }
        if let Some(priority) = self.priority {
            write!(f, " @{}", priority)?;
        }
        Ok(())
    }
}
