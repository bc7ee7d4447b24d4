//! Fixed keyword vocabularies shared by both constraint grammars

use std::fmt;

use crate::error::CompileError;

/// A layout attribute of a view or guide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Left,
    Right,
    Top,
    Bottom,
    Leading,
    Trailing,
    Width,
    Height,
    CenterX,
    CenterY,
    /// Last text baseline
    Baseline,
}

const ATTRIBUTES: [(&str, Attribute); 11] = [
    ("left", Attribute::Left),
    ("right", Attribute::Right),
    ("top", Attribute::Top),
    ("bottom", Attribute::Bottom),
    ("leading", Attribute::Leading),
    ("trailing", Attribute::Trailing),
    ("width", Attribute::Width),
    ("height", Attribute::Height),
    ("centerX", Attribute::CenterX),
    ("centerY", Attribute::CenterY),
    ("baseline", Attribute::Baseline),
];

impl Attribute {
    /// Look up an attribute keyword (case-sensitive)
    pub fn from_keyword(keyword: &str) -> Result<Self, CompileError> {
        ATTRIBUTES
            .iter()
            .find(|(name, _)| *name == keyword)
            .map(|(_, attr)| *attr)
            .ok_or_else(|| CompileError::UnknownAttribute {
                name: keyword.to_string(),
                valid: Self::keywords().join(", "),
            })
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Attribute::Left => "left",
            Attribute::Right => "right",
            Attribute::Top => "top",
            Attribute::Bottom => "bottom",
            Attribute::Leading => "leading",
            Attribute::Trailing => "trailing",
            Attribute::Width => "width",
            Attribute::Height => "height",
            Attribute::CenterX => "centerX",
            Attribute::CenterY => "centerY",
            Attribute::Baseline => "baseline",
        }
    }

    /// All attribute keywords in declaration order
    pub fn keywords() -> Vec<&'static str> {
        ATTRIBUTES.iter().map(|(name, _)| *name).collect()
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// How the two sides of a constraint relate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Equal,
    GreaterOrEqual,
    LessOrEqual,
}

const RELATIONS: [(&str, Relation); 3] = [
    ("==", Relation::Equal),
    (">=", Relation::GreaterOrEqual),
    ("<=", Relation::LessOrEqual),
];

impl Relation {
    /// Look up a relation symbol
    pub fn from_symbol(symbol: &str) -> Result<Self, CompileError> {
        RELATIONS
            .iter()
            .find(|(sym, _)| *sym == symbol)
            .map(|(_, rel)| *rel)
            .ok_or_else(|| CompileError::UnknownRelation {
                symbol: symbol.to_string(),
                valid: Self::symbols().join(", "),
            })
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Relation::Equal => "==",
            Relation::GreaterOrEqual => ">=",
            Relation::LessOrEqual => "<=",
        }
    }

    pub fn symbols() -> Vec<&'static str> {
        RELATIONS.iter().map(|(sym, _)| *sym).collect()
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Layout axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// The perpendicular axis
    pub fn cross(self) -> Self {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }

    /// Orientation tag used by the standard format (`H` or `V`)
    pub fn letter(self) -> &'static str {
        match self {
            Axis::Horizontal => "H",
            Axis::Vertical => "V",
        }
    }

    /// Center attribute measured along this axis
    pub fn center(self) -> Attribute {
        match self {
            Axis::Horizontal => Attribute::CenterX,
            Axis::Vertical => Attribute::CenterY,
        }
    }

    /// Edge attributes a chain along this axis runs between
    pub fn edges(self) -> (Attribute, Attribute) {
        match self {
            Axis::Horizontal => (Attribute::Leading, Attribute::Trailing),
            Axis::Vertical => (Attribute::Top, Attribute::Bottom),
        }
    }

    /// Size attribute measured along this axis
    pub fn size(self) -> Attribute {
        match self {
            Axis::Horizontal => Attribute::Width,
            Axis::Vertical => Attribute::Height,
        }
    }
}
