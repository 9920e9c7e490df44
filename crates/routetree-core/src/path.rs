#![forbid(unsafe_code)]

//! Path segments and the string path boundary.
//!
//! Navigation collaborators speak strings (`/a/b/c`, `b/c`, `./b/c`, `../x`);
//! the tree speaks validated segment sequences. This module is the thin
//! boundary between the two: [`Segment`] enforces name validity at
//! construction, and [`RoutePath`] decomposes a string into ordered steps
//! without consulting any tree.
//!
//! Parsing splits on [`SEPARATOR`], discards empty segments produced by
//! consecutive separators, drops `.` segments, and turns each `..` into a
//! [`PathStep::Parent`] applied left to right during resolution.

use std::error::Error;
use std::fmt;
use std::str::FromStr;

/// The path separator character.
pub const SEPARATOR: char = '/';

/// Rejection reasons for a prospective node name.
///
/// Raised at construction time; a name that fails validation never enters
/// the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidName {
    /// Names must be non-empty.
    Empty,
    /// Names cannot contain the path separator.
    Separator {
        /// The rejected name.
        name: String,
    },
}

impl fmt::Display for InvalidName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "node names must be non-empty"),
            Self::Separator { name } => {
                write!(f, "node name {name:?} contains the path separator")
            }
        }
    }
}

impl Error for InvalidName {}

/// A validated path segment: the name of one node.
///
/// Non-empty and free of the separator character, by construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Segment(String);

impl Segment {
    /// Validate `name` as a path segment.
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidName> {
        let name = name.into();
        if name.is_empty() {
            return Err(InvalidName::Empty);
        }
        if name.contains(SEPARATOR) {
            return Err(InvalidName::Separator { name });
        }
        Ok(Self(name))
    }

    /// The segment as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Segment {
    type Err = InvalidName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for Segment {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One step of a decomposed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    /// Ascend to the parent before continuing (`..`).
    Parent,
    /// Descend into the named child.
    Name(Segment),
}

/// A decomposed path: an anchor plus ordered steps.
///
/// Absolute paths resolve from the tree root; relative paths resolve from
/// the node at hand. `Display` produces a canonical string form that parses
/// back to an equal value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePath {
    /// Whether resolution starts at the tree root.
    pub is_absolute: bool,
    /// Steps applied left to right.
    pub steps: Vec<PathStep>,
}

impl RoutePath {
    /// The root path, `/`.
    #[must_use]
    pub fn root() -> Self {
        Self {
            is_absolute: true,
            steps: Vec::new(),
        }
    }

    /// An absolute path descending through `segments`.
    #[must_use]
    pub fn absolute(segments: Vec<Segment>) -> Self {
        Self {
            is_absolute: true,
            steps: segments.into_iter().map(PathStep::Name).collect(),
        }
    }

    /// A relative path descending through `segments`.
    #[must_use]
    pub fn relative(segments: Vec<Segment>) -> Self {
        Self {
            is_absolute: false,
            steps: segments.into_iter().map(PathStep::Name).collect(),
        }
    }
}

impl FromStr for RoutePath {
    type Err = InvalidName;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let is_absolute = input.starts_with(SEPARATOR);
        let mut steps = Vec::new();
        for part in input.split(SEPARATOR) {
            match part {
                "" | "." => {}
                ".." => steps.push(PathStep::Parent),
                name => steps.push(PathStep::Name(Segment::new(name)?)),
            }
        }
        Ok(Self { is_absolute, steps })
    }
}

impl fmt::Display for RoutePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return f.write_str(if self.is_absolute { "/" } else { "." });
        }
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 || self.is_absolute {
                f.write_str("/")?;
            }
            match step {
                PathStep::Parent => f.write_str("..")?,
                PathStep::Name(name) => write!(f, "{name}")?,
            }
        }
        Ok(())
    }
}
