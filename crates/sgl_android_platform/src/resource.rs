//! Resource paths.
//!
//! A path is a list of parts, joined with `/` when displayed. On Android the
//! resources live at the root of the asset tree, so both roots are empty.

use std::fmt;
use std::ops::Div;

/// Path to a bundled resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ResourcePath {
    parts: Vec<String>,
}

impl ResourcePath {
    /// The empty path.
    #[must_use]
    pub const fn root() -> Self {
        Self { parts: Vec::new() }
    }

    /// A path from explicit parts.
    #[must_use]
    pub fn from_parts<I, P>(parts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    /// A new path with `part` appended.
    #[must_use]
    pub fn join(&self, part: impl Into<String>) -> Self {
        let mut parts = self.parts.clone();
        parts.push(part.into());
        Self { parts }
    }

    /// The parts of the path.
    #[must_use]
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Extension of the last part, without the dot.
    ///
    /// `None` when there is no dot or the only dot is the first character
    /// (`.hidden`).
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        let last = self.parts.last()?;
        match last.rfind('.') {
            Some(i) if i > 0 => Some(&last[i + 1..]),
            _ => None,
        }
    }
}

impl<S: Into<String>> Div<S> for &ResourcePath {
    type Output = ResourcePath;

    fn div(self, part: S) -> ResourcePath {
        self.join(part)
    }
}

impl<S: Into<String>> Div<S> for ResourcePath {
    type Output = ResourcePath;

    fn div(mut self, part: S) -> ResourcePath {
        self.parts.push(part.into());
        self
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.parts.join("/"))
    }
}
