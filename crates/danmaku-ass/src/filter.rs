//! Admission filters.
//!
//! A [`CommentFilter`] decides, from the comment text alone, whether a comment
//! is refused before it reaches layout.

use regex::Regex;

use crate::error::Result;

/// Predicate applied to every comment at admission.
pub trait CommentFilter: Send + Sync {
    /// Return `true` to refuse the comment.
    fn rejects(&self, text: &str) -> bool;
}

/// Filter that admits everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl CommentFilter for AcceptAll {
    fn rejects(&self, _text: &str) -> bool {
        false
    }
}

/// Refuse comments whose text matches a regular expression.
#[derive(Debug, Clone)]
pub struct RegexFilter {
    pattern: Regex,
}

impl RegexFilter {
    /// Compile `pattern`.
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

impl CommentFilter for RegexFilter {
    fn rejects(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

impl<F> CommentFilter for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn rejects(&self, text: &str) -> bool {
        self(text)
    }
}
