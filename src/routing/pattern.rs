//! Route template parsing and segment-wise matching.
//!
//! A pattern is an ordered list of segments, each a literal or a `:name`
//! capture. Patterns and request paths go through the same normalization, so
//! a match is a plain positional walk over both lists.

use std::collections::HashMap;

/// Parameters extracted from a matched path, capture name to segment text.
pub type Params = HashMap<String, String>;

/// One `/`-delimited part of a route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Capture(String),
}

/// A parsed route template. Segment count is fixed at parse time.
#[derive(Debug, Clone)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

/// Normalize a path or template into its segments: strip leading slashes,
/// split on `/`, drop trailing empty parts. `/a/b/` and `/a/b` normalize
/// identically; `/` and the empty string normalize to no segments.
pub fn split_segments(path: &str) -> Vec<&str> {
    let mut parts: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    while parts.last() == Some(&"") {
        parts.pop();
    }
    parts
}

impl PathPattern {
    /// Parse a route template. A segment starting with `:` followed by at
    /// least one character becomes a capture named by the remainder; a lone
    /// `:` stays a literal.
    #[must_use]
    pub fn parse(template: &str) -> Self {
        let segments = split_segments(template)
            .into_iter()
            .map(|part| match part.strip_prefix(':') {
                Some(name) if !name.is_empty() => Segment::Capture(name.to_string()),
                _ => Segment::Literal(part.to_string()),
            })
            .collect();
        Self { segments }
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Attempt a structural match against normalized request segments.
    ///
    /// Counts must be equal; literals require byte-exact equality; captures
    /// bind the request segment under the capture name. Returns the bound
    /// parameters on success, `None` on the first mismatch.
    #[must_use]
    pub fn matches(&self, parts: &[&str]) -> Option<Params> {
        if self.segments.len() != parts.len() {
            return None;
        }

        let mut params = Params::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Capture(name) => {
                    params.insert(name.clone(), (*part).to_string());
                }
                Segment::Literal(literal) => {
                    if literal != part {
                        return None;
                    }
                }
            }
        }

        Some(params)
    }
}
