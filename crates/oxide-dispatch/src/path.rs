//! Path pattern compilation and matching.

use regex::Regex;

use crate::error::{Result, RouterError};
use crate::request::PathParams;

/// A compiled path pattern for matching request URIs.
#[derive(Debug, Clone)]
pub struct PathPattern {
    /// The original pattern string.
    pattern: String,
    /// Compiled regex for matching.
    regex: Regex,
    /// Parameter names in declaration order.
    param_names: Vec<String>,
}

impl PathPattern {
    /// Compiles a path pattern, panicking on malformed input.
    ///
    /// Pattern syntax:
    /// - `/users` - Literal path
    /// - `/users/{id}` - Path with a single-segment parameter
    /// - `/files/{name}.json` - Literal text may follow a parameter
    ///
    /// # Panics
    ///
    /// Panics if the pattern is malformed (see [`PathPattern::parse`]).
    ///
    /// # Example
    ///
    /// ```
    /// use oxide_dispatch::PathPattern;
    ///
    /// let pattern = PathPattern::new("/posts/{id}/comments/{comment_id}");
    /// let params = pattern.match_path("/posts/123/comments/456").unwrap();
    /// assert_eq!(params.get("id"), Some("123"));
    /// assert_eq!(&params[1], "456");
    /// ```
    pub fn new(pattern: &str) -> Self {
        Self::parse(pattern).expect("invalid path pattern")
    }

    /// Compiles a path pattern.
    ///
    /// Every `/{name}` becomes a capture matching one non-empty run of
    /// characters up to the next `/`; all other text matches literally and
    /// the whole path is anchored at both ends.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidPattern`] for an unclosed `{`, a stray
    /// `{` or `}` outside a `/{name}` placeholder, or a placeholder name that
    /// is not an identifier.
    pub fn parse(pattern: &str) -> Result<Self> {
        let mut param_names = Vec::new();
        let mut regex_str = String::from("^");
        let mut rest = pattern;

        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix("/{") {
                let end = after
                    .find('}')
                    .ok_or_else(|| invalid(pattern, "unclosed `{`"))?;
                let name = &after[..end];
                if !is_identifier(name) {
                    return Err(invalid(
                        pattern,
                        format!("parameter name {name:?} is not an identifier"),
                    ));
                }
                param_names.push(name.to_string());
                regex_str.push_str("/([^/]+)");
                rest = &after[end + 1..];
            } else {
                let first = rest.chars().next().map_or(0, char::len_utf8);
                let next = rest[first..].find("/{").map_or(rest.len(), |i| i + first);
                let literal = &rest[..next];
                if literal.contains(['{', '}']) {
                    return Err(invalid(pattern, "braces must form a `/{name}` segment"));
                }
                regex_str.push_str(&regex::escape(literal));
                rest = &rest[next..];
            }
        }

        regex_str.push('$');

        let regex = Regex::new(&regex_str).map_err(|e| invalid(pattern, e.to_string()))?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            param_names,
        })
    }

    /// Attempts to match a path against this pattern.
    ///
    /// Returns the captured parameters, in declaration order, if the path
    /// matches. Each capture is bounded by the start of the next capture and
    /// trimmed of surrounding `/`.
    pub fn match_path(&self, path: &str) -> Option<PathParams> {
        let caps = self.regex.captures(path)?;
        let groups: Vec<_> = (1..caps.len()).map(|i| caps.get(i)).collect();

        let mut params = PathParams::new();

        for (i, name) in self.param_names.iter().enumerate() {
            let value = match (groups[i], groups.get(i + 1).copied().flatten()) {
                (Some(m), Some(next)) if next.start() >= m.start() => {
                    let len = next.start() - m.start();
                    m.as_str().get(..len).unwrap_or(m.as_str())
                }
                (Some(m), _) => m.as_str(),
                (None, _) => "",
            };
            params.push(name.clone(), value.trim_matches('/'));
        }

        Some(params)
    }

    /// Returns the original pattern string.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the parameter names.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn invalid(pattern: &str, reason: impl Into<String>) -> RouterError {
    RouterError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_path() {
        let pattern = PathPattern::new("/users");
        assert!(pattern.match_path("/users").is_some());
        assert!(pattern.match_path("/users/extra").is_none());
        assert!(pattern.match_path("/posts").is_none());
    }

    #[test]
    fn test_single_param() {
        let pattern = PathPattern::new("/users/{id}");
        let params = pattern.match_path("/users/42").unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("id"), Some("42"));
    }

    #[test]
    fn test_param_is_single_segment() {
        let pattern = PathPattern::new("/users/{id}");
        assert!(pattern.match_path("/users/").is_none());
        assert!(pattern.match_path("/users/1/2").is_none());
    }

    #[test]
    fn test_multiple_params_in_order() {
        let pattern = PathPattern::new("/a/{x}/b/{y}");
        let params = pattern.match_path("/a/hello/b/world").unwrap();
        assert_eq!(pattern.param_names(), ["x", "y"]);
        assert_eq!(params.values().collect::<Vec<_>>(), ["hello", "world"]);
    }

    #[test]
    fn test_adjacent_params() {
        let pattern = PathPattern::new("/{year}/{month}/{day}");
        let params = pattern.match_path("/2024/05/17").unwrap();
        assert_eq!(params.values().collect::<Vec<_>>(), ["2024", "05", "17"]);
    }

    #[test]
    fn test_literal_suffix_after_param() {
        let pattern = PathPattern::new("/files/{name}.json");
        let params = pattern.match_path("/files/report.json").unwrap();
        assert_eq!(params.get("name"), Some("report"));
        assert!(pattern.match_path("/files/report.xml").is_none());
    }

    #[test]
    fn test_literals_are_escaped() {
        let pattern = PathPattern::new("/v1.0/items");
        assert!(pattern.match_path("/v1.0/items").is_some());
        assert!(pattern.match_path("/v1x0/items").is_none());
    }

    #[test]
    fn test_malformed_patterns() {
        assert!(matches!(
            PathPattern::parse("/users/{id"),
            Err(RouterError::InvalidPattern { .. })
        ));
        assert!(PathPattern::parse("/users/{}").is_err());
        assert!(PathPattern::parse("/users/x{id}").is_err());
        assert!(PathPattern::parse("/users/id}").is_err());
        assert!(PathPattern::parse("/users/{a-b}").is_err());
    }

    #[test]
    #[should_panic(expected = "invalid path pattern")]
    fn test_new_panics_on_malformed_pattern() {
        let _ = PathPattern::new("/broken/{");
    }
}
