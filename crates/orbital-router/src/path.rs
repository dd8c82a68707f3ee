//! Rule pattern compilation and matching.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// Matches `(:name)` placeholders inside a rule.
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(:([a-zA-Z0-9]+)\)").expect("placeholder regex is valid"));

/// Capture substituted for every placeholder.
/// Case folding inside the capture is ASCII-only.
const SEGMENT_CAPTURE: &str = "((?i-u:[a-z0-9_-])+)";

/// A compiled route rule.
///
/// Rule syntax:
/// - `/users` - literal path
/// - `/users/(:id)` - positional parameter matching `[a-z0-9-_]+`
/// - `/files/(:name).(:ext)` - placeholders may share a segment
///
/// Everything outside placeholders is handed to the regex engine as is, so
/// rules may carry their own regex syntax. Matching is anchored and
/// case-insensitive.
#[derive(Debug, Clone)]
pub struct RulePattern {
    /// The rule as registered.
    rule: String,
    /// Compiled matcher; `None` when the rule is not a valid expression.
    regex: Option<Regex>,
    /// Placeholder names in occurrence order.
    placeholders: Vec<String>,
}

impl RulePattern {
    /// Compiles a rule.
    ///
    /// # Example
    ///
    /// ```
    /// use orbital_router::RulePattern;
    ///
    /// let pattern = RulePattern::compile("/posts/(:id)/comments/(:comment)");
    /// let params = pattern.captures("/posts/123/comments/456").unwrap();
    /// assert_eq!(params, vec!["123", "456"]);
    /// ```
    pub fn compile(rule: &str) -> Self {
        let placeholders = PLACEHOLDER
            .captures_iter(rule)
            .map(|caps| caps[1].to_string())
            .collect();

        let body = PLACEHOLDER.replace_all(rule, SEGMENT_CAPTURE);
        let source = format!("(?i)^{body}$");

        let regex = match Regex::new(&source) {
            Ok(regex) => Some(regex),
            Err(e) => {
                warn!(rule, error = %e, "rule is not a valid pattern, matching literally");
                None
            }
        };

        Self {
            rule: rule.to_string(),
            regex,
            placeholders,
        }
    }

    /// Matches `path` against this rule and returns the captured
    /// parameters in order.
    ///
    /// A path equal to the raw rule always matches, with no parameters.
    pub fn captures<'p>(&self, path: &'p str) -> Option<Vec<&'p str>> {
        if let Some(caps) = self.regex.as_ref().and_then(|r| r.captures(path)) {
            return Some(
                caps.iter()
                    .skip(1)
                    .map(|m| m.map_or("", |m| m.as_str()))
                    .collect(),
            );
        }

        (self.rule == path).then(Vec::new)
    }

    /// Returns true if `path` matches this rule.
    pub fn is_match(&self, path: &str) -> bool {
        self.captures(path).is_some()
    }

    /// Returns the rule string.
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// Returns the placeholder names in occurrence order.
    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    /// Returns the compiled expression source, if the rule compiled.
    pub fn as_regex(&self) -> Option<&str> {
        self.regex.as_ref().map(Regex::as_str)
    }
}
