//! Path template compilation.
//!
//! Turns a template such as `/users/:id/posts/:post_id(\d+)` into an anchored
//! regex plus the ordered list of parameter names, one per capture group.
//!
//! ## Template grammar
//!
//! - Literal text matches itself (regex metacharacters are escaped)
//! - `:name` captures one path segment (`[^/#?]+?`)
//! - `:name(<regex>)` captures with a custom sub-pattern; only non-capturing
//!   groups are allowed inside it
//! - `:name?` makes the parameter, and a directly preceding `/`, optional
//! - `\` escapes the next character (e.g. `\:` for a literal colon)
//!
//! ## Anchoring
//!
//! With `end = true` the whole path must match, allowing one trailing
//! slash. With `end = false` the template only has to match a prefix of
//! the path that ends on a segment boundary, so `/api` matches `/api`,
//! `/api/users` and `/api?x=1` but not `/apis`. The empty template with
//! `end = false` matches every path.

use regex::Regex;
use std::iter::Peekable;
use std::str::CharIndices;
use std::sync::Arc;

use super::params::Params;
use crate::error::PatternError;

/// Sub-pattern used for parameters without an explicit pattern
const DEFAULT_PARAM_PATTERN: &str = "[^/#?]+?";

/// Tail appended for exact (`end = true`) matching
const EXACT_TAIL: &str = "/?$";

/// Tail appended for prefix (`end = false`) matching
const PREFIX_TAIL: &str = "(?:[/#?].*)?$";

/// Options controlling how a template is anchored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternOptions {
    /// Require the template to match the entire path
    pub end: bool,
}

impl Default for PatternOptions {
    fn default() -> Self {
        Self { end: true }
    }
}

/// A compiled path template
///
/// Cloning is cheap: the compiled regex is reference counted internally and
/// parameter names are shared.
#[derive(Debug, Clone)]
pub struct PathPattern {
    template: String,
    regex: Regex,
    param_names: Vec<Arc<str>>,
    end: bool,
}

impl PathPattern {
    /// Compile `template` into a matcher and its ordered parameter names
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] when a parameter has no name, a custom
    /// pattern is unbalanced or contains a capturing group, or the generated
    /// regex fails to compile.
    pub fn compile(template: &str, options: PatternOptions) -> Result<Self, PatternError> {
        let mut pattern = String::with_capacity(template.len() * 2 + 16);
        pattern.push('^');
        let mut param_names: Vec<Arc<str>> = Vec::with_capacity(template.matches(':').count());
        let mut literal = String::new();
        let mut chars = template.char_indices().peekable();

        while let Some((offset, c)) = chars.next() {
            match c {
                '\\' => {
                    if let Some((_, escaped)) = chars.next() {
                        literal.push(escaped);
                    }
                }
                ':' => {
                    let name = read_name(&mut chars);
                    if name.is_empty() {
                        return Err(PatternError::MissingParamName {
                            template: template.to_string(),
                            offset,
                        });
                    }

                    let custom = match chars.peek() {
                        Some((_, '(')) => {
                            chars.next();
                            Some(read_custom_pattern(&mut chars, template, &name)?)
                        }
                        _ => None,
                    };

                    let optional = matches!(chars.peek(), Some((_, '?')));
                    if optional {
                        chars.next();
                    }

                    // An optional parameter swallows the slash in front of it
                    let leading_slash = optional && literal.ends_with('/');
                    if leading_slash {
                        literal.pop();
                    }
                    pattern.push_str(&regex::escape(&literal));
                    literal.clear();

                    let body = custom.as_deref().unwrap_or(DEFAULT_PARAM_PATTERN);
                    match (optional, leading_slash) {
                        (true, true) => {
                            pattern.push_str("(?:/(");
                            pattern.push_str(body);
                            pattern.push_str("))?");
                        }
                        (true, false) => {
                            pattern.push('(');
                            pattern.push_str(body);
                            pattern.push_str(")?");
                        }
                        (false, _) => {
                            pattern.push('(');
                            pattern.push_str(body);
                            pattern.push(')');
                        }
                    }
                    param_names.push(Arc::from(name));
                }
                _ => literal.push(c),
            }
        }

        pattern.push_str(&regex::escape(&literal));
        pattern.push_str(if options.end { EXACT_TAIL } else { PREFIX_TAIL });

        let regex = Regex::new(&pattern).map_err(|e| PatternError::InvalidRegex {
            template: template.to_string(),
            message: e.to_string(),
        })?;

        if regex.captures_len() != param_names.len() + 1 {
            return Err(PatternError::InvalidRegex {
                template: template.to_string(),
                message: format!(
                    "expected {} capture groups, found {}",
                    param_names.len(),
                    regex.captures_len() - 1
                ),
            });
        }

        Ok(Self {
            template: template.to_string(),
            regex,
            param_names,
            end: options.end,
        })
    }

    /// The template this pattern was compiled from
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Whether the pattern is anchored at the end of the path
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.end
    }

    /// The generated regex source, for diagnostics
    #[must_use]
    pub fn as_regex_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Parameter names in capture-group order
    #[must_use]
    pub fn param_names(&self) -> &[Arc<str>] {
        &self.param_names
    }

    /// Test whether `path` matches
    #[inline]
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Extract parameters from `path`, or `None` if it does not match
    ///
    /// Optional parameters that did not take part in the match are omitted.
    #[must_use]
    pub fn extract(&self, path: &str) -> Option<Params> {
        let captures = self.regex.captures(path)?;
        let mut params = Params::new();
        for (i, name) in self.param_names.iter().enumerate() {
            if let Some(m) = captures.get(i + 1) {
                params.insert(Arc::clone(name), m.as_str().to_string());
            }
        }
        Some(params)
    }
}

fn read_name(chars: &mut Peekable<CharIndices<'_>>) -> String {
    let mut name = String::new();
    while let Some(&(_, c)) = chars.peek() {
        if c.is_ascii_alphanumeric() || c == '_' {
            name.push(c);
            chars.next();
        } else {
            break;
        }
    }
    name
}

/// Read a custom parameter pattern up to its matching `)`.
///
/// The opening `(` has already been consumed.
fn read_custom_pattern(
    chars: &mut Peekable<CharIndices<'_>>,
    template: &str,
    name: &str,
) -> Result<String, PatternError> {
    let mut body = String::new();
    let mut depth = 1usize;
    let mut in_class = false;

    while let Some((_, c)) = chars.next() {
        match c {
            '\\' => {
                body.push(c);
                if let Some((_, escaped)) = chars.next() {
                    body.push(escaped);
                }
                continue;
            }
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            '(' if !in_class => depth += 1,
            ')' if !in_class => {
                depth -= 1;
                if depth == 0 {
                    let group = Regex::new(&body).map_err(|e| PatternError::InvalidRegex {
                        template: template.to_string(),
                        message: e.to_string(),
                    })?;
                    if group.captures_len() > 1 {
                        return Err(PatternError::CapturingGroup {
                            name: name.to_string(),
                        });
                    }
                    return Ok(body);
                }
            }
            _ => {}
        }
        body.push(c);
    }

    Err(PatternError::UnbalancedPattern {
        template: template.to_string(),
        name: name.to_string(),
    })
}
