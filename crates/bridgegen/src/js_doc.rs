//! JSDoc parsing
//!
//! Extracts the pieces of a doc comment that end up in generated bindings:
//! the description, `@param` docs by name, `@returns`, `@example` blocks and
//! `@deprecated` notices. Other tags are kept as [`JsDocTag::Unknown`] so
//! nothing is silently lost.

use serde::Serialize;

/// Parsed JSDoc documentation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDoc {
    /// Main description text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Parsed JSDoc tags
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<JsDocTag>,
}

impl ApiDoc {
    /// Parse JSDoc from a comment string
    ///
    /// Accepts the raw comment text as SWC hands it over (`* line\n * line`)
    /// as well as the full `/** ... */` form.
    pub fn parse(comment: &str) -> Self {
        let cleaned = clean_jsdoc_comment(comment);
        let description = extract_description(&cleaned);
        let tags = parse_tags(&cleaned);

        Self { description, tags }
    }

    /// Parse an optional comment, yielding an empty doc for `None`
    pub fn parse_opt(comment: Option<&str>) -> Self {
        comment.map(Self::parse).unwrap_or_default()
    }

    /// Check if this doc is empty
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.tags.is_empty()
    }

    /// Get the main description
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Description, or the body of an explicit `@description` tag
    pub fn summary(&self) -> Option<&str> {
        self.description().or_else(|| {
            self.tags.iter().find_map(|t| match t {
                JsDocTag::Unknown { tag, value } if tag == "description" && !value.is_empty() => {
                    Some(value.as_str())
                }
                _ => None,
            })
        })
    }

    /// Get param doc by name
    pub fn param_doc(&self, name: &str) -> Option<&str> {
        self.tags.iter().find_map(|t| match t {
            JsDocTag::Param { name: n, doc, .. } if n == name => doc.as_deref(),
            _ => None,
        })
    }

    /// Get the @returns text
    pub fn returns_doc(&self) -> Option<&str> {
        self.tags.iter().find_map(|t| match t {
            JsDocTag::Returns { doc, .. } => doc.as_deref(),
            _ => None,
        })
    }

    /// Get all @example bodies
    pub fn examples(&self) -> Vec<String> {
        self.tags
            .iter()
            .filter_map(|t| match t {
                JsDocTag::Example { doc } => Some(doc.clone()),
                _ => None,
            })
            .collect()
    }

    /// Check if deprecated
    pub fn is_deprecated(&self) -> bool {
        self.tags
            .iter()
            .any(|t| matches!(t, JsDocTag::Deprecated { .. }))
    }

    /// Deprecation message, if the tag carries one
    pub fn deprecated_message(&self) -> Option<&str> {
        self.tags.iter().find_map(|t| match t {
            JsDocTag::Deprecated { doc } => doc.as_deref(),
            _ => None,
        })
    }
}

/// JSDoc tag types
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum JsDocTag {
    /// @param {type} name - description
    #[serde(rename_all = "camelCase")]
    Param {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        type_ref: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        doc: Option<String>,
        optional: bool,
    },

    /// @returns {type} description
    #[serde(rename_all = "camelCase")]
    Returns {
        #[serde(skip_serializing_if = "Option::is_none")]
        type_ref: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        doc: Option<String>,
    },

    /// @example
    Example { doc: String },

    /// @deprecated message
    Deprecated {
        #[serde(skip_serializing_if = "Option::is_none")]
        doc: Option<String>,
    },

    /// Unknown/custom tag
    Unknown { tag: String, value: String },
}

/// Clean JSDoc comment by removing delimiters and leading stars
fn clean_jsdoc_comment(comment: &str) -> String {
    let mut lines = Vec::new();

    for line in comment.lines() {
        let mut content = line.trim();

        if content == "/**" || content == "*/" {
            continue;
        }
        if let Some(rest) = content.strip_prefix("/**") {
            content = rest.trim_start();
        }
        if let Some(rest) = content.strip_prefix("* ") {
            content = rest;
        } else if let Some(rest) = content.strip_prefix('*') {
            content = rest;
        }
        if let Some(rest) = content.strip_suffix("*/") {
            content = rest.trim_end();
        }

        lines.push(content);
    }

    // Keep blank lines inside examples, drop them at the edges
    lines.join("\n").trim().to_string()
}

/// Extract description text before the first tag
fn extract_description(text: &str) -> Option<String> {
    if text.starts_with('@') {
        return None;
    }
    let desc = match text.find("\n@") {
        Some(pos) => &text[..pos],
        None => text,
    };

    let trimmed = desc.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parse all JSDoc tags from the comment
fn parse_tags(text: &str) -> Vec<JsDocTag> {
    let mut tags = Vec::new();
    let mut current_tag: Option<(String, String)> = None;

    for line in text.lines() {
        let trimmed = line.trim();

        if let Some(after_at) = trimmed.strip_prefix('@') {
            if let Some((tag_name, content)) = current_tag.take() {
                tags.push(parse_single_tag(&tag_name, &content));
            }

            current_tag = Some(match after_at.find(char::is_whitespace) {
                Some(pos) => (
                    after_at[..pos].to_string(),
                    after_at[pos..].trim().to_string(),
                ),
                None => (after_at.to_string(), String::new()),
            });
        } else if let Some((ref tag_name, ref mut content)) = current_tag {
            if !content.is_empty() {
                content.push('\n');
            }
            // Examples keep their indentation
            if tag_name == "example" {
                content.push_str(line.trim_end());
            } else {
                content.push_str(trimmed);
            }
        }
    }

    if let Some((tag_name, content)) = current_tag {
        tags.push(parse_single_tag(&tag_name, &content));
    }

    tags
}

/// Parse a single JSDoc tag
fn parse_single_tag(tag_name: &str, content: &str) -> JsDocTag {
    let content = content.trim();

    match tag_name {
        "param" | "arg" | "argument" => parse_param_tag(content),
        "returns" | "return" => parse_returns_tag(content),
        "example" => JsDocTag::Example {
            doc: strip_code_fence(content),
        },
        "deprecated" => JsDocTag::Deprecated {
            doc: non_empty(content),
        },
        _ => JsDocTag::Unknown {
            tag: tag_name.to_string(),
            value: content.to_string(),
        },
    }
}

/// Parse @param tag content
fn parse_param_tag(content: &str) -> JsDocTag {
    let (type_ref, rest) = extract_type_and_rest(content);

    let (name, optional, doc) = if let Some(inner) = rest.strip_prefix('[') {
        match inner.find(']') {
            Some(end) => {
                // [name=default]; the default itself is not carried over
                let name = inner[..end].split('=').next().unwrap_or("").trim();
                (name.to_string(), true, extract_doc_after_name(&inner[end + 1..]))
            }
            None => (rest.to_string(), false, None),
        }
    } else {
        let (name, doc) = split_name_and_doc(rest);
        (name, false, doc)
    };

    JsDocTag::Param {
        name,
        type_ref,
        doc,
        optional,
    }
}

/// Parse @returns tag content
fn parse_returns_tag(content: &str) -> JsDocTag {
    let (type_ref, rest) = extract_type_and_rest(content);
    JsDocTag::Returns {
        type_ref,
        doc: non_empty(rest.trim_start_matches('-').trim()),
    }
}

/// Extract type from {type} at start of content
fn extract_type_and_rest(content: &str) -> (Option<String>, &str) {
    if content.starts_with('{') {
        if let Some(close_pos) = find_matching_brace(content) {
            let type_str = &content[1..close_pos];
            let rest = content[close_pos + 1..].trim();
            return (Some(type_str.to_string()), rest);
        }
    }
    (None, content)
}

/// Find matching closing brace, handling nested braces
fn find_matching_brace(s: &str) -> Option<usize> {
    let mut depth = 0;
    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split "name - description" or "name description"
fn split_name_and_doc(s: &str) -> (String, Option<String>) {
    let s = s.trim();

    if let Some(dash_pos) = s.find(" - ") {
        let name = s[..dash_pos].trim().to_string();
        return (name, non_empty(s[dash_pos + 3..].trim()));
    }

    match s.find(char::is_whitespace) {
        Some(space_pos) => (
            s[..space_pos].to_string(),
            non_empty(s[space_pos..].trim()),
        ),
        None => (s.to_string(), None),
    }
}

/// Extract description after parameter name
fn extract_doc_after_name(s: &str) -> Option<String> {
    non_empty(s.trim().trim_start_matches('-').trim())
}

/// Drop a surrounding markdown code fence from example bodies
fn strip_code_fence(content: &str) -> String {
    let mut lines: Vec<&str> = content.lines().collect();
    if lines.first().is_some_and(|l| l.trim_start().starts_with("```")) {
        lines.remove(0);
        if lines.last().is_some_and(|l| l.trim() == "```") {
            lines.pop();
        }
    }
    lines.join("\n")
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
