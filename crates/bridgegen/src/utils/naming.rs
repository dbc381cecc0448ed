//! Identifier and type-name normalization
//!
//! Clean names are the dedup key for collected types, so every place that
//! names a type goes through these helpers.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Compiler-generated `$1` style suffixes on anonymous symbols
    static ref DOLLAR_SUFFIX: Regex = Regex::new(r"\$\d+").unwrap();

    /// Trailing `$1` only
    static ref DOLLAR_SUFFIX_END: Regex = Regex::new(r"\$\d+$").unwrap();

    /// Punctuation that can leak into type names from raw text
    static ref NAME_PUNCT: Regex = Regex::new(r#"["'{}(),|$<>;\[\]]"#).unwrap();

    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();

    /// Markdown bullet at the start of a line or after a newline
    static ref BULLET: Regex = Regex::new(r"(^|\n)\s*- ").unwrap();
}

/// C# reserved words that cannot be used as identifiers
const CSHARP_KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

/// Whether a name is a C# reserved word
pub fn is_csharp_keyword(name: &str) -> bool {
    CSHARP_KEYWORDS.contains(&name)
}

/// Append `Param` to reserved words
pub fn escape_csharp_keyword(name: &str) -> String {
    if is_csharp_keyword(name) {
        format!("{}Param", name)
    } else {
        name.to_string()
    }
}

/// Uppercase the first character
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// PascalCase for identifiers that are already camelCase
///
/// Separators (`-`, `_`, spaces) start a new word; otherwise only the first
/// character changes.
pub fn to_pascal_case(s: &str) -> String {
    if !s.contains(['-', '_', ' ']) {
        return capitalize(s);
    }
    s.split(['-', '_', ' '])
        .filter(|part| !part.is_empty())
        .map(capitalize)
        .collect()
}

/// Strip a trailing `$N` suffix
pub fn clean_type_name(name: &str) -> String {
    DOLLAR_SUFFIX_END.replace(name, "").into_owned()
}

/// Dedup key for a type name
///
/// Takes the last dotted segment, the first `|` alternative, then removes
/// punctuation, `$N` suffixes, whitespace and hyphens.
pub fn extract_clean_name(name: &str) -> String {
    let last = name.rsplit('.').next().unwrap_or(name);
    let first_alt = last.split('|').next().unwrap_or(last);
    let without_suffix = DOLLAR_SUFFIX.replace_all(first_alt, "");
    let stripped = NAME_PUNCT.replace_all(&without_suffix, "");
    WHITESPACE
        .replace_all(&stripped, "")
        .replace('-', "")
}

/// Naive singular for collection property names (`items` -> `item`)
pub fn singularize(name: &str) -> String {
    match name.strip_suffix('s') {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => name.to_string(),
    }
}

/// Remove one pair of surrounding quotes or backticks
pub fn strip_quotes(s: &str) -> String {
    let s = s.trim();
    for q in ['"', '\'', '`'] {
        if s.len() >= 2 && s.starts_with(q) && s.ends_with(q) {
            return s[1..s.len() - 1].to_string();
        }
    }
    s.to_string()
}

/// Collapse runs of whitespace into single spaces
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").into_owned()
}

/// Make doc text safe for XML doc comments
pub fn xml_safe(text: &str) -> String {
    let no_bullets = BULLET.replace_all(text, "$1");
    let no_ticks = no_bullets.replace('`', "");
    collapse_whitespace(&no_ticks)
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Identifier for a string enum value (`"portrait-primary"` -> `PortraitPrimary`)
pub fn enum_member_identifier(value: &str) -> String {
    let ident: String = value
        .split(['-', ' ', '.', '/', ':'])
        .map(capitalize)
        .collect::<String>()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    match ident.chars().next() {
        None => "_".to_string(),
        Some(c) if c.is_ascii_digit() => format!("_{}", ident),
        Some(_) => ident,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_escape() {
        assert_eq!(escape_csharp_keyword("event"), "eventParam");
        assert_eq!(escape_csharp_keyword("options"), "options");
    }

    #[test]
    fn test_pascal_case() {
        assert_eq!(to_pascal_case("getUserKeyForGame"), "GetUserKeyForGame");
        assert_eq!(to_pascal_case("portrait-primary"), "PortraitPrimary");
        assert_eq!(to_pascal_case("app_login"), "AppLogin");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_clean_names() {
        assert_eq!(clean_type_name("Options$1"), "Options");
        assert_eq!(
            extract_clean_name("import(\"./x\").SafeAreaInsets"),
            "SafeAreaInsets"
        );
        assert_eq!(extract_clean_name("Location | undefined"), "Location");
        assert_eq!(extract_clean_name("__type$12"), "__type");
        assert_eq!(extract_clean_name("some-name"), "somename");
    }

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("products"), "product");
        assert_eq!(singularize("s"), "s");
        assert_eq!(singularize("data"), "data");
    }

    #[test]
    fn test_xml_safe() {
        assert_eq!(
            xml_safe("Returns `a < b`\n- first\n- second & more"),
            "Returns a &lt; b first second &amp; more"
        );
    }

    #[test]
    fn test_enum_member_identifier() {
        assert_eq!(enum_member_identifier("portrait"), "Portrait");
        assert_eq!(enum_member_identifier("4g"), "_4g");
        assert_eq!(enum_member_identifier("NOT_AVAILABLE"), "NOT_AVAILABLE");
        assert_eq!(enum_member_identifier("portrait-primary"), "PortraitPrimary");
    }
}
