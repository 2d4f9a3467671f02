//! Scalar quoting and inline list splitting.

/// Returns true if `value` cannot be written bare on a `key: value` line.
pub(crate) fn needs_quoting(value: &str) -> bool {
    value.is_empty()
        || value != value.trim()
        || value.contains([':', '#', '"', '\'', '\n', '\r'])
}

/// Writes `value`, double-quoted and escaped if it needs quoting.
pub(crate) fn quote(value: &str) -> String {
    if !needs_quoting(value) {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Strips one surrounding quote pair.
///
/// Double-quoted values are unescaped; single-quoted values are taken
/// verbatim.
pub(crate) fn unquote(value: &str) -> String {
    if value.len() >= 2 {
        if let Some(inner) = value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
            return unescape(inner);
        }
        if let Some(inner) = value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')) {
            return inner.to_string();
        }
    }
    value.to_string()
}

fn unescape(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Splits the inside of a bracketed list at top-level commas.
///
/// Commas inside quotes or `{...}` do not split.
pub(crate) fn split_flow_items(inner: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in inner.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' && q == '"' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                items.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(inner[start..].trim());
    items.retain(|item| !item.is_empty());
    items
}

/// Returns the inside of a `[...]` value, or `None` if not bracketed.
pub(crate) fn bracketed(value: &str) -> Option<&str> {
    value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn plain_values_stay_bare() {
        assert_eq!(quote("Weekly report"), "Weekly report");
        assert_eq!(quote("Note/12"), "Note/12");
    }

    #[test]
    fn special_values_are_quoted() {
        assert_eq!(quote(""), "\"\"");
        assert_eq!(quote("a: b"), "\"a: b\"");
        assert_eq!(quote("#1"), "\"#1\"");
        assert_eq!(quote(" padded"), "\" padded\"");
        assert_eq!(quote("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(quote("two\nlines"), "\"two\\nlines\"");
        assert_eq!(quote("it's"), "\"it's\"");
    }

    #[test]
    fn unquote_reverses_quote() {
        for value in ["", "a: b", "say \"hi\"", "two\nlines", "back\\slash: x", " x "] {
            assert_eq!(unquote(&quote(value)), value);
        }
    }

    #[test]
    fn single_quotes_are_verbatim() {
        assert_eq!(unquote("'a\\nb'"), "a\\nb");
        assert_eq!(unquote("'"), "'");
        assert_eq!(unquote("\""), "\"");
    }

    #[test]
    fn flow_items_respect_quotes_and_braces() {
        assert_eq!(split_flow_items("a, b ,c"), vec!["a", "b", "c"]);
        assert_eq!(split_flow_items("\"a,b\", c"), vec!["\"a,b\"", "c"]);
        assert_eq!(
            split_flow_items("{groupId: g, folderName: f}, {groupId: h, folderName: i}"),
            vec!["{groupId: g, folderName: f}", "{groupId: h, folderName: i}"]
        );
        assert!(split_flow_items("").is_empty());
    }

    #[test]
    fn bracketed_values() {
        assert_eq!(bracketed("[a, b]"), Some("a, b"));
        assert_eq!(bracketed("[ ]"), Some(""));
        assert_eq!(bracketed("a"), None);
    }

    proptest! {
        #[test]
        fn quoting_roundtrip(value in any::<String>()) {
            let written = quote(&value);
            prop_assert!(!written.contains('\n'));
            prop_assert_eq!(unquote(&written), value);
        }
    }
}
