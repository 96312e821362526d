//! Inline Style Declarations
//!
//! The `style` attribute and the element's declaration list are kept in
//! sync: writing a property re-serializes the attribute, writing the
//! attribute re-parses the declarations.

/// Single `name: value` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Property name in CSS (kebab-case) form
    pub name: String,
    pub value: String,
    pub important: bool,
}

/// Map a CSSOM property name to its CSS property name.
///
/// Accepts both the IDL attribute spelling used for property assignment
/// (`textDecoration`, `cssFloat`, `webkitTransform`) and the CSS spelling
/// (`text-decoration`). Custom properties (`--x`) are kept verbatim.
pub fn property_name(name: &str) -> String {
    if name.starts_with("--") {
        return name.to_string();
    }
    if name == "cssFloat" {
        return "float".to_string();
    }
    if name.contains('-') {
        return name.to_ascii_lowercase();
    }

    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    if out.starts_with("webkit-") {
        out.insert(0, '-');
    }
    out
}

/// Parse a `style` attribute into declarations
pub fn parse_declarations(style: &str) -> Vec<Declaration> {
    let mut decls = Vec::new();
    for decl in split_top_level(style, ';') {
        let decl = decl.trim();
        if decl.is_empty() {
            continue;
        }

        let Some((name, value)) = decl.split_once(':') else {
            continue;
        };
        let name = name.trim();
        let mut value = value.trim();
        if name.is_empty() || value.is_empty() {
            continue;
        }

        let mut important = false;
        if let Some(stripped) = strip_important(value) {
            value = stripped;
            important = true;
        }

        let name = if name.starts_with("--") {
            name.to_string()
        } else {
            name.to_ascii_lowercase()
        };
        set_declaration(&mut decls, &name, value, important);
    }
    decls
}

/// Serialize declarations the way `CSSStyleDeclaration.cssText` does
pub fn serialize_declarations(decls: &[Declaration]) -> String {
    decls
        .iter()
        .map(|d| {
            if d.important {
                format!("{}: {} !important;", d.name, d.value)
            } else {
                format!("{}: {};", d.name, d.value)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Set or clear a declaration. An empty value removes the property.
pub(crate) fn set_declaration(decls: &mut Vec<Declaration>, name: &str, value: &str, important: bool) {
    let value = value.trim();
    if value.is_empty() {
        remove_declaration(decls, name);
        return;
    }

    match decls.iter_mut().find(|d| d.name == name) {
        Some(decl) => {
            decl.value = value.to_string();
            decl.important = important;
        }
        None => decls.push(Declaration {
            name: name.to_string(),
            value: value.to_string(),
            important,
        }),
    }
}

/// Whether `value` fits in a single declaration on its own.
///
/// Rejects a top-level `;`, unbalanced quotes or parentheses, and an
/// `!important` suffix (priority is passed separately).
pub(crate) fn is_valid_value(value: &str) -> bool {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in value.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' => quote = Some(c),
                '(' => depth += 1,
                ')' if depth == 0 => return false,
                ')' => depth -= 1,
                ';' if depth == 0 => return false,
                _ => {}
            },
        }
    }
    quote.is_none() && depth == 0 && strip_important(value).is_none()
}

/// Remove a declaration, returning its old value
pub(crate) fn remove_declaration(decls: &mut Vec<Declaration>, name: &str) -> Option<String> {
    let index = decls.iter().position(|d| d.name == name)?;
    Some(decls.remove(index).value)
}

fn strip_important(value: &str) -> Option<&str> {
    let lower = value.to_ascii_lowercase();
    let bang = lower.rfind('!')?;
    if lower[bang + 1..].trim() == "important" {
        Some(value[..bang].trim_end())
    } else {
        None
    }
}

/// Split on `sep` outside of quotes and parentheses (`url(a;b)` stays whole)
fn split_top_level(input: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' => quote = Some(c),
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                c if c == sep && depth == 0 => {
                    parts.push(&input[start..i]);
                    start = i + c.len_utf8();
                }
                _ => {}
            },
        }
    }
    parts.push(&input[start..]);
    parts
}
