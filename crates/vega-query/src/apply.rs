//! Attribute / style application
//!
//! Configuration mappings are `serde_json` objects; keys are applied in
//! insertion order and values are stringified the way a script engine
//! would before they reach the host.

use serde_json::{Number, Value};

use crate::host::{HostElement, HostError};

/// Apply `attributes` to `element`.
///
/// Every key becomes a null-namespace attribute, except `style` with an
/// object value on an element that has inline style: that one is applied
/// property by property through [`set_styles`]. A non-object mapping
/// applies nothing.
pub fn set_attributes<E: HostElement>(element: &E, attributes: &Value) -> Result<(), HostError<E>> {
    let Some(attributes) = attributes.as_object() else {
        return Ok(());
    };

    for (key, value) in attributes {
        if key == "style" && is_object(value) && element.has_style() {
            set_styles(element, value)?;
            continue;
        }
        element.set_attribute_ns(None, key, &to_js_string(value))?;
    }
    Ok(())
}

/// Assign each entry of `styles` onto the element's inline style
pub fn set_styles<E: HostElement>(element: &E, styles: &Value) -> Result<(), HostError<E>> {
    let Some(styles) = styles.as_object() else {
        return Ok(());
    };

    for (property, value) in styles {
        element.set_style(property, value)?;
    }
    Ok(())
}

/// `typeof value === "object"`: objects, arrays and null
fn is_object(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_) | Value::Null)
}

/// Script `ToString` of a JSON value
pub fn to_js_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_to_js_string(n),
        Value::String(s) => s.clone(),
        // Array.prototype.join renders null elements as empty strings
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => to_js_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn number_to_js_string(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }

    let Some(f) = n.as_f64() else {
        return n.to_string();
    };
    if f == 0.0 {
        return "0".to_string();
    }
    if (1e-6..1e21).contains(&f.abs()) {
        return format!("{f}");
    }

    // Exponent form, with an explicit sign on positive exponents
    let s = format!("{f:e}");
    match s.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => s,
    }
}
