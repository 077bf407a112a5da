//! Turns model output into raw suggestions.
//!
//! The model is asked for a bare JSON array but regularly wraps it in code
//! fences or a sentence of prose. Anything that still cannot be read as an
//! array comes back as a [`ParseFailure`]; nothing here panics or propagates
//! a serde error. Individual fields are sanitized one by one so a single
//! wrongly-typed field never discards a whole suggestion.

use serde_json::{Map, Value};
use tandcode_core::RawSuggestion;
use tandcode_core::tooth::is_valid_fdi;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("no JSON array found in model output")]
    NoJson,
    #[error("model output is JSON but not an array")]
    NotAnArray,
    #[error("malformed JSON array: {0}")]
    Malformed(String),
}

/// Parse model output into raw suggestions. An empty array means "nothing
/// detected" and is a success.
pub fn parse(text: &str) -> Result<Vec<RawSuggestion>, ParseFailure> {
    let text = text.trim();
    let body = strip_fences(text);

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(items)) => return Ok(sanitize_all(items)),
        Ok(_) => return Err(ParseFailure::NotAnArray),
        Err(_) => {}
    }

    // Prose or a stray fence around the array: take the outermost brackets.
    let (Some(start), Some(end)) = (text.find('['), text.rfind(']')) else {
        return Err(ParseFailure::NoJson);
    };
    if end < start {
        return Err(ParseFailure::NoJson);
    }

    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(Value::Array(items)) => Ok(sanitize_all(items)),
        Ok(_) => Err(ParseFailure::NotAnArray),
        Err(e) => Err(ParseFailure::Malformed(e.to_string())),
    }
}

/// Remove a surrounding ```` ``` ```` / ```` ```json ```` fence, on its own
/// lines or inline.
fn strip_fences(s: &str) -> &str {
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };
    let rest = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    let rest = rest.trim_end();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn sanitize_all(items: Vec<Value>) -> Vec<RawSuggestion> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(obj) => sanitize(&obj),
            _ => None,
        })
        .collect()
}

/// Build a [`RawSuggestion`] from one array element; `None` without a code.
fn sanitize(obj: &Map<String, Value>) -> Option<RawSuggestion> {
    let code = field(obj, &["code"]).and_then(as_text)?;
    let code = code.trim().to_string();
    if code.is_empty() {
        return None;
    }

    Some(RawSuggestion {
        code,
        description: field(obj, &["description"])
            .and_then(as_text)
            .unwrap_or_default(),
        tooth_numbers: field(obj, &["tooth_numbers", "toothNumbers", "teeth"])
            .map(tooth_list)
            .unwrap_or_default(),
        surfaces: field(obj, &["surfaces"])
            .and_then(as_text)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        canals: field(obj, &["canals"])
            .and_then(as_number)
            .and_then(|n| u8::try_from(n).ok())
            .filter(|&n| n > 0),
        quantity: field(obj, &["quantity"])
            .and_then(as_number)
            .and_then(|n| u32::try_from(n).ok())
            .filter(|&n| n >= 1)
            .unwrap_or(1),
        reasoning: field(obj, &["reasoning"])
            .and_then(as_text)
            .unwrap_or_default(),
        is_companion: field(obj, &["is_companion", "isCompanion"])
            .map(as_flag)
            .unwrap_or(false),
    })
}

fn field<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|n| obj.get(*n)).filter(|v| !v.is_null())
}

fn as_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Non-negative integer from a JSON number or numeric string.
fn as_number(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_flag(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Valid FDI numbers from an array (or a lone value), deduplicated in order.
fn tooth_list(v: &Value) -> Vec<u8> {
    let values: Vec<&Value> = match v {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    let mut teeth = Vec::new();
    for t in values
        .into_iter()
        .filter_map(as_number)
        .filter_map(|n| u8::try_from(n).ok())
        .filter(|&n| is_valid_fdi(n))
    {
        if !teeth.contains(&t) {
            teeth.push(t);
        }
    }
    teeth
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_array() {
        let out = parse(
            r#"[{"code":"V93","description":"Drievlaks composiet","tooth_numbers":[36],
                "surfaces":"MOD","quantity":1,"reasoning":"comp MOD","is_companion":false}]"#,
        )
        .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].code, "V93");
        assert_eq!(out[0].tooth_numbers, vec![36]);
        assert_eq!(out[0].surfaces.as_deref(), Some("MOD"));
        assert_eq!(out[0].quantity, 1);
        assert!(!out[0].is_companion);
    }

    #[test]
    fn empty_array_is_success() {
        assert_eq!(parse("[]").unwrap(), vec![]);
        assert_eq!(parse("  []\n").unwrap(), vec![]);
    }

    #[test]
    fn strips_code_fences() {
        let out = parse("```json\n[{\"code\":\"E16\",\"tooth_numbers\":[36]}]\n```").unwrap();
        assert_eq!(out[0].code, "E16");

        let out = parse("```\n[{\"code\":\"A10\"}]\n```").unwrap();
        assert_eq!(out[0].code, "A10");
    }

    #[test]
    fn strips_inline_code_fences() {
        let out = parse("```json [{\"code\":\"V93\"}] ```").unwrap();
        assert_eq!(out[0].code, "V93");

        let out = parse("```[{\"code\":\"A10\"}]```").unwrap();
        assert_eq!(out[0].code, "A10");
    }

    #[test]
    fn unclosed_fence_still_parses() {
        let out = parse("```json\n[{\"code\":\"H11\",\"tooth_numbers\":[48]}]").unwrap();
        assert_eq!(out[0].code, "H11");
        assert_eq!(out[0].tooth_numbers, vec![48]);
    }

    #[test]
    fn tolerates_surrounding_prose() {
        let out = parse("Here are the codes:\n[{\"code\":\"M03\",\"quantity\":4}]\nLet me know!")
            .unwrap();
        assert_eq!(out[0].code, "M03");
        assert_eq!(out[0].quantity, 4);
    }

    #[test]
    fn plain_text_is_no_json() {
        assert_eq!(
            parse("Sorry, I could not identify a treatment."),
            Err(ParseFailure::NoJson)
        );
        assert_eq!(parse(""), Err(ParseFailure::NoJson));
    }

    #[test]
    fn object_is_not_an_array() {
        assert_eq!(
            parse(r#"{"code":"V93"}"#),
            Err(ParseFailure::NotAnArray)
        );
    }

    #[test]
    fn broken_array_is_malformed() {
        assert!(matches!(
            parse(r#"[{"code":"V93",}"#),
            Err(ParseFailure::NoJson)
        ));
        assert!(matches!(
            parse(r#"codes: [{"code": V93}]"#),
            Err(ParseFailure::Malformed(_))
        ));
    }

    #[test]
    fn camel_case_fields_accepted() {
        let out = parse(r#"[{"code":"A10","toothNumbers":[36],"isCompanion":true}]"#).unwrap();
        assert_eq!(out[0].tooth_numbers, vec![36]);
        assert!(out[0].is_companion);
    }

    #[test]
    fn sanitizes_field_types() {
        let out = parse(
            r#"[{"code":" v93 ","tooth_numbers":["36", 36, 99, 9, "x"],
                "canals":"3","quantity":0,"description":null,"is_companion":"true"}]"#,
        )
        .unwrap();
        let s = &out[0];
        assert_eq!(s.code, "v93");
        assert_eq!(s.tooth_numbers, vec![36]);
        assert_eq!(s.canals, Some(3));
        assert_eq!(s.quantity, 1);
        assert_eq!(s.description, "");
        assert!(s.is_companion);
    }

    #[test]
    fn single_tooth_number_accepted() {
        let out = parse(r#"[{"code":"H11","tooth_numbers":48}]"#).unwrap();
        assert_eq!(out[0].tooth_numbers, vec![48]);
    }

    #[test]
    fn primary_teeth_are_valid() {
        let out = parse(r#"[{"code":"H11","tooth_numbers":[55, 85, 56]}]"#).unwrap();
        assert_eq!(out[0].tooth_numbers, vec![55, 85]);
    }

    #[test]
    fn elements_without_code_are_skipped() {
        let out = parse(r#"[{"description":"no code"}, 42, "V93", {"code":""}, {"code":"X10"}]"#)
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].code, "X10");
    }

    #[test]
    fn negative_or_fractional_numbers_ignored() {
        let out = parse(r#"[{"code":"M03","quantity":-2,"canals":1.5}]"#).unwrap();
        assert_eq!(out[0].quantity, 1);
        assert_eq!(out[0].canals, None);
    }

    #[test]
    fn blank_surfaces_become_none() {
        let out = parse(r#"[{"code":"V91","surfaces":"  "}]"#).unwrap();
        assert_eq!(out[0].surfaces, None);
    }
}
