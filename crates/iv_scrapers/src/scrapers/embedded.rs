use scraper::{Html, Selector};
use serde_json::Value;

/// Extracts the JSON object assigned to `marker` (e.g. `window.__INITIAL_STATE__`)
/// inside an inline `<script>`. Trailing statements after the object are ignored
/// and bare `undefined` values are read as `null`.
pub fn extract_script_state(html: &str, marker: &str) -> Option<Value> {
    let document = Html::parse_document(html);
    let script_selector = Selector::parse("script").ok()?;

    document.select(&script_selector).find_map(|script| {
        let text = script.text().collect::<String>();
        let start = text.find(marker)? + marker.len();
        let assignment = text[start..].trim_start().strip_prefix('=')?;
        let json = undefined_to_null(assignment.trim_start());
        serde_json::Deserializer::from_str(&json)
            .into_iter::<Value>()
            .next()?
            .ok()
    })
}

/// Rewrites bare `undefined` literals to `null`, leaving string contents untouched.
fn undefined_to_null(source: &str) -> String {
    const UNDEFINED: &str = "undefined";
    let is_ident = |c: char| c.is_alphanumeric() || c == '_' || c == '$';

    let mut out = String::with_capacity(source.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut prev: Option<char> = None;
    let mut chars = source.char_indices();

    while let Some((i, c)) = chars.next() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        } else if source[i..].starts_with(UNDEFINED)
            && !prev.is_some_and(is_ident)
            && !source[i + UNDEFINED.len()..].chars().next().is_some_and(is_ident)
        {
            out.push_str("null");
            chars.nth(UNDEFINED.len() - 2);
            prev = Some('l');
            continue;
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

/// String at `path`, or a number rendered as text.
pub fn str_at(value: &Value, path: &[&str]) -> Option<String> {
    let mut current = value;
    for key in path {
        current = current.get(key)?;
    }
    match current {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
