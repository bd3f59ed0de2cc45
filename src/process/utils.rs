use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::ColumnKind;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static FOOTNOTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(?:\d+|[a-zA-Z]{1,2}|[A-Za-z]+ \d+)\]").expect("valid regex")
});

/// 1) Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_string()
    }
}

/// 2) Collapse runs of whitespace and drop wiki footnote markers (`[a]`, `[12]`, `[note 3]`).
pub fn clean_cell_text(raw: &str) -> String {
    let without_notes = FOOTNOTE.replace_all(raw, "");
    WHITESPACE
        .replace_all(without_notes.trim(), " ")
        .into_owned()
}

/// 3) Infer a conversion for a column nobody told us about: Int if every
///    non-empty value is an integer, Float if every one is a number, else Text.
pub fn infer_kind<'a>(values: impl IntoIterator<Item = &'a str>) -> ColumnKind {
    let mut all_int = true;
    let mut all_float = true;
    let mut seen = false;

    for raw in values {
        let v = raw.trim();
        if v.is_empty() {
            continue;
        }
        seen = true;
        if v.parse::<i64>().is_err() {
            all_int = false;
        }
        if v.parse::<f64>().is_err() {
            all_float = false;
            break;
        }
    }

    match (seen, all_int, all_float) {
        (true, true, _) => ColumnKind::Int,
        (true, false, true) => ColumnKind::Float,
        _ => ColumnKind::Text,
    }
}
