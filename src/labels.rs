//! Block/flat label handling.
//!
//! Mapping files, spreadsheet cells and payee names all spell flats
//! differently ("b-402", "B0402", "B 402"). Everything is folded into the
//! canonical `"B 402"` form before comparison.

use std::sync::OnceLock;

use regex::Regex;

fn label_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"([A-Z])0*([0-9]{1,3})").expect("static label pattern"))
}

/// Return `value` in the canonical `"<LETTER> <NNN>"` form.
///
/// Text without a letter followed by digits is returned trimmed and
/// uppercased; empty input yields an empty string.
pub fn normalize_label(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    let cleaned: String = value
        .to_uppercase()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    let Some(caps) = label_pattern().captures(&cleaned) else {
        return value.trim().to_uppercase();
    };
    let block = &caps[1];
    match caps[2].parse::<u32>() {
        Ok(number) => format!("{block} {number:03}"),
        Err(_) => value.trim().to_uppercase(),
    }
}

/// Build a label from the text of a Block cell and a Flat cell.
///
/// Numeric flats (including the `402.0` that numeric cells render as) are
/// truncated to an integer and zero padded; anything else goes through
/// [`normalize_label`].
pub fn label_from_cells(block: &str, flat: &str) -> Option<String> {
    let block = block.trim().to_uppercase();
    let flat = flat.trim();
    if block.is_empty() || flat.is_empty() {
        return None;
    }
    let numeric = flat.strip_suffix(".0").unwrap_or(flat);
    if let Some(number) = numeric
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
    {
        return Some(format!("{block} {:03}", number.trunc() as i64));
    }
    let label = normalize_label(&format!("{block} {flat}"));
    if label.is_empty() {
        None
    } else {
        Some(label)
    }
}

/// Fold free text into a comparison key: lowercase ASCII letters and digits
/// separated by single spaces.
pub fn match_key(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                ' '
            }
        })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_label_variants() {
        assert_eq!(normalize_label("b-402"), "B 402");
        assert_eq!(normalize_label("B 402"), "B 402");
        assert_eq!(normalize_label("B0402"), "B 402");
        assert_eq!(normalize_label("  a 2 "), "A 002");
        assert_eq!(normalize_label("Flat A-05"), "A 005");
    }

    #[test]
    fn test_normalize_label_without_pattern() {
        assert_eq!(normalize_label(""), "");
        assert_eq!(normalize_label("  shop "), "SHOP");
        assert_eq!(normalize_label("123"), "123");
    }

    #[test]
    fn test_normalize_label_is_idempotent() {
        for raw in ["b-402", "B0402", "shop front", "x", "A-1-2", "  c 9 "] {
            let once = normalize_label(raw);
            assert_eq!(normalize_label(&once), once, "input {raw:?}");
        }
    }

    #[test]
    fn test_label_from_cells_numeric_flat() {
        assert_eq!(label_from_cells("b", "402"), Some("B 402".to_string()));
        assert_eq!(label_from_cells("A", "5.0"), Some("A 005".to_string()));
        assert_eq!(label_from_cells(" A ", "101.7"), Some("A 101".to_string()));
    }

    #[test]
    fn test_label_from_cells_text_flat() {
        assert_eq!(label_from_cells("B", "0402"), Some("B 402".to_string()));
        assert_eq!(label_from_cells("B", "-402"), Some("B -402".to_string()));
        assert_eq!(label_from_cells("Shop", "front"), Some("SHOP FRONT".to_string()));
    }

    #[test]
    fn test_label_from_cells_missing_cell() {
        assert_eq!(label_from_cells("", "402"), None);
        assert_eq!(label_from_cells("B", "  "), None);
    }

    #[test]
    fn test_match_key() {
        assert_eq!(match_key("  John  O'Neil "), "john o neil");
        assert_eq!(match_key("Water-Bill (Jan)"), "water bill jan");
        assert_eq!(match_key("Collection Summary"), "collection summary");
        assert_eq!(match_key("--"), "");
    }
}
