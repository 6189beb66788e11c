//! Identifier normalization.
//!
//! PetPoint emits the same animal number in several shapes depending on the
//! export: `"A0058757250"` (letter prefix), `"58757250"` (bare), a
//! zero-padded numeric (`"0058757250"`), or a float-like string
//! (`"58757250.0"`) where a spreadsheet round-trip retyped the column.
//! Every cross-file join in this crate runs on the output of
//! [`normalize_animal_id`] and nothing else; per-source ad hoc rules are
//! exactly the bug class this function exists to remove.

/// Width of a canonical animal identifier.
pub const ANIMAL_ID_WIDTH: usize = 8;

/// Width of a canonical person (caregiver) identifier.
pub const PERSON_ID_WIDTH: usize = 9;

/// Normalize a raw animal identifier to its canonical 8-digit form.
///
/// Contract:
/// - surrounding whitespace is ignored
/// - a trailing `.0`/`.00` float suffix is ignored
/// - non-digit characters (letter prefixes, embedded dashes) are ignored
/// - of the remaining digits, the last 8 are kept
/// - fewer than 8 digits are left-padded with zeros
/// - no digits at all yields `""`, a key that never joins
pub fn normalize_animal_id(raw: &str) -> String {
    normalize(raw, ANIMAL_ID_WIDTH)
}

/// Normalize a raw caregiver person identifier to its canonical 9-digit
/// form. Same contract as [`normalize_animal_id`] with a wider field:
/// `"P000111222"` and `"111222"` both normalize to `"000111222"`.
pub fn normalize_person_id(raw: &str) -> String {
    normalize(raw, PERSON_ID_WIDTH)
}

fn normalize(raw: &str, width: usize) -> String {
    let trimmed = raw.trim();

    // Drop a float-like suffix before digit extraction so "58757250.0"
    // doesn't pick up the fractional zero.
    let stem = match trimmed.split_once('.') {
        Some((head, tail)) if !tail.is_empty() && tail.bytes().all(|b| b == b'0') => head,
        _ => trimmed,
    };

    let digits: Vec<u8> = stem
        .bytes()
        .filter(|b| b.is_ascii_digit())
        .collect();

    if digits.is_empty() {
        return String::new();
    }

    let start = digits.len().saturating_sub(width);
    let tail = &digits[start..];

    let mut out = String::with_capacity(width);
    for _ in tail.len()..width {
        out.push('0');
    }
    // Bytes are ASCII digits by construction.
    out.push_str(std::str::from_utf8(tail).unwrap_or_default());
    out
}
