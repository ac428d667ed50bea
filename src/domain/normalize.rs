//! Query cleanup applied before an address is sent to the geocoder.
//!
//! The transform is lossy and best-effort. It only ever replaces a character
//! with something no longer than itself (or drops it), so the output is never
//! longer than the input, and running it twice gives the same string as
//! running it once. The batch driver relies on the latter to deduplicate on
//! normalized strings.

use unicode_normalization::char::{decompose_canonical, is_combining_mark};

/// Symbols that break address parsing on the provider side, e.g. "#" in
/// front of a unit number.
const STRIPPED_SYMBOLS: &[char] = &['#'];

/// Latin letters with no canonical decomposition.
const LETTER_FOLDS: &[(char, char)] = &[
    ('ø', 'o'),
    ('Ø', 'O'),
    ('đ', 'd'),
    ('Đ', 'D'),
    ('ł', 'l'),
    ('Ł', 'L'),
    ('ı', 'i'),
    ('ħ', 'h'),
    ('Ħ', 'H'),
];

/// Normalize a free-text address for lookup.
///
/// - accented Latin letters fold to their ASCII base (`á` → `a`)
/// - `#` is removed
/// - control characters and Unicode whitespace collapse to single spaces
/// - other scripts pass through untouched
///
/// ```
/// use country_etl::domain::normalize::normalize_address;
///
/// assert_eq!(
///     normalize_address("Cra. 13 #8525 BogotáColombia"),
///     "Cra. 13 8525 BogotaColombia"
/// );
/// ```
pub fn normalize_address(input: &str) -> String {
    let mut folded = String::with_capacity(input.len());

    for c in input.chars() {
        if c.is_whitespace() || c.is_control() {
            folded.push(' ');
        } else if c.is_ascii() {
            if !STRIPPED_SYMBOLS.contains(&c) {
                folded.push(c);
            }
        } else if is_combining_mark(c) {
            // 拉丁字母後的附加符號直接丟棄；其他文字（如天城文母音符號）保留
            if let Some(prev) = folded.chars().next_back() {
                if !prev.is_ascii() {
                    folded.push(c);
                }
            }
        } else {
            folded.push(fold_to_ascii(c).unwrap_or(c));
        }
    }

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// ASCII base letter of `c`, if it is a Latin letter plus diacritics.
fn fold_to_ascii(c: char) -> Option<char> {
    let mut base = None;
    let mut single_ascii_base = true;

    decompose_canonical(c, |d| {
        if is_combining_mark(d) {
            return;
        }
        if base.is_none() && d.is_ascii() {
            base = Some(d);
        } else {
            single_ascii_base = false;
        }
    });

    match base {
        Some(b) if single_ascii_base => Some(b),
        _ => LETTER_FOLDS
            .iter()
            .find(|(from, _)| *from == c)
            .map(|(_, to)| *to),
    }
}
