//! Numeral normalization for extracted heading numbers.

/// Map Arabic-Indic and Extended Arabic-Indic digits to ASCII.
///
/// # Examples
/// ```
/// use qanun_structure::patterns::ascii_digits;
///
/// assert_eq!(ascii_digits("١٢"), "12");
/// assert_eq!(ascii_digits("۳"), "3");
/// assert_eq!(ascii_digits("7"), "7");
/// ```
#[must_use]
pub fn ascii_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{0660}'..='\u{0669}' => char::from(b'0' + (c as u32 - 0x0660) as u8),
            '\u{06F0}'..='\u{06F9}' => char::from(b'0' + (c as u32 - 0x06F0) as u8),
            other => other,
        })
        .collect()
}

/// Convert an uppercase Roman numeral to its value.
#[must_use]
pub fn roman_to_decimal(text: &str) -> Option<u32> {
    let value_of = |c: char| match c {
        'I' => Some(1),
        'V' => Some(5),
        'X' => Some(10),
        'L' => Some(50),
        'C' => Some(100),
        'D' => Some(500),
        'M' => Some(1000),
        _ => None,
    };

    let values: Option<Vec<u32>> = text.chars().map(value_of).collect();
    let values = values?;
    if values.is_empty() {
        return None;
    }

    // Right to left: a symbol smaller than the largest seen so far subtracts.
    let mut result = 0i64;
    let mut largest = 0u32;
    for v in values.iter().rev() {
        if *v < largest {
            result -= i64::from(*v);
        } else {
            result += i64::from(*v);
            largest = *v;
        }
    }
    u32::try_from(result).ok().filter(|r| *r > 0)
}

/// Normalize a captured numeral: ASCII digits, no leading zeros, Roman
/// numerals converted. Returns `None` for text that is not a numeral.
///
/// # Examples
/// ```
/// use qanun_structure::patterns::normalize_numeral;
///
/// assert_eq!(normalize_numeral("٠٧").as_deref(), Some("7"));
/// assert_eq!(normalize_numeral("XIV").as_deref(), Some("14"));
/// assert_eq!(normalize_numeral("abc"), None);
/// ```
#[must_use]
pub fn normalize_numeral(text: &str) -> Option<String> {
    let ascii = ascii_digits(text.trim());
    if ascii.is_empty() {
        return None;
    }
    if ascii.chars().all(|c| c.is_ascii_digit()) {
        let trimmed = ascii.trim_start_matches('0');
        return Some(if trimmed.is_empty() { "0" } else { trimmed }.to_string());
    }
    roman_to_decimal(&ascii).map(|v| v.to_string())
}
