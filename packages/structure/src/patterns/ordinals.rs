//! Spelled-out Arabic ordinals used in legal headings ("الباب الأول",
//! "المادة الحادية والعشرون").
//!
//! Covers 1 through 30 in masculine and feminine forms, plus the
//! hamza-less spellings OCR output tends to produce ("الاولى").

use super::profile::OrdinalEntry;

/// Masculine and feminine forms for 1..=9 when standing alone.
const UNITS: [(&str, &str); 9] = [
    ("الأول", "الأولى"),
    ("الثاني", "الثانية"),
    ("الثالث", "الثالثة"),
    ("الرابع", "الرابعة"),
    ("الخامس", "الخامسة"),
    ("السادس", "السادسة"),
    ("السابع", "السابعة"),
    ("الثامن", "الثامنة"),
    ("التاسع", "التاسعة"),
];

/// "First" inside compounds (11, 21) uses a different stem.
const COMPOUND_ONE: (&str, &str) = ("الحادي", "الحادية");

fn compound_unit(unit: usize) -> (&'static str, &'static str) {
    if unit == 1 {
        COMPOUND_ONE
    } else {
        UNITS[unit - 1]
    }
}

/// Build the ordinal word table for 1..=30.
#[must_use]
pub fn arabic_ordinals() -> Vec<OrdinalEntry> {
    let mut entries = Vec::new();
    let mut push = |word: String, value: u32| {
        let bare = strip_hamza(&word);
        if bare != word {
            entries.push(OrdinalEntry::new(bare, value));
        }
        entries.push(OrdinalEntry::new(word, value));
    };

    for (i, (masc, fem)) in UNITS.iter().enumerate() {
        let value = i as u32 + 1;
        push((*masc).to_string(), value);
        push((*fem).to_string(), value);
    }

    push("العاشر".to_string(), 10);
    push("العاشرة".to_string(), 10);

    for unit in 1..=9 {
        let (masc, fem) = compound_unit(unit);
        let value = 10 + unit as u32;
        push(format!("{masc} عشر"), value);
        push(format!("{fem} عشرة"), value);
        // OCR and drafting both mix the gender of the tens word.
        push(format!("{fem} عشر"), value);
    }

    push("العشرون".to_string(), 20);
    push("العشرين".to_string(), 20);

    for unit in 1..=9 {
        let (masc, fem) = compound_unit(unit);
        let value = 20 + unit as u32;
        push(format!("{masc} والعشرون"), value);
        push(format!("{fem} والعشرون"), value);
        push(format!("{masc} والعشرين"), value);
        push(format!("{fem} والعشرين"), value);
    }

    push("الثلاثون".to_string(), 30);
    push("الثلاثين".to_string(), 30);

    entries
}

/// Replace hamza-carrying alefs with a bare alef.
#[must_use]
pub fn strip_hamza(word: &str) -> String {
    word.chars()
        .map(|c| match c {
            'أ' | 'إ' | 'آ' => 'ا',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(word: &str) -> Option<u32> {
        arabic_ordinals()
            .into_iter()
            .find(|e| e.word == word)
            .map(|e| e.value)
    }

    #[test]
    fn test_simple_ordinals() {
        assert_eq!(lookup("الأول"), Some(1));
        assert_eq!(lookup("الأولى"), Some(1));
        assert_eq!(lookup("الاولى"), Some(1));
        assert_eq!(lookup("الثانية"), Some(2));
        assert_eq!(lookup("العاشر"), Some(10));
    }

    #[test]
    fn test_compound_ordinals() {
        assert_eq!(lookup("الحادي عشر"), Some(11));
        assert_eq!(lookup("الحادية عشرة"), Some(11));
        assert_eq!(lookup("الثاني عشر"), Some(12));
        assert_eq!(lookup("التاسعة عشرة"), Some(19));
        assert_eq!(lookup("الحادي والعشرون"), Some(21));
        assert_eq!(lookup("الخامسة والعشرون"), Some(25));
        assert_eq!(lookup("الثلاثون"), Some(30));
    }

    #[test]
    fn test_every_value_covered() {
        let entries = arabic_ordinals();
        for value in 1..=30 {
            assert!(
                entries.iter().any(|e| e.value == value),
                "missing ordinal for {value}"
            );
        }
    }

    #[test]
    fn test_unmapped_word() {
        assert_eq!(lookup("الأربعون"), None);
    }
}
