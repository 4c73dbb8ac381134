use super::xml::Document;
use regex::Regex;
use std::sync::OnceLock;

/// Leading `<digits><separators>` prefix; separators are whitespace, periods
/// and zero-width spaces
fn leading_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)[.\s\x{200B}]+").expect("leading-number pattern is valid"))
}

/// Inline `<number>. (<letter>)` citation inside answer text
fn answer_citation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\.\s*\(([a-eA-E])\)").expect("answer pattern is valid"))
}

fn decimal_digit_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d$").expect("digit pattern is valid"))
}

fn is_decimal_digit(c: char) -> bool {
    decimal_digit_re().is_match(c.encode_utf8(&mut [0; 4]))
}

/// Value of a Unicode decimal digit
///
/// Digits of every script are laid out as contiguous runs starting at zero,
/// so the value is the distance from the start of the run, modulo 10.
fn digit_value(c: char) -> Option<u64> {
    if let Some(d) = c.to_digit(10) {
        return Some(u64::from(d));
    }
    if !is_decimal_digit(c) {
        return None;
    }
    let mut offset = 0u32;
    let mut cp = c as u32;
    while let Some(prev) = cp.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal_digit(prev) {
            break;
        }
        offset += 1;
        cp -= 1;
    }
    Some(u64::from(offset % 10))
}

/// Parse a run of decimal digits in any script; `None` on overflow
fn parse_digits(digits: &str) -> Option<u64> {
    digits
        .chars()
        .try_fold(0u64, |acc, c| acc.checked_mul(10)?.checked_add(digit_value(c)?))
}

/// Texts and parsed numbers of every element with a given tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumberedElements {
    /// Trimmed text per element
    pub texts: Vec<String>,
    /// Parallel to `texts`
    pub numbers: Vec<Option<u64>>,
}

/// Answer texts plus every cited number, flattened
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerKeys {
    pub texts: Vec<String>,
    pub numbers: Vec<u64>,
}

/// Parse the number that prefixes `text`, if any
///
/// The digits must be followed by at least one separator, so `"12"` and
/// `"12Question"` yield `None`.
pub fn leading_number(text: &str) -> Option<u64> {
    leading_number_re()
        .captures(text)
        .and_then(|cap| cap.get(1))
        .and_then(|m| parse_digits(m.as_str()))
}

/// Collect every answer number cited in `text`, in order
pub fn answer_numbers(text: &str) -> Vec<u64> {
    answer_citation_re()
        .captures_iter(text)
        .filter_map(|cap| cap.get(1).and_then(|m| parse_digits(m.as_str())))
        .collect()
}

/// Extract the numbering of every element whose local name is `tag`
pub fn extract_numbered_elements(doc: &Document, tag: &str) -> NumberedElements {
    let mut out = NumberedElements::default();
    for elem in doc.elements_named(tag) {
        let text = elem.text.trim();
        out.numbers.push(leading_number(text));
        out.texts.push(text.to_string());
    }
    out
}

/// Extract every answer citation from elements whose local name is `tag`
pub fn extract_answer_keys(doc: &Document, tag: &str) -> AnswerKeys {
    let mut out = AnswerKeys::default();
    for elem in doc.elements_named(tag) {
        let text = elem.text.trim();
        out.numbers.extend(answer_numbers(text));
        out.texts.push(text.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::xml::ParseMode;

    #[test]
    fn test_leading_number_with_period() {
        assert_eq!(leading_number("12. Question text"), Some(12));
    }

    #[test]
    fn test_leading_number_absent() {
        assert_eq!(leading_number("Question text"), None);
        assert_eq!(leading_number(""), None);
    }

    #[test]
    fn test_leading_number_requires_separator() {
        assert_eq!(leading_number("12"), None);
        assert_eq!(leading_number("12Question"), None);
    }

    #[test]
    fn test_leading_number_separator_variants() {
        assert_eq!(leading_number("3 Question"), Some(3));
        assert_eq!(leading_number("4\tQuestion"), Some(4));
        assert_eq!(leading_number("5\u{200B}Question"), Some(5));
        assert_eq!(leading_number("6.\u{200B} Question"), Some(6));
    }

    #[test]
    fn test_leading_number_must_be_at_start() {
        assert_eq!(leading_number("Q 7. text"), None);
    }

    #[test]
    fn test_leading_number_overflow_is_absent() {
        assert_eq!(leading_number("99999999999999999999999. text"), None);
    }

    #[test]
    fn test_non_ascii_digits_are_parsed() {
        // Arabic-Indic, Devanagari and fullwidth digits
        assert_eq!(leading_number("\u{661}\u{662}. text"), Some(12));
        assert_eq!(leading_number("\u{967}\u{966}. text"), Some(10));
        assert_eq!(leading_number("\u{FF19}. text"), Some(9));
        assert_eq!(answer_numbers("\u{663}. (a)"), vec![3]);
    }

    #[test]
    fn test_digit_value_within_long_runs() {
        // Mathematical digits repeat 0-9 five times in one run
        assert_eq!(digit_value('\u{1D7CE}'), Some(0));
        assert_eq!(digit_value('\u{1D7D9}'), Some(1));
        assert_eq!(digit_value('\u{1D7FF}'), Some(9));
        assert_eq!(digit_value('x'), None);
    }

    #[test]
    fn test_answer_numbers_case_insensitive() {
        assert_eq!(answer_numbers("3. (b) 7. (D)"), vec![3, 7]);
    }

    #[test]
    fn test_answer_numbers_ignores_out_of_range_letters() {
        assert_eq!(answer_numbers("1. (f) 2.(e) 3. (a)"), vec![2, 3]);
        assert!(answer_numbers("no citations here").is_empty());
    }

    #[test]
    fn test_extract_numbered_elements() {
        let xml = r#"<Root>
            <Question>  1. First </Question>
            <Question>Unnumbered</Question>
            <Question>3.&#x200B;Third</Question>
            <Explanations>1. Because</Explanations>
        </Root>"#;
        let doc = Document::parse(xml, ParseMode::Lenient).unwrap();

        let q = extract_numbered_elements(&doc, "Question");
        assert_eq!(q.texts, vec!["1. First", "Unnumbered", "3.\u{200B}Third"]);
        assert_eq!(q.numbers, vec![Some(1), None, Some(3)]);

        let e = extract_numbered_elements(&doc, "Explanations");
        assert_eq!(e.numbers, vec![Some(1)]);
    }

    #[test]
    fn test_extract_answer_keys_flattens() {
        let xml = r#"<Root>
            <Answer>1. (a) 2. (c)</Answer>
            <Answer>Answers follow</Answer>
            <Answer>3. (B)</Answer>
        </Root>"#;
        let doc = Document::parse(xml, ParseMode::Lenient).unwrap();

        let keys = extract_answer_keys(&doc, "Answer");
        assert_eq!(keys.texts.len(), 3);
        assert_eq!(keys.numbers, vec![1, 2, 3]);
    }
}
