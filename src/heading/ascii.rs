//! Built-in `ascii` heading formatter.

use unicode_normalization::UnicodeNormalization as _;

use super::formatter::HeadingFormatter;

/// Turns heading text into a field identifier matching `[A-Za-z_][A-Za-z0-9_]*` (or empty).
///
/// Steps:
/// 1. transliterate to ASCII (fixed table, then NFKD decomposition minus combining marks)
/// 2. lowercase
/// 3. whitespace runs become `_`
/// 4. drop anything outside `[A-Za-z0-9_]`
/// 5. collapse repeated `_`
/// 6. trim leading/trailing `_`
/// 7. prefix `_` when the first character is a digit
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiFormatter;

impl HeadingFormatter for AsciiFormatter {
    fn format(&self, text: &str, _column: usize) -> String {
        sanitize_identifier(text)
    }
}

/// Apply the `ascii` formatter steps to `text`.
pub fn sanitize_identifier(text: &str) -> String {
    let ascii = transliterate(text).to_ascii_lowercase();

    let mut out = String::with_capacity(ascii.len());
    for c in ascii.chars() {
        let c = if c.is_ascii_whitespace() { '_' } else { c };
        if !(c.is_ascii_alphanumeric() || c == '_') {
            continue;
        }
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }

    let trimmed = out.trim_matches('_');
    if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{trimmed}")
    } else {
        trimmed.to_string()
    }
}

/// Replace non-ASCII characters by their closest ASCII spelling; characters with none are dropped.
pub fn transliterate(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii() {
            out.push(c);
        } else if let Some(rep) = table(c) {
            out.push_str(rep);
        } else if c.is_whitespace() {
            out.push(' ');
        } else {
            out.extend(c.nfkd().filter(char::is_ascii));
        }
    }
    out
}

// Characters NFKD does not reduce to ASCII.
fn table(c: char) -> Option<&'static str> {
    let s = match c {
        '\u{a0}' => " ",
        '°' => "0",
        'ß' => "ss",
        'ẞ' => "SS",
        'æ' | 'ǽ' => "ae",
        'Æ' | 'Ǽ' => "AE",
        'ø' | 'ǿ' => "o",
        'Ø' | 'Ǿ' => "O",
        'œ' => "oe",
        'Œ' => "OE",
        'đ' | 'ð' => "d",
        'Đ' | 'Ð' => "D",
        'ł' => "l",
        'Ł' => "L",
        'þ' => "th",
        'Þ' => "TH",
        'ħ' => "h",
        'Ħ' => "H",
        'ı' => "i",
        'ŋ' => "n",
        'Ŋ' => "N",
        'ŧ' => "t",
        'Ŧ' => "T",
        'ĸ' => "k",
        'ſ' => "s",
        // Greek
        'α' | 'ά' => "a",
        'β' => "b",
        'γ' => "g",
        'δ' => "d",
        'ε' | 'έ' => "e",
        'ζ' => "z",
        'η' | 'ή' => "i",
        'θ' => "th",
        'ι' | 'ί' | 'ϊ' | 'ΐ' => "i",
        'κ' => "k",
        'λ' => "l",
        'μ' => "m",
        'ν' => "n",
        'ξ' => "ks",
        'ο' | 'ό' => "o",
        'π' => "p",
        'ρ' => "r",
        'σ' | 'ς' => "s",
        'τ' => "t",
        'υ' | 'ύ' | 'ϋ' | 'ΰ' => "y",
        'φ' => "f",
        'χ' => "x",
        'ψ' => "ps",
        'ω' | 'ώ' => "o",
        'Α' | 'Ά' => "A",
        'Β' => "B",
        'Γ' => "G",
        'Δ' => "D",
        'Ε' | 'Έ' => "E",
        'Ζ' => "Z",
        'Η' | 'Ή' => "I",
        'Θ' => "TH",
        'Ι' | 'Ί' | 'Ϊ' => "I",
        'Κ' => "K",
        'Λ' => "L",
        'Μ' => "M",
        'Ν' => "N",
        'Ξ' => "KS",
        'Ο' | 'Ό' => "O",
        'Π' => "P",
        'Ρ' => "R",
        'Σ' => "S",
        'Τ' => "T",
        'Υ' | 'Ύ' | 'Ϋ' => "Y",
        'Φ' => "F",
        'Χ' => "X",
        'Ψ' => "PS",
        'Ω' | 'Ώ' => "O",
        // Cyrillic
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' | 'ґ' => "g",
        'д' => "d",
        'е' | 'ё' | 'э' => "e",
        'є' => "ye",
        'ж' => "zh",
        'з' => "z",
        'и' | 'і' | 'ї' => "i",
        'й' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'ю' => "yu",
        'я' => "ya",
        'А' => "A",
        'Б' => "B",
        'В' => "V",
        'Г' | 'Ґ' => "G",
        'Д' => "D",
        'Е' | 'Ё' | 'Э' => "E",
        'Є' => "YE",
        'Ж' => "ZH",
        'З' => "Z",
        'И' | 'І' | 'Ї' => "I",
        'Й' => "Y",
        'К' => "K",
        'Л' => "L",
        'М' => "M",
        'Н' => "N",
        'О' => "O",
        'П' => "P",
        'Р' => "R",
        'С' => "S",
        'Т' => "T",
        'У' => "U",
        'Ф' => "F",
        'Х' => "H",
        'Ц' => "TS",
        'Ч' => "CH",
        'Ш' => "SH",
        'Щ' => "SCH",
        'Ъ' | 'Ь' => "",
        'Ы' => "Y",
        'Ю' => "YU",
        'Я' => "YA",
        _ => return None,
    };
    Some(s)
}
