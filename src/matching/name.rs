/// Honorifics stripped from the start of a name, tried once each, in order.
const HONORIFICS: [&str; 18] = [
    "นาย",
    "นางสาว",
    "นาง",
    "น.ส.",
    "นส.",
    "ด.ช.",
    "ดช.",
    "ด.ญ.",
    "ดญ.",
    "ดช",
    "ดญ",
    "เด็กชาย",
    "เด็กหญิง",
    "MR.",
    "MS.",
    "MR",
    "MS",
    "MISS",
];

/// Reduce a display name to a comparable form: honorifics removed,
/// lowercased, punctuation dropped, whitespace collapsed.
pub fn normalize(name: &str) -> String {
    let mut rest = name;
    for prefix in HONORIFICS {
        if let Some(stripped) = strip_prefix_ignore_case(rest, prefix) {
            rest = stripped.trim_start();
        }
    }

    let kept: String = rest
        .to_lowercase()
        .chars()
        .filter(|c| is_name_char(*c))
        .collect();

    collapse_whitespace(&kept)
}

/// Whether the slip name appears in any of the expected names.
///
/// Containment rather than equality: OCR often returns a shortened name,
/// and stored names may carry extra tokens.
pub fn matches<I, S>(ocr_name: &str, candidates: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let needle = normalize(ocr_name);
    if needle.is_empty() {
        return false;
    }

    candidates
        .into_iter()
        .any(|candidate| normalize(candidate.as_ref()).contains(&needle))
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let mut chars = s.chars();
    for expected in prefix.chars() {
        let actual = chars.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }
    Some(chars.as_str())
}

/// ASCII letters and digits, the Thai block, and whitespace.
fn is_name_char(c: char) -> bool {
    c.is_ascii_lowercase()
        || c.is_ascii_digit()
        || ('\u{0E00}'..='\u{0E7F}').contains(&c)
        || c.is_whitespace()
}

/// Runs of two or more whitespace characters become one space, then trim.
fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_whitespace() && chars.peek().is_some_and(|next| next.is_whitespace()) {
            while chars.next_if(|next| next.is_whitespace()).is_some() {}
            out.push(' ');
        } else {
            out.push(c);
        }
    }

    out.trim().to_string()
}
