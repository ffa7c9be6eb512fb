/// Marks removed before script filtering. Hyphens and middle dots separate
/// okurigana or compound readings, the rest are Japanese punctuation and wave dashes.
const STRIPPED_MARKS: &[char] = &['-', '・', '。', '、', '～', '〜'];

pub trait NormalizeAnswer {
    fn normalize_answer(&self) -> String;
}

// "  おこな.う " -> "おこなう", "To  Go-Out!" -> "togoout"
impl NormalizeAnswer for str {
    fn normalize_answer(&self) -> String {
        let lowered = self.to_lowercase();
        let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");

        collapsed
            .chars()
            .filter(|c| !STRIPPED_MARKS.contains(c))
            .filter(|c| is_answer_char(*c))
            .collect()
    }
}

/// Implement the trait for `String` by forwarding the method to `str`
impl NormalizeAnswer for String {
    fn normalize_answer(&self) -> String {
        self.as_str().normalize_answer()
    }
}

pub fn normalize(text: &str) -> String {
    text.normalize_answer()
}

fn is_answer_char(c: char) -> bool {
    matches!(c, '\u{3040}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}') || c.is_ascii_alphanumeric()
}
