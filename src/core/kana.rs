use wana_kana::ConvertJapanese;

use super::AnswerField;

const DAKUTEN_PAIRS: &[(char, char)] = &[
    ('か', 'が'), ('き', 'ぎ'), ('く', 'ぐ'), ('け', 'げ'), ('こ', 'ご'),
    ('さ', 'ざ'), ('し', 'じ'), ('す', 'ず'), ('せ', 'ぜ'), ('そ', 'ぞ'),
    ('た', 'だ'), ('ち', 'ぢ'), ('つ', 'づ'), ('て', 'で'), ('と', 'ど'),
    ('は', 'ば'), ('ひ', 'び'), ('ふ', 'ぶ'), ('へ', 'べ'), ('ほ', 'ぼ'),
    ('カ', 'ガ'), ('キ', 'ギ'), ('ク', 'グ'), ('ケ', 'ゲ'), ('コ', 'ゴ'),
    ('サ', 'ザ'), ('シ', 'ジ'), ('ス', 'ズ'), ('セ', 'ゼ'), ('ソ', 'ゾ'),
    ('タ', 'ダ'), ('チ', 'ヂ'), ('ツ', 'ヅ'), ('テ', 'デ'), ('ト', 'ド'),
    ('ハ', 'バ'), ('ヒ', 'ビ'), ('フ', 'ブ'), ('ヘ', 'ベ'), ('ホ', 'ボ'),
    ('ウ', 'ヴ'),
];

// (plain, dakuten, handakuten)
const HANDAKUTEN_ROWS: &[(char, char, char)] = &[
    ('は', 'ば', 'ぱ'), ('ひ', 'び', 'ぴ'), ('ふ', 'ぶ', 'ぷ'), ('へ', 'べ', 'ぺ'), ('ほ', 'ぼ', 'ぽ'),
    ('ハ', 'バ', 'パ'), ('ヒ', 'ビ', 'ピ'), ('フ', 'ブ', 'プ'), ('ヘ', 'ベ', 'ペ'), ('ホ', 'ボ', 'ポ'),
];

/// Converts romaji typed into a reading field to the script the API uses for
/// that field: katakana for on readings, hiragana for kun readings. Only runs
/// of ASCII letters are converted so okurigana dots and kana already present
/// are kept. Meaning input is returned unchanged.
pub fn to_field_kana(field: AnswerField, input: &str) -> String {
    match field {
        AnswerField::Meaning => input.to_string(),
        AnswerField::OnReading => convert_romaji_runs(input, |run| run.to_katakana()),
        AnswerField::KunReading => convert_romaji_runs(input, |run| run.to_hiragana()),
    }
}

fn convert_romaji_runs(input: &str, convert: impl Fn(&str) -> String) -> String {
    let mut output = String::with_capacity(input.len());
    let mut run = String::new();

    for c in input.chars() {
        if c.is_ascii_alphabetic() {
            run.push(c.to_ascii_lowercase());
            continue;
        }
        if !run.is_empty() {
            output.push_str(&convert(&run));
            run.clear();
        }
        output.push(c);
    }
    if !run.is_empty() {
        output.push_str(&convert(&run));
    }

    output
}

/// Toggles the dakuten on the last character: か → が, が → か.
pub fn toggle_dakuten(text: &str) -> String {
    replace_last(text, |last| {
        if let Some(&(_, voiced)) = DAKUTEN_PAIRS.iter().find(|(plain, _)| *plain == last) {
            return Some(voiced);
        }
        if let Some(&(plain, _)) = DAKUTEN_PAIRS.iter().find(|(_, voiced)| *voiced == last) {
            return Some(plain);
        }
        HANDAKUTEN_ROWS.iter().find(|(_, _, semi)| *semi == last).map(|(_, voiced, _)| *voiced)
    })
}

/// Toggles the handakuten on the last character of the ha row: は/ば → ぱ, ぱ → は.
pub fn toggle_handakuten(text: &str) -> String {
    replace_last(text, |last| {
        HANDAKUTEN_ROWS.iter().find_map(|&(plain, voiced, semi)| {
            if last == plain || last == voiced {
                Some(semi)
            } else if last == semi {
                Some(plain)
            } else {
                None
            }
        })
    })
}

fn replace_last(text: &str, swap: impl Fn(char) -> Option<char>) -> String {
    let mut chars: Vec<char> = text.chars().collect();
    if let Some(last) = chars.last_mut() {
        if let Some(replacement) = swap(*last) {
            *last = replacement;
        }
    }
    chars.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_kana_conversion() {
        assert_eq!(to_field_kana(AnswerField::OnReading, "nichi"), "ニチ");
        assert_eq!(to_field_kana(AnswerField::KunReading, "hi"), "ひ");
        assert_eq!(to_field_kana(AnswerField::KunReading, "okona.u"), "おこな.う");
        assert_eq!(to_field_kana(AnswerField::KunReading, "おこなu"), "おこなう");
        assert_eq!(to_field_kana(AnswerField::Meaning, "sun"), "sun");
        assert_eq!(to_field_kana(AnswerField::OnReading, "ニチ"), "ニチ");
    }

    #[test]
    fn test_toggle_dakuten() {
        assert_eq!(toggle_dakuten("か"), "が");
        assert_eq!(toggle_dakuten("が"), "か");
        assert_eq!(toggle_dakuten("ひと"), "ひど");
        assert_eq!(toggle_dakuten("ホ"), "ボ");
        assert_eq!(toggle_dakuten("ぱ"), "ば");
        assert_eq!(toggle_dakuten("あ"), "あ");
        assert_eq!(toggle_dakuten(""), "");
    }

    #[test]
    fn test_toggle_handakuten() {
        assert_eq!(toggle_handakuten("は"), "ぱ");
        assert_eq!(toggle_handakuten("ば"), "ぱ");
        assert_eq!(toggle_handakuten("ぱ"), "は");
        assert_eq!(toggle_handakuten("ヘ"), "ペ");
        assert_eq!(toggle_handakuten("か"), "か");
    }
}
