use std::{
    fmt,
    str::FromStr,
};

use serde::{
    Deserialize,
    Serialize,
};

use super::KanjiError;

/// The three answer inputs a kanji card asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerField {
    Meaning,
    OnReading,
    KunReading,
}

impl AnswerField {
    pub const ALL: [AnswerField; 3] =
        [AnswerField::Meaning, AnswerField::OnReading, AnswerField::KunReading];

    pub fn label(&self) -> &'static str {
        match self {
            AnswerField::Meaning => "meaning",
            AnswerField::OnReading => "on reading",
            AnswerField::KunReading => "kun reading",
        }
    }
}

impl fmt::Display for AnswerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KanjiRecord {
    pub character: String,
    pub on_readings: Vec<String>,    // 音読み, katakana as served by the API
    pub kun_readings: Vec<String>,   // 訓読み, okurigana marked with '.'
    pub meanings: Vec<String>,       // English
    pub stroke_count: Option<u32>,
    pub grade: Option<u8>,
    pub jlpt: Option<u8>,
}

impl KanjiRecord {
    pub fn new(character: impl Into<String>) -> Self {
        Self {
            character: character.into(),
            on_readings: Vec::new(),
            kun_readings: Vec::new(),
            meanings: Vec::new(),
            stroke_count: None,
            grade: None,
            jlpt: None,
        }
    }

    pub fn field(&self, field: AnswerField) -> &[String] {
        match field {
            AnswerField::Meaning => &self.meanings,
            AnswerField::OnReading => &self.on_readings,
            AnswerField::KunReading => &self.kun_readings,
        }
    }

    /// First non-blank entry of a field, used for display and hints.
    pub fn primary(&self, field: AnswerField) -> Option<&str> {
        self.field(field).iter().map(|s| s.trim()).find(|s| !s.is_empty())
    }

    pub fn is_available(&self, field: AnswerField) -> bool {
        self.primary(field).is_some()
    }

    pub fn has_any_data(&self) -> bool {
        AnswerField::ALL.iter().any(|f| self.is_available(*f))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JlptLevel {
    N5,
    N4,
    N3,
    N2,
    N1,
}

impl JlptLevel {
    pub const ALL: [JlptLevel; 5] =
        [JlptLevel::N5, JlptLevel::N4, JlptLevel::N3, JlptLevel::N2, JlptLevel::N1];

    pub fn number(&self) -> u8 {
        match self {
            JlptLevel::N5 => 5,
            JlptLevel::N4 => 4,
            JlptLevel::N3 => 3,
            JlptLevel::N2 => 2,
            JlptLevel::N1 => 1,
        }
    }

    pub fn api_id(&self) -> String {
        format!("jlpt-{}", self.number())
    }

    pub fn description(&self) -> &'static str {
        match self {
            JlptLevel::N5 => "Basic",
            JlptLevel::N4 => "Elementary",
            JlptLevel::N3 => "Intermediate",
            JlptLevel::N2 => "Upper intermediate",
            JlptLevel::N1 => "Advanced",
        }
    }

    fn from_number(n: u8) -> Option<Self> {
        match n {
            5 => Some(JlptLevel::N5),
            4 => Some(JlptLevel::N4),
            3 => Some(JlptLevel::N3),
            2 => Some(JlptLevel::N2),
            1 => Some(JlptLevel::N1),
            _ => None,
        }
    }
}

impl fmt::Display for JlptLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.number())
    }
}

impl FromStr for JlptLevel {
    type Err = KanjiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let digits = lower
            .strip_prefix("jlpt-")
            .or_else(|| lower.strip_prefix("jlpt"))
            .or_else(|| lower.strip_prefix('n'))
            .unwrap_or(lower.as_str());

        digits
            .parse::<u8>()
            .ok()
            .and_then(JlptLevel::from_number)
            .ok_or_else(|| KanjiError::Custom(format!("Unknown JLPT level: {}", s)))
    }
}

/// Resolves user input to an API level id. JLPT shorthands map to `jlpt-N`,
/// anything else (`grade-1`, `joyo`, ...) is passed through.
pub fn resolve_level_id(input: &str) -> String {
    match input.parse::<JlptLevel>() {
        Ok(level) => level.api_id(),
        Err(_) => input.trim().to_lowercase(),
    }
}
