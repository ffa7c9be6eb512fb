use std::fmt;

use serde::{
    Deserialize,
    Serialize,
};

use crate::core::{
    AnswerField,
    KanjiRecord,
    NormalizeAnswer,
};

pub mod variants;

pub use variants::{
    expand_kun_readings,
    ValidAnswerSet,
};

/// Checks free-text input against a set of accepted answers. Both sides are
/// normalized; input that normalizes to nothing never matches.
pub fn validate(input: &str, valid_variants: &[String]) -> bool {
    if valid_variants.is_empty() {
        log::warn!("No valid answers to compare {:?} against", input);
        return false;
    }

    let normalized = input.normalize_answer();
    if normalized.is_empty() {
        return false;
    }

    valid_variants.iter().any(|v| v.normalize_answer() == normalized)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptPolicy {
    pub hint_after: u32,   // failed attempts before the hint unlocks
    pub reveal_after: u32, // failed attempts before the answer is shown
}

impl Default for AttemptPolicy {
    fn default() -> Self {
        Self { hint_after: 2, reveal_after: 3 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerInputs {
    pub meaning: String,
    pub on_reading: String,
    pub kun_reading: String,
}

impl AnswerInputs {
    pub fn get(&self, field: AnswerField) -> &str {
        match field {
            AnswerField::Meaning => &self.meaning,
            AnswerField::OnReading => &self.on_reading,
            AnswerField::KunReading => &self.kun_reading,
        }
    }

    pub fn set(&mut self, field: AnswerField, value: impl Into<String>) {
        let slot = match field {
            AnswerField::Meaning => &mut self.meaning,
            AnswerField::OnReading => &mut self.on_reading,
            AnswerField::KunReading => &mut self.kun_reading,
        };
        *slot = value.into();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Partial,
    Incorrect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptOutcome {
    pub attempt: u32,
    pub verdict: Verdict,
    pub correct: Vec<AnswerField>,
    pub incorrect: Vec<AnswerField>,
}

impl AttemptOutcome {
    pub fn is_correct(&self) -> bool {
        self.verdict == Verdict::Correct
    }
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |fields: &[AnswerField], sep: &str| {
            fields.iter().map(|f| f.label()).collect::<Vec<_>>().join(sep)
        };

        match self.verdict {
            Verdict::Correct if self.correct.len() == 1 => {
                write!(f, "{} correct", self.correct[0])
            }
            Verdict::Correct => write!(f, "all available answers correct ({})", join(&self.correct, ", ")),
            Verdict::Partial => write!(
                f,
                "{} correct, but {} incorrect",
                join(&self.correct, " and "),
                join(&self.incorrect, " and ")
            ),
            Verdict::Incorrect => write!(f, "all available answers incorrect"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Some available field was left blank. Nothing was counted.
    Incomplete { missing: Vec<AnswerField> },
    /// The record has no field to ask about.
    NoData,
    Evaluated(AttemptOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hint {
    pub parts: Vec<(AnswerField, Option<String>)>,
}

impl Hint {
    /// First half (rounded up) of each field's primary answer.
    pub fn for_record(record: &KanjiRecord) -> Self {
        let parts = AnswerField::ALL
            .iter()
            .map(|field| {
                let prefix = record.primary(*field).map(|answer| {
                    let len = answer.chars().count();
                    let half: String = answer.chars().take(len.div_ceil(2)).collect();
                    format!("{half}...")
                });
                (*field, prefix)
            })
            .collect();

        Self { parts }
    }

    pub fn get(&self, field: AnswerField) -> Option<&str> {
        self.parts.iter().find(|(f, _)| *f == field).and_then(|(_, hint)| hint.as_deref())
    }
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .parts
            .iter()
            .map(|(field, hint)| format!("{}: {}", field, hint.as_deref().unwrap_or("N/A")))
            .collect();
        f.write_str(&rendered.join(", "))
    }
}

/// Attempt state for the kanji currently on screen.
#[derive(Debug, Clone)]
pub struct AnswerCheck {
    answers: Vec<ValidAnswerSet>,
    hint: Hint,
    policy: AttemptPolicy,
    attempts: u32,
    failures: u32,
    last: Option<AttemptOutcome>,
    revealed: bool,
}

impl AnswerCheck {
    pub fn new(record: &KanjiRecord, policy: AttemptPolicy) -> Self {
        let answers = AnswerField::ALL
            .iter()
            .filter_map(|field| ValidAnswerSet::from_record(record, *field))
            .collect();

        Self {
            answers,
            hint: Hint::for_record(record),
            policy,
            attempts: 0,
            failures: 0,
            last: None,
            revealed: false,
        }
    }

    pub fn available_fields(&self) -> Vec<AnswerField> {
        self.answers.iter().map(|a| a.field()).collect()
    }

    pub fn is_available(&self, field: AnswerField) -> bool {
        self.answers.iter().any(|a| a.field() == field)
    }

    pub fn answer_set(&self, field: AnswerField) -> Option<&ValidAnswerSet> {
        self.answers.iter().find(|a| a.field() == field)
    }

    pub fn submit(&mut self, inputs: &AnswerInputs) -> SubmitOutcome {
        if self.answers.is_empty() {
            log::error!("No kanji data available to validate against");
            self.revealed = true;
            return SubmitOutcome::NoData;
        }

        let missing: Vec<AnswerField> = self
            .answers
            .iter()
            .map(|a| a.field())
            .filter(|field| inputs.get(*field).trim().is_empty())
            .collect();
        if !missing.is_empty() {
            return SubmitOutcome::Incomplete { missing };
        }

        self.attempts += 1;

        let mut correct = Vec::new();
        let mut incorrect = Vec::new();
        for answer in &self.answers {
            let input = inputs.get(answer.field());
            let is_correct = validate(input, answer.variants());
            log::debug!(
                "Validating {}: {:?} against {:?} -> {}",
                answer.field(),
                input,
                answer.variants(),
                is_correct
            );

            if is_correct {
                correct.push(answer.field());
            } else {
                incorrect.push(answer.field());
            }
        }

        let verdict = if incorrect.is_empty() {
            Verdict::Correct
        } else if correct.is_empty() {
            Verdict::Incorrect
        } else {
            Verdict::Partial
        };

        if verdict == Verdict::Correct {
            self.revealed = true;
        } else {
            self.failures += 1;
            if self.failures >= self.policy.reveal_after {
                self.revealed = true;
            }
        }

        let outcome = AttemptOutcome { attempt: self.attempts, verdict, correct, incorrect };
        self.last = Some(outcome.clone());
        SubmitOutcome::Evaluated(outcome)
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn last_outcome(&self) -> Option<&AttemptOutcome> {
        self.last.as_ref()
    }

    pub fn hint_unlocked(&self) -> bool {
        self.failures >= self.policy.hint_after
    }

    /// The hint, once enough attempts have failed.
    pub fn hint(&self) -> Option<&Hint> {
        self.hint_unlocked().then_some(&self.hint)
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Gives up on the current kanji.
    pub fn reveal(&mut self) {
        self.revealed = true;
    }

    pub fn revealed_answers(&self) -> Option<&[ValidAnswerSet]> {
        self.revealed.then_some(self.answers.as_slice())
    }

    pub fn progress_percent(&self) -> u32 {
        if self.attempts == 0 || self.policy.reveal_after == 0 {
            return if self.attempts == 0 { 0 } else { 100 };
        }
        (self.attempts * 100 / self.policy.reveal_after).min(100)
    }
}
