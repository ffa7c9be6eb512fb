pub mod api;
pub mod core;
pub mod navigation;
pub mod persistence;
pub mod session;
pub mod settings;
pub mod sound;
pub mod validation;

pub use api::{
    KanjiApi,
    KanjiSource,
};
pub use core::{
    AnswerField,
    JlptLevel,
    KanjiError,
    KanjiRecord,
};
pub use session::StudySession;
pub use settings::Settings;
