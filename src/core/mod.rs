pub mod errors;
pub mod http;
pub mod kana;
pub mod models;
pub mod utils;

pub use errors::KanjiError;
pub use models::{ resolve_level_id, AnswerField, JlptLevel, KanjiRecord };
pub use utils::{ normalize, NormalizeAnswer };
