use thiserror::Error;

#[derive(Error, Debug)]
pub enum KanjiError {
    #[error("Request error: {0}")]
    Request(Box<reqwest::Error>),

    #[error("HTTP error {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("No kanji found for level {0}")]
    EmptyLevel(String),

    #[error("Sublevel {page} is not valid, this level has {page_count} sublevels")]
    InvalidPage { page: usize, page_count: usize },

    #[error("No more kanji in this sublevel")]
    EndOfPage,

    #[error("Already at the first kanji of this sublevel")]
    StartOfPage,

    #[error("No kanji loaded")]
    NoItemsLoaded,

    #[error("Request superseded by a newer one")]
    Superseded,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("KanjiError: {0}")]
    Custom(String),
}

impl KanjiError {
    pub fn is_network(&self) -> bool {
        matches!(self, KanjiError::Request(_) | KanjiError::HttpStatus { .. })
    }
}

impl From<std::io::Error> for KanjiError {
    fn from(error: std::io::Error) -> Self {
        KanjiError::Io(Box::new(error))
    }
}

impl From<reqwest::Error> for KanjiError {
    fn from(error: reqwest::Error) -> Self {
        KanjiError::Request(Box::new(error))
    }
}
