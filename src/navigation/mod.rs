pub mod cursor;
pub mod paginator;

pub use cursor::{
    Direction,
    NavigationCursor,
    Scope,
};
pub use paginator::{
    page_count,
    range_for,
    Difficulty,
    LevelPageIndex,
    PageRange,
    SublevelSummary,
    DEFAULT_PAGE_SIZE,
};
