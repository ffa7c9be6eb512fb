use crate::core::KanjiError;

pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Number of sublevels for a level. Never below one, and a page size of zero
/// is treated as one.
pub fn page_count(total_items: usize, page_size: usize) -> usize {
    total_items.div_ceil(page_size.max(1)).max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange<'a, T> {
    pub start: usize, // inclusive, 0-based
    pub end: usize,   // exclusive
    pub items: &'a [T],
}

impl<T> PageRange<'_, T> {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Resolves a 1-based page number to its slice of `items`.
pub fn range_for<T>(items: &[T], page: usize, page_size: usize) -> Result<PageRange<'_, T>, KanjiError> {
    let page_size = page_size.max(1);
    let page_count = page_count(items.len(), page_size);
    if page == 0 || page > page_count {
        return Err(KanjiError::InvalidPage { page, page_count });
    }

    let start = ((page - 1) * page_size).min(items.len());
    let end = (start + page_size).min(items.len());
    Ok(PageRange { start, end, items: &items[start..end] })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelPageIndex {
    pub level_id: String,
    pub page_size: usize,
    pub total_items: usize,
    pub page_count: usize,
}

impl LevelPageIndex {
    pub fn new(level_id: impl Into<String>, total_items: usize, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            level_id: level_id.into(),
            page_size,
            total_items,
            page_count: page_count(total_items, page_size),
        }
    }

    pub fn uses_sublevels(&self) -> bool {
        self.page_count > 1
    }

    pub fn sublevels(&self) -> Vec<SublevelSummary> {
        (1..=self.page_count)
            .map(|number| {
                let start = ((number - 1) * self.page_size).min(self.total_items);
                let end = (start + self.page_size).min(self.total_items);
                SublevelSummary {
                    number,
                    first: start + 1,
                    last: end,
                    count: end - start,
                    difficulty: Difficulty::for_sublevel(number, self.page_count),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Basic,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// The first sublevel is basic, the last two thirds are advanced.
    pub fn for_sublevel(number: usize, page_count: usize) -> Self {
        if number > page_count.div_ceil(3) {
            Difficulty::Advanced
        } else if number > 1 {
            Difficulty::Intermediate
        } else {
            Difficulty::Basic
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Basic => "Basic",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SublevelSummary {
    pub number: usize,
    pub first: usize, // 1-based, inclusive
    pub last: usize,  // 1-based, inclusive
    pub count: usize,
    pub difficulty: Difficulty,
}
