use std::sync::Arc;

use rand::Rng;

use super::paginator::range_for;
use crate::core::KanjiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// 1-based sublevel number.
    Page(usize),
    FullLevel,
}

impl Scope {
    /// Page scope only makes sense when the level is split and the user
    /// picked a sublevel; otherwise the whole level is navigated.
    pub fn select(page_count: usize, entered_page: Option<usize>) -> Self {
        match entered_page {
            Some(page) if page_count > 1 => Scope::Page(page),
            _ => Scope::FullLevel,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
    Random,
}

/// Position inside the active window of a level's item list. The window is
/// either one sublevel or the whole list; `position` is relative to it.
#[derive(Debug, Clone)]
pub struct NavigationCursor {
    scope: Scope,
    items: Arc<[String]>,
    start: usize,
    end: usize,
    position: usize,
}

impl NavigationCursor {
    pub fn full_level(items: Arc<[String]>) -> Result<Self, KanjiError> {
        if items.is_empty() {
            return Err(KanjiError::NoItemsLoaded);
        }
        let end = items.len();
        Ok(Self { scope: Scope::FullLevel, items, start: 0, end, position: 0 })
    }

    pub fn for_page(items: Arc<[String]>, page: usize, page_size: usize) -> Result<Self, KanjiError> {
        let range = range_for(&items[..], page, page_size)?;
        if range.is_empty() {
            return Err(KanjiError::NoItemsLoaded);
        }
        let (start, end) = (range.start, range.end);
        Ok(Self { scope: Scope::Page(page), items, start, end, position: 0 })
    }

    pub fn with_scope(items: Arc<[String]>, scope: Scope, page_size: usize) -> Result<Self, KanjiError> {
        match scope {
            Scope::Page(page) => Self::for_page(items, page, page_size),
            Scope::FullLevel => Self::full_level(items),
        }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Length of the active window.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the current item in the full level list.
    pub fn absolute_index(&self) -> usize {
        self.start + self.position
    }

    pub fn current(&self) -> &str {
        &self.items[self.absolute_index()]
    }

    pub fn items(&self) -> &[String] {
        &self.items[self.start..self.end]
    }

    pub fn next(&mut self) -> Result<(), KanjiError> {
        let next = self.position + 1;
        match self.scope {
            Scope::Page(_) if next >= self.len() => Err(KanjiError::EndOfPage),
            Scope::Page(_) => {
                self.position = next;
                Ok(())
            }
            Scope::FullLevel => {
                self.position = next % self.len();
                Ok(())
            }
        }
    }

    pub fn previous(&mut self) -> Result<(), KanjiError> {
        match self.scope {
            Scope::Page(_) if self.position == 0 => Err(KanjiError::StartOfPage),
            Scope::Page(_) => {
                self.position -= 1;
                Ok(())
            }
            Scope::FullLevel => {
                self.position = self.position.checked_sub(1).unwrap_or(self.len() - 1);
                Ok(())
            }
        }
    }

    /// Uniform over the active window. The current position can come up again.
    pub fn random<R: Rng>(&mut self, rng: &mut R) {
        self.position = rng.random_range(0..self.len());
    }

    pub fn step<R: Rng>(&mut self, direction: Direction, rng: &mut R) -> Result<(), KanjiError> {
        match direction {
            Direction::Next => self.next(),
            Direction::Previous => self.previous(),
            Direction::Random => {
                self.random(rng);
                Ok(())
            }
        }
    }
}
