//! Pagination parameters for the message log.
//!
//! The backend never reports a total count, so everything here works in
//! "unknown total" mode: there is always a next page to ask for, and a short or
//! empty page is how the end shows up.

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported rows-per-page choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum PageSize {
    #[default]
    Ten,
    TwentyFive,
    Hundred,
}

impl PageSize {
    pub const ALL: [PageSize; 3] = [PageSize::Ten, PageSize::TwentyFive, PageSize::Hundred];

    pub fn get(self) -> usize {
        match self {
            Self::Ten => 10,
            Self::TwentyFive => 25,
            Self::Hundred => 100,
        }
    }
}

impl TryFrom<usize> for PageSize {
    type Error = anyhow::Error;

    fn try_from(value: usize) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|size| size.get() == value)
            .ok_or_else(|| anyhow!("Unsupported page size {}. Supported: 10, 25, 100", value))
    }
}

impl From<PageSize> for usize {
    fn from(size: PageSize) -> Self {
        size.get()
    }
}

impl FromStr for PageSize {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let value: usize = s
            .trim()
            .parse()
            .map_err(|_| anyhow!("'{}' is not a number", s.trim()))?;
        Self::try_from(value)
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Wire parameters for `GET /api/messages`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageQuery {
    pub limit: usize,
    pub offset: usize,
}

/// The `(page_index, page_size)` pair the message log is showing or asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PaginationState {
    pub page_index: usize,
    pub page_size: PageSize,
}

impl PaginationState {
    /// Highest accepted zero-based page. Keeps `offset` and the derived labels
    /// within `usize` for every page size.
    pub const MAX_PAGE_INDEX: usize = 10_000_000;

    pub fn new(page_size: PageSize) -> Self {
        Self {
            page_index: 0,
            page_size,
        }
    }

    pub fn offset(&self) -> usize {
        self.page_index * self.page_size.get()
    }

    pub fn query(&self) -> PageQuery {
        PageQuery {
            limit: self.page_size.get(),
            offset: self.offset(),
        }
    }

    pub fn with_page(self, page_index: usize) -> Result<Self> {
        if page_index > Self::MAX_PAGE_INDEX {
            bail!(
                "Page {} is out of range (last allowed page is {})",
                page_index.saturating_add(1),
                Self::MAX_PAGE_INDEX + 1
            );
        }
        Ok(Self { page_index, ..self })
    }

    /// Changing the size always goes back to the first page, so the index can
    /// never point past a boundary computed with the old size.
    pub fn with_page_size(self, page_size: PageSize) -> Self {
        Self {
            page_index: 0,
            page_size,
        }
    }
}

/// What the length of a received page says about the end of the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEnd {
    /// Full page: more records may follow.
    MaybeMore,
    /// Fewer than `page_size` records: this is the last page.
    LastPage,
    /// No records at all: the offset is past the end.
    PastEnd,
}

impl PageEnd {
    pub fn classify(received: usize, page_size: PageSize) -> Self {
        if received == 0 {
            Self::PastEnd
        } else if received < page_size.get() {
            Self::LastPage
        } else {
            Self::MaybeMore
        }
    }
}

/// Footer text in unknown-total style, e.g. `11–20 of more than 20`.
pub fn range_label(displayed: PaginationState, received: usize) -> String {
    let from = displayed.offset() + 1;
    let to = displayed.offset().saturating_add(received);
    match PageEnd::classify(received, displayed.page_size) {
        PageEnd::MaybeMore => format!("{}–{} of more than {}", from, to, to),
        PageEnd::LastPage => format!("{}–{} of {}", from, to, to),
        PageEnd::PastEnd => format!("no records past {}", displayed.offset()),
    }
}
