use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("page size must be one of 10, 20, 50 or 100 (got {0})")]
pub struct PageSizeError(pub usize);

/// 1ページに表示する行数
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum PageSize {
    Ten,
    #[default]
    Twenty,
    Fifty,
    Hundred,
}

impl PageSize {
    pub const ALL: [PageSize; 4] = [Self::Ten, Self::Twenty, Self::Fifty, Self::Hundred];

    pub fn rows(self) -> usize {
        match self {
            Self::Ten => 10,
            Self::Twenty => 20,
            Self::Fifty => 50,
            Self::Hundred => 100,
        }
    }

    /// 10 -> 20 -> 50 -> 100 -> 10
    pub fn cycle(self) -> Self {
        match self {
            Self::Ten => Self::Twenty,
            Self::Twenty => Self::Fifty,
            Self::Fifty => Self::Hundred,
            Self::Hundred => Self::Ten,
        }
    }
}

impl TryFrom<usize> for PageSize {
    type Error = PageSizeError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|size| size.rows() == value)
            .ok_or(PageSizeError(value))
    }
}

impl From<PageSize> for usize {
    fn from(value: PageSize) -> Self {
        value.rows()
    }
}

impl std::str::FromStr for PageSize {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: usize = s.parse()?;

        Ok(Self::try_from(value)?)
    }
}

impl std::fmt::Display for PageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.rows())
    }
}

/// Page state of a table view.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page_size: PageSize,
    page: usize,
}

impl Pagination {
    pub fn new(page_size: PageSize) -> Self {
        Self { page_size, page: 0 }
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// 0-origin
    pub fn page(&self) -> usize {
        self.page
    }

    /// サイズを変えると先頭ページに戻る
    pub fn set_page_size(&mut self, page_size: PageSize) {
        if self.page_size != page_size {
            self.page_size = page_size;
            self.page = 0;
        }
    }

    pub fn first_page(&mut self) {
        self.page = 0;
    }

    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size.rows()).max(1)
    }

    pub fn next_page(&mut self, total: usize) {
        if self.page + 1 < self.page_count(total) {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    /// Range of rows shown on the current page. The page is clamped when the
    /// number of rows shrank since it was selected.
    pub fn visible_range(&self, total: usize) -> std::ops::Range<usize> {
        let rows = self.page_size.rows();
        let page = self.page.min(self.page_count(total) - 1);
        let start = (page * rows).min(total);

        start..(start + rows).min(total)
    }

    pub fn visible<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.visible_range(items.len())]
    }
}
