use serde::Serialize;

pub const INDEX_PAGE_SIZE: u32 = 10;
pub const GROUP_PAGE_SIZE: u32 = 5;
pub const PROFILE_PAGE_SIZE: u32 = 3;
pub const FOLLOW_PAGE_SIZE: u32 = 10;

/// Page-number pagination over a counted result set.
///
/// A missing or non-numeric page falls back to the first page, a number
/// outside `1..=num_pages` falls back to the last one. There is always at
/// least one (possibly empty) page.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    per_page: u32,
    count: u64,
}

impl Paginator {
    pub fn new(per_page: u32, count: u64) -> Self {
        Self {
            per_page: per_page.max(1),
            count,
        }
    }

    pub fn num_pages(&self) -> u32 {
        let pages = self.count.div_ceil(self.per_page as u64);
        pages.clamp(1, u32::MAX as u64) as u32
    }

    pub fn resolve(&self, requested: Option<&str>) -> PageWindow {
        let num_pages = self.num_pages();
        let number = match requested.map(str::trim) {
            None => 1,
            Some(raw) => match raw.parse::<i64>() {
                Ok(n) if n < 1 || n > num_pages as i64 => num_pages,
                Ok(n) => n as u32,
                Err(_) if is_integer(raw) => num_pages,
                Err(_) => 1,
            },
        };

        PageWindow {
            number,
            num_pages,
            count: self.count,
            limit: self.per_page as i64,
            offset: (number as i64 - 1) * self.per_page as i64,
        }
    }
}

/// An integer literal too large for `i64` is still a number, just out of range.
fn is_integer(raw: &str) -> bool {
    let digits = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// The slice of a result set one page covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u32,
    pub num_pages: u32,
    pub count: u64,
    pub limit: i64,
    pub offset: i64,
}

impl PageWindow {
    pub fn into_page<T>(self, items: Vec<T>) -> Page<T> {
        let has_next = self.number < self.num_pages;
        let has_previous = self.number > 1;
        Page {
            items,
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            has_next,
            has_previous,
            next_page_number: has_next.then_some(self.number + 1),
            previous_page_number: has_previous.then_some(self.number - 1),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u32,
    pub num_pages: u32,
    pub count: u64,
    pub has_next: bool,
    pub has_previous: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_page_number: Option<u32>,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            has_next: self.has_next,
            has_previous: self.has_previous,
            next_page_number: self.next_page_number,
            previous_page_number: self.previous_page_number,
        }
    }
}
