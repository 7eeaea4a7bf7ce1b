//! Paging and sorting.
//!
//! Pages are zero-based. `totalPages` is `ceil(total / size)`, so an empty
//! result has zero pages.

use sea_orm::{QueryOrder, QuerySelect, Select};
use serde::{Deserialize, Serialize};

use common::{AppError, AppResult};
use domain::DEFAULT_PAGE_SIZE;

use crate::entity::{entity_name, Persistable};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// Parse `asc` / `desc`, ignoring case
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("asc") {
            Some(Direction::Asc)
        } else if value.eq_ignore_ascii_case("desc") {
            Some(Direction::Desc)
        } else {
            None
        }
    }

    pub fn is_descending(&self) -> bool {
        matches!(self, Direction::Desc)
    }
}

impl From<Direction> for sea_orm::Order {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Asc => sea_orm::Order::Asc,
            Direction::Desc => sea_orm::Order::Desc,
        }
    }
}

/// One sort key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub property: String,
    pub direction: Direction,
}

impl Order {
    pub fn asc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: Direction::Desc,
        }
    }
}

/// Sort keys, applied in declared order.
///
/// Rows that compare equal on every key come back in no particular order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    orders: Vec<Order>,
}

impl Sort {
    pub fn unsorted() -> Self {
        Self::default()
    }

    /// Sort by `properties`, all in `direction`
    pub fn by(direction: Direction, properties: &[&str]) -> Self {
        Self {
            orders: properties
                .iter()
                .map(|property| Order {
                    property: (*property).to_string(),
                    direction,
                })
                .collect(),
        }
    }

    pub fn from_orders(orders: Vec<Order>) -> Self {
        Self { orders }
    }

    /// Append the keys of `other`
    pub fn and(mut self, other: Sort) -> Self {
        self.orders.extend(other.orders);
        self
    }

    /// Parse a web sort parameter: `username`, `username,desc`, `age,username,asc`.
    ///
    /// A trailing `asc`/`desc` applies to every listed property.
    pub fn parse(param: &str) -> AppResult<Self> {
        let mut parts: Vec<&str> = param
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();

        let direction = match parts.last().and_then(|last| Direction::parse(last)) {
            Some(direction) => {
                parts.pop();
                direction
            }
            None => Direction::Asc,
        };

        if parts.is_empty() {
            return Err(AppError::invalid_query(format!(
                "Sort parameter '{}' names no property",
                param
            )));
        }

        Ok(Self::by(direction, &parts))
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn is_sorted(&self) -> bool {
        !self.orders.is_empty()
    }
}

/// Apply `sort` to `select`; unknown properties are rejected
pub(crate) fn apply_sort<E: Persistable>(mut select: Select<E>, sort: &Sort) -> AppResult<Select<E>> {
    for order in sort.orders() {
        let column = E::sort_column(&order.property).ok_or_else(|| {
            AppError::invalid_query(format!(
                "No property '{}' found for type '{}'",
                order.property,
                entity_name::<E>()
            ))
        })?;
        select = select.order_by(column, order.direction.into());
    }
    Ok(select)
}

/// Offset / size / sort request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PageRequestFields")]
pub struct PageRequest {
    page: u64,
    size: u64,
    sort: Sort,
}

/// Wire form of `PageRequest`; deserialization goes through `of_sorted`
#[derive(Deserialize)]
struct PageRequestFields {
    page: u64,
    size: u64,
    #[serde(default)]
    sort: Sort,
}

impl From<PageRequestFields> for PageRequest {
    fn from(fields: PageRequestFields) -> Self {
        Self::of_sorted(fields.page, fields.size, fields.sort)
    }
}

impl PageRequest {
    /// Page `page` (zero-based) of `size` rows; a size of zero is raised to one
    pub fn of(page: u64, size: u64) -> Self {
        Self::of_sorted(page, size, Sort::unsorted())
    }

    pub fn of_sorted(page: u64, size: u64, sort: Sort) -> Self {
        Self {
            page,
            size: size.max(1),
            sort,
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn sort(&self) -> &Sort {
        &self.sort
    }

    /// Rows skipped before this page.
    ///
    /// Fails when `page * size` does not fit a SQL offset.
    pub fn offset(&self) -> AppResult<u64> {
        self.page
            .checked_mul(self.size)
            .filter(|offset| *offset <= i64::MAX as u64)
            .ok_or_else(|| {
                AppError::invalid_query(format!("Page {} of size {} is out of range", self.page, self.size))
            })
    }

    pub fn next(&self) -> Self {
        Self::of_sorted(self.page.saturating_add(1), self.size, self.sort.clone())
    }

    pub fn previous_or_first(&self) -> Self {
        Self::of_sorted(self.page.saturating_sub(1), self.size, self.sort.clone())
    }

    /// Sort, offset and limit `select`
    pub(crate) fn apply<E: Persistable>(&self, select: Select<E>) -> AppResult<Select<E>> {
        let offset = self.offset()?;
        Ok(apply_sort(select, &self.sort)?.offset(offset).limit(self.size))
    }

    /// Total derivable from the fetched content alone, without a count query.
    ///
    /// Possible on the first page when it is not full, and on any later page
    /// that is non-empty and not full.
    pub(crate) fn total_from_content(&self, content_len: usize) -> Option<u64> {
        let len = content_len as u64;
        if self.page == 0 {
            (len < self.size).then_some(len)
        } else if len != 0 && len < self.size {
            self.offset().ok()?.checked_add(len)
        } else {
            None
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::of(0, DEFAULT_PAGE_SIZE)
    }
}

/// One page of results plus totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub number: u64,
    pub size: u64,
    pub first: bool,
    pub last: bool,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        let size = request.size().max(1);
        let number = request.page();
        let total_pages = total_elements.div_ceil(size);
        let has_next = number.checked_add(1).is_some_and(|next| next < total_pages);

        Self {
            content,
            total_elements,
            total_pages,
            number,
            size,
            first: number == 0,
            last: !has_next,
            has_next,
            has_previous: number > 0,
        }
    }

    /// Number of rows on this page
    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Convert the content, keeping the totals
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            number: self.number,
            size: self.size,
            first: self.first,
            last: self.last,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}
