//! Records produced at each level of the crawl
//!
//! A crawl discovers [`City`] values from the index pages, [`Category`] values
//! for each city and [`DetailRecord`] values for each category page. The three
//! levels are joined into an [`OutputRow`], the only record that is persisted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// A city found on a city index page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct City {
    /// Display name of the city
    pub name: String,

    /// Absolute URL of the city's sight overview page
    pub index_url: String,
}

/// A sight category of one city
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Category label as shown in the city's menu
    pub label: String,

    /// Absolute URL of the first page of the category's listing
    pub listing_url: String,
}

impl Category {
    /// URL of the given listing page (1-based)
    ///
    /// The site serves `.../s3.html` as the category landing page and
    /// `.../s3-p2.html` for the numbered pages.
    pub fn page_url(&self, page: u32) -> String {
        let stem = self
            .listing_url
            .strip_suffix(".html")
            .unwrap_or(&self.listing_url);
        format!("{}-p{}.html", stem, page)
    }
}

/// A single sight entry on a category listing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailRecord {
    pub name: String,
    pub address: String,
    pub score: String,
}

/// One flattened row of output: city x category x sight
///
/// Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRow {
    pub city: String,
    pub category: String,
    pub name: String,
    pub address: String,
    pub score: String,
}

impl OutputRow {
    /// Column names, in the order rows are written
    pub const HEADER: [&'static str; 5] = ["city", "category", "name", "address", "score"];

    /// Joins the three levels of the crawl into one row
    pub fn join(city: &City, category: &Category, record: DetailRecord) -> Self {
        Self {
            city: city.name.clone(),
            category: category.label.clone(),
            name: record.name,
            address: record.address,
            score: record.score,
        }
    }
}

/// Inclusive range of city index page numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Page numbers covered by the range; empty when `start > end`
    pub fn pages(&self) -> RangeInclusive<u32> {
        self.start..=self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

impl Default for PageRange {
    fn default() -> Self {
        Self { start: 1, end: 10 }
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
