//! HTML extraction for the three page kinds of the crawl
//!
//! This module turns page markup into records:
//! - City index pages into [`City`] values
//! - A city's sight overview into its [`Category`] values
//! - A category listing page into [`DetailRecord`] values and the page count
//!
//! Extraction never fails on content: a selector that matches nothing yields
//! an empty result.

use crate::model::{Category, City, DetailRecord};
use crate::SightError;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Records found on one category listing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailPage {
    /// Sights in on-page order
    pub records: Vec<DetailRecord>,

    /// Number of listing pages the category has (at least 1)
    pub page_count: u32,
}

/// Compiled selectors for the listing site's markup
#[derive(Debug)]
pub struct ListingExtractor {
    origin: Url,
    city_block: Selector,
    city_name: Selector,
    city_links: Selector,
    anchor: Selector,
    category_link: Selector,
    category_id: Regex,
    detail_block: Selector,
    detail_name: Selector,
    detail_address: Selector,
    detail_score: Selector,
    page_count: Selector,
}

impl ListingExtractor {
    /// Creates an extractor resolving city links against `base_url`
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> Result<Self, SightError> {
        Ok(Self {
            origin: Url::parse(base_url)?,
            city_block: selector(".list_mod1 > dl")?,
            city_name: selector("dt > a")?,
            city_links: selector("dd")?,
            anchor: selector("a")?,
            category_link: selector(".search_wide > ul > li > dl > dd > a")?,
            category_id: Regex::new(r"[0-9]+")?,
            detail_block: selector(".rdetailbox")?,
            detail_name: selector("dl > dt > a")?,
            detail_address: selector("dl > dd.ellipsis")?,
            detail_score: selector("ul.r_comment > li > a.score > strong")?,
            page_count: selector(".numpage")?,
        })
    }

    /// Extracts the cities listed on a city index page
    ///
    /// The city name comes from the block's `dt > a`; its URL from the first
    /// link inside the block's second `dd`. Blocks without that link are
    /// skipped.
    pub fn extract_cities(&self, page: &str) -> Vec<City> {
        let document = Html::parse_document(page);

        document
            .select(&self.city_block)
            .filter_map(|block| {
                let href = block
                    .select(&self.city_links)
                    .nth(1)?
                    .select(&self.anchor)
                    .next()?
                    .value()
                    .attr("href")?;
                let index_url = self.origin.join(href.trim()).ok()?;

                Some(City {
                    name: text_of(block, &self.city_name),
                    index_url: index_url.to_string(),
                })
            })
            .collect()
    }

    /// Extracts the sight categories from a city's overview page
    ///
    /// Each menu anchor carries its category id in an `onclick` handler; the
    /// listing URL is `{city_url without .html}/s{id}.html`. Anchors without an
    /// id are skipped.
    pub fn extract_categories(&self, page: &str, city_url: &str) -> Vec<Category> {
        let document = Html::parse_document(page);
        let stem = city_url.strip_suffix(".html").unwrap_or(city_url);

        document
            .select(&self.category_link)
            .filter_map(|anchor| {
                let onclick = anchor.value().attr("onclick")?;
                let id = self.category_id.find(onclick)?.as_str();

                Some(Category {
                    label: collapse_text(anchor),
                    listing_url: format!("{}/s{}.html", stem, id),
                })
            })
            .collect()
    }

    /// Extracts the sights and the page count from a category listing page
    ///
    /// A missing, empty or non-numeric page indicator means a single page.
    pub fn extract_detail_page(&self, page: &str) -> DetailPage {
        let document = Html::parse_document(page);

        let records = document
            .select(&self.detail_block)
            .map(|block| DetailRecord {
                name: text_of(block, &self.detail_name),
                address: text_of(block, &self.detail_address),
                score: text_of(block, &self.detail_score),
            })
            .collect();

        let page_count = document
            .select(&self.page_count)
            .next()
            .and_then(|el| collapse_text(el).parse::<u32>().ok())
            .filter(|&count| count > 0)
            .unwrap_or(1);

        DetailPage {
            records,
            page_count,
        }
    }
}

fn selector(css: &str) -> Result<Selector, SightError> {
    Selector::parse(css).map_err(|e| SightError::Selector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

/// Text of every element under `scope` matching `selector`, joined by a space
fn text_of(scope: ElementRef<'_>, selector: &Selector) -> String {
    scope
        .select(selector)
        .map(collapse_text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Element text with runs of whitespace collapsed to one space
fn collapse_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
