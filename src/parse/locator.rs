//! Table location strategies.
//!
//! The row walker never searches for its table itself; it asks a `TableLocator`.
//! Neither strategy falls back to the other: if the page layout shifts so the
//! configured locator no longer matches, extraction fails with `TableNotFound`.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::config::LocatorConfig;
use crate::error_handling::ExtractionError;
use crate::utils::parse_selector_unsafe;

static TABLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("table", "TABLE_SELECTOR"));

static CAPTION_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("caption", "CAPTION_SELECTOR"));

static HEADING_OR_TABLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    parse_selector_unsafe("h1, h2, h3, h4, h5, h6, table", "HEADING_OR_TABLE_SELECTOR")
});

/// Finds the target table in a parsed document.
pub trait TableLocator {
    /// Returns the table element, or `TableNotFound`.
    fn locate<'a>(&self, document: &'a Html) -> Result<ElementRef<'a>, ExtractionError>;

    /// Human-readable description used in errors and logs.
    fn describe(&self) -> String;

    fn not_found(&self, document: &Html) -> ExtractionError {
        ExtractionError::TableNotFound {
            locator: self.describe(),
            tables_found: document.select(&TABLE_SELECTOR).count(),
        }
    }
}

/// Selects the k-th `<table>` in document order, nested tables included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexLocator(pub usize);

impl TableLocator for IndexLocator {
    fn locate<'a>(&self, document: &'a Html) -> Result<ElementRef<'a>, ExtractionError> {
        document
            .select(&TABLE_SELECTOR)
            .nth(self.0)
            .ok_or_else(|| self.not_found(document))
    }

    fn describe(&self) -> String {
        format!("table index {}", self.0)
    }
}

/// Selects a table by caption text, or the first table after a matching heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingLocator {
    text: String,
}

impl HeadingLocator {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    fn matches(&self, element: ElementRef<'_>) -> bool {
        element.text().collect::<String>().contains(&self.text)
    }
}

impl TableLocator for HeadingLocator {
    fn locate<'a>(&self, document: &'a Html) -> Result<ElementRef<'a>, ExtractionError> {
        let captioned = document.select(&TABLE_SELECTOR).find(|table| {
            table
                .select(&CAPTION_SELECTOR)
                .next()
                .is_some_and(|caption| self.matches(caption))
        });
        if let Some(table) = captioned {
            return Ok(table);
        }

        let mut heading_seen = false;
        for element in document.select(&HEADING_OR_TABLE_SELECTOR) {
            if element.value().name() == "table" {
                if heading_seen {
                    return Ok(element);
                }
            } else if self.matches(element) {
                heading_seen = true;
            }
        }
        Err(self.not_found(document))
    }

    fn describe(&self) -> String {
        format!("table under heading {:?}", self.text)
    }
}

/// Builds the locator a configuration asks for.
pub fn locator_from_config(config: &LocatorConfig) -> Box<dyn TableLocator> {
    match config {
        LocatorConfig::Index(index) => Box::new(IndexLocator(*index)),
        LocatorConfig::Heading(text) => Box::new(HeadingLocator::new(text.clone())),
    }
}
