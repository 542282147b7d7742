//! # Book Catalog
//!
//! Books available for purchase, loaded from TOML:
//!
//! ```toml
//! [[books]]
//! isbn13 = "9780131103627"
//! title = "The C Programming Language"
//! author = "Kernighan & Ritchie"
//! price = 6799
//! ```

use crate::error::{CheckoutError, CheckoutResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A book in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// ISBN-13, the catalog key
    pub isbn13: String,

    pub title: String,

    pub author: String,

    /// Price in cents
    pub price: u64,

    /// ISO currency code understood by the provider
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Whether the book can be bought
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_currency() -> String {
    "usd".to_string()
}

fn default_true() -> bool {
    true
}

impl Book {
    pub fn new(
        isbn13: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        price: u64,
    ) -> Self {
        Self {
            isbn13: isbn13.into(),
            title: title.into(),
            author: author.into(),
            price,
            currency: default_currency(),
            active: true,
        }
    }

    /// Price as `dollars.cents`, e.g. `12.05`
    pub fn price_display(&self) -> String {
        format!("{}.{:02}", self.price / 100, self.price % 100)
    }
}

/// Book catalog (loaded from config)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookCatalog {
    #[serde(default)]
    pub books: Vec<Book>,
}

impl BookCatalog {
    pub fn new() -> Self {
        Self { books: Vec::new() }
    }

    pub fn add(&mut self, book: Book) {
        self.books.push(book);
    }

    /// Builder: add a book
    pub fn with_book(mut self, book: Book) -> Self {
        self.add(book);
        self
    }

    /// Find a book by ISBN-13
    pub fn get(&self, isbn: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.isbn13 == isbn)
    }

    /// Books available for purchase
    pub fn active_books(&self) -> impl Iterator<Item = &Book> {
        self.books.iter().filter(|b| b.active)
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Load catalog from TOML string; ISBNs must be unique
    pub fn from_toml(toml_str: &str) -> CheckoutResult<Self> {
        let catalog: Self = toml::from_str(toml_str)
            .map_err(|e| CheckoutError::Configuration(format!("Invalid book catalog: {}", e)))?;

        let mut seen = HashSet::new();
        for book in &catalog.books {
            if !seen.insert(book.isbn13.as_str()) {
                return Err(CheckoutError::Configuration(format!(
                    "Duplicate ISBN in book catalog: {}",
                    book.isbn13
                )));
            }
        }
        Ok(catalog)
    }
}
