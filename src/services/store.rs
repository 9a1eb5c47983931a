use chrono::{DateTime, Utc};
use tracing::info;

use crate::models::book::Book;
use crate::models::responses::LookupResponse;
use crate::services::client::ClientError;
use crate::utils::text::{contains_ci, normalize_term};

pub const BOOKS_PER_PAGE: usize = 3;

pub fn matches_term(book: &Book, term: &str) -> bool {
    contains_ci(&book.title, term)
        || contains_ci(&book.author, term)
        || contains_ci(&book.publisher, term)
}

pub fn filter_books<'a>(books: &'a [Book], query: &str) -> Vec<&'a Book> {
    let term = normalize_term(query);
    books.iter().filter(|book| matches_term(book, &term)).collect()
}

pub fn total_pages(filtered_len: usize) -> usize {
    (filtered_len + BOOKS_PER_PAGE - 1) / BOOKS_PER_PAGE
}

#[derive(Debug)]
pub struct PageView<'a> {
    pub books: Vec<&'a Book>,
    pub filtered_len: usize,
    pub page: usize,
    pub total_pages: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

impl PageView<'_> {
    pub fn paged(&self) -> bool {
        self.total_pages > 1
    }
}

// Session state. The filtered view and the visible page are derived on
// read, never stored.
pub struct CatalogStore {
    books: Vec<Book>,
    query: String,
    page: usize,
    message: Option<String>,
    error: Option<String>,
    generation: u64,
    pending: Option<String>,
    loaded_at: Option<DateTime<Utc>>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self {
            books: Vec::new(),
            query: String::new(),
            page: 1,
            message: None,
            error: None,
            generation: 0,
            pending: None,
            loaded_at: None,
        }
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    pub fn load_catalog(&mut self, books: Vec<Book>) {
        info!("Catalog loaded with {} books", books.len());
        self.books = books;
        self.page = 1;
        self.loaded_at = Some(Utc::now());
    }

    pub fn set_query(&mut self, raw: &str) {
        self.query = raw.to_string();
        self.page = 1;
    }

    pub fn begin_lookup(&mut self, isbn: &str) -> u64 {
        self.generation += 1;
        self.pending = Some(isbn.to_string());
        self.message = None;
        self.error = None;
        self.generation
    }

    // A completion is applied only while its token is still the newest
    // submission; stale results are dropped by the caller.
    pub fn apply_lookup(
        &mut self,
        token: u64,
        outcome: Result<LookupResponse, ClientError>,
    ) -> bool {
        if token != self.generation {
            return false;
        }
        self.pending = None;

        match outcome {
            Ok(found) => {
                info!("Adding book {} ({})", found.data.title, found.data.isbn_13);
                self.books.insert(0, found.data);
                self.message = Some(found.message);
                self.error = None;
                self.page = 1;
            }
            Err(err) => {
                self.error = Some(err.user_message());
                self.message = None;
            }
        }
        true
    }

    pub fn filtered(&self) -> Vec<&Book> {
        filter_books(&self.books, &self.query)
    }

    pub fn current_page(&self) -> PageView<'_> {
        let filtered = self.filtered();
        let total = total_pages(filtered.len());
        let start = (self.page - 1) * BOOKS_PER_PAGE;
        let end = (start + BOOKS_PER_PAGE).min(filtered.len());
        let books = filtered
            .get(start..end)
            .map(|slice| slice.to_vec())
            .unwrap_or_default();

        PageView {
            books,
            filtered_len: filtered.len(),
            page: self.page,
            total_pages: total,
            has_prev: self.page > 1,
            has_next: self.page < total,
        }
    }

    pub fn next_page(&mut self) -> bool {
        if self.page < total_pages(self.filtered().len()) {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.page > 1 {
            self.page -= 1;
            true
        } else {
            false
        }
    }
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}
