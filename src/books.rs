//! The book record and its in-memory store.

use parking_lot::RwLock;
use serde::Serialize;

/// A single book. Serializes as `{"id":..,"author":..,"title":..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
    pub id: String,
    pub author: String,
    pub title: String,
}

impl Book {
    pub fn new(id: impl Into<String>, author: impl Into<String>, title: impl Into<String>) -> Self {
        Self { id: id.into(), author: author.into(), title: title.into() }
    }
}

/// Ordered, append-only collection of books shared by all requests.
///
/// Records are never edited or removed. [`append`](Self::append) does not
/// check ids; [`insert_if_absent`](Self::insert_if_absent) does.
#[derive(Debug, Default)]
pub struct BookStore {
    books: RwLock<Vec<Book>>,
}

impl BookStore {
    pub fn new(books: Vec<Book>) -> Self {
        Self { books: RwLock::new(books) }
    }

    /// The three records every process starts with.
    pub fn seeded() -> Self {
        Self::new(vec![
            Book::new("1", "Robin Wieruch", "The Road to React"),
            Book::new("2", "Kyle Simpson", "You Don't Know JS: Scope & Closures"),
            Book::new("3", "Andreas A. Antonopoulos", "Mastering Bitcoin"),
        ])
    }

    /// First record whose id equals `id`, in insertion order.
    pub fn find_by_id(&self, id: &str) -> Option<Book> {
        self.books.read().iter().find(|book| book.id == id).cloned()
    }

    pub fn append(&self, book: Book) {
        self.books.write().push(book);
    }

    /// Appends `book` unless a record with its id exists. The check and the
    /// push happen under one write lock. Returns whether it was added.
    pub fn insert_if_absent(&self, book: Book) -> bool {
        let mut books = self.books.write();
        if books.iter().any(|existing| existing.id == book.id) {
            return false;
        }
        books.push(book);
        true
    }

    pub fn len(&self) -> usize {
        self.books.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("1", "Robin Wieruch", "The Road to React")]
    #[case("2", "Kyle Simpson", "You Don't Know JS: Scope & Closures")]
    #[case("3", "Andreas A. Antonopoulos", "Mastering Bitcoin")]
    fn seeded_store_finds_each_record(#[case] id: &str, #[case] author: &str, #[case] title: &str) {
        let store = BookStore::seeded();
        assert_eq!(store.find_by_id(id), Some(Book::new(id, author, title)));
    }

    #[rstest]
    #[case("4")]
    #[case("")]
    #[case(" 1")]
    fn unknown_ids_are_absent(#[case] id: &str) {
        assert_eq!(BookStore::seeded().find_by_id(id), None);
    }

    #[test]
    fn append_is_visible_to_lookups() {
        let store = BookStore::seeded();
        store.append(Book::new("5", "Robin Wieruch", "The Road to React"));

        assert_eq!(store.len(), 4);
        assert_eq!(store.find_by_id("5").map(|b| b.title), Some("The Road to React".to_owned()));
    }

    #[test]
    fn duplicate_ids_resolve_to_the_first_record() {
        let store = BookStore::default();
        assert!(store.is_empty());

        store.append(Book::new("1", "first", "a"));
        store.append(Book::new("1", "second", "b"));
        assert_eq!(store.find_by_id("1").map(|b| b.author), Some("first".to_owned()));
    }

    #[test]
    fn insert_if_absent_refuses_known_ids() {
        let store = BookStore::seeded();

        assert!(!store.insert_if_absent(Book::new("1", "someone else", "another title")));
        assert!(store.insert_if_absent(Book::new("5", "Robin Wieruch", "The Road to React")));
        assert!(!store.insert_if_absent(Book::new("5", "Robin Wieruch", "The Road to React")));

        assert_eq!(store.len(), 4);
        assert_eq!(store.find_by_id("1").map(|b| b.author), Some("Robin Wieruch".to_owned()));
    }

    #[test]
    fn serializes_fields_in_declared_order() {
        let json = serde_json::to_string(&Book::new("1", "Robin Wieruch", "The Road to React"))
            .expect("serialize");
        assert_eq!(json, r#"{"id":"1","author":"Robin Wieruch","title":"The Road to React"}"#);
    }
}
