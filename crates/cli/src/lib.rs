//! Client side of the bookstore: API calls, the purchase simulation, and
//! plain-text rendering used by the `bookstore-cli` binary.

pub mod client;

use futures::future::join_all;

use bookstore_db::Book;

use client::{ApiClient, ClientError};

/// Outcome of firing several purchases at one book at the same moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseSummary {
    pub succeeded: usize,
    pub out_of_stock: usize,
    pub other_failures: Vec<String>,
    pub final_stock: u32,
}

/// Send `concurrency` purchase requests for `id` at once, then read back the stock.
pub async fn simulate_purchases(
    client: &ApiClient,
    id: &str,
    concurrency: usize,
) -> Result<PurchaseSummary, ClientError> {
    let attempts = (0..concurrency).map(|_| client.purchase(id));
    let mut summary = PurchaseSummary {
        succeeded: 0,
        out_of_stock: 0,
        other_failures: Vec::new(),
        final_stock: 0,
    };

    for outcome in join_all(attempts).await {
        match outcome {
            Ok(_) => summary.succeeded += 1,
            Err(err) if err.is_out_of_stock() => summary.out_of_stock += 1,
            Err(err) => summary.other_failures.push(err.to_string()),
        }
    }

    summary.final_stock = client.get(id).await?.stock;
    Ok(summary)
}

pub fn render_book(book: &Book) -> String {
    format!(
        "{}\n  Title: {}\n  Author: {}\n  Price: ${:.2}\n  Stock: {}",
        book.id, book.title, book.author, book.price, book.stock
    )
}

pub fn render_books(books: &[Book]) -> String {
    if books.is_empty() {
        return "No books found".to_string();
    }

    let mut out = String::from("Books:");
    for book in books {
        out.push('\n');
        out.push_str(&render_book(book));
    }
    out
}

pub fn render_summary(summary: &PurchaseSummary) -> String {
    let mut out = format!(
        "Succeeded: {}\nOut of stock: {}\nFinal stock: {}",
        summary.succeeded, summary.out_of_stock, summary.final_stock
    );
    for failure in &summary.other_failures {
        out.push_str("\nFailed: ");
        out.push_str(failure);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookstore_db::{BookId, NewBook};

    fn book(title: &str, price: f64, stock: i64) -> Book {
        NewBook::new(title, "Frank Herbert", price, stock)
            .unwrap()
            .into_book(BookId::generate())
    }

    #[test]
    fn empty_list_renders_placeholder() {
        assert_eq!(render_books(&[]), "No books found");
    }

    #[test]
    fn book_renders_every_field() {
        let dune = book("Dune", 10.5, 3);
        let rendered = render_book(&dune);

        assert!(rendered.starts_with(&dune.id.to_string()));
        assert!(rendered.contains("Title: Dune"));
        assert!(rendered.contains("Author: Frank Herbert"));
        assert!(rendered.contains("Price: $10.50"));
        assert!(rendered.contains("Stock: 3"));
    }

    #[test]
    fn list_renders_each_book() {
        let rendered = render_books(&[book("Dune", 1.0, 1), book("Emma", 2.0, 0)]);
        assert!(rendered.starts_with("Books:"));
        assert!(rendered.contains("Title: Dune"));
        assert!(rendered.contains("Title: Emma"));
    }

    #[test]
    fn summary_lists_unexpected_failures() {
        let summary = PurchaseSummary {
            succeeded: 3,
            out_of_stock: 2,
            other_failures: vec!["request failed: timeout".to_string()],
            final_stock: 0,
        };

        assert_eq!(
            render_summary(&summary),
            "Succeeded: 3\nOut of stock: 2\nFinal stock: 0\nFailed: request failed: timeout"
        );
    }
}
