use serde::{Deserialize, Serialize};

/// A book record in the `books` collection. The store assigns the identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Title of the book
    pub title: String,
    /// Author or authors of the book
    pub author: String,
    /// Free-form description, may span several lines
    pub description: String,
    /// Unit price
    pub price: f64,
    /// Copies in stock
    pub stock: u32,
}

impl Book {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        description: impl Into<String>,
        price: f64,
        stock: u32,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            description: description.into(),
            price,
            stock,
        }
    }
}

/// The records inserted by a seed run, in insertion order.
pub fn seed_books() -> Vec<Book> {
    vec![
        Book::new(
            "Learning Python",
            "John Smith",
            "An in-depth guide to Python programming.",
            3.00,
            7,
        ),
        Book::new(
            "JavaScript - The Good Parts",
            "Jane Doe",
            "Unearthing the excellence in JavaScript.",
            3.00,
            15,
        ),
        Book::new(
            "Domain-Driven Design: Tackling Complexity in the Heart of Software",
            "Eric Evans",
            concat!(
                "The book is a little more technical and challenging than the others,\n",
                "                  but if you get familiar with these concepts, you\u{2019}ll be very well off\n",
                "                  in understanding how today\u{2019}s largest companies keep their code bases\n",
                "                  manageable and scalable.",
            ),
            3.00,
            15,
        ),
        Book::new(
            "Design Patterns: Elements of Reusable Object-Oriented Software",
            "Erich Gamma, Richard Helm, Ralph Johnson, & John Vlissides",
            "Useminal book on Design Patterns.",
            3.00,
            15,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_records_in_fixed_order() {
        let titles: Vec<_> = seed_books().into_iter().map(|b| b.title).collect();
        assert_eq!(
            titles,
            [
                "Learning Python",
                "JavaScript - The Good Parts",
                "Domain-Driven Design: Tackling Complexity in the Heart of Software",
                "Design Patterns: Elements of Reusable Object-Oriented Software",
            ]
        );
    }

    #[test]
    fn prices_and_stock_match_catalog() {
        let books = seed_books();
        assert!(books.iter().all(|b| b.price == 3.0));
        let stock: Vec<_> = books.iter().map(|b| b.stock).collect();
        assert_eq!(stock, [7, 15, 15, 15]);
    }

    #[test]
    fn multi_line_description_keeps_layout() {
        let ddd = &seed_books()[2];
        assert_eq!(ddd.description.lines().count(), 4);
        assert!(ddd.description.contains("you\u{2019}ll be very well off"));
        assert!(ddd
            .description
            .lines()
            .skip(1)
            .all(|line| line.starts_with("                  ") && !line.starts_with("                   ")));
    }

    #[test]
    fn serializes_without_identifier() {
        let value = serde_json::to_value(&seed_books()[0]).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("_id"));
        assert_eq!(object["stock"], 7);
        assert_eq!(object["price"].as_f64(), Some(3.0));
    }

    #[test]
    fn deserializes_store_documents_with_identifier() {
        let stored = serde_json::json!({
            "_id": { "$oid": "65f0c0ffee0000000000cafe" },
            "title": "Learning Python",
            "author": "John Smith",
            "description": "An in-depth guide to Python programming.",
            "price": 3.0,
            "stock": 7
        });
        let book: Book = serde_json::from_value(stored).unwrap();
        assert_eq!(book, seed_books()[0]);
    }
}
