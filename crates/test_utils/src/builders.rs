//! Test Data Builders
//!
//! Builders for books and members. Tests set only the fields they care
//! about; everything else gets a valid default, or a random value from
//! `fake` when built with `random()`.

use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::Words;
use fake::faker::name::en::Name;
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;

use domain_circulation::{Book, Member, NewBook, NewMember};

/// Builder for catalog entries
#[derive(Debug, Clone)]
pub struct BookBuilder {
    title: String,
    author: String,
    isbn: String,
    copies_total: i32,
    copies_available: i32,
}

impl Default for BookBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BookBuilder {
    /// One copy of a fixed title
    pub fn new() -> Self {
        Self {
            title: "The Left Hand of Darkness".to_string(),
            author: "Ursula K. Le Guin".to_string(),
            isbn: "9780441478125".to_string(),
            copies_total: 1,
            copies_available: 1,
        }
    }

    /// Random title and author, one copy
    pub fn random() -> Self {
        let words: Vec<String> = Words(2..5).fake();
        Self {
            title: words.join(" "),
            author: Name().fake(),
            isbn: format!("978{:010}", (0u64..10_000_000_000).fake::<u64>()),
            ..Self::new()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_isbn(mut self, isbn: impl Into<String>) -> Self {
        self.isbn = isbn.into();
        self
    }

    /// Sets total and available copies to `copies`
    pub fn with_copies(mut self, copies: i32) -> Self {
        self.copies_total = copies;
        self.copies_available = copies;
        self
    }

    /// Sets available copies only
    pub fn with_available(mut self, available: i32) -> Self {
        self.copies_available = available;
        self
    }

    /// Builds the add-book request
    pub fn build_new(self) -> NewBook {
        NewBook::new(
            self.title,
            self.author,
            self.isbn,
            self.copies_total,
            self.copies_available,
        )
    }

    /// Builds a stored-shape record
    ///
    /// # Panics
    ///
    /// Panics if the builder holds invalid counts or an empty title.
    pub fn build(self) -> Book {
        Book::create(self.build_new()).expect("BookBuilder produced an invalid book")
    }
}

/// Builder for library members
#[derive(Debug, Clone)]
pub struct MemberBuilder {
    name: String,
    email: String,
    phone: Option<String>,
}

impl Default for MemberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MemberBuilder {
    pub fn new() -> Self {
        Self {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.org".to_string(),
            phone: None,
        }
    }

    /// Random name, email, and phone
    pub fn random() -> Self {
        Self {
            name: Name().fake(),
            email: SafeEmail().fake(),
            phone: Some(PhoneNumber().fake()),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn build_new(self) -> NewMember {
        let new = NewMember::new(self.name, self.email);
        match self.phone {
            Some(phone) => new.with_phone(phone),
            None => new,
        }
    }

    /// # Panics
    ///
    /// Panics if the builder holds an empty name or a malformed email.
    pub fn build(self) -> Member {
        Member::create(self.build_new()).expect("MemberBuilder produced an invalid member")
    }
}
