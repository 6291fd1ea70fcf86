use mongodb::bson::{Document, doc};

/// Sparse equality predicate over user fields; empty strings mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilters {
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub email: String,
    pub country: String,
}

impl UserFilters {
    /// Compiles the filters into a MongoDB predicate, one equality clause per
    /// non-empty field. The same document drives both the count and the find.
    ///
    /// `nickname` is accepted but not part of the predicate.
    pub fn to_document(&self) -> Document {
        let mut doc = doc! {};

        for (key, value) in [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("email", &self.email),
            ("country", &self.country),
        ] {
            if !value.is_empty() {
                doc.insert(key, value.as_str());
            }
        }

        doc
    }
}
