use serde::ser::{Serialize, SerializeMap, Serializer};

pub const COMMENT_KEY: &str = "comment";
pub const SIMILAR_ITEMS_KEY: &str = "similar_items";

/// Price snippet of a comparable listing.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SimilarItem {
    pub price: String,
}

/// Details scraped from a listing's HTML page.
///
/// `fields` keeps price-table rows in first-seen order; re-inserting a label
/// replaces its value in place. Serializes to one flat object: the table
/// labels, then `comment` if present, then `similar_items`. `similar_items`
/// is `None` only when there was no HTML to parse at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailMapping {
    fields: Vec<(String, String)>,
    pub comment: Option<String>,
    pub similar_items: Option<Vec<SimilarItem>>,
}

impl DetailMapping {
    pub fn insert(&mut self, label: String, value: String) {
        match self.fields.iter_mut().find(|(existing, _)| *existing == label) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((label, value)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == label)
            .map(|(_, value)| value.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn similar_items(&self) -> &[SimilarItem] {
        self.similar_items.as_deref().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.comment.is_none() && self.similar_items.is_none()
    }
}

impl Serialize for DetailMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // A table row labelled "comment" or "similar_items" is shadowed by the
        // dedicated entries written after it.
        let table: Vec<_> = self
            .fields
            .iter()
            .filter(|(label, _)| {
                label != SIMILAR_ITEMS_KEY && !(label == COMMENT_KEY && self.comment.is_some())
            })
            .collect();

        let len = table.len()
            + usize::from(self.comment.is_some())
            + usize::from(self.similar_items.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for (label, value) in table {
            map.serialize_entry(label, value)?;
        }
        if let Some(comment) = &self.comment {
            map.serialize_entry(COMMENT_KEY, comment)?;
        }
        if let Some(similar_items) = &self.similar_items {
            map.serialize_entry(SIMILAR_ITEMS_KEY, similar_items)?;
        }
        map.end()
    }
}
