use serde::{Deserialize, Serialize};

use kulinastra_core::{DomainError, DomainResult, Entity, ProductId};

/// Known catalog categories (the fixed vocabulary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Manis,
    Gurih,
    Nabati,
    Hewani,
    Jajan,
    MakananBerat,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Manis,
        Category::Gurih,
        Category::Nabati,
        Category::Hewani,
        Category::Jajan,
        Category::MakananBerat,
    ];

    /// Tag as it appears in catalog data and on checkbox values.
    pub fn tag(self) -> &'static str {
        match self {
            Category::Manis => "manis",
            Category::Gurih => "gurih",
            Category::Nabati => "nabati",
            Category::Hewani => "hewani",
            Category::Jajan => "jajan",
            Category::MakananBerat => "makanan-berat",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Category::Manis => "Manis",
            Category::Gurih => "Gurih",
            Category::Nabati => "Nabati",
            Category::Hewani => "Hewani",
            Category::Jajan => "Jajan",
            Category::MakananBerat => "Makanan Berat",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.tag() == tag)
    }
}

/// A category tag as stored on a product or checkbox.
///
/// Tags outside the vocabulary are kept verbatim: they display as-is and
/// never resolve to a `Category`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTag(String);

impl CategoryTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn category(&self) -> Option<Category> {
        Category::from_tag(&self.0)
    }

    /// Human label ("Makanan Berat" for `makanan-berat`, verbatim otherwise).
    pub fn display_name(&self) -> &str {
        match self.category() {
            Some(category) => category.display_name(),
            None => &self.0,
        }
    }
}

impl From<Category> for CategoryTag {
    fn from(value: Category) -> Self {
        Self(value.tag().to_string())
    }
}

impl From<&str> for CategoryTag {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl core::fmt::Display for CategoryTag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A catalog product, read-only to the filter engine.
///
/// Matches the catalog JSON entries; unknown fields (e.g. `comments`) are
/// ignored on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Price in rupiah.
    pub price: f64,
    /// Star rating, 1..=5.
    pub rating: u8,
    #[serde(default)]
    pub categories: Vec<CategoryTag>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Product {
    pub fn has_category(&self, tag: &CategoryTag) -> bool {
        self.categories.iter().any(|c| c == tag)
    }

    /// Check the catalog invariants for a single product.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation(format!(
                "product {}: name cannot be empty",
                self.id
            )));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(DomainError::validation(format!(
                "product {}: price must be a non-negative number",
                self.id
            )));
        }
        if !(1..=5).contains(&self.rating) {
            return Err(DomainError::validation(format!(
                "product {}: rating must be 1..=5 (got {})",
                self.id, self.rating
            )));
        }
        Ok(())
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
