use serde::{Deserialize, Serialize};
use souk_core::{CategoryId, Money, ProductId, VendorId};

use super::Party;

/// Catalog category.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub products_count: Option<u64>,
}

/// Product image, sent either as a bare URL or as `{ "url": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawImage")]
pub struct ProductImage {
    pub url: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawImage {
    Url(String),
    Object {
        #[serde(alias = "path", alias = "image_url")]
        url: String,
    },
}

impl From<RawImage> for ProductImage {
    fn from(raw: RawImage) -> Self {
        match raw {
            RawImage::Url(url) | RawImage::Object { url } => Self { url },
        }
    }
}

/// Catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Money,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub vendor_id: Option<VendorId>,
    #[serde(default)]
    pub vendor: Option<Party>,
}

impl Product {
    /// First image, used for thumbnails.
    #[must_use]
    pub fn cover(&self) -> Option<&str> {
        self.images.first().map(|i| i.url.as_str())
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Category name, `#id` when only the key is known.
    #[must_use]
    pub fn category_label(&self) -> String {
        match (&self.category, self.category_id) {
            (Some(c), _) => c.name.clone(),
            (None, Some(id)) => format!("#{id}"),
            (None, None) => super::MISSING.to_string(),
        }
    }
}

/// Fields of a product create/update form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: Money,
    pub stock: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
}

/// Fields of a category create/update form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An image file ready for multipart upload.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_images_accept_both_shapes() {
        let product: Product = serde_json::from_str(
            r#"{"id":1,"name":"Bissap","price":"1500.00","stock":4,
                "images":["/storage/a.jpg",{"url":"/storage/b.jpg"}]}"#,
        )
        .unwrap();
        assert_eq!(product.cover(), Some("/storage/a.jpg"));
        assert_eq!(product.images.len(), 2);
        assert!(product.in_stock());
    }

    #[test]
    fn test_category_label_fallback() {
        let product: Product =
            serde_json::from_str(r#"{"id":1,"name":"Bissap","price":1500,"category_id":9}"#)
                .unwrap();
        assert_eq!(product.category_label(), "#9");
        assert!(!product.in_stock());
    }
}
