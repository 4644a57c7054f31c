//! Catalog route handlers.
//!
//! Public pages; everything goes through the cached [`crate::services::Catalog`].

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use souk_api::ApiError;
use souk_api::types::{Category, Product};
use souk_core::ProductId;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::models::cart::MAX_QUANTITY;
use crate::state::AppState;
use crate::views::{Layout, ListPage, ListParams, list_query, load_list};

const LIST: &str = "catalog";

/// Product card in the catalog grid.
#[derive(Clone)]
pub struct ProductCard {
    pub id: ProductId,
    pub name: String,
    pub price: String,
    pub image: Option<String>,
    pub category: String,
    pub in_stock: bool,
}

impl ProductCard {
    fn new(product: Product, currency: &str) -> Self {
        Self {
            id: product.id,
            price: product.price.format(currency),
            image: product.cover().map(ToString::to_string),
            category: product.category_label(),
            in_stock: product.in_stock(),
            name: product.name,
        }
    }
}

/// Category filter option.
#[derive(Clone)]
pub struct CategoryOption {
    pub id: String,
    pub name: String,
    pub selected: bool,
}

/// Build the category dropdown, marking `selected`.
pub fn category_options(categories: Vec<Category>, selected: &str) -> Vec<CategoryOption> {
    categories
        .into_iter()
        .map(|c| {
            let id = c.id.to_string();
            CategoryOption {
                selected: id == selected,
                id,
                name: c.name,
            }
        })
        .collect()
}

/// Product detail data for templates.
#[derive(Clone)]
pub struct ProductDetail {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub stock: u32,
    pub category: String,
    pub vendor: Option<String>,
    pub images: Vec<String>,
    pub max_quantity: u32,
}

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "shop/index.html")]
pub struct CatalogTemplate {
    pub layout: Layout,
    pub list: ListPage<ProductCard>,
    pub categories: Vec<CategoryOption>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "shop/show.html")]
pub struct ProductTemplate {
    pub layout: Layout,
    pub product: ProductDetail,
}

/// Display the catalog.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<ListParams>,
) -> Result<CatalogTemplate> {
    let requested = list_query(&params, &["search", "category_id"]);
    let catalog = state.catalog();
    let view = load_list(&session, state.lists(), LIST, requested, |ticket| async move {
        let result = catalog.products(ticket.query()).await;
        (ticket, result)
    })
    .await?;

    // The dropdown is a convenience; the grid renders without it.
    let categories = catalog.categories().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load categories");
        Vec::new()
    });

    let currency = state.currency();
    let list = ListPage::from_view(view, "/products", |p| ProductCard::new(p, currency));
    let categories = category_options(categories, list.filter("category_id"));

    Ok(CatalogTemplate {
        layout: Layout::load(&session).await,
        list,
        categories,
    })
}

/// Display a product.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
) -> Result<ProductTemplate> {
    let product = match state.catalog().product(id).await {
        Ok(product) => product,
        Err(ApiError::NotFound(_)) => return Err(AppError::NotFound(format!("product {id}"))),
        Err(e) => return Err(e.into()),
    };

    let detail = ProductDetail {
        id: product.id,
        price: product.price.format(state.currency()),
        stock: product.stock,
        category: product.category_label(),
        vendor: product.vendor.as_ref().and_then(|v| v.name.clone()),
        images: product.images.iter().map(|i| i.url.clone()).collect(),
        max_quantity: product.stock.clamp(1, MAX_QUANTITY),
        description: product.description,
        name: product.name,
    };

    Ok(ProductTemplate {
        layout: Layout::load(&session).await,
        product: detail,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_category_options_mark_selected() {
        let categories: Vec<Category> = serde_json::from_str(
            r#"[{"id":1,"name":"Boissons"},{"id":2,"name":"Épices"}]"#,
        )
        .unwrap();

        let options = category_options(categories, "2");
        assert!(!options[0].selected);
        assert!(options[1].selected);
        assert_eq!(options[1].name, "Épices");
    }

    #[test]
    fn test_product_card_formats_price() {
        let product: Product = serde_json::from_str(
            r#"{"id":5,"name":"Bissap","price":"12500","stock":0,"images":["/a.jpg"]}"#,
        )
        .unwrap();

        let card = ProductCard::new(product, "FCFA");
        assert_eq!(card.price, "12\u{202f}500,00 FCFA");
        assert!(!card.in_stock);
        assert_eq!(card.image.as_deref(), Some("/a.jpg"));
    }
}
