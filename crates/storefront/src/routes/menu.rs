//! Menu route handlers.
//!
//! The menu is the landing page: everything the platform currently offers,
//! grouped by category, each card carrying an HTMX add-to-cart form.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use tracing::instrument;

use crate::filters;
use crate::middleware::auth::OptionalClient;
use crate::platform::types::Product;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image_url: Option<String>,
}

/// A menu section, one per product category.
pub struct MenuSection {
    pub title: String,
    pub products: Vec<ProductView>,
}

/// Menu page template.
#[derive(Template, WebTemplate)]
#[template(path = "menu/index.html")]
pub struct MenuTemplate {
    pub sections: Vec<MenuSection>,
    pub client_name: Option<String>,
    pub error: Option<&'static str>,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name,
            description: product.description.unwrap_or_default(),
            price: product.price,
            image_url: product.url_image,
        }
    }
}

/// Group products into sections by their category, preserving the order the
/// backend lists them in. Uncategorized products land in a trailing section.
fn group_by_category(products: Vec<Product>) -> Vec<MenuSection> {
    let mut sections: Vec<MenuSection> = Vec::new();
    let mut uncategorized: Vec<ProductView> = Vec::new();

    for product in products {
        let Some(category) = product.product_type.clone().filter(|c| !c.is_empty()) else {
            uncategorized.push(product.into());
            continue;
        };

        match sections.iter_mut().find(|s| s.title == category) {
            Some(section) => section.products.push(product.into()),
            None => sections.push(MenuSection {
                title: category,
                products: vec![product.into()],
            }),
        }
    }

    if !uncategorized.is_empty() {
        sections.push(MenuSection {
            title: "Other".to_string(),
            products: uncategorized,
        });
    }

    sections
}

/// Display the menu page.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>, OptionalClient(client): OptionalClient) -> Response {
    let sections = match state.platform().list_products().await {
        Ok(products) => group_by_category(products),
        Err(e) => {
            tracing::error!("Failed to load menu: {e}");
            return MenuTemplate {
                sections: Vec::new(),
                client_name: client.map(|c| c.name),
                error: Some("The menu is unavailable right now. Try again in a moment"),
            }
            .into_response();
        }
    };

    MenuTemplate {
        sections,
        client_name: client.map(|c| c.name),
        error: None,
    }
    .into_response()
}

#[cfg(test)]
mod tests {
    use quitanda_core::{ProductId, RestaurantId};

    use super::*;

    fn product(id: i32, name: &str, category: Option<&str>) -> Product {
        Product {
            id: ProductId::new(id),
            restaurant_id: RestaurantId::new(1),
            product_type: category.map(str::to_string),
            name: name.to_string(),
            description: None,
            price: Decimal::new(1200, 2),
            url_image: None,
        }
    }

    #[test]
    fn test_group_by_category_preserves_backend_order() {
        let sections = group_by_category(vec![
            product(1, "Feijoada", Some("Mains")),
            product(2, "Guarana", Some("Drinks")),
            product(3, "Moqueca", Some("Mains")),
        ]);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Mains");
        assert_eq!(sections[0].products.len(), 2);
        assert_eq!(sections[1].title, "Drinks");
    }

    #[test]
    fn test_group_by_category_collects_uncategorized_last() {
        let sections = group_by_category(vec![
            product(1, "Feijoada", None),
            product(2, "Guarana", Some("Drinks")),
            product(3, "Pao de queijo", Some("")),
        ]);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Drinks");
        assert_eq!(sections[1].title, "Other");
        assert_eq!(sections[1].products.len(), 2);
    }

    #[test]
    fn test_group_by_category_empty_input() {
        assert!(group_by_category(Vec::new()).is_empty());
    }
}
