//! Cart line types.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId, Quantity};

/// A product as handed over by the catalog when it is added to the cart.
///
/// Carries the display fields of a cart line but no quantity: the cart
/// decides the quantity itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartProduct {
    pub id: ProductId,
    pub title: String,
    #[serde(alias = "imageUrl")]
    pub image_url: String,
    pub price: Price,
}

impl CartProduct {
    /// Create a new cart candidate.
    #[must_use]
    pub fn new(
        id: ProductId,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: Price,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }

    /// Turn the candidate into a cart line with the given quantity.
    #[must_use]
    pub fn into_item(self, quantity: Quantity) -> CartItem {
        CartItem {
            id: self.id,
            title: self.title,
            image_url: self.image_url,
            price: self.price,
            quantity,
        }
    }
}

/// A line in the cart.
///
/// This is also the persisted record format:
///
/// ```json
/// {"id": "p1", "title": "Shirt", "image_url": "https://...", "price": 10.5, "quantity": 2}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub title: String,
    #[serde(alias = "imageUrl")]
    pub image_url: String,
    /// Unit price at the time the line was last added.
    pub price: Price,
    pub quantity: Quantity,
}

impl CartItem {
    /// Price of the whole line (`price × quantity`).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.line_total(self.quantity)
    }
}

impl From<CartItem> for CartProduct {
    fn from(item: CartItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            image_url: item.image_url,
            price: item.price,
        }
    }
}
