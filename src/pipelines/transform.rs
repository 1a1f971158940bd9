//! Reshapes flat line-item payloads into the persisted nested record shape.
//! Pure mapping; the validator has already run, so defaults stand in for
//! anything absent.

use crate::models::{OrderLine, OrderedProduct};
use crate::pipelines::payload::ItemPayload;

/// Maps a flat item to the nested `{product, quantity}` shape. The image has
/// already been through URL normalization by this point; the same string is
/// persisted and emailed.
pub fn to_order_line(item: &ItemPayload, normalized_image: String) -> OrderLine {
  OrderLine {
    product: OrderedProduct {
      id: item.id.clone().unwrap_or_default(),
      name: item.name.clone().unwrap_or_default(),
      price: item.price.unwrap_or(0.0),
      image: normalized_image,
    },
    quantity: item.quantity.unwrap_or(1.0) as i64,
  }
}
