//! Well-known event topic name constants.
//!
//! These must match the topic names the producing services publish to.
//! Deployments can override the consumed set via configuration; these are
//! the defaults the stock handlers are registered under.

/// A new user account was created.
pub const TOPIC_USER_REGISTERED: &str = "user-registered";

/// An order was placed.
pub const TOPIC_ORDER_CREATED: &str = "order-created";

/// A product was added to the catalog.
pub const TOPIC_PRODUCT_CREATED: &str = "product-created";
