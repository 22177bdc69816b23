//! Order confirmation email (`order-created` topic).

use std::sync::Arc;

use async_trait::async_trait;

use microshop_core::envelope::EventPayload;

use crate::email::EmailSender;
use crate::handler::{optional_field, require_field, HandlerError, NotificationHandler};

/// Placeholder for optional order details the producer did not supply.
const NOT_AVAILABLE: &str = "N/A";

/// Sends an order confirmation email when an `order-created` event
/// arrives.
///
/// Requires `userEmail`, `username`, and `orderId`; `productId`,
/// `quantity`, `total`, and `timestamp` are rendered when present.
pub struct OrderConfirmationHandler {
    sender: Arc<dyn EmailSender>,
}

impl OrderConfirmationHandler {
    pub fn new(sender: Arc<dyn EmailSender>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl NotificationHandler for OrderConfirmationHandler {
    fn name(&self) -> &'static str {
        "order-confirmation"
    }

    async fn handle(&self, payload: &EventPayload) -> Result<(), HandlerError> {
        let email = require_field(payload, "userEmail")?;
        let username = require_field(payload, "username")?;
        let order_id = require_field(payload, "orderId")?;

        let details = OrderDetails {
            order_id: &order_id,
            product_id: optional_field(payload, "productId"),
            quantity: optional_field(payload, "quantity"),
            total: optional_field(payload, "total"),
            timestamp: optional_field(payload, "timestamp"),
        };

        let subject = format!("Order Confirmation - #{order_id}");
        let body = render_body(&username, &details);

        self.sender
            .send(&email, &subject, &body)
            .await
            .map_err(|e| HandlerError::Send {
                reason: e.to_string(),
            })?;

        tracing::info!(to = %email, order_id = %order_id, "Order confirmation email sent");
        Ok(())
    }
}

struct OrderDetails<'a> {
    order_id: &'a str,
    product_id: Option<String>,
    quantity: Option<String>,
    total: Option<String>,
    timestamp: Option<String>,
}

/// Render the HTML body listing the order details.
fn render_body(username: &str, details: &OrderDetails<'_>) -> String {
    let order_id = details.order_id;
    let product_id = details.product_id.as_deref().unwrap_or(NOT_AVAILABLE);
    let quantity = details.quantity.as_deref().unwrap_or(NOT_AVAILABLE);
    let total = details.total.as_deref().unwrap_or(NOT_AVAILABLE);
    let timestamp = details.timestamp.as_deref().unwrap_or(NOT_AVAILABLE);

    format!(
        r#"<html>
<body>
    <h2>Order Confirmation - #{order_id}</h2>
    <p>Dear {username},</p>
    <p>Thank you for your order! We're excited to process it for you.</p>

    <h3>Order Details:</h3>
    <ul>
        <li><strong>Order ID:</strong> {order_id}</li>
        <li><strong>Product ID:</strong> {product_id}</li>
        <li><strong>Quantity:</strong> {quantity}</li>
        <li><strong>Total Amount:</strong> ${total}</li>
        <li><strong>Order Date:</strong> {timestamp}</li>
    </ul>

    <p>Your order is now being processed. You'll receive updates on the status of your order.</p>

    <p>If you have any questions about your order, please contact our support team.</p>

    <br>
    <p>Best regards,<br>The MicroShop Team</p>
</body>
</html>"#
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
