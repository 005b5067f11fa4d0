pub mod confirmation;
pub mod razorpay;

pub use confirmation::WebhookResult;
pub use razorpay::handle_payment_webhook;

use axum::{routing::post, Router};

use crate::db::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/webhook/payment", post(handle_payment_webhook))
}
