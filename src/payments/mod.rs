mod razorpay;

pub use razorpay::{
    to_major_units, CapturedPayment, PaymentWrapper, RazorpayClient, WebhookEnvelope,
    WebhookPayload, PROVIDER_NAME,
};
