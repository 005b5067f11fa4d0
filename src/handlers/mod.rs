pub mod tickets;
pub mod webhooks;
