//! Payment provider integration.

mod gateway;

pub use gateway::{notification_signature, HttpPaymentGateway, PaymentGateway};

#[cfg(test)]
pub use gateway::MockPaymentGateway;
