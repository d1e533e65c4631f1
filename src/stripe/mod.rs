//! Minimal Stripe webhook support: signature checking and the event shapes we consume.

pub mod signature;
pub mod types;

pub use signature::{SignatureError, verify_signature};
pub use types::{CheckoutSession, StripeEvent};
