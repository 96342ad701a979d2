//! Google Cloud authentication shared by the model and data clients

pub mod adc;

pub use adc::{AuthError, AuthenticationManager};
