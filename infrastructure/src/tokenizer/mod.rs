//! Token counter adapters.

mod approx;

pub use approx::ApproxTokenCounter;
