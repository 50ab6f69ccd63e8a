//! Record model
//!
//! Turns one raw feed record into a [`CanonicalRecord`] or a [`ValidationError`].
//!
//! # Overview
//!
//! Normalization is pure: no I/O, no logging. Unknown source fields are
//! ignored so new upstream attributes never break a run, and absent optional
//! fields stay `None` instead of collapsing to zero or an empty string.

mod normalize;
mod snapshot;
mod types;

pub use normalize::{normalize, Normalized};
pub use snapshot::{InventorySnapshot, StatRange, TermBucket};
pub use types::{
    Availability, CanonicalRecord, Classification, Location, Pricing, TechnicalSpecs,
    ValidationError, VehicleAttributes,
};

#[cfg(test)]
mod tests;
