//! Normalized data model shared by every provider.
//!
//! - `rate` - Exchange rate for one pair on one day (Rate)
//! - `price` - Security price on one day (Price)
//! - `security` - Search candidates and extended metadata (Security, SecurityInfo)
//! - `usage` - Quota snapshots (UsageData, UsageLimit)
//! - `types` - Provider and concept identifiers (ProviderKey, Concept)

mod price;
mod rate;
mod security;
mod types;
mod usage;

pub use price::Price;
pub use rate::Rate;
pub use security::{Security, SecurityInfo};
pub use types::{Concept, ProviderKey};
pub use usage::{UsageData, UsageLimit};
