//! Attribution and authorization.
//!
//! - [`attribution`]: map an update to the actor who caused it
//! - [`retry`]: bounded retry loop used by attribution
//! - [`policy`]: decide what that actor is allowed to do

pub mod attribution;
pub mod policy;
pub mod retry;

pub use attribution::AttributionResolver;
pub use policy::{Policy, Verdict, classify};
pub use retry::RetryPolicy;
