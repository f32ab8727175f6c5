/*!
 * Resource Module
 * Shared resource pool and ownership ledger
 */

pub mod ledger;

// Re-export for convenience
pub use ledger::{AcquireOutcome, ReleaseOutcome, Resource, ResourceLedger};
