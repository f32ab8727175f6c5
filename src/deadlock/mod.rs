/*!
 * Deadlock Module
 * Wait-for classification of the waiting set and cycle recovery
 */

pub mod detector;
pub mod resolver;

// Re-export for convenience
pub use detector::{detect, Verdict};
pub use resolver::resolve;
