/*!
 * Monitoring Module
 * Tracing initialization
 */

pub mod tracer;

// Re-export for convenience
pub use tracer::init_tracing;
