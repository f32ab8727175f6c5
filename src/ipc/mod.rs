/*!
 * IPC Module
 * Mailbox message exchange between simulated processes
 */

pub mod mailbox;

// Re-export for convenience
pub use mailbox::{Mailbox, MailboxSet};
