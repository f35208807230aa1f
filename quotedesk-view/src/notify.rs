//! Notification events for the UI collaborator.
//!
//! The pipeline acknowledges user-visible actions through this trait instead
//! of writing to the log stream, so a UI can route them wherever it likes.

/// Sink for user-visible notification events.
pub trait Notifier {
    /// The cache-clear action completed.
    fn cache_cleared(&self);

    /// A non-fatal advisory about the current request (e.g. a likely
    /// unsupported foreign-market symbol).
    fn advisory(&self, message: &str);
}

/// Default notifier that prints to stdout.
pub struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn cache_cleared(&self) {
        println!("Cache cleared. Waiting a minute before refetching improves the success rate.");
    }

    fn advisory(&self, message: &str) {
        println!("Note: {message}");
    }
}
