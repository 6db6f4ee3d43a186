//! Adapters bound to the host environment.

mod clipboard;
mod notifier;

pub use clipboard::SystemClipboard;
pub use notifier::TracingNotifier;
