//! User-facing notification sink.

use log::info;
use std::cell::RefCell;

/// Sink for informational messages shown to the user.
///
/// Feature stores call it after explicit reloads and user mutations succeed,
/// never after the initial silent load.
pub trait Notifier {
    fn info(&self, message: &str);
}

/// Notifier that keeps every message in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: RefCell<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all messages received so far, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.messages.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.borrow().is_empty()
    }
}

impl Notifier for RecordingNotifier {
    fn info(&self, message: &str) {
        info!(
            "event=notify module=backend.notifier status=ok chars={}",
            message.chars().count()
        );
        self.messages.borrow_mut().push(message.to_string());
    }
}
