use std::sync::Mutex;

/// User-facing surface for failed remote operations.
pub trait Notifier: Send + Sync + 'static {
    fn error(&self, message: &str);
}

/// Keeps every message; handy for tests and for headless use.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn error(&self, message: &str) {
        if let Ok(mut m) = self.messages.lock() { m.push(message.to_string()); }
    }
}

/// Forwards messages into the UI event loop.
impl Notifier for tokio::sync::mpsc::UnboundedSender<String> {
    fn error(&self, message: &str) { let _ = self.send(message.to_string()); }
}
