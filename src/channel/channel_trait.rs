//! Trait abstraction for channel send operations to enable testing

use async_trait::async_trait;
use serde_json::Value;
use std::io;

/// Trait for the outbound half of the realtime channel
#[async_trait]
pub trait ChannelIO: Send {
    /// Send a named event with a JSON payload. Fire-and-forget: no
    /// acknowledgement is awaited.
    async fn send_event(&mut self, event: &str, data: Value) -> io::Result<()>;
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock channel for testing
    #[derive(Clone)]
    pub struct MockChannel {
        pub sent_events: Arc<Mutex<Vec<(String, Value)>>>,
        pub send_error: Arc<Mutex<Option<io::ErrorKind>>>,
    }

    impl MockChannel {
        pub fn new() -> Self {
            Self {
                sent_events: Arc::new(Mutex::new(Vec::new())),
                send_error: Arc::new(Mutex::new(None)),
            }
        }

        pub fn get_sent_events(&self) -> Vec<(String, Value)> {
            self.sent_events.lock().unwrap().clone()
        }

        pub fn set_send_error(&self, error: io::ErrorKind) {
            *self.send_error.lock().unwrap() = Some(error);
        }
    }

    #[async_trait]
    impl ChannelIO for MockChannel {
        async fn send_event(&mut self, event: &str, data: Value) -> io::Result<()> {
            if let Some(error) = *self.send_error.lock().unwrap() {
                return Err(io::Error::new(error, "Mock send error"));
            }
            self.sent_events
                .lock()
                .unwrap()
                .push((event.to_string(), data));
            Ok(())
        }
    }
}
