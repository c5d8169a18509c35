use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};

enum Message<T> {
    Value(T),
    Close,
}

struct Registry<T> {
    sinks: HashMap<u64, Sender<Message<T>>>,
    next_id: u64,
}

/// Fan-out hub delivering each broadcast value to every current subscriber.
///
/// Delivery is best-effort-unbounded: per-subscriber queues have no
/// capacity limit, so a slow subscriber never blocks the producer or its
/// peers but may grow memory without bound.
pub struct Broadcaster<T> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T> Clone for Broadcaster<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<T> Default for Broadcaster<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Broadcaster<T> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                sinks: HashMap::new(),
                next_id: 0,
            })),
        }
    }

    /// Registers a fresh queue and returns its receiving end.
    /// Values broadcast before this call are never delivered to it.
    pub fn subscribe(&self) -> Subscription<T> {
        let (tx, rx) = unbounded();
        let mut registry = self.registry.lock().unwrap();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.sinks.insert(id, tx);
        drop(registry);

        Subscription {
            id,
            rx,
            registry: Arc::clone(&self.registry),
            done: false,
        }
    }

    fn snapshot(&self) -> Vec<Sender<Message<T>>> {
        // The lock covers registry access only; sends happen outside it so
        // delivery never serializes against subscribers joining or leaving.
        let registry = self.registry.lock().unwrap();
        registry.sinks.values().cloned().collect()
    }

    /// Enqueues `value` to every subscriber registered at the time of the
    /// call, in broadcast order per subscriber.
    pub fn broadcast(&self, value: T)
    where
        T: Clone,
    {
        for sink in self.snapshot() {
            let _ = sink.send(Message::Value(value.clone()));
        }
    }

    /// Delivers the close sentinel to every current subscriber, ending
    /// their iteration once they drain values queued ahead of it.
    pub fn close(&self) {
        for sink in self.snapshot() {
            let _ = sink.send(Message::Close);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.lock().unwrap().sinks.len()
    }
}

/// Result of a bounded wait on a subscription queue.
#[derive(Debug, PartialEq, Eq)]
pub enum Received<T> {
    Value(T),
    TimedOut,
    Closed,
}

/// Receiving end of one broadcast queue.
///
/// Unregisters itself when the close sentinel arrives, when the broadcaster
/// side disconnects, or on drop.
pub struct Subscription<T> {
    id: u64,
    rx: Receiver<Message<T>>,
    registry: Arc<Mutex<Registry<T>>>,
    done: bool,
}

impl<T> Subscription<T> {
    /// Blocks for the next value. Returns `None` once closed.
    pub fn recv(&mut self) -> Option<T> {
        if self.done {
            return None;
        }
        match self.rx.recv() {
            Ok(Message::Value(value)) => Some(value),
            Ok(Message::Close) | Err(_) => {
                self.unregister();
                None
            }
        }
    }

    /// Waits for the next value for at most `timeout`.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Received<T> {
        if self.done {
            return Received::Closed;
        }
        match self.rx.recv_timeout(timeout) {
            Ok(Message::Value(value)) => Received::Value(value),
            Ok(Message::Close) | Err(RecvTimeoutError::Disconnected) => {
                self.unregister();
                Received::Closed
            }
            Err(RecvTimeoutError::Timeout) => Received::TimedOut,
        }
    }

    fn unregister(&mut self) {
        if self.done {
            return;
        }
        self.done = true;
        self.registry.lock().unwrap().sinks.remove(&self.id);
    }
}

impl<T> Iterator for Subscription<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.recv()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.unregister();
    }
}
