use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};

use crate::core::Listenable;

/// Push-based event source with any number of independent subscribers.
///
/// Each subscriber gets its own unbounded queue, so emitting never blocks and a
/// slow consumer cannot stall the producer. Subscribers that were dropped or
/// unsubscribed are pruned on the next emit.
#[derive(Debug)]
pub struct EventSource<T> {
    senders: Vec<Sender<T>>,
    emitted: u64,
}

impl<T: Clone> EventSource<T> {
    pub fn new() -> Self {
        Self {
            senders: Vec::new(),
            emitted: 0,
        }
    }

    /// Registers a new subscriber. It only sees values emitted after this call.
    pub fn subscribe(&mut self) -> Subscription<T> {
        let (tx, rx) = unbounded();
        self.senders.push(tx);
        Subscription { rx: Some(rx) }
    }

    /// Pushes `value` to every live subscriber.
    ///
    /// Returns the number of subscribers that received it.
    pub fn emit(&mut self, value: T) -> usize {
        self.emitted = self.emitted.wrapping_add(1);
        self.senders.retain(|tx| tx.send(value.clone()).is_ok());
        self.senders.len()
    }

    /// Number of subscribers still registered after the last prune.
    pub fn subscriber_count(&self) -> usize {
        self.senders.len()
    }

    /// Number of values emitted since creation.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Drops every subscriber queue. Pending values stay readable by their owners.
    pub fn close(&mut self) {
        self.senders.clear();
    }
}

impl<T: Clone> Default for EventSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Listenable<T> for EventSource<T> {
    fn listen(&mut self) -> Subscription<T> {
        self.subscribe()
    }
}

/// Receiving end of an [`EventSource`].
///
/// Unsubscribing is explicit through [`Subscription::unsubscribe`] and implicit on
/// drop; both release the queue so the source stops feeding it.
#[derive(Debug)]
pub struct Subscription<T> {
    rx: Option<Receiver<T>>,
}

impl<T> Subscription<T> {
    /// A subscription that never yields anything.
    pub fn detached() -> Self {
        Self { rx: None }
    }

    /// Takes the next pending value, if any.
    pub fn try_recv(&self) -> Option<T> {
        let rx = self.rx.as_ref()?;
        match rx.try_recv() {
            Ok(v) => Some(v),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Takes every pending value in arrival order.
    pub fn drain(&self) -> Vec<T> {
        match self.rx.as_ref() {
            Some(rx) => rx.try_iter().collect(),
            None => Vec::new(),
        }
    }

    /// Takes every pending value and returns only the most recent one.
    pub fn latest(&self) -> Option<T> {
        self.drain().pop()
    }

    /// Number of values waiting in the queue.
    pub fn pending(&self) -> usize {
        self.rx.as_ref().map_or(0, Receiver::len)
    }

    pub fn is_active(&self) -> bool {
        self.rx.is_some()
    }

    /// Releases the queue. Values still pending are discarded.
    pub fn unsubscribe(&mut self) {
        self.rx = None;
    }
}
