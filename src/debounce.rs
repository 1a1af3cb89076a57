use std::time::{Duration, Instant};

/// A value that only takes over a new input once it has been stable for `delay`.
///
/// Every `set` restarts the timer, so a burst of inputs publishes only the last one.
/// Time is passed in by the caller, the event loop polls on every tick.
#[derive(Debug)]
pub struct Debounced<T> {
    value: T,
    pending: Option<(T, Instant)>,
    delay: Duration,
}

impl<T: Clone + PartialEq> Debounced<T> {
    pub fn new(value: T, delay: Duration) -> Self {
        Self {
            value,
            pending: None,
            delay,
        }
    }

    pub fn set(&mut self, input: T, now: Instant) {
        if self.pending.is_none() && input == self.value {
            return;
        }
        self.pending = Some((input, now));
    }

    /// Publishes the pending input once the delay has passed. Returns the new value if it changed.
    pub fn poll(&mut self, now: Instant) -> Option<&T> {
        let ready = matches!(&self.pending, Some((_, since)) if now.duration_since(*since) >= self.delay);
        if !ready {
            return None;
        }
        let (input, _) = self.pending.take()?;
        if input == self.value {
            return None;
        }
        self.value = input;
        Some(&self.value)
    }

    /// The last published value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// The latest input, published or not.
    pub fn raw(&self) -> &T {
        self.pending
            .as_ref()
            .map(|(input, _)| input)
            .unwrap_or(&self.value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
