//! Pull-style adapter over a callback registry.
//!
//! Listeners run on the native SDK's delivery threads; an [`EventStream`]
//! moves events onto a bounded channel so application code can consume
//! them at its own pace from its own thread.

use crate::callback::{CallbackManager, ListenerHandle};
use crate::error::SensorError;
use crate::types::{ErrorEvent, FrameEvent, PacketEvent};
use crate::Result;
use crossbeam_channel::{Receiver, TrySendError};
use std::sync::Arc;
use std::time::Duration;

/// Bounded queue of events fed by a hidden listener registration.
///
/// The feeding listener never blocks the dispatch path: when the channel is
/// full the event is dropped with a trace log. Dropping the stream removes
/// the listener.
pub struct EventStream<E> {
    receiver: Receiver<E>,
    registry: Arc<CallbackManager<E>>,
    handle: ListenerHandle,
}

/// Stream of image-frame events.
pub type FrameStream = EventStream<FrameEvent>;
/// Stream of raw network-packet events.
pub type PacketStream = EventStream<PacketEvent>;
/// Stream of sensor error notifications.
pub type SensorErrorStream = EventStream<ErrorEvent>;

impl<E: Clone + Send + Sync + 'static> EventStream<E> {
    pub(crate) fn open(registry: Arc<CallbackManager<E>>, capacity: usize) -> EventStream<E> {
        let (sender, receiver) = crossbeam_channel::bounded(capacity);
        let handle = registry.subscribe(move |event: &E| {
            match sender.try_send(event.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    log::trace!("event stream full, dropping event");
                }
                Err(TrySendError::Disconnected(_)) => {}
            }
        });
        EventStream {
            receiver,
            registry,
            handle,
        }
    }

    /// Receive the next event, blocking until one arrives.
    pub fn recv(&self) -> Result<E> {
        self.receiver.recv().map_err(|_| SensorError::StreamStopped)
    }

    /// Receive the next event without blocking.
    pub fn try_recv(&self) -> Option<E> {
        self.receiver.try_recv().ok()
    }

    /// Receive the next event, giving up after `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<E> {
        self.receiver.recv_timeout(timeout).map_err(|e| match e {
            crossbeam_channel::RecvTimeoutError::Timeout => SensorError::Timeout,
            crossbeam_channel::RecvTimeoutError::Disconnected => SensorError::StreamStopped,
        })
    }

    /// Number of events currently buffered.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }
}

impl<E> Drop for EventStream<E> {
    fn drop(&mut self) {
        self.registry.unsubscribe(self.handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_receives_dispatched_events() {
        let registry = Arc::new(CallbackManager::<u32>::new());
        let stream = EventStream::open(Arc::clone(&registry), 16);

        registry.dispatch(&1);
        registry.dispatch(&2);

        assert_eq!(stream.recv().unwrap(), 1);
        assert_eq!(stream.recv().unwrap(), 2);
        assert!(stream.try_recv().is_none());
    }

    #[test]
    fn test_full_stream_drops_events_without_blocking() {
        let registry = Arc::new(CallbackManager::<u32>::new());
        let stream = EventStream::open(Arc::clone(&registry), 1);

        registry.dispatch(&1);
        registry.dispatch(&2);
        registry.dispatch(&3);

        assert_eq!(stream.pending(), 1);
        assert_eq!(stream.recv().unwrap(), 1);
        assert!(stream.try_recv().is_none());
    }

    #[test]
    fn test_drop_unsubscribes_listener() {
        let registry = Arc::new(CallbackManager::<u32>::new());
        {
            let _stream = EventStream::open(Arc::clone(&registry), 4);
            assert_eq!(registry.len(), 1);
        }
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_recv_timeout_on_idle_stream() {
        let registry = Arc::new(CallbackManager::<u32>::new());
        let stream = EventStream::open(Arc::clone(&registry), 4);
        let err = stream.recv_timeout(Duration::from_millis(10)).unwrap_err();
        assert!(matches!(err, SensorError::Timeout));
    }
}
