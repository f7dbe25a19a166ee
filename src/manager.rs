//! Adapters that bind one [`CallbackManager`] to one native listener slot.

use crate::callback::{CallbackManager, ListenerHandle};
use crate::error::SensorError;
use crate::sdk::{EventSink, NativeSdk};
use crate::stream::EventStream;
use crate::types::{ErrorEvent, FrameEvent, PacketEvent};
use crate::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type RegisterFn<E> = Box<dyn Fn(EventSink<E>) -> Result<()> + Send + Sync>;
type UnregisterFn = Box<dyn Fn() -> Result<()> + Send + Sync>;

/// Owns exactly one native listener registration and the subscriber
/// registry that fans its events out.
///
/// The native registration is a scoped resource: `initialize` acquires the
/// slot, `deinitialize` releases it, and dropping the manager releases it
/// unconditionally so no dangling registration can outlive the object.
pub struct SdkCallbackManager<E> {
    callbacks: Arc<CallbackManager<E>>,
    registered: AtomicBool,
    register: RegisterFn<E>,
    unregister: UnregisterFn,
    kind: &'static str,
}

/// Callback manager wired to the image-frame slot.
pub type ImageFrameCallbackManager = SdkCallbackManager<FrameEvent>;
/// Callback manager wired to the raw network-packet slot.
pub type NetworkPacketCallbackManager = SdkCallbackManager<PacketEvent>;
/// Callback manager wired to the error-notification slot.
pub type ErrorCallbackManager = SdkCallbackManager<ErrorEvent>;

impl SdkCallbackManager<FrameEvent> {
    pub fn image_frames(sdk: Arc<dyn NativeSdk>) -> ImageFrameCallbackManager {
        let unlisten_sdk = Arc::clone(&sdk);
        SdkCallbackManager::with_slot(
            "image-frame",
            Box::new(move |sink| sdk.listen_image_frames(sink)),
            Box::new(move || unlisten_sdk.unlisten_image_frames()),
        )
    }
}

impl SdkCallbackManager<PacketEvent> {
    pub fn network_packets(sdk: Arc<dyn NativeSdk>) -> NetworkPacketCallbackManager {
        let unlisten_sdk = Arc::clone(&sdk);
        SdkCallbackManager::with_slot(
            "network-packet",
            Box::new(move |sink| sdk.listen_network_packets(sink)),
            Box::new(move || unlisten_sdk.unlisten_network_packets()),
        )
    }
}

impl SdkCallbackManager<ErrorEvent> {
    pub fn errors(sdk: Arc<dyn NativeSdk>) -> ErrorCallbackManager {
        let unlisten_sdk = Arc::clone(&sdk);
        SdkCallbackManager::with_slot(
            "error",
            Box::new(move |sink| sdk.listen_errors(sink)),
            Box::new(move || unlisten_sdk.unlisten_errors()),
        )
    }
}

impl<E: Send + Sync + 'static> SdkCallbackManager<E> {
    fn with_slot(
        kind: &'static str,
        register: RegisterFn<E>,
        unregister: UnregisterFn,
    ) -> SdkCallbackManager<E> {
        SdkCallbackManager {
            callbacks: Arc::new(CallbackManager::new()),
            registered: AtomicBool::new(false),
            register,
            unregister,
            kind,
        }
    }

    /// Register this manager's dispatch entry point with the native SDK.
    ///
    /// Fails with [`SensorError::AlreadyInitialized`] when the slot is
    /// already held, and with the native error when the SDK rejects the
    /// registration (e.g. it has not been started yet).
    pub fn initialize(&self) -> Result<()> {
        if self.registered.swap(true, Ordering::SeqCst) {
            return Err(SensorError::AlreadyInitialized);
        }
        let callbacks = Arc::clone(&self.callbacks);
        let sink: EventSink<E> = Arc::new(move |event| callbacks.dispatch(&event));
        if let Err(err) = (self.register)(sink) {
            self.registered.store(false, Ordering::SeqCst);
            return Err(err);
        }
        log::debug!("{} manager registered with the native SDK", self.kind);
        Ok(())
    }

    /// Release the native slot. Calling this when never registered, or a
    /// second time, is a successful no-op; `Drop` relies on that.
    pub fn deinitialize(&self) -> Result<()> {
        if !self.registered.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        log::debug!("{} manager unregistering from the native SDK", self.kind);
        (self.unregister)()
    }

    /// Whether the native slot is currently held.
    pub fn is_initialized(&self) -> bool {
        self.registered.load(Ordering::SeqCst)
    }

    /// Register a listener under a freshly allocated handle.
    pub fn subscribe(&self, listener: impl Fn(&E) + Send + Sync + 'static) -> ListenerHandle {
        self.callbacks.subscribe(listener)
    }

    pub fn unsubscribe(&self, handle: ListenerHandle) {
        self.callbacks.unsubscribe(handle);
    }

    /// Register a listener under a caller-chosen id; duplicate ids are
    /// rejected.
    pub fn listen(&self, id: u64, listener: impl Fn(&E) + Send + Sync + 'static) -> Result<()> {
        self.callbacks.listen(id, listener)
    }

    pub fn unlisten(&self, id: u64) {
        self.callbacks.unlisten(id);
    }

    pub fn subscriber_count(&self) -> usize {
        self.callbacks.len()
    }

    pub(crate) fn registry(&self) -> Arc<CallbackManager<E>> {
        Arc::clone(&self.callbacks)
    }
}

impl<E: Clone + Send + Sync + 'static> SdkCallbackManager<E> {
    /// Open a pull-style stream over this manager's events.
    ///
    /// `capacity` bounds the channel; events arriving while it is full are
    /// dropped rather than blocking the dispatch path.
    pub fn stream(&self, capacity: usize) -> EventStream<E> {
        EventStream::open(self.registry(), capacity)
    }
}

impl<E> Drop for SdkCallbackManager<E> {
    fn drop(&mut self) {
        if !self.registered.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Err(err) = (self.unregister)() {
            log::warn!("{} manager failed to unregister on drop: {}", self.kind, err);
        }
    }
}
