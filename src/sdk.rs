//! Contracts for the external collaborators: the native SDK's single-slot
//! listener registration surface and the capture-replay control surface.
//!
//! This crate never reimplements either side; it only adapts them. Each
//! event kind exposes one `listen_*`/`unlisten_*` pair holding at most one
//! sink at a time, which is exactly the constraint the callback managers
//! exist to widen into many subscribers.

use crate::types::{
    ErrorEvent, FrameEvent, Options, PacketEvent, SensorHandle, SensorInformation,
};
use crate::Result;
use std::path::Path;
use std::sync::Arc;

/// The one function the native SDK will invoke per event while a listener
/// registration is active.
pub type EventSink<E> = Arc<dyn Fn(E) + Send + Sync>;

/// Registration and sensor-query surface of the native SDK.
///
/// Implementations are expected to deliver events from their own threads;
/// everything built on top of this trait assumes sinks can be invoked
/// concurrently with application calls.
pub trait NativeSdk: Send + Sync {
    /// Start the native SDK with the given options.
    fn initialize(&self, options: Options) -> Result<()>;

    /// Stop the native SDK. Active listener slots are implicitly cleared.
    fn deinitialize(&self) -> Result<()>;

    /// Occupy the image-frame slot. Fails if the SDK is not started or the
    /// slot is already taken.
    fn listen_image_frames(&self, sink: EventSink<FrameEvent>) -> Result<()>;
    fn unlisten_image_frames(&self) -> Result<()>;

    /// Occupy the raw network-packet slot.
    fn listen_network_packets(&self, sink: EventSink<PacketEvent>) -> Result<()>;
    fn unlisten_network_packets(&self) -> Result<()>;

    /// Occupy the error-notification slot.
    fn listen_errors(&self, sink: EventSink<ErrorEvent>) -> Result<()>;
    fn unlisten_errors(&self) -> Result<()>;

    /// Number of sensors currently known to the SDK.
    fn n_sensors(&self) -> usize;

    fn sensor_information_by_index(&self, index: usize) -> Result<SensorInformation>;

    fn sensor_handle_by_serial_number(&self, serial_number: u64) -> Result<SensorHandle>;

    fn sensor_information(&self, handle: SensorHandle) -> Result<SensorInformation>;
}

/// Control surface of the capture-replay collaborator.
///
/// Only the is-open/is-running/is-end/time/seek/resume surface is consumed;
/// recording and file formats belong to the collaborator.
pub trait CaptureReplay: Send + Sync {
    fn open(&self, path: &Path) -> Result<()>;

    fn is_open(&self) -> bool;

    /// True while replay is advancing in real time on its own.
    fn is_running(&self) -> bool;

    /// True once the capture has been fully replayed.
    fn is_end(&self) -> bool;

    /// True when the capture restarts from the beginning at the end.
    fn loop_enabled(&self) -> bool;

    /// Current replay position as a microsecond timestamp.
    fn time(&self) -> u64;

    /// Jump to a position, in seconds from the start of the capture.
    fn seek(&self, position: f32) -> Result<()>;

    /// Advance replay by `duration` seconds, delivering events along the
    /// way, and return when that span has been replayed.
    fn resume_blocking(&self, duration: f32) -> Result<()>;
}
