use crate::error::ErrorCode;
use std::sync::Arc;

/// Handle identifying one attached sensor within the native SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SensorHandle(pub u64);

/// One raw sample in the sensor's internal projection plane.
///
/// `image_x` and `image_z` are ratios in the optical frame, not meters;
/// only `distance` carries a physical unit. Delivered by the native SDK
/// in contiguous arrays, one frame at a time, and treated as read-only.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePoint {
    /// Monotonic timestamp in microseconds.
    pub timestamp: u64,
    pub image_x: f32,
    /// Distance in meters.
    pub distance: f32,
    pub image_z: f32,
    pub intensity: f32,
    /// Which laser return this sample is, for multi-return sensors.
    pub return_number: u8,
    /// Nonzero when the sample passed the sensor's validity checks.
    pub valid: u8,
    /// Nonzero when the detector saturated on this sample.
    pub saturated: u8,
}

/// One Cartesian sample, in the sensor frame or the world frame after a
/// rigid transform has been applied.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorPoint {
    /// Monotonic timestamp in microseconds.
    pub timestamp: u64,
    /// Meters.
    pub x: f32,
    /// Meters.
    pub y: f32,
    /// Meters.
    pub z: f32,
    pub intensity: f32,
    pub return_number: u8,
    pub valid: u8,
    pub saturated: u8,
}

/// Identification record for one attached sensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorInformation {
    pub handle: SensorHandle,
    pub serial_number: u64,
    pub model: String,
    pub firmware_version: String,
}

bitflags::bitflags! {
    /// SDK control bitmap passed at initialization.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ControlFlags: u32 {
        /// Ignore live network data; used when replaying a capture.
        const DISABLE_NETWORK       = 1 << 0;
        /// Keep points outside the image clip region.
        const DISABLE_IMAGE_CLIP    = 1 << 1;
        /// Keep points outside the distance clip region.
        const DISABLE_DISTANCE_CLIP = 1 << 2;
    }
}

/// Native SDK initialization options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Options {
    pub control_flags: ControlFlags,
    /// Target frame aggregation length in seconds.
    pub frame_length: f32,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            control_flags: ControlFlags::empty(),
            frame_length: 0.05,
        }
    }
}

/// One batch of samples delivered through the image-frame event.
///
/// The point buffer is shared, so cloning the event for fan-out never
/// copies the points.
#[derive(Debug, Clone)]
pub struct FrameEvent {
    pub handle: SensorHandle,
    pub points: Arc<[ImagePoint]>,
}

impl FrameEvent {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// One raw network packet delivered through the packet event.
#[derive(Debug, Clone)]
pub struct PacketEvent {
    pub handle: SensorHandle,
    /// Host receive timestamp in microseconds, negative when unknown.
    pub receive_timestamp: i64,
    pub data: Arc<[u8]>,
}

/// One error notification delivered through the error event.
#[derive(Debug, Clone)]
pub struct ErrorEvent {
    pub handle: SensorHandle,
    pub code: ErrorCode,
    pub message: Arc<str>,
    /// Opaque payload attached by the native layer, possibly empty.
    pub payload: Arc<[u8]>,
}
