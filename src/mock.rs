//! In-memory stand-in for the native SDK and capture replay, for tests and
//! examples that run without sensor hardware.
//!
//! Faithful to the native contracts where it matters: one listener slot per
//! event kind, registration rejected before `initialize`, opaque error
//! codes on misuse. The replay side is a toy position counter, just enough
//! to exercise the facade's wait/seek/is_end logic.

use crate::error::{ErrorCode, SensorError};
use crate::sdk::{CaptureReplay, EventSink, NativeSdk};
use crate::types::{
    ErrorEvent, FrameEvent, ImagePoint, Options, PacketEvent, SensorHandle, SensorInformation,
};
use crate::Result;
use std::path::Path;
use std::sync::Mutex;

pub const CODE_NOT_STARTED: ErrorCode = ErrorCode(-2);
pub const CODE_ALREADY_STARTED: ErrorCode = ErrorCode(-3);
pub const CODE_SLOT_OCCUPIED: ErrorCode = ErrorCode(-4);
pub const CODE_NOT_LISTENING: ErrorCode = ErrorCode(-5);
pub const CODE_NO_SUCH_SENSOR: ErrorCode = ErrorCode(-6);

#[derive(Default)]
struct NativeState {
    started: bool,
    options: Option<Options>,
    frame_sink: Option<EventSink<FrameEvent>>,
    packet_sink: Option<EventSink<PacketEvent>>,
    error_sink: Option<EventSink<ErrorEvent>>,
    sensors: Vec<SensorInformation>,
    failing_sensors: Vec<usize>,
}

struct ReplayState {
    open: bool,
    length: f32,
    position: f32,
    loop_enabled: bool,
}

impl Default for ReplayState {
    fn default() -> Self {
        ReplayState {
            open: false,
            length: 10.0,
            position: 0.0,
            loop_enabled: false,
        }
    }
}

/// Scriptable SDK double implementing both [`NativeSdk`] and
/// [`CaptureReplay`].
#[derive(Default)]
pub struct MockSdk {
    native: Mutex<NativeState>,
    replay: Mutex<ReplayState>,
}

impl MockSdk {
    pub fn new() -> MockSdk {
        MockSdk::default()
    }

    /// Seed a sensor record for the enumeration queries.
    pub fn add_sensor(&self, info: SensorInformation) {
        self.native.lock().unwrap().sensors.push(info);
    }

    /// Make the information query for the sensor at `index` fail, as a
    /// sensor that detached between enumeration and query would.
    pub fn fail_sensor_at(&self, index: usize) {
        self.native.lock().unwrap().failing_sensors.push(index);
    }

    /// Length in seconds reported for subsequently opened captures.
    pub fn set_capture_length(&self, length: f32) {
        self.replay.lock().unwrap().length = length;
    }

    pub fn set_loop_enabled(&self, enabled: bool) {
        self.replay.lock().unwrap().loop_enabled = enabled;
    }

    /// Deliver a frame to the registered sink, if any. Returns whether a
    /// sink was invoked.
    pub fn emit_frame(&self, handle: SensorHandle, points: &[ImagePoint]) -> bool {
        let sink = self.native.lock().unwrap().frame_sink.clone();
        match sink {
            Some(sink) => {
                sink(FrameEvent {
                    handle,
                    points: points.into(),
                });
                true
            }
            None => false,
        }
    }

    /// Deliver a raw packet to the registered sink, if any.
    pub fn emit_packet(&self, handle: SensorHandle, receive_timestamp: i64, data: &[u8]) -> bool {
        let sink = self.native.lock().unwrap().packet_sink.clone();
        match sink {
            Some(sink) => {
                sink(PacketEvent {
                    handle,
                    receive_timestamp,
                    data: data.into(),
                });
                true
            }
            None => false,
        }
    }

    /// Deliver an error notification to the registered sink, if any.
    pub fn emit_error(&self, handle: SensorHandle, code: ErrorCode, message: &str) -> bool {
        let sink = self.native.lock().unwrap().error_sink.clone();
        match sink {
            Some(sink) => {
                sink(ErrorEvent {
                    handle,
                    code,
                    message: message.into(),
                    payload: Vec::new().into(),
                });
                true
            }
            None => false,
        }
    }

    pub fn is_started(&self) -> bool {
        self.native.lock().unwrap().started
    }

    /// Options passed to the most recent `initialize`, if any.
    pub fn initialized_options(&self) -> Option<Options> {
        self.native.lock().unwrap().options
    }

    pub fn frame_listener_active(&self) -> bool {
        self.native.lock().unwrap().frame_sink.is_some()
    }

    pub fn packet_listener_active(&self) -> bool {
        self.native.lock().unwrap().packet_sink.is_some()
    }

    pub fn error_listener_active(&self) -> bool {
        self.native.lock().unwrap().error_sink.is_some()
    }

    fn occupy<E>(
        slot: &mut Option<EventSink<E>>,
        started: bool,
        sink: EventSink<E>,
    ) -> Result<()> {
        if !started {
            return Err(SensorError::native(CODE_NOT_STARTED, "SDK not started"));
        }
        if slot.is_some() {
            return Err(SensorError::native(
                CODE_SLOT_OCCUPIED,
                "listener slot already occupied",
            ));
        }
        *slot = Some(sink);
        Ok(())
    }

    fn release<E>(slot: &mut Option<EventSink<E>>) -> Result<()> {
        if slot.take().is_none() {
            return Err(SensorError::native(CODE_NOT_LISTENING, "no listener registered"));
        }
        Ok(())
    }
}

impl NativeSdk for MockSdk {
    fn initialize(&self, options: Options) -> Result<()> {
        let mut native = self.native.lock().unwrap();
        if native.started {
            return Err(SensorError::native(CODE_ALREADY_STARTED, "SDK already started"));
        }
        native.started = true;
        native.options = Some(options);
        Ok(())
    }

    fn deinitialize(&self) -> Result<()> {
        let mut native = self.native.lock().unwrap();
        if !native.started {
            return Err(SensorError::native(CODE_NOT_STARTED, "SDK not started"));
        }
        native.started = false;
        native.frame_sink = None;
        native.packet_sink = None;
        native.error_sink = None;
        Ok(())
    }

    fn listen_image_frames(&self, sink: EventSink<FrameEvent>) -> Result<()> {
        let mut native = self.native.lock().unwrap();
        let started = native.started;
        Self::occupy(&mut native.frame_sink, started, sink)
    }

    fn unlisten_image_frames(&self) -> Result<()> {
        Self::release(&mut self.native.lock().unwrap().frame_sink)
    }

    fn listen_network_packets(&self, sink: EventSink<PacketEvent>) -> Result<()> {
        let mut native = self.native.lock().unwrap();
        let started = native.started;
        Self::occupy(&mut native.packet_sink, started, sink)
    }

    fn unlisten_network_packets(&self) -> Result<()> {
        Self::release(&mut self.native.lock().unwrap().packet_sink)
    }

    fn listen_errors(&self, sink: EventSink<ErrorEvent>) -> Result<()> {
        let mut native = self.native.lock().unwrap();
        let started = native.started;
        Self::occupy(&mut native.error_sink, started, sink)
    }

    fn unlisten_errors(&self) -> Result<()> {
        Self::release(&mut self.native.lock().unwrap().error_sink)
    }

    fn n_sensors(&self) -> usize {
        self.native.lock().unwrap().sensors.len()
    }

    fn sensor_information_by_index(&self, index: usize) -> Result<SensorInformation> {
        let native = self.native.lock().unwrap();
        if native.failing_sensors.contains(&index) {
            return Err(SensorError::native(CODE_NO_SUCH_SENSOR, "sensor detached"));
        }
        native
            .sensors
            .get(index)
            .cloned()
            .ok_or_else(|| SensorError::native(CODE_NO_SUCH_SENSOR, "sensor index out of range"))
    }

    fn sensor_handle_by_serial_number(&self, serial_number: u64) -> Result<SensorHandle> {
        self.native
            .lock()
            .unwrap()
            .sensors
            .iter()
            .find(|info| info.serial_number == serial_number)
            .map(|info| info.handle)
            .ok_or(SensorError::SensorNotFound { serial_number })
    }

    fn sensor_information(&self, handle: SensorHandle) -> Result<SensorInformation> {
        self.native
            .lock()
            .unwrap()
            .sensors
            .iter()
            .find(|info| info.handle == handle)
            .cloned()
            .ok_or_else(|| SensorError::native(CODE_NO_SUCH_SENSOR, "unknown sensor handle"))
    }
}

impl CaptureReplay for MockSdk {
    fn open(&self, path: &Path) -> Result<()> {
        log::debug!("mock replay: opening {}", path.display());
        let mut replay = self.replay.lock().unwrap();
        replay.open = true;
        replay.position = 0.0;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.replay.lock().unwrap().open
    }

    fn is_running(&self) -> bool {
        // The mock replay only advances through resume_blocking.
        false
    }

    fn is_end(&self) -> bool {
        let replay = self.replay.lock().unwrap();
        replay.open && replay.position >= replay.length
    }

    fn loop_enabled(&self) -> bool {
        self.replay.lock().unwrap().loop_enabled
    }

    fn time(&self) -> u64 {
        (self.replay.lock().unwrap().position as f64 * 1e6) as u64
    }

    fn seek(&self, position: f32) -> Result<()> {
        let mut replay = self.replay.lock().unwrap();
        if !replay.open {
            return Err(SensorError::ReplayNotOpen);
        }
        replay.position = position.clamp(0.0, replay.length);
        Ok(())
    }

    fn resume_blocking(&self, duration: f32) -> Result<()> {
        let mut replay = self.replay.lock().unwrap();
        if !replay.open {
            return Err(SensorError::ReplayNotOpen);
        }
        let advanced = replay.position + duration;
        replay.position = if replay.loop_enabled && advanced >= replay.length {
            advanced % replay.length
        } else {
            advanced.min(replay.length)
        };
        Ok(())
    }
}
