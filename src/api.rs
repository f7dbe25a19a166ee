//! High-level facade tying the callback managers to the native SDK and the
//! capture-replay collaborator.

use crate::error::SensorError;
use crate::manager::{
    ErrorCallbackManager, ImageFrameCallbackManager, NetworkPacketCallbackManager,
    SdkCallbackManager,
};
use crate::sdk::{CaptureReplay, NativeSdk};
use crate::stream::FrameStream;
use crate::types::{ControlFlags, Options, SensorHandle, SensorInformation};
use crate::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Current unix timestamp in microseconds, the timestamp format used
/// throughout the SDK.
pub fn current_timestamp_usec() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}

/// An initialized SDK session.
///
/// Owns the native SDK handle, the capture-replay control surface, and one
/// callback manager per event kind. Dropping the session unregisters every
/// native listener and shuts the SDK down.
pub struct Sdk {
    native: Arc<dyn NativeSdk>,
    replay: Arc<dyn CaptureReplay>,
    frames: ImageFrameCallbackManager,
    packets: NetworkPacketCallbackManager,
    errors: ErrorCallbackManager,
}

impl std::fmt::Debug for Sdk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sdk").finish_non_exhaustive()
    }
}

impl Sdk {
    /// Start the native SDK and optionally open a capture for replay.
    ///
    /// When a capture path is given, live network input is disabled, the
    /// capture is opened, replay is primed for one second, and the position
    /// is rewound to the start. Error notifications are always subscribed
    /// to a logging listener, so sensor faults surface in the log even when
    /// the application registers no listener of its own.
    pub fn initialize(
        native: Arc<dyn NativeSdk>,
        replay: Arc<dyn CaptureReplay>,
        mut options: Options,
        capture_path: Option<&Path>,
    ) -> Result<Sdk> {
        if capture_path.is_some() {
            options.control_flags |= ControlFlags::DISABLE_NETWORK;
        }
        native.initialize(options)?;

        let sdk = Sdk {
            frames: SdkCallbackManager::image_frames(Arc::clone(&native)),
            packets: SdkCallbackManager::network_packets(Arc::clone(&native)),
            errors: SdkCallbackManager::errors(Arc::clone(&native)),
            native,
            replay,
        };

        sdk.errors.initialize()?;
        sdk.errors.subscribe(|event| {
            if event.code.is_error() {
                log::error!(
                    "sensor {:?} error {}: {}",
                    event.handle,
                    event.code,
                    event.message
                );
            } else {
                log::info!("sensor {:?}: {}", event.handle, event.message);
            }
        });

        // Prime the replay by one second, then rewind, so sensor records
        // are populated before the caller starts listening. Live sessions
        // settle on the caller's schedule via `wait`.
        if let Some(path) = capture_path {
            sdk.replay.open(path)?;
            sdk.wait(1.0)?;
            sdk.replay.seek(0.0)?;
        }
        Ok(sdk)
    }

    /// True if no capture replay is open.
    pub fn is_live(&self) -> bool {
        !self.replay.is_open()
    }

    /// True if live, or if capture replay advances on its own.
    pub fn is_realtime(&self) -> bool {
        self.is_live() || self.replay.is_running()
    }

    /// True once a non-looping capture replay has reached its end. Always
    /// false when live.
    pub fn is_end(&self) -> bool {
        if self.replay.is_open() {
            if self.replay.loop_enabled() {
                return false;
            }
            return self.replay.is_end();
        }
        false
    }

    /// Capture replay time, or wall-clock time when live, in microseconds.
    pub fn time(&self) -> u64 {
        if self.is_live() {
            current_timestamp_usec()
        } else {
            self.replay.time()
        }
    }

    /// Sleep or resume capture replay for `t_length` seconds.
    ///
    /// A length of zero waits until the capture ends (forever when live).
    pub fn wait(&self, t_length: f32) -> Result<()> {
        if t_length > 0.0 {
            return self.wait_once(t_length);
        }
        loop {
            self.wait_once(0.1)?;
            if self.is_end() {
                return Ok(());
            }
        }
    }

    fn wait_once(&self, t_length: f32) -> Result<()> {
        if self.is_realtime() {
            std::thread::sleep(Duration::from_secs_f32(t_length));
            Ok(())
        } else {
            self.replay.resume_blocking(t_length)
        }
    }

    /// Manager for image-frame events.
    pub fn frames(&self) -> &ImageFrameCallbackManager {
        &self.frames
    }

    /// Manager for raw network-packet events.
    pub fn packets(&self) -> &NetworkPacketCallbackManager {
        &self.packets
    }

    /// Manager for error notifications.
    pub fn errors(&self) -> &ErrorCallbackManager {
        &self.errors
    }

    /// Open a bounded pull-style stream of frames, registering the frame
    /// manager with the native SDK if it is not registered yet.
    pub fn frame_stream(&self, capacity: usize) -> Result<FrameStream> {
        match self.frames.initialize() {
            Ok(()) | Err(SensorError::AlreadyInitialized) => {}
            Err(err) => return Err(err),
        }
        Ok(self.frames.stream(capacity))
    }

    pub fn has_sensor_by_serial_number(&self, serial_number: u64) -> bool {
        self.native
            .sensor_handle_by_serial_number(serial_number)
            .is_ok()
    }

    pub fn sensor_information_by_serial_number(
        &self,
        serial_number: u64,
    ) -> Result<SensorInformation> {
        let handle = self.native.sensor_handle_by_serial_number(serial_number)?;
        self.native.sensor_information(handle)
    }

    pub fn sensor_information(&self, handle: SensorHandle) -> Result<SensorInformation> {
        self.native.sensor_information(handle)
    }

    /// Serial numbers of all attached sensors, sorted ascending. Sensors
    /// whose information query fails are logged and skipped.
    pub fn sensor_serial_numbers(&self) -> Vec<u64> {
        let n_sensors = self.native.n_sensors();
        let mut serial_numbers = Vec::with_capacity(n_sensors);
        for index in 0..n_sensors {
            match self.native.sensor_information_by_index(index) {
                Ok(info) => serial_numbers.push(info.serial_number),
                Err(err) => {
                    log::warn!("failed to query sensor {}: {}", index, err);
                }
            }
        }
        serial_numbers.sort_unstable();
        serial_numbers
    }
}

impl Drop for Sdk {
    fn drop(&mut self) {
        // Release the listener slots before stopping the SDK itself.
        for result in [
            self.frames.deinitialize(),
            self.packets.deinitialize(),
            self.errors.deinitialize(),
            self.native.deinitialize(),
        ] {
            if let Err(err) = result {
                log::warn!("SDK shutdown: {}", err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_timestamp_is_recent() {
        // Sanity bound: after 2020-01-01 in microseconds.
        assert!(current_timestamp_usec() > 1_577_836_800_000_000);
    }
}
