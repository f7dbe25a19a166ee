//! # lidar-sdk - Convenience layer over a LiDAR sensor SDK
//!
//! Sits on top of the native sensor SDK's single-slot listener API and
//! provides:
//! - Multi-subscriber dispatch of frame, packet, and error events
//! - Conversion of raw projection-plane samples to Cartesian points
//! - Rigid-body transforms compiled from translation + quaternion poses
//! - A facade for session setup, capture replay control, and sensor lookup
//!
//! ## Quick Start
//! ```no_run
//! use lidar_sdk::{points, Options, Sdk};
//! use std::sync::Arc;
//!
//! # fn native() -> Arc<lidar_sdk::mock::MockSdk> { Arc::new(lidar_sdk::mock::MockSdk::new()) }
//! let native = native();
//! let sdk = Sdk::initialize(native.clone(), native, Options::default(), None).unwrap();
//!
//! sdk.frames().initialize().unwrap();
//! sdk.frames().subscribe(|frame| {
//!     for image_point in frame.points.iter() {
//!         let point = points::convert_image_point(image_point);
//!         println!("{} {} {}", point.x, point.y, point.z);
//!     }
//! });
//! sdk.wait(5.0).unwrap();
//! ```

pub mod error;
pub mod types;
pub mod sdk;
pub mod transform;
pub mod points;
pub mod callback;
pub mod manager;
pub mod stream;
pub mod api;
pub mod mock;

pub use api::{current_timestamp_usec, Sdk};
pub use callback::{CallbackManager, ListenerHandle};
pub use error::{ErrorCode, SensorError};
pub use manager::{
    ErrorCallbackManager, ImageFrameCallbackManager, NetworkPacketCallbackManager,
    SdkCallbackManager,
};
pub use stream::{EventStream, FrameStream, PacketStream, SensorErrorStream};
pub use transform::CompiledTransform;
pub use types::*;

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, SensorError>;
