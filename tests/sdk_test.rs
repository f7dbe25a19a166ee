//! End-to-end tests of the facade, callback managers, and streams running
//! against the in-memory SDK double.

use lidar_sdk::mock::MockSdk;
use lidar_sdk::sdk::NativeSdk;
use lidar_sdk::{
    points, ControlFlags, ErrorCode, ImagePoint, Options, Sdk, SensorError, SensorHandle,
    SensorInformation,
};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn sensor(handle: u64, serial_number: u64) -> SensorInformation {
    SensorInformation {
        handle: SensorHandle(handle),
        serial_number,
        model: "VSP-64".to_string(),
        firmware_version: "1.9.2".to_string(),
    }
}

fn image_point(image_x: f32, image_z: f32, distance: f32) -> ImagePoint {
    ImagePoint {
        timestamp: 123_456,
        image_x,
        distance,
        image_z,
        intensity: 0.5,
        return_number: 0,
        valid: 1,
        saturated: 0,
    }
}

fn start_live() -> (Arc<MockSdk>, Sdk) {
    let mock = Arc::new(MockSdk::new());
    let sdk = Sdk::initialize(mock.clone(), mock.clone(), Options::default(), None).unwrap();
    (mock, sdk)
}

#[test]
fn test_initialize_starts_native_sdk_and_error_listener() {
    let (mock, _sdk) = start_live();
    assert!(mock.is_started());
    // The facade always wires a logging error listener; it accepts both
    // failure codes and zero-code informational notifications.
    assert!(mock.error_listener_active());
    assert!(mock.emit_error(SensorHandle(1), ErrorCode(-9), "detector overheating"));
    assert!(mock.emit_error(SensorHandle(1), ErrorCode(0), "clock resynchronized"));
}

#[test]
fn test_capture_path_disables_network() {
    let mock = Arc::new(MockSdk::new());
    mock.set_capture_length(2.0);
    let sdk = Sdk::initialize(
        mock.clone(),
        mock.clone(),
        Options::default(),
        Some(Path::new("drive.pcap")),
    )
    .unwrap();

    let options = mock.initialized_options().unwrap();
    assert!(options.control_flags.contains(ControlFlags::DISABLE_NETWORK));
    assert!(!sdk.is_live());
    // initialize() waits one second into the capture, then rewinds.
    assert_eq!(sdk.time(), 0);
}

#[test]
fn test_wait_runs_replay_to_end() {
    let mock = Arc::new(MockSdk::new());
    mock.set_capture_length(0.5);
    let sdk = Sdk::initialize(
        mock.clone(),
        mock.clone(),
        Options::default(),
        Some(Path::new("drive.pcap")),
    )
    .unwrap();

    assert!(!sdk.is_end());
    sdk.wait(0.0).unwrap();
    assert!(sdk.is_end());
    assert_eq!(sdk.time(), 500_000);
}

#[test]
fn test_frames_fan_out_identical_events() {
    let (mock, sdk) = start_live();
    sdk.frames().initialize().unwrap();

    let seen_a = Arc::new(Mutex::new(Vec::new()));
    let seen_b = Arc::new(Mutex::new(Vec::new()));
    let (a, b) = (seen_a.clone(), seen_b.clone());

    sdk.frames()
        .listen(1, move |frame| {
            a.lock().unwrap().push((frame.handle, frame.points.to_vec()));
        })
        .unwrap();
    sdk.frames()
        .listen(2, move |frame| {
            b.lock().unwrap().push((frame.handle, frame.points.to_vec()));
        })
        .unwrap();

    let points = [image_point(0.0, 0.0, 4.0), image_point(1.0, 0.0, 2.0)];
    assert!(mock.emit_frame(SensorHandle(7), &points));
    assert!(mock.emit_frame(SensorHandle(7), &points[..1]));

    let seen_a = seen_a.lock().unwrap();
    let seen_b = seen_b.lock().unwrap();
    assert_eq!(*seen_a, *seen_b);
    assert_eq!(seen_a.len(), 2);
    assert_eq!(seen_a[0].0, SensorHandle(7));
    assert_eq!(seen_a[0].1.len(), 2);
}

#[test]
fn test_duplicate_listener_keeps_prior_registration() {
    let (mock, sdk) = start_live();
    sdk.frames().initialize().unwrap();

    let count = Arc::new(AtomicUsize::new(0));
    let count2 = count.clone();
    sdk.frames()
        .listen(42, move |_| {
            count2.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    let err = sdk.frames().listen(42, |_| {}).unwrap_err();
    assert!(matches!(err, SensorError::DuplicateListener(42)));

    mock.emit_frame(SensorHandle(1), &[image_point(0.0, 0.0, 1.0)]);
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(sdk.frames().subscriber_count(), 1);
}

#[test]
fn test_manager_initialize_guard_and_deinitialize_noop() {
    let (mock, sdk) = start_live();
    sdk.packets().deinitialize().unwrap();

    sdk.packets().initialize().unwrap();
    assert!(matches!(
        sdk.packets().initialize(),
        Err(SensorError::AlreadyInitialized)
    ));
    assert!(mock.packet_listener_active());

    sdk.packets().deinitialize().unwrap();
    sdk.packets().deinitialize().unwrap();
    assert!(!mock.packet_listener_active());
}

#[test]
fn test_packet_event_payload_passthrough() {
    let (mock, sdk) = start_live();
    sdk.packets().initialize().unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen2 = seen.clone();
    sdk.packets().subscribe(move |packet| {
        seen2
            .lock()
            .unwrap()
            .push((packet.receive_timestamp, packet.data.to_vec()));
    });

    mock.emit_packet(SensorHandle(3), 987_654, &[0xde, 0xad, 0xbe, 0xef]);
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0], (987_654, vec![0xde, 0xad, 0xbe, 0xef]));
}

#[test]
fn test_frame_stream_delivers_convertible_points() {
    let (mock, sdk) = start_live();
    let stream = sdk.frame_stream(8).unwrap();

    let d = 2.0_f32.sqrt();
    mock.emit_frame(SensorHandle(1), &[image_point(1.0, 0.0, d)]);

    let frame = stream.recv_timeout(Duration::from_secs(1)).unwrap();
    assert_eq!(frame.len(), 1);
    let point = points::convert_image_point(&frame.points[0]);
    assert!((point.x + 1.0).abs() < 1e-5);
    assert!((point.y - 1.0).abs() < 1e-5);
    assert!(point.z.abs() < 1e-5);
    assert_eq!(point.timestamp, 123_456);

    // A second stream shares the already-registered native slot.
    let other = sdk.frame_stream(8).unwrap();
    mock.emit_frame(SensorHandle(1), &[image_point(0.0, 0.0, 1.0)]);
    assert!(other.recv_timeout(Duration::from_secs(1)).is_ok());
}

#[test]
fn test_dropping_sdk_releases_everything() {
    let mock = Arc::new(MockSdk::new());
    {
        let sdk =
            Sdk::initialize(mock.clone(), mock.clone(), Options::default(), None).unwrap();
        sdk.frames().initialize().unwrap();
        sdk.packets().initialize().unwrap();
    }
    assert!(!mock.is_started());
    assert!(!mock.frame_listener_active());
    assert!(!mock.packet_listener_active());
    assert!(!mock.error_listener_active());
}

#[test]
fn test_sensor_lookup_helpers() {
    let (mock, sdk) = start_live();
    mock.add_sensor(sensor(1, 3003));
    mock.add_sensor(sensor(2, 1001));
    mock.add_sensor(sensor(3, 2002));

    assert!(sdk.has_sensor_by_serial_number(1001));
    assert!(!sdk.has_sensor_by_serial_number(9999));

    let info = sdk.sensor_information_by_serial_number(2002).unwrap();
    assert_eq!(info.handle, SensorHandle(3));
    assert_eq!(info.model, "VSP-64");

    assert!(matches!(
        sdk.sensor_information_by_serial_number(9999),
        Err(SensorError::SensorNotFound { serial_number: 9999 })
    ));

    assert_eq!(sdk.sensor_serial_numbers(), vec![1001, 2002, 3003]);
}

#[test]
fn test_sensor_enumeration_skips_failing_sensor() {
    let (mock, sdk) = start_live();
    mock.add_sensor(sensor(1, 3003));
    mock.add_sensor(sensor(2, 1001));
    mock.add_sensor(sensor(3, 2002));
    // The middle sensor's query fails; enumeration must carry on.
    mock.fail_sensor_at(1);

    assert_eq!(sdk.sensor_serial_numbers(), vec![2002, 3003]);
}

#[test]
fn test_concurrent_subscription_churn_during_delivery() {
    let (mock, sdk) = start_live();
    let sdk = Arc::new(sdk);
    sdk.frames().initialize().unwrap();

    let delivered = Arc::new(AtomicUsize::new(0));
    let delivered2 = delivered.clone();
    sdk.frames()
        .listen(u64::MAX, move |_| {
            delivered2.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    let emitter = {
        let mock = mock.clone();
        std::thread::spawn(move || {
            for _ in 0..500 {
                mock.emit_frame(SensorHandle(1), &[image_point(0.0, 0.0, 1.0)]);
            }
        })
    };

    let churners: Vec<_> = (0..4u64)
        .map(|t| {
            let sdk = sdk.clone();
            std::thread::spawn(move || {
                for i in 0..100u64 {
                    let id = t * 1000 + i;
                    sdk.frames().listen(id, |_| {}).unwrap();
                    sdk.frames().unlisten(id);
                }
            })
        })
        .collect();

    emitter.join().unwrap();
    for churner in churners {
        churner.join().unwrap();
    }

    // The permanent listener saw every frame; the churned ids are gone.
    assert_eq!(delivered.load(Ordering::SeqCst), 500);
    assert_eq!(sdk.frames().subscriber_count(), 1);
}

#[test]
fn test_native_errors_propagate_as_results() {
    let mock = Arc::new(MockSdk::new());
    // Facade initialization fails cleanly when the native SDK refuses.
    mock.initialize(Options::default()).unwrap();
    let err = Sdk::initialize(mock.clone(), mock.clone(), Options::default(), None).unwrap_err();
    assert!(err.code().is_some());
}
