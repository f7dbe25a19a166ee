//! List all attached sensors.
//!
//! Runs against the in-memory SDK double so it works without hardware;
//! swap in a real `NativeSdk` implementation to enumerate live sensors.

use lidar_sdk::mock::MockSdk;
use lidar_sdk::{Options, Sdk, SensorHandle, SensorInformation};
use std::sync::Arc;

fn main() {
    env_logger::init();

    let native = Arc::new(MockSdk::new());
    native.add_sensor(SensorInformation {
        handle: SensorHandle(1),
        serial_number: 11_220_041,
        model: "VSP-64".to_string(),
        firmware_version: "1.9.2".to_string(),
    });
    native.add_sensor(SensorInformation {
        handle: SensorHandle(2),
        serial_number: 11_220_018,
        model: "VSP-16".to_string(),
        firmware_version: "1.8.0".to_string(),
    });

    let sdk = match Sdk::initialize(native.clone(), native, Options::default(), None) {
        Ok(sdk) => sdk,
        Err(e) => {
            eprintln!("Failed to initialize SDK: {}", e);
            std::process::exit(1);
        }
    };

    let serial_numbers = sdk.sensor_serial_numbers();
    println!("Found {} sensor(s):", serial_numbers.len());
    for serial_number in serial_numbers {
        match sdk.sensor_information_by_serial_number(serial_number) {
            Ok(info) => println!(
                "  SN={}  Model={}  FW={}  Handle={:?}",
                info.serial_number, info.model, info.firmware_version, info.handle
            ),
            Err(e) => eprintln!("  SN={}  query failed: {}", serial_number, e),
        }
    }
}
