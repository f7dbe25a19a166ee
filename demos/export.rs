//! Capture frames and export the converted points to a file.
//!
//! Usage: cargo run --example export -- [-n FRAMES] [-f csv|bin] OUTPUT
//!
//! Points are converted to Cartesian coordinates before writing. CSV rows
//! are `timestamp,x,y,z,intensity`; binary output packs the same fields as
//! little-endian u64 + 4x f32 per point.
//!
//! Frames come from the in-memory SDK double, driven by a synthetic
//! emitter thread; swap in a real `NativeSdk` implementation for live data.

use lidar_sdk::mock::MockSdk;
use lidar_sdk::{points, ImagePoint, Options, Sdk, SensorHandle};
use std::io::{BufWriter, Write};
use std::sync::Arc;
use std::time::Duration;

enum Format {
    Csv,
    Bin,
}

fn usage() -> ! {
    eprintln!("Usage: export [-n FRAMES] [-f csv|bin] OUTPUT");
    std::process::exit(1);
}

fn synthetic_frame(frame_index: u64) -> Vec<ImagePoint> {
    // A sweep across the projection plane at a fixed distance.
    (0..64)
        .map(|i| ImagePoint {
            timestamp: frame_index * 50_000 + i * 10,
            image_x: (i as f32 - 32.0) / 32.0,
            distance: 10.0,
            image_z: 0.1,
            intensity: 0.5,
            return_number: 0,
            valid: 1,
            saturated: 0,
        })
        .collect()
}

fn main() {
    env_logger::init();

    let mut frames_wanted: usize = 1;
    let mut format = Format::Csv;
    let mut output: Option<String> = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-n" => {
                frames_wanted = args
                    .next()
                    .and_then(|v| v.parse().ok())
                    .filter(|&n| n > 0 && n <= 1000)
                    .unwrap_or_else(|| usage());
            }
            "-f" => match args.next().as_deref() {
                Some("csv") => format = Format::Csv,
                Some("bin") => format = Format::Bin,
                _ => usage(),
            },
            _ if arg.starts_with('-') => usage(),
            _ => output = Some(arg),
        }
    }
    let output = output.unwrap_or_else(|| usage());

    let native = Arc::new(MockSdk::new());
    let sdk = match Sdk::initialize(native.clone(), native.clone(), Options::default(), None) {
        Ok(sdk) => sdk,
        Err(e) => {
            eprintln!("Failed to initialize SDK: {}", e);
            std::process::exit(1);
        }
    };

    let stream = match sdk.frame_stream(64) {
        Ok(stream) => stream,
        Err(e) => {
            eprintln!("Failed to open frame stream: {}", e);
            std::process::exit(1);
        }
    };

    // Synthetic sensor: one frame every 50 ms.
    let emitter = std::thread::spawn(move || {
        for frame_index in 0..1002u64 {
            let points = synthetic_frame(frame_index);
            if !native.emit_frame(SensorHandle(1), &points) {
                break;
            }
            std::thread::sleep(Duration::from_millis(50));
        }
    });

    let file = match std::fs::File::create(&output) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to create {}: {}", output, e);
            std::process::exit(1);
        }
    };
    let mut writer = BufWriter::new(file);

    let mut exported = 0usize;
    let mut first_skipped = false;
    while exported < frames_wanted {
        let frame = match stream.recv_timeout(Duration::from_secs(2)) {
            Ok(frame) => frame,
            Err(e) => {
                eprintln!("Frame wait failed: {}", e);
                std::process::exit(1);
            }
        };
        // Skip the first frame; it may be partial.
        if !first_skipped {
            first_skipped = true;
            continue;
        }

        for image_point in frame.points.iter() {
            let p = points::convert_image_point(image_point);
            let result = match format {
                Format::Csv => writeln!(
                    writer,
                    "{},{},{},{},{}",
                    p.timestamp, p.x, p.y, p.z, p.intensity
                ),
                Format::Bin => writer
                    .write_all(&p.timestamp.to_le_bytes())
                    .and_then(|_| writer.write_all(&p.x.to_le_bytes()))
                    .and_then(|_| writer.write_all(&p.y.to_le_bytes()))
                    .and_then(|_| writer.write_all(&p.z.to_le_bytes()))
                    .and_then(|_| writer.write_all(&p.intensity.to_le_bytes())),
            };
            if let Err(e) = result {
                eprintln!("Write failed: {}", e);
                std::process::exit(1);
            }
        }
        exported += 1;
        println!("Exported frame {}/{} ({} points)", exported, frames_wanted, frame.len());
    }

    if let Err(e) = writer.flush() {
        eprintln!("Flush failed: {}", e);
        std::process::exit(1);
    }
    drop(stream);
    // Release the native slot so the emitter sees no listener and stops.
    if let Err(e) = sdk.frames().deinitialize() {
        eprintln!("Frame manager shutdown failed: {}", e);
    }
    let _ = emitter.join();
}
