//! Conversion from the sensor's projection-plane samples to Cartesian
//! points.

use crate::transform::CompiledTransform;
use crate::types::{ImagePoint, SensorPoint};

/// Map a projection-plane sample to Cartesian coordinates.
///
/// `(image_x, image_z, 1)` is treated as an un-normalized direction in the
/// sensor's optical frame; the returned point lies `distance` meters along
/// it. The axis remapping (`x = -image_x·ratio`, `y = ratio`,
/// `z = -image_z·ratio`) is the sensor's fixed coordinate convention:
/// y points out along the optical axis.
///
/// A distance of zero collapses the point to the origin; that is valid
/// input, not an error.
#[inline]
pub fn image_to_cartesian(image_x: f32, image_z: f32, distance: f32) -> [f32; 3] {
    let hypotenuse = (image_x * image_x + image_z * image_z + 1.0).sqrt();
    let ratio = distance / hypotenuse;
    [-image_x * ratio, ratio, -image_z * ratio]
}

/// Convert one native sample to a [`SensorPoint`].
///
/// Timestamp, intensity, return number, and the valid/saturated flags pass
/// through unchanged. This runs once per point per frame callback and does
/// not allocate.
#[inline]
pub fn convert_image_point(image_point: &ImagePoint) -> SensorPoint {
    let [x, y, z] = image_to_cartesian(
        image_point.image_x,
        image_point.image_z,
        image_point.distance,
    );
    SensorPoint {
        timestamp: image_point.timestamp,
        x,
        y,
        z,
        intensity: image_point.intensity,
        return_number: image_point.return_number,
        valid: image_point.valid,
        saturated: image_point.saturated,
    }
}

/// Convert one native sample and move it into the transform's target frame.
#[inline]
pub fn convert_image_point_with(
    image_point: &ImagePoint,
    transform: &CompiledTransform,
) -> SensorPoint {
    let mut point = convert_image_point(image_point);
    transform.apply_point(&mut point);
    point
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    fn assert_close(a: [f32; 3], b: [f32; 3]) {
        for i in 0..3 {
            assert!((a[i] - b[i]).abs() < EPS, "{:?} != {:?}", a, b);
        }
    }

    fn sample(image_x: f32, image_z: f32, distance: f32) -> ImagePoint {
        ImagePoint {
            timestamp: 1_000_000,
            image_x,
            distance,
            image_z,
            intensity: 0.75,
            return_number: 2,
            valid: 1,
            saturated: 0,
        }
    }

    #[test]
    fn test_center_of_image_maps_to_forward_axis() {
        for d in [0.5_f32, 1.0, 17.25] {
            assert_close(image_to_cartesian(0.0, 0.0, d), [0.0, d, 0.0]);
        }
    }

    #[test]
    fn test_unit_image_x_at_sqrt2() {
        // hypotenuse = sqrt(1 + 0 + 1) = sqrt(2), ratio = 1
        let d = 2.0_f32.sqrt();
        assert_close(image_to_cartesian(1.0, 0.0, d), [-1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_zero_distance_collapses_to_origin() {
        assert_close(image_to_cartesian(0.3, -0.8, 0.0), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_output_norm_equals_distance() {
        let [x, y, z] = image_to_cartesian(0.4, -0.2, 12.5);
        let norm = (x * x + y * y + z * z).sqrt();
        assert!((norm - 12.5).abs() < 1e-4);
    }

    #[test]
    fn test_metadata_passes_through() {
        let point = convert_image_point(&sample(0.0, 0.0, 3.0));
        assert_eq!(point.timestamp, 1_000_000);
        assert_eq!(point.intensity, 0.75);
        assert_eq!(point.return_number, 2);
        assert_eq!(point.valid, 1);
        assert_eq!(point.saturated, 0);
        assert_close([point.x, point.y, point.z], [0.0, 3.0, 0.0]);
    }

    #[test]
    fn test_convert_with_transform() {
        let pose = CompiledTransform::create([0.0, 0.0, 2.0], [0.0, 0.0, 0.0, 1.0]);
        let point = convert_image_point_with(&sample(0.0, 0.0, 5.0), &pose);
        assert_close([point.x, point.y, point.z], [0.0, 5.0, 2.0]);
        assert_eq!(point.timestamp, 1_000_000);
    }
}
