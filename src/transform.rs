//! Rigid-body transform compiled from a pose.

use crate::types::SensorPoint;

/// A translation plus a rotation matrix precomputed from a quaternion.
///
/// Building the matrix once amortizes the quaternion algebra over an entire
/// frame; `apply` is then 9 multiplies and 6 adds per point, which matters
/// when a frame carries tens of thousands of points.
///
/// The quaternion passed to [`CompiledTransform::create`] must be
/// normalized. The expansion assumes unit length and does not renormalize;
/// an unnormalized quaternion silently produces a scaled or skewed
/// (non-rigid) matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompiledTransform {
    /// Meters [x, y, z].
    pub translation: [f32; 3],
    /// Row-major rotation matrix.
    pub rotation: [[f32; 3]; 3],
}

impl CompiledTransform {
    /// Compile a pose from a translation and a quaternion [x, y, z, w].
    pub fn create(translation: [f32; 3], quaternion: [f32; 4]) -> CompiledTransform {
        let [x, y, z, w] = quaternion;
        let xx = x * x;
        let xy = x * y;
        let xz = x * z;
        let xw = x * w;
        let yy = y * y;
        let yz = y * z;
        let yw = y * w;
        let zz = z * z;
        let zw = z * w;

        CompiledTransform {
            translation,
            rotation: [
                [1.0 - 2.0 * (yy + zz), 2.0 * (xy - zw), 2.0 * (xz + yw)],
                [2.0 * (xy + zw), 1.0 - 2.0 * (xx + zz), 2.0 * (yz - xw)],
                [2.0 * (xz - yw), 2.0 * (yz + xw), 1.0 - 2.0 * (xx + yy)],
            ],
        }
    }

    /// Rotate then translate a position: `R·p + t`.
    pub fn apply(&self, p: [f32; 3]) -> [f32; 3] {
        let [x, y, z] = p;
        let r = &self.rotation;
        [
            x * r[0][0] + y * r[0][1] + z * r[0][2] + self.translation[0],
            x * r[1][0] + y * r[1][1] + z * r[1][2] + self.translation[1],
            x * r[2][0] + y * r[2][1] + z * r[2][2] + self.translation[2],
        ]
    }

    /// Apply the transform to a point's position in place, leaving all
    /// other fields untouched.
    pub fn apply_point(&self, point: &mut SensorPoint) {
        let [x, y, z] = self.apply([point.x, point.y, point.z]);
        point.x = x;
        point.y = y;
        point.z = z;
    }
}

impl Default for CompiledTransform {
    /// The identity transform.
    fn default() -> Self {
        CompiledTransform {
            translation: [0.0; 3],
            rotation: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }
}
