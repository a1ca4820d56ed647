//! Triangle / axis-aligned-cube overlap via the separating-axis theorem.
//!
//! Ported from the Akenine-Moller tribox3 test as adapted by the original
//! source: 3 face-normal axes, the triangle's own normal, and 9 edge-cross
//! axes. All comparisons are strict (`<`/`>`); a triangle exactly touching a
//! cube face counts as overlapping.

use crate::kcl::Triangle;
use crate::vector::Vector;

fn edge_axis_test(a1: f32, a2: f32, b1: f32, b2: f32, c1: f32, c2: f32, half_width: f32) -> bool {
    let p = a1 * b1 + a2 * b2;
    let q = a1 * c1 + a2 * c2;
    let r = half_width * (a1.abs() + a2.abs());
    (p < -r && q < -r) || (p > r && q > r)
}

#[allow(clippy::too_many_arguments)]
fn edge_test(
    v0_x: f32, v0_y: f32, v0_z: f32,
    v1_x: f32, v1_y: f32, v1_z: f32,
    v2_x: f32, v2_y: f32, v2_z: f32,
    half_width: f32,
) -> bool {
    let e_x = v1_x - v0_x;
    let e_y = v1_y - v0_y;
    let e_z = v1_z - v0_z;
    edge_axis_test(e_z, -e_y, v0_y, v0_z, v2_y, v2_z, half_width)
        || edge_axis_test(-e_z, e_x, v0_x, v0_z, v2_x, v2_z, half_width)
        || edge_axis_test(e_y, -e_x, v0_x, v0_y, v2_x, v2_y, half_width)
}

/// True if `triangle` overlaps the axis-aligned cube centered at `center`
/// with half side `half_width`.
pub fn tribox_overlap(triangle: &Triangle, center: Vector, half_width: f32) -> bool {
    let u_x = triangle.u.x - center.x;
    let u_y = triangle.u.y - center.y;
    let u_z = triangle.u.z - center.z;
    let v_x = triangle.v.x - center.x;
    let v_y = triangle.v.y - center.y;
    let v_z = triangle.v.z - center.z;
    let w_x = triangle.w.x - center.x;
    let w_y = triangle.w.y - center.y;
    let w_z = triangle.w.z - center.z;

    if (u_x < -half_width && v_x < -half_width && w_x < -half_width)
        || (u_x > half_width && v_x > half_width && w_x > half_width)
        || (u_y < -half_width && v_y < -half_width && w_y < -half_width)
        || (u_y > half_width && v_y > half_width && w_y > half_width)
        || (u_z < -half_width && v_z < -half_width && w_z < -half_width)
        || (u_z > half_width && v_z > half_width && w_z > half_width)
    {
        return false;
    }

    let n = triangle.n;
    let d = n.x * u_x + n.y * u_y + n.z * u_z;
    let r = half_width * (n.x.abs() + n.y.abs() + n.z.abs());
    if d < -r || d > r {
        return false;
    }

    if edge_test(u_x, u_y, u_z, v_x, v_y, v_z, w_x, w_y, w_z, half_width)
        || edge_test(v_x, v_y, v_z, w_x, w_y, w_z, u_x, u_y, u_z, half_width)
        || edge_test(w_x, w_y, w_z, u_x, u_y, u_z, v_x, v_y, v_z, half_width)
    {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle(u: Vector, v: Vector, w: Vector) -> Triangle {
        Triangle::new(u, v, w, 0).expect("non-degenerate")
    }

    #[test]
    fn triangle_inside_cube_overlaps() {
        let t = triangle(
            Vector::new(-0.1, -0.1, 0.0),
            Vector::new(0.1, -0.1, 0.0),
            Vector::new(0.0, 0.1, 0.0),
        );
        assert!(tribox_overlap(&t, Vector::ZERO, 1.0));
    }

    #[test]
    fn triangle_far_away_does_not_overlap() {
        let t = triangle(
            Vector::new(100.0, 100.0, 100.0),
            Vector::new(101.0, 100.0, 100.0),
            Vector::new(100.0, 101.0, 100.0),
        );
        assert!(!tribox_overlap(&t, Vector::ZERO, 1.0));
    }

    #[test]
    fn triangle_grazing_face_counts_as_overlap() {
        // Touches the cube's +x face exactly.
        let t = triangle(
            Vector::new(1.0, -0.5, -0.5),
            Vector::new(1.0, 0.5, -0.5),
            Vector::new(1.0, 0.0, 0.5),
        );
        assert!(tribox_overlap(&t, Vector::ZERO, 1.0));
    }
}
