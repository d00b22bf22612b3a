//! Mathematical utilities for beam element calculations

pub mod sparse;

use nalgebra::{DMatrix, DVector, Matrix3, SMatrix, SVector, Vector3};

use crate::elements::BendingCoefficients;
use crate::error::{FrameError, FrameResult};

pub use sparse::{solve_dense_lu, SkylineCholesky, SparseMatrixBuilder};

pub type Mat = DMatrix<f64>;
pub type Vec = DVector<f64>;
pub type Mat3 = Matrix3<f64>;
pub type Vec3 = Vector3<f64>;

/// 12x12 matrix for element stiffness
pub type Mat12 = SMatrix<f64, 12, 12>;
/// 12-element vector for element end forces/displacements
pub type Vec12 = SVector<f64, 12>;

/// Endpoints closer than this are treated as coincident
pub const LENGTH_TOLERANCE: f64 = 1e-9;

/// Smallest accepted sine of the angle between the orientation vector and
/// the element axis
pub const COLINEAR_TOLERANCE: f64 = 1e-6;

/// Compute the local axes of a beam element
///
/// # Arguments
/// * `a` - Start node coordinates
/// * `b` - End node coordinates
/// * `c` - Orientation reference; fixes the local x-y plane
///
/// # Returns
/// Length and the 3x3 rotation whose columns are local x, y, z in global
/// coordinates
pub fn local_axes(a: &Vec3, b: &Vec3, c: &Vec3) -> FrameResult<(f64, Mat3)> {
    let axis = b - a;
    let length = axis.norm();
    if !length.is_finite() || length < LENGTH_TOLERANCE {
        return Err(FrameError::InvalidGeometry(format!(
            "element endpoints coincide (length {length:e})"
        )));
    }
    let x = axis / length;

    let reference = c - a;
    let reference_len = reference.norm();
    if !reference_len.is_finite() {
        return Err(FrameError::InvalidGeometry(
            "orientation node has a non-finite coordinate".to_string(),
        ));
    }
    if reference_len < LENGTH_TOLERANCE {
        return Err(FrameError::InvalidGeometry(
            "orientation node coincides with the start node".to_string(),
        ));
    }

    // Gram-Schmidt: drop the component along x
    let raw_y = reference - reference.dot(&x) * x;
    let raw_y_len = raw_y.norm();
    if !raw_y_len.is_finite() || raw_y_len < COLINEAR_TOLERANCE * reference_len {
        return Err(FrameError::InvalidGeometry(
            "orientation node is colinear with the element axis".to_string(),
        ));
    }
    let y = raw_y / raw_y_len;
    let z = x.cross(&y);

    Ok((length, Mat3::from_columns(&[x, y, z])))
}

/// Tile a 3x3 rotation four times along the diagonal of a 12x12 matrix
pub fn tile_rotation(r: &Mat3) -> Mat12 {
    let mut t = Mat12::zeros();
    for i in 0..4 {
        let offset = i * 3;
        t.fixed_view_mut::<3, 3>(offset, offset).copy_from(r);
    }
    t
}

/// Compute the local stiffness matrix for a 3D beam element
///
/// DOF order is [ux, uy, uz, θx, θy, θz] at the start node followed by the
/// same six at the end node. Bending terms come from the section's
/// precomputed coefficients scaled by powers of 1/L.
///
/// # Arguments
/// * `axial` - E·A
/// * `torsion` - G·J
/// * `c` - Bending coefficients of the section
/// * `length` - Element length
pub fn beam_local_stiffness(axial: f64, torsion: f64, c: &BendingCoefficients, length: f64) -> Mat12 {
    let l = length;
    let l2 = l * l;
    let l3 = l2 * l;

    let k = axial / l;
    let t = torsion / l;

    let z12 = c.ez12 / l3;
    let z6 = c.ez6 / l2;
    let z4 = c.ez4 / l;
    let z2 = c.ez2 / l;

    let y12 = c.ey12 / l3;
    let y6 = c.ey6 / l2;
    let y4 = c.ey4 / l;
    let y2 = c.ey2 / l;

    #[rustfmt::skip]
    let data = [
        // Row 0: axial at start
        k,    0.0,  0.0,  0.0, 0.0, 0.0,  -k,   0.0,  0.0,  0.0, 0.0, 0.0,
        // Row 1: shear Fy at start
        0.0,  z12,  0.0,  0.0, 0.0, z6,   0.0,  -z12, 0.0,  0.0, 0.0, z6,
        // Row 2: shear Fz at start
        0.0,  0.0,  y12,  0.0, -y6, 0.0,  0.0,  0.0,  -y12, 0.0, -y6, 0.0,
        // Row 3: torsion at start
        0.0,  0.0,  0.0,  t,   0.0, 0.0,  0.0,  0.0,  0.0,  -t,  0.0, 0.0,
        // Row 4: moment My at start
        0.0,  0.0,  -y6,  0.0, y4,  0.0,  0.0,  0.0,  y6,   0.0, y2,  0.0,
        // Row 5: moment Mz at start
        0.0,  z6,   0.0,  0.0, 0.0, z4,   0.0,  -z6,  0.0,  0.0, 0.0, z2,
        // Row 6: axial at end
        -k,   0.0,  0.0,  0.0, 0.0, 0.0,  k,    0.0,  0.0,  0.0, 0.0, 0.0,
        // Row 7: shear Fy at end
        0.0,  -z12, 0.0,  0.0, 0.0, -z6,  0.0,  z12,  0.0,  0.0, 0.0, -z6,
        // Row 8: shear Fz at end
        0.0,  0.0,  -y12, 0.0, y6,  0.0,  0.0,  0.0,  y12,  0.0, y6,  0.0,
        // Row 9: torsion at end
        0.0,  0.0,  0.0,  -t,  0.0, 0.0,  0.0,  0.0,  0.0,  t,   0.0, 0.0,
        // Row 10: moment My at end
        0.0,  0.0,  -y6,  0.0, y2,  0.0,  0.0,  0.0,  y6,   0.0, y4,  0.0,
        // Row 11: moment Mz at end
        0.0,  z6,   0.0,  0.0, 0.0, z2,   0.0,  -z6,  0.0,  0.0, 0.0, z4,
    ];

    Mat12::from_row_slice(&data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn coefficients(e: f64, iyy: f64, izz: f64) -> BendingCoefficients {
        BendingCoefficients {
            ez12: 12.0 * e * izz,
            ez6: 6.0 * e * izz,
            ez4: 4.0 * e * izz,
            ez2: 2.0 * e * izz,
            ey12: 12.0 * e * iyy,
            ey6: 6.0 * e * iyy,
            ey4: 4.0 * e * iyy,
            ey2: 2.0 * e * iyy,
        }
    }

    #[test]
    fn test_axes_along_x() {
        let (len, r) = local_axes(
            &Vec3::new(0.0, 0.0, 0.0),
            &Vec3::new(10.0, 0.0, 0.0),
            &Vec3::new(3.0, 2.0, 0.0),
        )
        .unwrap();
        assert_relative_eq!(len, 10.0);
        assert_relative_eq!(r, Mat3::identity(), epsilon = 1e-12);
    }

    #[test]
    fn test_axes_vertical_member() {
        // Column along +Z with the orientation node offset in +X
        let (_, r) = local_axes(
            &Vec3::new(1.0, 1.0, 0.0),
            &Vec3::new(1.0, 1.0, 4.0),
            &Vec3::new(2.0, 1.0, 2.0),
        )
        .unwrap();
        assert_relative_eq!(r.column(0).into_owned(), Vec3::z(), epsilon = 1e-12);
        assert_relative_eq!(r.column(1).into_owned(), Vec3::x(), epsilon = 1e-12);
        assert_relative_eq!(r.column(2).into_owned(), Vec3::y(), epsilon = 1e-12);
    }

    #[test]
    fn test_axes_orthonormal_inclined() {
        let (len, r) = local_axes(
            &Vec3::new(0.5, -1.0, 2.0),
            &Vec3::new(3.0, 4.0, -1.0),
            &Vec3::new(-2.0, 0.3, 7.0),
        )
        .unwrap();
        assert_relative_eq!(len, (2.5f64.powi(2) + 25.0 + 9.0).sqrt(), epsilon = 1e-12);
        assert_relative_eq!(r.transpose() * r, Mat3::identity(), epsilon = 1e-12);
        assert_relative_eq!(r.determinant(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_rejected() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(5.0, 0.0, 0.0);
        assert!(local_axes(&a, &a, &Vec3::new(0.0, 1.0, 0.0)).is_err());
        assert!(local_axes(&a, &b, &Vec3::new(12.0, 0.0, 0.0)).is_err());
        assert!(local_axes(&a, &b, &Vec3::new(-3.0, 1e-9, 0.0)).is_err());
        assert!(local_axes(&a, &b, &a).is_err());
        assert!(local_axes(&a, &b, &Vec3::new(2.0, 1e-3, 0.0)).is_ok());
    }

    #[test]
    fn test_non_finite_rejected() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(5.0, 0.0, 0.0);
        assert!(local_axes(&a, &b, &Vec3::new(f64::NAN, 1.0, 0.0)).is_err());
        assert!(local_axes(&a, &b, &Vec3::new(0.0, f64::INFINITY, 0.0)).is_err());
        assert!(local_axes(&a, &Vec3::new(f64::NAN, 0.0, 0.0), &Vec3::new(0.0, 1.0, 0.0)).is_err());
    }

    #[test]
    fn test_tile_rotation() {
        let r = Mat3::new(0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0);
        let t = tile_rotation(&r);
        assert_eq!(t[(9, 10)], -1.0);
        assert_eq!(t[(4, 3)], 1.0);
        assert_eq!(t[(0, 3)], 0.0);
        assert_relative_eq!(t * t.transpose(), Mat12::identity(), epsilon = 1e-12);
    }

    #[test]
    fn test_local_stiffness_symmetry() {
        let k = beam_local_stiffness(200e9 * 0.01, 77e9 * 1e-5, &coefficients(200e9, 1e-4, 2e-4), 10.0);

        for i in 0..12 {
            for j in 0..12 {
                assert_relative_eq!(k[(i, j)], k[(j, i)], epsilon = 1e-6);
            }
        }
        assert!(k.iter().filter(|v| **v != 0.0).count() <= 40);
    }

    #[test]
    fn test_local_stiffness_terms() {
        let (e, iyy, izz, l) = (2.0, 3.0, 5.0, 2.0);
        let k = beam_local_stiffness(e * 0.5, 7.0, &coefficients(e, iyy, izz), l);
        assert_relative_eq!(k[(0, 0)], 0.5);
        assert_relative_eq!(k[(3, 9)], -3.5);
        assert_relative_eq!(k[(1, 1)], 12.0 * e * izz / 8.0);
        assert_relative_eq!(k[(1, 5)], 6.0 * e * izz / 4.0);
        assert_relative_eq!(k[(2, 4)], -6.0 * e * iyy / 4.0);
        assert_relative_eq!(k[(10, 10)], 4.0 * e * iyy / 2.0);
        assert_relative_eq!(k[(5, 11)], 2.0 * e * izz / 2.0);
    }

    #[test]
    fn test_rigid_body_translation_is_free() {
        let k = beam_local_stiffness(3.0, 2.0, &coefficients(1.0, 2.0, 3.0), 4.0);
        let mut u = Vec12::zeros();
        for i in [0, 6] {
            u[i] = 1.0;
            u[i + 1] = -2.0;
            u[i + 2] = 0.5;
        }
        assert_relative_eq!((k * u).norm(), 0.0, epsilon = 1e-12);
    }
}
