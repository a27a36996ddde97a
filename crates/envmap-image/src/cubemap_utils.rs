/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Spherical mapping helpers shared by the cubemap layout transforms
//!
//! A cube face carries a fixed (right, up, axis) basis; a texel at face
//! coordinates `(u, v)` in `[-1, 1]^2` maps to the normalized direction
//! `u * right + v * up + axis`. The inverse picks the face by the
//! dominant absolute component of the direction and projects the other
//! two components back onto the basis.
//!
//! Latitude-longitude coordinates are in `[0, 1]^2`, longitude wrapping
//! horizontally and latitude running from the `+Y` pole at `v = 0` to the
//! `-Y` pole at `v = 1`.

use std::f32::consts::PI;

/// Per-face `(right, up, axis)` basis vectors, face order `+X, -X, +Y,
/// -Y, +Z, -Z`
#[rustfmt::skip]
pub static FACE_UV_VECTORS: [[[f32; 3]; 3]; 6] = [
    [ // +x
        [ 0.0,  0.0, -1.0],
        [ 0.0, -1.0,  0.0],
        [ 1.0,  0.0,  0.0],
    ],
    [ // -x
        [ 0.0,  0.0,  1.0],
        [ 0.0, -1.0,  0.0],
        [-1.0,  0.0,  0.0],
    ],
    [ // +y
        [ 1.0,  0.0,  0.0],
        [ 0.0,  0.0,  1.0],
        [ 0.0,  1.0,  0.0],
    ],
    [ // -y
        [ 1.0,  0.0,  0.0],
        [ 0.0,  0.0, -1.0],
        [ 0.0, -1.0,  0.0],
    ],
    [ // +z
        [ 1.0,  0.0,  0.0],
        [ 0.0, -1.0,  0.0],
        [ 0.0,  0.0,  1.0],
    ],
    [ // -z
        [-1.0,  0.0,  0.0],
        [ 0.0, -1.0,  0.0],
        [ 0.0,  0.0, -1.0],
    ],
];

#[inline]
fn dot(a: &[f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// The normalized sample direction of face texel `(u, v)`, both in
/// `[-1, 1]`
pub fn texel_coord_to_vec(u: f32, v: f32, face: u8) -> [f32; 3] {
    let basis = &FACE_UV_VECTORS[usize::from(face)];

    let mut vec = [0.0_f32; 3];
    for (component, out) in vec.iter_mut().enumerate() {
        *out = basis[0][component] * u + basis[1][component] * v + basis[2][component];
    }

    let inv_len = 1.0 / (vec[0] * vec[0] + vec[1] * vec[1] + vec[2] * vec[2]).sqrt();
    [vec[0] * inv_len, vec[1] * inv_len, vec[2] * inv_len]
}

/// The `(u, v, face)` a direction lands on, `u` and `v` in `[0, 1]`
///
/// The face is the sign of the dominant absolute component; the
/// remaining components divided by it give the face coordinates.
pub fn vec_to_texel_coord(vec: [f32; 3]) -> (f32, f32, u8) {
    let abs = [vec[0].abs(), vec[1].abs(), vec[2].abs()];
    let max = abs[0].max(abs[1]).max(abs[2]);

    let face = if max == abs[0] {
        if vec[0] >= 0.0 { 0 } else { 1 }
    } else if max == abs[1] {
        if vec[1] >= 0.0 { 2 } else { 3 }
    } else if vec[2] >= 0.0 {
        4
    } else {
        5
    };

    let face_vec = [vec[0] / max, vec[1] / max, vec[2] / max];
    let basis = &FACE_UV_VECTORS[face];

    let u = (dot(&basis[0], face_vec) + 1.0) * 0.5;
    let v = (dot(&basis[1], face_vec) + 1.0) * 0.5;

    (u, v, face as u8)
}

/// The latitude-longitude `(u, v)` of a direction, both in `[0, 1]`
pub fn latlong_from_vec(vec: [f32; 3]) -> (f32, f32) {
    let phi = vec[0].atan2(vec[2]);
    let theta = vec[1].clamp(-1.0, 1.0).acos();

    ((PI + phi) * (0.5 / PI), theta * (1.0 / PI))
}

/// The direction of a latitude-longitude `(u, v)`, both in `[0, 1]`
pub fn vec_from_latlong(u: f32, v: f32) -> [f32; 3] {
    let phi = u * 2.0 * PI;
    let theta = v * PI;

    [
        -theta.sin() * phi.sin(),
        theta.cos(),
        -theta.sin() * phi.cos()
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-5, "{a} != {b}");
    }

    #[test]
    fn face_centers_map_to_axes() {
        let expected: [[f32; 3]; 6] = [
            [1.0, 0.0, 0.0],
            [-1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, -1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, -1.0]
        ];
        for face in 0..6 {
            let vec = texel_coord_to_vec(0.0, 0.0, face);
            for component in 0..3 {
                assert_close(vec[component], expected[usize::from(face)][component]);
            }
        }
    }

    #[test]
    fn texel_to_vec_to_texel_roundtrip() {
        for face in 0..6_u8 {
            for (u, v) in [(0.0, 0.0), (0.5, -0.25), (-0.75, 0.75), (0.9, 0.9)] {
                let vec = texel_coord_to_vec(u, v, face);
                let (u_out, v_out, face_out) = vec_to_texel_coord(vec);
                assert_eq!(face_out, face);
                // vec_to_texel_coord returns [0,1] coordinates
                assert_close(u_out * 2.0 - 1.0, u);
                assert_close(v_out * 2.0 - 1.0, v);
            }
        }
    }

    #[test]
    fn latlong_roundtrip() {
        for (u, v) in [(0.1, 0.2), (0.5, 0.5), (0.9, 0.8), (0.25, 0.65)] {
            let vec = vec_from_latlong(u, v);
            let (u_out, v_out) = latlong_from_vec(vec);
            assert_close(u_out, u);
            assert_close(v_out, v);
        }
    }

    #[test]
    fn poles_map_to_y_faces() {
        let north = vec_from_latlong(0.3, 0.0);
        assert_close(north[1], 1.0);
        let (_, _, face) = vec_to_texel_coord(north);
        assert_eq!(face, 2);

        let south = vec_from_latlong(0.3, 1.0);
        let (_, _, face) = vec_to_texel_coord(south);
        assert_eq!(face, 3);
    }
}
