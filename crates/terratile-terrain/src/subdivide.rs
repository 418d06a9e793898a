//! Face-split subdivision (simple and Catmull-Clark)
//!
//! Both schemes share one topology step: every n-gon becomes n quads built
//! from its corners, its edge points and its face point. They differ only in
//! where the new and old points are placed.

use crate::mesh::{edge_key, lerp_uv, Mesh, MeshError, Polygon};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use terratile_core::Vec3;

/// Placement rule used by a subdivision pass
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubdivisionScheme {
    /// Split faces without moving anything; the surface shape is unchanged
    Simple,
    /// Smooth the surface with the Catmull-Clark rules
    CatmullClark,
}

impl SubdivisionScheme {
    pub fn label(self) -> &'static str {
        match self {
            SubdivisionScheme::Simple => "simple",
            SubdivisionScheme::CatmullClark => "catmull-clark",
        }
    }
}

/// Number of polygons after `levels` passes over a mesh of quads
pub fn predicted_polygons(polygons: usize, levels: u32) -> u64 {
    (polygons as u64).saturating_mul(4u64.saturating_pow(levels))
}

/// Apply `levels` subdivision passes. The input must pass
/// [`Mesh::validate`].
pub fn subdivide(
    mesh: &Mesh,
    scheme: SubdivisionScheme,
    levels: u32,
) -> Result<Mesh, MeshError> {
    mesh.validate()?;
    let mut current = mesh.clone();
    for _ in 0..levels {
        current = subdivide_once(&current, scheme);
    }
    Ok(current)
}

struct EdgeInfo {
    /// Index of the new edge point
    point: u32,
    /// Polygons using this edge
    faces: Vec<usize>,
}

fn subdivide_once(mesh: &Mesh, scheme: SubdivisionScheme) -> Mesh {
    let vertex_count = mesh.positions.len();

    // Face points
    let face_points: Vec<(Vec3, [f32; 2])> = mesh
        .polygons
        .iter()
        .map(|polygon| {
            let n = polygon.vertices.len().max(1) as f32;
            let mut p = Vec3::ZERO;
            let mut uv = [0.0f32; 2];
            for &v in &polygon.vertices {
                p += mesh.positions[v as usize];
                uv[0] += mesh.uvs[v as usize][0];
                uv[1] += mesh.uvs[v as usize][1];
            }
            (p / n, [uv[0] / n, uv[1] / n])
        })
        .collect();

    // Edge table; edge points are numbered after the face points
    let mut edges: HashMap<(u32, u32), EdgeInfo> = HashMap::new();
    let mut edge_order: Vec<(u32, u32)> = Vec::new();
    let edge_base = (vertex_count + face_points.len()) as u32;
    for (fi, polygon) in mesh.polygons.iter().enumerate() {
        for (a, b) in polygon.edges() {
            let key = edge_key(a, b);
            let next = edge_base + edge_order.len() as u32;
            let info = edges.entry(key).or_insert_with(|| {
                edge_order.push(key);
                EdgeInfo {
                    point: next,
                    faces: Vec::new(),
                }
            });
            info.faces.push(fi);
        }
    }

    let mut positions = Vec::with_capacity(edge_base as usize + edge_order.len());
    let mut uvs = Vec::with_capacity(positions.capacity());

    match scheme {
        SubdivisionScheme::Simple => positions.extend_from_slice(&mesh.positions),
        SubdivisionScheme::CatmullClark => {
            positions.extend(smoothed_vertices(mesh, &face_points, &edges))
        }
    }
    uvs.extend_from_slice(&mesh.uvs);

    for (p, uv) in &face_points {
        positions.push(*p);
        uvs.push(*uv);
    }

    for key in &edge_order {
        let (a, b) = (key.0 as usize, key.1 as usize);
        let midpoint = mesh.positions[a].lerp(&mesh.positions[b], 0.5);
        let point = match scheme {
            SubdivisionScheme::CatmullClark if edges[key].faces.len() == 2 => {
                let f0 = face_points[edges[key].faces[0]].0;
                let f1 = face_points[edges[key].faces[1]].0;
                (mesh.positions[a] + mesh.positions[b] + f0 + f1) * 0.25
            }
            _ => midpoint,
        };
        positions.push(point);
        uvs.push(lerp_uv(mesh.uvs[a], mesh.uvs[b], 0.5));
    }

    let mut polygons = Vec::with_capacity(mesh.polygons.len() * 4);
    for (fi, polygon) in mesh.polygons.iter().enumerate() {
        let n = polygon.vertices.len();
        let face_point = (vertex_count + fi) as u32;
        for i in 0..n {
            let prev = polygon.vertices[(i + n - 1) % n];
            let cur = polygon.vertices[i];
            let next = polygon.vertices[(i + 1) % n];
            polygons.push(Polygon {
                vertices: vec![
                    cur,
                    edges[&edge_key(cur, next)].point,
                    face_point,
                    edges[&edge_key(prev, cur)].point,
                ],
                smooth: polygon.smooth,
            });
        }
    }

    Mesh {
        positions,
        uvs,
        polygons,
    }
}

/// Catmull-Clark placement of the original vertices.
///
/// Interior: `(Q + 2R + (n - 3)P) / n`. Boundary vertex with two boundary
/// edges: `(6P + A + B) / 8`. Corners and non-manifold vertices stay put.
fn smoothed_vertices(
    mesh: &Mesh,
    face_points: &[(Vec3, [f32; 2])],
    edges: &HashMap<(u32, u32), EdgeInfo>,
) -> Vec<Vec3> {
    let count = mesh.positions.len();
    let mut face_sum = vec![Vec3::ZERO; count];
    let mut face_count = vec![0usize; count];
    let mut edge_mid_sum = vec![Vec3::ZERO; count];
    let mut edge_count = vec![0usize; count];
    let mut boundary_neighbours: Vec<Vec<u32>> = vec![Vec::new(); count];
    let mut non_manifold = vec![false; count];

    for (fi, polygon) in mesh.polygons.iter().enumerate() {
        for &v in &polygon.vertices {
            face_sum[v as usize] += face_points[fi].0;
            face_count[v as usize] += 1;
        }
    }

    for (&(a, b), info) in edges {
        let mid = mesh.positions[a as usize].lerp(&mesh.positions[b as usize], 0.5);
        for v in [a, b] {
            edge_mid_sum[v as usize] += mid;
            edge_count[v as usize] += 1;
        }
        match info.faces.len() {
            1 => {
                boundary_neighbours[a as usize].push(b);
                boundary_neighbours[b as usize].push(a);
            }
            2 => {}
            _ => {
                non_manifold[a as usize] = true;
                non_manifold[b as usize] = true;
            }
        }
    }

    (0..count)
        .map(|v| {
            let p = mesh.positions[v];
            if face_count[v] == 0 || non_manifold[v] {
                return p;
            }
            match boundary_neighbours[v].as_slice() {
                [] => {
                    let n = edge_count[v] as f32;
                    let q = face_sum[v] / face_count[v] as f32;
                    let r = edge_mid_sum[v] / edge_count[v] as f32;
                    (q + r * 2.0 + p * (n - 3.0)) / n
                }
                [a, b] if face_count[v] > 1 => {
                    (p * 6.0 + mesh.positions[*a as usize] + mesh.positions[*b as usize]) / 8.0
                }
                _ => p,
            }
        })
        .collect()
}
