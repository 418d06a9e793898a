//! Polygon mesh storage and the topology edits used to cut terrain into tiles

use std::collections::HashMap;
use terratile_core::Vec3;
use thiserror::Error;

/// Errors raised by geometry operations on a [`Mesh`]
#[derive(Debug, Error, PartialEq)]
pub enum MeshError {
    #[error("polygon {polygon} has {corners} corners, expected a quad")]
    NotAQuad { polygon: usize, corners: usize },

    #[error("polygon {polygon} references vertex {vertex}, mesh has {count}")]
    VertexOutOfRange {
        polygon: usize,
        vertex: u32,
        count: usize,
    },

    #[error("mesh has {positions} positions but {uvs} UVs")]
    UvCountMismatch { positions: usize, uvs: usize },

    #[error("mesh has no vertices")]
    Empty,
}

/// A single face, as an ordered loop of vertex indices (CCW seen from +Z)
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    pub vertices: Vec<u32>,
    /// Smooth faces interpolate vertex normals instead of using the face normal
    pub smooth: bool,
}

impl Polygon {
    pub fn new(vertices: Vec<u32>) -> Self {
        Self {
            vertices,
            smooth: false,
        }
    }

    /// Iterate the polygon's edges as (from, to) pairs, wrapping around
    pub fn edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }
}

/// Undirected edge key with the smaller index first
pub(crate) fn edge_key(a: u32, b: u32) -> (u32, u32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Polygon mesh with one UV per vertex
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions in object-local space
    pub positions: Vec<Vec3>,
    /// UV coordinates, normalized over the whole terrain
    pub uvs: Vec<[f32; 2]>,
    pub polygons: Vec<Polygon>,
}

impl Mesh {
    /// A 2×2 quad centered at the origin in the XY plane (corners at ±1),
    /// UVs spanning [0,1]²
    pub fn unit_quad() -> Self {
        Self {
            positions: vec![
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(-1.0, 1.0, 0.0),
            ],
            uvs: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            polygons: vec![Polygon::new(vec![0, 1, 2, 3])],
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    /// Number of triangles after fan triangulation of every polygon
    pub fn triangle_count(&self) -> usize {
        self.polygons
            .iter()
            .map(|p| p.vertices.len().saturating_sub(2))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn set_smooth(&mut self, smooth: bool) {
        for polygon in &mut self.polygons {
            polygon.smooth = smooth;
        }
    }

    pub fn all_smooth(&self) -> bool {
        self.polygons.iter().all(|p| p.smooth)
    }

    /// Check that every vertex has a UV and every polygon references an
    /// existing vertex
    pub fn validate(&self) -> Result<(), MeshError> {
        let count = self.positions.len();
        if self.uvs.len() != count {
            return Err(MeshError::UvCountMismatch {
                positions: count,
                uvs: self.uvs.len(),
            });
        }
        for (pi, polygon) in self.polygons.iter().enumerate() {
            if let Some(&vertex) = polygon.vertices.iter().find(|&&v| v as usize >= count) {
                return Err(MeshError::VertexOutOfRange {
                    polygon: pi,
                    vertex,
                    count,
                });
            }
        }
        Ok(())
    }

    /// Axis-aligned bounds in local space, or `None` for an empty mesh
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))),
        )
    }

    pub fn translate(&mut self, offset: Vec3) {
        for p in &mut self.positions {
            *p += offset;
        }
    }

    /// Cut every quad into a `(cuts + 1) × (cuts + 1)` lattice.
    ///
    /// Vertices created on an edge are shared by both polygons using that
    /// edge, so the result stays connected.
    pub fn subdivide_grid(&mut self, cuts: u32) -> Result<(), MeshError> {
        if cuts == 0 {
            return Ok(());
        }
        self.validate()?;

        let steps = cuts + 1;
        let mut positions = self.positions.clone();
        let mut uvs = self.uvs.clone();
        // (low, high) edge -> interior vertices ordered from low to high
        let mut edge_points: HashMap<(u32, u32), Vec<u32>> = HashMap::new();
        let mut polygons = Vec::with_capacity(self.polygons.len() * (steps * steps) as usize);

        for (pi, polygon) in self.polygons.iter().enumerate() {
            if polygon.vertices.len() != 4 {
                return Err(MeshError::NotAQuad {
                    polygon: pi,
                    corners: polygon.vertices.len(),
                });
            }
            let c = [
                polygon.vertices[0],
                polygon.vertices[1],
                polygon.vertices[2],
                polygon.vertices[3],
            ];

            // Lattice indexed [row][col]; row walks c0->c3, col walks c0->c1
            let n = steps as usize + 1;
            let mut lattice = vec![vec![0u32; n]; n];

            let mut edge_run = |a: u32, b: u32, positions: &mut Vec<Vec3>, uvs: &mut Vec<[f32; 2]>| {
                let key = edge_key(a, b);
                let run = edge_points.entry(key).or_insert_with(|| {
                    (1..steps)
                        .map(|k| {
                            let t = k as f32 / steps as f32;
                            let (lo, hi) = (key.0 as usize, key.1 as usize);
                            let p = positions[lo].lerp(&positions[hi], t);
                            let uv = lerp_uv(uvs[lo], uvs[hi], t);
                            positions.push(p);
                            uvs.push(uv);
                            (positions.len() - 1) as u32
                        })
                        .collect()
                });
                let mut run = run.clone();
                if key.0 != a {
                    run.reverse();
                }
                run
            };

            let bottom = edge_run(c[0], c[1], &mut positions, &mut uvs);
            let right = edge_run(c[1], c[2], &mut positions, &mut uvs);
            let top = edge_run(c[3], c[2], &mut positions, &mut uvs);
            let left = edge_run(c[0], c[3], &mut positions, &mut uvs);

            let last = n - 1;
            lattice[0][0] = c[0];
            lattice[0][last] = c[1];
            lattice[last][last] = c[2];
            lattice[last][0] = c[3];
            for k in 1..last {
                lattice[0][k] = bottom[k - 1];
                lattice[last][k] = top[k - 1];
                lattice[k][0] = left[k - 1];
                lattice[k][last] = right[k - 1];
            }

            for row in 1..last {
                for col in 1..last {
                    let s = col as f32 / steps as f32;
                    let t = row as f32 / steps as f32;
                    let [p0, p1, p2, p3] = c.map(|v| positions[v as usize]);
                    let [u0, u1, u2, u3] = c.map(|v| uvs[v as usize]);
                    let lower = p0.lerp(&p1, s);
                    let upper = p3.lerp(&p2, s);
                    let uv = lerp_uv(lerp_uv(u0, u1, s), lerp_uv(u3, u2, s), t);
                    positions.push(lower.lerp(&upper, t));
                    uvs.push(uv);
                    lattice[row][col] = (positions.len() - 1) as u32;
                }
            }

            for row in 0..last {
                for col in 0..last {
                    polygons.push(Polygon {
                        vertices: vec![
                            lattice[row][col],
                            lattice[row][col + 1],
                            lattice[row + 1][col + 1],
                            lattice[row + 1][col],
                        ],
                        smooth: polygon.smooth,
                    });
                }
            }
        }

        self.positions = positions;
        self.uvs = uvs;
        self.polygons = polygons;
        Ok(())
    }

    /// Split every edge: each polygon gets private copies of its corners,
    /// so no two polygons share a vertex afterwards.
    pub fn split_edges(&mut self) -> Result<(), MeshError> {
        self.validate()?;
        let corner_total: usize = self.polygons.iter().map(|p| p.vertices.len()).sum();
        let mut positions = Vec::with_capacity(corner_total);
        let mut uvs = Vec::with_capacity(corner_total);

        for polygon in &mut self.polygons {
            for v in &mut polygon.vertices {
                positions.push(self.positions[*v as usize]);
                uvs.push(self.uvs[*v as usize]);
                *v = (positions.len() - 1) as u32;
            }
        }

        self.positions = positions;
        self.uvs = uvs;
        Ok(())
    }

    /// Separate the mesh into one mesh per loose part (polygons connected
    /// through shared vertices). Parts are ordered by their first polygon.
    /// Vertices used by no polygon are dropped.
    pub fn separate_loose(&self) -> Result<Vec<Mesh>, MeshError> {
        self.validate()?;
        let mut parents: Vec<u32> = (0..self.positions.len() as u32).collect();

        for polygon in &self.polygons {
            if let Some((&first, rest)) = polygon.vertices.split_first() {
                for &v in rest {
                    union(&mut parents, first, v);
                }
            }
        }

        let mut part_of_root: HashMap<u32, usize> = HashMap::new();
        let mut parts: Vec<(Mesh, HashMap<u32, u32>)> = Vec::new();

        for polygon in &self.polygons {
            let Some(&first) = polygon.vertices.first() else {
                continue;
            };
            let root = find(&mut parents, first);
            let part_index = *part_of_root.entry(root).or_insert_with(|| {
                parts.push((Mesh::default(), HashMap::new()));
                parts.len() - 1
            });
            let (part, remap) = &mut parts[part_index];

            let vertices = polygon
                .vertices
                .iter()
                .map(|&v| {
                    *remap.entry(v).or_insert_with(|| {
                        part.positions.push(self.positions[v as usize]);
                        part.uvs.push(self.uvs[v as usize]);
                        (part.positions.len() - 1) as u32
                    })
                })
                .collect();
            part.polygons.push(Polygon {
                vertices,
                smooth: polygon.smooth,
            });
        }

        Ok(parts.into_iter().map(|(mesh, _)| mesh).collect())
    }

    /// Face normal by Newell's method; its length is twice the polygon area
    pub fn face_normal_weighted(&self, polygon: &Polygon) -> Vec3 {
        let mut n = Vec3::ZERO;
        for (a, b) in polygon.edges() {
            let p = self.positions[a as usize];
            let q = self.positions[b as usize];
            n.x += (p.y - q.y) * (p.z + q.z);
            n.y += (p.z - q.z) * (p.x + q.x);
            n.z += (p.x - q.x) * (p.y + q.y);
        }
        n
    }

    /// Area-weighted vertex normals. Vertices without any polygon, or whose
    /// faces are degenerate, get +Z.
    pub fn vertex_normals(&self) -> Vec<Vec3> {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for polygon in &self.polygons {
            let n = self.face_normal_weighted(polygon);
            for &v in &polygon.vertices {
                normals[v as usize] += n;
            }
        }
        normals
            .into_iter()
            .map(|n| {
                if n.length() > f32::EPSILON {
                    n.normalized()
                } else {
                    Vec3::UP
                }
            })
            .collect()
    }

    /// Total surface area
    pub fn surface_area(&self) -> f32 {
        self.polygons
            .iter()
            .map(|p| self.face_normal_weighted(p).length() * 0.5)
            .sum()
    }

    /// Center of mass of the surface, treating it as a thin shell of uniform
    /// density. Falls back to the vertex mean when the surface has no area.
    pub fn center_of_mass(&self) -> Result<Vec3, MeshError> {
        if self.positions.is_empty() {
            return Err(MeshError::Empty);
        }

        let mut weighted = Vec3::ZERO;
        let mut total_area = 0.0f32;
        for polygon in &self.polygons {
            let Some((&anchor, rest)) = polygon.vertices.split_first() else {
                continue;
            };
            let a = self.positions[anchor as usize];
            for pair in rest.windows(2) {
                let b = self.positions[pair[0] as usize];
                let c = self.positions[pair[1] as usize];
                let area = (b - a).cross(&(c - a)).length() * 0.5;
                weighted += (a + b + c) * (area / 3.0);
                total_area += area;
            }
        }

        if total_area > f32::EPSILON {
            Ok(weighted / total_area)
        } else {
            let sum = self
                .positions
                .iter()
                .fold(Vec3::ZERO, |acc, p| acc + *p);
            Ok(sum / self.positions.len() as f32)
        }
    }
}

pub(crate) fn lerp_uv(a: [f32; 2], b: [f32; 2], t: f32) -> [f32; 2] {
    [a[0] + (b[0] - a[0]) * t, a[1] + (b[1] - a[1]) * t]
}

fn find(parents: &mut [u32], v: u32) -> u32 {
    let mut root = v;
    while parents[root as usize] != root {
        root = parents[root as usize];
    }
    // Path compression
    let mut cur = v;
    while parents[cur as usize] != root {
        let next = parents[cur as usize];
        parents[cur as usize] = root;
        cur = next;
    }
    root
}

fn union(parents: &mut [u32], a: u32, b: u32) {
    let ra = find(parents, a);
    let rb = find(parents, b);
    if ra != rb {
        parents[ra.max(rb) as usize] = ra.min(rb);
    }
}
