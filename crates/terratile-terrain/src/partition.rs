//! Tile partitioning: cut a scaled base quad into an N×N grid of tile objects

use crate::config::TerrainConfig;
use crate::mesh::{Mesh, MeshError};
use crate::scene::TerrainScene;
use crate::tile::TileMesh;
use terratile_core::{Result, Stage, TerrainError, TileId, Transform, Vec3};
use tracing::{debug, info};

/// Result of cutting the base quad, before tiles enter a scene
#[derive(Debug)]
pub struct Partition {
    pub transform: Transform,
    /// Tile meshes in row-major order (row 0 first)
    pub meshes: Vec<Mesh>,
    /// Whether the edge split and loose-part separation ran
    pub separated: bool,
}

fn stage_error(err: MeshError) -> TerrainError {
    TerrainError::Stage {
        stage: Stage::Partition,
        tile: None,
        message: err.to_string(),
    }
}

/// Build the tile meshes for `config` without touching any scene.
///
/// The tile count is validated before any geometry is created.
pub fn partition(config: &TerrainConfig) -> Result<Partition> {
    config.validate_tiles()?;
    for (axis, value) in ["size.x", "size.y", "size.z"].iter().zip(config.size) {
        if value < 1 {
            return Err(TerrainError::ValueOutOfRange {
                field: axis.to_string(),
                min: 1,
                max: i32::MAX as i64,
                value: value as i64,
            });
        }
    }

    let tiles = config.tiles as u32;
    let transform = Transform::from_position(Vec3::ZERO).with_scale(config.base_scale());

    let mut base = Mesh::unit_quad();
    base.set_smooth(true);

    if tiles == 1 {
        debug!("Single tile, skipping subdivision and separation");
        return Ok(Partition {
            transform,
            meshes: vec![base],
            separated: false,
        });
    }

    base.subdivide_grid(tiles - 1).map_err(stage_error)?;
    base.split_edges().map_err(stage_error)?;
    let meshes = base.separate_loose().map_err(stage_error)?;

    let expected = (tiles * tiles) as usize;
    if meshes.len() != expected {
        return Err(TerrainError::Stage {
            stage: Stage::Partition,
            tile: None,
            message: format!(
                "separation produced {} parts, expected {}",
                meshes.len(),
                expected
            ),
        });
    }

    Ok(Partition {
        transform,
        meshes,
        separated: true,
    })
}

/// Create the tile objects for `config` in `scene` and select them.
///
/// Returns the new tile IDs in row-major order.
pub fn create_tiles(scene: &mut TerrainScene, config: &TerrainConfig) -> Result<Vec<TileId>> {
    let Partition {
        transform,
        meshes,
        separated,
    } = partition(config)?;

    let side = config.tiles as u32;
    let ids: Vec<TileId> = meshes
        .into_iter()
        .enumerate()
        .map(|(i, mesh)| {
            let cell = (i as u32 % side, i as u32 / side);
            scene.insert(TileMesh::new(cell, transform, mesh))
        })
        .collect();

    scene.select(&ids)?;
    info!(
        tiles = ids.len(),
        separated,
        mode = %config.height_mode,
        "Created tiles"
    );
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HeightMode;

    fn config(tiles: i32) -> TerrainConfig {
        TerrainConfig {
            tiles,
            ..TerrainConfig::default()
        }
    }

    #[test]
    fn every_tile_count_yields_disjoint_square_grid() {
        for tiles in 1..=16 {
            let p = partition(&config(tiles)).unwrap();
            let n = (tiles * tiles) as usize;
            assert_eq!(p.meshes.len(), n);
            let vertices: usize = p.meshes.iter().map(Mesh::vertex_count).sum();
            assert_eq!(vertices as u64, config(tiles).predicted_vertex_count());
            for mesh in &p.meshes {
                assert_eq!(mesh.polygon_count(), 1);
                assert_eq!(mesh.vertex_count(), 4);
                assert!(mesh.all_smooth());
            }
        }
    }

    #[test]
    fn tiles_cover_the_quad_without_overlap() {
        let p = partition(&config(4)).unwrap();
        let area: f32 = p.meshes.iter().map(Mesh::surface_area).sum();
        assert!((area - 4.0).abs() < 1e-5);
        // Row-major: tile 1 sits right of tile 0, tile 4 above tile 0
        let (lo0, _) = p.meshes[0].bounds().unwrap();
        let (lo1, _) = p.meshes[1].bounds().unwrap();
        let (lo4, _) = p.meshes[4].bounds().unwrap();
        assert!((lo0.x - -1.0).abs() < 1e-6 && (lo0.y - -1.0).abs() < 1e-6);
        assert!((lo1.x - -0.5).abs() < 1e-6);
        assert!((lo4.y - -0.5).abs() < 1e-6);
    }

    #[test]
    fn default_terrain_spans_twice_the_size() {
        let mut scene = TerrainScene::new();
        let ids = create_tiles(&mut scene, &config(1)).unwrap();
        let (lo, hi) = scene.get(ids[0]).unwrap().world_bounds().unwrap();
        assert_eq!(lo, Vec3::new(-2048.0, -2048.0, 0.0));
        assert_eq!(hi, Vec3::new(2048.0, 2048.0, 0.0));
    }

    #[test]
    fn single_tile_skips_separation() {
        let p = partition(&config(1)).unwrap();
        assert!(!p.separated);
        assert_eq!(p.meshes.len(), 1);
        assert_eq!(p.meshes[0].vertex_count(), 4);
        assert!(partition(&config(2)).unwrap().separated);
    }

    #[test]
    fn invalid_tile_counts_fail_before_geometry() {
        for tiles in [0, -1, 17] {
            let err = partition(&config(tiles)).unwrap_err();
            assert_eq!(err.kind(), terratile_core::ErrorKind::Config);
        }
        let mut scene = TerrainScene::new();
        assert!(create_tiles(&mut scene, &config(0)).is_err());
        assert!(scene.is_empty());
    }

    #[test]
    fn scale_follows_height_mode() {
        let mut c = TerrainConfig {
            tiles: 2,
            size: [300, 200, 50],
            height_mode: HeightMode::Displacement,
            ..TerrainConfig::default()
        };
        assert_eq!(partition(&c).unwrap().transform.scale, Vec3::new(300.0, 200.0, 1.0));
        c.height_mode = HeightMode::ObjectHeight;
        assert_eq!(partition(&c).unwrap().transform.scale, Vec3::new(300.0, 200.0, 50.0));
    }

    #[test]
    fn create_tiles_names_and_selects_tiles() {
        let mut scene = TerrainScene::new();
        let ids = create_tiles(&mut scene, &config(3)).unwrap();
        assert_eq!(ids.len(), 9);
        assert_eq!(scene.selection(), ids.as_slice());
        let names: Vec<&str> = ids.iter().map(|id| scene.get(*id).unwrap().name.as_str()).collect();
        assert_eq!(names[0], "Tile_0_0");
        assert_eq!(names[1], "Tile_1_0");
        assert_eq!(names[3], "Tile_0_1");
        assert_eq!(scene.get(ids[8]).unwrap().cell, (2, 2));
    }
}
