//! Pivot recentering: move each tile's origin to its surface center of mass

use crate::progress::ProgressReporter;
use crate::scene::TerrainScene;
use crate::tile::TileMesh;
use terratile_core::{Result, Stage, TerrainError, TileId, Vec3};
use tracing::{debug, info};

/// Move the tile's local origin to the center of mass of its geometry,
/// keeping every vertex where it is in world space. Returns the new pivot
/// in world space.
pub fn recenter_pivot(tile: &mut TileMesh) -> Result<Vec3> {
    let center = tile.mesh.center_of_mass().map_err(|e| TerrainError::Stage {
        stage: Stage::Recenter,
        tile: None,
        message: format!("{}: {}", tile.name, e),
    })?;

    tile.mesh.translate(-center);
    tile.transform.position = tile.transform.transform_point(center);
    Ok(tile.transform.position)
}

/// Recenter every target's pivot, one progress unit per tile
pub fn recenter_pivots(
    scene: &mut TerrainScene,
    targets: &[TileId],
    progress: &mut dyn ProgressReporter,
) -> Result<usize> {
    let targets = scene.resolve_targets(targets)?;
    let total = targets.len();
    progress.begin(Stage::Recenter, total);

    for (index, id) in targets.iter().enumerate() {
        let tile = scene.get_mut(*id).ok_or_else(|| {
            TerrainError::stage_on_tile(Stage::Recenter, index, id.to_string(), "tile is not in the scene")
        })?;
        if tile.mesh.is_empty() {
            progress.end();
            return Err(TerrainError::stage_on_tile(
                Stage::Recenter,
                index,
                tile.name.clone(),
                "tile has no geometry",
            ));
        }
        let pivot = recenter_pivot(tile)?;
        debug!(tile = %tile.name, x = pivot.x, y = pivot.y, z = pivot.z, "Recentered pivot");
        progress.update(index + 1);

        if index + 1 < total && progress.cancel_requested() {
            progress.end();
            return Err(TerrainError::Cancelled {
                stage: Stage::Recenter,
                completed: index + 1,
                total,
            });
        }
    }

    progress.end();
    info!(tiles = total, "Recentered pivots");
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TerrainConfig;
    use crate::mesh::{Mesh, Polygon};
    use crate::partition::create_tiles;
    use crate::progress::NoProgress;
    use terratile_core::Transform;

    fn assert_same_points(a: &[Vec3], b: &[Vec3], tolerance: f32) {
        assert_eq!(a.len(), b.len());
        for (p, q) in a.iter().zip(b) {
            assert!(p.distance(q) <= tolerance, "{:?} moved to {:?}", p, q);
        }
    }

    #[test]
    fn tiles_pivot_at_their_own_centers() {
        let mut scene = TerrainScene::new();
        let config = TerrainConfig {
            tiles: 2,
            size: [100, 100, 10],
            ..TerrainConfig::default()
        };
        let ids = create_tiles(&mut scene, &config).unwrap();
        let before: Vec<_> = ids.iter().map(|id| scene.get(*id).unwrap().world_positions()).collect();

        recenter_pivots(&mut scene, &ids, &mut NoProgress).unwrap();

        let first = scene.get(ids[0]).unwrap();
        assert!(first.transform.position.distance(&Vec3::new(-50.0, -50.0, 0.0)) < 1e-3);
        assert!(first.mesh.center_of_mass().unwrap().length() < 1e-5);
        let last = scene.get(ids[3]).unwrap();
        assert!(last.transform.position.distance(&Vec3::new(50.0, 50.0, 0.0)) < 1e-3);

        for (id, world) in ids.iter().zip(&before) {
            assert_same_points(world, &scene.get(*id).unwrap().world_positions(), 1e-3);
        }
    }

    #[test]
    fn irregular_shape_keeps_world_positions() {
        // An L-shaped, tilted surface under a non-uniform transform
        let mesh = Mesh {
            positions: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(2.0, 0.0, 1.0),
                Vec3::new(2.0, 1.0, 1.0),
                Vec3::new(1.0, 1.0, 0.5),
                Vec3::new(1.0, 3.0, 0.5),
                Vec3::new(0.0, 3.0, 0.0),
            ],
            uvs: vec![[0.0, 0.0]; 6],
            polygons: vec![Polygon::new(vec![0, 1, 2, 3, 4, 5])],
        };
        let transform = Transform::from_position(Vec3::new(7.0, -2.0, 4.0))
            .with_scale(Vec3::new(3.0, 0.5, 2.0));
        let mut tile = TileMesh::new((0, 0), transform, mesh);
        let before = tile.world_positions();

        recenter_pivot(&mut tile).unwrap();
        assert_same_points(&before, &tile.world_positions(), 1e-4);
        assert!(tile.mesh.center_of_mass().unwrap().length() < 1e-4);
        assert_eq!(tile.transform.scale, transform.scale);
    }

    #[test]
    fn recentering_twice_is_stable() {
        let mut tile = TileMesh::new(
            (0, 0),
            Transform::IDENTITY,
            {
                let mut m = Mesh::unit_quad();
                m.translate(Vec3::new(4.0, 4.0, 0.0));
                m
            },
        );
        let first = recenter_pivot(&mut tile).unwrap();
        let second = recenter_pivot(&mut tile).unwrap();
        assert!(first.distance(&second) < 1e-5);
    }

    #[test]
    fn empty_tile_is_a_stage_error() {
        let mut scene = TerrainScene::new();
        let id = scene.insert(TileMesh::new((0, 0), Transform::IDENTITY, Mesh::default()));
        let err = recenter_pivots(&mut scene, &[id], &mut NoProgress).unwrap_err();
        assert_eq!(err.kind(), terratile_core::ErrorKind::Stage);
        assert!(err.to_string().contains("Tile_0_0"));
    }
}
