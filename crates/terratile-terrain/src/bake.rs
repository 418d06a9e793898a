//! Stack baking: collapse each tile's modifiers into concrete geometry

use crate::progress::ProgressReporter;
use crate::scene::TerrainScene;
use terratile_core::{Result, Stage, TerrainError, TileId};
use tracing::{debug, info};

/// Bake every target. Tiles without a stack are left as they are.
///
/// Before evaluating a tile its predicted polygon count is checked against
/// `max_tile_polygons`; a tile over budget fails the stage, and tiles baked
/// earlier in the batch stay baked.
pub fn bake_tiles(
    scene: &mut TerrainScene,
    targets: &[TileId],
    max_tile_polygons: u64,
    progress: &mut dyn ProgressReporter,
) -> Result<usize> {
    let targets = scene.resolve_targets(targets)?;
    let total = targets.len();
    progress.begin(Stage::Bake, total);

    let mut baked = 0;
    for (index, id) in targets.iter().enumerate() {
        let tile = scene.get_mut(*id).ok_or_else(|| {
            TerrainError::stage_on_tile(Stage::Bake, index, id.to_string(), "tile is not in the scene")
        })?;

        let predicted = tile.stack.predicted_polygons(tile.mesh.polygon_count());
        if predicted > max_tile_polygons {
            progress.end();
            return Err(TerrainError::stage_on_tile(
                Stage::Bake,
                index,
                tile.name.clone(),
                format!(
                    "evaluating the stack would create {} polygons, limit is {}",
                    predicted, max_tile_polygons
                ),
            ));
        }

        let did_bake = tile.bake().map_err(|e| {
            progress.end();
            TerrainError::stage_on_tile(Stage::Bake, index, tile.name.clone(), e.to_string())
        })?;
        if did_bake {
            baked += 1;
            debug!(
                tile = %tile.name,
                vertices = tile.mesh.vertex_count(),
                polygons = tile.mesh.polygon_count(),
                "Baked tile"
            );
        }
        progress.update(index + 1);

        if index + 1 < total && progress.cancel_requested() {
            progress.end();
            return Err(TerrainError::Cancelled {
                stage: Stage::Bake,
                completed: index + 1,
                total,
            });
        }
    }

    progress.end();
    info!(tiles = total, baked, "Applied modifiers");
    Ok(baked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HeightMode, TerrainConfig};
    use crate::heightmap::HeightmapResource;
    use crate::modifier::{build_modifier_stacks, StackParams};
    use crate::partition::create_tiles;
    use crate::progress::NoProgress;
    use crate::test_support::RecordingProgress;
    use crate::tile::TileState;
    use std::sync::Arc;

    fn stacked_scene(config: &TerrainConfig) -> (TerrainScene, Vec<TileId>) {
        let mut scene = TerrainScene::new();
        let ids = create_tiles(&mut scene, config).unwrap();
        // Bump in the middle of the terrain
        let source = Arc::new(HeightmapResource::from_raw(
            vec![0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0],
            3,
            3,
        ));
        let params = StackParams::from_config(config).unwrap();
        build_modifier_stacks(&mut scene, &ids, &params, &source, &mut NoProgress).unwrap();
        (scene, ids)
    }

    fn small_config() -> TerrainConfig {
        TerrainConfig {
            tiles: 2,
            subdivisions_pre: 2,
            subdivisions_post: 1,
            height_mode: HeightMode::Displacement,
            size: [100, 100, 10],
            ..TerrainConfig::default()
        }
    }

    #[test]
    fn baking_realizes_predicted_polygons() {
        let config = small_config();
        let (mut scene, ids) = stacked_scene(&config);
        let mut progress = RecordingProgress::default();

        let baked = bake_tiles(&mut scene, &ids, config.max_tile_polygons, &mut progress).unwrap();
        assert_eq!(baked, 4);
        assert_eq!(progress.updates, vec![1, 2, 3, 4]);
        for id in &ids {
            let tile = scene.get(*id).unwrap();
            assert_eq!(tile.state(), TileState::Baked);
            assert!(tile.stack.is_empty());
            assert_eq!(tile.mesh.polygon_count(), 64);
        }
        assert_eq!(scene.total_triangles() as u64, config.predicted_polygon_count());
    }

    #[test]
    fn baking_twice_changes_nothing() {
        let config = small_config();
        let (mut scene, ids) = stacked_scene(&config);
        bake_tiles(&mut scene, &ids, config.max_tile_polygons, &mut NoProgress).unwrap();
        let before: Vec<_> = ids.iter().map(|id| scene.get(*id).unwrap().mesh.clone()).collect();

        let baked = bake_tiles(&mut scene, &ids, config.max_tile_polygons, &mut NoProgress).unwrap();
        assert_eq!(baked, 0);
        let after: Vec<_> = ids.iter().map(|id| scene.get(*id).unwrap().mesh.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn tile_borders_meet_after_baking() {
        let config = small_config();
        let (mut scene, ids) = stacked_scene(&config);
        bake_tiles(&mut scene, &ids, config.max_tile_polygons, &mut NoProgress).unwrap();

        // Left tile's right border against right tile's left border
        let left = scene.get(ids[0]).unwrap().world_positions();
        let right = scene.get(ids[1]).unwrap().world_positions();
        let border_left: Vec<_> = left.iter().filter(|p| p.x.abs() < 1e-3).collect();
        let border_right: Vec<_> = right.iter().filter(|p| p.x.abs() < 1e-3).collect();
        assert!(!border_left.is_empty());
        assert_eq!(border_left.len(), border_right.len());
        for p in border_left {
            assert!(
                border_right.iter().any(|q| p.distance(q) < 1e-3),
                "seam vertex {:?} has no partner",
                p
            );
        }
    }

    #[test]
    fn displacement_raises_the_middle() {
        let config = small_config();
        let (mut scene, ids) = stacked_scene(&config);
        bake_tiles(&mut scene, &ids, config.max_tile_polygons, &mut NoProgress).unwrap();
        let top = ids
            .iter()
            .filter_map(|id| scene.get(*id).unwrap().world_bounds())
            .map(|(_, hi)| hi.z)
            .fold(f32::MIN, f32::max);
        // Strength 10 around the default mid-gray: the peak rises by 5
        assert!(top > 4.0 && top <= 5.0 + 1e-3, "peak at {}", top);
        let bottom = ids
            .iter()
            .filter_map(|id| scene.get(*id).unwrap().world_bounds())
            .map(|(lo, _)| lo.z)
            .fold(f32::MAX, f32::min);
        assert!(bottom < 0.0 && bottom >= -5.0 - 1e-3, "floor at {}", bottom);
    }

    #[test]
    fn over_budget_tile_fails_and_earlier_tiles_stay_baked() {
        let config = small_config();
        let (mut scene, ids) = stacked_scene(&config);
        // Give the second tile a far larger stack than the others
        {
            let tile = scene.get_mut(ids[1]).unwrap();
            tile.add_modifier(crate::modifier::Modifier::Subdivide {
                levels: 4,
                scheme: crate::subdivide::SubdivisionScheme::Simple,
            });
        }

        let err = bake_tiles(&mut scene, &ids, 1000, &mut NoProgress).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("tile #1"), "{}", message);
        assert!(message.contains("Tile_1_0"), "{}", message);
        assert_eq!(scene.get(ids[0]).unwrap().state(), TileState::Baked);
        assert_eq!(scene.get(ids[1]).unwrap().state(), TileState::Procedural);
        assert_eq!(scene.get(ids[2]).unwrap().state(), TileState::Procedural);
    }

    #[test]
    fn malformed_tile_mesh_fails_the_stage() {
        let config = small_config();
        let (mut scene, ids) = stacked_scene(&config);
        scene.get_mut(ids[1]).unwrap().mesh.uvs.pop();

        let err = bake_tiles(&mut scene, &ids, config.max_tile_polygons, &mut NoProgress)
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Tile_1_0"), "{}", message);
        assert!(message.contains("UVs"), "{}", message);
        assert_eq!(scene.get(ids[0]).unwrap().state(), TileState::Baked);
        assert_eq!(scene.get(ids[1]).unwrap().state(), TileState::Procedural);
    }
}
