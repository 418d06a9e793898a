//! Full pipeline command

use super::{load_config, ConfigArgs};
use anyhow::{Context, Result};
use std::path::Path;
use terratile_terrain::{FixedPathBrowser, LogProgress, PipelineReport, TerrainSession, UndoStack};
use tracing::debug;

pub fn run(config_path: &Path, overrides: &ConfigArgs, json: bool) -> Result<()> {
    let config = load_config(config_path, overrides)?;
    let mut session = TerrainSession::new(config);

    let mut browser = FixedPathBrowser::new(overrides.heightmap.clone());
    session
        .select_heightmap_file(&mut browser)
        .context("Invalid --heightmap")?;

    let mut progress = LogProgress::default();
    let mut undo = UndoStack::new();
    let report = session
        .run_full_pipeline(&mut progress, &mut undo)
        .context("Terrain pipeline failed")?;
    debug!(checkpoints = ?undo.descriptions(), "Pipeline checkpoints");

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &PipelineReport) {
    println!(
        "{} tile(s), {} vertices, {} polygons ({} triangles)",
        report.tiles.len(),
        report.vertices,
        report.polygons,
        report.triangles
    );
    println!(
        "  {:<12} {:>8} {:>10} {:>10}  pivot",
        "tile", "cell", "vertices", "polygons"
    );
    for tile in &report.tiles {
        println!(
            "  {:<12} {:>8} {:>10} {:>10}  ({:.1}, {:.1}, {:.1})",
            tile.name,
            format!("{},{}", tile.cell.0, tile.cell.1),
            tile.vertices,
            tile.polygons,
            tile.pivot.x,
            tile.pivot.y,
            tile.pivot.z
        );
    }
}
