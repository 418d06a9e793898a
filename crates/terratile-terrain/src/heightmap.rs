//! Heightmap loading and sampling

use std::path::{Path, PathBuf};
use std::sync::Arc;
use terratile_core::{Result, TerrainError};
use tracing::{debug, info};

/// File extensions accepted as heightmaps (compared case-insensitively)
pub const HEIGHTMAP_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "tif", "tiff", "bmp"];

/// What happens to samples outside the [0,1] UV square
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WrapMode {
    /// Clamp to the nearest edge pixel
    Extend,
}

/// How pixel values are interpreted before sampling
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorInterpretation {
    /// Raw stored values, no color-space transform
    Raw,
}

/// A decoded grayscale heightmap with bilinear sampling.
///
/// The pixel data is owned, so the source file may disappear once bound.
/// Stages share one resource through an `Arc` and never mutate it.
#[derive(Debug)]
pub struct HeightmapResource {
    /// Row-major height values normalized to [0..1], top image row first
    heights: Vec<f32>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub depth: u32,
    pub wrap: WrapMode,
    pub interpretation: ColorInterpretation,
    /// File the pixels were read from, if any
    pub source: Option<PathBuf>,
}

/// True if `path` has one of the accepted heightmap extensions
pub fn is_supported_heightmap(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            HEIGHTMAP_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

/// Resolve a heightmap reference into a shared resource.
///
/// Fails with a resource error if no path is set, the extension is not
/// supported, the file is missing, or it cannot be decoded.
pub fn bind_heightmap(path: Option<&Path>) -> Result<Arc<HeightmapResource>> {
    let path = path.ok_or_else(|| TerrainError::resource("<unset>", "no heightmap path configured"))?;
    let resource = HeightmapResource::load(path)?;
    info!(
        path = %path.display(),
        width = resource.width,
        height = resource.depth,
        "Bound heightmap"
    );
    Ok(Arc::new(resource))
}

impl HeightmapResource {
    /// Load a heightmap from an image file.
    /// Values are normalized to [0..1] regardless of bit depth.
    pub fn load(path: &Path) -> Result<Self> {
        let shown = path.display().to_string();
        if !is_supported_heightmap(path) {
            return Err(TerrainError::resource(
                shown,
                format!(
                    "unsupported file type, expected one of: {}",
                    HEIGHTMAP_EXTENSIONS.join(", ")
                ),
            ));
        }
        if !path.is_file() {
            return Err(TerrainError::resource(shown, "file not found"));
        }

        let img = image::open(path).map_err(|e| TerrainError::resource(shown.clone(), e.to_string()))?;

        // into_luma16 works on stored values, which keeps the data raw
        let gray = img.into_luma16();
        let width = gray.width();
        let depth = gray.height();
        if width == 0 || depth == 0 {
            return Err(TerrainError::resource(shown, "image has no pixels"));
        }

        let heights: Vec<f32> = gray.pixels().map(|p| p.0[0] as f32 / 65535.0).collect();
        debug!(path = %shown, width, depth, "Decoded heightmap pixels");

        Ok(Self {
            source: Some(path.to_path_buf()),
            ..Self::from_raw(heights, width, depth)
        })
    }

    /// Create a heightmap from raw float data (for testing)
    pub fn from_raw(heights: Vec<f32>, width: u32, depth: u32) -> Self {
        assert_eq!(heights.len(), (width * depth) as usize);
        Self {
            heights,
            width,
            depth,
            wrap: WrapMode::Extend,
            interpretation: ColorInterpretation::Raw,
            source: None,
        }
    }

    /// Bilinear sample at normalized UV coordinates.
    ///
    /// V runs bottom to top, so `v = 0` reads the last image row.
    /// Coordinates outside [0,1] extend the edge pixels.
    pub fn sample(&self, u: f32, v: f32) -> f32 {
        let (x0, x1, tx) = self.axis(u, self.width);
        let (z0, z1, tz) = self.axis(1.0 - v, self.depth);

        let h00 = self.get(x0, z0);
        let h10 = self.get(x1, z0);
        let h01 = self.get(x0, z1);
        let h11 = self.get(x1, z1);

        let h0 = h00 * (1.0 - tx) + h10 * tx;
        let h1 = h01 * (1.0 - tx) + h11 * tx;

        h0 * (1.0 - tz) + h1 * tz
    }

    /// Lower pixel, upper pixel and blend factor along one axis
    fn axis(&self, t: f32, pixels: u32) -> (u32, u32, f32) {
        if pixels < 2 {
            return (0, 0, 0.0);
        }
        let t = match self.wrap {
            WrapMode::Extend => t.clamp(0.0, 1.0),
        };
        let f = t * (pixels - 1) as f32;
        let i0 = (f as u32).min(pixels - 2);
        (i0, i0 + 1, f - i0 as f32)
    }

    fn get(&self, x: u32, z: u32) -> f32 {
        self.heights[(z * self.width + x) as usize]
    }
}
