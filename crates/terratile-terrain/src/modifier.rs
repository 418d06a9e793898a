//! Modifier stacks and the builder that attaches them to tiles

use crate::config::TerrainConfig;
use crate::heightmap::HeightmapResource;
use crate::mesh::{Mesh, MeshError};
use crate::progress::ProgressReporter;
use crate::scene::TerrainScene;
use crate::subdivide::{predicted_polygons, subdivide, SubdivisionScheme};
use std::sync::Arc;
use terratile_core::{Result, Stage, TerrainError, TileId};
use tracing::{debug, info};

/// One non-destructive geometry operation
#[derive(Clone, Debug)]
pub enum Modifier {
    Subdivide {
        levels: u32,
        scheme: SubdivisionScheme,
    },
    /// Move vertices along their normals by `(sample - midlevel) * strength`
    Displace {
        source: Arc<HeightmapResource>,
        strength: f32,
        midlevel: f32,
    },
}

/// Modifier type without parameters, for inspecting stack layout
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModifierKind {
    Subdivide(SubdivisionScheme),
    Displace,
}

impl Modifier {
    pub fn kind(&self) -> ModifierKind {
        match self {
            Modifier::Subdivide { scheme, .. } => ModifierKind::Subdivide(*scheme),
            Modifier::Displace { .. } => ModifierKind::Displace,
        }
    }

    /// Evaluate this modifier on `mesh`, producing new geometry
    pub fn apply(&self, mesh: &Mesh) -> std::result::Result<Mesh, MeshError> {
        match self {
            Modifier::Subdivide { levels, scheme } => subdivide(mesh, *scheme, *levels),
            Modifier::Displace {
                source,
                strength,
                midlevel,
            } => displace(mesh, source, *strength, *midlevel),
        }
    }

    /// Polygon count after applying this modifier to `polygons` quads
    pub fn predicted_polygons(&self, polygons: u64) -> u64 {
        match self {
            Modifier::Subdivide { levels, .. } => {
                predicted_polygons(polygons as usize, *levels)
            }
            Modifier::Displace { .. } => polygons,
        }
    }
}

fn displace(
    mesh: &Mesh,
    source: &HeightmapResource,
    strength: f32,
    midlevel: f32,
) -> std::result::Result<Mesh, MeshError> {
    mesh.validate()?;
    let mut out = mesh.clone();
    if strength == 0.0 {
        return Ok(out);
    }
    let normals = mesh.vertex_normals();
    for ((p, uv), n) in out.positions.iter_mut().zip(&mesh.uvs).zip(normals) {
        let offset = (source.sample(uv[0], uv[1]) - midlevel) * strength;
        *p += n * offset;
    }
    Ok(out)
}

/// Ordered modifiers owned by one tile, evaluated top to bottom
#[derive(Clone, Debug, Default)]
pub struct ModifierStack {
    modifiers: Vec<Modifier>,
}

impl ModifierStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, modifier: Modifier) {
        self.modifiers.push(modifier);
    }

    pub fn clear(&mut self) {
        self.modifiers.clear();
    }

    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Modifier> {
        self.modifiers.iter()
    }

    pub fn kinds(&self) -> Vec<ModifierKind> {
        self.modifiers.iter().map(Modifier::kind).collect()
    }

    /// Polygon count of the evaluated result
    pub fn predicted_polygons(&self, base_polygons: usize) -> u64 {
        self.modifiers
            .iter()
            .fold(base_polygons as u64, |count, m| m.predicted_polygons(count))
    }

    pub fn evaluate(&self, base: &Mesh) -> std::result::Result<Mesh, MeshError> {
        self.modifiers
            .iter()
            .try_fold(base.clone(), |mesh, modifier| modifier.apply(&mesh))
    }
}

/// Parameters shared by every stack built in one pass
#[derive(Clone, Debug)]
pub struct StackParams {
    pub subdivisions_pre: u32,
    pub subdivisions_post: u32,
    pub strength: f32,
    pub midlevel: f32,
}

impl StackParams {
    pub fn from_config(config: &TerrainConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            subdivisions_pre: config.subdivisions_pre as u32,
            subdivisions_post: config.subdivisions_post as u32,
            strength: config.displacement_strength(),
            midlevel: config.midlevel,
        })
    }

    /// The three stages in the order they must be attached
    pub fn stages(&self, source: &Arc<HeightmapResource>) -> [Modifier; 3] {
        [
            Modifier::Subdivide {
                levels: self.subdivisions_pre,
                scheme: SubdivisionScheme::Simple,
            },
            Modifier::Displace {
                source: Arc::clone(source),
                strength: self.strength,
                midlevel: self.midlevel,
            },
            Modifier::Subdivide {
                levels: self.subdivisions_post,
                scheme: SubdivisionScheme::CatmullClark,
            },
        ]
    }
}

/// Attach the pre-subdivide, displace, post-subdivide stack to every target.
///
/// Reports one progress unit per stage per tile. Any existing stack on a
/// target is replaced. Cancellation is honoured between tiles only, so a
/// tile never ends up with a partial stack.
pub fn build_modifier_stacks(
    scene: &mut TerrainScene,
    targets: &[TileId],
    params: &StackParams,
    source: &Arc<HeightmapResource>,
    progress: &mut dyn ProgressReporter,
) -> Result<usize> {
    let targets = scene.resolve_targets(targets)?;
    let total = targets.len();
    progress.begin(Stage::BuildModifiers, total * 3);

    let mut done = 0;
    for (index, id) in targets.iter().enumerate() {
        let tile = scene.get_mut(*id).ok_or_else(|| {
            TerrainError::stage_on_tile(Stage::BuildModifiers, index, id.to_string(), "tile is not in the scene")
        })?;
        tile.stack.clear();
        for modifier in params.stages(source) {
            tile.add_modifier(modifier);
            done += 1;
            progress.update(done);
        }
        debug!(tile = %tile.name, modifiers = tile.stack.len(), "Attached modifier stack");

        if index + 1 < total && progress.cancel_requested() {
            progress.end();
            return Err(TerrainError::Cancelled {
                stage: Stage::BuildModifiers,
                completed: index + 1,
                total,
            });
        }
    }

    progress.end();
    info!(
        tiles = total,
        pre = params.subdivisions_pre,
        post = params.subdivisions_post,
        strength = params.strength,
        "Added modifiers"
    );
    Ok(total)
}
