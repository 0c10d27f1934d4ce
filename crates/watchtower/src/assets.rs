//! Asset loading on worker threads.
//!
//! The ground texture is a required asset: setup waits for it before the
//! first frame. The model is optional and arrives whenever it arrives; the
//! render loop drains finished loads with [`AssetLoader::poll`] and never
//! blocks on them.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use glam::{Mat4, Quat, Vec2, Vec3};
use watchtower_core::config::ModelConfig;
use watchtower_core::{
    Material, MeshData, Result, SceneObject, Session, TextureData, Transform, Vertex,
    WatchtowerError,
};

/// Colour for model primitives without a base colour.
const MODEL_FALLBACK_COLOR: Vec3 = Vec3::new(0.8, 0.8, 0.8);

/// An asset being decoded on a worker thread.
#[derive(Debug)]
pub struct PendingAsset<T> {
    path: PathBuf,
    receiver: Receiver<Result<T>>,
}

impl<T> PendingAsset<T> {
    /// Blocks until the asset is loaded.
    pub fn wait(self) -> Result<T> {
        self.receiver.recv().unwrap_or_else(|_| {
            Err(load_error(&self.path, "loader thread exited before finishing"))
        })
    }
}

/// Spawns asset loads and hands finished models to the session.
#[derive(Debug)]
pub struct AssetLoader {
    models_tx: Sender<Result<SceneObject>>,
    models_rx: Receiver<Result<SceneObject>>,
    in_flight: usize,
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetLoader {
    /// Creates a loader with nothing in flight.
    pub fn new() -> Self {
        let (models_tx, models_rx) = mpsc::channel();
        Self {
            models_tx,
            models_rx,
            in_flight: 0,
        }
    }

    /// Starts decoding an image file.
    pub fn request_texture(&self, path: impl Into<PathBuf>) -> PendingAsset<TextureData> {
        let path = path.into();
        let (tx, receiver) = mpsc::channel();
        let worker_path = path.clone();
        thread::spawn(move || {
            let _ = tx.send(load_texture(&worker_path));
        });
        PendingAsset { path, receiver }
    }

    /// Starts importing a glTF model. The result is picked up by [`AssetLoader::poll`].
    pub fn spawn_model(&mut self, model: ModelConfig) {
        let tx = self.models_tx.clone();
        self.in_flight += 1;
        log::info!("loading model {}", model.path.display());
        thread::spawn(move || {
            let _ = tx.send(load_model(&model));
        });
    }

    /// Returns the number of models that have not arrived yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Appends every model that finished loading since the last call.
    /// Returns the number of objects added.
    pub fn poll(&mut self, session: &mut Session) -> usize {
        let mut added = 0;
        while let Ok(result) = self.models_rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            match result {
                Ok(object) => {
                    log::info!(
                        "model '{}' arrived ({} triangles)",
                        object.name,
                        object.mesh.triangle_count()
                    );
                    session.add_object(object);
                    added += 1;
                }
                Err(e) => log::warn!("{e}"),
            }
        }
        added
    }
}

/// Starts every asset the configuration names, waiting only for the ground texture.
///
/// A ground texture that fails to load leaves the ground in its fallback colour.
pub fn load_startup_assets(session: &mut Session, loader: &mut AssetLoader) {
    let ground_texture = session.config().scene.ground_texture.clone();
    let model = session.config().scene.model.clone();

    let pending = ground_texture.map(|path| loader.request_texture(path));
    if let Some(model) = model {
        loader.spawn_model(model);
    }

    let Some(pending) = pending else {
        return;
    };
    match pending.wait() {
        Ok(texture) => {
            log::info!(
                "ground texture '{}' loaded ({}x{})",
                texture.label,
                texture.width,
                texture.height
            );
            apply_ground_texture(session, texture);
        }
        Err(e) => log::warn!("{e}; ground keeps its plain colour"),
    }
}

/// Puts `texture` on the ground object.
pub fn apply_ground_texture(session: &mut Session, texture: TextureData) {
    let Some(ground) = session.ground() else {
        log::warn!("scene has no ground to texture");
        return;
    };
    let scene = session.scene_mut();
    let id = scene.add_texture(texture);
    scene.set_material(ground, Material::texture(id));
}

/// Decodes an image file into RGBA8.
pub fn load_texture(path: &Path) -> Result<TextureData> {
    let image = image::open(path).map_err(|e| load_error(path, e))?;
    let rgba = image.to_rgba8();
    Ok(TextureData {
        label: path.display().to_string(),
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    })
}

/// Imports a glTF or GLB file into one scene object placed per `model`.
pub fn load_model(model: &ModelConfig) -> Result<SceneObject> {
    let path = model.path.as_path();
    let (document, buffers, _) = gltf::import(path).map_err(|e| load_error(path, e))?;

    let mut mesh = MeshData::default();
    let mut color = None;
    let roots = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| load_error(path, "file contains no scene"))?;
    for node in roots.nodes() {
        append_node(&node, Mat4::IDENTITY, &buffers, &mut mesh, &mut color);
    }

    if mesh.is_empty() {
        return Err(load_error(path, "no triangles found"));
    }

    let name = path
        .file_stem()
        .map_or_else(|| "model".to_string(), |s| s.to_string_lossy().into_owned());
    let transform = Transform::from_translation(model.position)
        .with_rotation(Quat::from_rotation_y(model.yaw_degrees.to_radians()))
        .with_scale(model.scale);
    Ok(SceneObject::new(
        name,
        Arc::new(mesh),
        Material::color(color.unwrap_or(MODEL_FALLBACK_COLOR)),
    )
    .with_transform(transform))
}

fn append_node(
    node: &gltf::Node<'_>,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    mesh: &mut MeshData,
    color: &mut Option<Vec3>,
) {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
    if let Some(node_mesh) = node.mesh() {
        for primitive in node_mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::debug!("skipping non-triangle primitive");
                continue;
            }
            if color.is_none() {
                let [r, g, b, _] = primitive
                    .material()
                    .pbr_metallic_roughness()
                    .base_color_factor();
                *color = Some(Vec3::new(r, g, b));
            }
            append_primitive(&primitive, world, buffers, mesh);
        }
    }
    for child in node.children() {
        append_node(&child, world, buffers, mesh, color);
    }
}

fn append_primitive(
    primitive: &gltf::Primitive<'_>,
    world: Mat4,
    buffers: &[gltf::buffer::Data],
    mesh: &mut MeshData,
) {
    let reader =
        primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));
    let Some(positions) = reader.read_positions() else {
        return;
    };
    let positions: Vec<Vec3> = positions
        .map(|p| world.transform_point3(Vec3::from_array(p)))
        .collect();
    let count = positions.len();

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..count as u32).collect(),
    };
    if indices.iter().any(|&i| i as usize >= count) {
        log::warn!("primitive has out-of-range indices, skipped");
        return;
    }

    let normal_matrix = world.inverse().transpose();
    let normals: Vec<Vec3> = match reader.read_normals() {
        Some(normals) => normals
            .map(|n| normal_matrix.transform_vector3(Vec3::from_array(n)).normalize_or_zero())
            .collect(),
        None => smooth_normals(&positions, &indices),
    };
    let uvs: Vec<Vec2> = reader
        .read_tex_coords(0)
        .map(|uv| uv.into_f32().map(Vec2::from_array).collect())
        .unwrap_or_else(|| vec![Vec2::ZERO; count]);

    let base = mesh.vertices.len() as u32;
    mesh.vertices.extend((0..count).map(|i| {
        Vertex::new(
            positions[i],
            normals.get(i).copied().unwrap_or(Vec3::Y),
            uvs.get(i).copied().unwrap_or(Vec2::ZERO),
        )
    }));
    mesh.indices.extend(indices.iter().map(|i| base + i));
}

/// Area-weighted vertex normals for meshes that ship without them.
fn smooth_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
        .collect()
}

fn load_error(path: &Path, reason: impl ToString) -> WatchtowerError {
    WatchtowerError::AssetLoad {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}
