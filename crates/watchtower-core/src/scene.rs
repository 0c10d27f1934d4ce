//! Scene description shared by picking and rendering.
//!
//! Objects and textures are append-only: nothing is removed for the lifetime
//! of the process, so [`ObjectId`] and [`TextureId`] stay valid forever.

use std::sync::Arc;

use glam::{Mat4, Quat, Vec2, Vec3};

use crate::config::Config;
use crate::mesh::{self, MeshData};
use crate::surface::Surface;

/// Ground colour used until, or instead of, the ground texture.
pub const GROUND_FALLBACK_COLOR: Vec3 = Vec3::new(0.45, 0.6, 0.35);

/// Index of an object in a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub usize);

/// Index of a texture in a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub usize);

/// Translation, rotation and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Translation.
    pub translation: Vec3,
    /// Rotation.
    pub rotation: Quat,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// A pure translation.
    #[must_use]
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::default()
        }
    }

    /// Returns a copy with the given rotation.
    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Returns a copy with a uniform scale.
    #[must_use]
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Returns the local-to-world matrix.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// What a material's base colour is multiplied by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialSource {
    /// Plain colour.
    Color,
    /// A static texture.
    Texture(TextureId),
    /// The render target of a slot.
    RenderTarget(usize),
}

/// Surface appearance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Base colour.
    pub color: Vec3,
    /// Texture source.
    pub source: MaterialSource,
    /// Skip lighting and output the base colour directly.
    pub unlit: bool,
}

impl Material {
    /// A lit, untextured material.
    #[must_use]
    pub fn color(color: Vec3) -> Self {
        Self {
            color,
            source: MaterialSource::Color,
            unlit: false,
        }
    }

    /// An unlit, untextured material.
    #[must_use]
    pub fn unlit(color: Vec3) -> Self {
        Self {
            unlit: true,
            ..Self::color(color)
        }
    }

    /// An unlit material showing a static texture.
    #[must_use]
    pub fn texture(texture: TextureId) -> Self {
        Self {
            color: Vec3::ONE,
            source: MaterialSource::Texture(texture),
            unlit: true,
        }
    }

    /// A lit material showing a slot's render target.
    #[must_use]
    pub fn render_target(slot: usize) -> Self {
        Self {
            color: Vec3::ONE,
            source: MaterialSource::RenderTarget(slot),
            unlit: false,
        }
    }

    /// Returns the render target slot this material samples, if any.
    #[must_use]
    pub fn sampled_slot(&self) -> Option<usize> {
        match self.source {
            MaterialSource::RenderTarget(slot) => Some(slot),
            _ => None,
        }
    }
}

/// Decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    /// Label for logs and GPU debugging.
    pub label: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA8 pixels, top row first.
    pub rgba: Vec<u8>,
}

/// A renderable object.
#[derive(Debug, Clone)]
pub struct SceneObject {
    /// Name, unique within the scene by convention.
    pub name: String,
    /// Geometry.
    pub mesh: Arc<MeshData>,
    /// Placement.
    pub transform: Transform,
    /// Appearance.
    material: Material,
    /// Size of the quad when the mesh is a [`mesh::quad`].
    quad_size: Option<Vec2>,
    /// Whether clicks on this object are reported to the selector.
    pickable: bool,
    /// Bumped whenever the material changes.
    revision: u64,
}

impl SceneObject {
    /// Creates an object at the origin.
    #[must_use]
    pub fn new(name: impl Into<String>, mesh: Arc<MeshData>, material: Material) -> Self {
        Self {
            name: name.into(),
            mesh,
            transform: Transform::default(),
            material,
            quad_size: None,
            pickable: false,
            revision: 0,
        }
    }

    /// Creates a `width` x `height` quad object, facing +Z before transformation.
    #[must_use]
    pub fn quad(name: impl Into<String>, width: f32, height: f32, material: Material) -> Self {
        Self {
            quad_size: Some(Vec2::new(width, height)),
            ..Self::new(name, Arc::new(mesh::quad(width, height)), material)
        }
    }

    /// Returns a copy placed with `transform`.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Returns a copy with the pickable flag set. Only quads can be picked.
    #[must_use]
    pub fn pickable(mut self, pickable: bool) -> Self {
        self.pickable = pickable;
        self
    }

    /// Returns the material.
    #[must_use]
    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Returns the material revision counter.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns true if the object takes part in picking.
    #[must_use]
    pub fn is_pickable(&self) -> bool {
        self.pickable && self.quad_size.is_some()
    }
}

/// Directional plus ambient light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    /// Unit vector pointing from the scene towards the light.
    pub direction: Vec3,
    /// Directional intensity.
    pub intensity: f32,
    /// Ambient intensity.
    pub ambient: f32,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            direction: Vec3::Y,
            intensity: 1.0,
            ambient: 0.5,
        }
    }
}

/// The scene graph: a flat list of objects plus textures and lighting.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
    textures: Vec<TextureData>,
    /// Clear colour.
    pub background: Vec3,
    /// Lighting.
    pub lighting: Lighting,
}

impl Scene {
    /// Creates an empty scene.
    #[must_use]
    pub fn new(background: Vec3, lighting: Lighting) -> Self {
        Self {
            objects: Vec::new(),
            textures: Vec::new(),
            background,
            lighting,
        }
    }

    /// Adds an object and returns its id.
    pub fn add_object(&mut self, object: SceneObject) -> ObjectId {
        self.objects.push(object);
        ObjectId(self.objects.len() - 1)
    }

    /// Adds a texture and returns its id.
    pub fn add_texture(&mut self, texture: TextureData) -> TextureId {
        self.textures.push(texture);
        TextureId(self.textures.len() - 1)
    }

    /// Returns the object with `id`.
    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(id.0)
    }

    /// Returns the object with `id` for mutation.
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(id.0)
    }

    /// Returns all objects in insertion order.
    #[must_use]
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Returns the texture with `id`.
    #[must_use]
    pub fn texture(&self, id: TextureId) -> Option<&TextureData> {
        self.textures.get(id.0)
    }

    /// Returns all textures in insertion order.
    #[must_use]
    pub fn textures(&self) -> &[TextureData] {
        &self.textures
    }

    /// Finds the first object called `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .position(|o| o.name == name)
            .map(ObjectId)
    }

    /// Replaces an object's material.
    pub fn set_material(&mut self, id: ObjectId, material: Material) {
        if let Some(object) = self.objects.get_mut(id.0) {
            object.material = material;
            object.revision += 1;
        }
    }

    /// Sets an object's rotation about the up axis.
    pub fn set_yaw(&mut self, id: ObjectId, angle: f32) {
        if let Some(object) = self.objects.get_mut(id.0) {
            object.transform.rotation = Quat::from_rotation_y(angle);
        }
    }

    /// Returns the pickable surfaces in world space.
    #[must_use]
    pub fn pickable_surfaces(&self) -> Vec<Surface> {
        self.objects
            .iter()
            .enumerate()
            .filter(|(_, o)| o.is_pickable())
            .filter_map(|(i, o)| {
                o.quad_size
                    .map(|size| Surface::new(ObjectId(i), o.transform.matrix(), size.x, size.y))
            })
            .collect()
    }
}

/// A scene plus handles to the objects the application drives.
#[derive(Debug, Clone)]
pub struct SceneLayout {
    /// The scene.
    pub scene: Scene,
    /// Object rotated by the per-frame animation.
    pub spinner: Option<ObjectId>,
    /// Ground plane whose material is replaced once its texture loads.
    pub ground: Option<ObjectId>,
}

/// Builds the reference layout described by `config`.
#[must_use]
pub fn reference_scene(config: &Config) -> SceneLayout {
    let light = &config.scene.light;
    let mut scene = Scene::new(
        config.scene.background,
        Lighting {
            direction: light.position.normalize_or(Vec3::Y),
            intensity: light.intensity,
            ambient: light.ambient,
        },
    );

    let size = config.scene.ground_size;
    let ground = scene.add_object(
        SceneObject::quad("ground", size, size, Material::color(GROUND_FALLBACK_COLOR))
            .with_transform(
                Transform::default()
                    .with_rotation(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2)),
            ),
    );

    let spinner = scene.add_object(
        SceneObject::new(
            "cube",
            Arc::new(mesh::cuboid(2.0, 2.0, 2.0)),
            Material::color(Vec3::new(0.0, 1.0, 0.0)),
        )
        .with_transform(Transform::from_translation(Vec3::new(0.0, 1.0, 0.0))),
    );

    scene.add_object(
        SceneObject::new(
            "box",
            Arc::new(mesh::cuboid(2.0, 1.0, 3.0)),
            Material::color(Vec3::new(0.0, 1.0, 0.0)),
        )
        .with_transform(Transform::from_translation(Vec3::new(6.0, 2.0, 9.0))),
    );

    let pole = Arc::new(mesh::cylinder(0.1, 3.0, 8));
    let housing = Arc::new(mesh::cuboid(0.5, 0.5, 0.5));
    for fixture in &config.fixtures {
        let material = Material::color(fixture.color);
        scene.add_object(
            SceneObject::new(format!("{} pole", fixture.label), pole.clone(), material)
                .with_transform(Transform::from_translation(fixture.base)),
        );
        scene.add_object(
            SceneObject::new(format!("{} housing", fixture.label), housing.clone(), material)
                .with_transform(Transform::from_translation(
                    fixture.base + Vec3::Y * 1.5,
                )),
        );
    }

    let targets = &config.render_targets;
    for (i, screen) in config.screens.iter().enumerate() {
        scene.add_object(
            SceneObject::quad(
                format!("screen {i}"),
                targets.surface_width,
                targets.surface_height,
                Material::render_target(screen.slot),
            )
            .with_transform(Transform::from_translation(screen.position))
            .pickable(screen.pickable),
        );
    }

    SceneLayout {
        scene,
        spinner: Some(spinner),
        ground: Some(ground),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_stable() {
        let mut scene = Scene::default();
        let a = scene.add_object(SceneObject::quad("a", 1.0, 1.0, Material::color(Vec3::ONE)));
        let b = scene.add_object(SceneObject::quad("b", 1.0, 1.0, Material::color(Vec3::ONE)));
        assert_eq!(a, ObjectId(0));
        assert_eq!(b, ObjectId(1));
        assert_eq!(scene.find("b"), Some(b));
        assert_eq!(scene.find("missing"), None);
    }

    #[test]
    fn test_pickable_requires_quad() {
        let mut scene = Scene::default();
        scene.add_object(
            SceneObject::new("box", Arc::new(mesh::cuboid(1.0, 1.0, 1.0)), Material::color(Vec3::ONE))
                .pickable(true),
        );
        let screen = scene.add_object(
            SceneObject::quad("screen", 6.0, 7.0, Material::render_target(0)).pickable(true),
        );
        scene.add_object(SceneObject::quad("sign", 1.0, 1.0, Material::color(Vec3::ONE)));

        let surfaces = scene.pickable_surfaces();
        assert_eq!(surfaces.len(), 1);
        assert_eq!(surfaces[0].object, screen);
    }

    #[test]
    fn test_set_material_bumps_revision() {
        let mut scene = Scene::default();
        let id = scene.add_object(SceneObject::quad("ground", 1.0, 1.0, Material::color(Vec3::ONE)));
        let tex = scene.add_texture(TextureData {
            label: "t".into(),
            width: 1,
            height: 1,
            rgba: vec![255; 4],
        });
        scene.set_material(id, Material::texture(tex));
        let object = scene.object(id).unwrap();
        assert_eq!(object.revision(), 1);
        assert_eq!(object.material().source, MaterialSource::Texture(tex));
    }

    #[test]
    fn test_reference_scene() {
        let config = Config::default();
        let layout = reference_scene(&config);
        let scene = &layout.scene;

        // ground, cube, box, two per fixture, one screen
        assert_eq!(scene.objects().len(), 3 + 2 * 3 + 1);
        assert_eq!(layout.spinner, scene.find("cube"));
        let block = scene.find("box").and_then(|id| scene.object(id)).unwrap();
        assert_eq!(block.material().color, Vec3::new(0.0, 1.0, 0.0));

        let surfaces = scene.pickable_surfaces();
        assert_eq!(surfaces.len(), 1);
        let screen = scene.object(surfaces[0].object).unwrap();
        assert_eq!(screen.material().sampled_slot(), Some(0));
        assert_eq!(screen.transform.translation, Vec3::new(0.0, 5.0, -8.0));
        assert_eq!((surfaces[0].width, surfaces[0].height), (6.0, 7.0));

        let ground = scene.object(layout.ground.unwrap()).unwrap();
        assert!((ground.transform.rotation * Vec3::Z - Vec3::Y).length() < 1e-5);
        assert!((scene.lighting.direction.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_sampled_slot() {
        assert_eq!(Material::render_target(2).sampled_slot(), Some(2));
        assert_eq!(Material::color(Vec3::ONE).sampled_slot(), None);
    }
}
