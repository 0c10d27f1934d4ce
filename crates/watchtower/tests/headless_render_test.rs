//! Headless rendering integration tests.
//!
//! These tests need a GPU adapter (real or software fallback). Without one,
//! engine creation fails and each test returns early with a message.

use std::sync::Arc;

use watchtower::{
    reference_scene, Config, Headless, Material, PickOutcome, SceneLayout, SceneObject, Vec3,
    WatchtowerError,
};
use watchtower_core::config::ModelConfig;
use watchtower_core::{mesh, Lighting, Scene, Transform};

const WIDTH: u32 = 320;
const HEIGHT: u32 = 240;

/// Unlit marker colours, one per secondary camera.
const MARKERS: [Vec3; 3] = [Vec3::X, Vec3::Y, Vec3::Z];

/// One triangle with an embedded buffer.
const TRIANGLE_GLTF: &str = r#"{
    "asset": { "version": "2.0" },
    "scene": 0,
    "scenes": [{ "nodes": [0] }],
    "nodes": [{ "mesh": 0 }],
    "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 } }] }],
    "buffers": [{
        "byteLength": 36,
        "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAA"
    }],
    "bufferViews": [{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }],
    "accessors": [{
        "bufferView": 0,
        "componentType": 5126,
        "count": 3,
        "type": "VEC3",
        "min": [0.0, 0.0, 0.0],
        "max": [1.0, 1.0, 0.0]
    }]
}"#;

/// Small render targets keep software adapters fast.
fn config() -> Config {
    let mut config = Config::default();
    config.render_targets.texel_density = 32;
    config
}

fn headless(layout: SceneLayout, config: Config) -> Option<Headless> {
    match Headless::new(config, layout, WIDTH, HEIGHT) {
        Ok(headless) => Some(headless),
        Err(e) => {
            eprintln!("Skipping headless test: no GPU adapter available ({e})");
            None
        }
    }
}

/// Reference scene with a marker cube right in front of every secondary camera.
fn marked_headless() -> Option<Headless> {
    let config = config();
    let layout = reference_scene(&config);
    let mut headless = headless(layout, config)?;

    let cameras: Vec<_> = headless
        .session()
        .rig()
        .secondaries()
        .iter()
        .map(|s| (s.camera.position, s.camera.forward()))
        .collect();
    for (i, (position, forward)) in cameras.into_iter().enumerate() {
        let marker = SceneObject::new(
            format!("marker {i}"),
            Arc::new(mesh::cuboid(0.3, 0.3, 0.3)),
            Material::unlit(MARKERS[i]),
        )
        .with_transform(Transform::from_translation(position + forward));
        headless.session_mut().add_object(marker);
    }
    Some(headless)
}

fn pixel(data: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * width + x) * 4) as usize;
    [data[i], data[i + 1], data[i + 2], data[i + 3]]
}

/// Index of the strongest colour channel.
fn dominant_channel(px: [u8; 4]) -> usize {
    let rgb = [px[0], px[1], px[2]];
    (0..3).max_by_key(|&c| rgb[c]).unwrap_or(0)
}

fn target_center(headless: &Headless, slot: usize) -> [u8; 4] {
    let size = headless.session().compositor().slots()[slot].size;
    let data = headless.capture_target(slot).expect("target readback failed");
    assert_eq!(data.len(), size.rgba_bytes());
    pixel(&data, size.width, size.width / 2, size.height / 2)
}

#[test]
fn headless_empty_scene_is_background() {
    let config = config();
    let background = config.scene.background;
    let layout = SceneLayout {
        scene: Scene::new(background, Lighting::default()),
        spinner: None,
        ground: None,
    };
    let Some(mut headless) = headless(layout, config) else {
        return;
    };

    headless.step();
    let data = headless.capture_display().expect("display readback failed");
    assert_eq!(data.len(), (WIDTH * HEIGHT * 4) as usize);

    let first = &data[0..4];
    assert!(data.chunks(4).all(|px| px == first));
    let expected = (background * 255.0).round();
    for (channel, want) in [expected.x, expected.y, expected.z].into_iter().enumerate() {
        assert!((f32::from(first[channel]) - want).abs() <= 2.0);
    }
}

#[test]
fn headless_cyclic_target_follows_selection() {
    let Some(mut headless) = marked_headless() else {
        return;
    };
    let screen = headless
        .session()
        .rig()
        .primary()
        .world_to_screen(Vec3::new(0.0, 5.0, -8.0), WIDTH, HEIGHT)
        .expect("screen is in view");

    for expected in [0, 1, 2, 0] {
        headless.step();
        assert_eq!(headless.session().selector().state().index(), expected);
        assert_eq!(dominant_channel(target_center(&headless, 0)), expected);
        assert!(matches!(
            headless.click(screen.x, screen.y),
            PickOutcome::Hit { .. }
        ));
    }
}

#[test]
fn headless_targets_share_one_depth_buffer() {
    let config = config();
    let layout = reference_scene(&config);
    let Some(headless) = headless(layout, config) else {
        return;
    };
    let size = headless.session().compositor().slots()[0].size;
    let depth = headless
        .engine()
        .targets()
        .depth_size()
        .expect("targets have a depth buffer");
    assert_eq!((depth.width, depth.height), (size.width, size.height));
    assert_eq!(headless.engine().targets().len(), 3);
}

#[test]
fn headless_oversized_targets_abort_startup() {
    let config = config();
    let layout = reference_scene(&config);
    if headless(layout, config).is_none() {
        return;
    }

    let mut config = Config::default();
    config.render_targets.texel_density = 4096;
    let layout = reference_scene(&config);
    let Err(err) = Headless::new(config, layout, WIDTH, HEIGHT) else {
        panic!("a 24576x28672 render target was allocated");
    };
    assert!(matches!(err, WatchtowerError::AllocationFailure { .. }), "{err}");
    assert!(err.is_fatal());
}

#[test]
fn headless_model_joins_running_loop() {
    let Some(mut headless) = marked_headless() else {
        return;
    };
    headless.step();
    let before = headless.session().scene().objects().len();

    let path = std::env::temp_dir().join(format!("watchtower-{}-model.gltf", std::process::id()));
    std::fs::write(&path, TRIANGLE_GLTF).expect("write model");
    headless.spawn_model(ModelConfig {
        path: path.clone(),
        ..ModelConfig::default()
    });

    for _ in 0..500 {
        headless.step();
        if headless.models_in_flight() == 0 {
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(10));
    }
    let _ = std::fs::remove_file(&path);

    assert_eq!(headless.session().scene().objects().len(), before + 1);
    headless.step();
    let data = headless.capture_display().expect("display readback failed");
    assert_eq!(data.len(), (WIDTH * HEIGHT * 4) as usize);
}

#[test]
fn headless_fixed_targets_show_their_cameras() {
    let Some(mut headless) = marked_headless() else {
        return;
    };
    headless.step_n(2);
    assert_eq!(dominant_channel(target_center(&headless, 1)), 2);
    assert_eq!(dominant_channel(target_center(&headless, 2)), 1);
}

#[test]
fn headless_screen_shows_active_camera() {
    let Some(mut headless) = marked_headless() else {
        return;
    };
    let screen = headless
        .session()
        .rig()
        .primary()
        .world_to_screen(Vec3::new(0.0, 5.0, -8.0), WIDTH, HEIGHT)
        .expect("screen is in view");
    let (x, y) = (screen.x as u32, screen.y as u32);

    headless.click(screen.x, screen.y);
    headless.step();
    let data = headless.capture_display().expect("display readback failed");
    assert_eq!(dominant_channel(pixel(&data, WIDTH, x, y)), 1);
}

#[test]
fn headless_render_to_file() {
    let path = std::env::temp_dir().join(format!("watchtower-{}.png", std::process::id()));
    match watchtower::render_to_file(config(), &path, WIDTH, HEIGHT, 2) {
        Ok(()) => {
            let image = image::open(&path).expect("saved image decodes");
            assert_eq!((image.width(), image.height()), (WIDTH, HEIGHT));
            let _ = std::fs::remove_file(&path);
        }
        Err(e) => eprintln!("Skipping headless test: no GPU adapter available ({e})"),
    }
}
