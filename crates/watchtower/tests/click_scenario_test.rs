//! Selection and frame ordering against the reference scene, on the CPU.
//!
//! A stamping backend writes the id of the rendering camera into each
//! destination, so the display pass can be checked for which camera every
//! screen shows.

use proptest::prelude::*;
use watchtower::{
    reference_scene, Camera, Config, Destination, FrameBackend, PickOutcome, PointerEvent, Scene,
    Session, Vec3, ViewSource,
};
use watchtower_core::MaterialSource;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;

/// Records what each render target holds and what each screen showed.
#[derive(Default)]
struct StampBackend {
    targets: Vec<Option<ViewSource>>,
    /// Per frame: the stamp each screen sampled in the display pass.
    shown: Vec<Vec<Option<ViewSource>>>,
}

impl FrameBackend for StampBackend {
    fn begin_frame(&mut self, _scene: &Scene) {}

    fn render_view(
        &mut self,
        destination: Destination,
        view: ViewSource,
        _camera: &Camera,
        scene: &Scene,
    ) {
        match destination {
            Destination::Target(slot) => {
                if self.targets.len() <= slot {
                    self.targets.resize(slot + 1, None);
                }
                self.targets[slot] = Some(view);
            }
            Destination::Display => {
                let shown = scene
                    .objects()
                    .iter()
                    .filter_map(|o| match o.material().source {
                        MaterialSource::RenderTarget(slot) => {
                            Some(self.targets.get(slot).copied().flatten())
                        }
                        _ => None,
                    })
                    .collect();
                self.shown.push(shown);
            }
        }
    }

    fn end_frame(&mut self) {}
}

fn session() -> Session {
    let config = Config::default();
    let layout = reference_scene(&config);
    Session::new(config, layout, WIDTH, HEIGHT).unwrap()
}

fn screen_center(session: &Session) -> PointerEvent {
    let p = session
        .rig()
        .primary()
        .world_to_screen(Vec3::new(0.0, 5.0, -8.0), WIDTH, HEIGHT)
        .unwrap();
    PointerEvent::new(p.x, p.y, WIDTH, HEIGHT)
}

fn corner() -> PointerEvent {
    PointerEvent::new(3.0, HEIGHT as f32 - 3.0, WIDTH, HEIGHT)
}

#[test]
fn test_end_to_end_click_scenario() {
    let mut s = session();
    let mut backend = StampBackend::default();
    let inside = screen_center(&s);
    assert_eq!(s.selector().state().index(), 0);

    s.tick(&mut backend);
    assert!(matches!(
        s.handle_pointer_down(inside),
        PickOutcome::Hit { active: 1, .. }
    ));
    s.tick(&mut backend);
    assert!(matches!(
        s.handle_pointer_down(inside),
        PickOutcome::Hit { active: 2, .. }
    ));
    s.tick(&mut backend);
    assert_eq!(s.handle_pointer_down(corner()), PickOutcome::Miss);
    assert_eq!(s.selector().state().index(), 2);
    s.tick(&mut backend);
    assert!(matches!(
        s.handle_pointer_down(inside),
        PickOutcome::Hit { active: 0, previous: 2, .. }
    ));
    s.tick(&mut backend);

    let shown: Vec<_> = backend.shown.iter().map(|frame| frame[0]).collect();
    assert_eq!(
        shown,
        [0, 1, 2, 2, 0].map(|i| Some(ViewSource::Secondary(i)))
    );
}

#[test]
fn test_fixed_slots_follow_their_cameras() {
    let mut s = session();
    let mut backend = StampBackend::default();
    let inside = screen_center(&s);
    for _ in 0..4 {
        s.tick(&mut backend);
        s.handle_pointer_down(inside);
    }
    assert_eq!(backend.targets[1], Some(ViewSource::Secondary(2)));
    assert_eq!(backend.targets[2], Some(ViewSource::Secondary(1)));
}

#[test]
fn test_zoom_keeps_screen_pickable() {
    let mut s = session();
    let mut backend = StampBackend::default();
    {
        let (controls, _) = s.rig_mut().controls_mut();
        controls.zoom(3.0);
    }
    for _ in 0..10 {
        s.tick(&mut backend);
    }
    let inside = screen_center(&s);
    assert!(matches!(
        s.handle_pointer_down(inside),
        PickOutcome::Hit { active: 1, .. }
    ));
}

proptest! {
    #[test]
    fn prop_hits_advance_modulo_camera_count(clicks in prop::collection::vec(any::<bool>(), 0..24)) {
        let mut s = session();
        let inside = screen_center(&s);
        let mut hits = 0;
        for hit in clicks {
            if hit {
                s.handle_pointer_down(inside);
                hits += 1;
            } else {
                s.handle_pointer_down(corner());
            }
        }
        prop_assert_eq!(s.selector().state().index(), hits % 3);
    }
}
