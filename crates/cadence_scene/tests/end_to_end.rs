//! Integration tests for scene resolution
//!
//! These tests verify that:
//! - Range mappers and springs compose into one visual state per frame
//! - Phase tables reject overlapping boundaries
//! - Frames resolve identically in any order and on any thread
//! - The demo scene files parse, build and resolve

use cadence_animation::{Easing, RangeMapper, Regime, Spring, SpringConfig, Tolerance};
use cadence_scene::{
    Channel, Composition, ConfigError, PhaseTable, Scene, SceneFile, Signal, Value,
    SEGMENT_CHANNEL, SEGMENT_FRAME_CHANNEL,
};
use pretty_assertions::assert_eq;

const FPS: u32 = 60;

fn fade_and_slide() -> (Scene, SpringConfig) {
    let config = SpringConfig::new(400.0, 40.0, 1.0).range(0.0, 100.0);
    let scene = Scene::builder("fade_and_slide")
        .number(
            "opacity",
            Signal::frames(
                RangeMapper::new([0.0, 18.0], [0.0, 1.0])
                    .unwrap()
                    .easing(Easing::EaseOutCubic),
            ),
        )
        .number("position", Signal::spring(Spring::new(config).unwrap()))
        .build()
        .unwrap();
    (scene, config)
}

#[test]
fn test_fade_and_spring_compose() {
    let (scene, config) = fade_and_slide();

    let first = scene.resolve(0, FPS);
    assert_eq!(first.number("opacity"), Some(0.0));
    assert_eq!(first.number("position"), Some(config.from));

    let settled = scene.resolve(30, FPS);
    assert_eq!(settled.number("opacity"), Some(1.0));
    let position = settled.number("position").unwrap();
    let tolerance = 0.001 * (config.to - config.from).abs();
    assert!(
        (position - config.to).abs() <= tolerance,
        "position {position} not within {tolerance} of {}",
        config.to
    );
}

#[test]
fn test_settle_frames_agree_with_resolution() {
    let (scene, config) = fade_and_slide();
    let spring = Spring::new(config).unwrap();
    assert_eq!(spring.regime(), Regime::CriticallyDamped);

    let settle = spring.settle_frames(FPS, Tolerance::default()).unwrap();
    assert!(settle <= 30);
    let tolerance = 0.001 * 100.0;
    for frame in settle..settle + 120 {
        let position = scene.resolve(frame, FPS).number("position").unwrap();
        assert!((position - 100.0).abs() <= tolerance);
    }
}

#[test]
fn test_overlapping_phases_are_rejected() {
    let err = PhaseTable::builder()
        .phase("a", 0, 120)
        .phase("b", 100, 200)
        .build()
        .unwrap_err();
    assert!(matches!(err, ConfigError::PhaseOverlap { .. }));
    assert_eq!(
        err.to_string(),
        "phase 'b' starts at frame 100 before 'a' ends at frame 120"
    );
}

#[test]
fn test_phase_boundaries_are_continuous() {
    let phases = PhaseTable::builder()
        .then("approach", 30)
        .then("press", 10)
        .build()
        .unwrap();
    let scale = Channel::phased()
        .arm(
            "approach",
            Channel::Number(Signal::constant(1.0)),
        )
        .arm(
            "press",
            Channel::Number(Signal::frames(
                RangeMapper::new([30.0, 35.0, 40.0], [1.0, 0.9, 1.0]).unwrap(),
            )),
        );
    let scene = Scene::builder("press")
        .phases(phases)
        .channel("scale", scale)
        .build()
        .unwrap();

    let before = scene.resolve(29, FPS).number("scale").unwrap();
    let at = scene.resolve(30, FPS).number("scale").unwrap();
    assert_eq!(before, at);
    assert_eq!(scene.resolve(35, FPS).number("scale"), Some(0.9));
}

#[test]
fn test_concurrent_resolution_matches_sequential() {
    let (scene, _) = fade_and_slide();
    let sequential: Vec<_> = (0..240).map(|frame| scene.resolve(frame, FPS)).collect();

    let parallel: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4u32)
            .map(|worker| {
                let scene = &scene;
                scope.spawn(move || {
                    (0..240u32)
                        .filter(|frame| frame % 4 == worker)
                        .map(|frame| (frame, scene.resolve(frame, FPS)))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let mut all: Vec<_> = handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect();
        all.sort_by_key(|(frame, _)| *frame);
        all.into_iter().map(|(_, state)| state).collect()
    });

    assert_eq!(sequential, parallel);
}

#[test]
fn test_visual_state_serializes_flat() {
    let scene = Scene::builder("label")
        .number("opacity", Signal::constant(1.0))
        .channel("title", Channel::typewriter("Jupiter", Signal::constant(3.0)))
        .channel("visible", Channel::Visible { from: 5, until: None })
        .build()
        .unwrap();
    let json = serde_json::to_string(&scene.resolve(0, FPS)).unwrap();
    assert_eq!(json, r#"{"opacity":1.0,"title":"Jup","visible":false}"#);
}

#[test]
fn test_chat_interface_demo() {
    let file = SceneFile::from_toml_str(include_str!("../../../demos/chat_interface.toml")).unwrap();
    assert_eq!(file.fps, 60);
    let composition = file.build().unwrap();
    assert_eq!(composition.duration(), Some(150));

    let first = composition.resolve(0, file.fps).unwrap();
    assert_eq!(first.number("fade"), Some(0.0));
    assert_eq!(first.text("answer"), Some(""));
    assert_eq!(first.flag("cursor"), Some(true));

    let typed = composition.resolve(63, file.fps).unwrap();
    assert_eq!(typed.text("answer").map(|text| text.chars().count()), Some(150));
    assert_eq!(typed.number("fade"), Some(1.0));

    // second bubble starts 12 frames after the first
    let staggered = composition.resolve(30, file.fps).unwrap();
    assert_eq!(staggered.number("bubble_offset_1"), Some(1.0));
    assert!(staggered.number("bubble_offset_0").unwrap() < 1.0);
}

#[test]
fn test_design_system_select_demo() {
    let file =
        SceneFile::from_toml_str(include_str!("../../../demos/design_system_select.toml")).unwrap();
    let Composition::Scene(scene) = file.build().unwrap() else {
        panic!("expected a scene");
    };
    assert_eq!(scene.duration(), Some(600));
    assert_eq!(scene.phases().len(), 10);

    let start = scene.resolve(0, file.fps);
    assert_eq!(start.vec2("mouse"), Some([400.0, 900.0]));
    assert_eq!(start.flag("mouse_visible"), Some(false));

    let darkened = scene.resolve(120, file.fps);
    assert_eq!(darkened.number("darken"), Some(0.65));
    assert_eq!(darkened.number("card_0").map(|p| p > 0.0), Some(true));

    let hovered = scene.resolve(210, file.fps);
    assert_eq!(hovered.vec2("mouse"), Some([560.0, 580.0]));
    assert_eq!(scene.resolve(450, file.fps).number("darken"), Some(0.0));
    assert_eq!(scene.resolve(110, file.fps).number("card_0"), Some(0.0));
}

#[test]
fn test_final_render_series_demo() {
    let file = SceneFile::from_toml_str(include_str!("../../../demos/final_render.toml")).unwrap();
    let composition = file.build().unwrap();
    assert_eq!(composition.duration(), Some(1320));

    let reveal = composition.resolve(299, file.fps).unwrap();
    assert_eq!(reveal.text(SEGMENT_CHANNEL), Some("product_reveal"));
    assert_eq!(reveal.number(SEGMENT_FRAME_CHANNEL), Some(299.0));

    let select = composition.resolve(300, file.fps).unwrap();
    assert_eq!(select.text(SEGMENT_CHANNEL), Some("design_system_select"));
    assert_eq!(select.number(SEGMENT_FRAME_CHANNEL), Some(0.0));

    let path = composition.resolve(900, file.fps).unwrap();
    assert_eq!(path.get("drift"), Some(&Value::Vec2([50.0, 65.0])));

    assert!(composition.resolve(1320, file.fps).is_none());
}
