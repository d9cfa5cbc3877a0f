use glam::Vec2;
use grand_kaiser_fx::config::{ComponentConfig, Rgb};
use grand_kaiser_fx::error::ConfigError;
use grand_kaiser_fx::ripple::{
    vignette, PointerState, PointerTracker, RippleField, RippleGrid, RippleGridConfig, RippleUniforms,
};

fn uniforms(time: f32) -> RippleUniforms {
    RippleUniforms {
        time,
        resolution: Vec2::new(800.0, 600.0),
        pointer: PointerState::default(),
    }
}

#[test]
fn rooms_preset_matches_section() {
    let cfg = RippleGridConfig::resolve(Some("rooms"), None).unwrap();
    assert_eq!(cfg.grid_color, Rgb::parse("#3a3a6a").unwrap());
    assert_eq!(cfg.grid_size, 12.0);
    assert_eq!(cfg.vignette_strength, 0.0);
    assert!(cfg.mouse_interaction);
}

#[test]
fn colour_override_is_parsed() {
    let cfg = RippleGridConfig::resolve(None, Some(r##"{"gridColor": "#f00"}"##)).unwrap();
    assert_eq!(cfg.grid_color, Rgb::from_u8(255, 0, 0));

    let err = RippleGridConfig::resolve(None, Some(r#"{"gridColor": "gold"}"#)).unwrap_err();
    assert!(matches!(err, ConfigError::Malformed(_)));
}

#[test]
fn radius_must_be_a_fraction() {
    assert!(RippleGridConfig::resolve(None, Some(r#"{"mouseInteractionRadius": 1.5}"#)).is_err());
    assert!(RippleGridConfig::resolve(None, Some(r#"{"gridSize": 0}"#)).is_err());
}

#[test]
fn zero_vignette_keeps_surface_visible() {
    assert_eq!(vignette(Vec2::new(0.0, 0.0), 0.0), 1.0);
    assert_eq!(vignette(Vec2::new(0.5, 0.5), 2.0), 1.0);
    assert_eq!(vignette(Vec2::new(0.5, 0.0), 2.0), 0.0);

    let field = RippleField::new(RippleGridConfig::resolve(Some("rooms"), None).unwrap()).unwrap();
    let [.., alpha] = field.shade(Vec2::new(0.5, 0.5), &uniforms(0.0));
    assert!(alpha > 0.0);
}

#[test]
fn shade_is_premultiplied_and_bounded() {
    let field = RippleField::new(RippleGridConfig::default()).unwrap();
    for i in 0..=8 {
        for j in 0..=8 {
            let uv = Vec2::new(i as f32 / 8.0, j as f32 / 8.0);
            let [r, g, b, a] = field.shade(uv, &uniforms(1.3));
            assert!((0.0..=1.0).contains(&a));
            for c in [r, g, b] {
                assert!(c.is_finite() && c >= 0.0);
            }
        }
    }
}

#[test]
fn zero_opacity_is_transparent() {
    let cfg = RippleGridConfig {
        opacity: 0.0,
        ..RippleGridConfig::default()
    };
    let field = RippleField::new(cfg).unwrap();
    assert_eq!(field.shade(Vec2::splat(0.5), &uniforms(2.0)), [0.0; 4]);
}

#[test]
fn pointer_eases_toward_target() {
    let mut tracker = PointerTracker::new();
    tracker.moved(800.0, 0.0, 800.0, 600.0);
    tracker.entered();
    let first = tracker.advance();
    assert!((first.position.x - 0.55).abs() < 1e-6);
    assert!((first.position.y - 0.55).abs() < 1e-6);
    assert!((first.influence - 0.05).abs() < 1e-6);

    for _ in 0..400 {
        tracker.advance();
    }
    let settled = tracker.state();
    assert!((settled.position - Vec2::ONE).length() < 1e-3);
    assert!((settled.influence - 1.0).abs() < 1e-3);

    tracker.left();
    for _ in 0..400 {
        tracker.advance();
    }
    assert!(tracker.state().influence < 1e-3);
}

#[test]
fn degenerate_surface_ignores_pointer() {
    let mut tracker = PointerTracker::new();
    tracker.moved(10.0, 10.0, 0.0, 600.0);
    let position = tracker.advance().position;
    assert!((position - Vec2::splat(0.5)).length() < 1e-6);
}

#[test]
fn frame_time_is_seconds() {
    let mut grid = RippleGrid::new(RippleGridConfig::default()).unwrap();
    let u = grid.frame(2500.0, Vec2::new(100.0, 50.0));
    assert!((u.time - 2.5).abs() < 1e-6);
    assert_eq!(u.resolution, Vec2::new(100.0, 50.0));
}

#[test]
fn pointer_ignored_without_interaction() {
    let cfg = RippleGridConfig {
        mouse_interaction: false,
        ..RippleGridConfig::default()
    };
    let mut grid = RippleGrid::new(cfg).unwrap();
    grid.pointer_mut().entered();
    grid.pointer_mut().moved(0.0, 0.0, 100.0, 100.0);
    for t in 0..50 {
        let u = grid.frame(f64::from(t) * 16.0, Vec2::splat(100.0));
        assert_eq!(u.pointer, PointerState::default());
    }
}

#[test]
fn equal_inputs_shade_identically() {
    let config = RippleGridConfig::resolve(Some("rooms"), None).unwrap();
    let mut a = RippleGrid::new(config.clone()).unwrap();
    let mut b = RippleGrid::new(config).unwrap();
    let resolution = Vec2::new(1280.0, 720.0);
    for frame in 0..5 {
        let timestamp = 1000.0 + f64::from(frame) * 16.7;
        let (ua, ub) = (a.frame(timestamp, resolution), b.frame(timestamp, resolution));
        assert_eq!(ua, ub);
        for i in 0..=10 {
            for j in 0..=10 {
                let uv = Vec2::new(i as f32 / 10.0, j as f32 / 10.0);
                assert_eq!(a.field().shade(uv, &ua), b.field().shade(uv, &ub), "uv={uv}");
                assert_eq!(a.field().shade(uv, &ua), a.field().shade(uv, &ua));
            }
        }
    }
}

#[test]
fn field_rejects_invalid_config() {
    let cfg = RippleGridConfig {
        fade_distance: 0.0,
        ..RippleGridConfig::default()
    };
    assert!(matches!(
        RippleField::new(cfg.clone()),
        Err(ConfigError::NotPositive { field: "fadeDistance", .. })
    ));
    assert!(RippleGrid::new(cfg).is_err());
}
