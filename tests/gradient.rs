use grand_kaiser_fx::config::ComponentConfig;
use grand_kaiser_fx::error::ConfigError;
use grand_kaiser_fx::gradient::{
    entrance_at, radial_gradient, Direction, GradientConfig, GradientOscillator, ENTRANCE_MS,
};

fn config(gap: f64, speed: f64, range: f64) -> GradientConfig {
    GradientConfig {
        starting_gap: gap,
        animation_speed: speed,
        breathing_range: range,
        ..GradientConfig::default()
    }
}

#[test]
fn width_stays_within_bounds() {
    let cfg = config(100.0, 0.3, 2.0);
    let (lower, upper) = (cfg.lower_bound(), cfg.upper_bound());
    let mut osc = GradientOscillator::new(cfg).unwrap();
    for _ in 0..10_000 {
        let w = osc.step();
        assert!((lower..=upper).contains(&w), "width {w} escaped [{lower}, {upper}]");
    }
}

#[test]
fn direction_flips_at_each_bound() {
    let mut osc = GradientOscillator::new(config(100.0, 1.0, 2.0)).unwrap();
    assert_eq!(osc.direction(), Direction::Growing);

    let mut seen = Vec::new();
    for _ in 0..12 {
        osc.step();
        if seen.last() != Some(&osc.direction()) {
            seen.push(osc.direction());
        }
    }
    assert_eq!(
        &seen[..3],
        &[Direction::Growing, Direction::Shrinking, Direction::Growing]
    );
}

#[test]
fn reaches_upper_bound_then_turns() {
    let mut osc = GradientOscillator::new(config(100.0, 1.0, 2.0)).unwrap();
    assert_eq!(osc.step(), 101.0);
    assert_eq!(osc.step(), 102.0);
    assert_eq!(osc.step(), 101.0);
    assert_eq!(osc.direction(), Direction::Shrinking);
}

#[test]
fn without_breathing_width_is_constant() {
    let cfg = GradientConfig {
        breathing: false,
        ..config(118.0, 0.5, 9.0)
    };
    let mut osc = GradientOscillator::new(cfg).unwrap();
    for _ in 0..500 {
        assert_eq!(osc.step(), 118.0);
    }
    assert_eq!(osc.direction(), Direction::Still);
}

#[test]
fn zero_range_stays_on_gap() {
    let mut osc = GradientOscillator::new(config(130.0, 0.012, 0.0)).unwrap();
    for _ in 0..100 {
        assert_eq!(osc.step(), 130.0);
    }
}

#[test]
fn css_uses_width_and_top_offset() {
    let css = radial_gradient(120.0, 22.0);
    assert!(css.starts_with("radial-gradient(120% 142% at 50% 30%, #000000 0%"));
    assert!(css.contains("#0f3460 45%"));
    assert!(css.ends_with("#000000 100%)"));
}

#[test]
fn section_presets_resolve() {
    let dining = GradientConfig::resolve(Some("dining"), None).unwrap();
    assert_eq!(dining.starting_gap, 115.0);
    assert_eq!(dining.top_offset, 18.0);
    assert_eq!(dining.opacity, 0.55);

    let gallery = GradientConfig::resolve(Some("gallery"), None).unwrap();
    assert_eq!(gallery.breathing_range, 10.0);
    assert_eq!(gallery.top_offset, 25.0);
}

#[test]
fn overrides_merge_over_preset() {
    let cfg = GradientConfig::resolve(Some("travel"), Some(r#"{"breathing": false, "opacity": 0.3}"#)).unwrap();
    assert!(!cfg.breathing);
    assert_eq!(cfg.opacity, 0.3);
    assert_eq!(cfg.starting_gap, 118.0);
}

#[test]
fn invalid_configs_are_rejected() {
    assert_eq!(
        GradientConfig::resolve(Some("lobby"), None),
        Err(ConfigError::UnknownPreset("lobby".into()))
    );
    assert!(matches!(
        GradientConfig::resolve(None, Some(r#"{"breathingRange": -1}"#)),
        Err(ConfigError::Negative { field: "breathingRange", .. })
    ));
    assert!(matches!(
        GradientConfig::resolve(None, Some("[1, 2]")),
        Err(ConfigError::Malformed(_))
    ));
    assert!(matches!(
        GradientConfig::resolve(None, Some(r#"{"opacity": 1.5}"#)),
        Err(ConfigError::OutOfRange { field: "opacity", .. })
    ));
}

#[test]
fn entrance_fades_in_and_settles() {
    let start = entrance_at(0.0, 0.6);
    assert_eq!(start.opacity, 0.0);
    assert!((start.scale - 1.2).abs() < 1e-9);
    assert!(!start.finished);

    let mid = entrance_at(ENTRANCE_MS / 2.0, 0.6);
    assert!(mid.opacity > 0.0 && mid.opacity < 0.6);
    assert!(mid.scale > 1.0 && mid.scale < 1.2);

    let end = entrance_at(ENTRANCE_MS, 0.6);
    assert!((end.opacity - 0.6).abs() < 1e-9);
    assert!((end.scale - 1.0).abs() < 1e-9);
    assert!(end.finished);
}

#[test]
fn oscillator_rejects_inverted_or_nan_bounds() {
    assert!(matches!(
        GradientOscillator::new(config(130.0, 0.012, -1.0)),
        Err(ConfigError::Negative { field: "breathingRange", .. })
    ));
    assert!(matches!(
        GradientOscillator::new(config(f64::NAN, 0.012, 10.0)),
        Err(ConfigError::Negative { field: "startingGap", .. })
    ));
}
