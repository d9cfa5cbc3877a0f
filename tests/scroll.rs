use grand_kaiser_fx::config::ComponentConfig;
use grand_kaiser_fx::error::ConfigError;
use grand_kaiser_fx::scroll::{
    page_progress, section_progress, Keyframes, Parallax, ParallaxConfig, Reveal, RevealConfig, Tracking,
};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn keyframes_interpolate_and_hold_ends() {
    let k = Keyframes(vec![[0.0, 0.0], [0.3, 1.0], [0.7, 1.0], [1.0, 0.0]]);
    assert_eq!(k.sample(-1.0), 0.0);
    assert!(close(k.sample(0.15), 0.5));
    assert_eq!(k.sample(0.5), 1.0);
    assert!(close(k.sample(0.85), 0.5));
    assert_eq!(k.sample(2.0), 0.0);
    assert_eq!(Keyframes::constant(3.0).sample(0.4), 3.0);
}

#[test]
fn hero_drifts_and_fades_over_first_half() {
    let hero = Parallax::new(ParallaxConfig::resolve(Some("hero"), None).unwrap()).unwrap();
    assert_eq!(hero.tracking(), Tracking::Page);

    let top = hero.frame(0.0);
    assert_eq!((top.translate_y, top.opacity, top.scale), (0.0, 1.0, 1.0));

    let quarter = hero.frame(0.25);
    assert!(close(quarter.translate_y, 12.5));
    assert!(close(quarter.opacity, 0.5));

    let half = hero.frame(0.5);
    assert!(close(half.translate_y, 25.0));
    assert_eq!(half.opacity, 0.0);
    assert_eq!(hero.frame(1.0).translate_y, 50.0);
}

#[test]
fn about_scales_in_and_out() {
    let about = Parallax::new(ParallaxConfig::resolve(Some("about"), None).unwrap()).unwrap();
    assert_eq!(about.tracking(), Tracking::Section);
    assert_eq!(about.frame(0.0).scale, 0.8);
    assert_eq!(about.frame(0.5).scale, 1.0);
    assert!(close(about.frame(1.0).translate_y, -50.0));
    assert_eq!(about.frame(1.0).opacity, 0.0);
}

#[test]
fn progress_mappings() {
    assert_eq!(page_progress(0.0, 3000.0, 1000.0), 0.0);
    assert!(close(page_progress(1000.0, 3000.0, 1000.0), 0.5));
    assert_eq!(page_progress(5000.0, 3000.0, 1000.0), 1.0);
    assert_eq!(page_progress(100.0, 800.0, 1000.0), 0.0);

    // Section top at the viewport bottom, then bottom at the viewport top.
    assert_eq!(section_progress(1000.0, 600.0, 1000.0), 0.0);
    assert!(close(section_progress(200.0, 600.0, 1000.0), 0.5));
    assert_eq!(section_progress(-600.0, 600.0, 1000.0), 1.0);
}

#[test]
fn parallax_overrides_are_validated() {
    let cfg = ParallaxConfig::resolve(Some("dining"), Some(r#"{"tracking": "page"}"#)).unwrap();
    assert_eq!(cfg.tracking, Tracking::Page);

    assert!(matches!(
        ParallaxConfig::resolve(None, Some(r#"{"opacity": [[0, 2]]}"#)),
        Err(ConfigError::Malformed(_))
    ));
    assert!(matches!(
        ParallaxConfig::resolve(None, Some(r#"{"translateY": [[0.5, 0], [0.2, 1]]}"#)),
        Err(ConfigError::Malformed(_))
    ));
    assert!(ParallaxConfig::resolve(None, Some(r#"{"scale": []}"#)).is_err());
    assert!(Parallax::new(ParallaxConfig {
        scale: Keyframes::constant(-1.0),
        ..ParallaxConfig::default()
    })
    .is_err());
}

#[test]
fn reveal_latches_once_inside_margin() {
    let mut reveal = Reveal::new(RevealConfig::default()).unwrap();
    // Still within the 100px margin at the bottom of the viewport.
    assert!(!reveal.observe(950.0, 1400.0, 1000.0, 0.0));
    assert!(!reveal.is_revealed());
    assert_eq!(reveal.frame(5000.0).opacity, 0.0);

    assert!(reveal.observe(850.0, 1300.0, 1000.0, 100.0));
    assert!(reveal.is_revealed());
    // Scrolled back out: stays revealed and does not fire again.
    assert!(!reveal.observe(2000.0, 2400.0, 1000.0, 200.0));
    assert!(!reveal.observe(850.0, 1300.0, 1000.0, 300.0));
    assert!(reveal.is_revealed());
}

#[test]
fn reveal_plays_entrance_after_latch() {
    let mut reveal = Reveal::new(RevealConfig::default()).unwrap();
    let hidden = reveal.frame(0.0);
    assert_eq!((hidden.opacity, hidden.offset_y, hidden.finished), (0.0, 50.0, false));

    reveal.observe(0.0, 400.0, 1000.0, 1000.0);
    let mid = reveal.frame(1400.0);
    assert!(mid.opacity > 0.0 && mid.opacity < 1.0);
    assert!(mid.offset_y > 0.0 && mid.offset_y < 50.0);

    let end = reveal.frame(1800.0);
    assert_eq!((end.opacity, end.offset_y, end.scale), (1.0, 0.0, 1.0));
    assert!(end.finished);
}

#[test]
fn badge_waits_for_delay_and_scales() {
    let mut badge = Reveal::new(RevealConfig::resolve(Some("badge"), None).unwrap()).unwrap();
    badge.observe(0.0, 100.0, 1000.0, 0.0);
    let waiting = badge.frame(150.0);
    assert_eq!(waiting.opacity, 0.0);
    assert!(close(waiting.scale, 0.8));
    assert!(badge.frame(800.0).finished);
}

#[test]
fn reveal_rejects_negative_duration() {
    assert!(matches!(
        Reveal::new(RevealConfig {
            duration_ms: -1.0,
            ..RevealConfig::default()
        }),
        Err(ConfigError::Negative { field: "durationMs", .. })
    ));
}
