use grand_kaiser_fx::config::ComponentConfig;
use grand_kaiser_fx::strip::{compute_widths, ExpandableStrip, StripConfig};

fn sum(widths: &[f64]) -> f64 {
    widths.iter().sum()
}

#[test]
fn widths_sum_to_container() {
    for n in 1..8 {
        for hovered in std::iter::once(None).chain((0..n).map(Some)) {
            for container in [0.0, 300.0, 1280.0, 1920.0] {
                let w = compute_widths(n, hovered, 224.0, container);
                assert_eq!(w.len(), n);
                assert!((sum(&w) - container).abs() < 1e-6, "n={n} hovered={hovered:?} W={container}");
            }
        }
    }
}

#[test]
fn no_hover_gives_equal_shares() {
    let w = compute_widths(4, None, 224.0, 1200.0);
    assert_eq!(w, vec![300.0; 4]);
}

#[test]
fn hovered_panel_dominates() {
    let w = compute_widths(3, Some(1), 224.0, 1280.0);
    assert_eq!(w[0], 224.0);
    assert_eq!(w[2], 224.0);
    assert_eq!(w[1], 1280.0 - 448.0);
    assert!(w.iter().enumerate().all(|(i, &x)| i == 1 || x <= w[1]));
}

#[test]
fn narrow_container_keeps_equal_shares() {
    let w = compute_widths(4, Some(0), 224.0, 600.0);
    assert_eq!(w, vec![150.0; 4]);
}

#[test]
fn out_of_range_hover_counts_as_none() {
    assert_eq!(compute_widths(2, Some(5), 100.0, 400.0), vec![200.0, 200.0]);
    assert!(compute_widths(0, Some(0), 100.0, 400.0).is_empty());
}

#[test]
fn hover_animates_with_ease() {
    let mut strip = ExpandableStrip::new(StripConfig::default(), 3, 1280.0).unwrap();
    strip.hover(Some(0), 1000.0);

    let start = strip.frame(1000.0);
    assert!(!start.settled);
    assert!((start.panels[0].width - 1280.0 / 3.0).abs() < 1e-6);

    let mid = strip.frame(1250.0);
    assert!(mid.panels[0].width > start.panels[0].width);
    assert!(mid.panels[0].width < 832.0);
    assert!(mid.panels[0].zoom > 1.0 && mid.panels[0].zoom < 1.05);

    let end = strip.frame(1500.0);
    assert!(end.settled);
    assert!((end.panels[0].width - 832.0).abs() < 1e-6);
    assert!((end.panels[0].zoom - 1.05).abs() < 1e-9);
    assert!((end.panels[0].overlay - 0.2).abs() < 1e-9);
    assert_eq!(end.panels[1].zoom, 1.0);
    assert!((sum(&strip.widths_at(1250.0)) - 1280.0).abs() < 1e-6);
}

#[test]
fn retarget_starts_from_current_layout() {
    let mut strip = ExpandableStrip::new(StripConfig::default(), 3, 1280.0).unwrap();
    strip.hover(Some(0), 0.0);
    let before = strip.widths_at(200.0);
    strip.hover(Some(2), 200.0);
    let after = strip.widths_at(200.0);
    for (a, b) in before.iter().zip(&after) {
        assert!((a - b).abs() < 1e-9);
    }
    assert_eq!(strip.hovered(), Some(2));
    assert!((strip.widths_at(700.0)[2] - 832.0).abs() < 1e-6);
}

#[test]
fn leave_relaxes_to_equal_shares() {
    let mut strip = ExpandableStrip::new(StripConfig::default(), 4, 1200.0).unwrap();
    strip.hover(Some(3), 0.0);
    strip.leave(500.0);
    assert_eq!(strip.hovered(), None);
    assert_eq!(strip.widths_at(1000.0), vec![300.0; 4]);
}

#[test]
fn resize_snaps_to_new_rest() {
    let mut strip = ExpandableStrip::new(StripConfig::default(), 2, 1000.0).unwrap();
    strip.hover(Some(0), 0.0);
    strip.resize(800.0);
    assert_eq!(strip.widths_at(10.0), vec![576.0, 224.0]);
}

#[test]
fn config_rejects_bad_zoom() {
    assert!(StripConfig::resolve(None, Some(r#"{"hoverZoom": 0}"#)).is_err());
    assert!(StripConfig::resolve(Some("gallery"), None).is_ok());
}

#[test]
fn strip_rejects_invalid_config() {
    let config = StripConfig {
        min_width: -10.0,
        ..StripConfig::default()
    };
    assert!(ExpandableStrip::new(config, 3, 1280.0).is_err());
}

#[test]
fn focus_moving_within_strip_keeps_expansion() {
    let mut strip = ExpandableStrip::new(StripConfig::default(), 3, 1280.0).unwrap();
    strip.hover(Some(1), 0.0);
    strip.focus_out(true, 600.0);
    assert_eq!(strip.hovered(), Some(1));
    assert!((strip.widths_at(600.0)[1] - 832.0).abs() < 1e-6);

    strip.focus_out(false, 700.0);
    assert_eq!(strip.hovered(), None);
    assert!((strip.widths_at(1200.0)[1] - 1280.0 / 3.0).abs() < 1e-6);
}
