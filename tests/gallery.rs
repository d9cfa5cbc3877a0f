use grand_kaiser_fx::error::GalleryError;
use grand_kaiser_fx::gallery::{Filter, Gallery, ImageEntry, Lightbox, ALL};

fn entry(id: u32, category: &str) -> ImageEntry {
    ImageEntry::new(id, &format!("/img/{id}.jpg"), &format!("Image {id}"), category, "")
}

/// Six images over three categories, two of them "Dining".
fn six() -> Gallery {
    Gallery::new(vec![
        entry(1, "Rooms"),
        entry(2, "Dining"),
        entry(3, "Spa"),
        entry(4, "Rooms"),
        entry(5, "Dining"),
        entry(6, "Spa"),
    ])
    .unwrap()
}

fn ids(gallery: &Gallery) -> Vec<u32> {
    gallery.filtered().map(|e| e.id).collect()
}

#[test]
fn categories_start_with_all_in_catalog_order() {
    assert_eq!(six().categories(), vec![ALL, "Rooms", "Dining", "Spa"]);
}

#[test]
fn dining_filter_scenario() {
    let mut g = six();
    g.select_filter("Dining").unwrap();
    assert_eq!(ids(&g), vec![2, 5]);

    assert!(g.open(2));
    assert_eq!(g.next(), Some(5));
    assert_eq!(g.next(), Some(2));
    assert_eq!(g.prev(), Some(5));
}

#[test]
fn next_then_prev_returns_to_start() {
    let mut g = six();
    for id in 1..=6 {
        g.open(id);
        g.next();
        assert_eq!(g.prev(), Some(id));
    }
}

#[test]
fn next_len_times_is_identity() {
    let mut g = six();
    g.open(3);
    for _ in 0..6 {
        g.next();
    }
    assert_eq!(g.lightbox(), Lightbox::Open(3));
}

#[test]
fn single_image_subset_wraps_to_itself() {
    let mut g = Gallery::new(vec![entry(1, "Rooms"), entry(2, "Pool")]).unwrap();
    g.select_filter("Pool").unwrap();
    g.open(2);
    assert_eq!(g.next(), Some(2));
    assert_eq!(g.prev(), Some(2));
}

#[test]
fn navigation_is_noop_when_closed() {
    let mut g = six();
    assert_eq!(g.next(), None);
    assert_eq!(g.prev(), None);
    assert_eq!(g.lightbox(), Lightbox::Closed);
}

#[test]
fn cannot_open_image_outside_filter() {
    let mut g = six();
    g.select_filter("Spa").unwrap();
    assert!(!g.open(2));
    assert_eq!(g.lightbox(), Lightbox::Closed);
    assert!(!g.open(99));
}

#[test]
fn filter_change_closes_foreign_image() {
    let mut g = six();
    g.open(1);
    g.select_filter("Dining").unwrap();
    assert_eq!(g.lightbox(), Lightbox::Closed);
}

#[test]
fn filter_change_keeps_member_image_open() {
    let mut g = six();
    g.open(2);
    g.select_filter("Dining").unwrap();
    assert_eq!(g.lightbox(), Lightbox::Open(2));
    g.select_filter(ALL).unwrap();
    assert_eq!(g.lightbox(), Lightbox::Open(2));
}

#[test]
fn unknown_category_leaves_state_alone() {
    let mut g = six();
    g.select_filter("Dining").unwrap();
    g.open(2);
    assert_eq!(
        g.select_filter("Casino"),
        Err(GalleryError::UnknownCategory("Casino".into()))
    );
    assert_eq!(g.active_filter(), &Filter::Category("Dining".into()));
    assert_eq!(g.lightbox(), Lightbox::Open(2));
}

#[test]
fn duplicate_ids_are_rejected() {
    let err = Gallery::new(vec![entry(1, "Rooms"), entry(1, "Spa")]).unwrap_err();
    assert_eq!(err, GalleryError::DuplicateId(1));
}

#[test]
fn hotel_catalog_has_six_distinct_categories() {
    let g = Gallery::hotel();
    assert_eq!(g.catalog().len(), 6);
    assert_eq!(g.categories().len(), 7);
}

#[test]
fn current_follows_navigation() {
    let mut g = Gallery::hotel();
    assert!(g.current().is_none());
    g.open(3);
    assert_eq!(g.current().map(|e| e.label.as_str()), Some("Saffron Restaurant"));
    g.next();
    assert_eq!(g.current().map(|e| e.id), Some(4));
}
