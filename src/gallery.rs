//! Category filter and lightbox for the gallery section.

use std::collections::HashSet;
use std::fmt;

use crate::error::GalleryError;

pub type ImageId = u32;

/// Label of the filter that shows every image.
pub const ALL: &str = "All";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageEntry {
    pub id: ImageId,
    pub source: String,
    pub label: String,
    pub category: String,
    pub description: String,
}

impl ImageEntry {
    pub fn new(id: ImageId, source: &str, label: &str, category: &str, description: &str) -> Self {
        Self {
            id,
            source: source.to_string(),
            label: label.to_string(),
            category: category.to_string(),
            description: description.to_string(),
        }
    }
}

/// The hotel's built-in photo catalog.
pub fn hotel_catalog() -> Vec<ImageEntry> {
    const PEXELS: &str = "https://images.pexels.com/photos";
    const SIZE: &str = "auto=compress&cs=tinysrgb&w=800";
    let src = |id: u32| format!("{PEXELS}/{id}/pexels-photo-{id}.jpeg?{SIZE}");
    vec![
        ImageEntry::new(1, &src(338504), "Hotel Exterior", "Architecture", "Majestic facade overlooking Dal Lake"),
        ImageEntry::new(2, &src(271624), "Royal Suite", "Rooms", "Luxury accommodation with traditional Kashmiri decor"),
        ImageEntry::new(3, &src(1743231), "Saffron Restaurant", "Dining", "Elegant dining with authentic Kashmiri cuisine"),
        ImageEntry::new(4, &src(262048), "Spa Sanctuary", "Wellness", "Tranquil spa treatments with mountain views"),
        ImageEntry::new(5, &src(1134176), "Mughal Gardens", "Gardens", "Pristine gardens inspired by Mughal architecture"),
        ImageEntry::new(6, &src(1743229), "Infinity Pool", "Recreation", "Heated pool with panoramic valley views"),
    ]
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Filter {
    All,
    Category(String),
}

impl Filter {
    fn admits(&self, entry: &ImageEntry) -> bool {
        match self {
            Filter::All => true,
            Filter::Category(name) => entry.category == *name,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => f.write_str(ALL),
            Filter::Category(name) => f.write_str(name),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lightbox {
    Closed,
    Open(ImageId),
}

/// Filter and lightbox state over a fixed catalog.
///
/// The open image is always a member of the filtered subset: changing the
/// filter so that it drops out closes the lightbox.
#[derive(Clone, Debug)]
pub struct Gallery {
    catalog: Vec<ImageEntry>,
    filter: Filter,
    lightbox: Lightbox,
}

impl Gallery {
    pub fn new(catalog: Vec<ImageEntry>) -> Result<Self, GalleryError> {
        let mut seen = HashSet::new();
        if let Some(dup) = catalog.iter().find(|e| !seen.insert(e.id)) {
            return Err(GalleryError::DuplicateId(dup.id));
        }
        Ok(Self {
            catalog,
            filter: Filter::All,
            lightbox: Lightbox::Closed,
        })
    }

    pub fn hotel() -> Self {
        Self {
            catalog: hotel_catalog(),
            filter: Filter::All,
            lightbox: Lightbox::Closed,
        }
    }

    pub fn catalog(&self) -> &[ImageEntry] {
        &self.catalog
    }

    /// `All`, then each distinct category in catalog order.
    pub fn categories(&self) -> Vec<String> {
        let mut out = vec![ALL.to_string()];
        for entry in &self.catalog {
            if !out[1..].contains(&entry.category) {
                out.push(entry.category.clone());
            }
        }
        out
    }

    pub fn active_filter(&self) -> &Filter {
        &self.filter
    }

    pub fn lightbox(&self) -> Lightbox {
        self.lightbox
    }

    pub fn filtered(&self) -> impl Iterator<Item = &ImageEntry> + '_ {
        self.catalog.iter().filter(|e| self.filter.admits(e))
    }

    pub fn select_filter(&mut self, label: &str) -> Result<(), GalleryError> {
        let filter = if label == ALL {
            Filter::All
        } else if self.catalog.iter().any(|e| e.category == label) {
            Filter::Category(label.to_string())
        } else {
            return Err(GalleryError::UnknownCategory(label.to_string()));
        };
        self.filter = filter;

        if let Lightbox::Open(id) = self.lightbox {
            if self.position_of(id).is_none() {
                log::debug!("image {id} left the '{}' filter, closing lightbox", self.filter);
                self.lightbox = Lightbox::Closed;
            }
        }
        Ok(())
    }

    /// Opens the lightbox on `id`. Ids outside the filtered subset are
    /// ignored; returns whether the lightbox is now showing `id`.
    pub fn open(&mut self, id: ImageId) -> bool {
        if self.position_of(id).is_none() {
            return false;
        }
        self.lightbox = Lightbox::Open(id);
        true
    }

    pub fn close(&mut self) {
        self.lightbox = Lightbox::Closed;
    }

    pub fn next(&mut self) -> Option<ImageId> {
        self.step(1)
    }

    pub fn prev(&mut self) -> Option<ImageId> {
        self.step(-1)
    }

    pub fn current(&self) -> Option<&ImageEntry> {
        match self.lightbox {
            Lightbox::Open(id) => self.catalog.iter().find(|e| e.id == id),
            Lightbox::Closed => None,
        }
    }

    fn step(&mut self, offset: isize) -> Option<ImageId> {
        let Lightbox::Open(id) = self.lightbox else {
            return None;
        };
        let subset: Vec<ImageId> = self.filtered().map(|e| e.id).collect();
        let index = subset.iter().position(|&x| x == id)?;
        let len = subset.len() as isize;
        let target = subset[(index as isize + offset).rem_euclid(len) as usize];
        self.lightbox = Lightbox::Open(target);
        Some(target)
    }

    fn position_of(&self, id: ImageId) -> Option<usize> {
        self.filtered().position(|e| e.id == id)
    }
}
