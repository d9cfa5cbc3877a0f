//! Visual-effect and interaction layer of the Grand Kaiser hotel site.
//!
//! Component state (gradient breathing, ripple grid, expanding strip, emblem,
//! scroll parallax and reveals, gallery lightbox, reservation forms) is plain
//! Rust and builds on any target. The browser bindings that put it on screen are compiled only for
//! wasm32.

pub mod anim;
pub mod config;
pub mod emblem;
pub mod error;
pub mod gallery;
pub mod glb;
pub mod gradient;
pub mod reservation;
pub mod ripple;
pub mod scroll;
pub mod strip;

// Only compile wasm-specific code when targeting wasm32.
#[cfg(target_arch = "wasm32")]
mod wasm {
    use wasm_bindgen::prelude::*;

    mod emblem;
    mod events;
    mod gradient;
    mod handles;
    mod page;
    mod raf;
    mod render;
    mod ripple;
    mod scroll;
    mod strip;

    pub use handles::{GalleryHandle, ReservationFormHandle, ReservationModalHandle};
    pub use page::{mount_page, PageEffects};

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let level = if cfg!(debug_assertions) {
            log::Level::Debug
        } else {
            log::Level::Info
        };
        // A second init (e.g. in tests) just keeps the first logger.
        console_log::init_with_level(level).ok();
        log::info!("grand kaiser effects ready");
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm::{mount_page, GalleryHandle, PageEffects, ReservationFormHandle, ReservationModalHandle};
