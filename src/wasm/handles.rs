//! JavaScript-facing handles for the gallery and the reservation forms.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use super::raf::{now_ms, Timeout};
use crate::gallery::{Gallery, ImageEntry, ImageId, Lightbox};
use crate::reservation::{
    Field, Phase, ReservationForm, ReservationModal, SimulatedReservationService, Timed,
};

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
pub struct GalleryHandle {
    gallery: Gallery,
}

#[wasm_bindgen]
impl GalleryHandle {
    /// Gallery over the hotel's built-in catalog.
    #[wasm_bindgen(constructor)]
    pub fn new() -> GalleryHandle {
        GalleryHandle {
            gallery: Gallery::hotel(),
        }
    }

    pub fn categories(&self) -> Vec<String> {
        self.gallery.categories()
    }

    pub fn active_filter(&self) -> String {
        self.gallery.active_filter().to_string()
    }

    pub fn select_filter(&mut self, label: &str) -> Result<(), JsValue> {
        self.gallery.select_filter(label).map_err(js_error)
    }

    /// Ids of the images passing the active filter, in catalog order.
    pub fn filtered_ids(&self) -> Vec<ImageId> {
        self.gallery.filtered().map(|e| e.id).collect()
    }

    pub fn source(&self, id: ImageId) -> Option<String> {
        self.entry(id).map(|e| e.source.clone())
    }

    pub fn label(&self, id: ImageId) -> Option<String> {
        self.entry(id).map(|e| e.label.clone())
    }

    pub fn open(&mut self, id: ImageId) -> bool {
        self.gallery.open(id)
    }

    pub fn close(&mut self) {
        self.gallery.close();
    }

    pub fn is_open(&self) -> bool {
        matches!(self.gallery.lightbox(), Lightbox::Open(_))
    }

    pub fn next(&mut self) -> Option<ImageId> {
        self.gallery.next()
    }

    pub fn prev(&mut self) -> Option<ImageId> {
        self.gallery.prev()
    }

    pub fn current_id(&self) -> Option<ImageId> {
        self.gallery.current().map(|e| e.id)
    }

    pub fn current_label(&self) -> Option<String> {
        self.gallery.current().map(|e| e.label.clone())
    }

    pub fn current_description(&self) -> Option<String> {
        self.gallery.current().map(|e| e.description.clone())
    }
}

impl GalleryHandle {
    fn entry(&self, id: ImageId) -> Option<&ImageEntry> {
        self.gallery.catalog().iter().find(|e| e.id == id)
    }
}

impl Default for GalleryHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs a [`Timed`] state machine off `setTimeout`, re-arming after every
/// transition and telling JavaScript when something changed.
struct Driver<T> {
    state: RefCell<T>,
    timer: RefCell<Option<Timeout>>,
    on_change: RefCell<Option<js_sys::Function>>,
}

impl<T: Timed + 'static> Driver<T> {
    fn new(state: T) -> Rc<Self> {
        Rc::new(Self {
            state: RefCell::new(state),
            timer: RefCell::new(None),
            on_change: RefCell::new(None),
        })
    }

    fn rearm(self: &Rc<Self>) {
        let deadline = self.state.borrow().next_deadline();
        let timer = deadline.and_then(|due| {
            let weak = Rc::downgrade(self);
            let scheduled = Timeout::schedule(due - now_ms(), move || {
                if let Some(driver) = weak.upgrade() {
                    driver.tick();
                }
            });
            scheduled
                .inspect_err(|err| log::warn!("reservation timer not armed: {err}"))
                .ok()
        });
        *self.timer.borrow_mut() = timer;
    }

    fn tick(self: &Rc<Self>) {
        let events = self.state.borrow_mut().advance(now_ms());
        self.rearm();
        if !events.is_empty() {
            self.notify();
        }
    }

    fn notify(&self) {
        let callback = self.on_change.borrow().clone();
        if let Some(callback) = callback {
            if let Err(e) = callback.call0(&JsValue::NULL) {
                log::warn!("reservation change callback threw: {e:?}");
            }
        }
    }

    /// Applies `f` to the state, then re-arms and notifies.
    fn update<R>(self: &Rc<Self>, f: impl FnOnce(&mut T) -> R) -> R {
        let out = f(&mut self.state.borrow_mut());
        self.rearm();
        self.notify();
        out
    }
}

fn phase_name(phase: &Phase) -> &'static str {
    match phase {
        Phase::Idle => "idle",
        Phase::Submitting { .. } => "submitting",
        Phase::Submitted { .. } => "submitted",
        Phase::Failed { .. } => "failed",
    }
}

fn confirmation(phase: &Phase) -> Option<String> {
    match phase {
        Phase::Submitted { confirmation, .. } => Some(confirmation.to_string()),
        _ => None,
    }
}

type InlineForm = ReservationForm<SimulatedReservationService>;

/// The inline booking form.
#[wasm_bindgen]
pub struct ReservationFormHandle {
    driver: Rc<Driver<InlineForm>>,
}

#[wasm_bindgen]
impl ReservationFormHandle {
    #[wasm_bindgen(constructor)]
    pub fn new() -> ReservationFormHandle {
        ReservationFormHandle {
            driver: Driver::new(ReservationForm::inline(SimulatedReservationService::new())),
        }
    }

    /// Called with no arguments after every state change.
    pub fn set_on_change(&self, callback: js_sys::Function) {
        *self.driver.on_change.borrow_mut() = Some(callback);
    }

    /// Updates the field whose control is named `name` (`checkIn`,
    /// `roomType`, ...).
    pub fn set_field(&self, name: &str, value: &str) -> Result<(), JsValue> {
        let field = Field::from_name(name).map_err(js_error)?;
        self.driver
            .update(|form| form.set_field(field, value))
            .map_err(js_error)
    }

    pub fn submit(&self) -> Result<(), JsValue> {
        self.driver.update(|form| form.submit(now_ms())).map_err(js_error)
    }

    pub fn phase(&self) -> String {
        phase_name(self.driver.state.borrow().phase()).to_string()
    }

    pub fn confirmation(&self) -> Option<String> {
        confirmation(self.driver.state.borrow().phase())
    }

    pub fn error_message(&self) -> Option<String> {
        self.driver.state.borrow().error_message().map(str::to_string)
    }
}

impl Default for ReservationFormHandle {
    fn default() -> Self {
        Self::new()
    }
}

type RoomModal = ReservationModal<SimulatedReservationService>;

/// The booking modal opened from a room card.
#[wasm_bindgen]
pub struct ReservationModalHandle {
    driver: Rc<Driver<RoomModal>>,
}

#[wasm_bindgen]
impl ReservationModalHandle {
    #[wasm_bindgen(constructor)]
    pub fn new(room_name: &str, room_price: &str) -> ReservationModalHandle {
        ReservationModalHandle {
            driver: Driver::new(ReservationModal::new(
                SimulatedReservationService::new(),
                room_name,
                room_price,
            )),
        }
    }

    pub fn set_on_change(&self, callback: js_sys::Function) {
        *self.driver.on_change.borrow_mut() = Some(callback);
    }

    pub fn open(&self) {
        self.driver.update(|modal| modal.open());
    }

    /// Returns false while a submission is in flight.
    pub fn close(&self) -> bool {
        self.driver.update(|modal| modal.close())
    }

    pub fn is_open(&self) -> bool {
        self.driver.state.borrow().is_open()
    }

    pub fn set_field(&self, name: &str, value: &str) -> Result<(), JsValue> {
        let field = Field::from_name(name).map_err(js_error)?;
        self.driver
            .update(|modal| modal.form_mut().set_field(field, value))
            .map_err(js_error)
    }

    pub fn submit(&self) -> Result<(), JsValue> {
        self.driver
            .update(|modal| modal.form_mut().submit(now_ms()))
            .map_err(js_error)
    }

    pub fn phase(&self) -> String {
        phase_name(self.driver.state.borrow().form().phase()).to_string()
    }

    pub fn confirmation(&self) -> Option<String> {
        confirmation(self.driver.state.borrow().form().phase())
    }

    pub fn error_message(&self) -> Option<String> {
        self.driver
            .state
            .borrow()
            .form()
            .error_message()
            .map(str::to_string)
    }

    /// Cancels any pending submission and stops all timers.
    pub fn unmount(&self) {
        self.driver.state.borrow_mut().unmount();
        self.driver.timer.borrow_mut().take();
        self.driver.on_change.borrow_mut().take();
    }
}
