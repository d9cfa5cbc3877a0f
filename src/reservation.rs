//! Reservation forms: the inline booking section and the per-room modal.
//!
//! Submission goes through a [`ReservationService`]. The site ships with
//! [`SimulatedReservationService`], which confirms every request; the form
//! waits a fixed latency before asking it, shows the confirmation for a fixed
//! time, then resets. Time is passed in explicitly as milliseconds so the
//! state machine can be driven by browser timers or by tests.

use std::cell::Cell;
use std::fmt;

use crate::error::{FormError, SubmissionError};

/// Simulated round-trip before the service is consulted.
pub const SUBMIT_LATENCY_MS: f64 = 2000.0;
/// How long the confirmation stays up before the form resets.
pub const CONFIRMATION_DISPLAY_MS: f64 = 3000.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GuestCount {
    One,
    #[default]
    Two,
    Three,
    Four,
    FivePlus,
}

impl GuestCount {
    pub fn parse(value: &str) -> Result<Self, FormError> {
        match value.trim() {
            "1" => Ok(Self::One),
            "2" => Ok(Self::Two),
            "3" => Ok(Self::Three),
            "4" => Ok(Self::Four),
            "5+" => Ok(Self::FivePlus),
            other => Err(FormError::InvalidChoice {
                field: "guests",
                value: other.to_string(),
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::One => "1",
            Self::Two => "2",
            Self::Three => "3",
            Self::Four => "4",
            Self::FivePlus => "5+",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RoomType {
    Royal,
    Family,
    #[default]
    Deluxe,
    Premium,
}

impl RoomType {
    pub const ALL: [RoomType; 4] = [Self::Royal, Self::Family, Self::Deluxe, Self::Premium];

    pub fn parse(value: &str) -> Result<Self, FormError> {
        Self::ALL
            .into_iter()
            .find(|room| room.as_str() == value.trim())
            .ok_or_else(|| FormError::InvalidChoice {
                field: "roomType",
                value: value.to_string(),
            })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Royal => "royal",
            Self::Family => "family",
            Self::Deluxe => "deluxe",
            Self::Premium => "premium",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Royal => "Royal Suite - ₹25,000/night",
            Self::Family => "Family Suite - ₹18,000/night",
            Self::Deluxe => "Deluxe Suite - ₹15,000/night",
            Self::Premium => "Premium Room - ₹12,000/night",
        }
    }
}

/// Which room the guest is booking.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoomChoice {
    /// Chosen from the room-type dropdown of the inline form.
    Type(RoomType),
    /// Fixed by the room card that opened the modal.
    Named { name: String, price: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Phone,
    CheckIn,
    CheckOut,
    Guests,
    RoomType,
    SpecialRequests,
}

impl Field {
    /// Maps a form control `name` attribute to a field.
    pub fn from_name(name: &str) -> Result<Self, FormError> {
        match name {
            "name" => Ok(Self::Name),
            "email" => Ok(Self::Email),
            "phone" => Ok(Self::Phone),
            "checkIn" => Ok(Self::CheckIn),
            "checkOut" => Ok(Self::CheckOut),
            "guests" => Ok(Self::Guests),
            "roomType" => Ok(Self::RoomType),
            "specialRequests" => Ok(Self::SpecialRequests),
            other => Err(FormError::UnknownField(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GuestDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub check_in: String,
    pub check_out: String,
    pub guests: GuestCount,
    pub special_requests: String,
}

impl GuestDetails {
    fn first_missing(&self) -> Option<&'static str> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("checkIn", &self.check_in),
            ("checkOut", &self.check_out),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
    }
}

/// Payload handed to the reservation backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReservationRequest {
    pub guest: GuestDetails,
    pub room: RoomChoice,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfirmationId(pub String);

impl fmt::Display for ConfirmationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Boundary to whatever actually books the room.
pub trait ReservationService {
    fn submit_reservation(&self, request: &ReservationRequest) -> Result<ConfirmationId, SubmissionError>;
}

/// Accepts every request and numbers confirmations sequentially.
#[derive(Debug, Default)]
pub struct SimulatedReservationService {
    issued: Cell<u32>,
}

impl SimulatedReservationService {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReservationService for SimulatedReservationService {
    fn submit_reservation(&self, request: &ReservationRequest) -> Result<ConfirmationId, SubmissionError> {
        let n = self.issued.get() + 1;
        self.issued.set(n);
        log::info!("simulated reservation {n} for {}", request.guest.name);
        Ok(ConfirmationId(format!("GK-{n:06}")))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting { started_at: OrderedMs },
    Submitted { confirmation: ConfirmationId, since: OrderedMs },
    Failed { message: String },
}

/// Millisecond timestamp with the `Eq` the phase enum wants; never NaN.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrderedMs(f64);

impl Eq for OrderedMs {}

impl OrderedMs {
    fn new(ms: f64) -> Self {
        Self(if ms.is_nan() { 0.0 } else { ms })
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

/// Transition reported by [`Timed::advance`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormEvent {
    Confirmed(ConfirmationId),
    Failed(String),
    Reset,
    Closed,
}

/// A state machine with time-based transitions.
pub trait Timed {
    /// Applies every transition due at or before `now_ms`.
    fn advance(&mut self, now_ms: f64) -> Vec<FormEvent>;

    /// When the next transition is due, if any.
    fn next_deadline(&self) -> Option<f64>;
}

pub struct ReservationForm<S> {
    guest: GuestDetails,
    room: RoomChoice,
    initial_room: RoomChoice,
    phase: Phase,
    service: S,
}

impl<S: ReservationService> ReservationForm<S> {
    /// The inline booking form, defaulting to a deluxe suite.
    pub fn inline(service: S) -> Self {
        Self::with_room(service, RoomChoice::Type(RoomType::default()))
    }

    pub fn with_room(service: S, room: RoomChoice) -> Self {
        Self {
            guest: GuestDetails::default(),
            initial_room: room.clone(),
            room,
            phase: Phase::Idle,
            service,
        }
    }

    pub fn guest(&self) -> &GuestDetails {
        &self.guest
    }

    pub fn room(&self) -> &RoomChoice {
        &self.room
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.phase, Phase::Submitting { .. })
    }

    /// Inline error message, when the last submission failed.
    pub fn error_message(&self) -> Option<&str> {
        match &self.phase {
            Phase::Failed { message } => Some(message),
            _ => None,
        }
    }

    pub fn set_field(&mut self, field: Field, value: &str) -> Result<(), FormError> {
        if self.is_submitting() {
            return Err(FormError::Busy);
        }
        match field {
            Field::Name => self.guest.name = value.to_string(),
            Field::Email => self.guest.email = value.to_string(),
            Field::Phone => self.guest.phone = value.to_string(),
            Field::CheckIn => self.guest.check_in = value.to_string(),
            Field::CheckOut => self.guest.check_out = value.to_string(),
            Field::Guests => self.guest.guests = GuestCount::parse(value)?,
            Field::SpecialRequests => self.guest.special_requests = value.to_string(),
            Field::RoomType => match self.room {
                RoomChoice::Type(_) => self.room = RoomChoice::Type(RoomType::parse(value)?),
                RoomChoice::Named { .. } => return Err(FormError::FieldNotPresent("roomType")),
            },
        }
        if matches!(self.phase, Phase::Failed { .. }) {
            self.phase = Phase::Idle;
        }
        Ok(())
    }

    /// Starts a submission at `now_ms`.
    pub fn submit(&mut self, now_ms: f64) -> Result<(), FormError> {
        match self.phase {
            Phase::Idle | Phase::Failed { .. } => {}
            _ => return Err(FormError::Busy),
        }
        if let Some(field) = self.guest.first_missing() {
            return Err(FormError::MissingField(field));
        }
        self.phase = Phase::Submitting {
            started_at: OrderedMs::new(now_ms),
        };
        Ok(())
    }

    /// Abandons a pending submission without contacting the service.
    pub fn cancel(&mut self) {
        if self.is_submitting() {
            log::debug!("reservation submission cancelled");
            self.phase = Phase::Idle;
        }
    }

    /// Blank fields, initial room choice, idle.
    pub fn reset(&mut self) {
        self.guest = GuestDetails::default();
        self.room = self.initial_room.clone();
        self.phase = Phase::Idle;
    }

    fn request(&self) -> ReservationRequest {
        ReservationRequest {
            guest: self.guest.clone(),
            room: self.room.clone(),
        }
    }
}

impl<S: ReservationService> Timed for ReservationForm<S> {
    fn advance(&mut self, now_ms: f64) -> Vec<FormEvent> {
        let mut events = Vec::new();
        while let Some(due) = self.next_deadline().filter(|&due| now_ms >= due) {
            if self.is_submitting() {
                match self.service.submit_reservation(&self.request()) {
                    Ok(confirmation) => {
                        events.push(FormEvent::Confirmed(confirmation.clone()));
                        self.phase = Phase::Submitted {
                            confirmation,
                            since: OrderedMs::new(due),
                        };
                    }
                    Err(err) => {
                        log::warn!("reservation failed: {err}");
                        let message = err.to_string();
                        events.push(FormEvent::Failed(message.clone()));
                        self.phase = Phase::Failed { message };
                    }
                }
            } else {
                self.reset();
                events.push(FormEvent::Reset);
            }
        }
        events
    }

    fn next_deadline(&self) -> Option<f64> {
        match &self.phase {
            Phase::Submitting { started_at } => Some(started_at.get() + SUBMIT_LATENCY_MS),
            Phase::Submitted { since, .. } => Some(since.get() + CONFIRMATION_DISPLAY_MS),
            Phase::Idle | Phase::Failed { .. } => None,
        }
    }
}

/// Booking modal opened from a room card.
pub struct ReservationModal<S> {
    form: ReservationForm<S>,
    open: bool,
    mounted: bool,
}

impl<S: ReservationService> ReservationModal<S> {
    pub fn new(service: S, room_name: &str, room_price: &str) -> Self {
        let room = RoomChoice::Named {
            name: room_name.to_string(),
            price: room_price.to_string(),
        };
        Self {
            form: ReservationForm::with_room(service, room),
            open: false,
            mounted: true,
        }
    }

    pub fn form(&self) -> &ReservationForm<S> {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ReservationForm<S> {
        &mut self.form
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        if self.mounted {
            self.open = true;
        }
    }

    /// Closes and resets the modal. Ignored while a submission is in flight;
    /// returns whether the modal closed.
    pub fn close(&mut self) -> bool {
        if self.form.is_submitting() {
            return false;
        }
        self.open = false;
        self.form.reset();
        true
    }

    /// The owning page went away: drop any pending submission and stop
    /// reacting to timers.
    pub fn unmount(&mut self) {
        self.form.cancel();
        self.open = false;
        self.mounted = false;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }
}

impl<S: ReservationService> Timed for ReservationModal<S> {
    fn advance(&mut self, now_ms: f64) -> Vec<FormEvent> {
        if !self.mounted {
            return Vec::new();
        }
        let mut events = self.form.advance(now_ms);
        if events.contains(&FormEvent::Reset) {
            self.open = false;
            events.push(FormEvent::Closed);
        }
        events
    }

    fn next_deadline(&self) -> Option<f64> {
        if self.mounted {
            self.form.next_deadline()
        } else {
            None
        }
    }
}
