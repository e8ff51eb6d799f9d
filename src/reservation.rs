// Reservation entity
// Free-text fields are cut to the vendor's column sizes when they are set, not when sent.

use crate::error::ValidationError;
use crate::wire::{format_date_time, parse_local_date_time, ReservationBody, ReservationDetail};
use chrono::NaiveDateTime;
use serde_json::{Map, Value};
use std::fmt;

pub const SPECIAL_REQUEST_MAX_LEN: usize = 500;
pub const EMAIL_MAX_LEN: usize = 255;
pub const NAME_MAX_LEN: usize = 50;
pub const PHONE_NUMBER_MAX_LEN: usize = 10;
pub const PHONE_CODE_MAX_LEN: usize = 5;

// Empty ids are treated as absent
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn cut(value: Option<&str>, max_len: usize) -> Option<String> {
    value.map(|v| v.chars().take(max_len).collect())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reservation {
    // Assigned by Nextable on creation
    pub id: Option<String>,
    pub restaurant_id: String,
    // Restaurant-local, no zone attached
    pub start: Option<NaiveDateTime>,
    // 0 means not set
    pub party_size: u32,

    special_request: Option<String>,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    phone_number: Option<String>,
    phone_code: Option<String>,
}

impl Reservation {
    pub fn new(restaurant_id: impl Into<String>) -> Self {
        Self {
            restaurant_id: restaurant_id.into(),
            ..Default::default()
        }
    }

    /// Rebuilds a reservation from a get or edit payload.
    ///
    /// Explicit ids win over the ones found in the payload; at least one of
    /// them must be present for both the reservation and the restaurant.
    pub fn from_detail(
        detail: &ReservationDetail,
        reservation_id: Option<&str>,
        restaurant_id: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let id = non_empty(reservation_id)
            .or(non_empty(detail.key.as_deref()))
            .ok_or(ValidationError::MissingField("key"))?;
        let restaurant_id = non_empty(restaurant_id)
            .or(non_empty(detail.restaurant_id.as_deref()))
            .ok_or(ValidationError::MissingField("restaurantId"))?;
        let party_size = u32::try_from(detail.party_size)
            .map_err(|_| ValidationError::InvalidPartySize(detail.party_size))?;

        let mut reservation = Reservation::new(restaurant_id);
        reservation.id = Some(id.to_string());
        reservation.start = Some(parse_local_date_time(&detail.date_and_time)?);
        reservation.party_size = party_size;
        reservation.set_first_name(detail.first_name.as_deref());
        reservation.set_last_name(detail.last_name.as_deref());
        reservation.set_email(detail.email.as_deref());
        reservation.set_phone_number(detail.phone.as_deref());
        reservation.set_phone_code(detail.phone_code.as_deref());
        reservation.set_special_request(detail.note.as_deref());
        Ok(reservation)
    }

    pub fn special_request(&self) -> Option<&str> {
        self.special_request.as_deref()
    }

    pub fn set_special_request(&mut self, special_request: Option<&str>) {
        self.special_request = cut(special_request, SPECIAL_REQUEST_MAX_LEN);
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn set_email(&mut self, email: Option<&str>) {
        self.email = cut(email, EMAIL_MAX_LEN);
    }

    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    pub fn set_first_name(&mut self, first_name: Option<&str>) {
        self.first_name = cut(first_name, NAME_MAX_LEN);
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    pub fn set_last_name(&mut self, last_name: Option<&str>) {
        self.last_name = cut(last_name, NAME_MAX_LEN);
    }

    pub fn phone_number(&self) -> Option<&str> {
        self.phone_number.as_deref()
    }

    pub fn set_phone_number(&mut self, phone_number: Option<&str>) {
        self.phone_number = cut(phone_number, PHONE_NUMBER_MAX_LEN);
    }

    pub fn phone_code(&self) -> Option<&str> {
        self.phone_code.as_deref()
    }

    pub fn set_phone_code(&mut self, phone_code: Option<&str>) {
        self.phone_code = cut(phone_code, PHONE_CODE_MAX_LEN);
    }

    pub fn to_body(&self) -> ReservationBody {
        ReservationBody {
            date_and_time: self.start.as_ref().map(format_date_time),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            phone: self.phone_number.clone(),
            phone_code: self.phone_code.clone(),
            party_size: (self.party_size > 0).then_some(self.party_size),
            restaurant_id: (!self.restaurant_id.is_empty()).then(|| self.restaurant_id.clone()),
            note: self.special_request.clone(),
            reservation_id: self.id.clone(),
        }
    }

    // Body object for POST/PUT reservations
    pub fn to_json(&self) -> Map<String, Value> {
        match serde_json::to_value(self.to_body()) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

impl fmt::Display for Reservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.to_json()))
    }
}
