// Nextable wire format
// Field names are vendor-defined and must match bit-for-bit.

use crate::error::ValidationError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// Format used for dateAndTime in bodies and for the search bounds
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

// GET restaurants/{id}
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantDetail {
    pub time_zone: String,
    pub restaurant_name: String,
    pub time_slot_span: i64,
    pub description: Option<String>,
    pub business_phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub price: Option<String>,
    // cuisine1..cuisineN land here
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RestaurantDetail {
    // Reads cuisine1, cuisine2, ... until the first missing index, keeping non-empty strings
    pub fn cuisines(&self) -> Vec<String> {
        let mut cuisines = Vec::new();
        for i in 1.. {
            match self.extra.get(&format!("cuisine{}", i)) {
                None => break,
                Some(Value::String(c)) if !c.is_empty() => cuisines.push(c.clone()),
                Some(_) => {}
            }
        }
        cuisines
    }

    pub fn pricing_scale(&self) -> f64 {
        (self.price.as_deref().unwrap_or("").chars().count() / 4) as f64
    }
}

// GET reservations, and the "result" of PUT reservations
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDetail {
    pub key: Option<String>,
    pub restaurant_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub phone_code: Option<String>,
    pub date_and_time: String,
    pub party_size: i64,
    pub note: Option<String>,
}

// Body of POST/PUT reservations (apiKey is added by the client)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_and_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<String>,
}

// POST and PUT wrap their payload in {"result": ...}
#[derive(Debug, Clone, Deserialize)]
pub struct ResultEnvelope<T> {
    pub result: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlacedReservation {
    pub key: String,
}

// GET reservations/availability returns an array of these
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRestaurant {
    pub id: String,
    pub time_zone: Option<String>,
    pub slot_size: Option<i64>,
    pub availability: Option<Vec<AvailabilityDay>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AvailabilityDay {
    pub date: String,
    pub slots: Option<Vec<AvailabilitySlot>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySlot {
    pub time24: String,
    pub party_sizes: Option<Vec<PartySizeEntry>>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct PartySizeEntry {
    pub size: u32,
}

// Outgoing renderings of the domain model

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantView {
    pub id: String,
    pub granularity: i64,
    pub time_zone: String,
    pub pricing_scale: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub availabilities: Vec<DailyAvailabilityView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cuisines: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAvailabilityView {
    pub day: String,
    pub time_slots: Vec<TimeSlotView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlotView {
    pub start: String,
    pub duration: i64,
    pub end: String,
    pub party_sizes: Vec<u32>,
}

pub fn parse_time_zone(zone: &str) -> Result<Tz, ValidationError> {
    zone.parse::<Tz>()
        .map_err(|_| ValidationError::InvalidTimeZone(zone.to_string()))
}

// "18:30" or "18:30:00"
pub fn parse_time24(time: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
        .map_err(|_| ValidationError::InvalidDateTime(time.to_string()))
}

// Only the first 10 characters (yyyy-MM-dd) of the vendor date are meaningful
pub fn parse_day(date: &str) -> Result<NaiveDate, ValidationError> {
    let day = date.get(..10).unwrap_or(date);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDateTime(date.to_string()))
}

// ISO local date-time, seconds and fraction optional
pub fn parse_local_date_time(value: &str) -> Result<NaiveDateTime, ValidationError> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .map_err(|_| ValidationError::InvalidDateTime(value.to_string()))
}

pub fn format_date_time(value: &NaiveDateTime) -> String {
    value.format(DATE_TIME_FORMAT).to_string()
}
