// Restaurant entity
// Identity, zone and granularity are validated on assignment; the rest is free-form vendor data.

use crate::availability::{localize, DailyAvailability};
use crate::error::ValidationError;
use crate::iso;
use crate::wire::{parse_time_zone, RestaurantDetail, RestaurantView};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use std::fmt;

pub const GRANULARITY_STEP_MINUTES: i64 = 15;

#[derive(Debug, Clone, PartialEq)]
pub struct Restaurant {
    id: String,
    time_zone: Tz,
    granularity: Duration,
    state_code: Option<String>,
    country_code: Option<String>,
    availabilities: Vec<DailyAvailability>,

    pub name: Option<String>,
    pub description: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub pricing_scale: f64,
    pub cuisines: Vec<String>,
}

impl Restaurant {
    pub fn new(id: impl Into<String>, time_zone: Tz) -> Self {
        Self {
            id: id.into(),
            time_zone,
            granularity: Duration::minutes(GRANULARITY_STEP_MINUTES),
            state_code: None,
            country_code: None,
            availabilities: Vec::new(),
            name: None,
            description: None,
            phone_number: None,
            address: None,
            city: None,
            postal_code: None,
            pricing_scale: 0.0,
            cuisines: Vec::new(),
        }
    }

    /// Builds a restaurant from a `GET restaurants/{id}` payload.
    pub fn from_detail(id: &str, detail: &RestaurantDetail) -> Result<Self, ValidationError> {
        let mut restaurant = Restaurant::new(id, parse_time_zone(&detail.time_zone)?);
        restaurant.set_granularity(Duration::minutes(detail.time_slot_span))?;
        restaurant.set_state_code(detail.state.as_deref());
        restaurant.set_country_code(detail.country.as_deref())?;
        restaurant.name = Some(detail.restaurant_name.clone());
        restaurant.description = detail.description.clone();
        restaurant.phone_number = detail.business_phone.clone();
        restaurant.address = detail.address.clone();
        restaurant.city = detail.city.clone();
        restaurant.postal_code = detail.zip.clone();
        restaurant.pricing_scale = detail.pricing_scale();
        restaurant.cuisines = detail.cuisines();
        Ok(restaurant)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }

    pub fn granularity(&self) -> Duration {
        self.granularity
    }

    // Positive, whole multiple of 15 minutes
    pub fn set_granularity(&mut self, granularity: Duration) -> Result<(), ValidationError> {
        let step_seconds = GRANULARITY_STEP_MINUTES * 60;
        let seconds = granularity.num_seconds();
        if seconds <= 0
            || seconds % step_seconds != 0
            || granularity != Duration::seconds(seconds)
        {
            return Err(ValidationError::InvalidGranularity(granularity.num_minutes()));
        }
        self.granularity = granularity;
        Ok(())
    }

    pub fn state_code(&self) -> Option<&str> {
        self.state_code.as_deref()
    }

    // Anything that is not exactly two characters is dropped
    pub fn set_state_code(&mut self, state_code: Option<&str>) {
        self.state_code = state_code
            .filter(|code| code.chars().count() == 2)
            .map(str::to_uppercase);
    }

    pub fn country_code(&self) -> Option<&str> {
        self.country_code.as_deref()
    }

    /// Stores an alpha-2 country code.
    ///
    /// Two-letter input is uppercased as-is; anything else is treated as an
    /// ISO 3166-1 alpha-3 code and translated, failing when the code is unknown.
    pub fn set_country_code(&mut self, country_code: Option<&str>) -> Result<(), ValidationError> {
        self.country_code = match country_code {
            None => None,
            Some(code) if code.chars().count() == 2 => Some(code.to_uppercase()),
            Some(code) => Some(iso::alpha3_to_alpha2(code)?.to_string()),
        };
        Ok(())
    }

    pub fn add_cuisine(&mut self, cuisine: impl Into<String>) {
        self.cuisines.push(cuisine.into());
    }

    pub fn availabilities(&self) -> &[DailyAvailability] {
        &self.availabilities
    }

    pub fn availability_mut(&mut self, index: usize) -> Option<&mut DailyAvailability> {
        self.availabilities.get_mut(index)
    }

    pub fn add_availability(&mut self, day: NaiveDate) -> &mut DailyAvailability {
        let availability =
            DailyAvailability::new(self.id.clone(), self.time_zone, self.granularity, day);
        self.availabilities.push(availability);
        let last = self.availabilities.len() - 1;
        &mut self.availabilities[last]
    }

    pub fn remove_availability(&mut self, index: usize) -> Option<DailyAvailability> {
        (index < self.availabilities.len()).then(|| self.availabilities.remove(index))
    }

    pub fn has_availability(&self) -> bool {
        self.availabilities.iter().any(DailyAvailability::has_availability)
    }

    // Is `party_size` bookable at this local date-time?
    pub fn has_availability_at(&self, date_time: NaiveDateTime, party_size: u32) -> bool {
        let instant = localize(&self.time_zone, date_time);
        let day = date_time.date();
        self.availabilities
            .iter()
            .filter(|a| a.day() == day)
            .flat_map(|a| a.time_slots())
            .any(|slot| slot.party_sizes().contains(&party_size) && slot.covers(&instant))
    }

    pub fn to_view(&self) -> RestaurantView {
        RestaurantView {
            id: self.id.clone(),
            granularity: self.granularity.num_minutes(),
            time_zone: self.time_zone.name().to_string(),
            pricing_scale: self.pricing_scale,
            availabilities: self
                .availabilities
                .iter()
                .map(DailyAvailability::to_view)
                .collect(),
            cuisines: self.cuisines.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            phone_number: self.phone_number.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            state_code: self.state_code.clone(),
            postal_code: self.postal_code.clone(),
            country_code: self.country_code.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self.to_view()).unwrap_or_default()
    }
}

impl fmt::Display for Restaurant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}
