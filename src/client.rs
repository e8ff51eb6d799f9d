// Nextable API client
// One method per vendor endpoint. Each call builds the request, authenticates it,
// hands it to the transport and maps the answer back onto the domain model.

use crate::compaction;
use crate::config::ClientConfig;
use crate::error::{RemoteError, Result, ValidationError};
use crate::reservation::Reservation;
use crate::restaurant::Restaurant;
use crate::search::SearchCriteria;
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
use crate::wire::{
    AvailabilityRestaurant, PlacedReservation, ReservationDetail, RestaurantDetail, ResultEnvelope,
};
use chrono_tz::Tz;
use reqwest::Method;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, instrument, trace};

const API_KEY_PARAM: &str = "apiKey";

fn require<'a>(value: Option<&'a str>, field: &'static str) -> std::result::Result<&'a str, ValidationError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::MissingField(field))
}

pub struct NextableClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
}

impl NextableClient {
    /// Creates a client backed by reqwest, honouring the configured timeout.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    // Disabled clients still build and log every request but never send it
    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    #[instrument(skip(self))]
    pub async fn get_restaurant(&self, restaurant_id: &str) -> Result<Restaurant> {
        let restaurant_id = require(Some(restaurant_id), "restaurantId")?;
        let url = self.config.segment_url("restaurants", restaurant_id)?;

        match self.request(Method::GET, url, Vec::new(), None).await? {
            Some(response) => {
                let detail: RestaurantDetail = response.json()?;
                Ok(Restaurant::from_detail(restaurant_id, &detail)?)
            }
            None => Ok(Restaurant::new(restaurant_id, Tz::UTC)),
        }
    }

    #[instrument(skip(self))]
    pub async fn get_reservation(&self, reservation_id: &str, restaurant_id: &str) -> Result<Reservation> {
        let reservation_id = require(Some(reservation_id), "reservationId")?;
        let restaurant_id = require(Some(restaurant_id), "restaurantId")?;
        let query = reservation_query(reservation_id, restaurant_id);

        match self.request(Method::GET, self.config.url("reservations"), query, None).await? {
            Some(response) => {
                let detail: ReservationDetail = response.json()?;
                Ok(Reservation::from_detail(
                    &detail,
                    Some(reservation_id),
                    Some(restaurant_id),
                )?)
            }
            None => {
                let mut reservation = Reservation::new(restaurant_id);
                reservation.id = Some(reservation_id.to_string());
                Ok(reservation)
            }
        }
    }

    /// Places a new reservation and stores the id Nextable assigned on `reservation`.
    #[instrument(skip(self, reservation), fields(restaurant_id = %reservation.restaurant_id))]
    pub async fn create_reservation(&self, reservation: &mut Reservation) -> Result<()> {
        require(Some(reservation.restaurant_id.as_str()), "restaurantId")?;
        let body = reservation.to_json();

        let url = self.config.url("reservations");
        if let Some(response) = self.request(Method::POST, url, Vec::new(), Some(body)).await? {
            let placed: ResultEnvelope<PlacedReservation> = response.json()?;
            reservation.id = Some(placed.result.key);
        }
        Ok(())
    }

    /// Updates a reservation. The input is left untouched, the returned value
    /// reflects what Nextable stored.
    #[instrument(skip(self, reservation), fields(reservation_id = ?reservation.id))]
    pub async fn edit_reservation(&self, reservation: &Reservation) -> Result<Reservation> {
        require(reservation.id.as_deref(), "reservationId")?;
        require(Some(reservation.restaurant_id.as_str()), "restaurantId")?;
        let body = reservation.to_json();

        let url = self.config.url("reservations");
        match self.request(Method::PUT, url, Vec::new(), Some(body)).await? {
            Some(response) => {
                let edited: ResultEnvelope<ReservationDetail> = response.json()?;
                Ok(Reservation::from_detail(&edited.result, None, None)?)
            }
            None => Ok(reservation.clone()),
        }
    }

    pub async fn cancel_reservation(&self, reservation: &Reservation) -> Result<()> {
        let reservation_id = require(reservation.id.as_deref(), "reservationId")?;
        self.cancel_reservation_by_id(reservation_id, &reservation.restaurant_id)
            .await
    }

    // Cancelling twice is not an error
    #[instrument(skip(self))]
    pub async fn cancel_reservation_by_id(&self, reservation_id: &str, restaurant_id: &str) -> Result<()> {
        let reservation_id = require(Some(reservation_id), "reservationId")?;
        let restaurant_id = require(Some(restaurant_id), "restaurantId")?;
        let query = reservation_query(reservation_id, restaurant_id);

        match self.request(Method::DELETE, self.config.url("reservations"), query, None).await {
            Ok(_) => Ok(()),
            Err(err) if err.remote().map_or(false, RemoteError::is_already_cancelled) => {
                debug!(
                    reservation_id,
                    transaction_id = ?err.remote().and_then(RemoteError::transaction_id),
                    "Reservation already cancelled"
                );
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Searches availabilities and returns the restaurants that have at least one
    /// bookable slot, with contiguous slots already merged.
    #[instrument(skip(self, criteria), fields(restaurants = criteria.restaurant_ids.len()))]
    pub async fn search_availabilities(&self, criteria: &SearchCriteria) -> Result<Vec<Restaurant>> {
        let query = criteria.query_params();

        match self
            .request(Method::GET, self.config.url("reservations/availability"), query, None)
            .await?
        {
            Some(response) => {
                let restaurants: Vec<AvailabilityRestaurant> = response.json()?;
                Ok(compaction::compact(&restaurants)?)
            }
            None => Ok(Vec::new()),
        }
    }

    // GET and DELETE carry the api key in the query string, POST and PUT in the body.
    // Returns None when the client is disabled.
    async fn request(
        &self,
        method: Method,
        url: String,
        query: Vec<(String, String)>,
        body: Option<Map<String, Value>>,
    ) -> Result<Option<ApiResponse>> {
        let sent_body = body.clone().map(Value::Object);
        let mut request = ApiRequest::new(method.clone(), url);
        request.query = query;

        if method == Method::GET || method == Method::DELETE {
            request = request.query_param(API_KEY_PARAM, &self.config.api_key);
        } else {
            let mut body = body.unwrap_or_default();
            body.insert(
                API_KEY_PARAM.to_string(),
                Value::String(self.config.api_key.clone()),
            );
            request.body = Some(Value::Object(body));
        }

        trace!(
            method = %request.method,
            url = %request.url,
            body = ?sent_body,
            "Nextable request"
        );

        if !self.config.enabled {
            debug!(method = %request.method, url = %request.url, "Nextable disabled, request not sent");
            return Ok(None);
        }

        let response = self.transport.send(&request).await?;
        if !response.is_success() {
            return Err(RemoteError::from_response(&response, sent_body).into());
        }
        Ok(Some(response))
    }
}

fn reservation_query(reservation_id: &str, restaurant_id: &str) -> Vec<(String, String)> {
    vec![
        ("reservationId".to_string(), reservation_id.to_string()),
        ("restaurantId".to_string(), restaurant_id.to_string()),
    ]
}
