// Client library for the Nextable restaurant reservation API

pub mod availability;
pub mod client;
pub mod compaction;
pub mod config;
pub mod error;
pub mod iso;
pub mod reservation;
pub mod restaurant;
pub mod search;
pub mod transport;
pub mod wire;

// Re-export key types for convenience
pub use availability::{DailyAvailability, TimeSlot};
pub use client::NextableClient;
pub use compaction::compact;
pub use config::ClientConfig;
pub use error::{NextableError, RemoteError, Result, ValidationError};
pub use iso::alpha3_to_alpha2;
pub use reservation::Reservation;
pub use restaurant::Restaurant;
pub use search::SearchCriteria;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
