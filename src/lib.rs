//! A small blocking Rust client for the OpenCage geocoding API.
//!
//! One call maps a free-text location to structured results (coordinates,
//! confidence, formatted address, bounding box). The client paces itself from
//! the rate-limit block the service returns, so a shared [`Client`] stays
//! under its quota without any retry logic.
//!
//! ## Quick start
//! - Configure the API key via `OPENCAGE_API_KEY` or a `.opencagerc` file
//!   (supported in the current directory and in your home directory), or pass
//!   it to [`Client::new`].
//! - Call [`Client::geocode`] with a query and optional [`GeocodeParams`].
//!
//! ```no_run
//! use anyhow::Result;
//! use opencage::{Client, GeocodeParams};
//!
//! fn main() -> Result<()> {
//!     let client = Client::from_env()?;
//!     let params = GeocodeParams::default().with_country_code("BE");
//!     let result = client.geocode("Fonteinstraat, Leuven", Some(&params))?;
//!     for item in &result.results {
//!         println!("{} ({}, {})", item.formatted, item.geometry.lat, item.geometry.lng);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Non-200 status codes embedded in the response body come back as
//! [`Error::Geocode`]; use [`Error::code`] to branch on them.

#![forbid(unsafe_code)]

mod client;
mod config;
mod error;
mod pacing;
mod params;
mod response;
mod transport;

pub use client::Client;
pub use config::DEFAULT_ENDPOINT;
pub use error::{Error, GeocodeError, TransportError};
pub use params::{Bounds, GeocodeParams};
pub use response::{
    GeocodeResult, GeocodeResultItem, Geometry, Rate, ResultBounds, STATUS_OK, Status,
};
pub use transport::{Clock, HttpTransport, SystemClock, Transport};
