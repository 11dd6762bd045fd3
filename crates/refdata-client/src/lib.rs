//! HTTP client library for the Reference Data Admin API.
//!
//! This crate provides a typed HTTP client for the reference data backend.
//! Every resource is reached through [`RefDataClient::resource`], which
//! returns a [`ResourceClient`] typed by one of the marker types in
//! [`resources`].
//!
//! # Example
//!
//! ```no_run
//! use refdata_client::{ClientConfig, CountryRequest, ListParams, RefDataClient, resources};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), refdata_client::Error> {
//!     let client = RefDataClient::new(ClientConfig {
//!         base_url: "http://localhost:8080".into(),
//!         timeout: Duration::from_secs(30),
//!     })?;
//!
//!     let session = client.login("master", "ChangeMe123!").await?;
//!     let client = client.with_token(&session.access_token);
//!
//!     let countries = client.resource::<resources::Countries>();
//!     countries
//!         .create(&CountryRequest::new("Sweden", "SE"))
//!         .await?;
//!     let page = countries.list(&ListParams::default()).await?;
//!     println!("{} countries", page.pagination.total);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub mod resources;

pub use client::{ClientConfig, RefDataClient, ResourceClient};
pub use error::Error;
pub use types::*;
