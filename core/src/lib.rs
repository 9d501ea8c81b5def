//! Synchronous core of the Luminate Online API wrapper.
//!
//! # Overview
//! Takes the form-encoded request posted by an admin panel, normalizes the
//! servlet shorthand (`cons` → `SRConsAPI`), builds the credentialed POST
//! for the Luminate Online REST API and interprets the answer.
//!
//! # Design
//! - `MantleClient` builds `HttpRequest` values and parses `HttpResponse`
//!   values without touching the network (host-does-IO pattern).
//! - `Mantle` glues a `ConfigStore` and an `HttpClient` into the single
//!   call the admin panel makes.
//! - Per-call state is passed as values (`CallTarget`), never stored.

pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod servlet;
pub mod types;

pub use client::MantleClient;
pub use config::{ConfigStore, MantleConfig, ResponseFormat, Settings};
pub use error::{MantleError, TransportError};
pub use gateway::Mantle;
pub use http::{HttpClient, HttpRequest, HttpResponse};
pub use servlet::normalize;
pub use types::{CallTarget, RemoteBody, Reply, RequestEnvelope};
