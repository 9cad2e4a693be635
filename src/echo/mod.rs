//! Echo-service layer for discovering the external IP address.
//!
//! This module provides types and traits for:
//! - Abstracting HTTP clients ([`HttpClient`]) and the reqwest implementation ([`ReqwestClient`])
//! - Asking one echo service for the address ([`EchoFetcher`], [`HttpEchoFetcher`])
//! - Choosing which services to ask ([`ServiceSelector`])
//! - Reducing the answers to a single address ([`IpResolver`], [`ResolutionResult`])

mod client;
mod error;
mod fetcher;
mod request;
mod resolver;
mod selector;


pub use client::ReqwestClient;
pub use error::{ClientBuildError, HttpError};
pub use fetcher::{EchoFetcher, HttpEchoFetcher};
pub use request::{HttpClient, HttpRequest, HttpResponse};
pub use resolver::{IpResolver, Observation, ResolutionResult};
pub use selector::{OrderedSelector, RandomSelector, ServiceSelector};
