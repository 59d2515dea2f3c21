//! Transport layer for sending SOAP envelopes over HTTP.
//!
//! This module provides types and traits for:
//! - Building HTTP requests ([`HttpRequest`])
//! - Handling HTTP responses and engine timings ([`HttpResponse`], [`TransferTimings`])
//! - Abstracting HTTP clients ([`HttpClient`])
//! - Production HTTP client implementation ([`ReqwestClient`])
//! - NTLM authentication as a client decorator ([`NtlmClient`])
//! - Per-scheme handlers with scoped overrides ([`TransportRegistry`])
//! - SOAP request execution with call records ([`TransportExecutor`])

mod client;
mod error;
mod executor;
mod http;
mod ntlm;
mod registry;
mod timing;

#[cfg(test)]
mod registry_tests;
#[cfg(test)]
pub(crate) mod test_fixtures;

pub use client::ReqwestClient;
pub use error::{HttpError, NtlmError, RegistryError, TransportError};
pub use executor::{SOAP_CONTENT_TYPE, TransportExecutor, build_soap_request};
pub use http::{HttpClient, HttpRequest, HttpResponse, TransferTimings};
pub use ntlm::NtlmClient;
pub use registry::{OverrideGuard, SchemeHandler, TransportRegistry};
pub use timing::{ConnectSlot, ConnectTimer, ConnectTimerLayer};
