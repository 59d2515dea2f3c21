//! ntlm-soap: SOAP over HTTP with NTLM authentication
//!
//! A library for sending SOAP envelopes to endpoints that may require
//! NTLM authentication, reporting every call as a structured record.

pub mod client;
pub mod config;
pub mod observer;
pub mod time;
pub mod transport;
