//! Authenticated JSON transport for the cluster REST API

mod transport;

#[cfg(test)]
pub(crate) use transport::testing;
pub use transport::{HttpResponse, HttpTransport, Transport, TransportConfig};
