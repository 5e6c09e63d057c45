// The `http` module provides the shared HTTPS client plumbing used by both
// the Gmail hub and the Gemini endpoint client.

use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::Client, client::legacy::connect::HttpConnector, rt::TokioExecutor,
};
use rustls::crypto::{CryptoProvider, ring::default_provider};
use tokio_util::bytes;

/// A type alias for the HTTPS connector.
pub type HttpsConnectorType = HttpsConnector<HttpConnector>;
/// A type alias for the Hyper client.
pub type HyperClient = Client<HttpsConnectorType, http_body_util::Full<bytes::Bytes>>;

/// Builds a Hyper client with native TLS roots.
///
/// Installing the crypto provider twice is harmless; the result of the second
/// install is ignored.
pub fn build_https_client<B>() -> Result<Client<HttpsConnectorType, B>, std::io::Error>
where
    B: hyper::body::Body + Send,
    B::Data: Send,
{
    _ = CryptoProvider::install_default(default_provider());

    let https = HttpsConnectorBuilder::new()
        .with_native_roots()?
        .https_or_http()
        .enable_http1()
        .build();

    Ok(Client::builder(TokioExecutor::new()).build(https))
}
