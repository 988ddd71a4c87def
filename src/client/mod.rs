pub mod http;
pub mod request;

use crate::error::TransportError;

use reqwest::Url;

/// Performs one blocking GET and hands back the raw response body.
pub trait Transport {
    fn get(&self, url: &Url) -> Result<String, TransportError>;
}
