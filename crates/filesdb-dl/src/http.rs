use ureq::{http::Response, Body};

use crate::{error::DownloadError, http_client::SHARED_AGENT};

pub struct Http;

impl Http {
    /// Issues a GET request for `url` through the shared agent.
    ///
    /// Non-success statuses are turned into [`DownloadError::HttpError`].
    pub fn fetch(url: &str) -> Result<Response<Body>, DownloadError> {
        SHARED_AGENT.get(url).call().map_err(|err| {
            match err {
                ureq::Error::StatusCode(status) => {
                    DownloadError::HttpError {
                        status,
                        url: url.to_string(),
                    }
                }
                err => DownloadError::from(err),
            }
        })
    }
}
