// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for service discovery and the reconciliation loop.
//!
//! [`ListError`] classifies why listing services from the Kubernetes API
//! failed. [`WatchError`] is the payload of a failure event and wraps the
//! listing error with the selector that was used.
//!
//! None of these errors stop the reconciliation loop; they are reported and
//! the next cycle tries again.

use std::time::Duration;
use thiserror::Error;

/// Errors returned by a service listing.
#[derive(Error, Debug)]
pub enum ListError {
    /// The request never produced an HTTP response (connection refused, TLS,
    /// authentication, request construction).
    #[error("transport failure talking to the Kubernetes API")]
    Transport {
        #[source]
        source: kube::Error,
    },

    /// The API answered but the body could not be decoded.
    #[error("failed to decode service list: {reason}")]
    Decode {
        /// Decoder error message
        reason: String,
    },

    /// The API answered with a non-success status.
    #[error("Kubernetes API returned {code} {reason}: {message}")]
    ApiStatus {
        /// HTTP status code
        code: u16,
        /// Machine-readable reason (e.g. `Forbidden`)
        reason: String,
        /// Human-readable message from the API server
        message: String,
    },

    /// The listing did not finish in time.
    #[error("listing services timed out after {}s", timeout.as_secs())]
    Timeout {
        /// The limit that was exceeded
        timeout: Duration,
    },
}

impl From<kube::Error> for ListError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(response) => Self::ApiStatus {
                code: response.code,
                reason: response.reason,
                message: response.message,
            },
            kube::Error::SerdeError(e) => Self::Decode {
                reason: e.to_string(),
            },
            other => Self::Transport { source: other },
        }
    }
}

/// Failures reported by the reconciliation loop.
#[derive(Error, Debug)]
pub enum WatchError {
    /// Listing candidate services failed for one cycle.
    #[error("listing services failed (selector '{selector}')")]
    ListFailed {
        /// Label selector that was used
        selector: String,
        #[source]
        source: ListError,
    },
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
