// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Events produced by the reconciliation loop and the default log sink.
//!
//! Both certificate gaps and listing failures travel on a single channel as
//! [`ReconcileEvent`] values, so a consumer sees them in the order they were
//! produced.

use crate::errors::WatchError;
use crate::service::ServiceRecord;
use std::error::Error as _;
use tokio::sync::mpsc;
use tracing::{error, info};

/// One outcome reported by the reconciliation loop.
#[derive(Debug)]
pub enum ReconcileEvent {
    /// A routed service has domains without a certificate.
    NeedsCertificate {
        /// The service, as listed this cycle
        service: ServiceRecord,
        /// Domains lacking a certificate, in domains annotation order
        missing_domains: Vec<String>,
    },

    /// Listing candidate services failed for one cycle.
    Failure(WatchError),
}

/// Log one event.
pub fn log_event(event: &ReconcileEvent) {
    match event {
        ReconcileEvent::NeedsCertificate {
            service,
            missing_domains,
        } => {
            info!(
                service = %service,
                missing = missing_domains.len(),
                "Service {} needs certificate(s)",
                service.name
            );
            for domain in missing_domains {
                info!(service = %service, "    {domain}");
            }
        }
        ReconcileEvent::Failure(err) => {
            error!("ERROR: {}", error_chain(err));
        }
    }
}

/// Drain events until every sender is gone, logging each one.
///
/// Returns the number of events consumed.
pub async fn log_events(mut events: mpsc::Receiver<ReconcileEvent>) -> usize {
    let mut count = 0;
    while let Some(event) = events.recv().await {
        log_event(&event);
        count += 1;
    }
    count
}

/// Render an error followed by each of its sources.
pub(crate) fn error_chain(err: &WatchError) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod events_tests;
