// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Periodic reconciliation of routable services against their certificates.
//!
//! A single worker repeats the same cycle until it is told to stop:
//!
//! 1. List services matching the routable selector.
//! 2. On failure, emit one [`ReconcileEvent::Failure`] and go to sleep.
//! 3. On success, emit one [`ReconcileEvent::NeedsCertificate`] per service
//!    with missing certificates, in listing order.
//! 4. Sleep for the poll interval.
//!
//! Events are handed to the consumer one at a time; a slow consumer holds up
//! the worker. Every cycle is computed from scratch, so a service that still
//! has a gap is reported again on the next cycle.
//!
//! # Example
//!
//! ```rust,no_run
//! use router_acme::config::Config;
//! use router_acme::events::log_events;
//! use router_acme::lister::KubeServiceLister;
//! use router_acme::reconciler::CertificateGapReconciler;
//! use std::sync::Arc;
//! use tokio::sync::{mpsc, watch};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = kube::Client::try_default().await?;
//! let reconciler =
//!     CertificateGapReconciler::new(KubeServiceLister::new(client), Arc::new(Config::default()));
//!
//! let (events_tx, events_rx) = mpsc::channel(1);
//! let (_stop_tx, stop_rx) = watch::channel(false);
//!
//! tokio::spawn(reconciler.run(events_tx, stop_rx));
//! log_events(events_rx).await;
//! # Ok(())
//! # }
//! ```

use crate::config::Config;
use crate::domains::{malformed_certificate_entries, missing_domains};
use crate::errors::WatchError;
use crate::events::ReconcileEvent;
use crate::lister::ServiceLister;
use crate::metrics;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::{self, error::SendError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Drives the list, diff, sleep cycle for one [`ServiceLister`].
pub struct CertificateGapReconciler<L> {
    lister: L,
    config: Arc<Config>,
}

impl<L: ServiceLister> CertificateGapReconciler<L> {
    /// Create a reconciler that lists through `lister` using `config`.
    #[must_use]
    pub fn new(lister: L, config: Arc<Config>) -> Self {
        Self { lister, config }
    }

    /// Run one list and diff pass, sending its events to `events`.
    ///
    /// A listing failure is reported as an event, not returned.
    ///
    /// # Errors
    ///
    /// Returns the undelivered event if the consumer has gone away.
    pub async fn run_cycle(
        &self,
        events: &mpsc::Sender<ReconcileEvent>,
    ) -> Result<(), SendError<ReconcileEvent>> {
        let started = Instant::now();
        let selector = &self.config.routable_service_selector;

        debug!(selector = %selector, "Listing routable services");
        let services = match self.lister.list_services(selector).await {
            Ok(services) => services,
            Err(source) => {
                metrics::record_cycle_error(started.elapsed());
                let err = WatchError::ListFailed {
                    selector: selector.clone(),
                    source,
                };
                return events.send(ReconcileEvent::Failure(err)).await;
            }
        };

        let checked = services.len();
        let mut needing_certificates = 0;
        let mut missing_total = 0;

        for service in services {
            let malformed = malformed_certificate_entries(&service, &self.config);
            if malformed > 0 {
                warn!(
                    service = %service,
                    malformed,
                    annotation = %self.config.certificates_annotation,
                    "Skipped malformed certificate annotation entries"
                );
                metrics::record_malformed_certificate_entries(malformed);
            }

            let missing = missing_domains(&service, &self.config);
            if missing.is_empty() {
                continue;
            }

            needing_certificates += 1;
            missing_total += missing.len();
            events
                .send(ReconcileEvent::NeedsCertificate {
                    service,
                    missing_domains: missing,
                })
                .await?;
        }

        debug!(
            services = checked,
            needing_certificates,
            missing_domains = missing_total,
            "Reconciliation cycle complete"
        );
        metrics::record_cycle_success(
            started.elapsed(),
            checked,
            needing_certificates,
            missing_total,
        );

        Ok(())
    }

    /// Repeat [`run_cycle`](Self::run_cycle) every poll interval until
    /// stopped.
    ///
    /// The loop ends when `shutdown` becomes `true` or its sender is dropped
    /// (checked before each cycle and during the sleep), or when the event
    /// consumer goes away. A cycle that has started always finishes emitting.
    pub async fn run(
        self,
        events: mpsc::Sender<ReconcileEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!(
            selector = %self.config.routable_service_selector,
            interval_secs = self.config.poll_interval.as_secs(),
            "Starting certificate reconciliation loop"
        );

        loop {
            let stopping = *shutdown.borrow_and_update();
            if stopping {
                break;
            }

            if self.run_cycle(&events).await.is_err() {
                warn!("Event consumer closed, stopping reconciliation loop");
                return;
            }

            tokio::select! {
                () = tokio::time::sleep(self.config.poll_interval) => {}
                () = wait_for_stop(&mut shutdown) => break,
            }
        }

        info!("Certificate reconciliation loop stopped");
    }
}

/// Resolve once `shutdown` is `true` or its sender is gone.
///
/// Changes that leave the value `false` keep waiting.
async fn wait_for_stop(shutdown: &mut watch::Receiver<bool>) {
    loop {
        let stopping = *shutdown.borrow_and_update();
        if stopping || shutdown.changed().await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod reconciler_tests;
