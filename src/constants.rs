// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the router certificate watcher.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Deis Router Annotation Constants
// ============================================================================

/// Default label selector for services the Deis router exposes
pub const DEFAULT_ROUTABLE_SERVICE_SELECTOR: &str = "router.deis.io/routable=true";

/// Default platform domain (empty means bare subdomains are ignored)
pub const DEFAULT_PLATFORM_DOMAIN: &str = "";

/// Default annotation holding `domain:certificate` mappings
pub const DEFAULT_CERTIFICATES_ANNOTATION: &str = "router.deis.io/certificates";

/// Default annotation holding the comma-delimited list of routed domains
pub const DEFAULT_DOMAINS_ANNOTATION: &str = "router.deis.io/domains";

/// Separator between entries in the domains and certificates annotations
pub const ANNOTATION_LIST_SEPARATOR: char = ',';

/// Separator between the domain and certificate name in a certificates entry
pub const CERTIFICATE_ENTRY_SEPARATOR: char = ':';

// ============================================================================
// Reconciliation Timing Constants
// ============================================================================

/// Default interval between reconciliation cycles (30 seconds)
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// Default upper bound on a single service listing (10 seconds)
pub const DEFAULT_LIST_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Kubernetes API Constants
// ============================================================================

/// Page size for Kubernetes API list operations
pub const KUBE_LIST_PAGE_SIZE: u32 = 100;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 2;

/// Capacity of the event channel between the reconciler and its consumer.
///
/// Tokio channels cannot be zero-sized, so one slot is the closest thing to a
/// rendezvous: the producer waits as soon as one event is outstanding.
pub const EVENT_CHANNEL_CAPACITY: usize = 1;

// ============================================================================
// Metrics Server Constants
// ============================================================================

/// Default bind address for the Prometheus metrics HTTP server
pub const DEFAULT_METRICS_ADDRESS: &str = "0.0.0.0:8080";

/// Path for Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";
