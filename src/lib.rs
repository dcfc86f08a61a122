// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # Router ACME - TLS certificate gap detection for the Deis router
//!
//! The Deis router routes traffic to services labelled as routable, using two
//! annotations on each service: a list of domains and a list of
//! `domain:certificate` pairs. This crate periodically lists those services
//! and reports every domain that is routed but has no certificate.
//!
//! It only detects gaps. Obtaining and installing certificates is left to
//! whatever consumes the events.
//!
//! ## Modules
//!
//! - [`config`] - Immutable runtime configuration and its CLI/env surface
//! - [`domains`] - Pure domain and certificate gap computation
//! - [`service`] - Service records read from the Kubernetes API
//! - [`lister`] - Service discovery capability and its Kubernetes implementation
//! - [`reconciler`] - The periodic list, diff, sleep loop
//! - [`events`] - Events emitted by the loop and the logging sink
//! - [`errors`] - Listing and loop error types
//! - [`metrics`] - Prometheus metrics
//!
//! ## Example
//!
//! ```rust
//! use router_acme::config::Config;
//! use router_acme::domains::{missing_domains, needs_certificate};
//! use router_acme::service::ServiceRecord;
//!
//! let config = Config::default().with_platform_domain("example.com");
//! let service = ServiceRecord::new("web")
//!     .with_annotation("router.deis.io/domains", "www,shop")
//!     .with_annotation("router.deis.io/certificates", "www.example.com:www-tls");
//!
//! assert!(needs_certificate(&service, &config));
//! assert_eq!(missing_domains(&service, &config), vec!["shop.example.com"]);
//! ```

pub mod config;
pub mod constants;
pub mod domains;
pub mod errors;
pub mod events;
pub mod lister;
pub mod metrics;
pub mod reconciler;
pub mod service;
