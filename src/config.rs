// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Runtime configuration for the certificate watcher.
//!
//! [`Config`] is an immutable value built once at startup and shared by
//! reference with every reconciliation pass. [`ConfigArgs`] is the clap
//! argument group that resolves command-line flags and environment variables
//! into a [`Config`].
//!
//! # Example
//!
//! ```rust
//! use router_acme::config::Config;
//!
//! let config = Config::default().with_platform_domain("example.com");
//! assert_eq!(config.routable_service_selector, "router.deis.io/routable=true");
//! assert_eq!(config.platform_domain, "example.com");
//! ```

use crate::constants::{
    DEFAULT_CERTIFICATES_ANNOTATION, DEFAULT_DOMAINS_ANNOTATION, DEFAULT_PLATFORM_DOMAIN,
    DEFAULT_POLL_INTERVAL_SECS, DEFAULT_ROUTABLE_SERVICE_SELECTOR,
};
use clap::Args;
use std::time::Duration;

/// Resolved settings consumed by the diff engine and the reconciliation loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Label selector used to find candidate services. Empty selects all services.
    pub routable_service_selector: String,

    /// The router's platform domain. Domains without a `.` are treated as
    /// subdomains of it.
    pub platform_domain: String,

    /// Annotation key holding `domain:certificate` pairs.
    pub certificates_annotation: String,

    /// Annotation key holding the comma-delimited list of routed domains.
    pub domains_annotation: String,

    /// Sleep between reconciliation cycles.
    pub poll_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            routable_service_selector: DEFAULT_ROUTABLE_SERVICE_SELECTOR.to_string(),
            platform_domain: DEFAULT_PLATFORM_DOMAIN.to_string(),
            certificates_annotation: DEFAULT_CERTIFICATES_ANNOTATION.to_string(),
            domains_annotation: DEFAULT_DOMAINS_ANNOTATION.to_string(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        }
    }
}

impl Config {
    #[must_use]
    pub fn with_routable_service_selector(mut self, selector: impl Into<String>) -> Self {
        self.routable_service_selector = selector.into();
        self
    }

    #[must_use]
    pub fn with_platform_domain(mut self, domain: impl Into<String>) -> Self {
        self.platform_domain = domain.into();
        self
    }

    #[must_use]
    pub fn with_certificates_annotation(mut self, key: impl Into<String>) -> Self {
        self.certificates_annotation = key.into();
        self
    }

    #[must_use]
    pub fn with_domains_annotation(mut self, key: impl Into<String>) -> Self {
        self.domains_annotation = key.into();
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Command-line and environment settings for the watcher.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Label selector for discovering services that should have certificates
    #[arg(
        long,
        env = "ROUTABLE_SERVICE_SELECTOR",
        default_value = DEFAULT_ROUTABLE_SERVICE_SELECTOR
    )]
    pub routable_service_selector: String,

    /// Platform domain used to qualify bare subdomains
    #[arg(long, env = "PLATFORM_DOMAIN", default_value_t)]
    pub platform_domain: String,

    /// Annotation containing `domain:certificate` mappings
    #[arg(
        long,
        env = "CERTIFICATES_ANNOTATION",
        default_value = DEFAULT_CERTIFICATES_ANNOTATION
    )]
    pub certificates_annotation: String,

    /// Annotation containing the comma-delimited list of routed domains
    #[arg(
        long,
        env = "DOMAINS_ANNOTATION",
        default_value = DEFAULT_DOMAINS_ANNOTATION
    )]
    pub domains_annotation: String,

    /// Seconds to sleep between reconciliation cycles
    #[arg(
        long,
        env = "POLL_INTERVAL_SECS",
        default_value_t = DEFAULT_POLL_INTERVAL_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub poll_interval_secs: u64,
}

impl From<ConfigArgs> for Config {
    fn from(args: ConfigArgs) -> Self {
        Self {
            routable_service_selector: args.routable_service_selector,
            platform_domain: args.platform_domain,
            certificates_annotation: non_empty_or(
                args.certificates_annotation,
                DEFAULT_CERTIFICATES_ANNOTATION,
            ),
            domains_annotation: non_empty_or(args.domains_annotation, DEFAULT_DOMAINS_ANNOTATION),
            poll_interval: Duration::from_secs(args.poll_interval_secs),
        }
    }
}

fn non_empty_or(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
