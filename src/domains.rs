// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Domain and certificate gap detection for router services.
//!
//! The Deis router reads two annotations on every routable service:
//!
//! - the domains annotation, a comma-delimited list of domains. Entries
//!   containing a `.` are fully qualified; anything else is a subdomain of the
//!   platform domain.
//! - the certificates annotation, a comma-delimited list of
//!   `domain:certificate` pairs naming the TLS secret for each domain.
//!
//! Every function here is pure. Malformed annotation data never fails: it
//! degrades to "no domains" or "no certificate", which at worst reports a
//! domain as missing.
//!
//! # Example
//!
//! ```rust
//! use router_acme::config::Config;
//! use router_acme::domains::missing_domains;
//! use router_acme::service::ServiceRecord;
//!
//! let config = Config::default().with_platform_domain("example.com");
//! let service = ServiceRecord::new("web")
//!     .with_annotation("router.deis.io/domains", "www,api.example.org")
//!     .with_annotation("router.deis.io/certificates", "www.example.com:www-cert");
//!
//! assert_eq!(missing_domains(&service, &config), vec!["api.example.org"]);
//! ```

use crate::config::Config;
use crate::constants::{ANNOTATION_LIST_SEPARATOR, CERTIFICATE_ENTRY_SEPARATOR};
use crate::service::ServiceRecord;
use std::collections::HashMap;

/// Domain name to certificate reference.
pub type CertificateMap = HashMap<String, String>;

/// Domains that should be routed to the service, in annotation order.
///
/// Tokens containing a `.` are kept as-is. Bare tokens are qualified with the
/// platform domain, or dropped when no platform domain is configured. An
/// absent or empty annotation yields no domains, and empty tokens are skipped.
/// Duplicates are preserved.
#[must_use]
pub fn resolve_domains(service: &ServiceRecord, config: &Config) -> Vec<String> {
    let Some(list) = service.annotation(&config.domains_annotation) else {
        return Vec::new();
    };

    list.split(ANNOTATION_LIST_SEPARATOR)
        .filter(|token| !token.is_empty())
        .filter_map(|token| qualify_domain(token, &config.platform_domain))
        .collect()
}

fn qualify_domain(token: &str, platform_domain: &str) -> Option<String> {
    if token.contains('.') {
        Some(token.to_string())
    } else if platform_domain.is_empty() {
        None
    } else {
        Some(format!("{token}.{platform_domain}"))
    }
}

/// Certificates already assigned to the service's domains.
///
/// Only entries with exactly two non-empty `domain:certificate` segments are
/// used; anything else is skipped. A domain listed twice keeps its last
/// certificate.
#[must_use]
pub fn resolve_certificate_map(service: &ServiceRecord, config: &Config) -> CertificateMap {
    parse_certificates(service, config).0
}

/// Number of certificates annotation entries that were skipped as malformed.
///
/// Empty entries (for example a trailing comma) are not counted.
#[must_use]
pub fn malformed_certificate_entries(service: &ServiceRecord, config: &Config) -> usize {
    parse_certificates(service, config).1
}

fn parse_certificates(service: &ServiceRecord, config: &Config) -> (CertificateMap, usize) {
    let mut certificates = CertificateMap::new();
    let mut malformed = 0;

    let Some(list) = service.annotation(&config.certificates_annotation) else {
        return (certificates, malformed);
    };

    for entry in list.split(ANNOTATION_LIST_SEPARATOR) {
        if entry.is_empty() {
            continue;
        }

        match parse_certificate_entry(entry) {
            Some((domain, certificate)) => {
                certificates.insert(domain.to_string(), certificate.to_string());
            }
            None => malformed += 1,
        }
    }

    (certificates, malformed)
}

fn parse_certificate_entry(entry: &str) -> Option<(&str, &str)> {
    let mut parts = entry.split(CERTIFICATE_ENTRY_SEPARATOR);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(domain), Some(certificate), None)
            if !domain.is_empty() && !certificate.is_empty() =>
        {
            Some((domain, certificate))
        }
        _ => None,
    }
}

/// Domains routed to the service that have no certificate, in domain order.
///
/// A domain repeated in the domains annotation appears once per occurrence.
#[must_use]
pub fn missing_domains(service: &ServiceRecord, config: &Config) -> Vec<String> {
    let certificates = resolve_certificate_map(service, config);

    resolve_domains(service, config)
        .into_iter()
        .filter(|domain| !certificates.contains_key(domain))
        .collect()
}

/// Whether any routed domain of the service lacks a certificate.
#[must_use]
pub fn needs_certificate(service: &ServiceRecord, config: &Config) -> bool {
    !missing_domains(service, config).is_empty()
}

#[cfg(test)]
#[path = "domains_tests.rs"]
mod domains_tests;
