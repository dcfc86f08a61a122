// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Service records as seen by the certificate gap check.
//!
//! A [`ServiceRecord`] is a read-only snapshot of the parts of a Kubernetes
//! `Service` that matter here: its identity and its annotations. Records are
//! built fresh from every listing and dropped after one reconciliation pass.

use k8s_openapi::api::core::v1::Service;
use kube::ResourceExt;
use std::collections::BTreeMap;
use std::fmt;

/// One load-balanced application endpoint and its annotations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceRecord {
    /// Service name, used for diagnostics
    pub name: String,

    /// Namespace the service lives in, if any
    pub namespace: Option<String>,

    /// Annotation key to value mapping
    pub annotations: BTreeMap<String, String>,
}

impl ServiceRecord {
    /// Create a record with no namespace and no annotations.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder-style helper for setting the namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Builder-style helper for adding an annotation.
    #[must_use]
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    /// Look up an annotation value by key.
    #[must_use]
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }
}

impl fmt::Display for ServiceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{namespace}/{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl From<&Service> for ServiceRecord {
    fn from(service: &Service) -> Self {
        Self {
            name: service.name_any(),
            namespace: service.namespace(),
            annotations: service.annotations().clone(),
        }
    }
}

impl From<Service> for ServiceRecord {
    fn from(service: Service) -> Self {
        Self::from(&service)
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod service_tests;
