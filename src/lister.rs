// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Service discovery against the Kubernetes API.
//!
//! The reconciliation loop only needs one capability: list the services that
//! match a label selector. [`ServiceLister`] is that seam, and
//! [`KubeServiceLister`] implements it with a paginated, time-bounded list of
//! `v1/Service` across all namespaces.

use crate::constants::{DEFAULT_LIST_TIMEOUT_SECS, KUBE_LIST_PAGE_SIZE};
use crate::errors::ListError;
use crate::service::ServiceRecord;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Service;
use kube::{api::ListParams, Api, Client, Resource};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::time::Duration;
use tracing::debug;

/// Lists services matching a label selector.
///
/// An empty selector means "all services".
#[async_trait]
pub trait ServiceLister: Send + Sync {
    /// List services matching `selector`, in API order.
    ///
    /// # Errors
    ///
    /// Returns a [`ListError`] describing a transport, decode, status or
    /// timeout failure.
    async fn list_services(&self, selector: &str) -> Result<Vec<ServiceRecord>, ListError>;
}

/// [`ServiceLister`] backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeServiceLister {
    api: Api<Service>,
    timeout: Duration,
}

impl KubeServiceLister {
    /// Create a lister that watches services in every namespace.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            api: Api::all(client),
            timeout: Duration::from_secs(DEFAULT_LIST_TIMEOUT_SECS),
        }
    }

    /// Override the upper bound on a single listing.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl ServiceLister for KubeServiceLister {
    async fn list_services(&self, selector: &str) -> Result<Vec<ServiceRecord>, ListError> {
        let mut list_params = ListParams::default();
        if !selector.is_empty() {
            list_params = list_params.labels(selector);
        }

        let services = tokio::time::timeout(
            self.timeout,
            list_all_paginated(&self.api, list_params),
        )
        .await
        .map_err(|_| ListError::Timeout {
            timeout: self.timeout,
        })??;

        Ok(services.iter().map(ServiceRecord::from).collect())
    }
}

/// List all resources with automatic pagination.
///
/// Fetches resources in pages of [`KUBE_LIST_PAGE_SIZE`] to reduce memory
/// usage and API server load, following continue tokens until the list is
/// exhausted.
///
/// # Errors
///
/// Returns the first Kubernetes API error encountered.
async fn list_all_paginated<K>(
    api: &Api<K>,
    mut list_params: ListParams,
) -> Result<Vec<K>, kube::Error>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug,
{
    list_params.limit = Some(KUBE_LIST_PAGE_SIZE);

    let mut all_items = Vec::new();
    let mut page_count = 0;

    loop {
        page_count += 1;
        let result = api.list(&list_params).await?;

        let item_count = result.items.len();
        all_items.extend(result.items);

        debug!(
            page = page_count,
            items_in_page = item_count,
            total_items = all_items.len(),
            "Fetched page from Kubernetes API"
        );

        match result.metadata.continue_ {
            Some(token) if !token.is_empty() => list_params.continue_token = Some(token),
            _ => break,
        }
    }

    debug!(
        total_pages = page_count,
        total_items = all_items.len(),
        "Completed paginated list operation"
    );

    Ok(all_items)
}

#[cfg(test)]
#[path = "lister_tests.rs"]
mod lister_tests;
