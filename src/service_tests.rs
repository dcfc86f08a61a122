// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `service.rs`

#[cfg(test)]
mod tests {
    use crate::service::ServiceRecord;
    use k8s_openapi::api::core::v1::Service;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use std::collections::BTreeMap;

    #[test]
    fn test_from_kubernetes_service() {
        let mut annotations = BTreeMap::new();
        annotations.insert(
            "router.deis.io/domains".to_string(),
            "www.example.com".to_string(),
        );

        let service = Service {
            metadata: ObjectMeta {
                name: Some("web".to_string()),
                namespace: Some("apps".to_string()),
                annotations: Some(annotations),
                ..Default::default()
            },
            ..Default::default()
        };

        let record = ServiceRecord::from(&service);
        assert_eq!(record.name, "web");
        assert_eq!(record.namespace.as_deref(), Some("apps"));
        assert_eq!(
            record.annotation("router.deis.io/domains"),
            Some("www.example.com")
        );
    }

    #[test]
    fn test_from_service_without_annotations() {
        let service = Service {
            metadata: ObjectMeta {
                name: Some("bare".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        let record = ServiceRecord::from(service);
        assert_eq!(record.name, "bare");
        assert!(record.namespace.is_none());
        assert!(record.annotations.is_empty());
    }

    #[test]
    fn test_display_includes_namespace() {
        let record = ServiceRecord::new("web").with_namespace("apps");
        assert_eq!(record.to_string(), "apps/web");

        let record = ServiceRecord::new("web");
        assert_eq!(record.to_string(), "web");
    }

    #[test]
    fn test_missing_annotation_is_none() {
        let record = ServiceRecord::new("web").with_annotation("a", "b");
        assert_eq!(record.annotation("a"), Some("b"));
        assert_eq!(record.annotation("missing"), None);
    }
}
