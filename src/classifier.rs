//! Query classification.
//!
//! The metering pipeline only ever sends a handful of PromQL shapes, so the
//! classifier matches them loosely with substrings and two regular
//! expressions instead of parsing PromQL.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{ProductTag, QueryIntent, PRODUCTS};

lazy_static! {
    static ref SYNC_SHAPE: Regex =
        Regex::new(r"^group.+subscription_labels.+organization\)$").unwrap();
    static ref MARKETPLACE_ORG: Regex =
        Regex::new(r#"external_organization=["']([^"']+)["'],.+marketplace"#).unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub product: Option<ProductTag>,
    pub intent: QueryIntent,
}

/// Returns the product referenced by the query.
///
/// A product matches when its key or its tag occurs anywhere in the query.
/// When several match, the last one in `PRODUCTS` order wins.
pub fn find_product(query: &str) -> Option<ProductTag> {
    PRODUCTS
        .iter()
        .filter(|product| query.contains(product.key) || query.contains(product.tag))
        .last()
        .copied()
}

/// `group(... subscription_labels ...) by (external_organization)`
pub fn is_sync_shape(query: &str) -> bool {
    SYNC_SHAPE.is_match(query)
}

pub fn mentions_support(query: &str) -> bool {
    query.contains("support")
}

pub fn classify(query: &str) -> Classification {
    let product = find_product(query);

    let intent = match product {
        Some(_) if is_sync_shape(query) => QueryIntent::SyncEnumeration,
        Some(_) if mentions_support(query) => QueryIntent::ServiceTimeseries,
        _ => QueryIntent::Unrecognized,
    };

    Classification { product, intent }
}

/// Pulls the organization id out of an
/// `external_organization="<id>", ... marketplace` clause.
pub fn extract_organization(query: &str) -> Option<&str> {
    MARKETPLACE_ORG
        .captures(query)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYNC_QUERY: &str = r#"group(min_over_time(subscription_labels{product="ocp", billing_model="marketplace"}[1h])) by (external_organization)"#;
    const SERVICE_QUERY: &str = r#"max(over_time(kafka_id:haproxy_server_bytes_in_total:rate1h_gibibytes[1h])) * on(_id) group_right min_over_time(ocm_subscription{product="rhosak", external_organization="org-9", billing_model="marketplace", support=~"Premium|Standard|Basic|None"}[1h])"#;

    #[test]
    fn test_sync_enumeration() {
        let c = classify(SYNC_QUERY);
        assert_eq!(c.intent, QueryIntent::SyncEnumeration);
        assert_eq!(c.product.map(|p| p.key), Some("ocp"));
    }

    #[test]
    fn test_service_timeseries() {
        let c = classify(SERVICE_QUERY);
        assert_eq!(c.intent, QueryIntent::ServiceTimeseries);
        assert_eq!(c.product.map(|p| p.key), Some("rhosak"));
    }

    #[test]
    fn test_sync_shape_takes_precedence_over_support() {
        let query = r#"group(subscription_labels{product="rhacs", support="Premium"}) by (external_organization)"#;
        assert_eq!(classify(query).intent, QueryIntent::SyncEnumeration);
    }

    #[test]
    fn test_unknown_product_is_unrecognized() {
        let query = r#"group(subscription_labels{product="rhel"}) by (external_organization)"#;
        let c = classify(query);
        assert_eq!(c.product, None);
        assert_eq!(c.intent, QueryIntent::Unrecognized);

        assert_eq!(
            classify(r#"up{support="Premium"}"#).intent,
            QueryIntent::Unrecognized
        );
    }

    #[test]
    fn test_product_without_known_shape_is_unrecognized() {
        let c = classify(r#"sum(rate(ocm_subscription{product="osd"}[5m]))"#);
        assert_eq!(c.product.map(|p| p.key), Some("osd"));
        assert_eq!(c.intent, QueryIntent::Unrecognized);
    }

    #[test]
    fn test_empty_query() {
        let c = classify("");
        assert_eq!(c.product, None);
        assert_eq!(c.intent, QueryIntent::Unrecognized);
    }

    #[test]
    fn test_last_product_match_wins() {
        assert_eq!(
            find_product(r#"product=~"rhacs|ocp""#).map(|p| p.key),
            Some("rhacs")
        );
        assert_eq!(
            find_product(r#"product=~"osd|ocp|rhosak""#).map(|p| p.key),
            Some("rhosak")
        );
    }

    #[test]
    fn test_product_matches_on_tag() {
        assert_eq!(
            find_product(r#"product="OpenShift-metrics""#).map(|p| p.key),
            Some("ocp")
        );
        assert_eq!(
            find_product(r#"product="OpenShift-dedicated-metrics""#).map(|p| p.key),
            Some("osd")
        );
    }

    #[test]
    fn test_sync_shape_requires_anchors() {
        assert!(is_sync_shape(SYNC_QUERY));
        assert!(!is_sync_shape(&format!(" {}", SYNC_QUERY)));
        assert!(!is_sync_shape(
            r#"group(subscription_labels{product="ocp"}) by (external_organization) > 0"#
        ));
        assert!(!is_sync_shape("group by (organization)"));
    }

    #[test]
    fn test_grouping_must_close_the_query() {
        // `group by (...)` written before the selector does not end in
        // `organization)`, so it is not a sync query even with a product.
        let query = r#"group by (organization) (subscription_labels{product="OpenShift-metrics"})"#;
        assert!(!is_sync_shape(query));

        let c = classify(query);
        assert_eq!(c.product.map(|p| p.key), Some("ocp"));
        assert_eq!(c.intent, QueryIntent::Unrecognized);
    }

    #[test]
    fn test_extract_organization() {
        assert_eq!(extract_organization(SERVICE_QUERY), Some("org-9"));
        assert_eq!(
            extract_organization(
                "ocm_subscription{external_organization='12345', billing_model='marketplace'}"
            ),
            Some("12345")
        );
    }

    #[test]
    fn test_extract_organization_requires_marketplace_clause() {
        assert_eq!(
            extract_organization(r#"ocm_subscription{external_organization="org-9", support="Premium"}"#),
            None
        );
        assert_eq!(extract_organization(r#"ocm_subscription{billing_model="marketplace"}"#), None);
        assert_eq!(extract_organization(""), None);
    }
}
