//! Synthetic time series generation.

use parking_lot::Mutex;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::BTreeMap;
use uuid::Builder;

use crate::models::{ProductTag, TimeSeriesEntry, TimeSeriesSample};

const SUPPORT_TIER: &str = "Premium";
const BILLING_MODEL: &str = "marketplace";
const BILLING_PROVIDER: &str = "aws";

/// Builds the matrix entries returned to the metering pipeline.
///
/// Ids and sample values are drawn from an owned RNG so a seeded
/// synthesizer produces the same batches on every run.
pub struct Synthesizer {
    rng: Mutex<StdRng>,
}

impl Synthesizer {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::with_seed(seed),
            None => Self::new(),
        }
    }

    /// One presence marker per organization, used to kick off metering sync.
    pub fn sync_batch(&self, org_ids: &[String], start: &str) -> Vec<TimeSeriesEntry> {
        org_ids
            .iter()
            .map(|org_id| TimeSeriesEntry {
                metric: BTreeMap::from([("external_organization".to_string(), org_id.clone())]),
                values: vec![TimeSeriesSample(start.to_string(), 1)],
            })
            .collect()
    }

    /// A single synthetic system belonging to `org_id`.
    pub fn timeseries_entry(
        &self,
        account_id: &str,
        org_id: &str,
        product: &ProductTag,
        start: &str,
    ) -> TimeSeriesEntry {
        let (id, value) = {
            let mut rng = self.rng.lock();
            let id = Builder::from_random_bytes(rng.gen()).into_uuid();
            (id, rng.gen_range(1..=100))
        };

        let metric = BTreeMap::from([
            ("_id".to_string(), id.to_string()),
            ("billing_marketplace_account".to_string(), format!("mktp-{}", org_id)),
            ("billing_model".to_string(), BILLING_MODEL.to_string()),
            ("billing_provider".to_string(), BILLING_PROVIDER.to_string()),
            ("ebs_account".to_string(), account_id.to_string()),
            ("external_organization".to_string(), org_id.to_string()),
            ("product".to_string(), product.key.to_string()),
            ("support".to_string(), SUPPORT_TIER.to_string()),
        ]);

        TimeSeriesEntry {
            metric,
            values: vec![TimeSeriesSample(start.to_string(), value)],
        }
    }

    /// A fleet of `count` systems for one organization.
    pub fn timeseries_batch(
        &self,
        count: usize,
        account_id: &str,
        org_id: &str,
        product: &ProductTag,
        start: &str,
    ) -> Vec<TimeSeriesEntry> {
        (0..count)
            .map(|_| self.timeseries_entry(account_id, org_id, product, start))
            .collect()
    }
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PRODUCTS;
    use std::collections::HashSet;

    const START: &str = "2024-01-01T00:00:00Z";

    #[test]
    fn test_sync_batch() {
        let synth = Synthesizer::with_seed(1);
        let orgs = vec!["org-1".to_string(), "org-2".to_string()];
        let batch = synth.sync_batch(&orgs, START);

        assert_eq!(batch.len(), 2);
        for (entry, org) in batch.iter().zip(&orgs) {
            assert_eq!(entry.metric.len(), 1);
            assert_eq!(entry.label("external_organization"), Some(org.as_str()));
            assert_eq!(entry.values, vec![TimeSeriesSample(START.to_string(), 1)]);
        }

        assert!(synth.sync_batch(&[], START).is_empty());
    }

    #[test]
    fn test_timeseries_entry_labels() {
        let synth = Synthesizer::with_seed(7);
        let rhosak = PRODUCTS[2];
        let entry = synth.timeseries_entry("acct-9", "org-9", &rhosak, START);

        assert_eq!(entry.label("billing_marketplace_account"), Some("mktp-org-9"));
        assert_eq!(entry.label("billing_model"), Some("marketplace"));
        assert_eq!(entry.label("billing_provider"), Some("aws"));
        assert_eq!(entry.label("ebs_account"), Some("acct-9"));
        assert_eq!(entry.label("external_organization"), Some("org-9"));
        assert_eq!(entry.label("product"), Some("rhosak"));
        assert_eq!(entry.label("support"), Some("Premium"));
        assert!(entry
            .label("_id")
            .and_then(|id| uuid::Uuid::parse_str(id).ok())
            .is_some());

        assert_eq!(entry.values.len(), 1);
        assert_eq!(entry.values[0].0, START);
        assert!((1..=100).contains(&entry.values[0].1));
    }

    #[test]
    fn test_batch_has_distinct_ids_and_bounded_values() {
        let synth = Synthesizer::new();
        let batch = synth.timeseries_batch(200, "acct", "org", &PRODUCTS[0], START);

        assert_eq!(batch.len(), 200);
        let ids: HashSet<_> = batch.iter().filter_map(|e| e.label("_id")).collect();
        assert_eq!(ids.len(), 200);
        assert!(batch.iter().all(|e| (1..=100).contains(&e.values[0].1)));
    }

    #[test]
    fn test_seeded_synthesis_is_reproducible() {
        let a = Synthesizer::with_seed(42).timeseries_batch(5, "acct", "org", &PRODUCTS[3], START);
        let b = Synthesizer::with_seed(42).timeseries_batch(5, "acct", "org", &PRODUCTS[3], START);
        let c = Synthesizer::with_seed(43).timeseries_batch(5, "acct", "org", &PRODUCTS[3], START);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_zero_systems() {
        let synth = Synthesizer::with_seed(0);
        assert!(synth.timeseries_batch(0, "acct", "org", &PRODUCTS[0], START).is_empty());
    }
}
