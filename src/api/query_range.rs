//! `/api/v1/query_range` for the metering pipeline.
//!
//! Every request gets a 200 and a matrix envelope. Queries the mock does not
//! understand, or that resolve to nothing, get an empty result.

use axum::{
    extract::{Query, State},
    Json,
};
use tracing::{info, warn};

use super::AppState;
use crate::{
    cache::CacheOutcome,
    classifier::{self, Classification},
    metrics,
    models::{ProductTag, QueryIntent, QueryRangeParams, QueryRangeResponse, TimeSeriesEntry},
};

pub async fn query_range(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Json<QueryRangeResponse> {
    let params = QueryRangeParams::from_pairs(pairs);
    let query = params.query.unwrap_or_default();
    let start = params.start.unwrap_or_default();

    let result = execute(&state, &query, &start).await;
    Json(QueryRangeResponse::success(result))
}

/// Classifies `query` and produces the series the pipeline should see.
pub async fn execute(state: &AppState, query: &str, start: &str) -> Vec<TimeSeriesEntry> {
    let Classification { product, intent } = classifier::classify(query);
    metrics::record_intent(intent.as_str());

    match (intent, product) {
        (QueryIntent::SyncEnumeration, Some(product)) => {
            info!(product = product.key, metric = product.metric, "Metering sync query");
            sync_enumeration(state, start).await
        }
        (QueryIntent::ServiceTimeseries, Some(product)) => {
            info!(product = product.key, metric = product.metric, "Metering service query");
            service_timeseries(state, query, &product, start).await
        }
        _ => {
            info!("Unrecognized query, returning empty result");
            Vec::new()
        }
    }
}

async fn sync_enumeration(state: &AppState, start: &str) -> Vec<TimeSeriesEntry> {
    let org_ids = state.directory.list_organizations().await;
    state.synthesizer.sync_batch(&org_ids, start)
}

async fn service_timeseries(
    state: &AppState,
    query: &str,
    product: &ProductTag,
    start: &str,
) -> Vec<TimeSeriesEntry> {
    info!("HTTP request for total host events - {}", state.systems_per_org);

    let Some(org_id) = classifier::extract_organization(query) else {
        warn!("No marketplace external_organization clause in query, returning empty result");
        return Vec::new();
    };

    let account_ids = state.directory.resolve_accounts(org_id).await;
    let Some(account_id) = account_ids.last() else {
        return Vec::new();
    };

    let (batch, outcome) = state.cache.get_or_replace_with(org_id, || {
        state.synthesizer.timeseries_batch(
            state.systems_per_org,
            account_id,
            org_id,
            product,
            start,
        )
    });

    match outcome {
        CacheOutcome::Miss => {
            info!("Data does not exist for {} in the system memory", org_id);
            metrics::record_cache_miss();
            metrics::record_synthesized(batch.len());
        }
        CacheOutcome::Hit => {
            info!(
                "Data exists for {} in the system memory, useful for re-metering operation",
                org_id
            );
            metrics::record_cache_hit();
        }
    }

    batch
}
