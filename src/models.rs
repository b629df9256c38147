use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type OrganizationId = String;
pub type AccountId = String;

/// A billed product family the metering pipeline queries for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductTag {
    /// Value of the `product` label the pipeline filters on.
    pub key: &'static str,
    pub tag: &'static str,
    pub metric: &'static str,
}

/// Known products, in matching order.
pub const PRODUCTS: [ProductTag; 4] = [
    ProductTag {
        key: "ocp",
        tag: "OpenShift-metrics",
        metric: "cluster:usage:workload:capacity_physical_cpu_hours",
    },
    ProductTag {
        key: "osd",
        tag: "OpenShift-dedicated-metrics",
        metric: "cluster:usage:workload:capacity_physical_cpu_hours",
    },
    ProductTag {
        key: "rhosak",
        tag: "rhosak",
        metric: "kafka_id:kafka_broker_quota_totalstorageusedbytes:max_over_time1h_gibibyte_months",
    },
    ProductTag {
        key: "rhacs",
        tag: "rhacs",
        metric: "rhacs:rox_central_cluster_metrics_cpu_capacity:avg_over_time1h",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryIntent {
    SyncEnumeration,
    ServiceTimeseries,
    Unrecognized,
}

impl QueryIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryIntent::SyncEnumeration => "sync_enumeration",
            QueryIntent::ServiceTimeseries => "service_timeseries",
            QueryIntent::Unrecognized => "unrecognized",
        }
    }
}

/// A `[timestamp, value]` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeriesSample(pub String, pub u32);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeriesEntry {
    pub metric: BTreeMap<String, String>,
    pub values: Vec<TimeSeriesSample>,
}

impl TimeSeriesEntry {
    pub fn label(&self, name: &str) -> Option<&str> {
        self.metric.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixData {
    #[serde(rename = "resultType")]
    pub result_type: String,
    pub result: Vec<TimeSeriesEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRangeResponse {
    pub status: String,
    pub data: MatrixData,
}

impl QueryRangeResponse {
    pub fn success(result: Vec<TimeSeriesEntry>) -> Self {
        Self {
            status: "success".to_string(),
            data: MatrixData {
                result_type: "matrix".to_string(),
                result,
            },
        }
    }

    pub fn empty() -> Self {
        Self::success(Vec::new())
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct QueryRangeParams {
    pub query: Option<String>,
    pub start: Option<String>,
}

impl QueryRangeParams {
    /// Picks `query` and `start` out of raw query-string pairs. Repeated keys
    /// keep their first value; unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "query" if params.query.is_none() => params.query = Some(value),
                "start" if params.start.is_none() => params.start = Some(value),
                _ => {}
            }
        }
        params
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub message: String,
    pub endpoint: String,
    pub timestamp: String,
}
