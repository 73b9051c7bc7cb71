//! Reconciles a batch response with the batch that was submitted.
//!
//! The submitted list is authoritative: every submitted index lands in exactly
//! one bucket, buckets are ordered by submitted index, and indices the backend
//! reports outside the batch are dropped.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::types::ApiResponse;

/// Error attached to submitted items the backend said nothing about.
pub const NO_RESULT_REPORTED: &str = "no result reported";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSuccess<T> {
    pub index: usize,
    pub outcome: Value,
    pub order: T,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFailure<T> {
    pub index: usize,
    pub error: String,
    pub order: T,
}

/// Uniform summary of a batch submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult<T> {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub results: Vec<BatchSuccess<T>>,
    pub errors: Vec<BatchFailure<T>>,
}

impl<T> BatchResult<T> {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

#[derive(Debug, Clone)]
enum Outcome {
    Success(Value),
    Failure(String),
}

/// Extract the reported index of one per-item entry, if it is a usable integer.
fn reported_index(entry: &Value) -> Option<i64> {
    entry.get("index").and_then(Value::as_i64)
}

fn in_range(index: i64, total: usize) -> Option<usize> {
    usize::try_from(index).ok().filter(|i| *i < total)
}

fn error_text(entry: &Value) -> String {
    match entry.get("error") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "unknown error".to_string(),
        Some(other) => other.to_string(),
    }
}

/// Map the backend's per-item report onto submitted positions.
fn outcomes_from_lists(data: &Value, total: usize) -> Vec<Option<Outcome>> {
    let mut outcomes: Vec<Option<Outcome>> = vec![None; total];

    let results = data.get("results").and_then(Value::as_array);
    for entry in results.into_iter().flatten() {
        let Some(index) = reported_index(entry) else {
            warn!("Dropping batch result without a numeric index: {}", entry);
            continue;
        };
        let Some(i) = in_range(index, total) else {
            warn!("Dropping batch result for out-of-range index {} (batch of {})", index, total);
            continue;
        };
        match &outcomes[i] {
            None => {
                let data = entry.get("data").cloned().unwrap_or(Value::Null);
                outcomes[i] = Some(Outcome::Success(data));
            }
            Some(_) => warn!("Backend reported index {} more than once", i),
        }
    }

    let errors = data.get("errors").and_then(Value::as_array);
    for entry in errors.into_iter().flatten() {
        let Some(index) = reported_index(entry) else {
            warn!("Dropping batch error without a numeric index: {}", entry);
            continue;
        };
        let Some(i) = in_range(index, total) else {
            warn!("Dropping batch error for out-of-range index {} (batch of {})", index, total);
            continue;
        };
        match &outcomes[i] {
            Some(Outcome::Failure(_)) => warn!("Backend reported index {} more than once", i),
            Some(Outcome::Success(_)) => {
                warn!("Index {} reported as both success and failure; treating as failed", i);
                outcomes[i] = Some(Outcome::Failure(error_text(entry)));
            }
            None => outcomes[i] = Some(Outcome::Failure(error_text(entry))),
        }
    }

    outcomes
}

fn has_item_lists(data: &Value) -> bool {
    data.get("results").map(Value::is_array).unwrap_or(false)
        || data.get("errors").map(Value::is_array).unwrap_or(false)
}

/// Build the batch summary for `submitted` from the backend's response.
///
/// `total` is always `submitted.len()`; a backend-reported total that
/// disagrees is logged and otherwise ignored.
pub fn aggregate<T: Clone>(submitted: &[T], response: &ApiResponse<Value>) -> BatchResult<T> {
    let total = submitted.len();
    let data = response.data.as_ref().unwrap_or(&Value::Null);

    let outcomes = if has_item_lists(data) {
        if let Some(reported) = data.get("total").and_then(Value::as_u64) {
            if reported != total as u64 {
                warn!(
                    "Backend reported batch total {} but {} orders were submitted",
                    reported, total
                );
            }
        }
        outcomes_from_lists(data, total)
    } else if response.success {
        vec![Some(Outcome::Success(data.clone())); total]
    } else {
        let error = response
            .error
            .clone()
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| response.message.clone());
        vec![Some(Outcome::Failure(error)); total]
    };

    let mut results = Vec::new();
    let mut errors = Vec::new();
    for (index, (order, outcome)) in submitted.iter().zip(outcomes).enumerate() {
        match outcome {
            Some(Outcome::Success(outcome)) => results.push(BatchSuccess {
                index,
                outcome,
                order: order.clone(),
            }),
            Some(Outcome::Failure(error)) => errors.push(BatchFailure {
                index,
                error,
                order: order.clone(),
            }),
            None => errors.push(BatchFailure {
                index,
                error: NO_RESULT_REPORTED.to_string(),
                order: order.clone(),
            }),
        }
    }

    debug!(
        "Aggregated batch: {} submitted, {} succeeded, {} failed",
        total,
        results.len(),
        errors.len()
    );

    BatchResult {
        total,
        successful: results.len(),
        failed: errors.len(),
        results,
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(data: Value) -> ApiResponse<Value> {
        ApiResponse {
            success: true,
            message: "Batch processed".into(),
            data: Some(data),
            error: None,
        }
    }

    fn indices<T>(result: &BatchResult<T>) -> (Vec<usize>, Vec<usize>) {
        (
            result.results.iter().map(|r| r.index).collect(),
            result.errors.iter().map(|e| e.index).collect(),
        )
    }

    #[test]
    fn test_partial_failure() {
        let submitted = vec!["BTC", "ETH", "SOL"];
        let resp = response(json!({
            "total": 3, "successful": 2, "failed": 1,
            "results": [
                {"index": 2, "success": true, "data": {"oid": 3}, "order": {}},
                {"index": 0, "success": true, "data": {"oid": 1}, "order": {}}
            ],
            "errors": [
                {"index": 1, "success": false, "error": "insufficient margin", "order": {}}
            ]
        }));

        let result = aggregate(&submitted, &resp);

        assert_eq!((result.total, result.successful, result.failed), (3, 2, 1));
        assert_eq!(indices(&result), (vec![0, 2], vec![1]));
        assert_eq!(result.results[0].outcome, json!({"oid": 1}));
        assert_eq!(result.results[1].order, "SOL");
        assert_eq!(result.errors[0].error, "insufficient margin");
        assert_eq!(result.errors[0].order, "ETH");
    }

    #[test]
    fn test_missing_index_is_failed() {
        let submitted = vec!["BTC", "ETH"];
        let resp = response(json!({
            "results": [{"index": 0, "success": true, "data": null}],
            "errors": []
        }));

        let result = aggregate(&submitted, &resp);

        assert_eq!((result.total, result.successful, result.failed), (2, 1, 1));
        assert_eq!(result.errors[0].index, 1);
        assert_eq!(result.errors[0].error, NO_RESULT_REPORTED);
    }

    #[test]
    fn test_out_of_range_indices_dropped() {
        let submitted = vec!["BTC"];
        let resp = response(json!({
            "total": 3,
            "results": [
                {"index": 0, "success": true, "data": 1},
                {"index": 5, "success": true, "data": 2}
            ],
            "errors": [{"index": -1, "success": false, "error": "x"}]
        }));

        let result = aggregate(&submitted, &resp);

        assert_eq!((result.total, result.successful, result.failed), (1, 1, 0));
        assert!(result.all_succeeded());
    }

    #[test]
    fn test_conflicting_report_counts_as_failure() {
        let submitted = vec!["BTC", "ETH"];
        let resp = response(json!({
            "results": [
                {"index": 0, "success": true},
                {"index": 1, "success": true}
            ],
            "errors": [{"index": 0, "success": false, "error": "rejected"}]
        }));

        let result = aggregate(&submitted, &resp);

        assert_eq!(indices(&result), (vec![1], vec![0]));
        assert_eq!(result.errors[0].error, "rejected");
    }

    #[test]
    fn test_single_object_failure_fails_every_item() {
        let submitted = vec!["BTC", "ETH"];
        let resp = ApiResponse {
            success: false,
            message: "Batch rejected".into(),
            data: None,
            error: Some("user not connected".into()),
        };

        let result = aggregate(&submitted, &resp);

        assert_eq!((result.successful, result.failed), (0, 2));
        assert!(result.errors.iter().all(|e| e.error == "user not connected"));
    }

    #[test]
    fn test_single_object_success() {
        let submitted = vec!["BTC"];
        let resp = response(json!({"status": "ok"}));
        let result = aggregate(&submitted, &resp);
        assert_eq!(result.results[0].outcome, json!({"status": "ok"}));
        assert_eq!(result.successful, 1);
    }

    #[test]
    fn test_every_index_in_exactly_one_bucket() {
        let submitted: Vec<usize> = (0..6).collect();
        let resp = response(json!({
            "results": [{"index": 4}, {"index": 1}, {"index": 4}],
            "errors": [{"index": 3, "error": "e"}, {"index": 9, "error": "e"}]
        }));

        let result = aggregate(&submitted, &resp);

        let (ok, failed) = indices(&result);
        assert_eq!(ok, vec![1, 4]);
        assert_eq!(failed, vec![0, 2, 3, 5]);
        assert_eq!(result.successful + result.failed, result.total);
        assert_eq!(result.total, submitted.len());
    }
}
