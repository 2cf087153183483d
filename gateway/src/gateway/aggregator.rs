//! Assembly of per-item outcomes into the batch response.

use serde::Serialize;
use serde_json::Value;

use chat_gateway_common::ChatQuery;

use crate::hosting::BatchItem;

const PARTIAL_SUCCESS_MESSAGE: &str = "Some queries failed but others succeeded";
const ALL_FAILED_MESSAGE: &str = "All queries failed";
const MALFORMED_ITEM_MESSAGE: &str = "Model service returned a malformed item";

/// Result for one query of a batch.
///
/// Serialized without a tag: `{"chat_id", "response"}` or `{"chat_id", "error"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryOutcome {
    Success { chat_id: String, response: String },
    Failure { chat_id: String, error: String },
}

impl QueryOutcome {
    pub fn success(chat_id: impl Into<String>, response: impl Into<String>) -> Self {
        QueryOutcome::Success {
            chat_id: chat_id.into(),
            response: response.into(),
        }
    }

    pub fn failure(chat_id: impl Into<String>, error: impl Into<String>) -> Self {
        QueryOutcome::Failure {
            chat_id: chat_id.into(),
            error: error.into(),
        }
    }

    pub fn chat_id(&self) -> &str {
        match self {
            QueryOutcome::Success { chat_id, .. } | QueryOutcome::Failure { chat_id, .. } => chat_id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, QueryOutcome::Success { .. })
    }
}

/// Ordered batch outcomes plus the derived status fields.
///
/// Only constructed through [`BatchResult::from_outcomes`], so the flags
/// always agree with `responses`.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    responses: Vec<QueryOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    partial_success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
}

impl BatchResult {
    pub fn from_outcomes(responses: Vec<QueryOutcome>) -> Self {
        let successes = responses.iter().filter(|o| o.is_success()).count();
        let failures = responses.len() - successes;

        let (partial_success, message, error) = match (successes, failures) {
            (s, f) if s > 0 && f > 0 => (Some(true), Some(PARTIAL_SUCCESS_MESSAGE), None),
            (0, f) if f > 0 => (None, None, Some(ALL_FAILED_MESSAGE)),
            _ => (None, None, None),
        };

        Self {
            responses,
            partial_success,
            message,
            error,
        }
    }

    pub fn responses(&self) -> &[QueryOutcome] {
        &self.responses
    }

    /// True iff the batch holds at least one success and one failure.
    pub fn is_partial_success(&self) -> bool {
        self.partial_success.unwrap_or(false)
    }

    /// True iff every item failed.
    pub fn all_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Interpret one element of a successful batch reply.
///
/// Items are correlated by position: the outcome always carries the
/// request's `chat_id`, whatever the hosting service echoed, so the batch
/// and fallback paths report the same id for the same query.
///
/// An `error` field marks a failure; otherwise a string `response` is
/// required. Anything else is reported as a malformed item rather than
/// failing the batch.
pub fn outcome_from_item(query: &ChatQuery, item: &BatchItem) -> QueryOutcome {
    let chat_id = query.chat_id.as_str();

    match (item.get("error"), item.get("response")) {
        (Some(Value::String(error)), _) => QueryOutcome::failure(chat_id, error.as_str()),
        (Some(error), _) if !error.is_null() => QueryOutcome::failure(chat_id, error.to_string()),
        (_, Some(Value::String(response))) => QueryOutcome::success(chat_id, response.as_str()),
        _ => QueryOutcome::failure(chat_id, MALFORMED_ITEM_MESSAGE),
    }
}

/// Build the batch result from a successful batch call.
pub fn from_batch_reply(queries: &[ChatQuery], items: &[BatchItem]) -> BatchResult {
    let outcomes = queries
        .iter()
        .zip(items)
        .map(|(query, item)| outcome_from_item(query, item))
        .collect();
    BatchResult::from_outcomes(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(value: Value) -> BatchItem {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {}", other),
        }
    }

    #[test]
    fn test_all_success_sets_no_flags() {
        let result = BatchResult::from_outcomes(vec![
            QueryOutcome::success("1", "a"),
            QueryOutcome::success("2", "b"),
        ]);
        assert!(!result.is_partial_success());
        assert!(!result.all_failed());
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"responses": [
                {"chat_id": "1", "response": "a"},
                {"chat_id": "2", "response": "b"}
            ]})
        );
    }

    #[test]
    fn test_mixed_outcomes_flag_partial_success() {
        let result = BatchResult::from_outcomes(vec![
            QueryOutcome::success("1", "hello"),
            QueryOutcome::failure("2", "user_prompt is required and cannot be empty"),
        ]);
        assert!(result.is_partial_success());
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "responses": [
                    {"chat_id": "1", "response": "hello"},
                    {"chat_id": "2", "error": "user_prompt is required and cannot be empty"}
                ],
                "partial_success": true,
                "message": "Some queries failed but others succeeded"
            })
        );
    }

    #[test]
    fn test_all_failures_report_top_level_error() {
        let result = BatchResult::from_outcomes(vec![
            QueryOutcome::failure("1", "Model service temporarily unavailable"),
            QueryOutcome::failure("2", "Model service temporarily unavailable"),
        ]);
        assert!(!result.is_partial_success());
        assert!(result.all_failed());

        let value = serde_json::to_value(&result).unwrap();
        assert!(value.get("partial_success").is_none());
        assert_eq!(value["error"], "All queries failed");
    }

    #[test]
    fn test_item_with_error_field_is_failure() {
        let query = ChatQuery::new("2", "");
        let outcome = outcome_from_item(
            &query,
            &item(json!({"chat_id": "2", "error": "user_prompt is required and cannot be empty"})),
        );
        assert_eq!(
            outcome,
            QueryOutcome::failure("2", "user_prompt is required and cannot be empty")
        );
    }

    #[test]
    fn test_item_with_structured_error_keeps_json_text() {
        let query = ChatQuery::new("7", "hi");
        let outcome = outcome_from_item(&query, &item(json!({"error": {"code": 13}})));
        assert_eq!(outcome, QueryOutcome::failure("7", r#"{"code":13}"#));
    }

    #[test]
    fn test_item_missing_response_is_malformed_failure() {
        let query = ChatQuery::new("3", "hi");
        let outcome = outcome_from_item(&query, &item(json!({"placeholder": true, "chat_id": "3"})));
        assert_eq!(outcome, QueryOutcome::failure("3", MALFORMED_ITEM_MESSAGE));
    }

    #[test]
    fn test_item_null_error_with_response_is_success() {
        let query = ChatQuery::new("4", "hi");
        let outcome = outcome_from_item(&query, &item(json!({"response": "ok", "error": null})));
        assert_eq!(outcome, QueryOutcome::success("4", "ok"));
    }

    #[test]
    fn test_item_without_chat_id_uses_request_chat_id() {
        let query = ChatQuery::new("from-query", "hi");
        let outcome = outcome_from_item(&query, &item(json!({"response": "ok"})));
        assert_eq!(outcome.chat_id(), "from-query");
    }

    #[test]
    fn test_request_chat_id_wins_over_echoed_one() {
        // The hosting service rewrites an empty chat_id to `query_<index>`.
        let query = ChatQuery::new("", "hi");
        let outcome = outcome_from_item(
            &query,
            &item(json!({"chat_id": "query_1", "error": "chat_id is required and cannot be empty"})),
        );
        assert_eq!(
            outcome,
            QueryOutcome::failure("", "chat_id is required and cannot be empty")
        );
    }

    #[test]
    fn test_batch_reply_preserves_order_and_flags_errors() {
        let queries = vec![
            ChatQuery::new("1", "hi"),
            ChatQuery::new("2", ""),
            ChatQuery::new("3", "yo"),
        ];
        let items = vec![
            item(json!({"chat_id": "1", "response": "a"})),
            item(json!({"chat_id": "2", "error": "user_prompt is required and cannot be empty"})),
            item(json!({"chat_id": "3", "response": "c"})),
        ];

        let result = from_batch_reply(&queries, &items);

        let ids: Vec<_> = result.responses().iter().map(QueryOutcome::chat_id).collect();
        assert_eq!(ids, ["1", "2", "3"]);
        assert!(result.is_partial_success());
    }
}
