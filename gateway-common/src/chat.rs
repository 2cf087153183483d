//! Chat query and reply types exchanged with clients and the hosting service.

use serde::{Deserialize, Deserializer, Serialize};

/// A single chat query.
///
/// `chat_id` and `user_prompt` decode as empty strings when absent or `null`
/// so that the query reaches [`ChatQuery::validate`] instead of failing JSON
/// decoding, which would reject a whole batch for one bad item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatQuery {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub chat_id: String,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub user_prompt: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Local validation failures. Never reach the hosting service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryValidationError {
    #[error("chat_id is required and cannot be empty")]
    MissingChatId,
    #[error("user_prompt is required and cannot be empty")]
    MissingUserPrompt,
}

impl ChatQuery {
    pub fn new(chat_id: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            system_prompt: None,
            user_prompt: user_prompt.into(),
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    /// Check the fields the hosting service requires.
    ///
    /// `system_prompt` is optional and not checked here.
    pub fn validate(&self) -> Result<(), QueryValidationError> {
        if self.chat_id.is_empty() {
            return Err(QueryValidationError::MissingChatId);
        }
        if self.user_prompt.is_empty() {
            return Err(QueryValidationError::MissingUserPrompt);
        }
        Ok(())
    }
}

/// Body of `POST /chat/batched` and of the hosting service's batch endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchedRequest {
    #[serde(default)]
    pub queries: Vec<ChatQuery>,
}

/// Successful reply for one chat query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub chat_id: String,
    pub response: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_query_missing_fields_default_to_empty() {
        let query: ChatQuery = serde_json::from_str("{}").unwrap();
        assert!(query.chat_id.is_empty());
        assert!(query.user_prompt.is_empty());
        assert!(query.system_prompt.is_none());
    }

    #[test]
    fn test_chat_query_null_fields_decode_as_empty() {
        let json = r#"{"chat_id": null, "system_prompt": null, "user_prompt": null}"#;
        let query: ChatQuery = serde_json::from_str(json).unwrap();
        assert!(query.chat_id.is_empty());
        assert!(query.user_prompt.is_empty());
        assert_eq!(query.validate(), Err(QueryValidationError::MissingChatId));
    }

    #[test]
    fn test_batched_request_with_null_prompt_still_decodes() {
        let json = r#"{"queries": [
            {"chat_id": "1", "user_prompt": "hi"},
            {"chat_id": "2", "user_prompt": null}
        ]}"#;
        let request: BatchedRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.queries.len(), 2);
        assert_eq!(
            request.queries[1].validate(),
            Err(QueryValidationError::MissingUserPrompt)
        );
    }

    #[test]
    fn test_validate_accepts_query_without_system_prompt() {
        let query = ChatQuery::new("1", "hi");
        assert_eq!(query.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_empty_chat_id() {
        let query = ChatQuery::new("", "hi");
        assert_eq!(query.validate(), Err(QueryValidationError::MissingChatId));
    }

    #[test]
    fn test_validate_checks_chat_id_before_user_prompt() {
        let query = ChatQuery::new("", "");
        assert_eq!(query.validate(), Err(QueryValidationError::MissingChatId));
    }

    #[test]
    fn test_validate_rejects_empty_user_prompt() {
        let err = ChatQuery::new("2", "").validate().unwrap_err();
        assert_eq!(err, QueryValidationError::MissingUserPrompt);
        assert_eq!(err.to_string(), "user_prompt is required and cannot be empty");
    }

    #[test]
    fn test_batched_request_without_queries_is_empty() {
        let request: BatchedRequest = serde_json::from_str("{}").unwrap();
        assert!(request.queries.is_empty());
    }

    #[test]
    fn test_batched_request_preserves_order() {
        let json = r#"{"queries": [
            {"chat_id": "b", "user_prompt": "first"},
            {"chat_id": "a", "system_prompt": "be brief", "user_prompt": "second"}
        ]}"#;
        let request: BatchedRequest = serde_json::from_str(json).unwrap();
        let ids: Vec<_> = request.queries.iter().map(|q| q.chat_id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
        assert_eq!(request.queries[1].system_prompt.as_deref(), Some("be brief"));
    }

    #[test]
    fn test_chat_reply_wire_format() {
        let reply = ChatReply {
            chat_id: "1".to_string(),
            response: "hello".to_string(),
        };
        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(value, serde_json::json!({"chat_id": "1", "response": "hello"}));
    }
}
