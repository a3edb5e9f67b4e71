use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The placeholder resource exposed under `/api/foo`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Foo {
    pub id: i32,
    pub value: String,
    /// Creation time. Always the moment the record was built.
    #[serde(rename = "createAd")]
    pub created_at: DateTime<Utc>,
}

impl Foo {
    pub fn new(id: i32, value: impl Into<String>) -> Self {
        Self {
            id,
            value: value.into(),
            created_at: Utc::now(),
        }
    }
}

// ── Request payloads ─────────────────────────────────────────────────────────

/// Body accepted by create, update and the fault demo.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct FooPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Multipart form accepted by `POST /api/foo/content`.
#[derive(Debug, ToSchema)]
pub struct FooUpload {
    pub id: Option<i32>,
    pub value: Option<String>,
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

impl FooUpload {
    /// Splits the form into the resource fields and the raw file content.
    pub fn into_parts(self) -> (FooPayload, Vec<u8>) {
        (
            FooPayload {
                id: self.id,
                value: self.value,
            },
            self.file,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn foo_serializes_with_public_field_names() {
        let value = serde_json::to_value(Foo::new(1, "abcde")).unwrap();
        assert_eq!(value["id"], json!(1));
        assert_eq!(value["value"], json!("abcde"));
        assert!(value["createAd"].is_string());
        assert!(value.get("created_at").is_none());
    }

    #[test]
    fn created_at_is_now() {
        let before = Utc::now();
        let foo = Foo::new(7, "x");
        assert!(foo.created_at >= before);
        assert!(foo.created_at <= Utc::now());
    }

    #[test]
    fn payload_fields_are_optional() {
        let payload: FooPayload = serde_json::from_value(json!({ "value": "only" })).unwrap();
        assert_eq!(payload.id, None);
        assert_eq!(payload.value.as_deref(), Some("only"));
    }

    #[test]
    fn null_body_deserializes_to_none() {
        let payload: Option<FooPayload> = serde_json::from_str("null").unwrap();
        assert!(payload.is_none());
    }

    #[test]
    fn upload_splits_into_payload_and_bytes() {
        let upload = FooUpload {
            id: Some(3),
            value: Some("v".to_string()),
            file: b"content".to_vec(),
        };
        let (payload, bytes) = upload.into_parts();
        assert_eq!(payload.id, Some(3));
        assert_eq!(payload.value.as_deref(), Some("v"));
        assert_eq!(bytes, b"content");
    }
}
