//! Wire messages for the resource services.
//!
//! The create and update calls of the profile, rule-type and data-source
//! services share one wire shape: the request and the response both carry
//! the resource in field 1. The resource message keeps the addressing
//! fields typed and forwards the whole decoded document as a
//! `google.protobuf.Struct`, so fields this client does not know about still
//! reach the server.

use minder_core::Envelope;
use prost_types::value::Kind;
use prost_types::{ListValue, Struct};
use serde_json::{Map, Value};

/// Project and provider scoping for a resource.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct Context {
    /// Provider name.
    #[prost(string, optional, tag = "1")]
    pub provider: Option<String>,
    /// Project identifier.
    #[prost(string, optional, tag = "3")]
    pub project: Option<String>,
}

/// A resource as sent to and returned by the control plane.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Resource {
    /// Server-assigned identifier; absent on requests.
    #[prost(string, optional, tag = "1")]
    pub id: Option<String>,
    /// Resource name.
    #[prost(string, tag = "2")]
    pub name: String,
    /// Scoping context.
    #[prost(message, optional, tag = "3")]
    pub context: Option<Context>,
    /// Manifest schema version.
    #[prost(string, tag = "4")]
    pub version: String,
    /// Canonical resource type.
    #[prost(string, tag = "5")]
    pub r#type: String,
    /// The full decoded document.
    #[prost(message, optional, tag = "6")]
    pub definition: Option<Struct>,
}

/// Request for any create or update call.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpsertRequest {
    /// The resource to write.
    #[prost(message, optional, tag = "1")]
    pub resource: Option<Resource>,
}

/// Response of any create or update call.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpsertResponse {
    /// The resource as stored.
    #[prost(message, optional, tag = "1")]
    pub resource: Option<Resource>,
}

impl From<&Envelope> for Resource {
    fn from(envelope: &Envelope) -> Self {
        let manifest = envelope.manifest();
        let context = manifest.context();
        Self {
            id: None,
            name: manifest.name().to_string(),
            context: Some(Context {
                provider: context.provider.clone(),
                project: context.project.clone(),
            }),
            version: manifest.version().unwrap_or_default().to_string(),
            r#type: envelope.kind().as_str().to_string(),
            definition: Some(to_struct(manifest.document())),
        }
    }
}

/// Converts a JSON object into a protobuf `Struct`.
#[must_use]
pub fn to_struct(map: &Map<String, Value>) -> Struct {
    Struct {
        fields: map.iter().map(|(k, v)| (k.clone(), to_value(v))).collect(),
    }
}

fn to_value(value: &Value) -> prost_types::Value {
    let kind = match value {
        Value::Null => Kind::NullValue(prost_types::NullValue::NullValue as i32),
        Value::Bool(b) => Kind::BoolValue(*b),
        // Struct numbers are doubles on the wire.
        Value::Number(n) => Kind::NumberValue(n.as_f64().unwrap_or_default()),
        Value::String(s) => Kind::StringValue(s.clone()),
        Value::Array(items) => Kind::ListValue(ListValue {
            values: items.iter().map(to_value).collect(),
        }),
        Value::Object(map) => Kind::StructValue(to_struct(map)),
    };
    prost_types::Value { kind: Some(kind) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minder_core::{FileArg, Manifest, ResourceKind};
    use prost::Message;
    use serde_json::json;

    fn envelope() -> Envelope {
        let manifest = Manifest::from_document(json!({
            "version": "v1",
            "type": "rule_type",
            "name": "secret-scan",
            "context": {"project": "p-1", "provider": "github"},
            "def": {"in_entity": "repository", "ingest": {"type": "rest"}},
            "severity": {"value": "high"},
            "tags": ["a", 1, true, null],
        }))
        .unwrap();
        Envelope::new(
            ResourceKind::RuleType,
            manifest,
            FileArg::explicit("r.yaml").unwrap(),
        )
    }

    #[test]
    fn test_resource_from_envelope() {
        let resource = Resource::from(&envelope());

        assert!(resource.id.is_none());
        assert_eq!(resource.name, "secret-scan");
        assert_eq!(resource.r#type, "rule-type");
        assert_eq!(resource.version, "v1");
        let context = resource.context.unwrap();
        assert_eq!(context.project.as_deref(), Some("p-1"));
        assert_eq!(context.provider.as_deref(), Some("github"));
    }

    #[test]
    fn test_definition_keeps_unknown_fields() {
        let resource = Resource::from(&envelope());
        let definition = resource.definition.unwrap();

        let Some(Kind::StructValue(def)) = &definition.fields["def"].kind else {
            panic!("def should be a struct");
        };
        assert_eq!(
            def.fields["in_entity"].kind,
            Some(Kind::StringValue("repository".to_string()))
        );

        let Some(Kind::ListValue(tags)) = &definition.fields["tags"].kind else {
            panic!("tags should be a list");
        };
        assert_eq!(tags.values.len(), 4);
        assert_eq!(tags.values[1].kind, Some(Kind::NumberValue(1.0)));
        assert_eq!(tags.values[3].kind, Some(Kind::NullValue(0)));
    }

    #[test]
    fn test_request_encodes_resource_in_field_one() {
        let request = UpsertRequest {
            resource: Some(Resource::from(&envelope())),
        };
        let bytes = request.encode_to_vec();
        // Field 1, wire type 2 (length-delimited).
        assert_eq!(bytes[0], 0x0a);

        let response = UpsertResponse::decode(bytes.as_slice()).unwrap();
        assert_eq!(response.resource.unwrap().name, "secret-scan");
    }
}
