//! API Gateway REST proxy envelope: the payload is the request `body`.

use std::collections::HashMap;

use evp_core::{Envelope, ParseError, ParseResult, Payload, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::decode_outer;

/// An API Gateway REST API (v1) proxy integration request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayProxyEvent {
    #[serde(default)]
    pub resource: Option<String>,
    pub path: String,
    pub http_method: String,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub path_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub request_context: Option<Value>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

/// Extracts the request body from an API Gateway proxy event.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiGatewayEnvelope;

impl Envelope for ApiGatewayEnvelope {
    fn name(&self) -> &str {
        "apigw"
    }

    fn extract(&self, payload: Payload) -> Result<ParseResult<Payload>, ParseError> {
        let event: ApiGatewayProxyEvent = decode_outer("ApiGatewayProxyEvent", payload)?;
        tracing::debug!(method = %event.http_method, path = %event.path, "unwrapped API Gateway request");
        match event.body {
            Some(body) => Ok(ParseResult::Single(Payload::Text(body))),
            None => Err(ValidationError::missing_field("ApiGatewayProxyEvent", "body").into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evp_core::Typed;
    use serde_json::json;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Order {
        id: i64,
        description: String,
    }

    fn request(body: Value) -> Value {
        json!({
            "resource": "/orders",
            "path": "/orders",
            "httpMethod": "POST",
            "headers": {"Content-Type": "application/json"},
            "queryStringParameters": null,
            "pathParameters": null,
            "requestContext": {"stage": "prod", "requestId": "c6af9ac6-7b61-11e6-9a41-93e8deadbeef"},
            "body": body,
            "isBase64Encoded": false
        })
    }

    #[test]
    fn test_extracts_body() {
        let envelope: &dyn Envelope = &ApiGatewayEnvelope;
        let parsed = envelope
            .parse(
                request(json!(r#"{"id": 5, "description": "post"}"#)).into(),
                &Typed::<Order>::new(),
            )
            .unwrap();
        match parsed {
            ParseResult::Single(order) => assert_eq!(order.id, 5),
            other => panic!("Expected a single order, got: {other:?}"),
        }
    }

    #[test]
    fn test_null_body_is_missing_field() {
        let err = ApiGatewayEnvelope.extract(request(Value::Null).into()).unwrap_err();
        let validation = err.as_validation().unwrap();
        assert_eq!(validation.violations[0].instance_path, "body");
    }

    #[test]
    fn test_missing_method_is_validation_error() {
        let mut raw = request(json!("{}"));
        raw.as_object_mut().unwrap().remove("httpMethod");
        assert!(matches!(
            ApiGatewayEnvelope.extract(raw.into()),
            Err(ParseError::Validation(_))
        ));
    }
}
