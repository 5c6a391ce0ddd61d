use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// The response assembled by the executor, in the GraphQL response shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQLError>,
}

impl Response {
    pub fn from_data(data: serde_json::Value) -> Self {
        Response {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    pub fn from_errors(errors: Vec<GraphQLError>) -> Self {
        Response { data: None, errors }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphQLError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<PathSegment>,
}

impl GraphQLError {
    pub fn new(message: impl Into<String>) -> Self {
        GraphQLError {
            message: message.into(),
            path: Vec::new(),
        }
    }

    pub fn with_path(mut self, path: Vec<PathSegment>) -> Self {
        self.path = path;
        self
    }

    /// The path joined with dots, `user.friends.0.name`. Empty when the error has no path.
    pub fn path_string(&self) -> String {
        self.path
            .iter()
            .map(|segment| segment.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Field(String),
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(index) => write!(f, "{}", index),
            PathSegment::Field(name) => f.write_str(name),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(name: &str) -> Self {
        PathSegment::Field(name.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_path_with_dots() {
        let error = GraphQLError::new("boom").with_path(vec![
            "user".into(),
            "friends".into(),
            0.into(),
            "name".into(),
        ]);
        assert_eq!(error.path_string(), "user.friends.0.name");
        assert_eq!(GraphQLError::new("no path").path_string(), "");
    }

    #[test]
    fn serializes_in_graphql_shape() {
        let response = Response {
            data: Some(serde_json::json!({ "user": null })),
            errors: vec![GraphQLError::new("not found").with_path(vec!["user".into(), 1.into()])],
        };

        insta::assert_snapshot!(
            serde_json::to_string(&response).expect("serializable"),
            @r#"{"data":{"user":null},"errors":[{"message":"not found","path":["user",1]}]}"#
        );

        let ok = Response::from_data(serde_json::json!({ "ok": true }));
        insta::assert_snapshot!(
            serde_json::to_string(&ok).expect("serializable"),
            @r#"{"data":{"ok":true}}"#
        );
    }

    #[test]
    fn deserializes_mixed_paths() {
        let response: Response = serde_json::from_str(
            r#"{"data":null,"errors":[{"message":"x","path":["items",2,"id"]}]}"#,
        )
        .expect("valid response");

        assert!(response.has_errors());
        assert_eq!(
            response.errors[0].path,
            vec![
                PathSegment::Field("items".to_string()),
                PathSegment::Index(2),
                PathSegment::Field("id".to_string()),
            ]
        );
    }
}
