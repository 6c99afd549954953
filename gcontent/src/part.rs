//! Typed content parts and their payload variants.
//!
//! ```rust
//! use gcontent::Part;
//!
//! let part = Part::text("hello");
//! assert_eq!(part.as_text(), Some("hello"));
//!
//! let call = Part::function_call("lookup", serde_json::json!({"city": "Oslo"}));
//! assert!(call.as_function_call().is_some());
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    pub mime_type: String,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

impl Blob {
    pub fn new(mime_type: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

/// Opaque handle to previously uploaded content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl FileRef {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub args: Value,
}

/// Result of a locally executed function, sent back to the model.
///
/// `error` marks the payload as a failure report rather than a return value;
/// a failed tool never aborts the calling loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub name: String,
    pub response: Value,
    #[serde(default)]
    pub error: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutableCode {
    pub language: String,
    pub code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CodeOutcome {
    Ok,
    Failed,
    DeadlineExceeded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub outcome: CodeOutcome,
    pub output: String,
}

/// Smallest unit of content. Exactly one payload variant per part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    Text(String),
    InlineData(Blob),
    FileData(FileRef),
    FunctionCall(FunctionCall),
    FunctionResponse(FunctionResponse),
    ExecutableCode(ExecutableCode),
    ExecutionResult(ExecutionResult),
}

impl Part {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self::InlineData(Blob::new(mime_type, data))
    }

    pub fn file_data(uri: impl Into<String>) -> Self {
        Self::FileData(FileRef::new(uri))
    }

    pub fn function_call(name: impl Into<String>, args: Value) -> Self {
        Self::FunctionCall(FunctionCall {
            name: name.into(),
            args,
        })
    }

    pub fn function_response(name: impl Into<String>, response: Value) -> Self {
        Self::FunctionResponse(FunctionResponse {
            name: name.into(),
            response,
            error: false,
        })
    }

    pub fn function_error(name: impl Into<String>, response: Value) -> Self {
        Self::FunctionResponse(FunctionResponse {
            name: name.into(),
            response,
            error: true,
        })
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_function_call(&self) -> Option<&FunctionCall> {
        match self {
            Self::FunctionCall(call) => Some(call),
            _ => None,
        }
    }

    pub fn as_function_response(&self) -> Option<&FunctionResponse> {
        match self {
            Self::FunctionResponse(response) => Some(response),
            _ => None,
        }
    }
}
