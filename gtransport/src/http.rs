//! Reqwest-based HTTP implementation of the transport contract.
//!
//! The service speaks JSON bodies built from the canonical content types and
//! streams newline-delimited chunk objects; no other wire format is assumed.

use std::sync::Arc;

use async_stream::try_stream;
use futures_util::StreamExt;
use gcontent::{GenerationConfig, GenerationResult, StreamChunk, Turn};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::{
    BoxedChunkStream, CredentialsProvider, GenerateRequest, ModelInfo, Transport, TransportError,
    TransportFuture,
};

pub const DEFAULT_BASE_URL: &str = "https://api.gossamer.dev/v1";

const API_KEY_HEADER: &str = "x-api-key";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateBody<'a> {
    contents: &'a [Turn],
    generation_config: &'a GenerationConfig,
}

#[derive(Serialize)]
struct CountTokensBody<'a> {
    contents: &'a [Turn],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CountTokensResponse {
    total_tokens: u64,
}

#[derive(Deserialize)]
struct ListModelsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    credentials: Arc<dyn CredentialsProvider>,
}

impl HttpTransport {
    pub fn new(client: Client, credentials: Arc<dyn CredentialsProvider>) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn authorized_post(&self, url: String) -> Result<reqwest::RequestBuilder, TransportError> {
        let api_key = self.credentials.resolve()?;
        Ok(self
            .client
            .post(url)
            .header(API_KEY_HEADER, api_key.expose()))
    }

    async fn parse_error(response: Response) -> TransportError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        error_for_status(status, &body)
    }

    fn map_send_error(error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::timeout(error.to_string())
        } else {
            TransportError::transport(error.to_string())
        }
    }
}

fn error_for_status(status: StatusCode, body: &str) -> TransportError {
    let message = extract_error_message(body)
        .unwrap_or_else(|| format!("request failed with status {status}"));

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            TransportError::authentication(message)
        }
        StatusCode::TOO_MANY_REQUESTS => TransportError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            TransportError::timeout(message)
        }
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => {
            TransportError::invalid_request(message)
        }
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
            TransportError::unavailable(message)
        }
        _ => TransportError::transport(message),
    }
}

fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

fn decode_chunk_line(line: &str) -> Result<StreamChunk, TransportError> {
    serde_json::from_str(line)
        .map_err(|error| TransportError::transport(format!("malformed stream chunk: {error}")))
}

impl Transport for HttpTransport {
    fn unary_generate<'a>(
        &'a self,
        request: GenerateRequest,
    ) -> TransportFuture<'a, Result<GenerationResult, TransportError>> {
        Box::pin(async move {
            let url = self.endpoint(&format!("models/{}:generate", request.model));
            let body = GenerateBody {
                contents: &request.turns,
                generation_config: &request.config,
            };

            let response = self
                .authorized_post(url)?
                .json(&body)
                .send()
                .await
                .map_err(Self::map_send_error)?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            response
                .json::<GenerationResult>()
                .await
                .map_err(|error| {
                    TransportError::transport(format!("malformed generate response: {error}"))
                })
        })
    }

    fn stream_generate<'a>(
        &'a self,
        request: GenerateRequest,
    ) -> TransportFuture<'a, Result<BoxedChunkStream<'a>, TransportError>> {
        Box::pin(async move {
            let url = self.endpoint(&format!("models/{}:streamGenerate", request.model));
            let body = GenerateBody {
                contents: &request.turns,
                generation_config: &request.config,
            };

            let response = self
                .authorized_post(url)?
                .json(&body)
                .send()
                .await
                .map_err(Self::map_send_error)?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            let stream = try_stream! {
                let mut buffer = String::new();
                let mut bytes = response.bytes_stream();

                while let Some(piece) = bytes.next().await {
                    let piece = piece.map_err(Self::map_send_error)?;
                    buffer.push_str(&String::from_utf8_lossy(&piece));

                    while let Some(boundary) = buffer.find('\n') {
                        let line = buffer[..boundary].trim().to_string();
                        buffer.drain(..=boundary);

                        if !line.is_empty() {
                            yield decode_chunk_line(&line)?;
                        }
                    }
                }

                let trailing = buffer.trim();
                if !trailing.is_empty() {
                    yield decode_chunk_line(trailing)?;
                }
            };

            Ok(Box::pin(stream) as BoxedChunkStream<'a>)
        })
    }

    fn count_tokens<'a>(
        &'a self,
        model: String,
        turns: Vec<Turn>,
    ) -> TransportFuture<'a, Result<u64, TransportError>> {
        Box::pin(async move {
            let url = self.endpoint(&format!("models/{model}:countTokens"));
            let body = CountTokensBody { contents: &turns };

            let response = self
                .authorized_post(url)?
                .json(&body)
                .send()
                .await
                .map_err(Self::map_send_error)?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            let parsed = response.json::<CountTokensResponse>().await.map_err(|error| {
                TransportError::transport(format!("malformed count response: {error}"))
            })?;

            Ok(parsed.total_tokens)
        })
    }

    fn list_models<'a>(&'a self) -> TransportFuture<'a, Result<Vec<ModelInfo>, TransportError>> {
        Box::pin(async move {
            let api_key = self.credentials.resolve()?;
            let response = self
                .client
                .get(self.endpoint("models"))
                .header(API_KEY_HEADER, api_key.expose())
                .send()
                .await
                .map_err(Self::map_send_error)?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            let parsed = response.json::<ListModelsResponse>().await.map_err(|error| {
                TransportError::transport(format!("malformed model list: {error}"))
            })?;

            Ok(parsed.models)
        })
    }
}
