use std::env;
use std::io::Cursor;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use base64::{engine::general_purpose, Engine as _};
use image::ImageFormat;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::markup::{CANVAS_HEIGHT, CANVAS_WIDTH};

pub const DEFAULT_ENDPOINT: &str = "https://api.banana.dev/start/v4";
pub const API_KEY_VAR: &str = "BANANA_API_KEY";
pub const MODEL_KEY_VAR: &str = "BANANA_MODEL_KEY";
pub const NEGATIVE_PROMPT: &str = "blurry, low quality, text, watermark, distorted";

const INFERENCE_STEPS: u32 = 30;
const GUIDANCE_SCALE: f32 = 7.5;

/// The two keys that enable remote generation. Both must be non-empty.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    model_key: String,
}

impl Credentials {
    pub fn from_values(api_key: Option<String>, model_key: Option<String>) -> Option<Self> {
        let api_key = api_key.filter(|value| !value.trim().is_empty())?;
        let model_key = model_key.filter(|value| !value.trim().is_empty())?;
        Some(Self { api_key, model_key })
    }

    pub fn from_env() -> Option<Self> {
        Self::from_values(env::var(API_KEY_VAR).ok(), env::var(MODEL_KEY_VAR).ok())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("model_key", &"<redacted>")
            .finish()
    }
}

/// Client for the hosted image model. One request per call, no retries.
#[derive(Debug, Clone)]
pub struct ImageBackend {
    http: Client,
    endpoint: String,
    credentials: Credentials,
}

impl ImageBackend {
    pub fn new(http: Client, endpoint: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            credentials,
        }
    }

    /// Builds a client whose requests give up after `timeout`.
    pub fn with_timeout(
        endpoint: impl Into<String>,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .no_proxy()
            .timeout(timeout)
            .build()
            .context("failed to create HTTP client")?;
        Ok(Self::new(http, endpoint, credentials))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Requests a 1280x720 poster for `title` and returns it as PNG bytes.
    pub async fn generate(&self, title: &str) -> Result<Vec<u8>> {
        let request_body = GenerationRequest {
            api_key: &self.credentials.api_key,
            model_key: &self.credentials.model_key,
            model_inputs: ModelInputs {
                prompt: build_prompt(title),
                negative_prompt: NEGATIVE_PROMPT,
                num_inference_steps: INFERENCE_STEPS,
                guidance_scale: GUIDANCE_SCALE,
                width: CANVAS_WIDTH,
                height: CANVAS_HEIGHT,
            },
        };

        let response: GenerationResponse = self
            .http
            .post(&self.endpoint)
            .json(&request_body)
            .send()
            .await
            .context("failed to call image generation API")?
            .error_for_status()
            .context("image generation API returned an error status")?
            .json()
            .await
            .context("failed to decode image generation response")?;

        let payload = response
            .model_outputs
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|output| output.image_base64)
            .ok_or_else(|| anyhow!("image generation response had no image payload"))?;
        decode_payload(&payload)
    }
}

pub fn build_prompt(title: &str) -> String {
    format!(
        "Professional academic event poster, modern minimalist design, dark blue background (#2E6DB4), \
         golden accent elements (#F4C542), tech/AI theme, clean typography area for title \"{title}\", \
         16:9 aspect ratio, high quality, digital art"
    )
}

/// Decodes a base64 image payload and normalises it to PNG. Anything that
/// does not decode as an image is an error.
pub fn decode_payload(payload: &str) -> Result<Vec<u8>> {
    let encoded = payload
        .trim()
        .split_once(";base64,")
        .map_or(payload.trim(), |(_, data)| data);
    if encoded.is_empty() {
        bail!("image payload was empty");
    }
    let bytes = general_purpose::STANDARD
        .decode(encoded)
        .context("image payload is not valid base64")?;

    let format = image::guess_format(&bytes).context("image payload is not a known image format")?;
    if format == ImageFormat::Png {
        return Ok(bytes);
    }

    let decoded = image::load_from_memory_with_format(&bytes, format)
        .with_context(|| format!("failed to decode {format:?} image payload"))?;
    let mut png = Vec::new();
    decoded
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .context("failed to re-encode image payload as PNG")?;
    Ok(png)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationRequest<'a> {
    api_key: &'a str,
    model_key: &'a str,
    model_inputs: ModelInputs<'a>,
}

#[derive(Debug, Serialize)]
struct ModelInputs<'a> {
    prompt: String,
    negative_prompt: &'a str,
    num_inference_steps: u32,
    guidance_scale: f32,
    width: u32,
    height: u32,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    #[serde(default, rename = "modelOutputs")]
    model_outputs: Option<Vec<ModelOutput>>,
}

#[derive(Debug, Deserialize)]
struct ModelOutput {
    #[serde(default)]
    image_base64: Option<String>,
}
