use serde_json::{json, Map, Value};

use stylecast_core::settings::{OutputFormat, SeedChoice};

/// Try-on run payload: one reference ("model") image against the page's
/// garment image. Field values mirror the remote API contract.
pub fn try_on(model_image: &str, garment_image: &str) -> Value {
    json!({
        "model_image": model_image,
        "garment_image": garment_image,
        "garment_photo_type": "auto",
        "category": "auto",
        "mode": "balanced",
        "num_samples": 1,
    })
}

/// Inputs shared by the swap and variation payloads.
#[derive(Debug, Clone)]
pub struct ModelInputs<'a> {
    pub model_image: &'a str,
    pub prompt: Option<&'a str>,
    pub seed: SeedChoice,
    pub lora_url: Option<&'a str>,
    pub output_format: OutputFormat,
    pub return_base64: bool,
}

fn model_payload(model_name: &str, inputs: &ModelInputs<'_>) -> Value {
    let mut body = Map::new();
    body.insert("model_image".to_string(), json!(inputs.model_image));
    if let Some(prompt) = inputs.prompt.filter(|p| !p.trim().is_empty()) {
        body.insert("prompt".to_string(), json!(prompt));
    }
    // Omitted entirely when the policy says so; the service randomizes.
    if let Some(seed) = inputs.seed.value() {
        body.insert("seed".to_string(), json!(seed));
    }
    if let Some(lora_url) = inputs.lora_url.filter(|u| !u.trim().is_empty()) {
        body.insert("lora_url".to_string(), json!(lora_url));
    }
    body.insert(
        "output_format".to_string(),
        json!(inputs.output_format.as_str()),
    );
    body.insert("return_base64".to_string(), json!(inputs.return_base64));

    json!({
        "model_name": model_name,
        "inputs": Value::Object(body),
    })
}

pub fn model_swap(inputs: &ModelInputs<'_>) -> Value {
    model_payload("model-swap", inputs)
}

pub fn model_variation(inputs: &ModelInputs<'_>) -> Value {
    model_payload("model-variation", inputs)
}
