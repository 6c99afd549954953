//! Generation configuration, declarative schemas, and call-over-default
//! resolution.
//!
//! ```rust
//! use gcontent::{GenerationConfig, resolve};
//!
//! let defaults = GenerationConfig::default()
//!     .with_temperature(0.7)
//!     .with_max_output_tokens(256);
//! let call = GenerationConfig::default().with_temperature(0.2);
//!
//! let effective = resolve(Some(&call), Some(&defaults)).expect("valid config");
//! assert_eq!(effective.temperature, Some(0.2));
//! assert_eq!(effective.max_output_tokens, Some(256));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::safety::SafetySetting;
use crate::turn::Turn;

/// Declarative parameter schema: primitives, objects, and arrays only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Schema {
    String,
    Number,
    Integer,
    Boolean,
    Object {
        properties: BTreeMap<String, Schema>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        required: Vec<String>,
    },
    Array {
        items: Box<Schema>,
    },
}

impl Schema {
    pub fn object(properties: BTreeMap<String, Schema>, required: Vec<String>) -> Self {
        Self::Object {
            properties,
            required,
        }
    }

    pub fn array(items: Schema) -> Self {
        Self::Array {
            items: Box::new(items),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: Schema,
}

impl FunctionDeclaration {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Schema,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomaticFunctionCalling {
    pub enabled: Option<bool>,
    pub max_iterations: Option<u32>,
}

impl AutomaticFunctionCalling {
    pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

    pub fn disabled() -> Self {
        Self {
            enabled: Some(false),
            max_iterations: None,
        }
    }

    fn merged_over(self, defaults: Self) -> Self {
        Self {
            enabled: self.enabled.or(defaults.enabled),
            max_iterations: self.max_iterations.or(defaults.max_iterations),
        }
    }
}

/// Per-call generation settings. Absent fields inherit client defaults at
/// resolution time; the resolved value is a read-only snapshot for the whole
/// call, tool-loop iterations included.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_settings: Option<Vec<SafetySetting>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<FunctionDeclaration>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automatic_function_calling: Option<AutomaticFunctionCalling>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Turn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_content: Option<String>,
}

pub const JSON_MIME_TYPE: &str = "application/json";

impl GenerationConfig {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_top_k(mut self, top_k: i32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    pub fn with_stop_sequences(mut self, stop_sequences: Vec<String>) -> Self {
        self.stop_sequences = Some(stop_sequences);
        self
    }

    pub fn with_json_response(mut self, schema: Schema) -> Self {
        self.response_mime_type = Some(JSON_MIME_TYPE.to_string());
        self.response_schema = Some(schema);
        self
    }

    pub fn with_safety_settings(mut self, safety_settings: Vec<SafetySetting>) -> Self {
        self.safety_settings = Some(safety_settings);
        self
    }

    pub fn with_tools(mut self, tools: Vec<FunctionDeclaration>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn with_automatic_function_calling(mut self, afc: AutomaticFunctionCalling) -> Self {
        self.automatic_function_calling = Some(afc);
        self
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_candidate_count(mut self, candidate_count: u32) -> Self {
        self.candidate_count = Some(candidate_count);
        self
    }

    pub fn with_system_instruction(mut self, instruction: Turn) -> Self {
        self.system_instruction = Some(instruction);
        self
    }

    pub fn with_cached_content(mut self, cached_content: impl Into<String>) -> Self {
        self.cached_content = Some(cached_content.into());
        self
    }

    /// Whether the resolved call runs the automatic function-calling loop.
    pub fn function_calling_enabled(&self) -> bool {
        self.automatic_function_calling
            .and_then(|afc| afc.enabled)
            .unwrap_or(true)
    }

    /// Bound on tool round-trips for one call.
    pub fn function_calling_max_iterations(&self) -> u32 {
        self.automatic_function_calling
            .and_then(|afc| afc.max_iterations)
            .unwrap_or(AutomaticFunctionCalling::DEFAULT_MAX_ITERATIONS)
    }

    fn merged_over(&self, defaults: &GenerationConfig) -> GenerationConfig {
        GenerationConfig {
            temperature: self.temperature.or(defaults.temperature),
            top_p: self.top_p.or(defaults.top_p),
            top_k: self.top_k.or(defaults.top_k),
            max_output_tokens: self.max_output_tokens.or(defaults.max_output_tokens),
            stop_sequences: self
                .stop_sequences
                .clone()
                .or_else(|| defaults.stop_sequences.clone()),
            response_mime_type: self
                .response_mime_type
                .clone()
                .or_else(|| defaults.response_mime_type.clone()),
            response_schema: self
                .response_schema
                .clone()
                .or_else(|| defaults.response_schema.clone()),
            safety_settings: self
                .safety_settings
                .clone()
                .or_else(|| defaults.safety_settings.clone()),
            tools: self.tools.clone().or_else(|| defaults.tools.clone()),
            automatic_function_calling: match (
                self.automatic_function_calling,
                defaults.automatic_function_calling,
            ) {
                (Some(call), Some(default)) => Some(call.merged_over(default)),
                (call, default) => call.or(default),
            },
            seed: self.seed.or(defaults.seed),
            candidate_count: self.candidate_count.or(defaults.candidate_count),
            presence_penalty: self.presence_penalty.or(defaults.presence_penalty),
            frequency_penalty: self.frequency_penalty.or(defaults.frequency_penalty),
            system_instruction: self
                .system_instruction
                .clone()
                .or_else(|| defaults.system_instruction.clone()),
            cached_content: self
                .cached_content
                .clone()
                .or_else(|| defaults.cached_content.clone()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut constraints = Vec::new();

        if let Some(temperature) = self.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            constraints.push("temperature must be in the inclusive range 0.0..=2.0".to_string());
        }

        if let Some(top_p) = self.top_p
            && !(0.0..=1.0).contains(&top_p)
        {
            constraints.push("top_p must be in the inclusive range 0.0..=1.0".to_string());
        }

        if let Some(max_output_tokens) = self.max_output_tokens
            && max_output_tokens == 0
        {
            constraints.push("max_output_tokens must be greater than zero".to_string());
        }

        if let Some(candidate_count) = self.candidate_count
            && candidate_count == 0
        {
            constraints.push("candidate_count must be at least 1".to_string());
        }

        if self.response_schema.is_some()
            && self.response_mime_type.as_deref() != Some(JSON_MIME_TYPE)
        {
            constraints.push(format!(
                "response_schema requires response_mime_type = \"{JSON_MIME_TYPE}\""
            ));
        }

        if let Some(afc) = self.automatic_function_calling
            && afc.max_iterations == Some(0)
        {
            constraints
                .push("automatic_function_calling.max_iterations must be at least 1".to_string());
        }

        if constraints.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::new(constraints))
        }
    }
}

/// Deep-merges call-level config over client defaults and validates the
/// result. The returned snapshot is used unchanged for the remainder of the
/// call.
pub fn resolve(
    call: Option<&GenerationConfig>,
    defaults: Option<&GenerationConfig>,
) -> Result<GenerationConfig, ConfigError> {
    let effective = match (call, defaults) {
        (Some(call), Some(defaults)) => call.merged_over(defaults),
        (Some(call), None) => call.clone(),
        (None, Some(defaults)) => defaults.clone(),
        (None, None) => GenerationConfig::default(),
    };

    effective.validate()?;
    Ok(effective)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_fields_override_and_absent_fields_inherit() {
        let defaults = GenerationConfig::default()
            .with_temperature(0.9)
            .with_top_p(0.5)
            .with_candidate_count(2)
            .with_cached_content("caches/alpha");
        let call = GenerationConfig::default()
            .with_temperature(0.1)
            .with_seed(42);

        let effective = resolve(Some(&call), Some(&defaults)).expect("valid config");
        assert_eq!(effective.temperature, Some(0.1));
        assert_eq!(effective.seed, Some(42));
        assert_eq!(effective.top_p, Some(0.5));
        assert_eq!(effective.candidate_count, Some(2));
        assert_eq!(effective.cached_content.as_deref(), Some("caches/alpha"));
    }

    #[test]
    fn nested_function_calling_fields_merge_independently() {
        let defaults = GenerationConfig::default().with_automatic_function_calling(
            AutomaticFunctionCalling {
                enabled: Some(true),
                max_iterations: Some(4),
            },
        );
        let call = GenerationConfig::default().with_automatic_function_calling(
            AutomaticFunctionCalling {
                enabled: Some(false),
                max_iterations: None,
            },
        );

        let effective = resolve(Some(&call), Some(&defaults)).expect("valid config");
        assert!(!effective.function_calling_enabled());
        assert_eq!(effective.function_calling_max_iterations(), 4);
    }

    #[test]
    fn function_calling_defaults_apply_when_unset() {
        let effective = resolve(None, None).expect("valid config");
        assert!(effective.function_calling_enabled());
        assert_eq!(
            effective.function_calling_max_iterations(),
            AutomaticFunctionCalling::DEFAULT_MAX_ITERATIONS
        );
    }

    #[test]
    fn response_schema_without_json_mime_type_is_rejected() {
        let call = GenerationConfig {
            response_schema: Some(Schema::String),
            ..GenerationConfig::default()
        };

        let error = resolve(Some(&call), None).expect_err("schema without mime must fail");
        assert!(error.constraints[0].contains("response_mime_type"));

        let valid = GenerationConfig::default().with_json_response(Schema::String);
        assert!(resolve(Some(&valid), None).is_ok());
    }

    #[test]
    fn validation_collects_every_violated_constraint() {
        let call = GenerationConfig::default()
            .with_temperature(9.0)
            .with_top_p(3.0)
            .with_candidate_count(0);

        let error = resolve(Some(&call), None).expect_err("multiple violations must fail");
        assert_eq!(error.constraints.len(), 3);
    }

    #[test]
    fn schema_renders_declaratively() {
        let schema = Schema::object(
            [
                ("city".to_string(), Schema::String),
                ("days".to_string(), Schema::array(Schema::Integer)),
            ]
            .into_iter()
            .collect(),
            vec!["city".to_string()],
        );

        let rendered = serde_json::to_value(&schema).expect("schema serializes");
        assert_eq!(rendered["type"], "object");
        assert_eq!(rendered["properties"]["city"]["type"], "string");
        assert_eq!(rendered["properties"]["days"]["items"]["type"], "integer");
    }
}
