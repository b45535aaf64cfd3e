use serde_json::{Map, Value};

use crate::core::errors::ApiError;

const PROVIDERS: [&str; 2] = ["ollama", "openai"];

pub fn validate_config(config: &Value) -> Result<(), ApiError> {
    let root = config
        .as_object()
        .ok_or_else(|| config_type_error("root", "object"))?;

    if let Some(server) = expect_optional_object(root, "server")? {
        validate_optional_string_field(server, "server.host", "host")?;
        validate_u64_field(server, "server.port", "port", 0, 65535)?;
        validate_string_array_field(
            server,
            "server.cors_allowed_origins",
            "cors_allowed_origins",
        )?;
    }

    if let Some(embedding) = expect_optional_object(root, "embedding")? {
        validate_gateway_section(embedding, "embedding")?;
        validate_u64_field(embedding, "embedding.dimension", "dimension", 1, 65_536)?;
        validate_bool_field(embedding, "embedding.normalize", "normalize")?;
    }

    if let Some(generation) = expect_optional_object(root, "generation")? {
        validate_gateway_section(generation, "generation")?;
        validate_f64_field(
            generation,
            "generation.temperature",
            "temperature",
            0.0,
            2.0,
        )?;
        validate_optional_u64_field(
            generation,
            "generation.max_tokens",
            "max_tokens",
            1,
            1_000_000,
        )?;
    }

    if let Some(retrieval) = expect_optional_object(root, "retrieval")? {
        validate_u64_field(
            retrieval,
            "retrieval.overfetch_factor",
            "overfetch_factor",
            1,
            100,
        )?;
        validate_u64_field(
            retrieval,
            "retrieval.max_top_k",
            "max_top_k",
            1,
            10_000,
        )?;
        validate_u64_field(
            retrieval,
            "retrieval.default_top_k",
            "default_top_k",
            1,
            10_000,
        )?;
        validate_u64_field(
            retrieval,
            "retrieval.max_context_chars",
            "max_context_chars",
            1,
            10_000_000,
        )?;
        validate_bool_field(retrieval, "retrieval.deduplicate", "deduplicate")?;

        let default_top_k = retrieval.get("default_top_k").and_then(Value::as_u64);
        let max_top_k = retrieval.get("max_top_k").and_then(Value::as_u64);
        if let (Some(default_top_k), Some(max_top_k)) = (default_top_k, max_top_k) {
            if default_top_k > max_top_k {
                return Err(ApiError::Configuration(format!(
                    "Invalid config at 'retrieval.default_top_k': must not exceed max_top_k ({})",
                    max_top_k
                )));
            }
        }
    }

    Ok(())
}

fn validate_gateway_section(section: &Map<String, Value>, prefix: &str) -> Result<(), ApiError> {
    let provider_path = format!("{}.provider", prefix);
    validate_required_string_field(section, &provider_path, "provider")?;
    if let Some(provider) = section.get("provider").and_then(Value::as_str) {
        if !PROVIDERS.contains(&provider) {
            return Err(ApiError::Configuration(format!(
                "Invalid config at '{}': unknown provider '{}' (expected one of {})",
                provider_path,
                provider,
                PROVIDERS.join(", ")
            )));
        }
    }
    validate_required_string_field(section, &format!("{}.base_url", prefix), "base_url")?;
    validate_required_string_field(section, &format!("{}.model", prefix), "model")?;
    validate_u64_field(
        section,
        &format!("{}.timeout_secs", prefix),
        "timeout_secs",
        1,
        86_400,
    )?;
    validate_optional_string_field(section, &format!("{}.api_key", prefix), "api_key")
}

fn expect_optional_object<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, ApiError> {
    match root.get(key) {
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(config_type_error(key, "object")),
        None => Ok(None),
    }
}

fn validate_bool_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    if value.as_bool().is_some() {
        return Ok(());
    }
    Err(config_type_error(path, "boolean"))
}

fn validate_u64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: u64,
    max: u64,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(number) = value.as_u64() else {
        return Err(config_type_error(path, "integer"));
    };
    if number < min || number > max {
        return Err(ApiError::Configuration(format!(
            "Invalid config at '{}': must be between {} and {}",
            path, min, max
        )));
    }
    Ok(())
}

fn validate_optional_u64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: u64,
    max: u64,
) -> Result<(), ApiError> {
    match section.get(key) {
        Some(Value::Null) | None => Ok(()),
        Some(_) => validate_u64_field(section, path, key, min, max),
    }
}

fn validate_f64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: f64,
    max: f64,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    if value.is_null() {
        return Ok(());
    }
    let Some(number) = value.as_f64() else {
        return Err(config_type_error(path, "number"));
    };
    if number < min || number > max {
        return Err(ApiError::Configuration(format!(
            "Invalid config at '{}': must be between {} and {}",
            path, min, max
        )));
    }
    Ok(())
}

fn validate_required_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    let value = section.get(key).ok_or_else(|| {
        ApiError::Configuration(format!("Invalid config at '{}': value is required", path))
    })?;
    let Some(text) = value.as_str() else {
        return Err(config_type_error(path, "string"));
    };
    if text.trim().is_empty() {
        return Err(ApiError::Configuration(format!(
            "Invalid config at '{}': value cannot be empty",
            path
        )));
    }
    Ok(())
}

fn validate_optional_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    if value.is_null() || value.as_str().is_some() {
        return Ok(());
    }
    Err(config_type_error(path, "string"))
}

fn validate_string_array_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(items) = value.as_array() else {
        return Err(config_type_error(path, "array of strings"));
    };
    for (index, item) in items.iter().enumerate() {
        let Some(text) = item.as_str() else {
            return Err(config_type_error(&format!("{}[{}]", path, index), "string"));
        };
        if text.trim().is_empty() {
            return Err(ApiError::Configuration(format!(
                "Invalid config at '{}[{}]': value cannot be empty",
                path, index
            )));
        }
    }
    Ok(())
}

fn config_type_error(path: &str, expected: &str) -> ApiError {
    ApiError::Configuration(format!(
        "Invalid config at '{}': expected {}",
        path, expected
    ))
}
