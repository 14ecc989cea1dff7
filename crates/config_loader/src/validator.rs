//! 配置校验模块
//!
//! 校验规则：
//! - max_workers > 0
//! - queue_size > 0
//! - default_timeout_s > 0 且有限
//! - model / api_key_env 非空
//! - 生成参数落在 API 允许的范围内

use contracts::{AppConfig, ContractError};

/// 校验 AppConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &AppConfig) -> Result<(), ContractError> {
    validate_gemini(config)?;
    validate_dispatcher(config)?;
    validate_generation(config)?;
    Ok(())
}

/// 校验 Gemini 配置
fn validate_gemini(config: &AppConfig) -> Result<(), ContractError> {
    if config.gemini.model.trim().is_empty() {
        return Err(ContractError::config_validation(
            "gemini.model",
            "model name cannot be empty",
        ));
    }
    if config.gemini.api_key_env.trim().is_empty() {
        return Err(ContractError::config_validation(
            "gemini.api_key_env",
            "api_key_env cannot be empty",
        ));
    }
    Ok(())
}

/// 校验调度器配置
fn validate_dispatcher(config: &AppConfig) -> Result<(), ContractError> {
    let dispatcher = &config.dispatcher;

    if dispatcher.max_workers == 0 {
        return Err(ContractError::config_validation(
            "dispatcher.max_workers",
            "max_workers must be > 0",
        ));
    }
    if dispatcher.queue_size == 0 {
        return Err(ContractError::config_validation(
            "dispatcher.queue_size",
            "queue_size must be > 0",
        ));
    }
    if !dispatcher.default_timeout_s.is_finite() || dispatcher.default_timeout_s <= 0.0 {
        return Err(ContractError::config_validation(
            "dispatcher.default_timeout_s",
            format!(
                "default_timeout_s must be > 0, got {}",
                dispatcher.default_timeout_s
            ),
        ));
    }
    Ok(())
}

/// 校验生成参数
fn validate_generation(config: &AppConfig) -> Result<(), ContractError> {
    let generation = &config.generation;

    if !(0.0..=2.0).contains(&generation.temperature) {
        return Err(ContractError::config_validation(
            "generation.temperature",
            format!("temperature must be in [0, 2], got {}", generation.temperature),
        ));
    }
    if let Some(top_p) = generation.top_p {
        if !(top_p > 0.0 && top_p <= 1.0) {
            return Err(ContractError::config_validation(
                "generation.top_p",
                format!("top_p must be in (0, 1], got {top_p}"),
            ));
        }
    }
    if let Some(top_k) = generation.top_k {
        if top_k == 0 {
            return Err(ContractError::config_validation(
                "generation.top_k",
                "top_k must be >= 1",
            ));
        }
    }
    if generation.max_output_tokens == 0 {
        return Err(ContractError::config_validation(
            "generation.max_output_tokens",
            "max_output_tokens must be > 0",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_workers() {
        let mut config = AppConfig::default();
        config.dispatcher.max_workers = 0;
        let result = validate(&config);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("max_workers"), "got: {err}");
    }

    #[test]
    fn test_zero_queue_size() {
        let mut config = AppConfig::default();
        config.dispatcher.queue_size = 0;
        let result = validate(&config);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("queue_size"), "got: {err}");
    }

    #[test]
    fn test_negative_timeout() {
        let mut config = AppConfig::default();
        config.dispatcher.default_timeout_s = -1.0;
        let result = validate(&config);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("default_timeout_s"), "got: {err}");
    }

    #[test]
    fn test_nan_timeout() {
        let mut config = AppConfig::default();
        config.dispatcher.default_timeout_s = f64::NAN;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_model_name() {
        let mut config = AppConfig::default();
        config.gemini.model = "  ".into();
        let result = validate(&config);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("model name"), "got: {err}");
    }

    #[test]
    fn test_temperature_out_of_range() {
        let mut config = AppConfig::default();
        config.generation.temperature = 2.5;
        let result = validate(&config);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("temperature"), "got: {err}");
    }

    #[test]
    fn test_invalid_top_p() {
        let mut config = AppConfig::default();
        config.generation.top_p = Some(0.0);
        assert!(validate(&config).is_err());
        config.generation.top_p = Some(0.9);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_max_output_tokens() {
        let mut config = AppConfig::default();
        config.generation.max_output_tokens = 0;
        let result = validate(&config);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("max_output_tokens"), "got: {err}");
    }
}
