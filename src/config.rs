use std::collections::HashMap;
use std::str::FromStr;
use crate::error::{ReporterError, Result};
use crate::types::Config;

pub const DEFAULT_VAULT_ADDR: &str = "http://127.0.0.1:8200";
pub const DEFAULT_LLM_MODEL: &str = "qwen2.5-32b-instruct";
pub const DEFAULT_LLM_MAX_TOKENS: u32 = 20000;
pub const DEFAULT_LLM_TRACE_NAME: &str = "team_bot";
pub const DEFAULT_CHUNK_THRESHOLD_BYTES: usize = 5000;

/// Trait for abstracting environment variable access
pub trait EnvironmentProvider {
    fn get_var(&self, key: &str) -> Option<String>;
}

/// Production implementation using std::env
pub struct SystemEnvironment;

impl EnvironmentProvider for SystemEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Mock implementation for testing
#[derive(Debug, Default)]
pub struct MockEnvironment {
    vars: HashMap<String, String>,
}

impl MockEnvironment {
    pub fn new() -> Self {
        Self {
            vars: HashMap::new(),
        }
    }

    pub fn set_var<K, V>(&mut self, key: K, value: V) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn with_var<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.set_var(key, value);
        self
    }
}

impl EnvironmentProvider for MockEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

pub fn load_config_with_env<E: EnvironmentProvider>(env: &E) -> Result<Config> {
    // LLM_URL is checked first: without it nothing can be narrated
    let llm_url = required(env, "LLM_URL")?;
    let vault_token = required(env, "VAULT_TOKEN")?;
    let llm_token = required(env, "LLM_TOKEN")?;

    let vault_addr = optional(env, "VAULT_ADDR")
        .unwrap_or_else(|| DEFAULT_VAULT_ADDR.to_string());
    let llm_model = optional(env, "LLM_MODEL")
        .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string());
    let llm_trace_name = optional(env, "LLM_TRACE_NAME")
        .unwrap_or_else(|| DEFAULT_LLM_TRACE_NAME.to_string());
    let llm_max_tokens = parsed(env, "LLM_MAX_TOKENS", DEFAULT_LLM_MAX_TOKENS)?;
    let chunk_threshold_bytes = parsed(env, "CHUNK_THRESHOLD_BYTES", DEFAULT_CHUNK_THRESHOLD_BYTES)?;

    Ok(Config {
        vault_addr,
        vault_token,
        llm_url,
        llm_token,
        llm_model,
        llm_max_tokens,
        llm_trace_name,
        chunk_threshold_bytes,
    })
}

fn optional<E: EnvironmentProvider>(env: &E, key: &str) -> Option<String> {
    env.get_var(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required<E: EnvironmentProvider>(env: &E, key: &'static str) -> Result<String> {
    optional(env, key).ok_or(ReporterError::Config(key))
}

fn parsed<E, T>(env: &E, key: &'static str, default: T) -> Result<T>
where
    E: EnvironmentProvider,
    T: FromStr,
{
    match optional(env, key) {
        Some(value) => value
            .parse()
            .map_err(|_| ReporterError::InvalidConfig { var: key, value }),
        None => Ok(default),
    }
}
