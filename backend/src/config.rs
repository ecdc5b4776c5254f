//! Environment-driven configuration.
//!
//! Everything has a local-development default so the binary boots with an
//! empty environment; deployments override through `.env` or real env vars.

use std::env;

use anyhow::{anyhow, Result};

/// Runtime configuration for the backend.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// SQLite database URL
    pub database_url: String,
    /// Origin allowed by CORS (the web frontend)
    pub allowed_origin: String,
    /// Public origin of the app, used for auth redirect targets
    pub app_origin: String,
    /// Base URL of the hosted auth service
    pub auth_base_url: String,
    /// API key for the hosted auth service
    pub auth_api_key: String,
    /// Chat-completion endpoint of the AI gateway
    pub ai_gateway_url: String,
    /// API key for the AI gateway
    pub ai_api_key: String,
    /// Model requested from the AI gateway
    pub ai_model: String,
    /// Household members allowed on the `person` field; empty allows any
    pub household: Vec<String>,
    /// Whitelist auto-provisioning entries as (email, role) pairs
    pub whitelist: Vec<(String, String)>,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a comma-separated list, dropping empty segments.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

/// Parse `email:role` pairs separated by commas.
fn parse_whitelist(raw: &str) -> Result<Vec<(String, String)>> {
    parse_list(raw)
        .into_iter()
        .map(|entry| {
            entry
                .split_once(':')
                .map(|(email, role)| (email.trim().to_string(), role.trim().to_string()))
                .filter(|(email, role)| !email.is_empty() && !role.is_empty())
                .ok_or_else(|| anyhow!("Invalid whitelist entry: {entry} (expected email:role)"))
        })
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bind_addr: var_or("BIND_ADDR", "127.0.0.1:3000"),
            database_url: var_or("DATABASE_URL", "sqlite:finance.db"),
            allowed_origin: var_or("ALLOWED_ORIGIN", "http://localhost:8080"),
            app_origin: var_or("APP_ORIGIN", "http://localhost:8080"),
            auth_base_url: var_or("AUTH_BASE_URL", "http://localhost:9999/auth/v1"),
            auth_api_key: var_or("AUTH_API_KEY", ""),
            ai_gateway_url: var_or(
                "AI_GATEWAY_URL",
                "http://localhost:9998/v1/chat/completions",
            ),
            ai_api_key: var_or("AI_API_KEY", ""),
            ai_model: var_or("AI_MODEL", "google/gemini-3-flash-preview"),
            household: parse_list(&var_or("HOUSEHOLD_MEMBERS", "")),
            whitelist: parse_whitelist(&var_or("WHITELIST_EMAILS", ""))?,
        })
    }
}
