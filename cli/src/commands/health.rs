use formloom_client::{BuilderClient, RuntimeClient};
use serde_json::json;

use crate::util::{EXIT_OK, StoredSettings, exit_error, load_settings, render, save_settings};

/// Probe both services. Either side may be down independently; report both.
pub async fn run(builder_url: &str, runtime_url: &str) -> i32 {
    let builder = BuilderClient::new(builder_url);
    let runtime = RuntimeClient::new(runtime_url);

    let builder_health = builder
        .health()
        .await
        .unwrap_or_else(|err| json!({ "status": "unreachable", "error": err.to_string() }));
    let runtime_health = runtime
        .health()
        .await
        .unwrap_or_else(|err| json!({ "status": "unreachable", "error": err.to_string() }));

    render::<serde_json::Value>(Ok(json!({
        "builder": { "url": builder_url, "health": builder_health },
        "runtime": { "url": runtime_url, "health": runtime_health },
    })))
}

/// `formloom use`: persist default base URLs to the settings file.
pub fn set_defaults(builder_url: Option<String>, runtime_url: Option<String>) -> i32 {
    if builder_url.is_none() && runtime_url.is_none() {
        exit_error(
            "Nothing to store.",
            Some("Pass --set-builder-url and/or --set-runtime-url."),
        );
    }
    let mut settings = load_settings().unwrap_or_default();
    if builder_url.is_some() {
        settings.builder_url = builder_url;
    }
    if runtime_url.is_some() {
        settings.runtime_url = runtime_url;
    }
    if let Err(err) = save_settings(&settings) {
        exit_error(&format!("Failed to write settings: {err}"), None);
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&StoredSettings {
            builder_url: settings.builder_url,
            runtime_url: settings.runtime_url,
        })
        .unwrap()
    );
    EXIT_OK
}
