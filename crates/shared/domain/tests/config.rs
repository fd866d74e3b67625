use sgate_domain::config::{ApiConfig, Environment, HttpConfig, Secret, ServerConfig};
use sgate_domain::constants::MAX_BODY_BYTES;
use serde_json::json;

#[test]
fn config_defaults_are_sane() {
    let server = ServerConfig::default();
    assert_eq!(server.port, 3001);
    assert!(server.ssl.is_none());

    let http = HttpConfig::default();
    assert_eq!(http.allowed_origin, "http://localhost:3000");
    assert_eq!(http.max_body_bytes, MAX_BODY_BYTES);
    assert_eq!(http.static_dir, std::path::PathBuf::from("public"));
    assert!(http.allowed_headers.iter().any(|h| h == "Content-Type"));

    let cfg = ApiConfig::default();
    assert_eq!(cfg.environment, Environment::Development);
    assert_eq!(cfg.services.openai.model, "text-embedding-3-small");
    assert_eq!(cfg.services.supabase.match_function, "match_documents");
}

#[test]
fn api_config_deserializes() {
    let raw = json!({
        "environment": "production",
        "server": { "address": "::", "port": 8080 },
        "http": { "allowed_origin": "https://example.com", "max_body_bytes": 1024 },
        "services": {
            "openai": { "api_key": "sk-test" },
            "supabase": { "url": "https://db.example.com", "service_key": "svc" }
        }
    });

    let cfg: ApiConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.environment, Environment::Production);
    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.http.allowed_origin, "https://example.com");
    assert_eq!(cfg.http.max_body_bytes, 1024);
    assert_eq!(cfg.services.openai.api_key.expose(), "sk-test");
    assert_eq!(cfg.services.openai.timeout_secs, 30, "unset fields keep defaults");
}

#[test]
fn environment_aliases() {
    let prod: Environment = serde_json::from_value(json!("prod")).expect("alias");
    let dev: Environment = serde_json::from_value(json!("dev")).expect("alias");
    assert_eq!(prod, Environment::Production);
    assert!(dev.is_development());
    assert!(!prod.is_development());
    assert_eq!(prod.to_string(), "production");
}

#[test]
fn secrets_are_redacted_in_debug() {
    let secret = Secret::new("sk-live-123");
    assert_eq!(format!("{secret:?}"), "Secret(***)");
    assert_eq!(format!("{:?}", Secret::default()), "Secret(<unset>)");

    let mut cfg = ApiConfig::default();
    cfg.services.openai.api_key = secret;
    assert!(!format!("{cfg:?}").contains("sk-live-123"));
}
