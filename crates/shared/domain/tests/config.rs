use ladle_domain::config::{ApiConfig, DatabaseConfig, MediaConfig, ServerConfig};
use serde_json::json;

#[test]
fn config_defaults_are_sane() {
    let server = ServerConfig::default();
    assert_eq!(server.port, 8000);
    assert!(server.ssl.is_none());

    let db = DatabaseConfig::default();
    assert_eq!(db.url, "mem://");
    assert_eq!(db.namespace, "ladle");
    assert_eq!(db.database, "catalog");
    assert!(db.credentials.is_some());

    let media = MediaConfig::default();
    assert_eq!(media.media_dir, std::path::PathBuf::from("media"));
    assert_eq!(media.static_dir, std::path::PathBuf::from("static"));
    assert!(media.upload_max_bytes > 0);
}

#[test]
fn api_config_deserializes() {
    let raw = json!({
        "server": { "address": "::", "port": 8080 },
        "database": { "url": "ws://db:8000", "namespace": "n", "database": "d", "credentials": null },
        "media": { "media_dir": "/vol/web/media", "static_dir": "/vol/web/static" }
    });

    let cfg: ApiConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.database.namespace, "n");
    assert_eq!(cfg.media.media_dir, std::path::PathBuf::from("/vol/web/media"));
    assert_eq!(cfg.media.static_dir, std::path::PathBuf::from("/vol/web/static"));
}

#[test]
fn api_config_from_toml_fragment() {
    let raw = r#"
        [server]
        port = 9000

        [security.identity.jwt]
        secret = "test-secret"
        ttl_seconds = 600
    "#;

    let cfg: ApiConfig = toml::from_str(raw).expect("toml deserialize");
    assert_eq!(cfg.server.port, 9000);
    assert_eq!(cfg.security.identity.jwt.secret, "test-secret");
    assert_eq!(cfg.security.identity.jwt.ttl_seconds, 600);
    // Untouched sections keep their defaults.
    assert_eq!(cfg.security.identity.min_password_length, 5);
}

#[test]
fn defaults_survive_partial_json() {
    let cfg: ApiConfig = serde_json::from_value(json!({})).expect("empty config");
    assert_eq!(cfg.server.port, 8000);
    assert_eq!(cfg.security.identity.jwt.issuer, "ladle");
}
