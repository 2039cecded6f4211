use std::time::Duration;
use std::{env, fs};

use tollgate_auth::{ConfigError, SessionConfig};

#[test]
fn config_file_env_overrides_and_validation() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("tollgate.toml");

    let toml_content = r#"
signing_secret = "file-secret-file-secret-file-secret!"
issuer = "https://auth.example.com"
audience = "https://api.example.com"
access_token_lifetime = "10m"
refresh_token_lifetime = "7days"
"#;
    fs::write(&path, toml_content).expect("write toml");

    // 1) Valid config parses
    let cfg = SessionConfig::load(Some(&path)).expect("should parse config");
    assert_eq!(cfg.issuer, "https://auth.example.com");
    assert_eq!(cfg.access_token_lifetime, Duration::from_secs(600));
    assert_eq!(cfg.refresh_token_lifetime, Duration::from_secs(604_800));

    // 2) Env override should win over file
    unsafe {
        env::set_var("TOLLGATE__AUDIENCE", "https://other.example.com");
    }
    let cfg_env = SessionConfig::load(Some(&path)).expect("should parse with env overrides");
    assert_eq!(cfg_env.audience, "https://other.example.com");
    unsafe {
        env::remove_var("TOLLGATE__AUDIENCE");
    }

    // 3) Missing file falls back to defaults, which lack a secret
    let missing = dir.path().join("absent.toml");
    let err = SessionConfig::load(Some(&missing)).expect_err("expected missing secret");
    assert!(matches!(err, ConfigError::Missing(_)));

    // 4) Unparseable lifetime is a load error
    let invalid_path = dir.path().join("invalid.toml");
    fs::write(
        &invalid_path,
        r#"
signing_secret = "file-secret-file-secret-file-secret!"
access_token_lifetime = "ten minutes"
"#,
    )
    .expect("write invalid toml");
    let err = SessionConfig::load(Some(&invalid_path)).expect_err("expected load error");
    assert!(matches!(err, ConfigError::Load(_)));

    // 5) An all-digit secret from env is kept as a string, byte for byte
    let numeric_secret = "00123456789012345678901234567890123";
    unsafe {
        env::set_var("TOLLGATE__SIGNING_SECRET", numeric_secret);
    }
    let cfg_numeric = SessionConfig::load(Some(&path)).expect("should parse numeric secret");
    unsafe {
        env::remove_var("TOLLGATE__SIGNING_SECRET");
    }
    assert_eq!(cfg_numeric.signing_secret, numeric_secret);
    assert_eq!(cfg_numeric.secret_bytes(), numeric_secret.as_bytes());
}
