//! Integration tests for TOML and environment configuration loading.
//!
//! Uses `figment::Jail` for sandboxed files and env vars.

use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};
use pretty_assertions::assert_eq;
use wsd_config::WsdConfig;

#[test]
fn loads_sections_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[database]
path = "/var/lib/wsd/discovery.db"

[lock]
lease_duration_secs = 300

[analysis]
max_corpus_chars = 50000
context_records = 5
interpreter_timeout_secs = 30

[interpreter]
endpoint = "https://llm.internal/v1"
api_key = "sk-toml"
model = "gpt-4o"
"#,
        )?;

        let config: WsdConfig = Figment::from(Serialized::defaults(WsdConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.database.path, "/var/lib/wsd/discovery.db");
        assert_eq!(config.lock.lease_duration_secs, 300);
        assert_eq!(config.analysis.max_corpus_chars, 50_000);
        assert_eq!(config.analysis.context_records, 5);
        assert_eq!(config.analysis.interpreter_timeout_secs, 30);
        assert_eq!(config.interpreter.model, "gpt-4o");
        assert!(config.interpreter.is_configured());
        Ok(())
    });
}

#[test]
fn partial_toml_keeps_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "[lock]\nlease_duration_secs = 45\n")?;

        let config: WsdConfig = Figment::from(Serialized::defaults(WsdConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.lock.lease_duration_secs, 45);
        assert_eq!(config.analysis.max_corpus_chars, 120_000);
        assert_eq!(config.database.path, ".wsd/discovery.db");
        Ok(())
    });
}

#[test]
fn env_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "[lock]\nlease_duration_secs = 45\n")?;
        jail.set_env("WSD_LOCK__LEASE_DURATION_SECS", "90");
        jail.set_env("WSD_INTERPRETER__API_KEY", "sk-env");

        let config: WsdConfig = Figment::from(Serialized::defaults(WsdConfig::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("WSD_").split("__"))
            .extract()?;

        assert_eq!(config.lock.lease_duration_secs, 90);
        assert_eq!(config.interpreter.api_key, "sk-env");
        Ok(())
    });
}

#[test]
fn load_reads_project_config_and_validates() {
    Jail::expect_with(|jail| {
        jail.create_dir(".wsd")?;
        jail.create_file(".wsd/config.toml", "[lock]\nlease_duration_secs = 0\n")?;

        let result = WsdConfig::load();
        assert!(result.is_err(), "zero lease must fail validation");

        jail.set_env("WSD_LOCK__LEASE_DURATION_SECS", "10");
        let config = WsdConfig::load().expect("env fixes the lease");
        assert_eq!(config.lock.lease_duration_secs, 10);
        Ok(())
    });
}
