use clap::Parser;
use panicwatch::cli::Cli;
use panicwatch::config::Settings;
use panicwatch::{ChannelKind, ConfigError, NotifierConfig};
use serial_test::serial;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// A helper function to run a test with a temporary config file.
fn with_config_file<F>(toml_content: &str, test_fn: F)
where
    F: FnOnce(PathBuf),
{
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", toml_content).unwrap();
    let path = file.path().to_path_buf();
    test_fn(path);
}

fn cli_for(path: &PathBuf, extra: &[&str]) -> Cli {
    let mut args = vec!["panicwatch", "--config-file", path.to_str().unwrap()];
    args.extend_from_slice(extra);
    Cli::try_parse_from(args).unwrap()
}

#[test]
#[serial]
fn test_load_full_valid_config() {
    let toml_content = r#"
        log_level = "debug"
        listen_addr = "0.0.0.0:9090"
        [robot]
        enabled = true
        env = "production"
        host_name = "web-1"
        body_capture_limit = 1024
        [robot.wecom]
        enabled = true
        push_url = "https://qyapi.weixin.qq.com/cgi-bin/webhook/send?key=abc"
        [robot.feishu]
        enabled = true
        push_url = "https://open.feishu.cn/open-apis/bot/v2/hook/xyz"
    "#;

    with_config_file(toml_content, |path| {
        let settings = Settings::load(&cli_for(&path, &[])).unwrap();

        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.listen_addr, "0.0.0.0:9090".parse::<std::net::SocketAddr>().unwrap());
        assert!(settings.robot.enabled);
        assert_eq!(settings.robot.env, "production");
        assert_eq!(settings.robot.host_name.as_deref(), Some("web-1"));
        assert_eq!(settings.robot.body_capture_limit, 1024);
        assert!(settings.robot.wecom.enabled);
        assert!(settings.robot.feishu.enabled);

        let config = NotifierConfig::new(settings.notifier_options()).unwrap();
        assert_eq!(config.host_name(), "web-1");
        assert_eq!(
            config.channel(ChannelKind::WeCom).push_url,
            "https://qyapi.weixin.qq.com/cgi-bin/webhook/send?key=abc"
        );
        assert_eq!(config.enabled_channels().count(), 2);
    });
}

#[test]
#[serial]
fn test_load_partial_config_uses_defaults() {
    let toml_content = r#"
        [robot]
        enabled = true
    "#;

    with_config_file(toml_content, |path| {
        let settings = Settings::load(&cli_for(&path, &[])).unwrap();
        let defaults = Settings::default();

        assert!(settings.robot.enabled);
        assert_eq!(settings.log_level, defaults.log_level);
        assert_eq!(settings.listen_addr, defaults.listen_addr);
        assert_eq!(settings.robot.env, "development");
        assert_eq!(settings.robot.body_capture_limit, 64 * 1024);
        assert!(!settings.robot.wecom.enabled);
        assert!(settings.robot.host_name.is_none());
    });
}

#[test]
#[serial]
fn test_enabled_channel_without_url_is_rejected_at_construction() {
    let toml_content = r#"
        [robot]
        enabled = true
        host_name = "web-1"
        [robot.feishu]
        enabled = true
    "#;

    with_config_file(toml_content, |path| {
        let settings = Settings::load(&cli_for(&path, &[])).unwrap();
        assert_eq!(
            NotifierConfig::new(settings.notifier_options()),
            Err(ConfigError::MissingPushUrl(ChannelKind::Feishu))
        );
    });
}

#[test]
#[serial]
fn test_cli_overrides_file() {
    let toml_content = r#"
        log_level = "warn"
        [robot]
        env = "staging"
    "#;

    with_config_file(toml_content, |path| {
        let cli = cli_for(
            &path,
            &["--env", "canary", "--log-level", "trace", "--listen-addr", "127.0.0.1:7000"],
        );
        let settings = Settings::load(&cli).unwrap();

        assert_eq!(settings.robot.env, "canary");
        assert_eq!(settings.log_level, "trace");
        assert_eq!(settings.listen_addr, "127.0.0.1:7000".parse::<std::net::SocketAddr>().unwrap());
    });
}

#[test]
#[serial]
fn test_env_overrides_file() {
    let toml_content = r#"
        [robot.wecom]
        push_url = "https://from-file"
    "#;

    with_config_file(toml_content, |path| {
        std::env::set_var("PANICWATCH_ROBOT__WECOM__PUSH_URL", "https://from-env");
        let result = Settings::load(&cli_for(&path, &[]));
        std::env::remove_var("PANICWATCH_ROBOT__WECOM__PUSH_URL");

        assert_eq!(result.unwrap().robot.wecom.push_url, "https://from-env");
    });
}

#[test]
#[serial]
fn test_invalid_value_type() {
    let toml_content = r#"
        [robot]
        body_capture_limit = "lots"
    "#;

    with_config_file(toml_content, |path| {
        let result = Settings::load(&cli_for(&path, &[]));
        assert!(result.is_err());
    });
}

#[test]
#[serial]
fn test_non_existent_config_file() {
    let path = PathBuf::from("/path/to/non/existent/panicwatch.toml");
    let result = Settings::load(&cli_for(&path, &[]));
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Config file not found at specified path"));
}
