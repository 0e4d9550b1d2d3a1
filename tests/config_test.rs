//! Configuration loading integration tests

mod common;

use common::temp_config_file;
use palaver::config::Config;
use serial_test::serial;

#[test]
fn load_full_config_file() {
    let (_dir, path) = temp_config_file(
        r#"
server:
  realtime_addr: "chat.example.net:9000"
  api_url: "https://api.example.net"
  geocode_url: "https://geo.example.net"
  http_timeout_seconds: 10
chat:
  home_label: "Accueil"
  typing_idle_seconds: 5
  roster_refresh_seconds: 30
"#,
    );

    let config = Config::load(&path).unwrap();
    config.validate().unwrap();
    assert_eq!(config.server.realtime_addr, "chat.example.net:9000");
    assert_eq!(config.server.http_timeout_seconds, 10);
    assert_eq!(config.chat.home_label, "Accueil");
    assert_eq!(config.chat.typing_idle_seconds, 5);
}

#[test]
fn load_rejects_malformed_yaml() {
    let (_dir, path) = temp_config_file("server: [not, a, map");
    assert!(Config::load(&path).is_err());
}

#[test]
#[serial]
fn env_overrides_take_precedence() {
    let (_dir, path) = temp_config_file(
        r#"
server:
  realtime_addr: "file.example.net:9000"
"#,
    );

    std::env::set_var("PALAVER_SERVER_ADDR", "env.example.net:7000");
    std::env::set_var("PALAVER_API_URL", "https://env.example.net");
    let config = Config::load(&path).unwrap();
    std::env::remove_var("PALAVER_SERVER_ADDR");
    std::env::remove_var("PALAVER_API_URL");

    assert_eq!(config.server.realtime_addr, "env.example.net:7000");
    assert_eq!(config.server.api_url, "https://env.example.net");
}

#[test]
#[serial]
fn missing_file_falls_back_to_defaults() {
    let config = Config::load("/no/such/palaver/config.yaml").unwrap();
    config.validate().unwrap();
    assert_eq!(config.chat.home_label, "Home");
}
