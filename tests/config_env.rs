use publist_sync::config::Config;
use serial_test::serial;

#[test]
#[serial]
fn defaults_point_at_the_institutional_api() {
    std::env::remove_var("PURE_BASE_URL");
    std::env::remove_var("PURE_PROJECT_ID");

    let config = Config::from_env();
    assert_eq!(config.base_url, "https://api-pure.soton.ac.uk");
    assert_eq!(config.project_id, "520617");
}

#[test]
#[serial]
fn environment_overrides_take_precedence() {
    std::env::set_var("PURE_BASE_URL", "http://localhost:8080");
    std::env::set_var("PURE_PROJECT_ID", "42");

    let config = Config::from_env();
    assert_eq!(config.base_url, "http://localhost:8080");
    assert_eq!(config.project_id, "42");

    std::env::remove_var("PURE_BASE_URL");
    std::env::remove_var("PURE_PROJECT_ID");
}
