use localmq::config::load_config;
use localmq::Config;

#[test]
fn load_config_matches_toml() {
    let cfg: Config = load_config("localmq.toml").expect("failed to load config");

    assert_eq!(cfg.dispatcher.worker_threads, 4);
    assert_eq!(cfg.dispatcher.thread_name, "localmq-worker");
    assert!(!cfg.dispatcher.dedicated_pool);
    assert!(cfg.dispatcher.capture_call_site());
    assert_eq!(cfg.logging.filter, "info");
    assert!(cfg.logging.ansi);
}

#[test]
fn missing_file_is_an_error() {
    assert!(load_config("does-not-exist.toml").is_err());
}
