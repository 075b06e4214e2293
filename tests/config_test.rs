//! Configuration loading tests: env vars and the templates file.

use feedback_jobs::config::{Config, load_templates};

const REQUIRED_VARS: [&str; 4] = [
    "FEEDBACK_OUTER_API_BASE_URL",
    "FEEDBACK_OUTER_API_KEY",
    "EMPLOYER_ACCOUNTS_BASE_URL",
    "EMPLOYER_FEEDBACK_BASE_URL",
];

#[test]
fn config_from_env_requires_and_defaults() {
    // Without the required vars, loading fails fast.
    unsafe {
        for var in REQUIRED_VARS {
            std::env::remove_var(var);
        }
    }
    assert!(Config::from_env().is_err());

    // With them set, everything else falls back to defaults.
    unsafe {
        std::env::set_var("FEEDBACK_OUTER_API_BASE_URL", "http://localhost:8080");
        std::env::set_var("FEEDBACK_OUTER_API_KEY", "test-key");
        std::env::set_var("EMPLOYER_ACCOUNTS_BASE_URL", "https://accounts.example");
        std::env::set_var("EMPLOYER_FEEDBACK_BASE_URL", "https://feedback.example");
    }

    let config = Config::from_env().unwrap();
    assert_eq!(config.generate_transactions_batch_size, 500);
    assert_eq!(config.generate_transactions_max_parallelism, 10);
    assert_eq!(config.process_emails_per_second_cap, 55);
    assert_eq!(config.process_emails_wave_delay.as_millis(), 1000);
    assert!(config.notification_templates.is_empty());
    assert!(!config.log_level.is_empty());

    // A non-numeric tuning var is a config error, not a silent default.
    unsafe {
        std::env::set_var("GENERATE_TRANSACTIONS_BATCH_SIZE", "lots");
    }
    assert!(Config::from_env().is_err());

    // Clean up
    unsafe {
        std::env::remove_var("GENERATE_TRANSACTIONS_BATCH_SIZE");
        for var in REQUIRED_VARS {
            std::env::remove_var(var);
        }
    }
}

#[test]
fn templates_file_loads_entries() {
    let path = std::env::temp_dir().join(format!("fbjobs-templates-{}.toml", std::process::id()));
    std::fs::write(
        &path,
        r#"
[[templates]]
name = "three-month"
id = "6ba7b810-9dad-11d1-80b4-00c04fd430c8"

[[templates]]
name = "twelve-month"
id = "6ba7b811-9dad-11d1-80b4-00c04fd430c8"
"#,
    )
    .unwrap();

    let templates = load_templates(&path).unwrap();
    assert_eq!(templates.len(), 2);
    assert_eq!(templates[0].name, "three-month");
    assert_eq!(
        templates[1].id.to_string(),
        "6ba7b811-9dad-11d1-80b4-00c04fd430c8"
    );

    std::fs::remove_file(&path).ok();
}

#[test]
fn missing_templates_file_is_a_config_error() {
    let path = std::env::temp_dir().join("fbjobs-templates-does-not-exist.toml");
    assert!(load_templates(&path).is_err());
}

#[test]
fn malformed_templates_file_is_a_config_error() {
    let path =
        std::env::temp_dir().join(format!("fbjobs-templates-bad-{}.toml", std::process::id()));
    std::fs::write(&path, "[[templates]]\nname = 42\n").unwrap();

    assert!(load_templates(&path).is_err());

    std::fs::remove_file(&path).ok();
}
