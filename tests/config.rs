// ABOUTME: Integration tests for configuration bootstrap, parsing guards,
// ABOUTME: and the init scaffolding command.

use golive::config::{
    ConfigError, EnvironmentMap, StorageMap, default_environments, default_storage_map,
    init_config, load_or_bootstrap, load_project_config,
};
use std::collections::BTreeMap;
use std::fs;

mod bootstrap {
    use super::*;

    #[test]
    fn absent_file_is_created_with_pretty_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(".golive").join("environments.json");

        let loaded: EnvironmentMap = load_or_bootstrap(&path, &default_environments()).unwrap();

        assert_eq!(loaded, default_environments());
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains('\n'), "bootstrap output should be indented");
        assert!(written.contains("\"_tagged\""));
    }

    #[test]
    fn existing_file_short_circuits_generation() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("storages.json");
        fs::write(&path, r#"{"/uploads": "uploads"}"#).unwrap();

        let loaded: StorageMap = load_or_bootstrap(&path, &default_storage_map()).unwrap();

        let expected: StorageMap =
            BTreeMap::from([("/uploads".to_string(), "uploads".to_string())]);
        assert_eq!(loaded, expected);

        // The differing default must not be merged in or rewritten.
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, r#"{"/uploads": "uploads"}"#);
    }

    #[test]
    fn second_invocation_with_other_default_returns_first_content() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("environments.json");

        let first: EnvironmentMap = load_or_bootstrap(&path, &default_environments()).unwrap();

        let other_default: EnvironmentMap = BTreeMap::new();
        let second: EnvironmentMap = load_or_bootstrap(&path, &other_default).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn round_trip_preserves_keys_and_values() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("storages.json");

        let loaded: StorageMap = load_or_bootstrap(&path, &default_storage_map()).unwrap();

        assert_eq!(loaded, default_storage_map());
        assert_eq!(loaded["/storage"], "framework");
        assert_eq!(loaded.len(), 6);
    }
}

mod guards {
    use super::*;

    #[test]
    fn malformed_json_is_corrupt_not_repaired() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("environments.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_or_bootstrap::<EnvironmentMap>(&path, &default_environments()).unwrap_err();

        assert!(matches!(err, ConfigError::Corrupt { .. }));
        // The malformed file must survive untouched.
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn nesting_beyond_sixteen_levels_is_corrupt() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("deep.json");
        let deep = format!("{}1{}", "[".repeat(17), "]".repeat(17));
        fs::write(&path, deep).unwrap();

        let err =
            load_or_bootstrap::<serde_json::Value>(&path, &serde_json::Value::Null).unwrap_err();

        assert!(matches!(err, ConfigError::Corrupt { .. }));
        assert!(err.to_string().contains("nesting"));
    }

    #[test]
    fn sixteen_levels_still_parse() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("ok.json");
        let nested = format!("{}1{}", "[".repeat(16), "]".repeat(16));
        fs::write(&path, nested).unwrap();

        let value: serde_json::Value =
            load_or_bootstrap(&path, &serde_json::Value::Null).unwrap();
        assert!(value.is_array());
    }
}

mod scaffolding {
    use super::*;

    #[test]
    fn init_creates_both_documents() {
        let temp = tempfile::tempdir().unwrap();

        init_config(temp.path(), false).unwrap();

        let config_dir = temp.path().join(".golive");
        assert!(config_dir.join("environments.json").is_file());
        assert!(config_dir.join("storages.json").is_file());

        let (environments, storages) = load_project_config(temp.path()).unwrap();
        assert_eq!(environments, default_environments());
        assert_eq!(storages, default_storage_map());
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let temp = tempfile::tempdir().unwrap();
        let config_dir = temp.path().join(".golive");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join("environments.json"), "{}").unwrap();

        let err = init_config(temp.path(), false).unwrap_err();
        assert!(matches!(err, ConfigError::AlreadyExists(_)));
        assert_eq!(
            fs::read_to_string(config_dir.join("environments.json")).unwrap(),
            "{}"
        );
    }

    #[test]
    fn init_force_overwrites() {
        let temp = tempfile::tempdir().unwrap();
        let config_dir = temp.path().join(".golive");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join("environments.json"), "{}").unwrap();

        init_config(temp.path(), true).unwrap();

        let (environments, _) = load_project_config(temp.path()).unwrap();
        assert_eq!(environments, default_environments());
    }
}
