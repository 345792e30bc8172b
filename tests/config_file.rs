//! Configuration loading from files.

use injector_core::{Cardinality, ConfigError, EntityKind, InjectionConfig, RelationField};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_from_file() {
    let file = write_config(
        r#"
host:
  count: 100
hostgroup:
  count: 5
  hosts:
    min: 1
    max: 3
user:
  administrators: 1
  users: 4
poller:
  hosts_on_central: false
"#,
    );

    let config = InjectionConfig::from_file(file.path()).unwrap();

    assert_eq!(config.count(EntityKind::Host), 100);
    assert_eq!(config.count(EntityKind::User), 5);
    assert_eq!(config.count(EntityKind::Service), 0);
    assert!(!config.poller.hosts_on_central);
    assert_eq!(
        config.relation(EntityKind::Hostgroup, RelationField::Hosts),
        Cardinality::Range { min: 1, max: 3 }
    );
}

#[test]
fn test_unknown_section() {
    let file = write_config("hosts:\n  count: 3\n");

    let result = InjectionConfig::from_file(file.path());
    assert!(matches!(result, Err(ConfigError::UnknownSection(name)) if name == "hosts"));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = InjectionConfig::from_file(dir.path().join("data.yaml"));
    assert!(matches!(result, Err(ConfigError::IoError(_))));
}

#[test]
fn test_inverted_bounds() {
    let file = write_config("servicegroup:\n  count: 1\n  services:\n    min: 4\n    max: 2\n");

    let result = InjectionConfig::from_file(file.path());
    assert!(matches!(
        result,
        Err(ConfigError::InvalidBounds { field: "services", min: 4, max: 2, .. })
    ));
}

#[test]
fn test_unknown_user_field() {
    let file = write_config("user:\n  count: 10\n");
    let result = InjectionConfig::from_file(file.path());
    assert!(matches!(result, Err(ConfigError::YamlError(_))));
}
