//! Injection configuration loaded from YAML.
//!
//! The configuration is a map keyed by entity name. Every section is
//! optional; an absent section means nothing of that kind is injected.
//!
//! ```yaml
//! timeperiod:
//!   count: 10
//! command:
//!   count: 50
//!   metrics:
//!     min: 1
//!     max: 5
//! host:
//!   count: 1000
//! hostgroup:
//!   count: 20
//!   hosts:
//!     min: 0
//!     max: 10
//! acl_resource:
//!   count: 5
//!   hosts: 100
//!   servicegroups: 2
//! user:
//!   administrators: 1
//!   editors: 5
//!   users: 20
//! poller:
//!   hosts_on_central: false
//! ```

use crate::kind::EntityKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Default relation cardinality bounds.
pub const DEFAULT_RELATION_BOUNDS: (u64, u64) = (0, 5);

/// Default metric-count bounds for service-check commands.
pub const DEFAULT_METRIC_BOUNDS: (u64, u64) = (0, 10);

/// Error type for configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error reading configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Section name that is not an entity kind
    #[error("Unknown configuration section: {0}")]
    UnknownSection(String),

    /// Relation or metric bounds with min greater than max
    #[error("Invalid bounds for '{section}.{field}': min {min} is greater than max {max}")]
    InvalidBounds {
        section: String,
        field: &'static str,
        min: u64,
        max: u64,
    },
}

/// How many related rows each parent gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Exactly this many per parent.
    Fixed(u64),
    /// Drawn uniformly from `min..=max` per parent.
    Range { min: u64, max: u64 },
}

impl Cardinality {
    /// Largest count this cardinality can produce.
    pub fn max(&self) -> u64 {
        match self {
            Cardinality::Fixed(count) => *count,
            Cardinality::Range { max, .. } => *max,
        }
    }

    /// Smallest count this cardinality can produce.
    pub fn min(&self) -> u64 {
        match self {
            Cardinality::Fixed(count) => *count,
            Cardinality::Range { min, .. } => *min,
        }
    }
}

/// Raw bounds as written in the configuration file.
///
/// Accepts a bare integer (`hosts: 5`), a fixed count (`hosts: {count: 5}`)
/// or a range with optional ends (`hosts: {min: 1, max: 3}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bounds {
    Fixed(u64),
    Count {
        count: u64,
    },
    Range {
        #[serde(default)]
        min: Option<u64>,
        #[serde(default)]
        max: Option<u64>,
    },
}

impl Bounds {
    /// Resolve against defaults for missing range ends.
    pub fn resolve(&self, default: (u64, u64)) -> Cardinality {
        match *self {
            Bounds::Fixed(count) | Bounds::Count { count } => Cardinality::Fixed(count),
            Bounds::Range { min, max } => Cardinality::Range {
                min: min.unwrap_or(default.0),
                max: max.unwrap_or(default.1),
            },
        }
    }
}

/// Resolve optional bounds, falling back to a default range.
pub fn resolve_bounds(bounds: Option<&Bounds>, default: (u64, u64)) -> Cardinality {
    match bounds {
        Some(bounds) => bounds.resolve(default),
        None => Cardinality::Range {
            min: default.0,
            max: default.1,
        },
    }
}

/// Configuration of one entity kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntitySection {
    /// Rows to create.
    #[serde(default)]
    pub count: Option<u64>,

    /// Host relations per row (groups, categories, ACL resources).
    #[serde(default)]
    pub hosts: Option<Bounds>,

    /// Service relations per row (service groups and categories).
    #[serde(default)]
    pub services: Option<Bounds>,

    /// Service-group relations per ACL resource.
    #[serde(default)]
    pub servicegroups: Option<Bounds>,

    /// ACL resources per ACL group.
    #[serde(default)]
    pub resources: Option<Bounds>,

    /// Metric count embedded in service-check commands.
    #[serde(default)]
    pub metrics: Option<Bounds>,
}

/// Role-based user counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserSection {
    #[serde(default)]
    pub administrators: u64,
    #[serde(default)]
    pub editors: u64,
    #[serde(default)]
    pub users: u64,
}

impl UserSection {
    pub fn total(&self) -> u64 {
        self.administrators + self.editors + self.users
    }
}

/// Poller selection for hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PollerSection {
    /// When false, hosts are only attached to remote pollers.
    #[serde(default = "default_true", alias = "hostsOnCentral")]
    pub hosts_on_central: bool,
}

impl Default for PollerSection {
    fn default() -> Self {
        Self {
            hosts_on_central: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Complete injection configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InjectionConfig {
    #[serde(default)]
    pub poller: PollerSection,

    #[serde(default)]
    pub user: Option<UserSection>,

    /// Every other section, keyed by entity name.
    #[serde(flatten)]
    pub sections: BTreeMap<String, EntitySection>,
}

impl InjectionConfig {
    /// Load and validate configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: InjectionConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Build a configuration from `(kind, count)` pairs.
    pub fn with_counts(counts: &[(EntityKind, u64)]) -> Self {
        let mut config = Self::default();
        for (kind, count) in counts {
            config.set_count(*kind, *count);
        }
        config
    }

    /// Set the count of one kind, creating its section if needed.
    pub fn set_count(&mut self, kind: EntityKind, count: u64) {
        match kind {
            EntityKind::User => {
                let user = self.user.get_or_insert_with(UserSection::default);
                user.users = count;
            }
            _ => {
                self.sections
                    .entry(kind.as_str().to_string())
                    .or_default()
                    .count = Some(count);
            }
        }
    }

    /// Section of a kind, if configured.
    pub fn section(&self, kind: EntityKind) -> Option<&EntitySection> {
        self.sections.get(kind.as_str())
    }

    /// Mutable section of a kind, created on demand.
    pub fn section_mut(&mut self, kind: EntityKind) -> &mut EntitySection {
        self.sections.entry(kind.as_str().to_string()).or_default()
    }

    /// Rows requested for a kind.
    ///
    /// An `acl_menu` section without a `count` creates a single menu; every
    /// other kind defaults to zero.
    pub fn count(&self, kind: EntityKind) -> u64 {
        match kind {
            EntityKind::User => self.user.map(|u| u.total()).unwrap_or(0),
            EntityKind::AclMenu => self.section(kind).map_or(0, |s| s.count.unwrap_or(1)),
            _ => self.section(kind).and_then(|s| s.count).unwrap_or(0),
        }
    }

    /// Role counts for users.
    pub fn users(&self) -> UserSection {
        self.user.unwrap_or_default()
    }

    /// Resolved relation cardinality for `field` of a kind's section.
    pub fn relation(&self, kind: EntityKind, field: RelationField) -> Cardinality {
        let bounds = self.section(kind).and_then(|s| field.get(s));
        resolve_bounds(bounds, DEFAULT_RELATION_BOUNDS)
    }

    /// Resolved metric-count bounds for service-check commands.
    pub fn metrics(&self) -> Cardinality {
        let bounds = self
            .section(EntityKind::Command)
            .and_then(|s| s.metrics.as_ref());
        resolve_bounds(bounds, DEFAULT_METRIC_BOUNDS)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, section) in &self.sections {
            let kind: EntityKind = name
                .parse()
                .map_err(|_| ConfigError::UnknownSection(name.clone()))?;
            if kind == EntityKind::User {
                // `user` has its own section type.
                continue;
            }

            for field in RelationField::ALL {
                if let Some(Cardinality::Range { min, max }) =
                    field.get(section).map(|b| b.resolve(DEFAULT_RELATION_BOUNDS))
                {
                    if min > max {
                        return Err(ConfigError::InvalidBounds {
                            section: name.clone(),
                            field: field.as_str(),
                            min,
                            max,
                        });
                    }
                }
            }

            if let Some(Cardinality::Range { min, max }) =
                section.metrics.map(|b| b.resolve(DEFAULT_METRIC_BOUNDS))
            {
                if min > max {
                    return Err(ConfigError::InvalidBounds {
                        section: name.clone(),
                        field: "metrics",
                        min,
                        max,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Relation fields of an [`EntitySection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationField {
    Hosts,
    Services,
    Servicegroups,
    Resources,
}

impl RelationField {
    pub const ALL: [RelationField; 4] = [
        RelationField::Hosts,
        RelationField::Services,
        RelationField::Servicegroups,
        RelationField::Resources,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationField::Hosts => "hosts",
            RelationField::Services => "services",
            RelationField::Servicegroups => "servicegroups",
            RelationField::Resources => "resources",
        }
    }

    fn get<'a>(&self, section: &'a EntitySection) -> Option<&'a Bounds> {
        match self {
            RelationField::Hosts => section.hosts.as_ref(),
            RelationField::Services => section.services.as_ref(),
            RelationField::Servicegroups => section.servicegroups.as_ref(),
            RelationField::Resources => section.resources.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
timeperiod:
  count: 2
command:
  count: 3
  metrics:
    min: 1
    max: 4
host:
  count: 10
hostgroup:
  count: 2
  hosts:
    min: 2
    max: 2
host_category:
  count: 1
  hosts:
    count: 3
servicegroup:
  count: 1
  services:
    max: 7
acl_resource:
  count: 1
  hosts: 4
  servicegroups: 2
acl_menu: {}
user:
  administrators: 1
  editors: 2
  users: 3
poller:
  hostsOnCentral: false
"#;

    #[test]
    fn test_parse_sample() {
        let config = InjectionConfig::from_yaml(SAMPLE).unwrap();

        assert_eq!(config.count(EntityKind::Timeperiod), 2);
        assert_eq!(config.count(EntityKind::Host), 10);
        assert_eq!(config.count(EntityKind::Service), 0);
        assert_eq!(config.count(EntityKind::User), 6);
        assert!(!config.poller.hosts_on_central);
    }

    #[test]
    fn test_acl_menu_defaults_to_one_when_present() {
        let config = InjectionConfig::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.count(EntityKind::AclMenu), 1);

        let empty = InjectionConfig::from_yaml("host: {count: 1}").unwrap();
        assert_eq!(empty.count(EntityKind::AclMenu), 0);
    }

    #[test]
    fn test_bounds_forms() {
        let config = InjectionConfig::from_yaml(SAMPLE).unwrap();

        assert_eq!(
            config.relation(EntityKind::Hostgroup, RelationField::Hosts),
            Cardinality::Range { min: 2, max: 2 }
        );
        assert_eq!(
            config.relation(EntityKind::HostCategory, RelationField::Hosts),
            Cardinality::Fixed(3)
        );
        assert_eq!(
            config.relation(EntityKind::AclResource, RelationField::Hosts),
            Cardinality::Fixed(4)
        );
        // Missing min falls back to the default lower bound.
        assert_eq!(
            config.relation(EntityKind::Servicegroup, RelationField::Services),
            Cardinality::Range { min: 0, max: 7 }
        );
    }

    #[test]
    fn test_defaults_when_absent() {
        let config = InjectionConfig::default();
        assert_eq!(
            config.relation(EntityKind::Hostgroup, RelationField::Hosts),
            Cardinality::Range { min: 0, max: 5 }
        );
        assert_eq!(config.metrics(), Cardinality::Range { min: 0, max: 10 });
        assert!(config.poller.hosts_on_central);
        assert_eq!(config.count(EntityKind::User), 0);
    }

    #[test]
    fn test_metric_bounds() {
        let config = InjectionConfig::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.metrics(), Cardinality::Range { min: 1, max: 4 });
    }

    #[test]
    fn test_unknown_section_is_rejected() {
        let result = InjectionConfig::from_yaml("hosts:\n  count: 1\n");
        assert!(matches!(result, Err(ConfigError::UnknownSection(name)) if name == "hosts"));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result = InjectionConfig::from_yaml("user:\n  count: 10\n");
        assert!(matches!(result, Err(ConfigError::YamlError(_))));

        let result = InjectionConfig::from_yaml("host:\n  cout: 5\n");
        assert!(matches!(result, Err(ConfigError::YamlError(_))));

        let result = InjectionConfig::from_yaml("poller:\n  hostsOnCentral: false\n  remote: 2\n");
        assert!(matches!(result, Err(ConfigError::YamlError(_))));
    }

    #[test]
    fn test_inverted_bounds_are_rejected() {
        let result = InjectionConfig::from_yaml(
            "hostgroup:\n  count: 1\n  hosts:\n    min: 5\n    max: 1\n",
        );
        assert!(matches!(
            result,
            Err(ConfigError::InvalidBounds {
                field: "hosts",
                min: 5,
                max: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_with_counts() {
        let config = InjectionConfig::with_counts(&[
            (EntityKind::Timeperiod, 1),
            (EntityKind::Command, 1),
            (EntityKind::Host, 3),
        ]);
        assert_eq!(config.count(EntityKind::Timeperiod), 1);
        assert_eq!(config.count(EntityKind::Command), 1);
        assert_eq!(config.count(EntityKind::Host), 3);
        assert_eq!(config.count(EntityKind::Service), 0);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = InjectionConfig::from_file(file.path()).unwrap();
        assert_eq!(config.count(EntityKind::Command), 3);
    }

    #[test]
    fn test_missing_file() {
        let result = InjectionConfig::from_file("/nonexistent/data.yaml");
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }
}
