//! Entity kinds and the optional modules that gate some of them.

use std::fmt;
use std::str::FromStr;

/// Every entity type the injector can create.
///
/// The string form (see [`EntityKind::as_str`]) is both the configuration
/// section key and the key of the injected-id map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityKind {
    Timeperiod,
    Command,
    Contact,
    Host,
    Service,
    Metaservice,
    Hostgroup,
    Servicegroup,
    HostCategory,
    ServiceCategory,
    Ba,
    Kpi,
    HostDiscoJob,
    AclMenu,
    AclResource,
    AclGroup,
    User,
}

impl EntityKind {
    /// All kinds, in declaration order.
    pub const ALL: [EntityKind; 17] = [
        EntityKind::Timeperiod,
        EntityKind::Command,
        EntityKind::Contact,
        EntityKind::Host,
        EntityKind::Service,
        EntityKind::Metaservice,
        EntityKind::Hostgroup,
        EntityKind::Servicegroup,
        EntityKind::HostCategory,
        EntityKind::ServiceCategory,
        EntityKind::Ba,
        EntityKind::Kpi,
        EntityKind::HostDiscoJob,
        EntityKind::AclMenu,
        EntityKind::AclResource,
        EntityKind::AclGroup,
        EntityKind::User,
    ];

    /// Stable name used as configuration key and id-map key.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Timeperiod => "timeperiod",
            EntityKind::Command => "command",
            EntityKind::Contact => "contact",
            EntityKind::Host => "host",
            EntityKind::Service => "service",
            EntityKind::Metaservice => "metaservice",
            EntityKind::Hostgroup => "hostgroup",
            EntityKind::Servicegroup => "servicegroup",
            EntityKind::HostCategory => "host_category",
            EntityKind::ServiceCategory => "service_category",
            EntityKind::Ba => "ba",
            EntityKind::Kpi => "kpi",
            EntityKind::HostDiscoJob => "host_disco_job",
            EntityKind::AclMenu => "acl_menu",
            EntityKind::AclResource => "acl_resource",
            EntityKind::AclGroup => "acl_group",
            EntityKind::User => "user",
        }
    }

    /// Optional module that must be installed for this kind to be injected.
    pub fn capability(&self) -> Option<Capability> {
        match self {
            EntityKind::Ba | EntityKind::Kpi => Some(Capability::Bam),
            EntityKind::HostDiscoJob => Some(Capability::HostDiscovery),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown entity name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown entity kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for EntityKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// Optional product module whose presence gates some injectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    /// Business activity monitoring (`ba`, `kpi`).
    Bam,
    /// Host auto-discovery (`host_disco_job`).
    HostDiscovery,
}

impl Capability {
    /// Name of the module as registered in `modules_informations`.
    pub fn module_name(&self) -> &'static str {
        match self {
            Capability::Bam => "centreon-bam-server",
            Capability::HostDiscovery => "centreon-autodiscovery-server",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.module_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_through_from_str() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.as_str().parse::<EntityKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_name() {
        let err = "hosts".parse::<EntityKind>().unwrap_err();
        assert_eq!(err, UnknownKind("hosts".to_string()));
    }

    #[test]
    fn test_gated_kinds() {
        let gated: Vec<_> = EntityKind::ALL
            .iter()
            .filter(|k| k.capability().is_some())
            .collect();
        assert_eq!(
            gated,
            vec![&EntityKind::Ba, &EntityKind::Kpi, &EntityKind::HostDiscoJob]
        );
    }
}
