//! Groups and categories: named rows plus random membership relations.

use super::Injector;
use crate::batch::Batch;
use crate::error::InjectError;
use crate::executor::InsertStatement;
use crate::session::Session;
use async_trait::async_trait;
use injector_core::{
    EntityKind, InjectedIds, InjectionConfig, ProducedIds, RelationField, Row, SqlValue,
};
use injector_generator::pattern::numbered;
use injector_generator::Pool;
use rand::Rng;

/// What a group's members are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Members {
    Hosts,
    /// Relation rows carry the service only.
    Services,
    /// Relation rows carry the service and its host.
    HostServices,
}

/// Static description of one group kind.
#[derive(Debug)]
pub struct GroupInjector {
    kind: EntityKind,
    group: InsertStatement,
    id_column: &'static str,
    name_prefix: &'static str,
    alias_prefix: &'static str,
    relation: InsertStatement,
    members: Members,
    owned_tables: &'static [&'static str],
}

impl GroupInjector {
    pub fn hostgroup() -> Self {
        Self {
            kind: EntityKind::Hostgroup,
            group: InsertStatement::new("hostgroup", &["hg_id", "hg_name", "hg_alias"]),
            id_column: "hg_id",
            name_prefix: "hostgroup_name",
            alias_prefix: "hostgroup_alias",
            relation: InsertStatement::new(
                "hostgroup_relation",
                &["hostgroup_hg_id", "host_host_id"],
            ),
            members: Members::Hosts,
            owned_tables: &["hostgroup_relation", "hostgroup"],
        }
    }

    pub fn servicegroup() -> Self {
        Self {
            kind: EntityKind::Servicegroup,
            group: InsertStatement::new("servicegroup", &["sg_id", "sg_name", "sg_alias"]),
            id_column: "sg_id",
            name_prefix: "servicegroup_name",
            alias_prefix: "servicegroup_alias",
            relation: InsertStatement::new(
                "servicegroup_relation",
                &["servicegroup_sg_id", "host_host_id", "service_service_id"],
            ),
            members: Members::HostServices,
            owned_tables: &["servicegroup_relation", "servicegroup"],
        }
    }

    pub fn host_category() -> Self {
        Self {
            kind: EntityKind::HostCategory,
            group: InsertStatement::new("hostcategories", &["hc_id", "hc_name", "hc_alias"]),
            id_column: "hc_id",
            name_prefix: "host_category_name",
            alias_prefix: "host_category_alias",
            relation: InsertStatement::new(
                "hostcategories_relation",
                &["hostcategories_hc_id", "host_host_id"],
            ),
            members: Members::Hosts,
            owned_tables: &["hostcategories_relation", "hostcategories"],
        }
    }

    pub fn service_category() -> Self {
        Self {
            kind: EntityKind::ServiceCategory,
            group: InsertStatement::new(
                "service_categories",
                &["sc_id", "sc_name", "sc_description"],
            ),
            id_column: "sc_id",
            name_prefix: "service_category_name",
            alias_prefix: "service_category_alias",
            relation: InsertStatement::new(
                "service_categories_relation",
                &["sc_id", "service_service_id"],
            ),
            members: Members::Services,
            owned_tables: &["service_categories_relation", "service_categories"],
        }
    }

    /// Membership rows of one group.
    fn relation_rows<R: Rng>(
        &self,
        rng: &mut R,
        config: &InjectionConfig,
        injected: &InjectedIds,
        group_id: i64,
    ) -> Result<Vec<Row>, InjectError> {
        let empty_pool = InjectError::empty_pool(self.kind);
        let rows = match self.members {
            Members::Hosts => Pool::of(injected, EntityKind::Host)
                .fanout(
                    rng,
                    group_id,
                    config.relation(self.kind, RelationField::Hosts),
                )
                .map_err(empty_pool)?
                .into_iter()
                .map(|(group, host)| vec![SqlValue::Int(group), SqlValue::Int(host)])
                .collect(),
            Members::Services => Pool::services(injected)
                .fanout(
                    rng,
                    group_id,
                    config.relation(self.kind, RelationField::Services),
                )
                .map_err(empty_pool)?
                .into_iter()
                .map(|(group, pair)| vec![SqlValue::Int(group), SqlValue::Int(pair.service_id)])
                .collect(),
            Members::HostServices => Pool::services(injected)
                .fanout(
                    rng,
                    group_id,
                    config.relation(self.kind, RelationField::Services),
                )
                .map_err(empty_pool)?
                .into_iter()
                .map(|(group, pair)| {
                    vec![
                        SqlValue::Int(group),
                        SqlValue::Int(pair.host_id),
                        SqlValue::Int(pair.service_id),
                    ]
                })
                .collect(),
        };
        Ok(rows)
    }
}

#[async_trait]
impl Injector for GroupInjector {
    fn kind(&self) -> EntityKind {
        self.kind
    }

    fn owned_tables(&self) -> &'static [&'static str] {
        self.owned_tables
    }

    async fn inject(
        &self,
        session: &mut Session<'_>,
        config: &InjectionConfig,
        injected: &InjectedIds,
    ) -> Result<ProducedIds, InjectError> {
        let range = session
            .allocate(self.group.table, self.id_column, config.count(self.kind))
            .await?;

        let mut batch = Batch::new(
            &mut *session.executor,
            &[self.group, self.relation],
            session.batch_size,
        );
        for id in range.ids() {
            batch
                .push(
                    &self.group,
                    vec![
                        SqlValue::Int(id),
                        numbered(self.name_prefix, id).into(),
                        numbered(self.alias_prefix, id).into(),
                    ],
                )
                .await?;
            let relations = self.relation_rows(&mut session.rng, config, injected, id)?;
            batch.extend(&self.relation, relations).await?;
        }
        batch.finish().await?;

        Ok(range.into())
    }
}
