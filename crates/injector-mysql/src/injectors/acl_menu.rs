use super::Injector;
use crate::batch::Batch;
use crate::error::InjectError;
use crate::executor::InsertStatement;
use crate::session::Session;
use async_trait::async_trait;
use injector_core::{EntityKind, InjectedIds, InjectionConfig, ProducedIds, SqlValue};
use injector_generator::pattern::numbered;

const ACL_TOPOLOGY: InsertStatement = InsertStatement::new(
    "acl_topology",
    &[
        "acl_topo_id",
        "acl_topo_name",
        "acl_topo_alias",
        "acl_topo_activate",
    ],
);

const ACL_TOPOLOGY_RELATION: InsertStatement = InsertStatement::new(
    "acl_topology_relations",
    &["topology_topology_id", "acl_topo_id", "access_right"],
);

/// Full read/write access to every menu entry.
const ACCESS_READ_WRITE: i64 = 1;

/// ACL menus granting access to the whole interface.
pub struct AclMenuInjector;

#[async_trait]
impl Injector for AclMenuInjector {
    fn kind(&self) -> EntityKind {
        EntityKind::AclMenu
    }

    fn owned_tables(&self) -> &'static [&'static str] {
        &["acl_topology_relations", "acl_topology"]
    }

    async fn inject(
        &self,
        session: &mut Session<'_>,
        config: &InjectionConfig,
        _injected: &InjectedIds,
    ) -> Result<ProducedIds, InjectError> {
        let range = session
            .allocate(ACL_TOPOLOGY.table, "acl_topo_id", config.count(self.kind()))
            .await?;
        let topology = session.select_ids("topology", "topology_id", &[]).await?;

        let mut batch = Batch::new(
            &mut *session.executor,
            &[ACL_TOPOLOGY, ACL_TOPOLOGY_RELATION],
            session.batch_size,
        );
        for id in range.ids() {
            batch
                .push(
                    &ACL_TOPOLOGY,
                    vec![
                        SqlValue::Int(id),
                        numbered("acl_menu", id).into(),
                        numbered("acl_menu", id).into(),
                        SqlValue::flag(1),
                    ],
                )
                .await?;
            let relations = topology.iter().copied().map(|entry| {
                vec![
                    SqlValue::Int(entry),
                    SqlValue::Int(id),
                    SqlValue::Int(ACCESS_READ_WRITE),
                ]
            });
            batch.extend(&ACL_TOPOLOGY_RELATION, relations).await?;
        }
        batch.finish().await?;

        Ok(range.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryExecutor;

    #[tokio::test]
    async fn test_menu_covers_every_topology_entry() {
        let mut executor = MemoryExecutor::centreon();
        let config = InjectionConfig::from_yaml("acl_menu: {}\n").unwrap();
        assert_eq!(config.count(EntityKind::AclMenu), 1);
        {
            let mut session = Session::new(&mut executor, 100, Some(1));
            AclMenuInjector
                .inject(&mut session, &config, &InjectedIds::new())
                .await
                .unwrap();
        }

        assert_eq!(executor.row_count("acl_topology"), 1);
        assert_eq!(
            executor.ids("acl_topology_relations", "topology_topology_id"),
            vec![1, 2, 3]
        );
        assert_eq!(executor.ids("acl_topology_relations", "acl_topo_id"), vec![1; 3]);
    }
}
