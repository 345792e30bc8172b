use super::Injector;
use crate::batch::Batch;
use crate::error::InjectError;
use crate::executor::InsertStatement;
use crate::session::Session;
use async_trait::async_trait;
use injector_core::{
    EntityKind, InjectedIds, InjectionConfig, ProducedIds, RelationField, SqlValue,
};
use injector_generator::numeric::draw_count;
use injector_generator::pattern::numbered;
use injector_generator::Pool;

const ACL_GROUP: InsertStatement = InsertStatement::new(
    "acl_groups",
    &[
        "acl_group_id",
        "acl_group_name",
        "acl_group_alias",
        "acl_group_activate",
    ],
);

const ACL_GROUP_RESOURCE: InsertStatement =
    InsertStatement::new("acl_res_group_relations", &["acl_group_id", "acl_res_id"]);

const ACL_GROUP_TOPOLOGY: InsertStatement = InsertStatement::new(
    "acl_group_topology_relations",
    &["acl_group_id", "acl_topology_id"],
);

/// ACL groups bundling the first resources and every injected menu.
pub struct AclGroupInjector;

#[async_trait]
impl Injector for AclGroupInjector {
    fn kind(&self) -> EntityKind {
        EntityKind::AclGroup
    }

    fn owned_tables(&self) -> &'static [&'static str] {
        &[
            "acl_group_topology_relations",
            "acl_res_group_relations",
            "acl_groups",
        ]
    }

    async fn inject(
        &self,
        session: &mut Session<'_>,
        config: &InjectionConfig,
        injected: &InjectedIds,
    ) -> Result<ProducedIds, InjectError> {
        let kind = self.kind();
        let resources = Pool::of(injected, EntityKind::AclResource);
        let menus = injected.keys(EntityKind::AclMenu);
        let resource_count = config.relation(kind, RelationField::Resources);

        let range = session
            .allocate(ACL_GROUP.table, "acl_group_id", config.count(kind))
            .await?;

        let mut batch = Batch::new(
            &mut *session.executor,
            &[ACL_GROUP, ACL_GROUP_RESOURCE, ACL_GROUP_TOPOLOGY],
            session.batch_size,
        );
        for id in range.ids() {
            batch
                .push(
                    &ACL_GROUP,
                    vec![
                        SqlValue::Int(id),
                        numbered("acl_group_name", id).into(),
                        numbered("acl_group_name", id).into(),
                        SqlValue::flag(1),
                    ],
                )
                .await?;

            let granted = resources.first_n(draw_count(&mut session.rng, resource_count));
            batch
                .extend(
                    &ACL_GROUP_RESOURCE,
                    granted
                        .iter()
                        .copied().map(|resource| vec![SqlValue::Int(id), SqlValue::Int(resource)]),
                )
                .await?;
            batch
                .extend(
                    &ACL_GROUP_TOPOLOGY,
                    menus
                        .iter()
                        .copied().map(|menu| vec![SqlValue::Int(id), SqlValue::Int(menu)]),
                )
                .await?;
        }
        batch.finish().await?;

        Ok(range.into())
    }
}
