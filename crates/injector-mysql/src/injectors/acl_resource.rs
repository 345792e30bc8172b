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

const ACL_RESOURCE: InsertStatement = InsertStatement::new(
    "acl_resources",
    &[
        "acl_res_id",
        "acl_res_name",
        "acl_res_alias",
        "acl_res_activate",
    ],
);

const ACL_RESOURCE_HOST: InsertStatement =
    InsertStatement::new("acl_resources_host_relations", &["acl_res_id", "host_host_id"]);

const ACL_RESOURCE_SERVICEGROUP: InsertStatement =
    InsertStatement::new("acl_resources_sg_relations", &["acl_res_id", "sg_id"]);

/// ACL resources granting the first injected hosts and service groups.
pub struct AclResourceInjector;

#[async_trait]
impl Injector for AclResourceInjector {
    fn kind(&self) -> EntityKind {
        EntityKind::AclResource
    }

    fn owned_tables(&self) -> &'static [&'static str] {
        &[
            "acl_resources_sg_relations",
            "acl_resources_host_relations",
            "acl_resources",
        ]
    }

    async fn inject(
        &self,
        session: &mut Session<'_>,
        config: &InjectionConfig,
        injected: &InjectedIds,
    ) -> Result<ProducedIds, InjectError> {
        let kind = self.kind();
        let hosts = Pool::of(injected, EntityKind::Host);
        let servicegroups = Pool::of(injected, EntityKind::Servicegroup);
        let host_count = config.relation(kind, RelationField::Hosts);
        let servicegroup_count = config.relation(kind, RelationField::Servicegroups);

        let range = session
            .allocate(ACL_RESOURCE.table, "acl_res_id", config.count(kind))
            .await?;

        let mut batch = Batch::new(
            &mut *session.executor,
            &[ACL_RESOURCE, ACL_RESOURCE_HOST, ACL_RESOURCE_SERVICEGROUP],
            session.batch_size,
        );
        for id in range.ids() {
            batch
                .push(
                    &ACL_RESOURCE,
                    vec![
                        SqlValue::Int(id),
                        numbered("acl_resource_name", id).into(),
                        numbered("acl_resource_name", id).into(),
                        SqlValue::flag(1),
                    ],
                )
                .await?;

            let granted = hosts.first_n(draw_count(&mut session.rng, host_count));
            batch
                .extend(
                    &ACL_RESOURCE_HOST,
                    granted
                        .iter()
                        .copied().map(|host| vec![SqlValue::Int(id), SqlValue::Int(host)]),
                )
                .await?;

            let granted = servicegroups.first_n(draw_count(&mut session.rng, servicegroup_count));
            batch
                .extend(
                    &ACL_RESOURCE_SERVICEGROUP,
                    granted
                        .iter()
                        .copied().map(|sg| vec![SqlValue::Int(id), SqlValue::Int(sg)]),
                )
                .await?;
        }
        batch.finish().await?;

        Ok(range.into())
    }
}
