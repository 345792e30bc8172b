use super::service::HOST_SERVICE_RELATION;
use super::Injector;
use crate::batch::Batch;
use crate::error::InjectError;
use crate::executor::{Filter, InsertStatement};
use crate::session::Session;
use async_trait::async_trait;
use injector_core::{EntityKind, InjectedIds, InjectionConfig, ProducedIds, SqlValue};
use injector_generator::numeric::meta_thresholds;
use injector_generator::pattern::numbered;
use injector_generator::Pool;
use tracing::debug;

/// Name of the virtual host carrying meta-service checks.
pub const META_HOST_NAME: &str = "_Module_Meta";

const META_HOST: InsertStatement = InsertStatement::new(
    "host",
    &["host_id", "host_name", "host_register", "host_activate"],
);

const META_SERVICE: InsertStatement = InsertStatement::new(
    "meta_service",
    &[
        "meta_id",
        "meta_name",
        "meta_display",
        "metric",
        "calcul_type",
        "data_source_type",
        "meta_select_mode",
        "regexp_str",
        "check_period",
        "max_check_attempts",
        "normal_check_interval",
        "retry_check_interval",
        "notifications_enabled",
        "warning",
        "critical",
        "meta_activate",
    ],
);

const META_CHECK_SERVICE: InsertStatement = InsertStatement::new(
    "service",
    &[
        "service_id",
        "service_description",
        "display_name",
        "service_register",
        "service_activate",
    ],
);

/// Meta-services averaging a metric over services matched by name.
pub struct MetaserviceInjector;

impl MetaserviceInjector {
    /// Id of the virtual host, created when missing.
    async fn meta_host(session: &mut Session<'_>) -> Result<i64, InjectError> {
        let existing = session
            .select_ids("host", "host_id", &[Filter::eq("host_name", META_HOST_NAME)])
            .await?;
        if let Some(id) = existing.first() {
            return Ok(*id);
        }

        let id = session.allocate(META_HOST.table, "host_id", 1).await?.first;
        session
            .write_all(
                &META_HOST,
                vec![vec![
                    SqlValue::Int(id),
                    SqlValue::text(META_HOST_NAME),
                    SqlValue::flag(2),
                    SqlValue::flag(1),
                ]],
            )
            .await?;
        debug!("Created virtual host {} ({})", META_HOST_NAME, id);
        Ok(id)
    }
}

#[async_trait]
impl Injector for MetaserviceInjector {
    fn kind(&self) -> EntityKind {
        EntityKind::Metaservice
    }

    fn owned_tables(&self) -> &'static [&'static str] {
        &["meta_service"]
    }

    async fn inject(
        &self,
        session: &mut Session<'_>,
        config: &InjectionConfig,
        injected: &InjectedIds,
    ) -> Result<ProducedIds, InjectError> {
        let kind = self.kind();
        let count = config.count(kind);
        let services = Pool::services(injected);
        let timeperiods = Pool::of(injected, EntityKind::Timeperiod);

        let host_id = Self::meta_host(session).await?;
        let metas = session.allocate(META_SERVICE.table, "meta_id", count).await?;
        let checks = session
            .allocate(META_CHECK_SERVICE.table, "service_id", count)
            .await?;

        let mut batch = Batch::new(
            &mut *session.executor,
            &[META_SERVICE, META_CHECK_SERVICE, HOST_SERVICE_RELATION],
            session.batch_size,
        );
        let rng = &mut session.rng;
        for (meta_id, service_id) in metas.ids().zip(checks.ids()) {
            let matched = services.pick(rng).map_err(InjectError::empty_pool(kind))?;
            let check_period = timeperiods.pick(rng).map_err(InjectError::empty_pool(kind))?;
            let (warning, critical) = meta_thresholds(rng);

            batch
                .push(
                    &META_SERVICE,
                    vec![
                        SqlValue::Int(meta_id),
                        numbered("metaservice_name", meta_id).into(),
                        SqlValue::text("calculated value : %d"),
                        SqlValue::text("metric.1"),
                        SqlValue::text("AVE"),
                        SqlValue::Int(0),
                        SqlValue::flag(2),
                        SqlValue::text(format!("service_name_{}%", matched.service_id)),
                        SqlValue::Int(check_period),
                        SqlValue::Int(3),
                        SqlValue::Int(5),
                        SqlValue::Int(1),
                        SqlValue::flag(1),
                        SqlValue::Int(warning),
                        SqlValue::Int(critical),
                        SqlValue::flag(1),
                    ],
                )
                .await?;
            batch
                .push(
                    &META_CHECK_SERVICE,
                    vec![
                        SqlValue::Int(service_id),
                        numbered("meta", meta_id).into(),
                        numbered("metaservice_name", meta_id).into(),
                        SqlValue::flag(2),
                        SqlValue::flag(1),
                    ],
                )
                .await?;
            batch
                .push(
                    &HOST_SERVICE_RELATION,
                    vec![SqlValue::Int(host_id), SqlValue::Int(service_id)],
                )
                .await?;
        }
        batch.finish().await?;

        Ok(metas.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryExecutor;
    use injector_core::HostServicePair;

    fn dependencies() -> InjectedIds {
        let mut injected = InjectedIds::new();
        injected
            .record(EntityKind::Timeperiod, vec![1].into())
            .unwrap();
        injected
            .record(
                EntityKind::Service,
                ProducedIds::HostServices(vec![HostServicePair {
                    host_id: 1,
                    service_id: 2,
                }]),
            )
            .unwrap();
        injected
    }

    #[tokio::test]
    async fn test_meta_services_on_virtual_host() {
        let mut executor = MemoryExecutor::centreon();
        executor.seed("host", &[("host_id", SqlValue::Int(1))]);
        executor.seed("service", &[("service_id", SqlValue::Int(2))]);
        let config = InjectionConfig::with_counts(&[(EntityKind::Metaservice, 2)]);

        let produced = {
            let mut session = Session::new(&mut executor, 100, Some(5));
            MetaserviceInjector
                .inject(&mut session, &config, &dependencies())
                .await
                .unwrap()
        };
        assert_eq!(produced, ProducedIds::Keys(vec![1, 2]));

        // Virtual host allocated after the existing one.
        let host = &executor.rows("host")[1];
        assert_eq!(host["host_id"], SqlValue::Int(2));
        assert_eq!(host["host_register"], SqlValue::flag(2));

        let meta = &executor.rows("meta_service")[0];
        assert_eq!(meta["regexp_str"], SqlValue::text("service_name_2%"));
        let warning = meta["warning"].as_i64().unwrap();
        let critical = meta["critical"].as_i64().unwrap();
        assert_eq!(warning, critical * 80 / 100);

        assert_eq!(
            executor.column("service", "service_description")[1..],
            [SqlValue::text("meta_1"), SqlValue::text("meta_2")]
        );
        assert_eq!(executor.ids("host_service_relation", "host_host_id"), vec![2, 2]);
        assert_eq!(executor.ids("host_service_relation", "service_service_id"), vec![3, 4]);
    }

    #[tokio::test]
    async fn test_existing_virtual_host_is_reused() {
        let mut executor = MemoryExecutor::centreon();
        executor.seed(
            "host",
            &[
                ("host_id", SqlValue::Int(40)),
                ("host_name", SqlValue::text(META_HOST_NAME)),
            ],
        );
        let config = InjectionConfig::with_counts(&[(EntityKind::Metaservice, 1)]);
        {
            let mut session = Session::new(&mut executor, 100, Some(5));
            MetaserviceInjector
                .inject(&mut session, &config, &dependencies())
                .await
                .unwrap();
        }

        assert_eq!(executor.row_count("host"), 1);
        assert_eq!(executor.ids("host_service_relation", "host_host_id"), vec![40]);
    }
}
