use super::Injector;
use crate::batch::Batch;
use crate::error::InjectError;
use crate::executor::InsertStatement;
use crate::session::Session;
use async_trait::async_trait;
use injector_core::{EntityKind, InjectedIds, InjectionConfig, ProducedIds, SqlValue};
use injector_generator::Pool;

const KPI: InsertStatement = InsertStatement::new(
    "mod_bam_kpi",
    &[
        "kpi_id",
        "id_ba",
        "state_type",
        "kpi_type",
        "config_type",
        "host_id",
        "service_id",
        "drop_warning",
        "drop_critical",
        "drop_unknown",
        "activate",
    ],
);

/// Service indicators impacting a random business activity.
pub struct KpiInjector;

#[async_trait]
impl Injector for KpiInjector {
    fn kind(&self) -> EntityKind {
        EntityKind::Kpi
    }

    fn owned_tables(&self) -> &'static [&'static str] {
        &["mod_bam_kpi"]
    }

    async fn inject(
        &self,
        session: &mut Session<'_>,
        config: &InjectionConfig,
        injected: &InjectedIds,
    ) -> Result<ProducedIds, InjectError> {
        let kind = self.kind();
        let activities = Pool::of(injected, EntityKind::Ba);
        let services = Pool::services(injected);

        let range = session
            .allocate(KPI.table, "kpi_id", config.count(kind))
            .await?;

        let mut batch = Batch::new(&mut *session.executor, &[KPI], session.batch_size);
        for id in range.ids() {
            let ba = activities
                .pick(&mut session.rng)
                .map_err(InjectError::empty_pool(kind))?;
            let service = services
                .pick(&mut session.rng)
                .map_err(InjectError::empty_pool(kind))?;
            batch
                .push(
                    &KPI,
                    vec![
                        SqlValue::Int(id),
                        SqlValue::Int(ba),
                        SqlValue::flag(1),
                        SqlValue::flag(0),
                        SqlValue::flag(0),
                        SqlValue::Int(service.host_id),
                        SqlValue::Int(service.service_id),
                        SqlValue::Int(10),
                        SqlValue::Int(20),
                        SqlValue::Int(5),
                        SqlValue::flag(1),
                    ],
                )
                .await?;
        }
        batch.finish().await?;

        Ok(range.into())
    }
}
