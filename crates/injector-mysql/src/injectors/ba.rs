use super::Injector;
use crate::batch::Batch;
use crate::error::InjectError;
use crate::executor::{Filter, InsertStatement};
use crate::session::Session;
use async_trait::async_trait;
use injector_core::{EntityKind, InjectedIds, InjectionConfig, ProducedIds, SqlValue};
use injector_generator::numeric::{ba_levels, int_range};
use injector_generator::pattern::numbered;
use injector_generator::Pool;

const BA: InsertStatement = InsertStatement::new(
    "mod_bam",
    &[
        "ba_id",
        "name",
        "description",
        "state_source",
        "level_w",
        "level_c",
        "event_handler_enabled",
        "notifications_enabled",
        "id_notification_period",
        "id_reporting_period",
        "activate",
    ],
);

const BA_POLLER_RELATION: InsertStatement =
    InsertStatement::new("mod_bam_poller_relations", &["ba_id", "poller_id"]);

/// Business activities computed on the central poller.
pub struct BaInjector;

#[async_trait]
impl Injector for BaInjector {
    fn kind(&self) -> EntityKind {
        EntityKind::Ba
    }

    fn owned_tables(&self) -> &'static [&'static str] {
        &["mod_bam_poller_relations", "mod_bam"]
    }

    async fn inject(
        &self,
        session: &mut Session<'_>,
        config: &InjectionConfig,
        injected: &InjectedIds,
    ) -> Result<ProducedIds, InjectError> {
        let kind = self.kind();
        let timeperiods = Pool::of(injected, EntityKind::Timeperiod);

        let central = session
            .select_ids("nagios_server", "id", &[Filter::eq("localhost", SqlValue::flag(1))])
            .await?;
        let Some(&central) = central.first() else {
            return Err(InjectError::NoPollerAvailable { kind });
        };

        let range = session
            .allocate(BA.table, "ba_id", config.count(kind))
            .await?;

        let mut batch = Batch::new(
            &mut *session.executor,
            &[BA, BA_POLLER_RELATION],
            session.batch_size,
        );
        for id in range.ids() {
            let calculation_type = int_range(&mut session.rng, 0, 4);
            let (warning, critical) = ba_levels(calculation_type);
            let notification_period = timeperiods
                .pick(&mut session.rng)
                .map_err(InjectError::empty_pool(kind))?;
            let reporting_period = timeperiods
                .pick(&mut session.rng)
                .map_err(InjectError::empty_pool(kind))?;

            batch
                .push(
                    &BA,
                    vec![
                        SqlValue::Int(id),
                        numbered("ba_name", id).into(),
                        numbered("ba_description", id).into(),
                        SqlValue::Int(calculation_type),
                        SqlValue::Int(warning),
                        SqlValue::Int(critical),
                        SqlValue::flag(0),
                        SqlValue::flag(0),
                        SqlValue::Int(notification_period),
                        SqlValue::Int(reporting_period),
                        SqlValue::flag(1),
                    ],
                )
                .await?;
            batch
                .push(
                    &BA_POLLER_RELATION,
                    vec![SqlValue::Int(id), SqlValue::Int(central)],
                )
                .await?;
        }
        batch.finish().await?;

        Ok(range.into())
    }
}
