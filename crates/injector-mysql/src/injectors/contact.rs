use super::Injector;
use crate::batch::Batch;
use crate::error::InjectError;
use crate::executor::InsertStatement;
use crate::session::Session;
use async_trait::async_trait;
use injector_core::{EntityKind, InjectedIds, InjectionConfig, ProducedIds, SqlValue};
use injector_generator::pattern::{numbered, render};
use injector_generator::Pool;

const CONTACT: InsertStatement = InsertStatement::new(
    "contact",
    &[
        "contact_id",
        "contact_name",
        "contact_alias",
        "contact_email",
        "contact_oreon",
        "reach_api",
        "reach_api_rt",
        "contact_admin",
        "timeperiod_tp_id",
        "timeperiod_tp_id2",
    ],
);

/// Notification contacts without interface access.
///
/// Names are numbered from 1 within the run, independently of the ids.
pub struct ContactInjector;

#[async_trait]
impl Injector for ContactInjector {
    fn kind(&self) -> EntityKind {
        EntityKind::Contact
    }

    fn owned_tables(&self) -> &'static [&'static str] {
        &["contact"]
    }

    async fn inject(
        &self,
        session: &mut Session<'_>,
        config: &InjectionConfig,
        injected: &InjectedIds,
    ) -> Result<ProducedIds, InjectError> {
        let timeperiods = Pool::of(injected, EntityKind::Timeperiod);
        let range = session
            .allocate(CONTACT.table, "contact_id", config.count(self.kind()))
            .await?;

        let mut batch = Batch::new(&mut *session.executor, &[CONTACT], session.batch_size);
        for (index, id) in (1..).zip(range.ids()) {
            let host_period = timeperiods
                .pick(&mut session.rng)
                .map_err(InjectError::empty_pool(self.kind()))?;
            let service_period = timeperiods
                .pick(&mut session.rng)
                .map_err(InjectError::empty_pool(self.kind()))?;
            batch
                .push(
                    &CONTACT,
                    vec![
                        SqlValue::Int(id),
                        numbered("contact_name", index).into(),
                        numbered("contact_alias", index).into(),
                        render("contact_alias_{index}@localhost", index).into(),
                        SqlValue::flag(0),
                        SqlValue::Int(0),
                        SqlValue::Int(0),
                        SqlValue::flag(0),
                        SqlValue::Int(host_period),
                        SqlValue::Int(service_period),
                    ],
                )
                .await?;
        }
        batch.finish().await?;

        Ok(range.into())
    }
}
