use super::Injector;
use crate::error::InjectError;
use crate::executor::InsertStatement;
use crate::session::Session;
use async_trait::async_trait;
use injector_core::{EntityKind, InjectedIds, InjectionConfig, ProducedIds, SqlValue};
use injector_generator::pattern::numbered;

const ALL_DAY: &str = "00:00-24:00";

const TIMEPERIOD: InsertStatement = InsertStatement::new(
    "timeperiod",
    &[
        "tp_id",
        "tp_name",
        "tp_alias",
        "tp_monday",
        "tp_tuesday",
        "tp_wednesday",
        "tp_thursday",
        "tp_friday",
        "tp_saturday",
        "tp_sunday",
    ],
);

/// Time periods covering the whole week.
pub struct TimeperiodInjector;

#[async_trait]
impl Injector for TimeperiodInjector {
    fn kind(&self) -> EntityKind {
        EntityKind::Timeperiod
    }

    fn owned_tables(&self) -> &'static [&'static str] {
        &["timeperiod"]
    }

    async fn inject(
        &self,
        session: &mut Session<'_>,
        config: &InjectionConfig,
        _injected: &InjectedIds,
    ) -> Result<ProducedIds, InjectError> {
        let range = session
            .allocate(TIMEPERIOD.table, "tp_id", config.count(self.kind()))
            .await?;

        let rows = range
            .ids()
            .map(|id| {
                let mut row = vec![
                    SqlValue::Int(id),
                    numbered("tp_name", id).into(),
                    numbered("tp_alias", id).into(),
                ];
                row.extend((0..7).map(|_| SqlValue::text(ALL_DAY)));
                row
            });
        session.write_all(&TIMEPERIOD, rows).await?;

        Ok(range.into())
    }
}
