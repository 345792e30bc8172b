use super::Injector;
use crate::batch::Batch;
use crate::error::InjectError;
use crate::executor::InsertStatement;
use crate::session::Session;
use async_trait::async_trait;
use injector_core::{EntityKind, InjectedIds, InjectionConfig, ProducedIds, SqlValue};
use injector_generator::command_line::{host_check, service_check, DEFAULT_BASE};
use injector_generator::pattern::numbered;

/// `command_type` of check commands.
const CHECK_COMMAND_TYPE: i64 = 2;

const COMMAND: InsertStatement = InsertStatement::new(
    "command",
    &["command_id", "command_name", "command_line", "command_type"],
);

/// Check commands: the first one checks hosts, the others check services.
pub struct CommandInjector;

#[async_trait]
impl Injector for CommandInjector {
    fn kind(&self) -> EntityKind {
        EntityKind::Command
    }

    fn owned_tables(&self) -> &'static [&'static str] {
        &["command"]
    }

    async fn inject(
        &self,
        session: &mut Session<'_>,
        config: &InjectionConfig,
        _injected: &InjectedIds,
    ) -> Result<ProducedIds, InjectError> {
        let range = session
            .allocate(COMMAND.table, "command_id", config.count(self.kind()))
            .await?;
        let metrics = config.metrics();

        let mut batch = Batch::new(&mut *session.executor, &[COMMAND], session.batch_size);
        for id in range.ids() {
            let line = if id == range.first {
                host_check(DEFAULT_BASE)
            } else {
                service_check(&mut session.rng, DEFAULT_BASE, metrics)
            };
            batch
                .push(
                    &COMMAND,
                    vec![
                        SqlValue::Int(id),
                        numbered("cmd_name", id).into(),
                        line.into(),
                        SqlValue::Int(CHECK_COMMAND_TYPE),
                    ],
                )
                .await?;
        }
        batch.finish().await?;

        Ok(range.into())
    }
}
