use super::Injector;
use crate::batch::Batch;
use crate::error::InjectError;
use crate::executor::InsertStatement;
use crate::session::Session;
use async_trait::async_trait;
use injector_core::{
    Cardinality, EntityKind, HostServicePair, InjectedIds, InjectionConfig, ProducedIds, Row,
    SqlValue,
};
use injector_generator::command_line::metric_macros;
use injector_generator::pattern::numbered;
use injector_generator::Pool;
use rand::Rng;

const SERVICE: InsertStatement = InsertStatement::new(
    "service",
    &[
        "service_id",
        "service_template_model_stm_id",
        "service_description",
        "service_alias",
        "service_register",
        "command_command_id",
    ],
);

const SERVICE_MACRO: InsertStatement = InsertStatement::new(
    "on_demand_macro_service",
    &["svc_macro_name", "svc_macro_value", "svc_svc_id"],
);

pub(super) const HOST_SERVICE_RELATION: InsertStatement =
    InsertStatement::new("host_service_relation", &["host_host_id", "service_service_id"]);

/// One service template and the services inheriting from it.
///
/// Each service runs a service-check command and is attached to one random
/// host. The template carries default metric macros and about a third of
/// the services override them. The produced pairs do not include the
/// template.
pub struct ServiceInjector;

fn macro_rows<R: Rng>(rng: &mut R, service_id: i64, metrics: Cardinality) -> Vec<Row> {
    metric_macros(rng, metrics)
        .into_iter()
        .map(|(name, value)| {
            vec![
                SqlValue::text(name),
                SqlValue::text(value.to_string()),
                SqlValue::Int(service_id),
            ]
        })
        .collect()
}

#[async_trait]
impl Injector for ServiceInjector {
    fn kind(&self) -> EntityKind {
        EntityKind::Service
    }

    fn owned_tables(&self) -> &'static [&'static str] {
        &["on_demand_macro_service", "host_service_relation", "service"]
    }

    async fn inject(
        &self,
        session: &mut Session<'_>,
        config: &InjectionConfig,
        injected: &InjectedIds,
    ) -> Result<ProducedIds, InjectError> {
        let kind = self.kind();
        let commands = injected.keys(EntityKind::Command);
        // The first command checks hosts; keep it only when it is the sole one.
        let commands = match commands {
            [_, service_checks @ ..] if !service_checks.is_empty() => service_checks,
            _ => commands,
        };
        let commands = Pool::new(EntityKind::Command.as_str(), commands);
        let hosts = Pool::of(injected, EntityKind::Host);
        let metrics = config.metrics();

        let count = config.count(kind);
        let range = session.allocate(SERVICE.table, "service_id", count + 1).await?;
        let template_id = range.first;

        let mut batch = Batch::new(
            &mut *session.executor,
            &[SERVICE, SERVICE_MACRO, HOST_SERVICE_RELATION],
            session.batch_size,
        );
        let rng = &mut session.rng;

        let template_command = commands.pick(rng).map_err(InjectError::empty_pool(kind))?;
        batch
            .push(
                &SERVICE,
                vec![
                    SqlValue::Int(template_id),
                    SqlValue::Null,
                    SqlValue::text("service_name_template"),
                    SqlValue::text("service_description_template"),
                    SqlValue::flag(0),
                    SqlValue::Int(template_command),
                ],
            )
            .await?;
        batch
            .extend(&SERVICE_MACRO, macro_rows(rng, template_id, metrics))
            .await?;

        let mut pairs = Vec::new();
        for id in range.ids().skip(1) {
            let command = commands.pick(rng).map_err(InjectError::empty_pool(kind))?;
            batch
                .push(
                    &SERVICE,
                    vec![
                        SqlValue::Int(id),
                        SqlValue::Int(template_id),
                        numbered("service_name", id).into(),
                        numbered("service_description", id).into(),
                        SqlValue::flag(1),
                        SqlValue::Int(command),
                    ],
                )
                .await?;

            if rng.random_ratio(1, 3) {
                batch
                    .extend(&SERVICE_MACRO, macro_rows(rng, id, metrics))
                    .await?;
            }

            let host_id = hosts.pick(rng).map_err(InjectError::empty_pool(kind))?;
            batch
                .push(
                    &HOST_SERVICE_RELATION,
                    vec![SqlValue::Int(host_id), SqlValue::Int(id)],
                )
                .await?;
            pairs.push(HostServicePair {
                host_id,
                service_id: id,
            });
        }
        batch.finish().await?;

        Ok(ProducedIds::HostServices(pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryExecutor, Statement};
    use injector_core::Bounds;

    fn dependencies(commands: Vec<i64>) -> InjectedIds {
        let mut injected = InjectedIds::new();
        injected
            .record(EntityKind::Command, commands.into())
            .unwrap();
        injected
            .record(EntityKind::Host, vec![1, 2, 3].into())
            .unwrap();
        injected
    }

    #[tokio::test]
    async fn test_services_inherit_from_template() {
        let mut executor = MemoryExecutor::centreon();
        let config = InjectionConfig::with_counts(&[(EntityKind::Service, 4)]);
        let produced = {
            let mut session = Session::new(&mut executor, 100, Some(9));
            ServiceInjector
                .inject(&mut session, &config, &dependencies(vec![1, 2, 3]))
                .await
                .unwrap()
        };

        let ProducedIds::HostServices(pairs) = produced else {
            panic!("services produce host/service pairs");
        };
        assert_eq!(pairs.len(), 4);
        assert!(pairs.iter().all(|p| (1..=3).contains(&p.host_id)));
        assert_eq!(
            pairs.iter().map(|p| p.service_id).collect::<Vec<_>>(),
            vec![2, 3, 4, 5]
        );

        assert_eq!(executor.row_count("service"), 5);
        let registers = executor.column("service", "service_register");
        assert_eq!(registers[0], SqlValue::flag(0));
        assert!(registers[1..].iter().all(|r| *r == SqlValue::flag(1)));
        assert_eq!(executor.ids("service", "service_template_model_stm_id"), vec![1; 4]);
        // Services never run the host-check command.
        assert!(executor
            .ids("service", "command_command_id")
            .iter()
            .all(|c| *c != 1));
        assert_eq!(executor.row_count("host_service_relation"), 4);
    }

    #[tokio::test]
    async fn test_single_command_is_shared() {
        let mut executor = MemoryExecutor::centreon();
        let config = InjectionConfig::with_counts(&[(EntityKind::Service, 2)]);
        {
            let mut session = Session::new(&mut executor, 100, Some(9));
            ServiceInjector
                .inject(&mut session, &config, &dependencies(vec![7]))
                .await
                .unwrap();
        }
        assert_eq!(executor.ids("service", "command_command_id"), vec![7, 7, 7]);
    }

    #[tokio::test]
    async fn test_metric_macros_on_template_and_some_services() {
        let mut executor = MemoryExecutor::centreon();
        let mut config = InjectionConfig::with_counts(&[(EntityKind::Service, 300)]);
        config.section_mut(EntityKind::Command).metrics =
            Some(Bounds::Range { min: Some(2), max: Some(3) });
        {
            let mut session = Session::new(&mut executor, 64, Some(11));
            ServiceInjector
                .inject(&mut session, &config, &dependencies(vec![1, 2, 3]))
                .await
                .unwrap();
        }

        let macros = executor.rows("on_demand_macro_service");
        assert_eq!(macros.len() % 3, 0);
        let template_macros: Vec<_> = macros
            .iter()
            .filter(|row| row["svc_svc_id"] == SqlValue::Int(1))
            .collect();
        assert_eq!(template_macros.len(), 3);

        // Roughly one service in three overrides the template.
        let overriding = macros.len() / 3 - 1;
        assert!((50..=150).contains(&overriding), "{overriding} overrides");

        for row in macros {
            if row["svc_macro_name"] == SqlValue::text("$_SERVICEMETRICCOUNT$") {
                let count: i64 = row["svc_macro_value"].as_str().unwrap().parse().unwrap();
                assert!((2..=3).contains(&count));
            }
        }
    }

    #[tokio::test]
    async fn test_purge_removes_macros_first() {
        let mut executor = MemoryExecutor::centreon();
        let config = InjectionConfig::with_counts(&[(EntityKind::Service, 5)]);
        {
            let mut session = Session::new(&mut executor, 100, Some(2));
            ServiceInjector
                .inject(&mut session, &config, &dependencies(vec![1, 2]))
                .await
                .unwrap();
            ServiceInjector.purge(&mut session).await.unwrap();
        }

        assert_eq!(executor.row_count("on_demand_macro_service"), 0);
        assert_eq!(executor.row_count("service"), 0);
        let deleted: Vec<_> = executor
            .statements()
            .iter()
            .filter_map(|s| match s {
                Statement::Delete { table, .. } => Some(table.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            deleted,
            vec!["on_demand_macro_service", "host_service_relation", "service"]
        );
    }
}
