use super::Injector;
use crate::batch::Batch;
use crate::error::InjectError;
use crate::executor::{Filter, InsertStatement};
use crate::session::Session;
use async_trait::async_trait;
use injector_core::{EntityKind, InjectedIds, InjectionConfig, ProducedIds, SqlValue};
use injector_generator::pattern::numbered;
use injector_generator::Pool;
use tracing::debug;

const HOST_ADDRESS: &str = "127.0.0.1";

const HOST: InsertStatement = InsertStatement::new(
    "host",
    &[
        "host_id",
        "host_name",
        "host_alias",
        "host_address",
        "host_register",
        "command_command_id",
    ],
);

const EXTENDED_HOST_INFORMATION: InsertStatement =
    InsertStatement::new("extended_host_information", &["host_host_id"]);

const NS_HOST_RELATION: InsertStatement =
    InsertStatement::new("ns_host_relation", &["nagios_server_id", "host_host_id"]);

/// Hosts checked by the first command, each attached to one poller.
pub struct HostInjector;

impl HostInjector {
    /// Active pollers, without the central one unless hosts may run on it.
    async fn pollers(
        session: &mut Session<'_>,
        hosts_on_central: bool,
    ) -> Result<Vec<i64>, InjectError> {
        let mut filters = vec![Filter::eq("ns_activate", SqlValue::flag(1))];
        if !hosts_on_central {
            filters.push(Filter::eq("localhost", SqlValue::flag(0)));
        }
        session.select_ids("nagios_server", "id", &filters).await
    }
}

#[async_trait]
impl Injector for HostInjector {
    fn kind(&self) -> EntityKind {
        EntityKind::Host
    }

    fn owned_tables(&self) -> &'static [&'static str] {
        &["ns_host_relation", "extended_host_information", "host"]
    }

    async fn inject(
        &self,
        session: &mut Session<'_>,
        config: &InjectionConfig,
        injected: &InjectedIds,
    ) -> Result<ProducedIds, InjectError> {
        let check_command = Pool::of(injected, EntityKind::Command)
            .first()
            .map_err(InjectError::empty_pool(self.kind()))?;

        let pollers = Self::pollers(session, config.poller.hosts_on_central).await?;
        if pollers.is_empty() {
            return Err(InjectError::NoPollerAvailable { kind: self.kind() });
        }
        debug!("Attaching hosts to pollers {:?}", pollers);
        let pollers = Pool::new("poller", &pollers);

        let range = session
            .allocate(HOST.table, "host_id", config.count(self.kind()))
            .await?;

        let mut batch = Batch::new(
            &mut *session.executor,
            &[HOST, EXTENDED_HOST_INFORMATION, NS_HOST_RELATION],
            session.batch_size,
        );
        for id in range.ids() {
            batch
                .push(
                    &HOST,
                    vec![
                        SqlValue::Int(id),
                        numbered("host_name", id).into(),
                        numbered("host_alias", id).into(),
                        SqlValue::text(HOST_ADDRESS),
                        SqlValue::flag(1),
                        SqlValue::Int(check_command),
                    ],
                )
                .await?;
            batch
                .push(&EXTENDED_HOST_INFORMATION, vec![SqlValue::Int(id)])
                .await?;
            let poller = pollers
                .pick(&mut session.rng)
                .map_err(InjectError::empty_pool(self.kind()))?;
            batch
                .push(
                    &NS_HOST_RELATION,
                    vec![SqlValue::Int(poller), SqlValue::Int(id)],
                )
                .await?;
        }
        batch.finish().await?;

        Ok(range.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryExecutor, Statement};

    fn with_commands() -> InjectedIds {
        let mut injected = InjectedIds::new();
        injected
            .record(EntityKind::Command, vec![5, 6].into())
            .unwrap();
        injected
    }

    #[tokio::test]
    async fn test_hosts_with_companion_rows() {
        let mut executor = MemoryExecutor::centreon();
        let config = InjectionConfig::with_counts(&[(EntityKind::Host, 3)]);
        {
            let mut session = Session::new(&mut executor, 2, Some(1));
            HostInjector
                .inject(&mut session, &config, &with_commands())
                .await
                .unwrap();
        }

        assert_eq!(executor.ids("host", "command_command_id"), vec![5, 5, 5]);
        assert_eq!(executor.ids("extended_host_information", "host_host_id"), vec![1, 2, 3]);
        assert_eq!(executor.ids("ns_host_relation", "nagios_server_id"), vec![1, 1, 1]);
    }

    #[tokio::test]
    async fn test_hosts_avoid_central_when_asked() {
        let mut executor = MemoryExecutor::centreon();
        executor.add_poller(2, false, true);
        executor.add_poller(3, false, false);
        let mut config = InjectionConfig::with_counts(&[(EntityKind::Host, 20)]);
        config.poller.hosts_on_central = false;
        {
            let mut session = Session::new(&mut executor, 100, Some(1));
            HostInjector
                .inject(&mut session, &config, &with_commands())
                .await
                .unwrap();
        }

        let pollers = executor.ids("ns_host_relation", "nagios_server_id");
        assert_eq!(pollers.len(), 20);
        assert!(pollers.iter().all(|p| *p == 2));
    }

    #[tokio::test]
    async fn test_no_poller_available() {
        let mut executor = MemoryExecutor::centreon();
        let mut config = InjectionConfig::with_counts(&[(EntityKind::Host, 1)]);
        config.poller.hosts_on_central = false;
        let result = {
            let mut session = Session::new(&mut executor, 100, Some(1));
            HostInjector
                .inject(&mut session, &config, &with_commands())
                .await
        };

        assert!(matches!(
            result,
            Err(InjectError::NoPollerAvailable {
                kind: EntityKind::Host
            })
        ));
        assert_eq!(executor.row_count("host"), 0);
    }

    #[tokio::test]
    async fn test_rows_stream_in_bounded_chunks() {
        let mut executor = MemoryExecutor::centreon();
        let config = InjectionConfig::with_counts(&[(EntityKind::Host, 5)]);
        {
            let mut session = Session::new(&mut executor, 2, Some(1));
            HostInjector
                .inject(&mut session, &config, &with_commands())
                .await
                .unwrap();
        }

        let inserts: Vec<(&str, usize)> = executor
            .statements()
            .iter()
            .filter_map(|s| match s {
                Statement::Insert { table, rows } => Some((table.as_str(), *rows)),
                _ => None,
            })
            .collect();
        assert!(inserts.iter().all(|(_, rows)| *rows <= 2));
        // Each flush writes hosts before the rows that reference them.
        assert_eq!(
            inserts,
            vec![
                ("host", 2),
                ("extended_host_information", 2),
                ("ns_host_relation", 2),
                ("host", 2),
                ("extended_host_information", 2),
                ("ns_host_relation", 2),
                ("host", 1),
                ("extended_host_information", 1),
                ("ns_host_relation", 1),
            ]
        );
    }
}
