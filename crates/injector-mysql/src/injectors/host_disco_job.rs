use super::Injector;
use crate::error::InjectError;
use crate::executor::InsertStatement;
use crate::session::Session;
use async_trait::async_trait;
use injector_core::{EntityKind, InjectedIds, InjectionConfig, ProducedIds, SqlValue};

const ICON: InsertStatement = InsertStatement::new("mod_ppm_icons", &["icon_id", "icon_file"]);

const PLUGIN_PACK: InsertStatement = InsertStatement::new(
    "mod_ppm_pluginpack",
    &[
        "pluginpack_id",
        "name",
        "slug",
        "version",
        "status",
        "discovery_category_id",
        "icon",
    ],
);

const PROVIDER_TYPE: InsertStatement = InsertStatement::new(
    "mod_host_disco_provider_type",
    &["id", "name", "encryption_salt"],
);

const PROVIDER: InsertStatement = InsertStatement::new(
    "mod_host_disco_provider",
    &[
        "id",
        "pluginpack_id",
        "name",
        "slug",
        "type_id",
        "need_proxy",
        "command_id",
        "host_template_id",
    ],
);

const JOB: InsertStatement = InsertStatement::new(
    "mod_host_disco_job",
    &[
        "id",
        "alias",
        "provider_id",
        "execution_mode",
        "analysis_mode",
        "save_mode",
        "status",
        "duration",
        "message",
        "monitoring_server_id",
    ],
);

/// Discovery jobs, all run by one freshly created provider.
pub struct HostDiscoJobInjector;

impl HostDiscoJobInjector {
    /// Icon, plugin pack, provider type and provider the jobs point at.
    /// Returns the provider id.
    async fn provider(session: &mut Session<'_>) -> Result<i64, InjectError> {
        let icon = session.allocate(ICON.table, "icon_id", 1).await?.first;
        session
            .write_all(&ICON, vec![vec![SqlValue::Int(icon), SqlValue::Null]])
            .await?;

        let pack = session
            .allocate(PLUGIN_PACK.table, "pluginpack_id", 1)
            .await?
            .first;
        session
            .write_all(
                &PLUGIN_PACK,
                vec![vec![
                    SqlValue::Int(pack),
                    SqlValue::text(format!("my PP{pack}")),
                    SqlValue::text(format!("my_pp{pack}")),
                    SqlValue::text("1.1.1"),
                    SqlValue::flag(0),
                    SqlValue::Int(1),
                    SqlValue::Int(icon),
                ]],
            )
            .await?;

        let provider_type = session.allocate(PROVIDER_TYPE.table, "id", 1).await?.first;
        session
            .write_all(
                &PROVIDER_TYPE,
                vec![vec![
                    SqlValue::Int(provider_type),
                    SqlValue::text(format!("my type{provider_type}")),
                    SqlValue::text(format!("salt{provider_type}")),
                ]],
            )
            .await?;

        let provider = session.allocate(PROVIDER.table, "id", 1).await?.first;
        session
            .write_all(
                &PROVIDER,
                vec![vec![
                    SqlValue::Int(provider),
                    SqlValue::Int(pack),
                    SqlValue::text(format!("my provider{provider}")),
                    SqlValue::text(format!("my_provider{provider}")),
                    SqlValue::Int(provider_type),
                    SqlValue::Int(0),
                    SqlValue::Int(1),
                    SqlValue::Int(2),
                ]],
            )
            .await?;

        Ok(provider)
    }
}

#[async_trait]
impl Injector for HostDiscoJobInjector {
    fn kind(&self) -> EntityKind {
        EntityKind::HostDiscoJob
    }

    fn owned_tables(&self) -> &'static [&'static str] {
        &[
            "mod_host_disco_job",
            "mod_host_disco_provider",
            "mod_host_disco_provider_type",
            "mod_ppm_pluginpack",
            "mod_ppm_icons",
        ]
    }

    async fn inject(
        &self,
        session: &mut Session<'_>,
        config: &InjectionConfig,
        _injected: &InjectedIds,
    ) -> Result<ProducedIds, InjectError> {
        let provider = Self::provider(session).await?;
        let range = session
            .allocate(JOB.table, "id", config.count(self.kind()))
            .await?;

        let jobs = range.ids().map(|id| {
            vec![
                SqlValue::Int(id),
                SqlValue::text(format!("Job name{id}")),
                SqlValue::Int(provider),
                SqlValue::Int(0),
                SqlValue::Int(0),
                SqlValue::Int(0),
                SqlValue::Int(1),
                SqlValue::Int(34),
                SqlValue::Null,
                SqlValue::Int(1),
            ]
        });
        session.write_all(&JOB, jobs).await?;

        Ok(range.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryExecutor;

    #[tokio::test]
    async fn test_jobs_share_one_provider() {
        let mut executor = MemoryExecutor::centreon();
        executor.seed("mod_host_disco_provider", &[("id", SqlValue::Int(6))]);
        let config = InjectionConfig::with_counts(&[(EntityKind::HostDiscoJob, 3)]);
        let produced = {
            let mut session = Session::new(&mut executor, 100, Some(1));
            HostDiscoJobInjector
                .inject(&mut session, &config, &InjectedIds::new())
                .await
                .unwrap()
        };

        assert_eq!(produced.len(), 3);
        assert_eq!(executor.row_count("mod_ppm_icons"), 1);
        assert_eq!(executor.row_count("mod_ppm_pluginpack"), 1);
        assert_eq!(executor.row_count("mod_host_disco_provider_type"), 1);
        assert_eq!(executor.ids("mod_host_disco_job", "provider_id"), vec![7; 3]);
        assert_eq!(
            executor.column("mod_host_disco_job", "alias")[0],
            SqlValue::text("Job name1")
        );
        assert!(executor.column("mod_host_disco_job", "message")[2].is_null());
    }
}
