//! One injector per entity kind.
//!
//! Every injector allocates its primary keys, renders rows from fixed
//! templates, resolves foreign keys by sampling what earlier kinds produced
//! and writes through [`Batch`](crate::batch::Batch). What it returns is
//! recorded in the injected-id map for later kinds.

use crate::error::InjectError;
use crate::session::Session;
use async_trait::async_trait;
use injector_core::{Capability, EntityKind, InjectedIds, InjectionConfig, ProducedIds};
use tracing::debug;

mod acl_group;
mod acl_menu;
mod acl_resource;
mod ba;
mod command;
mod contact;
mod group;
mod host;
mod host_disco_job;
mod kpi;
mod metaservice;
mod service;
mod timeperiod;
mod user;

pub use acl_group::AclGroupInjector;
pub use acl_menu::AclMenuInjector;
pub use acl_resource::AclResourceInjector;
pub use ba::BaInjector;
pub use command::CommandInjector;
pub use contact::ContactInjector;
pub use group::GroupInjector;
pub use host::HostInjector;
pub use host_disco_job::HostDiscoJobInjector;
pub use kpi::KpiInjector;
pub use metaservice::MetaserviceInjector;
pub use service::ServiceInjector;
pub use timeperiod::TimeperiodInjector;
pub use user::UserInjector;

/// Writer of one entity kind.
#[async_trait]
pub trait Injector: Send + Sync {
    fn kind(&self) -> EntityKind;

    /// Optional module this injector needs.
    fn capability(&self) -> Option<Capability> {
        self.kind().capability()
    }

    /// Tables emptied by [`Injector::purge`], relation tables first.
    fn owned_tables(&self) -> &'static [&'static str];

    /// Write the configured rows and return what was produced.
    async fn inject(
        &self,
        session: &mut Session<'_>,
        config: &InjectionConfig,
        injected: &InjectedIds,
    ) -> Result<ProducedIds, InjectError>;

    /// Delete every row of the owned tables.
    async fn purge(&self, session: &mut Session<'_>) -> Result<(), InjectError> {
        for table in self.owned_tables() {
            let removed = session.delete_all(table).await?;
            debug!("Deleted {} rows from {}", removed, table);
        }
        Ok(())
    }
}

/// The injectors of every kind, in no particular order.
pub fn default_injectors() -> Vec<Box<dyn Injector>> {
    vec![
        Box::new(TimeperiodInjector),
        Box::new(CommandInjector),
        Box::new(ContactInjector),
        Box::new(HostInjector),
        Box::new(ServiceInjector),
        Box::new(MetaserviceInjector),
        Box::new(GroupInjector::hostgroup()),
        Box::new(GroupInjector::servicegroup()),
        Box::new(GroupInjector::host_category()),
        Box::new(GroupInjector::service_category()),
        Box::new(BaInjector),
        Box::new(KpiInjector),
        Box::new(HostDiscoJobInjector),
        Box::new(AclMenuInjector),
        Box::new(AclResourceInjector),
        Box::new(AclGroupInjector),
        Box::new(UserInjector),
    ]
}
