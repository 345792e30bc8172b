use super::Injector;
use crate::batch::Batch;
use crate::error::InjectError;
use crate::executor::InsertStatement;
use crate::session::Session;
use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use chrono::Utc;
use injector_core::{EntityKind, InjectedIds, InjectionConfig, ProducedIds, SqlValue};
use injector_generator::pattern::numbered;
use injector_generator::Pool;
use rand::RngCore;
use tracing::debug;

/// Password shared by every generated user.
pub const FIXTURE_PASSWORD: &str = "centreon";

const USER: InsertStatement = InsertStatement::new(
    "contact",
    &[
        "contact_id",
        "contact_name",
        "contact_alias",
        "contact_email",
        "contact_lang",
        "contact_activate",
        "contact_admin",
        "contact_oreon",
    ],
);

const PASSWORD: InsertStatement = InsertStatement::new(
    "contact_password",
    &["password", "contact_id", "creation_date"],
);

const ACL_GROUP_CONTACT: InsertStatement = InsertStatement::new(
    "acl_group_contacts_relations",
    &["contact_contact_id", "acl_group_id"],
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Administrator,
    Editor,
    User,
}

impl Role {
    const ALL: [Role; 3] = [Role::Administrator, Role::Editor, Role::User];

    fn prefix(&self) -> &'static str {
        match self {
            Role::Administrator => "admin",
            Role::Editor => "editor",
            Role::User => "user",
        }
    }

    fn is_admin(&self) -> bool {
        matches!(self, Role::Administrator)
    }

    fn count(&self, config: &InjectionConfig) -> u64 {
        let users = config.users();
        match self {
            Role::Administrator => users.administrators,
            Role::Editor => users.editors,
            Role::User => users.users,
        }
    }
}

/// Interface users in three roles.
///
/// Each role is allocated and written separately. Administrators see
/// everything; editors and users get one random ACL group.
pub struct UserInjector;

impl UserInjector {
    fn hash_password<R: RngCore>(rng: &mut R) -> Result<String, InjectError> {
        let mut salt_bytes = [0u8; 16];
        rng.fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| InjectError::PasswordHash(e.to_string()))?;

        Argon2::default()
            .hash_password(FIXTURE_PASSWORD.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| InjectError::PasswordHash(e.to_string()))
    }

    async fn inject_role(
        session: &mut Session<'_>,
        role: Role,
        count: u64,
        acl_groups: Pool<'_, i64>,
    ) -> Result<Vec<i64>, InjectError> {
        let range = session.allocate(USER.table, "contact_id", count).await?;
        let password = Self::hash_password(&mut session.rng)?;
        let created = Utc::now().timestamp();
        let prefix = role.prefix();
        let admin = role.is_admin() as u8;

        let mut batch = Batch::new(
            &mut *session.executor,
            &[USER, PASSWORD, ACL_GROUP_CONTACT],
            session.batch_size,
        );
        let rng = &mut session.rng;
        for (index, id) in (1..).zip(range.ids()) {
            batch
                .push(
                    &USER,
                    vec![
                        SqlValue::Int(id),
                        numbered(prefix, index).into(),
                        numbered(prefix, index).into(),
                        SqlValue::text(format!("{prefix}_{index}@localhost")),
                        SqlValue::text("en_US.UTF-8"),
                        SqlValue::flag(1),
                        SqlValue::flag(admin),
                        SqlValue::flag(1),
                    ],
                )
                .await?;
            batch
                .push(
                    &PASSWORD,
                    vec![
                        SqlValue::text(password.as_str()),
                        SqlValue::Int(id),
                        SqlValue::Int(created),
                    ],
                )
                .await?;
            if !role.is_admin() {
                let group = acl_groups
                    .pick(rng)
                    .map_err(InjectError::empty_pool(EntityKind::User))?;
                batch
                    .push(
                        &ACL_GROUP_CONTACT,
                        vec![SqlValue::Int(id), SqlValue::Int(group)],
                    )
                    .await?;
            }
        }
        batch.finish().await?;
        debug!("Injected {} {} users", count, prefix);

        Ok(range.ids().collect())
    }
}

#[async_trait]
impl Injector for UserInjector {
    fn kind(&self) -> EntityKind {
        EntityKind::User
    }

    fn owned_tables(&self) -> &'static [&'static str] {
        &["acl_group_contacts_relations", "contact_password", "contact"]
    }

    async fn inject(
        &self,
        session: &mut Session<'_>,
        config: &InjectionConfig,
        injected: &InjectedIds,
    ) -> Result<ProducedIds, InjectError> {
        let acl_groups = Pool::of(injected, EntityKind::AclGroup);

        let mut ids = Vec::new();
        for role in Role::ALL {
            let count = role.count(config);
            if count == 0 {
                continue;
            }
            ids.extend(Self::inject_role(session, role, count, acl_groups).await?);
        }

        Ok(ids.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryExecutor;
    use argon2::password_hash::{PasswordHash, PasswordVerifier};
    use injector_core::UserSection;

    fn config(administrators: u64, editors: u64, users: u64) -> InjectionConfig {
        InjectionConfig {
            user: Some(UserSection {
                administrators,
                editors,
                users,
            }),
            ..InjectionConfig::default()
        }
    }

    fn with_acl_groups() -> InjectedIds {
        let mut injected = InjectedIds::new();
        injected
            .record(EntityKind::AclGroup, vec![2, 3].into())
            .unwrap();
        injected
    }

    #[tokio::test]
    async fn test_roles_are_written_separately() {
        let mut executor = MemoryExecutor::centreon();
        let produced = {
            let mut session = Session::new(&mut executor, 100, Some(4));
            UserInjector
                .inject(&mut session, &config(1, 2, 3), &with_acl_groups())
                .await
                .unwrap()
        };

        assert_eq!(produced, ProducedIds::Keys(vec![1, 2, 3, 4, 5, 6]));
        let names: Vec<String> = executor
            .column("contact", "contact_name")
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["admin_1", "editor_1", "editor_2", "user_1", "user_2", "user_3"]
        );
        assert_eq!(
            executor.column("contact", "contact_admin"),
            vec![
                SqlValue::flag(1),
                SqlValue::flag(0),
                SqlValue::flag(0),
                SqlValue::flag(0),
                SqlValue::flag(0),
                SqlValue::flag(0),
            ]
        );
        assert_eq!(
            executor.column("contact", "contact_email")[3],
            SqlValue::text("user_1@localhost")
        );

        // Administrators get no ACL group.
        assert_eq!(
            executor.ids("acl_group_contacts_relations", "contact_contact_id"),
            vec![2, 3, 4, 5, 6]
        );
        assert!(executor
            .ids("acl_group_contacts_relations", "acl_group_id")
            .iter()
            .all(|g| [2, 3].contains(g)));
    }

    #[tokio::test]
    async fn test_passwords_verify() {
        let mut executor = MemoryExecutor::centreon();
        {
            let mut session = Session::new(&mut executor, 100, Some(4));
            UserInjector
                .inject(&mut session, &config(2, 0, 0), &InjectedIds::new())
                .await
                .unwrap();
        }

        let hashes = executor.column("contact_password", "password");
        assert_eq!(hashes.len(), 2);
        // One hash per role batch.
        assert_eq!(hashes[0], hashes[1]);
        let hash = PasswordHash::new(hashes[0].as_str().unwrap()).unwrap();
        assert!(Argon2::default()
            .verify_password(FIXTURE_PASSWORD.as_bytes(), &hash)
            .is_ok());
        assert_eq!(executor.ids("contact_password", "contact_id"), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_editors_need_acl_groups() {
        let mut executor = MemoryExecutor::centreon();
        let mut session = Session::new(&mut executor, 100, Some(4));
        let result = UserInjector
            .inject(&mut session, &config(0, 1, 0), &InjectedIds::new())
            .await;
        assert!(matches!(
            result,
            Err(InjectError::EmptyPool {
                kind: EntityKind::User,
                ..
            })
        ));
    }
}
