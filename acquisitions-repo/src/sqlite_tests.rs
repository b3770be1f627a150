//! SQLite repository integration tests.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use acquisitions_types::{NewUser, RepoError, Role, UserRepository};

    use crate::{Repo, SqliteRepo, build_repo};

    async fn setup_repo() -> SqliteRepo {
        SqliteRepo::new("sqlite::memory:").await.unwrap()
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Alice".to_string(),
            email: email.to_string(),
            password_hash: "$2b$10$digestdigestdigestdigest".to_string(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn test_insert_user_returns_stored_row() {
        let repo = setup_repo().await;

        let user = repo.insert_user(new_user("alice@example.com")).await.unwrap();

        assert_eq!(user.name, "Alice");
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.password_hash, "$2b$10$digestdigestdigestdigest");
    }

    #[tokio::test]
    async fn test_find_by_email() {
        let repo = setup_repo().await;
        let created = repo.insert_user(new_user("alice@example.com")).await.unwrap();

        let fetched = repo
            .find_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.created_at, created.created_at);
        assert_eq!(fetched.password_hash, created.password_hash);
    }

    #[tokio::test]
    async fn test_find_by_email_not_found() {
        let repo = setup_repo().await;

        let result = repo.find_by_email("nobody@example.com").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_email_match_is_case_sensitive() {
        let repo = setup_repo().await;
        repo.insert_user(new_user("alice@example.com")).await.unwrap();

        let result = repo.find_by_email("Alice@Example.com").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let repo = setup_repo().await;
        repo.insert_user(new_user("alice@example.com")).await.unwrap();

        let result = repo.insert_user(new_user("alice@example.com")).await;

        assert!(matches!(result, Err(RepoError::Conflict(_))));
        assert_eq!(repo.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_inserts_store_one_row() {
        let repo = Arc::new(setup_repo().await);

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.insert_user(new_user("race@example.com")).await })
            })
            .collect();

        let mut ok = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(RepoError::Conflict(_)) => conflicts += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        assert_eq!(ok, 1);
        assert_eq!(conflicts, 4);
        assert_eq!(repo.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_roles_round_trip() {
        let repo = setup_repo().await;

        for (i, role) in Role::ALL.into_iter().enumerate() {
            let mut user = new_user(&format!("user{}@example.com", i));
            user.role = role;
            repo.insert_user(user).await.unwrap();

            let fetched = repo
                .find_by_email(&format!("user{}@example.com", i))
                .await
                .unwrap()
                .unwrap();
            assert_eq!(fetched.role, role);
        }
    }

    #[tokio::test]
    async fn test_corrupt_role_surfaces_as_error() {
        let repo = setup_repo().await;
        repo.insert_user(new_user("alice@example.com")).await.unwrap();

        // Bypass the CHECK constraint by rebuilding the table without it.
        sqlx::query("ALTER TABLE users RENAME TO users_old")
            .execute(repo.pool())
            .await
            .unwrap();
        sqlx::query(
            "CREATE TABLE users (id TEXT, name TEXT, email TEXT, password TEXT, role TEXT, created_at TEXT)",
        )
        .execute(repo.pool())
        .await
        .unwrap();
        sqlx::query("INSERT INTO users SELECT id, name, email, password, 'owner', created_at FROM users_old")
            .execute(repo.pool())
            .await
            .unwrap();

        let result = repo.find_by_email("alice@example.com").await;

        assert!(matches!(result, Err(RepoError::Domain(_))));
    }

    #[tokio::test]
    async fn test_on_disk_database_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("acquisitions.db");
        let url = format!("sqlite://{}?mode=rwc", path.display());

        let repo = build_repo(&url).await.unwrap();
        assert_eq!(repo.backend(), "sqlite");
        assert!(matches!(repo, Repo::Sqlite(_)));

        repo.insert_user(new_user("disk@example.com")).await.unwrap();
        assert!(path.exists());
        assert!(repo.find_by_email("disk@example.com").await.unwrap().is_some());
    }
}
