//! Integration tests per il repository auditato

mod common;

#[cfg(test)]
mod audited_repository_tests {
    use super::common::{AuditedWidget, audited_widget, create_test_store, test_context};
    use chrono::{Duration, Utc};
    use crudgate::repositories::{
        AuditedRepository, AuditedWritable, Deletable, ReadRepository, RepositoryError,
        Transactional,
    };
    use crudgate::store::SqliteStore;

    fn repository(store: &SqliteStore) -> AuditedRepository<AuditedWidget, SqliteStore> {
        AuditedRepository::new(store.clone(), test_context::<AuditedWidget>())
    }

    async fn stored(store: &SqliteStore, id: i64) -> AuditedWidget {
        repository(store)
            .get(&id)
            .await
            .expect("read")
            .expect("widget exists")
    }

    // ============================================================
    // Test per create
    // ============================================================

    #[tokio::test]
    async fn test_create_stamps_creator_and_time() {
        let store = create_test_store().await;
        let mut repo = repository(&store);
        let before = Utc::now();

        repo.create(audited_widget(0, "gear"), 1);
        repo.save_changes().await.expect("commit");

        let widget = stored(&store, 1).await;
        assert_eq!(widget.audit.created_by, Some(1));
        let created_at = widget.audit.created_at.expect("created_at is stamped");
        assert!(created_at >= before - Duration::seconds(1));
        assert!(created_at <= Utc::now() + Duration::seconds(1));
        assert_eq!(widget.audit.updated_by, None);
        assert_eq!(widget.audit.updated_at, None);
    }

    #[tokio::test]
    async fn test_create_overrides_client_supplied_stamp() {
        let store = create_test_store().await;
        let mut repo = repository(&store);

        let mut forged = audited_widget(0, "gear");
        forged.audit.created_by = Some(99);
        forged.audit.updated_by = Some(99);
        forged.audit.updated_at = Some(Utc::now());

        repo.create(forged, 3);
        repo.save_changes().await.expect("commit");

        let widget = stored(&store, 1).await;
        assert_eq!(widget.audit.created_by, Some(3));
        assert_eq!(widget.audit.updated_by, None);
        assert_eq!(widget.audit.updated_at, None);
    }

    #[tokio::test]
    async fn test_create_range_stamps_every_entity() {
        let store = create_test_store().await;
        let mut repo = repository(&store);

        repo.create_range(vec![audited_widget(0, "a"), audited_widget(0, "b")], 7);
        let summary = repo.save_changes().await.expect("commit");

        assert_eq!(summary.created, vec![1, 2]);
        for id in summary.created {
            let widget = stored(&store, id).await;
            assert_eq!(widget.audit.created_by, Some(7));
            assert!(widget.audit.created_at.is_some());
        }
    }

    // ============================================================
    // Test per update
    // ============================================================

    #[tokio::test]
    async fn test_update_stamps_updater_and_keeps_creation() {
        let store = create_test_store().await;
        let mut repo = repository(&store);
        repo.create(audited_widget(0, "gear"), 1);
        repo.save_changes().await.expect("commit");
        let created = stored(&store, 1).await;

        // the body tries to rewrite the creation stamp
        let mut changed = audited_widget(1, "cog");
        changed.audit.created_by = Some(42);
        changed.audit.created_at = None;

        let mut repo = repository(&store);
        repo.update(1, changed, 2).await.expect("update");
        repo.save_changes().await.expect("commit");

        let updated = stored(&store, 1).await;
        assert_eq!(updated.name, "cog");
        assert_eq!(updated.audit.created_by, Some(1));
        assert_eq!(updated.audit.created_at, created.audit.created_at);
        assert_eq!(updated.audit.updated_by, Some(2));
        assert!(updated.audit.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = create_test_store().await;
        let mut repo = repository(&store);

        let err = repo
            .update(5, audited_widget(5, "ghost"), 1)
            .await
            .expect_err("nothing to update");

        assert!(matches!(err, RepositoryError::NotFound { .. }));
        assert_eq!(repo.pending_changes(), 0);
    }

    // ============================================================
    // Test per delete
    // ============================================================

    #[tokio::test]
    async fn test_delete_needs_no_actor() {
        let store = create_test_store().await;
        let mut repo = repository(&store);
        repo.create(audited_widget(0, "gear"), 1);
        repo.save_changes().await.expect("commit");

        repo.delete(1).expect("queue delete");
        repo.save_changes().await.expect("commit");

        assert_eq!(repo.get(&1).await.expect("read"), None);
    }
}
