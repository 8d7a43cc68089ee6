//! # External Edits
//!
//! Operators may edit the log by hand while the service runs. The watcher
//! must pick those edits up, and the engine's own appends must not count
//! as external changes.

#[cfg(test)]
mod tests {
    use crate::fixtures::{claimant, file_engine, record, small_pool};
    use lp_pool_engine::domain::format::{encode_record, LOG_HEADER};
    use lp_pool_engine::{reconcile, AllocationApi, AllocationLog, ChangeWatcher};
    use std::fs;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::sync::watch;

    #[test]
    fn test_own_appends_are_not_external_changes() {
        let dir = TempDir::new().unwrap();
        let engine = file_engine(dir.path(), small_pool());

        for n in 0..3 {
            engine.claim(claimant(n)).unwrap();
            assert_eq!(engine.reload_if_changed().unwrap(), None);
        }
    }

    #[test]
    fn test_removed_entry_frees_claimant_and_unit() {
        let dir = TempDir::new().unwrap();
        let engine = file_engine(dir.path(), small_pool());
        engine.claim(claimant(0)).unwrap();
        engine.claim(claimant(1)).unwrap();

        // Operator keeps only the second entry.
        let kept = engine.view().records[1].clone();
        fs::write(
            dir.path().join("lixi.log"),
            format!("{}{}", LOG_HEADER, encode_record(&kept)),
        )
        .unwrap();

        let summary = engine.reload_if_changed().unwrap().expect("edit detected");
        assert_eq!(summary.records, 1);
        assert_eq!(summary.total_remaining, 6);

        engine.claim(claimant(0)).unwrap();
        assert!(engine.claim(claimant(1)).is_err());
    }

    #[tokio::test]
    async fn test_watcher_applies_operator_append() {
        let dir = TempDir::new().unwrap();
        let engine = Arc::new(file_engine(dir.path(), small_pool()));
        let (tx, rx) = watch::channel(false);
        let handle = ChangeWatcher::new(Duration::from_millis(20)).spawn(Arc::clone(&engine), rx);

        let mut content = fs::read_to_string(dir.path().join("lixi.log")).unwrap();
        content.push_str(&encode_record(&record("Hoa", 10_000, "10.5.5.5")));
        content.push_str(&encode_record(&record("Minh", 10_000, "10.5.5.6")));
        fs::write(dir.path().join("lixi.log"), content).unwrap();

        let mut applied = false;
        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            if engine.view().pool.remaining(10_000) == Some(2) {
                applied = true;
                break;
            }
        }
        assert!(applied, "watcher did not apply the edit");
        assert_eq!(engine.view().total_recipients(), 2);

        tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[test]
    fn test_same_length_edit_before_claim_keeps_cache_in_step() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lixi.log");
        let original = encode_record(&record("Lan", 20_000, "10.9.9.9"));
        fs::write(&path, format!("{}{}", LOG_HEADER, original)).unwrap();
        let engine = file_engine(dir.path(), small_pool());

        // Operator corrects the amount in place; the file keeps its length
        std::thread::sleep(Duration::from_millis(50));
        fs::write(&path, format!("{}{}", LOG_HEADER, original.replace("20.000", "10.000")))
            .unwrap();

        engine.claim(claimant(1)).unwrap();

        let replayed = reconcile(
            engine.config().denominations(),
            &engine.log().read_all().unwrap(),
        );
        assert_eq!(engine.view().pool, replayed.pool);
        assert_eq!(engine.reload_if_changed().unwrap(), None);

        let restarted = file_engine(dir.path(), small_pool());
        assert_eq!(restarted.view().pool, engine.view().pool);
    }
}
