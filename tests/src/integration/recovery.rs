//! # Recovery
//!
//! The log is the only durable state. Restarting from it must reproduce the
//! same pool and the same set of served claimants.

#[cfg(test)]
mod tests {
    use crate::fixtures::{claimant, file_engine, record, small_pool};
    use lp_pool_engine::domain::format::{encode_record, LOG_HEADER};
    use lp_pool_engine::{AllocationApi, ClaimError, ClaimRequest, RejectReason};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_restart_rebuilds_identical_state() {
        let dir = TempDir::new().unwrap();
        let before = {
            let engine = file_engine(dir.path(), small_pool());
            for n in 0..4 {
                engine.claim(claimant(n)).unwrap();
            }
            engine.view()
        };

        let engine = file_engine(dir.path(), small_pool());
        let after = engine.view();
        assert_eq!(after.pool, before.pool);
        assert_eq!(after.records, before.records);

        assert_eq!(
            engine.claim(claimant(2)).unwrap_err(),
            ClaimError::Rejected(RejectReason::OriginAlreadyUsed)
        );
        let mut same_person = claimant(2);
        same_person.origin_address = "192.0.2.200".into();
        assert_eq!(
            engine.claim(same_person).unwrap_err(),
            ClaimError::Rejected(RejectReason::IdentityAlreadyClaimed)
        );
    }

    #[test]
    fn test_torn_tail_does_not_block_new_claims() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lixi.log");
        fs::write(
            &path,
            format!(
                "{}{}[09:16:00 30/1/2025] Tên: Cut",
                LOG_HEADER,
                encode_record(&record("Lan", 20_000, "10.9.9.9"))
            ),
        )
        .unwrap();

        let engine = file_engine(dir.path(), small_pool());
        assert_eq!(engine.view().total_recipients(), 1);

        engine.claim(claimant(1)).unwrap();

        let restarted = file_engine(dir.path(), small_pool());
        let view = restarted.view();
        assert_eq!(view.total_recipients(), 2);
        assert_eq!(view.pool.remaining(20_000).unwrap() + view.pool.remaining(10_000).unwrap(), 5);
    }

    #[test]
    fn test_log_over_capacity_clamps_and_reports() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lixi.log");
        let mut content = LOG_HEADER.to_string();
        for n in 0..5 {
            content.push_str(&encode_record(&record(&format!("P{n}"), 20_000, &format!("10.1.0.{n}"))));
        }
        fs::write(&path, content).unwrap();

        let engine = file_engine(dir.path(), small_pool());
        assert_eq!(engine.view().pool.remaining(20_000), Some(0));
        assert_eq!(engine.view().total_recipients(), 5);
        assert!(!engine.anomalies().is_empty());

        // Everyone in the log stays served even past capacity.
        let again = ClaimRequest::new("P4", "999", "ACB", "172.16.0.1");
        assert_eq!(
            engine.claim(again).unwrap_err(),
            ClaimError::Rejected(RejectReason::IdentityAlreadyClaimed)
        );
    }

    #[test]
    fn test_deleted_log_resets_pool() {
        let dir = TempDir::new().unwrap();
        let engine = file_engine(dir.path(), small_pool());
        engine.claim(claimant(0)).unwrap();

        fs::remove_file(dir.path().join("lixi.log")).unwrap();
        let summary = engine.reload_if_changed().unwrap().expect("change detected");
        assert_eq!(summary.records, 0);
        assert_eq!(engine.view().total_remaining(), 7);
        assert_eq!(fs::read_to_string(dir.path().join("lixi.log")).unwrap(), LOG_HEADER);
    }

    #[test]
    fn test_separator_text_in_claim_survives_restart() {
        let dir = TempDir::new().unwrap();
        let name = "Mallory, STK: 1, Ngân hàng: X, Số tiền: 500.000 VNĐ, IP: 9.9.9.9";
        let request = || ClaimRequest::new(name, "1", "X", "1.1.1.1");
        let amount = {
            let engine = file_engine(dir.path(), small_pool());
            engine.claim(request()).unwrap().amount
        };

        let engine = file_engine(dir.path(), small_pool());
        let view = engine.view();
        assert_eq!(view.records.len(), 1);
        assert_eq!(view.records[0].claimant_name, name);
        assert_eq!(view.records[0].origin_address, "1.1.1.1");
        assert_eq!(view.records[0].amount, amount);

        assert_eq!(
            engine.claim(request()).unwrap_err(),
            ClaimError::Rejected(RejectReason::OriginAlreadyUsed)
        );
        let mut elsewhere = request();
        elsewhere.origin_address = "9.9.9.9".into();
        assert_eq!(
            engine.claim(elsewhere).unwrap_err(),
            ClaimError::Rejected(RejectReason::IdentityAlreadyClaimed)
        );
    }
}
