//! # Concurrency
//!
//! Claims from many threads against a file-backed engine. The log must end
//! up with exactly one line per successful claim and the pool must never
//! hand out more units than it holds.

#[cfg(test)]
mod tests {
    use crate::fixtures::{claimant, file_engine, small_pool};
    use lp_pool_engine::domain::format::{decode_line, DecodedLine};
    use lp_pool_engine::{AllocationApi, ClaimError, ClaimRequest, RejectReason};
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    #[test]
    fn test_racing_claimants_never_overdraw() {
        let dir = TempDir::new().unwrap();
        let engine = Arc::new(file_engine(dir.path(), small_pool()));

        let handles: Vec<_> = (0..48)
            .map(|n| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || engine.claim(claimant(n)))
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(winners.len(), 7);
        for result in &results {
            if let Err(e) = result {
                assert_eq!(*e, ClaimError::Rejected(RejectReason::PoolExhausted));
            }
        }

        let mut drawn: HashMap<u64, u32> = HashMap::new();
        for allocation in &winners {
            *drawn.entry(allocation.amount).or_default() += 1;
        }
        assert_eq!(drawn.get(&20_000), Some(&3));
        assert_eq!(drawn.get(&10_000), Some(&4));

        let content = std::fs::read_to_string(dir.path().join("lixi.log")).unwrap();
        let lines = content.lines().filter(|l| matches!(decode_line(l), DecodedLine::Record(_))).count();
        assert_eq!(lines, 7);
        assert!(engine.view().pool.is_exhausted());
    }

    #[test]
    fn test_same_origin_race_has_one_winner() {
        let dir = TempDir::new().unwrap();
        let engine = Arc::new(file_engine(dir.path(), small_pool()));

        let handles: Vec<_> = (0..16)
            .map(|n| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || {
                    engine.claim(ClaimRequest::new(
                        format!("Khách {n}"),
                        format!("{n}"),
                        "TCB",
                        "203.0.113.9",
                    ))
                })
            })
            .collect();

        let mut accepted = 0;
        for handle in handles {
            match handle.join().unwrap() {
                Ok(_) => accepted += 1,
                Err(e) => assert_eq!(e, ClaimError::Rejected(RejectReason::OriginAlreadyUsed)),
            }
        }
        assert_eq!(accepted, 1);
        assert_eq!(engine.view().total_remaining(), 6);
    }

    #[test]
    fn test_same_identity_race_has_one_winner() {
        let dir = TempDir::new().unwrap();
        let engine = Arc::new(file_engine(dir.path(), small_pool()));

        let handles: Vec<_> = (0..16)
            .map(|n| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || {
                    engine.claim(ClaimRequest::new(
                        "Trần Văn B",
                        "0001",
                        "BIDV",
                        format!("198.51.100.{n}"),
                    ))
                })
            })
            .collect();

        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|r| r.is_ok())
            .count();
        assert_eq!(accepted, 1);
        assert_eq!(engine.view().total_recipients(), 1);
    }
}
