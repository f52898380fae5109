//! Unit tests for the progress tracker

use super::*;
use tempfile::TempDir;

fn policy() -> ProgressPolicy {
    ProgressPolicy {
        checkpoint_every: 25,
        checkpoint_interval: Duration::from_secs(3600),
        max_record_retries: 3,
    }
}

fn tracker(dir: &TempDir) -> ProgressTracker {
    ProgressTracker::load(&dir.path().join("season-2024.json"), "season-2024", false, policy())
        .unwrap()
}

#[test]
fn test_fresh_tracker_attempts_everything() {
    let dir = TempDir::new().unwrap();
    let tracker = tracker(&dir);
    assert!(tracker.should_attempt("G1", false));
    assert!(tracker.record().processed.is_empty());
}

#[test]
fn test_failed_uid_succeeds_on_next_run() {
    let dir = TempDir::new().unwrap();

    let mut first = tracker(&dir);
    first.record_success("G1");
    first.record_failure("G2");
    first.checkpoint().unwrap();
    assert!(first.record().failed.contains("G2"));

    let mut second = tracker(&dir);
    assert!(!second.should_attempt("G1", false));
    assert!(second.should_attempt("G2", false));
    second.record_success("G2");
    second.checkpoint().unwrap();

    let saved = std::fs::read_to_string(second.path()).unwrap();
    let record: ProgressRecord = serde_json::from_str(&saved).unwrap();
    assert!(record.processed.contains("G2"));
    assert!(!record.failed.contains("G2"));
    assert!(record.attempts.is_empty());
}

#[test]
fn test_failure_is_recorded_once() {
    let dir = TempDir::new().unwrap();
    let mut tracker = tracker(&dir);
    tracker.record_failure("G1");
    tracker.record_failure("G1");

    assert_eq!(tracker.record().failed.len(), 1);
    assert_eq!(tracker.attempts("G1"), 2);
    assert_eq!(tracker.pending_failures(), vec!["G1".to_string()]);
}

#[test]
fn test_failure_after_success_keeps_processed() {
    let dir = TempDir::new().unwrap();
    let mut tracker = tracker(&dir);
    tracker.record_success("G1");
    tracker.record_failure("G1");

    assert!(tracker.is_processed("G1"));
    assert!(tracker.record().failed.is_empty());
}

#[test]
fn test_retry_ceiling_excludes_uid() {
    let dir = TempDir::new().unwrap();
    let mut tracker = tracker(&dir);
    for _ in 0..3 {
        assert!(tracker.should_attempt("G1", false));
        tracker.record_failure("G1");
    }

    assert!(!tracker.should_attempt("G1", false));
    assert!(!tracker.should_attempt("G1", true));
    assert_eq!(tracker.excluded(), vec!["G1".to_string()]);
    assert!(tracker.pending_failures().is_empty());
}

#[test]
fn test_refresh_revisits_processed_uids() {
    let dir = TempDir::new().unwrap();
    let mut tracker = tracker(&dir);
    tracker.record_success("G1");

    assert!(!tracker.should_attempt("G1", false));
    assert!(tracker.should_attempt("G1", true));
}

#[test]
fn test_processed_only_grows_across_runs() {
    let dir = TempDir::new().unwrap();
    let mut previous = BTreeSet::new();

    for run in 0..3 {
        let mut tracker = tracker(&dir);
        assert!(tracker.record().processed.is_superset(&previous));
        for i in 0..10 {
            let uid = format!("G{}", run * 10 + i);
            if i % 3 == 0 {
                tracker.record_failure(&uid);
            } else {
                tracker.record_success(&uid);
            }
        }
        tracker.checkpoint().unwrap();
        previous = tracker.record().processed.clone();
    }
    assert_eq!(previous.len(), 18);
}

#[test]
fn test_checkpoint_is_batched() {
    let dir = TempDir::new().unwrap();
    let mut tracker = tracker(&dir);

    for i in 0..24 {
        tracker.record_success(&format!("G{}", i));
        assert!(!tracker.maybe_checkpoint().unwrap());
    }
    assert!(!tracker.path().exists());

    tracker.record_success("G24");
    assert!(tracker.maybe_checkpoint().unwrap());
    assert!(tracker.path().exists());
    assert!(!tracker.path().with_extension("json.tmp").exists());
}

#[test]
fn test_reset_ignores_existing_checkpoint() {
    let dir = TempDir::new().unwrap();
    let mut first = tracker(&dir);
    first.record_success("G1");
    first.checkpoint().unwrap();

    let path = dir.path().join("season-2024.json");
    let reset = ProgressTracker::load(&path, "season-2024", true, policy()).unwrap();
    assert!(reset.should_attempt("G1", false));

    assert!(ProgressTracker::remove(&path).unwrap());
    assert!(!ProgressTracker::remove(&path).unwrap());
    assert!(!path.exists());
}

#[test]
fn test_other_run_id_starts_fresh() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("season-2024.json");
    let mut other = ProgressTracker::load(&path, "season-2023", false, policy()).unwrap();
    other.record_success("G1");
    other.checkpoint().unwrap();

    let tracker = tracker(&dir);
    assert_eq!(tracker.record().run_id, "season-2024");
    assert!(tracker.should_attempt("G1", false));
}
