// tests/snapshot_tests.rs
//
// End-to-end Q-table persistence: train, save to JSON, load, resume, and
// the failure modes a resumed run can hit (corrupt file, missing file,
// mismatched shape).

use tabq::config::{EpisodeLimits, LearningConfig};
use tabq::grid_world::GridWorld;
use tabq::policy::EpsilonGreedy;
use tabq::runner::{Algorithm, Trainer, TrainerConfig};
use tabq::snapshot::QTableSnapshot;
use tabq::RlError;

fn short_run_config() -> TrainerConfig {
    TrainerConfig {
        algorithm: Algorithm::QLearning,
        learning: LearningConfig {
            alpha: 0.5,
            discount: 0.9,
            epsilon_initial: 0.4,
            ..Default::default()
        },
        limits: EpisodeLimits {
            max_episodes: 40,
            max_steps_per_episode: 500,
            loss_settle_steps: 1,
        },
    }
}

#[test]
fn trained_table_survives_a_save_load_resume_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("qtable.json");

    let mut trainer = Trainer::new(
        GridWorld::four_by_four(3),
        EpsilonGreedy::new(3),
        short_run_config(),
    )
    .unwrap();
    trainer.run().unwrap();

    let snapshot = trainer.snapshot();
    assert!(snapshot.values.iter().any(|&v| v != 0.0), "nothing was learned");
    snapshot.save(&path).unwrap();

    let loaded = QTableSnapshot::load(&path).unwrap();
    assert_eq!(loaded, snapshot);

    // Resume and confirm the learned values carried over verbatim.
    let resumed = Trainer::resume(
        GridWorld::four_by_four(3),
        EpsilonGreedy::new(3),
        short_run_config(),
        &loaded,
    )
    .unwrap();
    assert_eq!(resumed.snapshot(), snapshot);
}

#[test]
fn resumed_run_keeps_learning_from_the_loaded_table() {
    let mut first = Trainer::new(
        GridWorld::four_by_four(9),
        EpsilonGreedy::new(9),
        short_run_config(),
    )
    .unwrap();
    first.run().unwrap();
    let warm = first.snapshot();

    let mut resumed = Trainer::resume(
        GridWorld::four_by_four(10),
        EpsilonGreedy::new(10),
        short_run_config(),
        &warm,
    )
    .unwrap();
    let summaries = resumed.run().unwrap();
    assert_eq!(summaries.len(), 40);

    // Further updates mutate the table away from the loaded values.
    assert_ne!(resumed.snapshot(), warm);
}

#[test]
fn corrupt_json_is_reported_as_a_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json ").unwrap();

    assert!(matches!(
        QTableSnapshot::load(&path),
        Err(RlError::SnapshotFormat(_))
    ));
}

#[test]
fn inconsistent_dimensions_are_rejected_at_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.json");
    // Declares 2 x 2 but carries three values.
    std::fs::write(
        &path,
        r#"{"state_count":2,"action_count":2,"values":[0.0,1.0,2.0]}"#,
    )
    .unwrap();

    assert!(matches!(
        QTableSnapshot::load(&path),
        Err(RlError::SnapshotFormat(_))
    ));
}

#[test]
fn huge_declared_dimensions_are_a_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("huge.json");
    // Declared shape whose product overflows usize must be rejected the
    // same way as any other inconsistent payload.
    std::fs::write(
        &path,
        format!(
            r#"{{"state_count":{max},"action_count":{max},"values":[]}}"#,
            max = usize::MAX
        ),
    )
    .unwrap();

    assert!(matches!(
        QTableSnapshot::load(&path),
        Err(RlError::SnapshotFormat(_))
    ));
}

#[test]
fn missing_file_is_reported_as_io() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    assert!(matches!(
        QTableSnapshot::load(&path),
        Err(RlError::SnapshotIo(_))
    ));
}

#[test]
fn resume_rejects_a_table_for_a_different_environment() {
    // A 4x4 grid table cannot seed a cliff-walk trainer.
    let mut grid_trainer = Trainer::new(
        GridWorld::four_by_four(1),
        EpsilonGreedy::new(1),
        short_run_config(),
    )
    .unwrap();
    grid_trainer.run().unwrap();
    let snapshot = grid_trainer.snapshot();

    let result = Trainer::resume(
        GridWorld::cliff_walk(1),
        EpsilonGreedy::new(1),
        short_run_config(),
        &snapshot,
    );
    assert!(matches!(result, Err(RlError::Configuration(_))));
}
