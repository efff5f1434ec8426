use super::*;

fn state(pipeline: PipelineId, name: &str, hash: &str) -> NodeState {
    NodeState {
        pipeline,
        name: name.to_string(),
        hash: hash.to_string(),
        cleanup: format!("drop view {};", name),
    }
}

#[tokio::test]
async fn test_register_pipeline_is_stable() {
    let db = MemoryBackend::new();
    let cough = db.register_pipeline("cough");
    let chills = db.register_pipeline("chills");
    assert_ne!(cough, chills);
    assert_eq!(db.register_pipeline("cough"), cough);
    assert_eq!(db.find_pipeline("cough").await.unwrap(), Some(cough));
    assert_eq!(db.find_pipeline("fever").await.unwrap(), None);
}

#[tokio::test]
async fn test_states_are_scoped_and_ordered() {
    let db = MemoryBackend::new();
    let a = db.register_pipeline("a");
    let b = db.register_pipeline("b");

    db.upsert_node_state(&state(a, "d.z", "1")).await.unwrap();
    db.upsert_node_state(&state(a, "d.m", "2")).await.unwrap();
    db.upsert_node_state(&state(b, "d.m", "3")).await.unwrap();

    let loaded = db.load_node_states(a).await.unwrap();
    let names: Vec<&str> = loaded.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["d.m", "d.z"]);

    db.upsert_node_state(&state(a, "d.m", "9")).await.unwrap();
    db.delete_node_state(a, "d.z").await.unwrap();
    let loaded = db.load_node_states(a).await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].hash, "9");

    // Other pipeline untouched
    assert_eq!(db.states(b)[0].hash, "3");
}

#[tokio::test]
async fn test_transaction_outcomes_are_recorded() {
    let db = MemoryBackend::new();
    db.execute("select 1").await.unwrap();

    let mut tx = db.begin().await.unwrap();
    tx.execute("create view a as select 1").await.unwrap();
    tx.commit().await.unwrap();

    let mut tx = db.begin().await.unwrap();
    tx.execute("create view b as select 1").await.unwrap();
    tx.rollback().await.unwrap();

    let outcomes: Vec<Outcome> = db.statements().iter().map(|s| s.outcome).collect();
    assert_eq!(
        outcomes,
        vec![Outcome::Autocommit, Outcome::Committed, Outcome::RolledBack]
    );
    assert_eq!(db.committed(), vec!["select 1", "create view a as select 1"]);
}

#[tokio::test]
async fn test_injected_failure_rolls_back_transaction() {
    let db = MemoryBackend::new();
    db.fail_on("broken");

    let statements = vec![
        "create view ok as select 1".to_string(),
        "create view broken as select 1".to_string(),
        "create view never as select 1".to_string(),
    ];
    let result = db.execute_in_transaction(&statements, &|| {}).await;
    assert!(matches!(result, Err(DbError::ExecutionError { .. })));

    let recorded = db.statements();
    assert_eq!(recorded.len(), 2);
    assert_eq!(recorded[0].outcome, Outcome::RolledBack);
    assert_eq!(recorded[1].outcome, Outcome::Failed);
    assert!(db.committed().is_empty());

    db.clear_failures();
    db.execute_in_transaction(&statements, &|| {}).await.unwrap();
    assert_eq!(db.committed().len(), 3);
}

#[tokio::test]
async fn test_execute_in_transaction_calls_after_each() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let db = MemoryBackend::new();
    let calls = AtomicUsize::new(0);
    let statements = vec!["a".to_string(), "b".to_string()];
    db.execute_in_transaction(&statements, &|| {
        calls.fetch_add(1, Ordering::SeqCst);
    })
    .await
    .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_dropped_transaction_rolls_back() {
    let db = MemoryBackend::new();
    {
        let mut tx = db.begin().await.unwrap();
        tx.execute("create view lost as select 1").await.unwrap();
    }
    db.execute("create view kept as select 1").await.unwrap();

    let outcomes: Vec<Outcome> = db.statements().iter().map(|s| s.outcome).collect();
    assert_eq!(outcomes, vec![Outcome::RolledBack, Outcome::Autocommit]);
    assert_eq!(db.committed(), vec!["create view kept as select 1"]);
}
