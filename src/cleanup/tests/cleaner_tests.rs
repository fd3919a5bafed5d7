//! Service tests for single-relationship cleanup.

use crate::cleanup::{
    adapters::memory::InMemoryDatabase,
    domain::{CleanupOptions, CleanupStatement, DeletePolicy, ForeignKeyDefinition, ParentKey},
    ports::{ConnectionResolver, ExecutorError, StatementExecutor},
    services::{CleanerError, CleanerService},
};
use rstest::{fixture, rstest};
use std::sync::Arc;

fn nullify_definition() -> ForeignKeyDefinition {
    ForeignKeyDefinition::new(
        "issues",
        "projects",
        vec!["project_id".to_owned()],
        DeletePolicy::AsyncNullify,
        "core",
    )
    .expect("valid definition")
}

fn delete_definition() -> ForeignKeyDefinition {
    ForeignKeyDefinition::new(
        "issues",
        "projects",
        vec!["project_id".to_owned()],
        DeletePolicy::AsyncDelete,
        "core",
    )
    .expect("valid definition")
}

#[fixture]
fn database() -> InMemoryDatabase {
    let database = InMemoryDatabase::new();
    database
        .create_table("issues", &["id"])
        .expect("table creation");
    database
}

fn service(database: &InMemoryDatabase) -> CleanerService<InMemoryDatabase> {
    CleanerService::new(Arc::new(database.clone()))
}

fn seed_issues(database: &InMemoryDatabase) {
    database
        .insert("issues", &[("id", 1), ("project_id", 42), ("milestone_id", 9)])
        .expect("row insert");
    database
        .insert("issues", &[("id", 2), ("project_id", 42), ("milestone_id", 9)])
        .expect("row insert");
    database
        .insert("issues", &[("id", 3), ("project_id", 43), ("milestone_id", 9)])
        .expect("row insert");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn nullify_keeps_rows_and_clears_only_the_referencing_column(database: InMemoryDatabase) {
    seed_issues(&database);

    let outcome = service(&database)
        .execute(
            &nullify_definition(),
            &[ParentKey::Scalar(42)],
            CleanupOptions::default(),
        )
        .await
        .expect("cleanup should succeed");

    assert_eq!(outcome.affected_row_count(), 2);
    assert_eq!(database.count_rows("issues"), 3);
    assert_eq!(database.count_rows_where("issues", "project_id", None), 2);
    // Other columns stay untouched.
    assert_eq!(database.count_rows_where("issues", "milestone_id", Some(9)), 3);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_removes_matched_rows_entirely(database: InMemoryDatabase) {
    seed_issues(&database);

    let outcome = service(&database)
        .execute(
            &delete_definition(),
            &[ParentKey::Scalar(42)],
            CleanupOptions::default(),
        )
        .await
        .expect("cleanup should succeed");

    assert_eq!(outcome.affected_row_count(), 2);
    assert_eq!(database.count_rows("issues"), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rows_of_parents_outside_the_batch_are_never_affected(database: InMemoryDatabase) {
    seed_issues(&database);

    service(&database)
        .execute(
            &delete_definition(),
            &[ParentKey::Scalar(42)],
            CleanupOptions::default(),
        )
        .await
        .expect("cleanup should succeed");

    assert_eq!(database.count_rows_where("issues", "project_id", Some(43)), 1);
}

#[rstest]
#[case::nullify(DeletePolicy::AsyncNullify)]
#[case::delete(DeletePolicy::AsyncDelete)]
#[tokio::test(flavor = "multi_thread")]
async fn second_pass_over_the_same_batch_affects_zero_rows(
    database: InMemoryDatabase,
    #[case] policy: DeletePolicy,
) {
    seed_issues(&database);
    let definition = ForeignKeyDefinition::new(
        "issues",
        "projects",
        vec!["project_id".to_owned()],
        policy,
        "core",
    )
    .expect("valid definition");
    let cleaner = service(&database);

    let first = cleaner
        .execute(&definition, &[ParentKey::Scalar(42)], CleanupOptions::default())
        .await
        .expect("first pass should succeed");
    let second = cleaner
        .execute(&definition, &[ParentKey::Scalar(42)], CleanupOptions::default())
        .await
        .expect("second pass should succeed");

    assert_eq!(first.affected_row_count(), 2);
    assert_eq!(second.affected_row_count(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn multi_column_keys_match_the_full_tuple_only(database: InMemoryDatabase) {
    database
        .create_table("pipeline_artifacts", &["id"])
        .expect("table creation");
    let rows = [
        ("victim", 1, 7, 100),
        ("same_pipeline_other_partition", 2, 7, 101),
        ("same_partition_other_pipeline", 3, 8, 100),
    ];
    for (_, id, pipeline_id, partition_id) in rows {
        database
            .insert(
                "pipeline_artifacts",
                &[("id", id), ("pipeline_id", pipeline_id), ("partition_id", partition_id)],
            )
            .expect("row insert");
    }
    let definition = ForeignKeyDefinition::new(
        "pipeline_artifacts",
        "pipelines",
        vec!["pipeline_id".to_owned(), "partition_id".to_owned()],
        DeletePolicy::AsyncDelete,
        "ci",
    )
    .expect("valid definition");

    let outcome = service(&database)
        .execute(
            &definition,
            &[ParentKey::Composite(vec![7, 100])],
            CleanupOptions::default(),
        )
        .await
        .expect("cleanup should succeed");

    assert_eq!(outcome.affected_row_count(), 1);
    assert_eq!(database.count_rows("pipeline_artifacts"), 2);
    assert_eq!(
        database.count_rows_where("pipeline_artifacts", "id", Some(1)),
        0
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn affected_rows_are_capped_by_the_policy_batch_limit(database: InMemoryDatabase) {
    for id in 0..1100 {
        database
            .insert("issues", &[("id", id), ("project_id", 42)])
            .expect("row insert");
    }

    let outcome = service(&database)
        .execute(
            &delete_definition(),
            &[ParentKey::Scalar(42)],
            CleanupOptions::default(),
        )
        .await
        .expect("cleanup should succeed");

    assert_eq!(outcome.affected_row_count(), 1000);
    assert_eq!(database.count_rows("issues"), 100);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn empty_batch_short_circuits_without_building_a_statement(database: InMemoryDatabase) {
    seed_issues(&database);

    let outcome = service(&database)
        .execute(&delete_definition(), &[], CleanupOptions::default())
        .await
        .expect("empty batch should succeed");

    assert_eq!(outcome.affected_row_count(), 0);
    assert!(database.executed_statements().is_empty());
    assert_eq!(database.count_rows("issues"), 3);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn locked_rows_are_skipped_and_left_for_the_next_pass(database: InMemoryDatabase) {
    seed_issues(&database);
    database
        .lock_rows("issues", "id", 1)
        .expect("row locking");

    let outcome = service(&database)
        .execute(
            &delete_definition(),
            &[ParentKey::Scalar(42)],
            CleanupOptions::skipping_locked_rows(),
        )
        .await
        .expect("cleanup should succeed");

    assert_eq!(outcome.affected_row_count(), 1);
    assert_eq!(database.count_rows_where("issues", "id", Some(1)), 1);
    let statements = database.executed_statements();
    assert_eq!(statements.len(), 1);
    assert!(
        statements
            .iter()
            .all(|sql| sql.contains("FOR UPDATE SKIP LOCKED"))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn safety_assertion_aborts_before_touching_the_database(database: InMemoryDatabase) {
    seed_issues(&database);
    let definition = delete_definition();
    let executor: Arc<dyn StatementExecutor> = Arc::new(database.clone());
    let primary_key = vec!["id".to_owned()];
    // Simulate a query-building bug that dropped the key predicate.
    let broken = CleanupStatement::build(
        &definition,
        &primary_key,
        &[ParentKey::Scalar(42)],
        CleanupOptions::default(),
    )
    .expect("buildable statement")
    .with_foreign_key_columns(Vec::new());

    let result = service(&database)
        .execute_statement(&executor, &definition, &broken)
        .await;

    assert!(matches!(
        result,
        Err(CleanerError::ForeignKeyConditionMissing { .. })
    ));
    assert!(database.executed_statements().is_empty());
    assert_eq!(database.count_rows("issues"), 3);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn execution_errors_propagate_uncaught(database: InMemoryDatabase) {
    let definition = ForeignKeyDefinition::new(
        "ghosts",
        "projects",
        vec!["project_id".to_owned()],
        DeletePolicy::AsyncDelete,
        "core",
    )
    .expect("valid definition");

    let result = service(&database)
        .execute(&definition, &[ParentKey::Scalar(42)], CleanupOptions::default())
        .await;

    assert!(matches!(
        result,
        Err(CleanerError::Executor(ExecutorError::MissingTable(table, _))) if table == "ghosts"
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn resolver_hands_back_the_shared_connection(database: InMemoryDatabase) {
    let resolved = database.resolve("issues").expect("resolvable table");
    assert_eq!(resolved.name(), "main");
}
