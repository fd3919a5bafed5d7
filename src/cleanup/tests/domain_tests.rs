//! Unit tests for cleanup domain types.

use crate::cleanup::domain::{
    DefinitionError, DeletePolicy, DeletedRecord, ForeignKeyDefinition, ParentKey,
    ParseDeletePolicyError, ParseRecordStatusError, RecordId, RecordStatus,
};
use chrono::Utc;
use serde_json::json;

fn definition(policy: DeletePolicy) -> ForeignKeyDefinition {
    ForeignKeyDefinition::new(
        "issues",
        "projects",
        vec!["project_id".to_owned()],
        policy,
        "core",
    )
    .expect("valid definition")
}

// ============================================================================
// DeletePolicy
// ============================================================================

#[test]
fn delete_policy_round_trips_through_configuration_strings() {
    for policy in [DeletePolicy::AsyncDelete, DeletePolicy::AsyncNullify] {
        assert_eq!(DeletePolicy::try_from(policy.as_str()), Ok(policy));
    }
}

#[test]
fn delete_policy_parse_accepts_surrounding_whitespace_and_case() {
    assert_eq!(
        DeletePolicy::try_from(" Async_Delete "),
        Ok(DeletePolicy::AsyncDelete)
    );
}

#[test]
fn delete_policy_parse_rejects_unknown_values() {
    assert_eq!(
        DeletePolicy::try_from("invalid"),
        Err(ParseDeletePolicyError("invalid".to_owned()))
    );
}

#[test]
fn nullify_runs_with_a_smaller_batch_cap_than_delete() {
    assert_eq!(DeletePolicy::AsyncDelete.batch_cap(), 1000);
    assert_eq!(DeletePolicy::AsyncNullify.batch_cap(), 500);
}

// ============================================================================
// ForeignKeyDefinition validation
// ============================================================================

#[test]
fn definition_exposes_its_parts() {
    let def = definition(DeletePolicy::AsyncNullify);
    assert_eq!(def.child_table(), "issues");
    assert_eq!(def.parent_table(), "projects");
    assert_eq!(def.foreign_key_columns(), ["project_id".to_owned()]);
    assert_eq!(def.delete_policy(), DeletePolicy::AsyncNullify);
    assert_eq!(def.schema_tag(), "core");
}

#[test]
fn definition_rejects_empty_child_table() {
    let result = ForeignKeyDefinition::new(
        "  ",
        "projects",
        vec!["project_id".to_owned()],
        DeletePolicy::AsyncDelete,
        "core",
    );
    assert_eq!(result, Err(DefinitionError::EmptyChildTable));
}

#[test]
fn definition_rejects_empty_parent_table() {
    let result = ForeignKeyDefinition::new(
        "issues",
        "",
        vec!["project_id".to_owned()],
        DeletePolicy::AsyncDelete,
        "core",
    );
    assert_eq!(result, Err(DefinitionError::EmptyParentTable));
}

#[test]
fn definition_rejects_missing_foreign_key_columns() {
    let result = ForeignKeyDefinition::new(
        "issues",
        "projects",
        Vec::new(),
        DeletePolicy::AsyncDelete,
        "core",
    );
    assert_eq!(
        result,
        Err(DefinitionError::NoForeignKeyColumns {
            child_table: "issues".to_owned(),
            parent_table: "projects".to_owned(),
        })
    );
}

#[test]
fn definition_rejects_blank_foreign_key_column_names() {
    let result = ForeignKeyDefinition::new(
        "issues",
        "projects",
        vec!["project_id".to_owned(), " ".to_owned()],
        DeletePolicy::AsyncDelete,
        "core",
    );
    assert_eq!(
        result,
        Err(DefinitionError::EmptyForeignKeyColumn {
            child_table: "issues".to_owned(),
        })
    );
}

// ============================================================================
// ParentKey
// ============================================================================

#[test]
fn scalar_parent_key_serialises_as_a_plain_number() {
    let value = serde_json::to_value(ParentKey::Scalar(42)).expect("serialisable key");
    assert_eq!(value, json!(42));
    let parsed: ParentKey = serde_json::from_value(json!(42)).expect("parseable key");
    assert_eq!(parsed, ParentKey::Scalar(42));
}

#[test]
fn composite_parent_key_serialises_as_an_array() {
    let key = ParentKey::Composite(vec![7, 42]);
    let value = serde_json::to_value(key.clone()).expect("serialisable key");
    assert_eq!(value, json!([7, 42]));
    let parsed: ParentKey = serde_json::from_value(value).expect("parseable key");
    assert_eq!(parsed, key);
}

#[test]
fn parent_key_reports_arity_and_values() {
    assert_eq!(ParentKey::Scalar(5).arity(), 1);
    assert_eq!(ParentKey::Scalar(5).values(), [5]);
    let composite = ParentKey::Composite(vec![1, 2, 3]);
    assert_eq!(composite.arity(), 3);
    assert_eq!(composite.values(), [1, 2, 3]);
}

// ============================================================================
// DeletedRecord and RecordStatus
// ============================================================================

#[test]
fn deleted_record_status_transition_is_one_way() {
    let mut record = DeletedRecord::new(
        RecordId::new(1),
        "public.projects",
        42,
        RecordStatus::Pending,
        Utc::now(),
    );
    assert!(record.is_pending());

    record.mark_processed();
    assert_eq!(record.status(), RecordStatus::Processed);

    // Marking again stays processed.
    record.mark_processed();
    assert!(!record.is_pending());
}

#[test]
fn record_status_round_trips_through_smallint() {
    assert_eq!(RecordStatus::try_from(1), Ok(RecordStatus::Pending));
    assert_eq!(RecordStatus::try_from(2), Ok(RecordStatus::Processed));
    assert_eq!(RecordStatus::Pending.as_i16(), 1);
    assert_eq!(RecordStatus::Processed.as_i16(), 2);
}

#[test]
fn record_status_rejects_unknown_smallints() {
    assert_eq!(RecordStatus::try_from(0), Err(ParseRecordStatusError(0)));
}
