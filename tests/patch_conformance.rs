//! Merge-patch conformance.
//!
//! Covers the merge semantics (overwrite, insert, empty-means-delete,
//! recursive object merge), the outcome reporting, the ill-formed-patch
//! fallback, and the atomicity guarantees.

use jsonk::{apply_patch, parse, Error, JsonkResult, PatchOutcome, PatchReport};

fn apply_into(target: &[u8], patch: &[u8], cap: usize) -> (JsonkResult<PatchReport>, Vec<u8>) {
    let mut out = vec![0u8; cap];
    let result = apply_patch(target, patch, &mut out);
    (result, out)
}

fn apply_ok(target: &[u8], patch: &[u8]) -> (PatchOutcome, Vec<u8>) {
    let (result, mut out) = apply_into(target, patch, 4096);
    let report = result.unwrap();
    out.truncate(report.len);
    (report.outcome, out)
}

// ============================================================================
// Merge semantics
// ============================================================================

#[test]
fn patch_overwrites_and_appends_members() {
    let (outcome, out) = apply_ok(
        br#"{"name":"Mehran","age":30,"city":"CPH"}"#,
        br#"{"age":31,"country":"DK"}"#,
    );
    assert_eq!(outcome, PatchOutcome::Applied);
    assert_eq!(out, br#"{"name":"Mehran","age":31,"city":"CPH","country":"DK"}"#);
}

#[test]
fn patch_empty_values_delete_members() {
    let (outcome, out) = apply_ok(
        br#"{"keep":"this","remove_me":"x","also":42}"#,
        br#"{"remove_me":null,"also":"","new":"added"}"#,
    );
    assert_eq!(outcome, PatchOutcome::Applied);
    assert_eq!(out, br#"{"keep":"this","new":"added"}"#);
}

#[test]
fn patch_empty_object_and_array_delete_members() {
    let (outcome, out) = apply_ok(
        br#"{"a":1,"b":2,"c":3}"#,
        br#"{"a":{},"b":[]}"#,
    );
    assert_eq!(outcome, PatchOutcome::Applied);
    assert_eq!(out, br#"{"c":3}"#);
}

#[test]
fn patch_merges_nested_objects_recursively() {
    let (outcome, out) = apply_ok(
        br#"{"user":{"name":"M","profile":{"age":30}},"meta":{"v":1}}"#,
        br#"{"user":{"profile":{"age":31,"city":"CPH"}},"meta":{"updated":true}}"#,
    );
    assert_eq!(outcome, PatchOutcome::Applied);
    assert_eq!(
        out,
        br#"{"user":{"name":"M","profile":{"age":31,"city":"CPH"}},"meta":{"v":1,"updated":true}}"#
    );
}

#[test]
fn patch_replaces_when_types_differ() {
    let (outcome, out) = apply_ok(br#"{"a":{"deep":1}}"#, br#"{"a":[1,2]}"#);
    assert_eq!(outcome, PatchOutcome::Applied);
    assert_eq!(out, br#"{"a":[1,2]}"#);
}

#[test]
fn patch_member_set_is_union_of_target_and_patch() {
    let target = br#"{"a":1,"b":2}"#;
    let patch = br#"{"b":20,"c":30}"#;
    let (_, out) = apply_ok(target, patch);

    let merged = parse(&out).unwrap();
    let object = merged.as_object().unwrap();
    assert_eq!(object.len(), 3);
    assert_eq!(merged.get(b"a").and_then(jsonk::JsonValue::as_i64), Some(1));
    assert_eq!(merged.get(b"b").and_then(jsonk::JsonValue::as_i64), Some(20));
    assert_eq!(merged.get(b"c").and_then(jsonk::JsonValue::as_i64), Some(30));
}

// ============================================================================
// Outcome reporting
// ============================================================================

#[test]
fn patch_reports_no_change_when_nothing_changes() {
    let (outcome, out) = apply_ok(br#"{"a":1}"#, br#"{"a":1,"gone":null}"#);
    assert_eq!(outcome, PatchOutcome::NoChange);
    assert_eq!(out, br#"{"a":1}"#);
}

#[test]
fn patch_is_idempotent_second_application_reports_no_change() {
    let target = br#"{"name":"M","age":30,"tmp":"x"}"#;
    let patch = br#"{"age":31,"tmp":null,"tag":"v1"}"#;

    let (first_outcome, first) = apply_ok(target, patch);
    assert_eq!(first_outcome, PatchOutcome::Applied);

    let (second_outcome, second) = apply_ok(&first, patch);
    assert_eq!(second_outcome, PatchOutcome::NoChange);
    assert_eq!(second, first);
}

#[test]
fn patch_empty_patch_object_is_no_change() {
    let (outcome, out) = apply_ok(br#"{"a":1}"#, b"{}");
    assert_eq!(outcome, PatchOutcome::NoChange);
    assert_eq!(out, br#"{"a":1}"#);
}

// ============================================================================
// Ill-formed-patch fallback
// ============================================================================

#[test]
fn malformed_patch_passes_target_through() {
    let target = br#"{"name":"M","age":30}"#;
    let (result, mut out) = apply_into(target, br#"{"name":"J","invalid":}"#, 4096);
    let report = result.unwrap();
    assert_eq!(report.outcome, PatchOutcome::NoChange);
    out.truncate(report.len);
    assert_eq!(out, target);
}

#[test]
fn malformed_patch_with_small_buffer_overflows() {
    let target = br#"{"name":"M","age":30}"#;
    let (result, _) = apply_into(target, b"not json", target.len() - 1);
    assert_eq!(result, Err(Error::BufferOverflow));
}

// ============================================================================
// Error outcomes and atomicity
// ============================================================================

#[test]
fn unparseable_target_is_a_parse_error() {
    let (result, out) = apply_into(b"{broken", br#"{"a":1}"#, 256);
    assert!(result.is_err());
    assert!(!matches!(result, Err(Error::NotAnObject)));
    assert!(out.iter().all(|&b| b == 0), "result buffer must stay untouched");
}

#[test]
fn non_object_target_is_a_type_error() {
    let (result, _) = apply_into(b"[1,2,3]", br#"{"a":1}"#, 256);
    assert_eq!(result, Err(Error::NotAnObject));
}

#[test]
fn non_object_patch_is_a_type_error() {
    let (result, out) = apply_into(br#"{"a":1}"#, b"[1,2,3]", 256);
    assert_eq!(result, Err(Error::NotAnObject));
    assert!(out.iter().all(|&b| b == 0), "result buffer must stay untouched");
}

#[test]
fn result_buffer_too_small_reports_overflow_and_writes_nothing_usable() {
    let target = br#"{"name":"M"}"#;
    let patch = br#"{"d":"a very long description that cannot possibly fit in the result"}"#;
    let (result, _) = apply_into(target, patch, 50);
    assert_eq!(result, Err(Error::BufferOverflow));
}

#[test]
fn failed_patch_leaves_inputs_unmodified() {
    let target = br#"{"a":{"b":1}}"#.to_vec();
    let patch = br#"{"a":{"c":"grows beyond the tiny output buffer"}}"#.to_vec();

    let (result, _) = apply_into(&target, &patch, 8);
    assert_eq!(result, Err(Error::BufferOverflow));

    // The serialized inputs still parse to their original trees.
    assert_eq!(parse(&target).unwrap(), parse(br#"{"a":{"b":1}}"#).unwrap());
    assert_eq!(
        parse(&patch).unwrap(),
        parse(br#"{"a":{"c":"grows beyond the tiny output buffer"}}"#).unwrap()
    );
}
