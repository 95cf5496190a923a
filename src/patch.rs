//! Atomic JSON merge patching.
//!
//! A merge patch is itself a JSON object: each of its members overwrites
//! the same-named member of the target, empty values delete, and nested
//! objects merge recursively. The apply pipeline is
//! parse-both → deep-copy-target → merge-into-copy → serialize, so any
//! failure leaves the caller's buffers semantically untouched: either the
//! whole patch takes effect in the output or none of it does.
//!
//! One deliberate leniency: when the target is a well-formed object but
//! the patch does not parse, the target bytes are passed through verbatim
//! and the apply reports no change.

use crate::error::{Error, JsonkResult};
use crate::parser::parse;
use crate::serializer::serialize;
use crate::value::{JsonObject, JsonValue};

/// Outcome of a successful apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// At least one insert, delete, or replace happened at some depth.
    Applied,
    /// The merge completed without changes, or a malformed patch was
    /// degraded to a pass-through of the target.
    NoChange,
}

/// Result of a successful apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchReport {
    /// Whether the merge changed anything.
    pub outcome: PatchOutcome,
    /// Bytes written to the result buffer.
    pub len: usize,
}

/// True for values with delete semantics in a merge patch: null, the
/// empty string, an object with no members, or an array with no elements.
pub fn is_empty_value(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::String(s) => s.is_empty(),
        JsonValue::Object(o) => o.is_empty(),
        JsonValue::Array(a) => a.is_empty(),
        JsonValue::Bool(_) | JsonValue::Number(_) => false,
    }
}

/// Recursively merge `patch` into `target`, tracking whether anything
/// changed at any depth.
fn merge_objects(
    target: &mut JsonObject,
    patch: &JsonObject,
    changed: &mut bool,
) -> JsonkResult<()> {
    for member in patch.members() {
        let key = member.key();
        let patch_value = member.value();

        if is_empty_value(patch_value) {
            if target.remove_member(key).is_ok() {
                *changed = true;
            }
            continue;
        }

        match target.position(key) {
            None => {
                target.add_member(key, patch_value.deep_copy()?)?;
                *changed = true;
            }
            Some(index) => {
                let Some(existing) = target.member_at_mut(index) else {
                    return Err(Error::NoSuchEntry);
                };
                let both_objects = existing.value().is_object() && patch_value.is_object();
                if both_objects {
                    if let (JsonValue::Object(t), JsonValue::Object(p)) =
                        (existing.value_mut(), patch_value)
                    {
                        merge_objects(t, p, changed)?;
                    }
                } else if existing.value() != patch_value {
                    existing.replace_value(patch_value.deep_copy()?);
                    *changed = true;
                }
            }
        }
    }
    Ok(())
}

/// Apply a merge patch to a serialized target document.
///
/// Both `target` and `patch` must parse to objects. The merged result is
/// serialized compactly into `out` and its length reported. Outcomes:
///
/// - `Ok` with [`PatchOutcome::Applied`]: the merge changed something.
/// - `Ok` with [`PatchOutcome::NoChange`]: nothing changed, or the patch
///   was malformed and the target bytes were passed through.
/// - `Err` with a parse error: the target did not parse.
/// - `Err` with [`Error::NotAnObject`]: target or patch is not an object.
/// - `Err` with a memory error: an allocation failed along the way.
/// - `Err` with [`Error::BufferOverflow`]: `out` is too small; nothing is
///   reported as written.
pub fn apply_patch(target: &[u8], patch: &[u8], out: &mut [u8]) -> JsonkResult<PatchReport> {
    let target_doc = parse(target)?;
    if !target_doc.is_object() {
        return Err(Error::NotAnObject);
    }

    let patch_doc = match parse(patch) {
        Ok(doc) => doc,
        Err(e) if e.is_parse_failure() => {
            tracing::debug!(error = %e, "patch did not parse; passing target through");
            if target.len() <= out.len() {
                out[..target.len()].copy_from_slice(target);
                return Ok(PatchReport {
                    outcome: PatchOutcome::NoChange,
                    len: target.len(),
                });
            }
            return Err(Error::BufferOverflow);
        }
        Err(e) => return Err(e),
    };
    if !patch_doc.is_object() {
        return Err(Error::NotAnObject);
    }

    // Merge into a deep copy; the parsed target stays pristine until the
    // serialized result is known to fit.
    let mut merged = target_doc.deep_copy()?;
    let mut changed = false;
    if let (Some(target_obj), Some(patch_obj)) = (merged.as_object_mut(), patch_doc.as_object()) {
        merge_objects(target_obj, patch_obj, &mut changed)?;
    }

    let len = serialize(&merged, out)?;
    Ok(PatchReport {
        outcome: if changed {
            PatchOutcome::Applied
        } else {
            PatchOutcome::NoChange
        },
        len,
    })
}
