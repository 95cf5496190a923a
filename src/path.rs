//! Dot-path access to object trees.
//!
//! Paths are ASCII dot-separated key sequences such as
//! `user.profile.name`. There is no array indexing and no escape for `.`
//! inside a key, so a component can never contain a dot. Components are
//! matched against key bytes in their stored (source) form.

use crate::error::{Error, JsonkResult};
use crate::limits::MAX_PATH_LEN;
use crate::value::{JsonObject, JsonValue, Member};

/// Descend `path` from `root` and return the value it names.
///
/// The root and every non-terminal hop must be objects; the terminal
/// value may be of any type. Returns `None` when the path is empty or
/// over-long, a component is missing, or a non-terminal hop is not an
/// object.
pub fn get_by_path<'v>(root: &'v JsonValue, path: &str) -> Option<&'v JsonValue> {
    if path.is_empty() || path.len() > MAX_PATH_LEN {
        return None;
    }
    let mut current = root;
    for component in path.split('.') {
        current = current.as_object()?.find(component.as_bytes())?.value();
    }
    Some(current)
}

/// Write a deep copy of `value` at `path` under `root`.
///
/// Missing non-terminal components are created as empty objects; an
/// existing non-terminal member that is not an object is replaced by a
/// fresh empty object (its previous value is released). At the terminal
/// component an existing member's value is replaced, otherwise a new
/// member is appended. The caller keeps ownership of `value`.
pub fn set_by_path(root: &mut JsonValue, path: &str, value: &JsonValue) -> JsonkResult<()> {
    if path.is_empty() || path.len() > MAX_PATH_LEN {
        return Err(Error::InvalidArgument);
    }
    let Some(mut current) = root.as_object_mut() else {
        return Err(Error::NotAnObject);
    };

    let mut components = path.split('.').peekable();
    while let Some(component) = components.next() {
        let key = component.as_bytes();

        if components.peek().is_none() {
            let copy = value.deep_copy()?;
            match current.position(key) {
                Some(index) => {
                    if let Some(member) = current.member_at_mut(index) {
                        member.replace_value(copy);
                    }
                }
                None => current.add_member(key, copy)?,
            }
            return Ok(());
        }

        let index = match current.position(key) {
            Some(index) => {
                let Some(member) = current.member_at_mut(index) else {
                    return Err(Error::NoSuchEntry);
                };
                if !member.value().is_object() {
                    member.replace_value(JsonValue::Object(JsonObject::new()));
                }
                index
            }
            None => {
                current.add_member(key, JsonValue::Object(JsonObject::new()))?;
                current.len() - 1
            }
        };

        current = match current.member_at_mut(index).map(Member::value_mut) {
            Some(JsonValue::Object(next)) => next,
            _ => return Err(Error::NoSuchEntry),
        };
    }

    Err(Error::InvalidArgument)
}
