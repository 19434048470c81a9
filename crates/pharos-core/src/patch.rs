//! JSON-Patch-style document algebra.
//!
//! Applies an ordered sequence of JSON-Pointer-addressed operations to a
//! cloned document tree. The semantics are deliberately permissive rather
//! than strict RFC 6902: an add or replace walk creates missing intermediate
//! object containers on the fly, array assignment may extend the array, and
//! removing an absent member is a no-op that materializes nothing. Structural problems (a malformed
//! pointer, a non-integer array index, a pointer descending into a scalar)
//! fail the whole apply; the partially mutated clone is discarded and the
//! caller's snapshot is never touched.
//!
//! Rollback is not derived: a rollback patch is authored alongside the
//! forward patch and applied through the same entry point.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PatchError;

/// A single JSON-Patch operation.
///
/// `value` is required for `add`/`replace` and absent for `remove`; the
/// closed enum makes unknown op kinds unrepresentable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOp {
    Add { path: String, value: Value },
    Remove { path: String },
    Replace { path: String, value: Value },
}

impl PatchOp {
    /// The JSON pointer this operation addresses.
    pub fn path(&self) -> &str {
        match self {
            PatchOp::Add { path, .. }
            | PatchOp::Remove { path }
            | PatchOp::Replace { path, .. } => path,
        }
    }
}

/// Applies `ops` in order against a deep clone of `base`.
///
/// Returns `Ok(None)` when `base` is absent: no preview is possible before
/// the resource exists (e.g. for `create` plans). A later operation may
/// depend on the shape produced by an earlier one within the same patch.
pub fn apply(base: Option<&Value>, ops: &[PatchOp]) -> Result<Option<Value>, PatchError> {
    let Some(base) = base else {
        return Ok(None);
    };

    let mut doc = base.clone();
    for op in ops {
        apply_one(&mut doc, op)?;
    }
    Ok(Some(doc))
}

fn apply_one(doc: &mut Value, op: &PatchOp) -> Result<(), PatchError> {
    let pointer = op.path();
    let segments = parse_pointer(pointer)?;

    // The pointer grammar guarantees at least one segment ("/" yields [""]).
    let (last, parents) = segments
        .split_last()
        .ok_or_else(|| PatchError::MalformedPointer {
            pointer: pointer.to_string(),
            reason: "pointer has no segments".to_string(),
        })?;

    match op {
        PatchOp::Add { value, .. } | PatchOp::Replace { value, .. } => {
            let mut cursor = doc;
            for segment in parents {
                cursor = descend(cursor, segment, pointer)?;
            }
            assign(cursor, last, value.clone(), pointer)
        }
        PatchOp::Remove { .. } => {
            let mut cursor = doc;
            for segment in parents {
                match descend_existing(cursor, segment, pointer)? {
                    Some(next) => cursor = next,
                    // Nothing to remove below a missing container.
                    None => return Ok(()),
                }
            }
            remove(cursor, last, pointer)
        }
    }
}

/// Splits a pointer into unescaped segments, discarding the leading empty
/// segment produced by the mandatory `/` prefix.
fn parse_pointer(pointer: &str) -> Result<Vec<String>, PatchError> {
    if pointer.is_empty() {
        return Err(PatchError::MalformedPointer {
            pointer: pointer.to_string(),
            reason: "pointer is empty".to_string(),
        });
    }
    if !pointer.starts_with('/') {
        return Err(PatchError::MalformedPointer {
            pointer: pointer.to_string(),
            reason: "pointer must start with '/'".to_string(),
        });
    }
    Ok(pointer.split('/').skip(1).map(unescape).collect())
}

/// RFC 6901 unescaping: `~1` before `~0`, so `~01` decodes to `~1`.
fn unescape(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// Steps one segment into `cursor`, creating a missing object member as an
/// empty object (permissive add semantics).
fn descend<'a>(
    cursor: &'a mut Value,
    segment: &str,
    pointer: &str,
) -> Result<&'a mut Value, PatchError> {
    match cursor {
        Value::Object(map) => Ok(map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(serde_json::Map::new()))),
        Value::Array(items) => {
            let index = parse_index(segment, pointer)?;
            items
                .get_mut(index)
                .ok_or_else(|| PatchError::InvalidIndex {
                    pointer: pointer.to_string(),
                    segment: segment.to_string(),
                })
        }
        _ => Err(PatchError::NotAContainer {
            pointer: pointer.to_string(),
            segment: segment.to_string(),
        }),
    }
}

/// Steps one segment into `cursor` without creating anything. `None` means
/// the container is absent, so a remove has nothing to do.
fn descend_existing<'a>(
    cursor: &'a mut Value,
    segment: &str,
    pointer: &str,
) -> Result<Option<&'a mut Value>, PatchError> {
    match cursor {
        Value::Object(map) => Ok(map.get_mut(segment)),
        Value::Array(items) => {
            let index = parse_index(segment, pointer)?;
            Ok(items.get_mut(index))
        }
        _ => Err(PatchError::NotAContainer {
            pointer: pointer.to_string(),
            segment: segment.to_string(),
        }),
    }
}

fn assign(container: &mut Value, segment: &str, value: Value, pointer: &str) -> Result<(), PatchError> {
    match container {
        Value::Object(map) => {
            map.insert(segment.to_string(), value);
            Ok(())
        }
        Value::Array(items) => {
            let index = parse_index(segment, pointer)?;
            if index >= items.len() {
                items.resize(index + 1, Value::Null);
            }
            items[index] = value;
            Ok(())
        }
        _ => Err(PatchError::NotAContainer {
            pointer: pointer.to_string(),
            segment: segment.to_string(),
        }),
    }
}

fn remove(container: &mut Value, segment: &str, pointer: &str) -> Result<(), PatchError> {
    match container {
        Value::Object(map) => {
            // Removing an absent member is a no-op.
            map.remove(segment);
            Ok(())
        }
        Value::Array(items) => {
            let index = parse_index(segment, pointer)?;
            if index < items.len() {
                items.remove(index);
            }
            Ok(())
        }
        _ => Err(PatchError::NotAContainer {
            pointer: pointer.to_string(),
            segment: segment.to_string(),
        }),
    }
}

fn parse_index(segment: &str, pointer: &str) -> Result<usize, PatchError> {
    segment
        .parse::<usize>()
        .map_err(|_| PatchError::InvalidIndex {
            pointer: pointer.to_string(),
            segment: segment.to_string(),
        })
}
