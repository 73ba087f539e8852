//! Breadth-first flushing of deferred slots in the in-progress response
//! tree.

use std::collections::VecDeque;

use indexmap::IndexMap;

use crate::executor::{ExecutionError, PartialValue};
use crate::value::Value;

/// Flush every deferred slot reachable from the top-level response map.
///
/// Classic breadth-first search: all deferred slots at depth *d* are invoked
/// before any at depth *d + 1*; within one level, map insertion order and
/// list order are preserved. A deferred completion that signals an
/// unabsorbed non-null violation aborts the flush; the driver then nulls the
/// whole response data.
pub(crate) fn dethunk_with_breadth_first_search<'a>(
    results: &mut IndexMap<String, PartialValue<'a>>,
) -> Result<(), ExecutionError> {
    let mut queue = VecDeque::new();
    dethunk_map(results, &mut queue)?;
    while let Some(node) = queue.pop_front() {
        match node {
            PartialValue::Object(map) => dethunk_map(map, &mut queue)?,
            PartialValue::List(items) => dethunk_list(items, &mut queue)?,
            PartialValue::Done(..) | PartialValue::Deferred(..) => {}
        }
    }
    Ok(())
}

/// Invoke the deferred slots directly contained in the map, then queue its
/// nested containers for the next level.
fn dethunk_map<'q, 'a>(
    map: &'q mut IndexMap<String, PartialValue<'a>>,
    queue: &mut VecDeque<&'q mut PartialValue<'a>>,
) -> Result<(), ExecutionError> {
    for slot in map.values_mut() {
        flush_slot(slot)?;
    }
    for slot in map.values_mut() {
        if matches!(slot, PartialValue::Object(..) | PartialValue::List(..)) {
            queue.push_back(slot);
        }
    }
    Ok(())
}

/// List counterpart of [`dethunk_map`], preserving element order.
fn dethunk_list<'q, 'a>(
    items: &'q mut Vec<PartialValue<'a>>,
    queue: &mut VecDeque<&'q mut PartialValue<'a>>,
) -> Result<(), ExecutionError> {
    for slot in items.iter_mut() {
        flush_slot(slot)?;
    }
    for slot in items.iter_mut() {
        if matches!(slot, PartialValue::Object(..) | PartialValue::List(..)) {
            queue.push_back(slot);
        }
    }
    Ok(())
}

/// Replace a deferred slot with the value its completion produces. A
/// completion may itself yield another deferred value; keep invoking until
/// the slot holds a plain node so no producer survives in the response.
fn flush_slot(slot: &mut PartialValue<'_>) -> Result<(), ExecutionError> {
    while matches!(slot, PartialValue::Deferred(..)) {
        let deferred = std::mem::replace(slot, PartialValue::Done(Value::Null));
        if let PartialValue::Deferred(completion) = deferred {
            *slot = completion()?;
        }
    }
    Ok(())
}
