//! Queries over parsed lists by head symbol.
//!
//! Lists of the form `(name ...)` are the conventional way of tagging data
//! in this family of formats. These helpers look children up by that head
//! symbol, so that given
//!
//! ```text
//! (alpha ...)
//! (beta (x) (y qwe) (z))
//! (gamma ...)
//! ```
//!
//! the selector `"beta y"` reaches `(qwe)`.
use crate::format::SX;
use crate::value::Value;

/// Returns true iff `value` is a non-empty list whose first element is the
/// symbol `head`.
pub fn has_head(value: &Value, head: &str) -> bool {
    value
        .as_list()
        .and_then(|values| values.first())
        .and_then(Value::as_symbol)
        .is_some_and(|s| s == head)
}

/// Finds the first child of `values` of the form `(head ...)` and returns
/// it, head included.
pub fn first_by_head<'a>(values: &'a [Value], head: &str) -> Option<&'a [Value]> {
    values.iter().find_map(|value| match value {
        Value::List(list) if has_head(value, head) => Some(list.as_slice()),
        _ => None,
    })
}

/// Like [`first_by_head`], but returns the tail of the match, i.e. `(...)`
/// rather than `(head ...)`.
pub fn first_by_head_tail<'a>(values: &'a [Value], head: &str) -> Option<&'a [Value]> {
    first_by_head(values, head).map(|list| &list[1..])
}

/// Applies [`first_by_head_tail`] once per element of a selector.
///
/// The selector is itself s-expression source, parsed with [`SX`]; each of
/// its elements must be a symbol. Returns `None` when any step finds no
/// match.
///
/// # Panics
///
/// Malformed selectors are programmer errors: panics if the selector does
/// not parse or contains a non-symbol element.
pub fn by_selector<'a>(values: &'a [Value], selector: &str) -> Option<&'a [Value]> {
    let parts = match SX.parse(selector.as_bytes()) {
        Ok(parts) => parts,
        Err(err) => panic!("bad selector {selector:?}: {err}"),
    };

    let mut current = values;
    for part in &parts {
        let Some(head) = part.as_symbol() else {
            panic!("non-symbol element in selector {selector:?}");
        };
        current = first_by_head_tail(current, head)?;
    }
    Some(current)
}
