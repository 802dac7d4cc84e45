//! The field-path resolver (spec.md §4.3).
//!
//! Rust has no runtime field reflection, so the engine depends only on this
//! trait -- never on a concrete host type -- in the same spirit as the
//! teacher's `GridProxy` (`reference-teacher/formulas/ctx.rs`,
//! `reference-teacher/formulas/grid_proxy.rs`). `field()` is expected to do
//! its own case-insensitive name comparison; the resolver itself never
//! lowercases anything.

use smallvec::SmallVec;

use crate::value::Value;

/// A host-supplied record. The engine never constructs one itself.
pub trait Record {
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

/// What a single field lookup can produce.
pub enum FieldValue<'a> {
    Scalar(Value),
    /// A pointer/reference is dereferenced transparently by virtue of being
    /// a `&dyn Record` already -- there is no separate "deref" step to model.
    Nested(&'a dyn Record),
    Collection(Box<dyn Iterator<Item = &'a dyn Record> + 'a>),
}

#[derive(Clone, Copy)]
enum Mode {
    Eval,
    Applicability,
}

/// Resolves a dotted path against `record` in evaluation mode: every
/// resolved scalar, in element order, fanning out over any collection-valued
/// segment. `None` means "not resolvable" (spec.md §4.3) -- a type mismatch,
/// a missing field, or (in applicability mode) an empty collection.
pub fn resolve_eval(record: &dyn Record, path: &str) -> Option<Vec<Value>> {
    let segments: SmallVec<[&str; 4]> = path.split('.').collect();
    resolve_path(record, &segments, Mode::Eval)
}

/// Probes a dotted path in applicability mode: only the first element of any
/// collection is descended into (a structural probe, not a full fan-out).
pub fn is_applicable(record: &dyn Record, path: &str) -> bool {
    let segments: SmallVec<[&str; 4]> = path.split('.').collect();
    resolve_path(record, &segments, Mode::Applicability).is_some()
}

fn resolve_path(record: &dyn Record, segments: &[&str], mode: Mode) -> Option<Vec<Value>> {
    let (head, rest) = segments.split_first()?;
    match record.field(head)? {
        FieldValue::Scalar(v) => {
            if rest.is_empty() {
                Some(vec![v])
            } else {
                // Trying to traverse past a scalar: a type mismatch, not fatal.
                None
            }
        }
        FieldValue::Nested(nested) => {
            if rest.is_empty() {
                // A bare reference to a sub-record has no scalar rendering.
                None
            } else {
                resolve_path(nested, rest, mode)
            }
        }
        FieldValue::Collection(mut iter) => {
            if rest.is_empty() {
                return None;
            }
            match mode {
                Mode::Applicability => {
                    let first = iter.next()?;
                    resolve_path(first, rest, mode)
                }
                Mode::Eval => {
                    let mut out = Vec::new();
                    for elem in iter {
                        out.extend(resolve_path(elem, rest, mode)?);
                    }
                    Some(out)
                }
            }
        }
    }
}
