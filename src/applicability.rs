//! The applicability checker (spec.md §4.4): true iff every field path
//! collected at parse time resolves, in applicability mode, against every
//! given record.
//!
//! The source checker deduplicates by record *type* so that, e.g., a hundred
//! elements of the same type are probed once (`evaluator.go`'s `AppliesTo`).
//! The `Record` trait here deliberately carries no reflection (spec.md §9,
//! SPEC_FULL.md's Field-Path Resolver section), so there is no type tag to
//! dedup on; every record is probed independently instead. This only costs
//! redundant work on large same-typed batches, it never changes the result.

use crate::resolver::{self, Record};

pub fn applies_to(fields: &[String], records: &[&dyn Record]) -> bool {
    records
        .iter()
        .all(|r| fields.iter().all(|f| resolver::is_applicable(*r, f)))
}
