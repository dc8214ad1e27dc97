//! # Mapping Properties
//!
//! Property-based checks over generated solutions: table shape, column
//! discovery order, determinism, and validation purity.

use proptest::prelude::*;
use serde_json::{json, Value};
use suro_core::{AxisSpec, ComplexKey, MappingKind, MappingSource, OutputMapping, ValueSpec};
use suro_results::extract::{collect_matches, ColumnAxis};
use suro_results::{FlatMapper, Mapper, MatrixAppendMapper, MatrixMapper, RowMapper};

fn entry_strategy() -> impl Strategy<Value = Value> {
    (
        prop::sample::select(vec!["ORTH", "CARD", "GEN", "URO"]),
        prop::sample::select(vec!["hip", "knee", ""]),
        1u8..6,
        prop::option::of(-50i64..50),
    )
        .prop_map(|(unit, kind, week, n)| {
            let mut entry = json!({"unit": unit, "kind": kind, "week": week});
            if let Some(n) = n {
                entry["n"] = json!(n);
            }
            entry
        })
}

fn solution_strategy() -> impl Strategy<Value = Value> {
    prop::collection::vec(entry_strategy(), 0..24).prop_map(|entries| json!({ "s": entries }))
}

fn pivot(kind: MappingKind, file: &str) -> OutputMapping {
    OutputMapping::new(file, kind).with_source(
        MappingSource::new("s", AxisSpec::from_entry_keys(["unit", "kind"]))
            .with_column(AxisSpec::labelled("Week", ["week"]))
            .with_value(ValueSpec::new(["n"])),
    )
}

proptest! {
    #[test]
    fn complex_key_equality_is_order_sensitive(a in "[a-z]{1,6}", b in "[a-z]{1,6}") {
        let ab = ComplexKey::new([a.clone(), b.clone()]);
        let ba = ComplexKey::new([b.clone(), a.clone()]);
        prop_assert_eq!(ab == ba, a == b);
        prop_assert_eq!(ab.clone(), ComplexKey::new([a, b]));
    }

    #[test]
    fn matrix_rows_have_header_length(solution in solution_strategy()) {
        let table = MatrixMapper.produce_rows(&pivot(MappingKind::Matrix, "m.csv"), &solution).unwrap();
        prop_assert!(table.rows().iter().all(|r| r.len() == table.width()));
    }

    #[test]
    fn append_rows_have_header_length(solution in solution_strategy()) {
        let table = MatrixAppendMapper
            .produce_rows(&pivot(MappingKind::MatrixAppend, "a.csv"), &solution)
            .unwrap();
        prop_assert!(table.rows().iter().all(|r| r.len() == table.width()));
    }

    #[test]
    fn flat_rows_have_header_length(solution in solution_strategy()) {
        let mapping = OutputMapping::new("f.csv", MappingKind::Flat)
            .with_source(MappingSource::new("s", AxisSpec::default()));
        let table = FlatMapper.produce_rows(&mapping, &solution).unwrap();
        let entries = solution["s"].as_array().map(Vec::len).unwrap_or(0);
        prop_assert_eq!(table.rows().len(), entries);
        prop_assert!(table.rows().iter().all(|r| r.len() == table.width()));
    }

    #[test]
    fn matrix_has_one_row_per_distinct_key(solution in solution_strategy()) {
        let table = MatrixMapper.produce_rows(&pivot(MappingKind::Matrix, "m.csv"), &solution).unwrap();
        let mut keys: Vec<(String, String)> = Vec::new();
        for entry in solution["s"].as_array().unwrap() {
            let key = (
                entry["unit"].as_str().unwrap().to_string(),
                entry["kind"].as_str().unwrap().to_string(),
            );
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        let produced: Vec<(String, String)> = table
            .rows()
            .iter()
            .map(|r| (r[0].clone().unwrap(), r[1].clone().unwrap()))
            .collect();
        prop_assert_eq!(produced, keys);
    }

    #[test]
    fn column_discovery_is_deterministic(solution in solution_strategy()) {
        let mapping = pivot(MappingKind::Matrix, "m.csv");
        let first = ColumnAxis::from_sources(&mapping.sources, &solution).unwrap();
        let second = ColumnAxis::from_sources(&mapping.sources, &solution).unwrap();
        prop_assert_eq!(&first, &second);

        let entries = solution["s"].as_array().unwrap();
        let once = collect_matches(&mapping.sources[0], entries, &first);
        let twice = collect_matches(&mapping.sources[0], entries, &first);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn validation_is_pure(
        file in prop::sample::select(vec!["a.csv", "a.json", "", "a.CSV", "a.txt"]),
        kind in prop::sample::select(MappingKind::all().to_vec()),
    ) {
        let mapping = pivot(kind, file);
        let before = mapping.clone();
        if let Some(mapper) = Mapper::builtin(kind) {
            let first = mapper.check(&mapping);
            let second = mapper.check(&mapping);
            prop_assert_eq!(first, second);
            prop_assert_eq!(mapper.validate(&mapping), mapper.validate(&mapping));
        }
        prop_assert_eq!(mapping, before);
    }
}
