//! Integration tests for the complete gdxtab pipeline
//!
//! These tests verify end-to-end behavior across crates over a shared
//! fixture database: catalog loading, recursive set resolution,
//! densification, axis disambiguation, and the JSON snapshot path.
//!
//! Run with: cargo test --test integration_tests

use approx::assert_relative_eq;
use gdxtab_core::{densify, table_from_source, Densified, DomainCatalog, GdxError};
use gdxtab_frame::{CellValue, Key};
use gdxtab_model::{DomainEntry, Facet, MemoryDatabase, SymbolSource, VarFields};

/// Fixture mirroring a typical model-output database:
/// - base sets `S` (10 members) and `I` (10 integer-like members)
/// - subsets `SubS`, `SubI` (5 members each) and `SubSI` over (S, I)
/// - an empty set `E`
/// - parameters over sets, over duplicate sets, and over universal domains
/// - scalar parameter/variable symbols
fn test_database() -> MemoryDatabase {
    let mut db = MemoryDatabase::new();

    let s = db.add_set("S", vec![DomainEntry::Universal]);
    for i in 1..=10 {
        s.push_member([format!("s{i:02}")]);
    }
    let i_set = db.add_set("I", vec![DomainEntry::Universal]);
    for i in 1..=10 {
        i_set.push_member([i.to_string()]);
    }

    let sub_s = db.add_set("SubS", vec![DomainEntry::named("S")]);
    for i in 1..=5 {
        sub_s.push_member([format!("s{i:02}")]);
    }
    let sub_i = db.add_set("SubI", vec![DomainEntry::named("I")]);
    for i in 1..=5 {
        sub_i.push_member([i.to_string()]);
    }
    let sub_si = db.add_set(
        "SubSI",
        vec![DomainEntry::named("S"), DomainEntry::named("I")],
    );
    for i in 1..=5 {
        for j in 1..=5 {
            sub_si.push_member([format!("s{i:02}"), j.to_string()]);
        }
    }

    db.add_set("E", vec![DomainEntry::Universal]);

    let param_s = db.add_parameter("Param_S", vec![DomainEntry::named("S")]);
    for i in 1..=10 {
        param_s.push_value([format!("s{i:02}")], 6.0);
    }

    // Sparse: 50 of the 100 combinations stored, values summing to 1550.
    let param_ss = db.add_parameter(
        "Param_S_S",
        vec![DomainEntry::named("S"), DomainEntry::named("S")],
    );
    for i in 1..=10 {
        for j in 1..=5 {
            param_ss.push_value([format!("s{i:02}"), format!("s{j:02}")], 31.0);
        }
    }

    db.add_parameter(
        "Param_S_E",
        vec![DomainEntry::named("S"), DomainEntry::named("E")],
    );

    db.add_parameter("Scalar_P1", vec![]).push_value::<_, &str>([], 10.0);
    db.add_variable("Scalar_V1", vec![]).push_fields::<_, &str>(
        [],
        VarFields {
            level: 10.0,
            marginal: 2.0,
            lower: 0.0,
            upper: 1000.0,
            scale: 1.0,
        },
    );

    let max = db.add_parameter("MAX", vec![DomainEntry::Universal; 20]);
    for r in 1..=10 {
        let keys: Vec<String> = (1..=20).map(|d| format!("k{r}_{d}")).collect();
        max.push_value(keys, r as f64);
    }

    db
}

// ============================================================================
// Sets
// ============================================================================

#[test]
fn base_set_densifies_to_its_own_axis() {
    let db = test_database();
    let catalog = DomainCatalog::load(&db);

    let out = densify(&catalog, &db, "S", Facet::Level, 0.0).unwrap();
    let frame = out.as_table().unwrap();
    assert_eq!(frame.len(), 10);
    assert_eq!(frame.index().nlevels(), 1);
    assert_eq!(frame.index().names(), &["S".to_string()]);
    assert_eq!(frame.column(), "S");
    assert!(frame.rows().all(|(_, v)| *v == CellValue::Bool(true)));
}

#[test]
fn subset_densifies_to_present_members_over_parent_axis() {
    let db = test_database();
    let catalog = DomainCatalog::load(&db);

    let out = densify(&catalog, &db, "SubS", Facet::Level, 0.0).unwrap();
    let frame = out.as_table().unwrap();
    assert_eq!(frame.len(), 5);
    assert!(frame.rows().all(|(_, v)| *v == CellValue::Bool(true)));
    assert_eq!(frame.index().names(), &["S".to_string()]);
    assert_eq!(frame.column(), "SubS");
}

#[test]
fn two_dimensional_subset_has_both_parent_axes() {
    let db = test_database();
    let catalog = DomainCatalog::load(&db);

    let out = densify(&catalog, &db, "SubSI", Facet::Level, 0.0).unwrap();
    let frame = out.as_table().unwrap();
    assert_eq!(frame.len(), 25);
    assert_eq!(frame.index().nlevels(), 2);
    assert_eq!(frame.index().names(), &["S".to_string(), "I".to_string()]);
    // The I level is integer-like and gets cast.
    assert!(frame
        .index()
        .tuples()
        .iter()
        .all(|t| matches!(t[1], Key::Int(_))));
}

#[test]
fn empty_set_densifies_to_empty_table() {
    let db = test_database();
    let catalog = DomainCatalog::load(&db);

    let out = densify(&catalog, &db, "E", Facet::Level, 0.0).unwrap();
    let frame = out.as_table().unwrap();
    assert!(frame.is_empty());
    assert_eq!(frame.index().names(), &["E".to_string()]);
}

// ============================================================================
// Parameters
// ============================================================================

#[test]
fn parameter_over_set_is_dense_with_axis_named_after_domain() {
    let db = test_database();
    let catalog = DomainCatalog::load(&db);

    let out = densify(&catalog, &db, "Param_S", Facet::Level, 0.0).unwrap();
    let frame = out.as_table().unwrap();
    assert_eq!(frame.len(), 10);
    assert_relative_eq!(frame.column_sum(), 60.0);
    assert_eq!(frame.index().names(), &["S".to_string()]);
    assert_eq!(frame.column(), "Param_S");
}

#[test]
fn duplicate_domain_parameter_gets_suffixed_axis_and_exact_sum() {
    let db = test_database();
    let catalog = DomainCatalog::load(&db);

    let out = densify(&catalog, &db, "Param_S_S", Facet::Level, 0.0).unwrap();
    let frame = out.as_table().unwrap();
    assert_eq!(frame.len(), 100);
    assert_relative_eq!(frame.column_sum(), 1550.0);
    assert_eq!(
        frame.index().names(),
        &["S".to_string(), "S_01".to_string()]
    );
    // Both axes range over the same members.
    for tuple in frame.index().tuples() {
        for key in tuple {
            assert!(matches!(key, Key::Str(s) if s.starts_with('s')));
        }
    }
}

#[test]
fn parameter_over_empty_set_is_empty_with_axis_names() {
    let db = test_database();
    let catalog = DomainCatalog::load(&db);

    let out = densify(&catalog, &db, "Param_S_E", Facet::Level, 0.0).unwrap();
    let frame = out.as_table().unwrap();
    assert!(frame.is_empty());
    assert_eq!(frame.index().names(), &["S".to_string(), "E".to_string()]);
}

#[test]
fn cross_product_row_count_is_product_of_member_counts() {
    let db = test_database();
    let catalog = DomainCatalog::load(&db);

    for (symbol, expected) in [("Param_S", 10usize), ("Param_S_S", 100)] {
        let out = densify(&catalog, &db, symbol, Facet::Level, 0.0).unwrap();
        let frame = out.as_table().unwrap();
        assert_eq!(frame.len(), expected, "row count for {symbol}");
        let domains = catalog.domains(symbol).unwrap();
        assert_eq!(frame.index().nlevels(), domains.len());
    }
}

#[test]
fn twenty_universal_dimensions_fall_back_to_stored_tuples() {
    let db = test_database();
    let catalog = DomainCatalog::load(&db);

    let out = densify(&catalog, &db, "MAX", Facet::Level, 0.0).unwrap();
    let frame = out.as_table().unwrap();
    assert_eq!(frame.len(), 10);
    assert_eq!(frame.index().nlevels(), 20);
    let expected: Vec<String> = (1..=20).map(|d| format!("Dim{d}")).collect();
    assert_eq!(frame.index().names(), expected.as_slice());
}

// ============================================================================
// Round trip, fill, idempotence
// ============================================================================

#[test]
fn densified_values_round_trip_without_fill_contamination() {
    let db = test_database();
    let catalog = DomainCatalog::load(&db);

    let out = densify(&catalog, &db, "Param_S_S", Facet::Level, -7.0).unwrap();
    let frame = out.as_table().unwrap();

    let sym = db.symbol("Param_S_S").unwrap();
    for record in &sym.records {
        assert_eq!(frame.get(&record.keys), Some(&CellValue::Num(31.0)));
    }
    // Exactly the unstored half of the cross-product carries the fill.
    let filled = frame
        .rows()
        .filter(|(_, v)| **v == CellValue::Num(-7.0))
        .count();
    assert_eq!(filled, 50);
}

#[test]
fn densify_is_idempotent() {
    let db = test_database();
    let catalog = DomainCatalog::load(&db);

    for symbol in ["S", "SubS", "Param_S", "Param_S_S", "MAX"] {
        let a = densify(&catalog, &db, symbol, Facet::Level, 0.0).unwrap();
        let b = densify(&catalog, &db, symbol, Facet::Level, 0.0).unwrap();
        match (a, b) {
            (Densified::Table(fa), Densified::Table(fb)) => assert_eq!(fa, fb),
            (Densified::Scalar(va), Densified::Scalar(vb)) => assert_eq!(va, vb),
            _ => panic!("shape changed between calls for {symbol}"),
        }
    }
}

// ============================================================================
// Scalars and facets
// ============================================================================

#[test]
fn scalar_parameter_returns_bare_number() {
    let db = test_database();
    let out = table_from_source(&db, "Scalar_P1", None, None).unwrap();
    assert_eq!(out.as_scalar(), Some(10.0));
}

#[test]
fn scalar_variable_facets_are_case_insensitive() {
    let db = test_database();
    assert_eq!(
        table_from_source(&db, "Scalar_V1", Some("UP"), None)
            .unwrap()
            .as_scalar(),
        Some(1000.0)
    );
    assert_eq!(
        table_from_source(&db, "Scalar_V1", Some("lo"), None)
            .unwrap()
            .as_scalar(),
        Some(0.0)
    );
    assert_eq!(
        table_from_source(&db, "Scalar_V1", Some("M"), None)
            .unwrap()
            .as_scalar(),
        Some(2.0)
    );
    assert_eq!(
        table_from_source(&db, "Scalar_V1", Some("scale"), None)
            .unwrap()
            .as_scalar(),
        Some(1.0)
    );
    assert_eq!(
        table_from_source(&db, "Scalar_V1", None, None)
            .unwrap()
            .as_scalar(),
        Some(10.0)
    );
}

#[test]
fn malformed_facet_is_invalid_facet_error() {
    let db = test_database();
    let err = table_from_source(&db, "Scalar_V1", Some("lvl"), None).unwrap_err();
    assert!(matches!(err, GdxError::InvalidFacet(_)));
}

// ============================================================================
// Dump fallback
// ============================================================================

#[test]
fn dump_rows_normalize_through_the_same_densifier() {
    // The external tool yields raw sparse rows; feeding them back through a
    // database gives the same fill and disambiguation as the in-process path.
    let text = "S,S,Val\ns01,s01,31\ns01,s02,31\n";
    let rows = gdxtab_dump::parse_rows(text).unwrap();

    let mut db = test_database();
    let sym = db.add_parameter(
        "FromDump",
        vec![DomainEntry::named("S"), DomainEntry::named("S")],
    );
    for row in rows {
        sym.push_value(row.keys, row.value);
    }

    let catalog = DomainCatalog::load(&db);
    let out = densify(&catalog, &db, "FromDump", Facet::Level, 0.0).unwrap();
    let frame = out.as_table().unwrap();
    assert_eq!(frame.len(), 100);
    assert_relative_eq!(frame.column_sum(), 62.0);
    assert_eq!(
        frame.index().names(),
        &["S".to_string(), "S_01".to_string()]
    );
}

// ============================================================================
// Snapshot path
// ============================================================================

#[test]
fn json_snapshot_densifies_identically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.json");

    let db = test_database();
    db.save_json(&path).unwrap();

    // The snapshot on disk is a plain JSON list of symbol objects.
    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let symbols = raw.as_array().unwrap();
    assert_eq!(symbols.len(), db.len());
    assert_eq!(symbols[0]["name"], "S");
    assert_eq!(symbols[0]["kind"], "Set");
    assert_eq!(symbols[0]["records"].as_array().unwrap().len(), 10);

    let loaded = MemoryDatabase::load_json(&path).unwrap();

    let catalog_a = DomainCatalog::load(&db);
    let catalog_b = DomainCatalog::load(&loaded);
    for symbol in ["S", "SubSI", "Param_S_S", "MAX"] {
        let a = densify(&catalog_a, &db, symbol, Facet::Level, 0.0).unwrap();
        let b = densify(&catalog_b, &loaded, symbol, Facet::Level, 0.0).unwrap();
        assert_eq!(
            a.as_table().unwrap(),
            b.as_table().unwrap(),
            "snapshot mismatch for {symbol}"
        );
    }
}
