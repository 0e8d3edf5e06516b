use cyrus_backend::export_helpers::{
    document_to_json, export_document, generate_sql, ExportDocument, DEFAULT_TABLE,
};
use cyrus_backend::structure_parse::{dedup_keep_first, parse_structure};

fn create_test_listing() -> String {
    [
        "Structure",
        "201 GEANT CASINO",
        "01 MARCHE",
        "010 BOUCHERIE",
        "101 STAND TRADITIONNEL",
        "02 L'EPICERIE",
        "020 CONSERVES",
        "101 BOCAUX",
    ]
    .join("\n")
}

#[test]
fn test_sql_script_shape() {
    let result = parse_structure(&create_test_listing());
    let script = generate_sql(&result.nodes, DEFAULT_TABLE);

    // One clear statement, before all inserts
    assert_eq!(script.matches("DELETE FROM cyrus_structure;").count(), 1);
    assert!(script.find("DELETE FROM").unwrap() < script.find("INSERT INTO").unwrap());

    // One insert per node, in input order
    assert_eq!(
        script.matches("INSERT INTO cyrus_structure").count(),
        result.nodes.len()
    );
    let sector_pos = script.find("'201', 'GEANT CASINO'").unwrap();
    let leaf_pos = script.find("'101', 'BOCAUX'").unwrap();
    assert!(sector_pos < leaf_pos);
}

#[test]
fn test_sql_escapes_and_null_marker() {
    let result = parse_structure(&create_test_listing());
    let script = generate_sql(&result.nodes, DEFAULT_TABLE);

    // Root row carries the NULL marker, not a quoted string
    assert!(script.contains("VALUES (1, '201', 'GEANT CASINO', NULL,"));
    assert!(!script.contains("'NULL'"));

    // Embedded single quote in a department name is doubled
    assert!(script.contains("'L''EPICERIE'"));
    assert!(script.contains("> 02 L''EPICERIE >"));
}

#[test]
fn test_sql_after_dedup() {
    // "101" recurs as a sub-family under two different families; after
    // dedup only the first row appears in the script.
    let result = parse_structure(&create_test_listing());
    let raw_script = generate_sql(&result.nodes, DEFAULT_TABLE);
    assert!(raw_script.contains("'101', 'STAND TRADITIONNEL'"));
    assert!(raw_script.contains("'101', 'BOCAUX'"));

    let deduped = dedup_keep_first(&result.nodes);
    let script = generate_sql(&deduped, DEFAULT_TABLE);
    assert!(script.contains("'101', 'STAND TRADITIONNEL'"));
    assert!(!script.contains("'101', 'BOCAUX'"));
}

#[test]
fn test_json_document_counts_match_stats() {
    let result = parse_structure(&create_test_listing());
    let document = export_document("StructureCYRUS.txt", &result.nodes, &result.stats);

    assert_eq!(document.metadata.total_items, result.nodes.len());
    assert_eq!(
        document.metadata.stats.sectors
            + document.metadata.stats.departments
            + document.metadata.stats.families
            + document.metadata.stats.sub_families,
        document.metadata.total_items
    );

    let json_str = document_to_json(&document, false).unwrap();
    let parsed: ExportDocument = serde_json::from_str(&json_str).unwrap();
    assert_eq!(parsed.items, document.items);
    assert_eq!(parsed.metadata.source_file, "StructureCYRUS.txt");
}
