use cyrus_backend::structure_parse::{dedup_keep_first, parse_structure, verify_consistency};
use cyrus_backend::types::{Level, ParseWarning};

/// A realistic excerpt: one banner, two departments with a family and its
/// sub-families each, plus a header line, blank lines and a stray
/// annotation.
fn create_test_listing() -> String {
    [
        "Structure",
        "",
        "201 GEANT CASINO",
        "01 MARCHE",
        "010 BOUCHERIE",
        "101 STAND TRADITIONNEL",
        "102 LIBRE SERVICE",
        "(suite page 2)",
        "02 EPICERIE",
        "020 CONSERVES",
        "201 LEGUMES",
        "202 POISSONS",
        "",
    ]
    .join("\n")
}

#[test]
fn test_full_listing_counts() {
    let result = parse_structure(&create_test_listing());

    assert_eq!(result.stats.total, 9);
    assert_eq!(result.stats.sectors, 1);
    assert_eq!(result.stats.departments, 2);
    assert_eq!(result.stats.families, 2);
    assert_eq!(result.stats.sub_families, 4);
    assert_eq!(result.stats.skipped_lines, 1);
    assert!(result.warnings.is_empty());
}

#[test]
fn test_full_listing_structure() {
    let result = parse_structure(&create_test_listing());

    // A new department resets the family slot, so the 3-digit line after
    // EPICERIE opens a fresh family.
    let conserves = result.nodes.iter().find(|n| n.name == "CONSERVES").unwrap();
    assert_eq!(conserves.level, Level::Family);
    assert_eq!(conserves.parent_code, Some("02".to_string()));
    assert_eq!(
        conserves.full_path,
        "201 GEANT CASINO > 02 EPICERIE > 020 CONSERVES"
    );

    // "201 LEGUMES" reuses the sector's code, but the sector stays open,
    // so it resolves as a sub-family under CONSERVES.
    let legumes = result.nodes.iter().find(|n| n.name == "LEGUMES").unwrap();
    assert_eq!(legumes.level, Level::SubFamily);
    assert_eq!(legumes.parent_code, Some("020".to_string()));
    assert_eq!(
        legumes.full_path,
        "201 GEANT CASINO > 02 EPICERIE > 020 CONSERVES > 201 LEGUMES"
    );

    // Sibling sub-families accumulate under the same family
    let poissons = result.nodes.iter().find(|n| n.name == "POISSONS").unwrap();
    assert_eq!(poissons.level, Level::SubFamily);
    assert_eq!(poissons.parent_code, Some("020".to_string()));
}

#[test]
fn test_full_listing_parents_match_preceding_nodes() {
    let result = parse_structure(&create_test_listing());

    for node in result.nodes.iter().filter(|n| n.level != Level::Sector) {
        let parent_code = node.parent_code.as_ref().unwrap();

        // The parent is the most recently emitted node one level up
        let parent = result
            .nodes
            .iter()
            .filter(|p| {
                u8::from(p.level) == u8::from(node.level) - 1 && p.source_line < node.source_line
            })
            .next_back()
            .unwrap();
        assert_eq!(parent_code, &parent.code, "node: {:?}", node);
    }
}

#[test]
fn test_full_listing_paths_are_prefixed_by_parent_paths() {
    let result = parse_structure(&create_test_listing());

    for node in &result.nodes {
        let own_segment = format!("{} {}", node.code, node.name);
        assert!(node.full_path.ends_with(&own_segment), "node: {:?}", node);

        if node.level != Level::Sector {
            let parent = result
                .nodes
                .iter()
                .filter(|p| {
                    u8::from(p.level) == u8::from(node.level) - 1
                        && p.source_line < node.source_line
                })
                .next_back()
                .unwrap();
            assert!(
                node.full_path.starts_with(&parent.full_path),
                "node: {:?} parent: {:?}",
                node,
                parent
            );
        }
    }
}

#[test]
fn test_full_listing_consistency_and_idempotence() {
    let listing = create_test_listing();
    let first = parse_structure(&listing);
    let second = parse_structure(&listing);

    assert_eq!(first, second);
    assert!(verify_consistency(&first.nodes).is_empty());
}

#[test]
fn test_degraded_listing_keeps_all_nodes() {
    // Family directly under the sector, then an irregular 4-digit code
    // before any family: both are kept, both are flagged.
    let listing = "201 GEANT CASINO\n010 BOUCHERIE\n02 EPICERIE\n0205 BOCAUX\n";
    let result = parse_structure(listing);

    assert_eq!(result.nodes.len(), 4);
    assert_eq!(result.warnings.len(), 2);
    assert!(matches!(
        result.warnings[0],
        ParseWarning::FamilyWithoutDepartment { .. }
    ));
    assert!(matches!(
        result.warnings[1],
        ParseWarning::SubFamilyWithoutFamily { .. }
    ));

    // Every node still has a parent, so the consistency pass is clean
    assert!(verify_consistency(&result.nodes).is_empty());
}

#[test]
fn test_dedup_on_full_listing() {
    // "201" appears as a sector and as a sub-family; dedup works per
    // (level, code), so both survive.
    let result = parse_structure(&create_test_listing());
    let deduped = dedup_keep_first(&result.nodes);
    assert_eq!(deduped.len(), result.nodes.len());

    // Repeat the EPICERIE block to create true (level, code) duplicates
    let doubled = format!("{}\n02 EPICERIE\n020 CONSERVES\n", create_test_listing());
    let doubled_result = parse_structure(&doubled);
    assert_eq!(doubled_result.nodes.len(), result.nodes.len() + 2);

    let deduped = dedup_keep_first(&doubled_result.nodes);
    assert_eq!(deduped.len(), result.nodes.len());

    // The first occurrence survives
    let first_conserves = deduped
        .iter()
        .find(|n| n.level == Level::Family && n.code == "020")
        .unwrap();
    assert_eq!(first_conserves.source_line, 10);
}
