use std::path::Path;

fn main() {
    let taxonomy_path = Path::new("taxonomies/goal_keywords.json");
    validate_taxonomy_file(taxonomy_path);
    set_build_dependencies();
}

fn validate_taxonomy_file(taxonomy_path: &Path) {
    // Ensure taxonomy exists at build time
    assert!(
        taxonomy_path.exists(),
        "\n\nTAXONOMY BUILD ERROR: File not found\n\
         Path: {}\n\
         Please create the taxonomy file before building.\n",
        taxonomy_path.display()
    );

    // Read taxonomy file
    let taxonomy_contents = std::fs::read_to_string(taxonomy_path).unwrap_or_else(|e| {
        panic!(
            "\n\nTAXONOMY BUILD ERROR: Failed to read file\n\
             Path: {}\n\
             Error: {e}\n",
            taxonomy_path.display()
        );
    });

    // Parse and validate JSON
    let taxonomy: serde_json::Value = serde_json::from_str(&taxonomy_contents).unwrap_or_else(|e| {
        panic!(
            "\n\nTAXONOMY BUILD ERROR: Invalid JSON\n\
             Path: {}\n\
             Error: {e}\n",
            taxonomy_path.display()
        );
    });

    // Sanity-check structure: a version and a non-empty category list
    assert!(
        taxonomy.get("version").and_then(|v| v.as_str()).is_some(),
        "\n\nTAXONOMY BUILD ERROR: Missing \"version\" field\n"
    );

    let categories = taxonomy
        .get("categories")
        .and_then(|c| c.as_array())
        .unwrap_or_else(|| panic!("\n\nTAXONOMY BUILD ERROR: Missing \"categories\" array\n"));

    assert!(
        !categories.is_empty(),
        "\n\nTAXONOMY BUILD ERROR: \"categories\" array is empty\n"
    );

    for category in categories {
        let name = category.get("name").and_then(|n| n.as_str());
        assert!(
            name.is_some(),
            "\n\nTAXONOMY BUILD ERROR: Category missing \"name\"\n"
        );
        let triggers = category.get("triggers").and_then(|t| t.as_array());
        assert!(
            triggers.is_some_and(|t| !t.is_empty()),
            "\n\nTAXONOMY BUILD ERROR: Category {:?} has no triggers\n",
            name.unwrap_or("?")
        );
    }
}

fn set_build_dependencies() {
    // Rebuild when the taxonomy changes
    println!("cargo:rerun-if-changed=taxonomies/goal_keywords.json");
}
