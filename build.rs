use std::path::Path;

fn main() {
    let presets_path = Path::new("cosmologies/presets.json");
    validate_presets_file(presets_path);
    set_build_dependencies();
}

fn validate_presets_file(presets_path: &Path) {
    // Ensure presets exist at build time
    assert!(
        presets_path.exists(),
        "\n\nCOSMOLOGY PRESETS BUILD ERROR: File not found\n\
         Path: {}\n\
         Please create the presets file before building.\n",
        presets_path.display()
    );

    // Read presets file
    let contents = std::fs::read_to_string(presets_path).unwrap_or_else(|e| {
        panic!(
            "\n\nCOSMOLOGY PRESETS BUILD ERROR: Failed to read file\n\
             Path: {}\n\
             Error: {e}\n",
            presets_path.display()
        );
    });

    // Parse and validate JSON
    let presets: serde_json::Value = serde_json::from_str(&contents).unwrap_or_else(|e| {
        panic!(
            "\n\nCOSMOLOGY PRESETS BUILD ERROR: Invalid JSON\n\
             Path: {}\n\
             Error: {e}\n\
             Hint: Check for missing commas, brackets, or invalid syntax.\n",
            presets_path.display()
        );
    });

    validate_presets_structure(&presets);
}

fn validate_presets_structure(presets: &serde_json::Value) {
    assert!(
        presets.is_object(),
        "\n\nCOSMOLOGY PRESETS BUILD ERROR: Root must be a JSON object\n\
         Got: {presets}\n"
    );

    let cosmologies = presets.get("cosmologies").unwrap_or_else(|| {
        panic!(
            "\n\nCOSMOLOGY PRESETS BUILD ERROR: Missing 'cosmologies' field\n\
             The file must have a top-level 'cosmologies' array.\n"
        );
    });

    let entries = cosmologies.as_array().unwrap_or_else(|| {
        panic!(
            "\n\nCOSMOLOGY PRESETS BUILD ERROR: 'cosmologies' must be an array\n\
             Got: {cosmologies}\n"
        );
    });

    let mut names = std::collections::HashSet::new();
    for (i, entry) in entries.iter().enumerate() {
        let name = validate_preset_fields(entry, i);
        assert!(
            names.insert(name.to_lowercase()),
            "\n\nCOSMOLOGY PRESETS BUILD ERROR: Duplicate preset name '{name}'\n"
        );
    }

    println!(
        "cargo:warning=Validated cosmology presets: {} entries",
        entries.len()
    );
}

fn validate_preset_fields(entry: &serde_json::Value, index: usize) -> String {
    let name = entry
        .get("name")
        .and_then(|v| v.as_str())
        .unwrap_or_else(|| {
            panic!("\n\nCOSMOLOGY PRESETS BUILD ERROR: Preset at index {index} missing 'name' field\n")
        });

    let h0 = entry.get("h0").and_then(serde_json::Value::as_f64);
    assert!(
        h0.is_some_and(|h| h > 0.0),
        "\n\nCOSMOLOGY PRESETS BUILD ERROR: Preset '{name}' (index {index}) needs a positive 'h0'\n"
    );

    let omega_m = entry.get("omega_m").and_then(serde_json::Value::as_f64);
    assert!(
        omega_m.is_some_and(|om| (0.0..=1.0).contains(&om)),
        "\n\nCOSMOLOGY PRESETS BUILD ERROR: Preset '{name}' (index {index}) needs 'omega_m' in [0, 1]\n"
    );

    if let Some(omega_lambda) = entry.get("omega_lambda") {
        assert!(
            omega_lambda
                .as_f64()
                .is_some_and(|ol| (0.0..=1.0).contains(&ol)),
            "\n\nCOSMOLOGY PRESETS BUILD ERROR: Preset '{name}' (index {index}) has 'omega_lambda' outside [0, 1]\n"
        );
    }

    name.to_string()
}

fn set_build_dependencies() {
    // Tell cargo to rerun if presets change
    println!("cargo:rerun-if-changed=cosmologies/presets.json");

    // Tell cargo to rerun if build.rs changes
    println!("cargo:rerun-if-changed=build.rs");
}
