//! Wavefront material (`.mtl`) file helpers

use std::collections::HashSet;

/// Collects the material names declared by `newmtl` lines, in file order
pub fn parse_material_names(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| line.starts_with("newmtl"))
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(str::to_string)
        .collect()
}

/// Collects every texture map statement (`map_Kd`, `map_Bump`, ...)
pub fn texture_references(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| line.starts_with("map_"))
        .map(|line| line.trim().to_string())
        .collect()
}

/// Rewrites a material file, adding `map_Kd <material>.png` right after
/// the `illum` line of every material found in `mapped`.
///
/// All other lines are copied unchanged.
pub fn insert_diffuse_maps(text: &str, mapped: &HashSet<String>) -> String {
    let mut output = String::with_capacity(text.len());
    let mut current: Option<&str> = None;

    for line in text.split_inclusive('\n') {
        output.push_str(line);

        if line.starts_with("newmtl") {
            current = line.split_whitespace().nth(1);
        } else if line.starts_with("illum") {
            if let Some(material) = current.filter(|m| mapped.contains(*m)) {
                if !line.ends_with('\n') {
                    output.push('\n');
                }
                output.push_str(&format!("map_Kd {}.png\n", material));
            }
        }
    }

    output
}
