//! Renames extracted textures after the materials that use them
//!
//! Materials named `Material_<suffix>` are paired with a texture named
//! `Image_<suffix>.png`. Paired textures are copied into a fresh directory
//! as `<material>.png` and an updated material file referencing them is
//! written next to the original.

use crate::mtl::{insert_diffuse_maps, parse_material_names};
use crate::Result;
use log::{info, warn};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const MATERIAL_PREFIX: &str = "Material_";
const IMAGE_PREFIX: &str = "Image_";

/// Renamer configuration
#[derive(Debug, Clone)]
pub struct RenameConfig {
    /// Material file to read
    pub material_file: PathBuf,
    /// Directory holding the extracted textures
    pub texture_dir: PathBuf,
    /// Directory the renamed textures are copied into; recreated on each run
    pub output_dir: PathBuf,
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            material_file: PathBuf::from("scene.mtl"),
            texture_dir: PathBuf::from("extracted_textures"),
            output_dir: PathBuf::from("renamed_textures"),
        }
    }
}

/// A material paired with its texture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureMapping {
    pub material: String,
    /// File name inside the texture directory
    pub texture: String,
}

impl TextureMapping {
    /// File name the texture is copied to
    pub fn renamed(&self) -> String {
        format!("{}.png", self.material)
    }
}

/// Summary of a rename run
#[derive(Debug, Clone, Default)]
pub struct RenameReport {
    /// Number of materials declared in the material file
    pub materials: usize,
    /// Number of `.png` files found in the texture directory
    pub textures: usize,
    pub mappings: Vec<TextureMapping>,
    /// Conventionally named materials with no matching texture
    pub unmatched: Vec<String>,
    /// Files written to the output directory
    pub copied: Vec<PathBuf>,
    /// Path of the rewritten material file
    pub updated_material_file: PathBuf,
}

/// Texture file name expected for a material, if it follows the
/// `Material_<suffix>` convention
pub fn expected_texture_name(material: &str) -> Option<String> {
    let suffix = material
        .find(MATERIAL_PREFIX)
        .map(|pos| &material[pos + MATERIAL_PREFIX.len()..])
        .filter(|suffix| !suffix.is_empty())?;
    Some(format!("{}{}.png", IMAGE_PREFIX, suffix))
}

/// Pairs materials with the textures available.
///
/// Returns the mappings in material order plus the materials whose
/// expected texture is missing.
pub fn map_materials(
    materials: &[String],
    textures: &[String],
) -> (Vec<TextureMapping>, Vec<String>) {
    let available: HashSet<&str> = textures.iter().map(String::as_str).collect();
    let mut mappings = Vec::new();
    let mut unmatched = Vec::new();

    for material in materials {
        let Some(expected) = expected_texture_name(material) else {
            continue;
        };

        if available.contains(expected.as_str()) {
            info!("Mapped {} -> {}", material, expected);
            mappings.push(TextureMapping {
                material: material.clone(),
                texture: expected,
            });
        } else {
            warn!(
                "No texture found for material {} (expected {})",
                material, expected
            );
            unmatched.push(material.clone());
        }
    }

    (mappings, unmatched)
}

/// Path of the rewritten material file: `<stem>_updated.mtl` alongside the input
pub fn updated_material_path(material_file: &Path) -> PathBuf {
    let stem = material_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    material_file.with_file_name(format!("{}_updated.mtl", stem))
}

/// Lists the `.png` file names of a directory, sorted
pub fn list_png_files(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".png") {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Runs the full rename: map, copy into a fresh output directory and write
/// the updated material file
pub fn rename_textures(config: &RenameConfig) -> Result<RenameReport> {
    info!("Reading materials from {}", config.material_file.display());
    let text = fs::read_to_string(&config.material_file)?;
    let materials = parse_material_names(&text);
    info!("Found {} materials", materials.len());

    let textures = list_png_files(&config.texture_dir)?;
    info!(
        "Found {} textures in {}",
        textures.len(),
        config.texture_dir.display()
    );

    let (mappings, unmatched) = map_materials(&materials, &textures);
    info!("Mapped {} materials to textures", mappings.len());

    if config.output_dir.exists() {
        fs::remove_dir_all(&config.output_dir)?;
    }
    fs::create_dir_all(&config.output_dir)?;

    let mut copied = Vec::with_capacity(mappings.len());
    for mapping in &mappings {
        let src = config.texture_dir.join(&mapping.texture);
        let dst = config.output_dir.join(mapping.renamed());

        if !src.exists() {
            warn!("Source texture not found: {}", src.display());
            continue;
        }
        fs::copy(&src, &dst)?;
        info!("Copied {} -> {}", mapping.texture, mapping.renamed());
        copied.push(dst);
    }

    let mapped: HashSet<String> = mappings.iter().map(|m| m.material.clone()).collect();
    let updated_material_file = updated_material_path(&config.material_file);
    fs::write(&updated_material_file, insert_diffuse_maps(&text, &mapped))?;
    info!(
        "Updated material file saved as {}",
        updated_material_file.display()
    );

    Ok(RenameReport {
        materials: materials.len(),
        textures: textures.len(),
        mappings,
        unmatched,
        copied,
        updated_material_file,
    })
}
