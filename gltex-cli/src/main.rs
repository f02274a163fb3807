//! gltex CLI Tool
//!
//! Command-line interface for extracting textures from glTF containers and
//! organising them around a Wavefront material file.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gltex_core::{
    copy_textures, extract_textures, mtl, rename_textures, summarize_images, ContainerForm,
    CopyConfig, ExtractConfig, ExtractStatus, GltfContainer, RenameConfig, SourceKind,
};
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gltex")]
#[command(about = "gltex - extract, rename and place glTF textures")]
#[command(version)]
struct Cli {
    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract embedded textures from a .glb or .gltf file
    Extract {
        /// Input container file path
        #[arg(default_value = "scene.glb")]
        input: PathBuf,

        /// Output directory for the extracted textures
        #[arg(short, long, default_value = "extracted_textures")]
        output: PathBuf,
    },

    /// Show container information without extracting anything
    Info {
        /// Input container file path
        input: PathBuf,
    },

    /// Rename extracted textures after the materials of an .mtl file
    Rename {
        /// Material file path
        mtl: PathBuf,

        /// Directory holding the extracted textures
        #[arg(long, default_value = "extracted_textures")]
        textures: PathBuf,

        /// Output directory for the renamed textures (recreated)
        #[arg(short, long, default_value = "renamed_textures")]
        output: PathBuf,
    },

    /// Copy renamed textures into a destination directory
    Copy {
        /// Directory to copy from
        #[arg(long, default_value = "renamed_textures")]
        source: PathBuf,

        /// Directory to copy into
        #[arg(long, default_value = ".")]
        dest: PathBuf,

        /// Extension of the files to copy
        #[arg(long, default_value = "png")]
        extension: String,
    },

    /// List the texture map statements of an .mtl file
    Refs {
        /// Material file path
        mtl: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Extract { input, output } => extract(ExtractConfig {
            container: input,
            output_dir: output,
        })?,

        Commands::Info { input } => show_info(input)?,

        Commands::Rename {
            mtl,
            textures,
            output,
        } => rename(RenameConfig {
            material_file: mtl,
            texture_dir: textures,
            output_dir: output,
        })?,

        Commands::Copy {
            source,
            dest,
            extension,
        } => copy(CopyConfig {
            source_dir: source,
            dest_dir: dest,
            extension,
        })?,

        Commands::Refs { mtl } => list_refs(mtl)?,
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

fn extract(config: ExtractConfig) -> Result<()> {
    println!("Extracting textures from: {}", config.container.display());
    println!("Output: {}", config.output_dir.display());

    let report = extract_textures(&config).with_context(|| {
        format!(
            "Failed to extract textures from {}",
            config.container.display()
        )
    })?;

    match report.status {
        ExtractStatus::NoBuffers => println!("No buffers found, nothing to extract"),
        ExtractStatus::NoImages => println!("No images found, nothing to extract"),
        ExtractStatus::Completed => println!(
            "Processed {} images: {} extracted, {} failed",
            report.attempted(),
            report.extracted(),
            report.failed()
        ),
    }

    let failed = report.failed_indices();
    if !failed.is_empty() {
        let list: Vec<String> = failed.iter().map(usize::to_string).collect();
        println!("Failed images: {}", list.join(", "));
    }

    Ok(())
}

fn show_info(input: PathBuf) -> Result<()> {
    let container = GltfContainer::open(&input)
        .with_context(|| format!("Failed to read container {}", input.display()))?;
    let document = &container.document;

    println!("\n=== Container Information ===");
    println!(
        "Form: {}",
        match container.form {
            ContainerForm::Binary => "binary (.glb)",
            ContainerForm::Text => "text (.gltf)",
        }
    );
    println!("glTF version: {}", document.asset.version);
    if let Some(generator) = &document.asset.generator {
        println!("Generator: {}", generator);
    }
    println!("Buffers: {}", document.buffers.len());
    println!("Buffer views: {}", document.buffer_views.len());
    println!("Images: {}", document.images.len());
    println!(
        "Embedded binary section: {} bytes ({:.2} KB)",
        container.bin_len(),
        container.bin_len() as f64 / 1024.0
    );

    println!("\n=== Images ===");
    for summary in summarize_images(&container) {
        let source = match &summary.kind {
            SourceKind::DataUri => "data URI".to_string(),
            SourceKind::External(uri) => format!("external file {}", uri),
            SourceKind::BufferView(view) => format!("buffer view {}", view),
            SourceKind::Unresolved => "no source".to_string(),
        };
        let mut line = format!(
            "  [{}] {} ({})",
            summary.index,
            summary.name.as_deref().unwrap_or("<unnamed>"),
            source
        );
        if let Some(mime) = &summary.mime_type {
            line.push_str(&format!(", {}", mime));
        }
        if let Some(size) = summary.size {
            line.push_str(&format!(", {} bytes", size));
        }
        if let Some((width, height)) = summary.dimensions {
            line.push_str(&format!(", {}x{}", width, height));
        }
        if let Some(error) = &summary.error {
            line.push_str(&format!(", error: {}", error));
        }
        println!("{}", line);
    }

    Ok(())
}

fn rename(config: RenameConfig) -> Result<()> {
    let report = rename_textures(&config).context("Failed to rename textures")?;

    println!(
        "Mapped {} of {} materials ({} textures available)",
        report.mappings.len(),
        report.materials,
        report.textures
    );
    if !report.unmatched.is_empty() {
        println!("Unmatched materials: {}", report.unmatched.join(", "));
    }
    println!(
        "Renamed textures saved in: {} ({} files)",
        config.output_dir.display(),
        report.copied.len()
    );
    println!(
        "Updated material file saved as: {}",
        report.updated_material_file.display()
    );

    Ok(())
}

fn copy(config: CopyConfig) -> Result<()> {
    let copied = copy_textures(&config).context("Failed to copy textures")?;
    println!(
        "Copied {} files into {}",
        copied.len(),
        config.dest_dir.display()
    );
    Ok(())
}

fn list_refs(path: PathBuf) -> Result<()> {
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read material file {}", path.display()))?;
    let refs = mtl::texture_references(&text);

    if refs.is_empty() {
        println!("No texture references found in {}", path.display());
    } else {
        println!("Found {} texture references in {}:", refs.len(), path.display());
        for reference in refs {
            println!("  {}", reference);
        }
    }

    Ok(())
}
