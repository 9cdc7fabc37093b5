use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use gaspar_remap::{FileError, MappingTable, loader, process_batch};

/// Replace Viddler media ids with Gaspar ids in Excel workbooks
#[derive(Parser, Debug)]
#[command(name = "gaspar-remap", version, about)]
struct Args {
    /// Mapping workbook with ViddlerMediaId and GasparMediaId columns.
    /// May be given more than once; later files win on duplicate ids.
    #[arg(short, long = "mapping", required = true)]
    mappings: Vec<PathBuf>,

    /// Where to write the zip of updated workbooks
    #[arg(short, long, default_value = "updated_files.zip")]
    output: PathBuf,

    /// Batch workbooks (.xlsx) to update
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

/// Read every batch file, turning paths that can't be read into per-file
/// errors instead of aborting the run.
fn read_batch(paths: &[PathBuf]) -> (Vec<(String, Vec<u8>)>, Vec<FileError>) {
    let mut batch = Vec::with_capacity(paths.len());
    let mut errors = Vec::new();

    for path in paths {
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => {
                errors.push(FileError {
                    file: path.display().to_string(),
                    message: "not a file path".to_string(),
                });
                continue;
            }
        };
        match fs::read(path) {
            Ok(data) => batch.push((name, data)),
            Err(e) => errors.push(FileError {
                file: name,
                message: e.to_string(),
            }),
        }
    }

    (batch, errors)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut mapping = MappingTable::new();
    for path in &args.mappings {
        let loaded = loader::load_mapping_file(path)
            .with_context(|| format!("Error loading mapping file: {}", path.display()))?;
        mapping.merge(loaded);
    }

    let (batch, read_errors) = read_batch(&args.files);

    let report = process_batch(
        batch.iter().map(|(name, data)| (name.as_str(), data.as_slice())),
        &mapping,
    )?;

    fs::write(&args.output, &report.archive)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    for name in &report.processed {
        println!("updated {}", name);
    }
    for error in read_errors.iter().chain(&report.errors) {
        eprintln!("Error processing {}: {}", error.file, error.message);
    }
    println!(
        "{} of {} files written to {}",
        report.processed.len(),
        args.files.len(),
        args.output.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unusable_paths_become_file_errors() {
        let dir = std::env::temp_dir().join(format!("gaspar-remap-cli-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let readable = dir.join("batch.xlsx");
        fs::write(&readable, b"bytes").unwrap();

        let paths = vec![
            PathBuf::from("/"),
            dir.join("missing.xlsx"),
            readable.clone(),
        ];
        let (batch, errors) = read_batch(&paths);

        assert_eq!(batch, vec![("batch.xlsx".to_string(), b"bytes".to_vec())]);
        let failed: Vec<&str> = errors.iter().map(|e| e.file.as_str()).collect();
        assert_eq!(failed, vec!["/", "missing.xlsx"]);
        assert_eq!(errors[0].message, "not a file path");

        fs::remove_dir_all(&dir).unwrap();
    }
}
