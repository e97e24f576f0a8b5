//! Generate CODEOWNERS fixtures and repository trees for benchmarking.
//!
//! Usage: cargo run --release --bin generate-fixtures --features generate -- [output_dir]
//!
//! Each preset becomes a directory holding a `CODEOWNERS` file and the
//! generated tree, ready to be analyzed with `codeowners-coverage`.

use codeowners_coverage_core::generate::{GeneratorConfig, generate_paths, write_repository};
use std::{fs, io, path::Path, path::PathBuf, process::ExitCode};

/// Type alias for fixture preset entries.
type PresetEntry = (&'static str, fn() -> GeneratorConfig);

/// Fixture presets; benches/fixtures.rs uses the same ones.
const PRESETS: &[PresetEntry] = &[
    ("small", GeneratorConfig::small),
    ("medium", GeneratorConfig::medium),
    ("large", GeneratorConfig::large),
];

fn main() -> ExitCode {
    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("benches/cli/fixtures"));

    if let Err(e) = run(&output_dir) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run(output_dir: &Path) -> io::Result<()> {
    fs::create_dir_all(output_dir)?;

    for (name, config_fn) in PRESETS {
        let config = config_fn();
        let root = output_dir.join(name);
        write_repository(&root, &config)?;
        println!(
            "Generated {} ({} rules, {} sections, {} files)",
            root.display(),
            config.num_rules,
            config.num_sections,
            generate_paths(&config).len()
        );
    }

    Ok(())
}
