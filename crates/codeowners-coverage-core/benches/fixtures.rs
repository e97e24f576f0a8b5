//! Benchmark fixtures, generated lazily and deterministically.
//!
//! Each fixture pairs a rules file with the paths of a synthetic tree. The
//! analyzer benchmark also needs the tree on disk, which is written once
//! to a temporary directory.

use codeowners_coverage_core::generate::{
    GeneratorConfig, generate, generate_paths, write_repository,
};
use std::path::PathBuf;
use std::sync::LazyLock;
use tempfile::TempDir;

/// A generated rules file and the paths it is resolved against.
pub struct Fixture {
    pub name: &'static str,
    pub rules: String,
    pub paths: Vec<String>,
}

impl Fixture {
    fn new(name: &'static str, config: GeneratorConfig) -> Self {
        Self {
            name,
            rules: generate(&config),
            paths: generate_paths(&config),
        }
    }
}

static FIXTURES: LazyLock<Vec<Fixture>> = LazyLock::new(|| {
    vec![
        Fixture::new("small", GeneratorConfig::small()),
        Fixture::new("medium", GeneratorConfig::medium()),
        Fixture::new("large", GeneratorConfig::large()),
    ]
});

/// Standard fixtures for the rules and resolution benchmarks.
pub fn fixtures() -> &'static [Fixture] {
    FIXTURES.as_slice()
}

/// A generated repository on disk.
pub struct BenchmarkRepo {
    #[allow(dead_code)] // keeps the directory alive
    temp_dir: TempDir,
    pub path: PathBuf,
}

impl BenchmarkRepo {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp directory");
        let path = temp_dir.path().to_path_buf();
        write_repository(&path, &GeneratorConfig::medium())
            .expect("failed to write benchmark repository");
        BenchmarkRepo { temp_dir, path }
    }
}

static BENCHMARK_REPO: LazyLock<BenchmarkRepo> = LazyLock::new(BenchmarkRepo::new);

/// Returns the path of the on-disk benchmark repository.
pub fn repo_path() -> &'static PathBuf {
    &BENCHMARK_REPO.path
}
