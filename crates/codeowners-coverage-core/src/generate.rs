//! Random rules files and repository trees for benchmarking and testing.
//!
//! Rules are built from the AST types, so the output always parses.
//! Generated ASTs carry placeholder spans.

use crate::parse::{CodeownersFile, Line, Owner, Pattern, SectionHeader, Span};
use rand::prelude::*;
use rand::rngs::StdRng;
use std::fs;
use std::io;
use std::path::Path;

/// Configuration for generated rules and trees.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Number of rule lines.
    pub num_rules: usize,
    /// Number of section headers spread over the rules.
    pub num_sections: usize,
    /// Maximum owners per rule.
    pub max_owners_per_rule: usize,
    /// Number of files in the generated tree.
    pub num_files: usize,
    /// Seed for deterministic generation.
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            num_rules: 100,
            num_sections: 4,
            max_owners_per_rule: 3,
            num_files: 1_000,
            seed: 42,
        }
    }
}

impl GeneratorConfig {
    /// Creates a config with `num_rules` rules and ten files per rule.
    pub fn new(num_rules: usize) -> Self {
        Self {
            num_rules,
            num_sections: (num_rules / 25).min(8),
            num_files: num_rules * 10,
            ..Default::default()
        }
    }

    /// About 10 rules.
    pub fn small() -> Self {
        Self::new(10)
    }

    /// About 100 rules.
    pub fn medium() -> Self {
        Self::new(100)
    }

    /// About 1000 rules.
    pub fn large() -> Self {
        Self::new(1_000)
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the number of section headers.
    pub fn with_sections(mut self, num_sections: usize) -> Self {
        self.num_sections = num_sections;
        self
    }

    /// Sets the number of files in the tree.
    pub fn with_files(mut self, num_files: usize) -> Self {
        self.num_files = num_files;
        self
    }

    /// Sets the maximum owners per rule (at least one).
    pub fn with_max_owners(mut self, max: usize) -> Self {
        self.max_owners_per_rule = max.max(1);
        self
    }
}

mod vocabulary {
    pub const PATTERN_TEMPLATES: &[&str] = &[
        "*.{ext}",
        "**/*.{ext}",
        "/{dir}/",
        "/{dir}/**",
        "/{dir}/*",
        "{dir}/*.{ext}",
        "/src/{dir}/",
        "/src/**/*.{ext}",
        "/{dir}/**/test_*.{ext}",
        "docs/**/*.md",
    ];

    pub const NEGATED_TEMPLATES: &[&str] = &["!/vendor/", "!*.lock", "!/{dir}/generated/"];

    pub const EXTENSIONS: &[&str] = &["rs", "py", "js", "ts", "go", "md", "yaml", "json", "toml"];
    pub const DIRECTORIES: &[&str] = &[
        "src", "lib", "tests", "docs", "config", "scripts", "api", "core",
    ];
    pub const FILE_STEMS: &[&str] = &["main", "lib", "mod", "util", "test_api", "index", "README"];
    pub const USERNAMES: &[&str] = &["alice", "bob", "charlie", "dev", "maintainer", "reviewer"];
    pub const ORGS: &[&str] = &["acme", "github", "myorg"];
    pub const TEAMS: &[&str] = &["core", "platform", "frontend", "backend", "infra", "docs"];
    pub const SECTION_NAMES: &[&str] = &[
        "Frontend",
        "Backend",
        "Infrastructure",
        "Documentation",
        "Security",
        "Release",
        "Testing",
        "Tooling",
    ];
}

/// Owner kind weights out of 100; the rest are emails.
const WEIGHT_USER: u32 = 55;
const WEIGHT_TEAM: u32 = 35;

/// Percentage of rules that are negated.
const NEGATED_PROBABILITY: u32 = 3;

/// Percentage of sections that are optional.
const OPTIONAL_SECTION_PROBABILITY: u32 = 25;

fn placeholder_span() -> Span {
    Span::new(0, 0, 0, 0)
}

fn pick<'a>(rng: &mut StdRng, items: &[&'a str]) -> &'a str {
    items[rng.random_range(0..items.len())]
}

/// Generates a random rules AST.
pub fn generate_ast(config: &GeneratorConfig) -> CodeownersFile {
    use vocabulary::*;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut lines = Vec::with_capacity(config.num_rules + config.num_sections * 2 + 2);

    lines.push(Line::comment(
        " Generated CODEOWNERS for benchmarking",
        placeholder_span(),
    ));
    lines.push(Line::blank(placeholder_span()));

    let section_every = if config.num_sections == 0 {
        usize::MAX
    } else {
        (config.num_rules / (config.num_sections + 1)).max(1)
    };
    let mut sections_added = 0;

    for index in 0..config.num_rules {
        if index > 0 && index % section_every == 0 && sections_added < config.num_sections {
            lines.push(Line::blank(placeholder_span()));
            lines.push(Line::section(
                generate_section(&mut rng, sections_added, config),
                placeholder_span(),
            ));
            sections_added += 1;
        }

        let dir = pick(&mut rng, DIRECTORIES);
        let ext = pick(&mut rng, EXTENSIONS);
        if rng.random_ratio(NEGATED_PROBABILITY, 100) {
            let text = pick(&mut rng, NEGATED_TEMPLATES).replace("{dir}", dir);
            let text = text.trim_start_matches('!').to_string();
            lines.push(Line::rule(
                Pattern::negated(text, placeholder_span()),
                Vec::new(),
                placeholder_span(),
            ));
            continue;
        }

        let pattern_text = pick(&mut rng, PATTERN_TEMPLATES)
            .replace("{ext}", ext)
            .replace("{dir}", dir);
        let num_owners = rng.random_range(1..=config.max_owners_per_rule);
        let owners = generate_owners(&mut rng, num_owners);
        lines.push(Line::rule(
            Pattern::new(pattern_text, placeholder_span()),
            owners,
            placeholder_span(),
        ));
    }

    CodeownersFile::new(lines)
}

fn generate_section(rng: &mut StdRng, index: usize, config: &GeneratorConfig) -> SectionHeader {
    use vocabulary::SECTION_NAMES;

    let base = SECTION_NAMES[index % SECTION_NAMES.len()];
    let name = if index < SECTION_NAMES.len() {
        base.to_string()
    } else {
        format!("{} {}", base, index / SECTION_NAMES.len() + 1)
    };
    let optional = rng.random_ratio(OPTIONAL_SECTION_PROBABILITY, 100);
    let min_approvals = (!optional && rng.random_bool(0.5)).then(|| rng.random_range(1..=2));
    SectionHeader {
        name,
        optional,
        min_approvals,
        default_owners: generate_owners(rng, config.max_owners_per_rule.min(2)),
        span: placeholder_span(),
    }
}

fn generate_owners(rng: &mut StdRng, count: usize) -> Vec<Owner> {
    let mut owners: Vec<Owner> = Vec::with_capacity(count);
    for _ in 0..count {
        let owner = generate_owner(rng);
        if !owners.contains(&owner) {
            owners.push(owner);
        }
    }
    owners
}

fn generate_owner(rng: &mut StdRng) -> Owner {
    use vocabulary::*;

    let roll = rng.random_range(0..100);
    if roll < WEIGHT_USER {
        Owner::user(pick(rng, USERNAMES), placeholder_span())
    } else if roll < WEIGHT_USER + WEIGHT_TEAM {
        let org = pick(rng, ORGS);
        Owner::team(org, pick(rng, TEAMS), placeholder_span())
    } else {
        Owner::email(
            format!("{}@example.com", pick(rng, USERNAMES)),
            placeholder_span(),
        )
    }
}

/// Generates a rules file as a string.
pub fn generate(config: &GeneratorConfig) -> String {
    generate_ast(config).to_string()
}

/// Generates `/` separated file paths for a synthetic tree.
pub fn generate_paths(config: &GeneratorConfig) -> Vec<String> {
    use vocabulary::*;

    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(1));
    let mut paths = Vec::with_capacity(config.num_files);
    for index in 0..config.num_files {
        let depth = rng.random_range(0..=3);
        let mut path = String::new();
        for _ in 0..depth {
            path.push_str(pick(&mut rng, DIRECTORIES));
            path.push('/');
        }
        let stem = pick(&mut rng, FILE_STEMS);
        let ext = pick(&mut rng, EXTENSIONS);
        path.push_str(&format!("{}_{}.{}", stem, index, ext));
        paths.push(path);
    }
    paths
}

/// Writes a generated tree and its `CODEOWNERS` file under `root`.
pub fn write_repository(root: &Path, config: &GeneratorConfig) -> io::Result<()> {
    fs::create_dir_all(root)?;
    fs::write(root.join("CODEOWNERS"), generate(config))?;
    for path in generate_paths(config) {
        let full = root.join(&path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(full, b"")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleSet;

    #[test]
    fn generated_rules_compile() {
        let content = generate(&GeneratorConfig::medium());
        let rules = RuleSet::parse(&content).unwrap();
        assert_eq!(rules.rule_count(), 100);
        assert!(rules.sections().len() > 1);
    }

    #[test]
    fn large_rules_compile() {
        let rules = RuleSet::parse(&generate(&GeneratorConfig::large())).unwrap();
        assert_eq!(rules.rule_count(), 1_000);
    }

    #[test]
    fn deterministic_generation() {
        let config = GeneratorConfig::medium();
        assert_eq!(generate(&config), generate(&config));
        assert_eq!(generate_paths(&config), generate_paths(&config));
    }

    #[test]
    fn different_seeds_differ() {
        let first = generate(&GeneratorConfig::medium().with_seed(1));
        let second = generate(&GeneratorConfig::medium().with_seed(2));
        assert_ne!(first, second);
    }

    #[test]
    fn no_sections_keeps_implicit_section_only() {
        let config = GeneratorConfig::new(20).with_sections(0);
        let rules = RuleSet::parse(&generate(&config)).unwrap();
        assert_eq!(rules.sections().len(), 1);
        assert!(rules.sections()[0].is_implicit());
    }

    #[test]
    fn paths_are_relative_and_unique() {
        let paths = generate_paths(&GeneratorConfig::small().with_files(50));
        assert_eq!(paths.len(), 50);
        assert!(paths.iter().all(|p| !p.starts_with('/')));
        let unique: std::collections::HashSet<_> = paths.iter().collect();
        assert_eq!(unique.len(), 50);
    }

    #[test]
    fn write_repository_creates_tree() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = GeneratorConfig::small().with_files(5);
        write_repository(dir.path(), &config).unwrap();
        assert!(dir.path().join("CODEOWNERS").is_file());
        for path in generate_paths(&config) {
            assert!(dir.path().join(path).is_file());
        }
    }

    #[test]
    fn with_max_owners_minimum() {
        let config = GeneratorConfig::default().with_max_owners(0);
        assert_eq!(config.max_owners_per_rule, 1);
    }
}
