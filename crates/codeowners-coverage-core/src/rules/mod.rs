//! Compiled CODEOWNERS rules.
//!
//! A [`RuleSet`] is built from the parsed AST. Each rule's pattern is
//! compiled, rules are grouped into sections, and same-named sections are
//! merged. Ownership of a path is resolved per section with "last match
//! wins", then combined across sections:
//!
//! - mandatory owners are the union over non-optional sections
//! - all approvers are the union over every section
//!
//! # Example
//!
//! ```rust
//! use codeowners_coverage_core::rules::RuleSet;
//!
//! let rules = RuleSet::parse("*.rs @rust\n/src/legacy/ @legacy\n").unwrap();
//! let resolution = rules.resolve("src/legacy/old.rs");
//! assert_eq!(resolution.mandatory_owners(), vec!["@legacy".to_string()]);
//! ```

mod diagnostic;
mod section;

pub use diagnostic::Diagnostic;
pub use section::{OwnershipRule, Section, SectionMatch};

use crate::matching::{Candidate, Pattern};
use crate::parse::{CodeownersFile, LineKind, Owner, ParseError, SectionHeader, parse_codeowners};
use log::{debug, trace, warn};
use std::collections::{BTreeSet, HashMap};

/// An immutable, ordered set of sections built from a CODEOWNERS file.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    sections: Vec<Section>,
    diagnostics: Vec<Diagnostic>,
}

impl RuleSet {
    /// Parses and compiles CODEOWNERS content.
    ///
    /// Every malformed line is reported; a partial rule set is never returned.
    pub fn parse(input: &str) -> Result<Self, Vec<ParseError>> {
        let ast = parse_codeowners(input).into_result()?;
        Self::from_ast(&ast)
    }

    /// Compiles a parsed CODEOWNERS file.
    pub fn from_ast(file: &CodeownersFile) -> Result<Self, Vec<ParseError>> {
        let mut builder = Builder::new();
        let mut errors = Vec::new();

        for line in &file.lines {
            match &line.kind {
                LineKind::Section(header) => builder.open_section(header),
                LineKind::Rule { pattern, owners } => {
                    match Pattern::new(&pattern.text) {
                        Ok(compiled) => builder.push_rule(compiled, pattern, owners),
                        Err(e) => errors.push(ParseError::invalid_pattern(
                            &pattern.text,
                            e.kind().to_string(),
                            pattern.span,
                        )),
                    }
                }
                LineKind::Invalid { error, .. } => {
                    errors.push(ParseError::invalid_line(error, line.span));
                }
                LineKind::Blank | LineKind::Comment { .. } => {}
            }
        }

        if !errors.is_empty() {
            debug!("Rule compilation failed with {} errors", errors.len());
            return Err(errors);
        }

        let rule_set = builder.finish();
        for diagnostic in &rule_set.diagnostics {
            warn!("{}", diagnostic);
        }
        debug!(
            "Compiled {} rules in {} sections",
            rule_set.rule_count(),
            rule_set.sections.len()
        );
        Ok(rule_set)
    }

    /// Returns the sections in the order they were first declared.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Iterates over all rules, section by section.
    pub fn rules(&self) -> impl Iterator<Item = (&Section, &OwnershipRule)> {
        self.sections
            .iter()
            .flat_map(|section| section.rules.iter().map(move |rule| (section, rule)))
    }

    /// Returns the total number of rules.
    pub fn rule_count(&self) -> usize {
        self.sections.iter().map(|s| s.rules.len()).sum()
    }

    /// Returns true if the rule set has no rules.
    pub fn is_empty(&self) -> bool {
        self.rule_count() == 0
    }

    /// Returns the structural diagnostics found while compiling.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Resolves the owners of a path relative to the base directory.
    pub fn resolve(&self, path: &str) -> Resolution<'_> {
        let path = path.strip_prefix('/').unwrap_or(path);
        let candidate = Candidate::new(path);
        let matches: Vec<SectionMatch<'_>> = self
            .sections
            .iter()
            .filter_map(|section| {
                section
                    .last_match(&candidate)
                    .map(|rule| SectionMatch { section, rule })
            })
            .collect();
        trace!("{}: {} section matches", path, matches.len());
        Resolution { matches }
    }
}

/// The outcome of resolving one path against a [`RuleSet`].
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    matches: Vec<SectionMatch<'a>>,
}

impl<'a> Resolution<'a> {
    /// Returns the decisive match of every section that matched.
    pub fn matches(&self) -> &[SectionMatch<'a>] {
        &self.matches
    }

    /// Returns the sorted, distinct owners from non-optional sections.
    pub fn mandatory_owners(&self) -> Vec<String> {
        collect_owners(self.matches.iter().filter(|m| m.section.is_mandatory()))
    }

    /// Returns the sorted, distinct owners from every section.
    pub fn all_owners(&self) -> Vec<String> {
        collect_owners(self.matches.iter())
    }

    /// Returns true if any non-optional section matched.
    pub fn has_mandatory_match(&self) -> bool {
        self.matches.iter().any(|m| m.section.is_mandatory())
    }

    /// Returns the last matching rule, in file order, among non-optional sections.
    pub fn decisive(&self) -> Option<&SectionMatch<'a>> {
        self.matches
            .iter()
            .filter(|m| m.section.is_mandatory())
            .max_by_key(|m| m.rule.line)
    }
}

fn collect_owners<'a, 'b: 'a>(matches: impl Iterator<Item = &'a SectionMatch<'b>>) -> Vec<String> {
    matches
        .flat_map(|m| m.owners().iter().map(|owner| owner.as_str().into_owned()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Accumulates sections while walking the AST.
struct Builder {
    sections: Vec<Section>,
    current: usize,
    /// Default owners of the most recent header.
    defaults: Vec<Owner>,
    min_approvals: Option<u32>,
    diagnostics: Vec<Diagnostic>,
}

impl Builder {
    fn new() -> Self {
        Self {
            sections: vec![Section::implicit()],
            current: 0,
            defaults: Vec::new(),
            min_approvals: None,
            diagnostics: Vec::new(),
        }
    }

    fn open_section(&mut self, header: &SectionHeader) {
        if header.optional
            && let Some(count) = header.min_approvals
        {
            self.diagnostics.push(Diagnostic::optional_section_with_approvals(
                &header.name,
                count,
                header.span,
            ));
        }

        match self.sections.iter().position(|s| s.has_name(&header.name)) {
            Some(index) => {
                let existing = &mut self.sections[index];
                trace!(
                    "Line {}: merging into section '{}'",
                    header.span.line, existing
                );
                if existing.optional != header.optional {
                    self.diagnostics.push(Diagnostic::conflicting_section_flags(
                        existing.to_string(),
                        existing.optional,
                        existing.line.unwrap_or_default(),
                        header.span,
                    ));
                }
                if existing.min_approvals.is_none() {
                    existing.min_approvals = header.min_approvals;
                }
                self.current = index;
            }
            None => {
                self.sections.push(Section {
                    name: Some(header.name.clone()),
                    optional: header.optional,
                    min_approvals: header.min_approvals,
                    default_owners: header.default_owners.clone(),
                    rules: Vec::new(),
                    line: Some(header.span.line),
                });
                self.current = self.sections.len() - 1;
            }
        }

        self.defaults = header.default_owners.clone();
        self.min_approvals = header.min_approvals;
    }

    fn push_rule(&mut self, compiled: Pattern, pattern: &crate::parse::Pattern, owners: &[Owner]) {
        let explicit_owners = !owners.is_empty();
        let owners = if explicit_owners || pattern.negated {
            owners.to_vec()
        } else {
            self.defaults.clone()
        };

        self.sections[self.current].rules.push(OwnershipRule {
            pattern: compiled,
            text: pattern.to_string(),
            owners,
            explicit_owners,
            min_approvals: self.min_approvals,
            negated: pattern.negated,
            line: pattern.span.line,
            span: pattern.span,
        });
    }

    fn finish(mut self) -> RuleSet {
        for section in &self.sections {
            let mut seen: HashMap<&str, usize> = HashMap::new();
            for rule in &section.rules {
                if let Some(&first_line) = seen.get(rule.text.as_str()) {
                    self.diagnostics.push(Diagnostic::duplicate_pattern(
                        &rule.text,
                        section.to_string(),
                        rule.span,
                        first_line,
                    ));
                } else {
                    seen.insert(&rule.text, rule.line);
                }
            }
        }

        self.diagnostics.sort_by_key(Diagnostic::line);
        self.sections
            .retain(|section| !(section.is_implicit() && section.rules.is_empty()));

        RuleSet {
            sections: self.sections,
            diagnostics: self.diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owners(rules: &RuleSet, path: &str) -> Vec<String> {
        rules.resolve(path).mandatory_owners()
    }

    #[test]
    fn last_match_wins_regardless_of_specificity() {
        let rules = RuleSet::parse("/src/main.rs @specific\n*.rs @general\n").unwrap();
        assert_eq!(owners(&rules, "src/main.rs"), vec!["@general"]);

        let rules = RuleSet::parse("*.rs @general\n/src/main.rs @specific\n").unwrap();
        assert_eq!(owners(&rules, "src/main.rs"), vec!["@specific"]);
    }

    #[test]
    fn rule_without_owners_unowns_path() {
        let rules = RuleSet::parse("*.go @alice\nspecial.go\n").unwrap();
        let resolution = rules.resolve("special.go");
        assert!(resolution.mandatory_owners().is_empty());
        assert!(resolution.has_mandatory_match());
        assert_eq!(resolution.decisive().unwrap().rule.line, 2);

        assert_eq!(owners(&rules, "main.go"), vec!["@alice"]);
    }

    #[test]
    fn negated_last_match_unowns_path() {
        let rules = RuleSet::parse("* @everyone\n!vendor/\n").unwrap();
        let resolution = rules.resolve("vendor/lib.c");
        assert!(resolution.mandatory_owners().is_empty());
        assert!(resolution.decisive().unwrap().rule.negated);
        assert_eq!(owners(&rules, "src/lib.c"), vec!["@everyone"]);
    }

    #[test]
    fn unmatched_path_has_no_match() {
        let rules = RuleSet::parse("*.rs @rust\n").unwrap();
        let resolution = rules.resolve("README.md");
        assert!(!resolution.has_mandatory_match());
        assert!(resolution.decisive().is_none());
    }

    #[test]
    fn empty_rule_set() {
        let rules = RuleSet::parse("# nothing here\n").unwrap();
        assert!(rules.is_empty());
        assert!(rules.sections().is_empty());
        assert!(rules.resolve("anything").matches().is_empty());
    }

    #[test]
    fn owners_are_sorted_and_distinct_across_sections() {
        let input = "*.rs @zed @amy\n[Backend]\n*.rs @amy @bob\n";
        let rules = RuleSet::parse(input).unwrap();
        assert_eq!(owners(&rules, "lib.rs"), vec!["@amy", "@bob", "@zed"]);
    }

    #[test]
    fn section_defaults_fill_rules_without_owners() {
        let input = "[Docs] @docs-team\n*.md\n/docs/internal/ @security\n";
        let rules = RuleSet::parse(input).unwrap();
        assert_eq!(owners(&rules, "README.md"), vec!["@docs-team"]);
        assert_eq!(owners(&rules, "docs/internal/plan.txt"), vec!["@security"]);

        let rule = &rules.sections()[0].rules[0];
        assert!(!rule.explicit_owners);
    }

    #[test]
    fn optional_sections_do_not_contribute_mandatory_owners() {
        let input = "*.rs @core\n^[Reviewers] @@maintainer\n*.rs\n";
        let rules = RuleSet::parse(input).unwrap();
        let resolution = rules.resolve("lib.rs");
        assert_eq!(resolution.mandatory_owners(), vec!["@core"]);
        assert_eq!(resolution.all_owners(), vec!["@@maintainer", "@core"]);
    }

    #[test]
    fn optional_only_match_is_not_mandatory() {
        let rules = RuleSet::parse("^[Optional]\n*.md @docs\n").unwrap();
        let resolution = rules.resolve("README.md");
        assert!(!resolution.has_mandatory_match());
        assert!(resolution.mandatory_owners().is_empty());
        assert_eq!(resolution.all_owners(), vec!["@docs"]);
    }

    #[test]
    fn same_named_sections_merge() {
        let input = "[Docs] @a\n*.md\n[Other] @b\n*.txt\n[docs] @c\n/guide/\n";
        let rules = RuleSet::parse(input).unwrap();
        assert_eq!(rules.sections().len(), 2);
        assert_eq!(rules.sections()[0].rules.len(), 2);
        // defaults follow the header the rule was written under
        assert_eq!(owners(&rules, "guide/intro.md"), vec!["@c"]);
    }

    #[test]
    fn min_approvals_come_from_header() {
        let rules = RuleSet::parse("[Security][2] @sec\n/auth/\n").unwrap();
        assert_eq!(rules.sections()[0].min_approvals, Some(2));
        assert_eq!(rules.sections()[0].rules[0].min_approvals, Some(2));
    }

    #[test]
    fn decisive_rule_is_latest_line_among_sections() {
        let input = "*.rs @a\n[Backend]\n/src/ @b\n";
        let rules = RuleSet::parse(input).unwrap();
        let resolution = rules.resolve("src/lib.rs");
        let decisive = resolution.decisive().unwrap();
        assert_eq!(decisive.rule.line, 3);
        assert_eq!(decisive.section.to_string(), "Backend");
    }

    #[test]
    fn invalid_pattern_is_reported_with_line() {
        let errors = RuleSet::parse("*.rs @a\nsrc/[abc.rs @b\n").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            ParseError::InvalidPattern { line: 2, pattern, .. } if pattern == "src/[abc.rs"
        ));
    }

    #[test]
    fn all_parse_errors_are_returned() {
        let errors = RuleSet::parse("bad owner\n*.rs @ok\n!x @y\n").unwrap_err();
        let lines: Vec<_> = errors.iter().map(ParseError::line).collect();
        assert_eq!(lines, vec![1, 3]);
    }

    #[test]
    fn duplicate_patterns_are_diagnosed_per_section() {
        let input = "*.rs @a\n*.rs @b\n[Backend]\n*.rs @c\n";
        let rules = RuleSet::parse(input).unwrap();
        assert_eq!(rules.diagnostics().len(), 1);
        assert!(matches!(
            &rules.diagnostics()[0],
            Diagnostic::DuplicatePattern { line: 2, first_line: 1, .. }
        ));
    }

    #[test]
    fn structural_diagnostics() {
        let input = "^[Docs][2] @a\n*.md\n[docs]\n*.txt\n";
        let rules = RuleSet::parse(input).unwrap();
        let diagnostics = rules.diagnostics();
        assert_eq!(diagnostics.len(), 2);
        assert!(matches!(
            diagnostics[0],
            Diagnostic::OptionalSectionWithApprovals { line: 1, count: 2, .. }
        ));
        assert!(matches!(
            diagnostics[1],
            Diagnostic::ConflictingSectionFlags { line: 3, first_line: 1, .. }
        ));
    }

    #[test]
    fn rules_iterates_with_sections() {
        let rules = RuleSet::parse("*.rs @a\n[Docs]\n*.md @b\n").unwrap();
        let lines: Vec<_> = rules.rules().map(|(_, rule)| rule.line).collect();
        assert_eq!(lines, vec![1, 3]);
        assert_eq!(rules.rule_count(), 2);
    }
}
