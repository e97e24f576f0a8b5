//! Line and file-level parsers for CODEOWNERS files.
//!
//! This module combines the lexer components to parse complete lines
//! and entire CODEOWNERS files.

use super::ast::{CodeownersFile, Line, Owner, Pattern, SectionHeader};
use super::error::{ParseError, ParseResult};
use super::lexer::{
    OwnerToken, is_blank_line, make_owner, parse_comment_line, parse_rule_components,
    parse_section_header,
};
use super::span::Span;
use log::{debug, trace};

/// Turns owner tokens into AST owners, failing on the first unknown token.
fn make_owners(
    tokens: &[OwnerToken<'_>],
    line_num: usize,
    line_offset: usize,
) -> Result<Vec<Owner>, ParseError> {
    let mut owners: Vec<Owner> = Vec::with_capacity(tokens.len());
    for &(text, offset) in tokens {
        let span = Span::in_line(line_offset, line_num, offset, text.len());
        let owner = make_owner(text, span).ok_or_else(|| ParseError::expected_owner(text, span))?;
        if owners.iter().any(|o| o.as_str() == owner.as_str()) {
            trace!("Line {}: dropping repeated owner {}", line_num, owner);
            continue;
        }
        owners.push(owner);
    }
    Ok(owners)
}

/// Parses a single line of a CODEOWNERS file.
///
/// Returns the parsed Line AST node, or an error if the line is invalid.
fn parse_line(line_text: &str, line_num: usize, line_offset: usize) -> Result<Line, ParseError> {
    let line_span = Span::new(line_offset, line_num, 1, line_text.len());

    if is_blank_line(line_text) {
        return Ok(Line::blank(line_span));
    }

    if let Ok((_, comment_content)) = parse_comment_line(line_text) {
        return Ok(Line::comment(comment_content, line_span));
    }

    if let Ok((_, header)) = parse_section_header(line_text) {
        let name_span =
            Span::in_line(line_offset, line_num, header.name_offset, header.name.len());
        let name = header.name.trim();
        if name.is_empty() {
            return Err(ParseError::invalid_section("section name is empty", name_span));
        }
        let min_approvals = match header.min_approvals {
            Some(digits) => Some(digits.parse::<u32>().map_err(|e| {
                ParseError::invalid_section(
                    format!("approval count '{}' is not valid: {}", digits, e),
                    name_span,
                )
            })?),
            None => None,
        };
        let default_owners = make_owners(&header.owners, line_num, line_offset)?;
        return Ok(Line::section(
            SectionHeader {
                name: name.to_string(),
                optional: header.optional,
                min_approvals,
                default_owners,
                span: name_span,
            },
            line_span,
        ));
    }

    let (_remaining, components) = parse_rule_components(line_text)
        .map_err(|_| ParseError::invalid_line("could not parse line", line_span))?;

    let pattern_span = Span::in_line(
        line_offset,
        line_num,
        components.pattern_offset,
        components.pattern.len(),
    );
    let owners = make_owners(&components.owners, line_num, line_offset)?;

    let pattern = match components.pattern.strip_prefix('!') {
        Some("") => return Err(ParseError::expected_pattern(pattern_span)),
        Some(text) if !owners.is_empty() => {
            return Err(ParseError::negated_with_owners(text, pattern_span));
        }
        Some(text) => Pattern::negated(text, pattern_span),
        None => Pattern::new(components.pattern, pattern_span),
    };

    Ok(Line::rule(pattern, owners, line_span))
}

/// Parses a CODEOWNERS file.
///
/// Parsing never stops early: each failing line is kept as
/// `LineKind::Invalid` and its error is collected.
pub fn parse_codeowners(input: &str) -> ParseResult {
    debug!("Parsing CODEOWNERS file ({} bytes)", input.len());
    let mut lines = Vec::new();
    let mut errors = Vec::new();
    let mut offset = 0;
    let mut remaining = input;

    for (line_idx, line_text) in input.lines().enumerate() {
        let line_num = line_idx + 1;

        match parse_line(line_text, line_num, offset) {
            Ok(line) => {
                trace!("Line {}: parsed successfully", line_num);
                lines.push(line);
            }
            Err(error) => {
                debug!("Line {}: parse error - {}", line_num, error);
                let line_span = Span::new(offset, line_num, 1, line_text.len());
                lines.push(Line::invalid(line_text, error.to_string(), line_span));
                errors.push(error);
            }
        }

        // Byte offset of the next line, accounting for both LF and CRLF endings
        let after_content = &remaining[line_text.len()..];
        let line_with_ending_len = if after_content.starts_with("\r\n") {
            line_text.len() + 2
        } else if after_content.starts_with('\n') {
            line_text.len() + 1
        } else {
            line_text.len()
        };

        offset += line_with_ending_len;
        remaining = &remaining[line_with_ending_len..];
    }

    let ast = CodeownersFile::new(lines);

    debug!(
        "Parsing complete: {} lines, {} errors",
        ast.lines.len(),
        errors.len()
    );
    if errors.is_empty() {
        ParseResult::ok(ast)
    } else {
        ParseResult::with_errors(ast, errors)
    }
}
