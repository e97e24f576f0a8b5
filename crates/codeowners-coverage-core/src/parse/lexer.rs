//! Lexer and token parsers for CODEOWNERS files.
//!
//! This module contains nom-based parsers for individual tokens
//! like patterns, owners, comments and section headers.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{anychar, char, digit1, space0},
    combinator::{opt, recognize, rest},
    error::{Error, ErrorKind},
    multi::many1_count,
    sequence::{delimited, pair},
};

use super::ast::Owner;
use super::span::Span;

/// Characters that can appear unescaped in a pattern.
fn is_pattern_char(c: char) -> bool {
    !c.is_whitespace() && c != '#' && c != '\\'
}

/// Characters that can appear in an owner token.
fn is_owner_char(c: char) -> bool {
    !c.is_whitespace() && c != '#'
}

/// Parses a complete comment line (optional whitespace + # + content).
pub fn parse_comment_line(input: &str) -> IResult<&str, &str> {
    (space0, char('#'), rest)
        .map(|(_, _, content)| content)
        .parse(input)
}

/// Checks if a line is blank (empty or only whitespace).
pub fn is_blank_line(input: &str) -> bool {
    input.trim().is_empty()
}

/// Parses a pattern token.
///
/// A backslash makes the following character part of the token, so
/// `foo\ bar` and `\#hash` are single patterns.
pub fn pattern_token(input: &str) -> IResult<&str, &str> {
    recognize(many1_count(alt((
        recognize(pair(char('\\'), anychar)),
        take_while1(is_pattern_char),
    ))))
    .parse(input)
}

/// An owner token and its byte offset within the line.
pub type OwnerToken<'a> = (&'a str, usize);

/// Parses whitespace-separated owner tokens up to an inline comment or the end.
///
/// `offset` is the byte offset of `input` within the line.
fn parse_owner_list(input: &str, mut offset: usize) -> IResult<&str, Vec<OwnerToken<'_>>> {
    let mut owners = Vec::new();
    let mut current = input;

    loop {
        let (after_ws, ws) = space0(current)?;
        offset += ws.len();

        if after_ws.is_empty() || after_ws.starts_with('#') {
            current = after_ws;
            break;
        }

        let (after_owner, owner) = take_while1(is_owner_char).parse(after_ws)?;
        owners.push((owner, offset));
        offset += owner.len();
        current = after_owner;
    }

    Ok((current, owners))
}

/// Result of parsing a rule line's components.
#[derive(Debug, Clone)]
pub struct RuleComponents<'a> {
    /// The pattern text, including a leading `!` if present.
    pub pattern: &'a str,
    /// Byte offset of pattern start within the line.
    pub pattern_offset: usize,
    /// Owner texts with their byte offsets; may be empty.
    pub owners: Vec<OwnerToken<'a>>,
}

/// Parses the components of a rule line (pattern + zero or more owners).
///
/// This parser extracts the raw text and offsets without constructing
/// AST nodes, allowing the caller to add span information.
pub fn parse_rule_components(input: &str) -> IResult<&str, RuleComponents<'_>> {
    let (after_ws, leading_ws) = space0(input)?;
    let pattern_offset = leading_ws.len();

    let (after_pattern, pattern) = pattern_token(after_ws)?;

    // The pattern must be followed by whitespace, a comment or the end
    if let Some(next) = after_pattern.chars().next()
        && !next.is_whitespace()
    {
        return Err(nom::Err::Error(Error::new(after_pattern, ErrorKind::Space)));
    }

    let (rest, owners) = parse_owner_list(after_pattern, pattern_offset + pattern.len())?;

    Ok((
        rest,
        RuleComponents {
            pattern,
            pattern_offset,
            owners,
        },
    ))
}

/// Result of parsing a section header line.
#[derive(Debug, Clone)]
pub struct SectionComponents<'a> {
    /// Whether the header starts with `^`.
    pub optional: bool,
    /// The text between the first pair of brackets.
    pub name: &'a str,
    /// Byte offset of the name within the line.
    pub name_offset: usize,
    /// The digits of the `[N]` suffix, if present.
    pub min_approvals: Option<&'a str>,
    /// Default owners with their byte offsets.
    pub owners: Vec<OwnerToken<'a>>,
}

/// Parses a section header: `^?[Name][N]? owner*`.
///
/// The closing bracket must be followed by whitespace or the end of the line,
/// otherwise the line is a rule whose pattern starts with a character class
/// (e.g. `[abc]*.rs`).
pub fn parse_section_header(input: &str) -> IResult<&str, SectionComponents<'_>> {
    let (after_ws, leading_ws) = space0(input)?;
    let (after_caret, caret) = opt(char('^')).parse(after_ws)?;
    let (after_name, name) =
        delimited(char('['), take_while1(|c: char| c != ']'), char(']')).parse(after_caret)?;
    let (after_count, count) =
        opt(delimited(char('['), digit1, char(']'))).parse(after_name)?;

    if let Some(next) = after_count.chars().next()
        && !next.is_whitespace()
    {
        return Err(nom::Err::Error(Error::new(after_count, ErrorKind::Verify)));
    }

    let name_offset = leading_ws.len() + usize::from(caret.is_some()) + 1;
    let header_len = input.len() - after_count.len();
    let (rest, owners) = parse_owner_list(after_count, header_len)?;

    Ok((
        rest,
        SectionComponents {
            optional: caret.is_some(),
            name,
            name_offset,
            min_approvals: count,
            owners,
        },
    ))
}

/// Classifies an owner string into its type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerKind<'a> {
    /// A user (@username).
    User(&'a str),
    /// A team (@org/team, possibly nested).
    Team { org: &'a str, team: &'a str },
    /// An email address.
    Email(&'a str),
    /// A platform role (@@role).
    Role(&'a str),
    /// Unknown/invalid format.
    Unknown(&'a str),
}

/// Classifies an owner text string into its type.
pub fn classify_owner(text: &str) -> OwnerKind<'_> {
    if let Some(role) = text.strip_prefix("@@") {
        if !role.is_empty() && !role.contains(['@', '/']) {
            return OwnerKind::Role(role);
        }
        return OwnerKind::Unknown(text);
    }

    if let Some(stripped) = text.strip_prefix('@') {
        if let Some((org, team)) = stripped.split_once('/') {
            if !org.is_empty() && !team.is_empty() && !team.ends_with('/') {
                return OwnerKind::Team { org, team };
            }
            return OwnerKind::Unknown(text);
        }
        if !stripped.is_empty() && !stripped.contains('@') {
            return OwnerKind::User(stripped);
        }
        return OwnerKind::Unknown(text);
    }

    if let Some((local, domain)) = text.split_once('@')
        && !local.is_empty()
        && domain.contains('.')
        && !domain.contains('@')
    {
        return OwnerKind::Email(text);
    }

    OwnerKind::Unknown(text)
}

/// Creates an Owner AST node from text and span.
///
/// Returns `None` when the text is not a recognizable owner.
pub fn make_owner(text: &str, span: Span) -> Option<Owner> {
    match classify_owner(text) {
        OwnerKind::User(name) => Some(Owner::user(name, span)),
        OwnerKind::Team { org, team } => Some(Owner::team(org, team, span)),
        OwnerKind::Email(email) => Some(Owner::email(email, span)),
        OwnerKind::Role(role) => Some(Owner::role(role, span)),
        OwnerKind::Unknown(_) => None,
    }
}
