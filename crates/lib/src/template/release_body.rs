//! The release notes template and its placeholders.
//!
//! `release.txt.template` contains literal `{sha256}`, `{url}` and
//! `{version}` placeholders. The release job fills them in with `sed` once
//! the release archive exists; the generator only checks that the template
//! uses no placeholder `sed` would leave behind, and renders the notes
//! locally when handed already resolved values.
//!
//! A placeholder is `{` followed by lowercase letters, digits or `_` and a
//! closing `}`. Any other brace passes through unchanged, so Starlark or JSON
//! snippets in the notes need no escaping.
//!
//! # Example
//!
//! ```
//! use musl_ci_lib::template::release_body::{parse, Segment, Placeholder};
//!
//! let segments = parse("sha256 = \"{sha256}\"").unwrap();
//! assert_eq!(segments, vec![
//!     Segment::Literal("sha256 = \"".to_string()),
//!     Segment::Placeholder(Placeholder::Sha256),
//!     Segment::Literal("\"".to_string()),
//! ]);
//! ```

use thiserror::Error;

use super::digest::{PendingDigest, ResolvedDigest};

/// Default template, shipped at the repository root.
pub const RELEASE_BODY_TEMPLATE: &str =
  include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../../release.txt.template"));

/// Path of the template relative to the repository root.
pub const RELEASE_BODY_TEMPLATE_PATH: &str = "release.txt.template";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
  Sha256,
  Url,
  Version,
}

impl Placeholder {
  pub const ALL: [Placeholder; 3] = [Placeholder::Sha256, Placeholder::Url, Placeholder::Version];

  pub fn key(&self) -> &'static str {
    match self {
      Placeholder::Sha256 => "sha256",
      Placeholder::Url => "url",
      Placeholder::Version => "version",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
  Literal(String),
  Placeholder(Placeholder),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReleaseBodyError {
  #[error("unknown placeholder {{{name}}} at position {position}")]
  UnknownPlaceholder { name: String, position: usize },
}

/// Parses a release body template into literal and placeholder segments.
pub fn parse(input: &str) -> Result<Vec<Segment>, ReleaseBodyError> {
  let mut segments = Vec::new();
  let mut literal = String::new();
  let mut rest = input;
  let mut offset = 0;

  while let Some(open) = rest.find('{') {
    literal.push_str(&rest[..open]);
    let after = &rest[open + 1..];
    let name_len = after
      .find(|c: char| !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'))
      .unwrap_or(after.len());

    if name_len > 0 && after[name_len..].starts_with('}') {
      let name = &after[..name_len];
      let placeholder = Placeholder::ALL
        .into_iter()
        .find(|p| p.key() == name)
        .ok_or_else(|| ReleaseBodyError::UnknownPlaceholder {
          name: name.to_string(),
          position: offset + open,
        })?;
      if !literal.is_empty() {
        segments.push(Segment::Literal(std::mem::take(&mut literal)));
      }
      segments.push(Segment::Placeholder(placeholder));
      let consumed = open + 1 + name_len + 1;
      offset += consumed;
      rest = &rest[consumed..];
    } else {
      literal.push('{');
      offset += open + 1;
      rest = after;
    }
  }

  literal.push_str(rest);
  if !literal.is_empty() {
    segments.push(Segment::Literal(literal));
  }

  Ok(segments)
}

/// Values resolved at execution time.
#[derive(Debug, Clone)]
pub struct ResolvedValues<'a> {
  pub sha256: &'a ResolvedDigest,
  pub url: &'a str,
  pub version: &'a str,
}

/// Renders the template with resolved values.
pub fn render(template: &str, values: &ResolvedValues<'_>) -> Result<String, ReleaseBodyError> {
  let mut out = String::with_capacity(template.len());
  for segment in parse(template)? {
    match segment {
      Segment::Literal(text) => out.push_str(&text),
      Segment::Placeholder(Placeholder::Sha256) => out.push_str(values.sha256.as_str()),
      Segment::Placeholder(Placeholder::Url) => out.push_str(values.url),
      Segment::Placeholder(Placeholder::Version) => out.push_str(values.version),
    }
  }
  Ok(out)
}

/// Shell command the release job runs to fill in the template.
///
/// The digest is resolved by the shell from the staged release archive; the
/// URL and version are substituted by `sed`.
pub fn sed_command(digest: &PendingDigest, url: &str, version: &str, output: &str) -> String {
  let exprs = Placeholder::ALL
    .iter()
    .map(|p| format!("-e \"s#{{{key}}}#${{{key}}}#g\"", key = p.key()))
    .collect::<Vec<_>>()
    .join(" ");
  format!(
    "sha256={} ; url='{url}' ; version='{version}' ; sed {exprs} {RELEASE_BODY_TEMPLATE_PATH} > {output}",
    digest.shell_expr()
  )
}
