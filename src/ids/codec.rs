//! Parsing and formatting of hierarchical ARM resource paths.
//!
//! Canonical form:
//! `/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.DocumentDB/databaseAccounts/{account}[/{key}/{name}]...`
//!
//! Keys are compared case-sensitively. Legacy key spellings listed on a
//! [`Segment`] are accepted when parsing and never produced when formatting.

use crate::error::ParseError;

use super::kind::{ResourceKind, Segment};

pub const PROVIDER_NAMESPACE: &str = "Microsoft.DocumentDB";

const SUBSCRIPTIONS: &str = "subscriptions";
const RESOURCE_GROUPS: &str = "resourceGroups";
const PROVIDERS: &str = "providers";

/// The components of a parsed id, before they are bound to a typed struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePath {
    pub subscription_id: String,
    pub resource_group: String,
    /// One name per segment of the kind, account first.
    pub names: Vec<String>,
}

enum Take<'a> {
    Found(&'a str),
    Missing,
    Miscased(&'a str),
}

struct Cursor<'a> {
    components: Vec<&'a str>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn rest(&self) -> &[&'a str] {
        self.components.get(self.pos..).unwrap_or_default()
    }

    fn take(&mut self, key: &str, legacy: &[&[&str]]) -> Take<'a> {
        let rest = self.rest();
        if rest.first() == Some(&key) {
            return self.value_after(1);
        }
        for alias in legacy {
            if rest.len() >= alias.len() && rest[..alias.len()] == alias[..] {
                return self.value_after(alias.len());
            }
        }

        let Some(&found) = rest.first() else {
            return Take::Missing;
        };
        if found.eq_ignore_ascii_case(key) {
            return Take::Miscased(found);
        }
        for alias in legacy {
            if rest.len() >= alias.len()
                && rest.iter().zip(alias.iter()).all(|(r, a)| r.eq_ignore_ascii_case(a))
            {
                let miscased = rest
                    .iter()
                    .zip(alias.iter())
                    .find(|(r, a)| r != a)
                    .map(|(r, _)| *r)
                    .unwrap_or(found);
                return Take::Miscased(miscased);
            }
        }
        Take::Missing
    }

    fn value_after(&mut self, key_len: usize) -> Take<'a> {
        match self.rest().get(key_len).copied() {
            Some(value) if !value.is_empty() => {
                self.pos += key_len + 1;
                Take::Found(value)
            }
            _ => Take::Missing,
        }
    }
}

fn unexpected(expected: &str, found: &str) -> ParseError {
    ParseError::UnexpectedSegment {
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

/// Parse `input` as an id of the given `kind`.
pub fn parse(input: &str, kind: ResourceKind) -> Result<ResourcePath, ParseError> {
    let trimmed = input.strip_suffix('/').unwrap_or(input);
    let components: Vec<&str> = trimmed.split('/').collect();
    if components.first() != Some(&"") {
        return Err(ParseError::MissingSubscription);
    }
    let mut cursor = Cursor { components, pos: 1 };

    let subscription_id = match cursor.take(SUBSCRIPTIONS, &[]) {
        Take::Found(v) => v.to_string(),
        Take::Missing => return Err(ParseError::MissingSubscription),
        Take::Miscased(found) => return Err(unexpected(SUBSCRIPTIONS, found)),
    };
    let resource_group = match cursor.take(RESOURCE_GROUPS, &[]) {
        Take::Found(v) => v.to_string(),
        Take::Missing => return Err(ParseError::MissingResourceGroup),
        Take::Miscased(found) => return Err(unexpected(RESOURCE_GROUPS, found)),
    };
    match cursor.take(PROVIDERS, &[]) {
        Take::Found(namespace) if namespace == PROVIDER_NAMESPACE => {}
        Take::Found(namespace) => return Err(unexpected(PROVIDER_NAMESPACE, namespace)),
        Take::Missing => return Err(ParseError::MissingSegment(PROVIDERS.to_string())),
        Take::Miscased(found) => return Err(unexpected(PROVIDERS, found)),
    }

    let mut names = Vec::with_capacity(kind.segments().len());
    for segment in kind.segments() {
        match cursor.take(segment.key, segment.legacy) {
            Take::Found(v) => names.push(v.to_string()),
            Take::Missing => return Err(ParseError::MissingSegment(segment.key.to_string())),
            Take::Miscased(found) => return Err(unexpected(segment.key, found)),
        }
    }

    let rest = cursor.rest();
    if !rest.is_empty() {
        return Err(ParseError::UnexpectedTrailingSegments(rest.join("/")));
    }

    Ok(ResourcePath {
        subscription_id,
        resource_group,
        names,
    })
}

/// Render the canonical id string. `names` pairs up with `kind.segments()`.
pub fn format(
    kind: ResourceKind,
    subscription_id: &str,
    resource_group: &str,
    names: &[&str],
) -> String {
    let mut id = format!(
        "/{SUBSCRIPTIONS}/{subscription_id}/{RESOURCE_GROUPS}/{resource_group}/{PROVIDERS}/{PROVIDER_NAMESPACE}"
    );
    for (Segment { key, .. }, name) in kind.segments().iter().zip(names) {
        id.push('/');
        id.push_str(key);
        id.push('/');
        id.push_str(name);
    }
    id
}
