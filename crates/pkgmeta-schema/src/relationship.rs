//! Package-relationship grammar shared by all formats.
//!
//! The four formats agree on the shape `name [op version] ["|" alternative]*`
//! but disagree on lexical details. Each dialect is a unit type implementing
//! [`RelationshipGrammar`]; the parsing algorithm lives once, in
//! [`RelationshipGrammar::validate`].
//!
//! Accepted entries keep their raw text. Nothing is trimmed, reordered, or
//! respelled on the way to the package builder.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelationshipError {
    #[error("malformed {dialect} relationship '{raw}' at '{fragment}': {reason}")]
    MalformedEntry {
        raw: String,
        dialect: Dialect,
        fragment: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Apk,
    Archlinux,
    Debian,
    Rpm,
}

impl Dialect {
    pub const ALL: [Dialect; 4] = [
        Dialect::Apk,
        Dialect::Archlinux,
        Dialect::Debian,
        Dialect::Rpm,
    ];

    pub fn grammar(self) -> &'static dyn RelationshipGrammar {
        match self {
            Dialect::Apk => &ApkGrammar,
            Dialect::Archlinux => &ArchlinuxGrammar,
            Dialect::Debian => &DebianGrammar,
            Dialect::Rpm => &RpmGrammar,
        }
    }

    pub fn validate(
        self,
        kind: RelationshipKind,
        raw: &str,
    ) -> Result<RelationshipEntry, RelationshipError> {
        self.grammar().validate(kind, raw)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Apk => "apk",
            Dialect::Archlinux => "archlinux",
            Dialect::Debian => "debian",
            Dialect::Rpm => "rpm",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
    Depends,
    Provides,
    Conflicts,
    Replaces,
    Breaks,
    Recommends,
    Suggests,
}

impl RelationshipKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            RelationshipKind::Depends => "depends",
            RelationshipKind::Provides => "provides",
            RelationshipKind::Conflicts => "conflicts",
            RelationshipKind::Replaces => "replaces",
            RelationshipKind::Breaks => "breaks",
            RelationshipKind::Recommends => "recommends",
            RelationshipKind::Suggests => "suggests",
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
    /// Debian `<<`.
    StrictlyLess,
    /// Debian `>>`.
    StrictlyGreater,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Eq => "=",
            Operator::Ge => ">=",
            Operator::Gt => ">",
            Operator::StrictlyLess => "<<",
            Operator::StrictlyGreater => ">>",
        }
    }

    pub fn from_symbol(s: &str) -> Option<Self> {
        Some(match s {
            "<" => Operator::Lt,
            "<=" => Operator::Le,
            "=" => Operator::Eq,
            ">=" => Operator::Ge,
            ">" => Operator::Gt,
            "<<" => Operator::StrictlyLess,
            ">>" => Operator::StrictlyGreater,
            _ => return None,
        })
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Where a version constraint sits relative to the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionStyle {
    /// `name>=1.0`
    Suffix,
    /// `name (>= 1.0)`
    Parenthesized,
}

/// What a relationship name refers to, as far as the dialect distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameKind {
    Package,
    SharedObject,
    Command,
    PkgConfig,
    Path,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConstraint {
    pub operator: Operator,
    pub version: String,
}

/// One alternative of a relationship entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub name: String,
    pub name_kind: NameKind,
    /// APK `!name` conflict marker.
    pub negated: bool,
    pub constraint: Option<VersionConstraint>,
}

/// An accepted relationship entry: the verbatim text plus what was parsed from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipEntry {
    raw: String,
    clauses: Vec<Clause>,
}

impl RelationshipEntry {
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn into_inner(self) -> String {
        self.raw
    }
}

impl fmt::Display for RelationshipEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for RelationshipEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

const OPERATOR_CHARS: &[char] = &['<', '>', '='];
const NAME_PUNCT: &[char] = &['+', '-', '.', '_', ':', '/', '@'];
const VERSION_PUNCT: &[char] = &['+', '-', '.', '_', ':', '~'];

const NO_OPERATORS: &[Operator] = &[];
const EQ_ONLY: &[Operator] = &[Operator::Eq];
const COMPARISONS: &[Operator] = &[
    Operator::Lt,
    Operator::Le,
    Operator::Eq,
    Operator::Ge,
    Operator::Gt,
];
const DEBIAN_OPERATORS: &[Operator] = &[
    Operator::StrictlyLess,
    Operator::Le,
    Operator::Eq,
    Operator::Ge,
    Operator::StrictlyGreater,
];

/// Lexical rules of one dialect.
pub trait RelationshipGrammar: Send + Sync {
    fn dialect(&self) -> Dialect;

    fn version_style(&self) -> VersionStyle;

    /// Operators accepted for `kind`. Empty means names only.
    fn operators(&self, kind: RelationshipKind) -> &'static [Operator];

    fn allows_alternatives(&self, _kind: RelationshipKind) -> bool {
        false
    }

    fn allows_negation(&self, _kind: RelationshipKind) -> bool {
        false
    }

    fn name_kind(&self, _name: &str) -> NameKind {
        NameKind::Package
    }

    /// Accept or reject one entry. The accepted entry re-emits `raw` unchanged.
    fn validate(
        &self,
        kind: RelationshipKind,
        raw: &str,
    ) -> Result<RelationshipEntry, RelationshipError> {
        let p = EntryParser {
            grammar: self,
            kind,
            raw,
        };
        if raw.trim().is_empty() {
            return Err(p.fail(raw, "entry is empty"));
        }

        let alternatives: Vec<&str> = if let Some(idx) = raw.find('|') {
            if !self.allows_alternatives(kind) {
                return Err(p.fail(
                    &raw[idx..=idx],
                    &format!(
                        "{} {kind} entries do not support '|' alternatives",
                        self.dialect()
                    ),
                ));
            }
            raw.split('|').collect()
        } else {
            vec![raw]
        };

        let mut clauses = Vec::with_capacity(alternatives.len());
        for alt in alternatives {
            if alt.trim().is_empty() {
                return Err(p.fail(alt, "alternative is missing a package name"));
            }
            let clause = match self.version_style() {
                VersionStyle::Suffix => p.suffix_clause(alt)?,
                VersionStyle::Parenthesized => p.parenthesized_clause(alt.trim())?,
            };
            clauses.push(clause);
        }

        Ok(RelationshipEntry {
            raw: raw.to_owned(),
            clauses,
        })
    }
}

struct EntryParser<'a, G: ?Sized> {
    grammar: &'a G,
    kind: RelationshipKind,
    raw: &'a str,
}

impl<G: RelationshipGrammar + ?Sized> EntryParser<'_, G> {
    fn fail(&self, fragment: &str, reason: &str) -> RelationshipError {
        RelationshipError::MalformedEntry {
            raw: self.raw.to_owned(),
            dialect: self.grammar.dialect(),
            fragment: fragment.to_owned(),
            reason: reason.to_owned(),
        }
    }

    fn suffix_clause(&self, text: &str) -> Result<Clause, RelationshipError> {
        if let Some(idx) = text.find(['(', ')']) {
            return Err(self.fail(
                &text[idx..],
                "parenthesized versions are not supported; append the constraint to the name",
            ));
        }
        if let Some(idx) = text.find(char::is_whitespace) {
            return Err(self.fail(&text[idx..], "unexpected whitespace"));
        }

        let (negated, body) = self.strip_negation(text)?;
        let Some(op_start) = body.find(OPERATOR_CHARS) else {
            return self.clause(body, negated, None);
        };

        let name = &body[..op_start];
        let rest = &body[op_start..];
        let op_len = rest
            .find(|c: char| !OPERATOR_CHARS.contains(&c))
            .unwrap_or(rest.len());
        let (symbol, version) = rest.split_at(op_len);

        if name.is_empty() {
            return Err(self.fail(rest, "version constraint has no package name"));
        }
        let constraint = self.constraint(symbol, version, rest)?;
        self.clause(name, negated, Some(constraint))
    }

    fn parenthesized_clause(&self, text: &str) -> Result<Clause, RelationshipError> {
        let (negated, body) = self.strip_negation(text)?;

        let Some(open) = body.find('(') else {
            if let Some(idx) = body.find(')') {
                return Err(self.fail(&body[idx..], "unbalanced parenthesis"));
            }
            return self.clause(body, negated, None);
        };

        let name = body[..open].trim_end();
        let group = &body[open..];
        let Some(close) = group.find(')') else {
            return Err(self.fail(group, "unterminated version constraint"));
        };
        if close + 1 != group.len() {
            return Err(self.fail(
                &group[close + 1..],
                "unexpected text after version constraint",
            ));
        }
        if name.is_empty() {
            return Err(self.fail(group, "version constraint has no package name"));
        }

        let inner = group[1..close].trim();
        if inner.contains('(') {
            return Err(self.fail(group, "nested parenthesis"));
        }
        let op_len = inner
            .find(|c: char| !OPERATOR_CHARS.contains(&c))
            .unwrap_or(inner.len());
        let (symbol, version) = inner.split_at(op_len);
        if symbol.is_empty() {
            return Err(self.fail(group, "expected an operator inside the parentheses"));
        }
        let constraint = self.constraint(symbol, version.trim_start(), group)?;
        self.clause(name, negated, Some(constraint))
    }

    fn strip_negation<'t>(&self, text: &'t str) -> Result<(bool, &'t str), RelationshipError> {
        match text.strip_prefix('!') {
            Some(rest) if self.grammar.allows_negation(self.kind) => Ok((true, rest)),
            Some(_) => Err(self.fail(
                "!",
                &format!(
                    "'!' conflict markers are not supported in {} {} entries",
                    self.grammar.dialect(),
                    self.kind
                ),
            )),
            None => Ok((false, text)),
        }
    }

    fn constraint(
        &self,
        symbol: &str,
        version: &str,
        whole: &str,
    ) -> Result<VersionConstraint, RelationshipError> {
        let allowed = self.grammar.operators(self.kind);
        if allowed.is_empty() {
            return Err(self.fail(
                whole,
                &format!(
                    "{} {} entries take bare names without versions",
                    self.grammar.dialect(),
                    self.kind
                ),
            ));
        }
        let operator = Operator::from_symbol(symbol)
            .filter(|op| allowed.contains(op))
            .ok_or_else(|| {
                let expected: Vec<&str> = allowed.iter().map(|op| op.symbol()).collect();
                self.fail(
                    symbol,
                    &format!(
                        "operator '{symbol}' is not allowed here; expected one of {}",
                        expected.join(" ")
                    ),
                )
            })?;

        if version.is_empty() {
            return Err(self.fail(whole, "operator is missing a version"));
        }
        if let Some(bad) = version
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && !VERSION_PUNCT.contains(c))
        {
            return Err(self.fail(
                version,
                &format!("invalid character '{bad}' in version"),
            ));
        }

        Ok(VersionConstraint {
            operator,
            version: version.to_owned(),
        })
    }

    fn clause(
        &self,
        name: &str,
        negated: bool,
        constraint: Option<VersionConstraint>,
    ) -> Result<Clause, RelationshipError> {
        if name.is_empty() {
            return Err(self.fail(self.raw, "missing package name"));
        }
        if let Some(idx) = name.find(OPERATOR_CHARS) {
            return Err(self.fail(
                &name[idx..],
                "version constraints must be parenthesized, like 'name (>= 1.0)'",
            ));
        }
        if let Some(idx) = name.find(char::is_whitespace) {
            return Err(self.fail(name[idx..].trim_start(), "unexpected text after package name"));
        }
        if let Some(bad) = name
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && !NAME_PUNCT.contains(c))
        {
            return Err(self.fail(name, &format!("invalid character '{bad}' in package name")));
        }

        Ok(Clause {
            name: name.to_owned(),
            name_kind: self.grammar.name_kind(name),
            negated,
            constraint,
        })
    }
}

/// Alpine `apk`: `git=2.40.1-r0`, `so:libz.so.1`, `!conflicting`.
pub struct ApkGrammar;

impl RelationshipGrammar for ApkGrammar {
    fn dialect(&self) -> Dialect {
        Dialect::Apk
    }

    fn version_style(&self) -> VersionStyle {
        VersionStyle::Suffix
    }

    fn operators(&self, kind: RelationshipKind) -> &'static [Operator] {
        match kind {
            RelationshipKind::Replaces => NO_OPERATORS,
            _ => COMPARISONS,
        }
    }

    fn allows_negation(&self, kind: RelationshipKind) -> bool {
        kind == RelationshipKind::Depends
    }

    fn name_kind(&self, name: &str) -> NameKind {
        if name.starts_with('/') {
            NameKind::Path
        } else if name.starts_with("so:") {
            NameKind::SharedObject
        } else if name.starts_with("cmd:") {
            NameKind::Command
        } else if name.starts_with("pc:") {
            NameKind::PkgConfig
        } else {
            NameKind::Package
        }
    }
}

/// Archlinux `pacman`: `tcpdump<5`, `libbaz.so=2`.
pub struct ArchlinuxGrammar;

impl RelationshipGrammar for ArchlinuxGrammar {
    fn dialect(&self) -> Dialect {
        Dialect::Archlinux
    }

    fn version_style(&self) -> VersionStyle {
        VersionStyle::Suffix
    }

    fn operators(&self, kind: RelationshipKind) -> &'static [Operator] {
        match kind {
            RelationshipKind::Provides => EQ_ONLY,
            _ => COMPARISONS,
        }
    }

    fn name_kind(&self, name: &str) -> NameKind {
        if name.ends_with(".so") {
            NameKind::SharedObject
        } else {
            NameKind::Package
        }
    }
}

/// Debian `dpkg`: `libc6 (>= 2.2.1)`, `default-mta | mail-transport-agent`.
pub struct DebianGrammar;

impl RelationshipGrammar for DebianGrammar {
    fn dialect(&self) -> Dialect {
        Dialect::Debian
    }

    fn version_style(&self) -> VersionStyle {
        VersionStyle::Parenthesized
    }

    fn operators(&self, kind: RelationshipKind) -> &'static [Operator] {
        match kind {
            RelationshipKind::Provides => EQ_ONLY,
            _ => DEBIAN_OPERATORS,
        }
    }

    fn allows_alternatives(&self, kind: RelationshipKind) -> bool {
        matches!(
            kind,
            RelationshipKind::Depends | RelationshipKind::Recommends | RelationshipKind::Suggests
        )
    }
}

/// RPM: `bash (< 5)`, `/bin/sh`.
pub struct RpmGrammar;

impl RelationshipGrammar for RpmGrammar {
    fn dialect(&self) -> Dialect {
        Dialect::Rpm
    }

    fn version_style(&self) -> VersionStyle {
        VersionStyle::Parenthesized
    }

    fn operators(&self, kind: RelationshipKind) -> &'static [Operator] {
        match kind {
            RelationshipKind::Provides => EQ_ONLY,
            _ => COMPARISONS,
        }
    }

    fn name_kind(&self, name: &str) -> NameKind {
        if name.starts_with('/') {
            NameKind::Path
        } else {
            NameKind::Package
        }
    }
}
