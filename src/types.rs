//! Core types for profile-fetch

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Opaque, non-empty key naming a profile (a username)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Create an identifier, trimming surrounding whitespace
    ///
    /// Returns [`Error::InvalidIdentifier`] when nothing is left after trimming.
    pub fn new(raw: impl Into<String>) -> crate::Result<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidIdentifier(raw));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Split comma-separated free text into identifiers
    ///
    /// Entries are trimmed and empty entries are dropped, so
    /// `"alice, bob,,  "` yields `["alice", "bob"]`. Duplicates are kept.
    ///
    /// ```
    /// use profile_fetch::Identifier;
    ///
    /// let ids = Identifier::parse_list("alice, bob,, alice ");
    /// let names: Vec<&str> = ids.iter().map(Identifier::as_str).collect();
    /// assert_eq!(names, ["alice", "bob", "alice"]);
    /// ```
    pub fn parse_list(input: &str) -> Vec<Identifier> {
        input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Identifier(s.to_string()))
            .collect()
    }

    /// Borrow the identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Identifier {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Identifier {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

impl std::str::FromStr for Identifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parsed profile plus the avatar image fetched alongside it
///
/// Field names follow the profile API's JSON object. Text and count fields
/// default to empty or zero when the API omits them or sends `null`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Display name
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    /// Handle, as reported by the API
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,

    /// Number of followers
    #[serde(default, deserialize_with = "null_as_default")]
    pub followers_count: u64,

    /// Number of accounts followed
    #[serde(default, deserialize_with = "null_as_default")]
    pub friends_count: u64,

    /// Number of likes
    #[serde(default, deserialize_with = "null_as_default")]
    pub likes_count: u64,

    /// Number of posts
    #[serde(default, deserialize_with = "null_as_default")]
    pub statuses_count: u64,

    /// Whether the account is verified
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_verified: bool,

    /// When the account was created
    #[serde(default)]
    pub joined: Option<DateTime<Utc>>,

    /// Avatar image reference returned by the API
    #[serde(default, rename = "avatar")]
    pub avatar_url: Option<String>,

    /// Avatar image bytes; `None` only when the profile has no avatar reference
    #[serde(skip)]
    pub avatar_image: Option<Vec<u8>>,
}

/// Read an optional value, mapping `null` to the type's default
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Record {
    /// Calendar date the account was created
    pub fn joined_date(&self) -> Option<NaiveDate> {
        self.joined.map(|ts| ts.date_naive())
    }

    /// Avatar reference, ignoring empty strings
    pub(crate) fn avatar_reference(&self) -> Option<&str> {
        self.avatar_url.as_deref().filter(|url| !url.trim().is_empty())
    }
}

/// Display-only description of why an identifier could not be fetched
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// The identifier that failed
    pub identifier: Identifier,
    /// Human-readable cause
    pub message: String,
}

impl std::fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Result of fetching one identifier
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// Profile (and avatar, when referenced) fetched
    Success(Record),
    /// All attempts failed
    Failure(ErrorDetail),
}

impl FetchOutcome {
    /// Whether this is a [`FetchOutcome::Success`]
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    /// The record, if successful
    pub fn record(&self) -> Option<&Record> {
        match self {
            FetchOutcome::Success(record) => Some(record),
            FetchOutcome::Failure(_) => None,
        }
    }

    /// The error detail, if failed
    pub fn error(&self) -> Option<&ErrorDetail> {
        match self {
            FetchOutcome::Success(_) => None,
            FetchOutcome::Failure(detail) => Some(detail),
        }
    }
}

/// Ordered split of a batch's outcomes for presentation consumers
///
/// Each entry keeps the position it had in the input list.
#[derive(Clone, Debug, Default)]
pub struct BatchReport {
    /// Successful records with their input position
    pub successes: Vec<(usize, Record)>,
    /// Failures with their input position
    pub failures: Vec<(usize, ErrorDetail)>,
}

impl BatchReport {
    /// Number of outcomes the report was built from
    pub fn total(&self) -> usize {
        self.successes.len() + self.failures.len()
    }
}

impl FromIterator<FetchOutcome> for BatchReport {
    fn from_iter<I: IntoIterator<Item = FetchOutcome>>(iter: I) -> Self {
        let mut report = BatchReport::default();
        for (index, outcome) in iter.into_iter().enumerate() {
            match outcome {
                FetchOutcome::Success(record) => report.successes.push((index, record)),
                FetchOutcome::Failure(detail) => report.failures.push((index, detail)),
            }
        }
        report
    }
}
