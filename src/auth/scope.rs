//! Scope modeling and the Fitbit scope policy.

// std
use std::{collections::BTreeSet, slice::Iter};
// crates.io
use serde::{Deserializer, Serializer, de::Error as DeError, ser::SerializeSeq};
// self
use crate::_prelude::*;

/// Errors emitted when normalizing scope strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ScopeValidationError {
	/// Empty scope entries are not allowed.
	#[error("Scope entries cannot be empty.")]
	Empty,
	/// Scopes cannot contain embedded whitespace characters.
	#[error("Scope contains whitespace: {scope}.")]
	ContainsWhitespace {
		/// The offending scope string.
		scope: String,
	},
}

/// Errors emitted when a requested scope set violates the provider's scope policy.
///
/// The checks run in a pinned order (too few scopes, then missing required scope(s), then
/// disallowed scope(s)) and the first failing check wins, so malformed input tripping several
/// conditions at once reports deterministically.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ScopeConfigurationError {
	/// Fewer scopes were requested than the provider requires.
	#[error("Requested {supplied} scope(s) but the provider requires at least {required}.")]
	TooFew {
		/// Number of distinct scopes supplied by the caller.
		supplied: usize,
		/// Cardinality of the required scope set.
		required: usize,
	},
	/// One or more required scopes are absent from the request.
	#[error("Request is missing required scope(s): {}.", missing.join(" "))]
	MissingRequired {
		/// Required scopes absent from the request.
		missing: Vec<String>,
	},
	/// One or more requested scopes are outside the provider's vocabulary.
	#[error("Request contains scope(s) the provider does not offer: {}.", disallowed.join(" "))]
	Disallowed {
		/// Requested scopes outside the permitted vocabulary.
		disallowed: Vec<String>,
	},
}

/// Errors emitted when constructing a custom scope catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ScopeCatalogError {
	/// Required scopes must be drawn from the full vocabulary.
	#[error("Required scope is not part of the full vocabulary: {scope}.")]
	RequiredOutsideVocabulary {
		/// The required scope missing from the vocabulary.
		scope: String,
	},
}

/// Normalized set of OAuth scopes.
///
/// Scopes are deduplicated and sorted so equality, ordering, and hashing remain consistent
/// across platforms; duplicates in the input are harmless. Serialization joins the normalized
/// tokens with a single space.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeSet {
	scopes: Arc<[String]>,
}
impl ScopeSet {
	/// Creates a normalized scope set from any iterator.
	pub fn new<I, S>(scopes: I) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Ok(Self { scopes: normalize(scopes)? })
	}

	/// Number of distinct scopes.
	pub fn len(&self) -> usize {
		self.scopes.len()
	}

	/// Returns true if no scopes are defined.
	pub fn is_empty(&self) -> bool {
		self.scopes.is_empty()
	}

	/// Returns true if the normalized set contains the provided scope.
	pub fn contains(&self, scope: &str) -> bool {
		self.scopes.binary_search_by(|candidate| candidate.as_str().cmp(scope)).is_ok()
	}

	/// Iterator over normalized scopes.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.scopes.iter().map(|s| s.as_str())
	}

	/// Returns the normalized string representation (space-delimited).
	pub fn normalized(&self) -> String {
		self.scopes.join(" ")
	}

	/// Returns the underlying slice of scope strings.
	pub fn as_slice(&self) -> &[String] {
		&self.scopes
	}

	// Literals must already be sorted, deduplicated, and whitespace-free.
	pub(crate) fn from_literals(scopes: &[&str]) -> Self {
		Self { scopes: scopes.iter().map(|scope| (*scope).to_owned()).collect() }
	}
}
impl Debug for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ScopeSet").field(&self.scopes).finish()
	}
}
impl Display for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.normalized())
	}
}

/// Iterator over scope strings.
pub struct ScopeIter<'a> {
	inner: Iter<'a, String>,
}
impl<'a> Iterator for ScopeIter<'a> {
	type Item = &'a str;

	fn next(&mut self) -> Option<Self::Item> {
		self.inner.next().map(|s| s.as_str())
	}
}
impl TryFrom<Vec<String>> for ScopeSet {
	type Error = ScopeValidationError;

	fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl TryFrom<&[String]> for ScopeSet {
	type Error = ScopeValidationError;

	fn try_from(value: &[String]) -> Result<Self, Self::Error> {
		Self::new(value.to_vec())
	}
}
impl<'a> IntoIterator for &'a ScopeSet {
	type IntoIter = ScopeIter<'a>;
	type Item = &'a str;

	fn into_iter(self) -> Self::IntoIter {
		ScopeIter { inner: self.scopes.iter() }
	}
}
impl FromStr for ScopeSet {
	type Err = ScopeValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.is_empty() {
			return Ok(Self::default());
		}
		if s.chars().all(char::is_whitespace) {
			return Err(ScopeValidationError::Empty);
		}

		Self::new(s.split_whitespace())
	}
}
impl Serialize for ScopeSet {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let mut seq = serializer.serialize_seq(Some(self.scopes.len()))?;

		for scope in self.scopes.iter() {
			seq.serialize_element(scope)?;
		}

		seq.end()
	}
}
impl<'de> Deserialize<'de> for ScopeSet {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let values = <Vec<String>>::deserialize(deserializer)?;

		ScopeSet::new(values).map_err(DeError::custom)
	}
}

// Fitbit scope vocabulary, per the official developer documentation.
const REQUIRED_SCOPES: &[&str] =
	&["activity", "nutrition", "profile", "settings", "sleep", "social", "weight"];
const ALL_SCOPES: &[&str] = &[
	"activity",
	"heartrate",
	"location",
	"nutrition",
	"profile",
	"settings",
	"sleep",
	"social",
	"weight",
];

/// Read-only reference data: the minimal required and full permitted scope sets.
///
/// The default catalog describes the Fitbit Web API. `required ⊆ all` holds for every catalog
/// by construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScopeCatalog {
	required: ScopeSet,
	all: ScopeSet,
}
impl ScopeCatalog {
	/// Builds a custom catalog, enforcing that every required scope belongs to the vocabulary.
	pub fn new(required: ScopeSet, all: ScopeSet) -> Result<Self, ScopeCatalogError> {
		if let Some(scope) = required.iter().find(|scope| !all.contains(scope)) {
			return Err(ScopeCatalogError::RequiredOutsideVocabulary { scope: scope.to_owned() });
		}

		Ok(Self { required, all })
	}

	/// The minimal scope set every non-empty authorization request must include.
	pub fn required(&self) -> &ScopeSet {
		&self.required
	}

	/// The full scope vocabulary the provider accepts.
	pub fn all(&self) -> &ScopeSet {
		&self.all
	}

	/// Applies the scope policy to a non-empty requested set.
	///
	/// Checks run in a pinned order (too few, missing required, disallowed) and the first
	/// failure wins. Empty requests never reach this path; they substitute the required set
	/// instead.
	pub fn check_requested(&self, requested: &ScopeSet) -> Result<(), ScopeConfigurationError> {
		if requested.len() < self.required.len() {
			return Err(ScopeConfigurationError::TooFew {
				supplied: requested.len(),
				required: self.required.len(),
			});
		}

		let missing = self
			.required
			.iter()
			.filter(|scope| !requested.contains(scope))
			.map(ToOwned::to_owned)
			.collect::<Vec<_>>();

		if !missing.is_empty() {
			return Err(ScopeConfigurationError::MissingRequired { missing });
		}

		let disallowed = requested
			.iter()
			.filter(|scope| !self.all.contains(scope))
			.map(ToOwned::to_owned)
			.collect::<Vec<_>>();

		if !disallowed.is_empty() {
			return Err(ScopeConfigurationError::Disallowed { disallowed });
		}

		Ok(())
	}
}
impl Default for ScopeCatalog {
	fn default() -> Self {
		Self {
			required: ScopeSet::from_literals(REQUIRED_SCOPES),
			all: ScopeSet::from_literals(ALL_SCOPES),
		}
	}
}

fn normalize<I, S>(scopes: I) -> Result<Arc<[String]>, ScopeValidationError>
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	let mut set = BTreeSet::new();

	for scope in scopes {
		let owned: String = scope.into();

		if owned.is_empty() {
			return Err(ScopeValidationError::Empty);
		}
		if owned.chars().any(char::is_whitespace) {
			return Err(ScopeValidationError::ContainsWhitespace { scope: owned });
		}

		set.insert(owned);
	}

	Ok(Arc::from(set.into_iter().collect::<Vec<_>>()))
}
