//! String newtypes for names, digests, and URIs.
//!
//! All newtypes serialize/deserialize as plain strings and never reject input
//! on decode; their pattern checks are consulted by [`crate::validate`] so a
//! single pass can report every malformed field.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::sync::LazyLock;
use url::Url;

/// Well-qualified name pattern shared by artifact, dependency, and architecture names.
pub const NAME_PATTERN: &str = r"^[A-Za-z0-9_\-.]*$";

/// Content digest pattern: 32 hex digits, i.e. a 128-bit digest.
pub const DIGEST_PATTERN: &str = "^[A-Fa-f0-9]{32}$";

/// Number of hex characters in a well-formed [`Digest`].
pub const DIGEST_HEX_LEN: usize = 32;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(NAME_PATTERN).expect("valid name pattern"));
static DIGEST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DIGEST_PATTERN).expect("valid digest pattern"));

macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new instance from a string.
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Return the inner string as a slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume self and return the inner `String`.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }
    };
}

string_newtype!(
    /// Artifact, dependency, or architecture name restricted to [`NAME_PATTERN`].
    Name
);

string_newtype!(
    /// Hex content digest of a file or archive, restricted to [`DIGEST_PATTERN`].
    ///
    /// The wire format documents this as a sha256 digest but only admits 32 hex
    /// characters, which is a 128-bit (MD5-length) value. The pattern is the
    /// contract: 64-character SHA-256 hex strings are malformed here.
    Digest
);

string_newtype!(
    /// URI string; absolute for origins, sources and archives, a reference for provided files.
    Uri
);

impl Name {
    pub fn is_well_qualified(&self) -> bool {
        NAME_RE.is_match(&self.0)
    }
}

impl Digest {
    pub fn is_well_formed(&self) -> bool {
        DIGEST_RE.is_match(&self.0)
    }

    /// Case-insensitive comparison; both spellings of a hex digit denote the same digest.
    pub fn matches(&self, other: &Digest) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Uri {
    /// True when the string parses as an absolute URI with a scheme.
    pub fn is_absolute(&self) -> bool {
        Url::parse(&self.0).is_ok()
    }

    /// True when the string is an absolute URI or a relative reference.
    ///
    /// Relative references are resolved against `file:///`, matching how
    /// provided files are located relative to the artifact's root.
    pub fn is_reference(&self) -> bool {
        if self.is_absolute() {
            return true;
        }
        Url::parse("file:///")
            .and_then(|base| base.join(&self.0))
            .is_ok()
    }
}
