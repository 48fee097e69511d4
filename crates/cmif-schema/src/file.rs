use crate::types::{Digest, Name, Uri};
use serde::{Deserialize, Serialize};

/// Basic properties of a provided file. The flags are independent; a file
/// may be both a header and a source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileTrait {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_executable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_library: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_header: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_source: Option<bool>,
    /// Implementation language; required whenever traits are given.
    pub language: String,
}

impl FileTrait {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            ..Self::default()
        }
    }

    pub fn is_executable(&self) -> bool {
        self.is_executable.unwrap_or(false)
    }

    pub fn is_library(&self) -> bool {
        self.is_library.unwrap_or(false)
    }

    pub fn is_header(&self) -> bool {
        self.is_header.unwrap_or(false)
    }

    pub fn is_source(&self) -> bool {
        self.is_source.unwrap_or(false)
    }
}

/// One file made available by the artifact. Each record describes exactly one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileProvides {
    /// Basename of the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Location of the file relative to the artifact's root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<Uri>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<Digest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<Name>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub traits: Vec<FileTrait>,
}

/// A source archive and its content digest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Archive {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<Uri>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<Digest>,
}

impl Archive {
    pub fn new(uri: impl Into<Uri>, hash: impl Into<Digest>) -> Self {
        Self {
            uri: Some(uri.into()),
            hash: Some(hash.into()),
        }
    }
}
