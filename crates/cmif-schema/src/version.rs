use crate::SchemaError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Largest value any version component may take.
pub const MAX_COMPONENT: u16 = 999;

/// An `X.Y.Z` version, components called major, minor and build.
///
/// `minor` and `build` may be absent; an absent component compares, hashes
/// and tests equal to `0`, so `1` and `1.0.0` are the same version. The
/// original spelling is kept only for serialization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "VersionRepr", into = "VersionRepr")]
pub struct Version {
    major: u16,
    minor: Option<u16>,
    build: Option<u16>,
}

impl Version {
    /// A fully specified `major.minor.build` version.
    pub fn new(major: u16, minor: u16, build: u16) -> Result<Self, SchemaError> {
        Self::from_parts(major, Some(minor), Some(build))
    }

    pub fn from_parts(
        major: u16,
        minor: Option<u16>,
        build: Option<u16>,
    ) -> Result<Self, SchemaError> {
        check_component("major", major)?;
        if let Some(minor) = minor {
            check_component("minor", minor)?;
        }
        if let Some(build) = build {
            check_component("build", build)?;
        }
        Ok(Self {
            major,
            minor,
            build,
        })
    }

    pub fn major(&self) -> u16 {
        self.major
    }

    /// Minor component, `0` when absent.
    pub fn minor(&self) -> u16 {
        self.minor.unwrap_or(0)
    }

    /// Build component, `0` when absent.
    pub fn build(&self) -> u16 {
        self.build.unwrap_or(0)
    }

    /// The effective `(major, minor, build)` triple used for ordering.
    pub fn triple(&self) -> (u16, u16, u16) {
        (self.major, self.minor(), self.build())
    }

    /// The next version in the total order, `None` after `999.999.999`.
    pub fn successor(&self) -> Option<Self> {
        let (major, minor, build) = self.triple();
        let (major, minor, build) = if build < MAX_COMPONENT {
            (major, minor, build + 1)
        } else if minor < MAX_COMPONENT {
            (major, minor + 1, 0)
        } else if major < MAX_COMPONENT {
            (major + 1, 0, 0)
        } else {
            return None;
        };
        Some(Self {
            major,
            minor: Some(minor),
            build: Some(build),
        })
    }
}

fn check_component(field: &'static str, value: u16) -> Result<(), SchemaError> {
    if value > MAX_COMPONENT {
        return Err(SchemaError::Range {
            field,
            reason: format!("{value} exceeds {MAX_COMPONENT}"),
        });
    }
    Ok(())
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.triple() == other.triple()
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.triple().hash(state);
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.triple().cmp(&other.triple())
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.major)?;
        match (self.minor, self.build) {
            (None, None) => Ok(()),
            (Some(minor), None) => write!(f, ".{minor}"),
            (minor, Some(build)) => write!(f, ".{}.{build}", minor.unwrap_or(0)),
        }
    }
}

impl FromStr for Version {
    type Err = SchemaError;

    /// Parse `X`, `X.Y` or `X.Y.Z`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || SchemaError::Structural(format!("malformed version '{s}'"));
        let mut parts = s.trim().split('.');
        let mut next = |field: &'static str| -> Result<Option<u16>, SchemaError> {
            let Some(raw) = parts.next() else {
                return Ok(None);
            };
            if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            raw.parse::<u16>().map(Some).map_err(|_| SchemaError::Range {
                field,
                reason: format!("{raw} exceeds {MAX_COMPONENT}"),
            })
        };
        let major = next("major")?.ok_or_else(malformed)?;
        let minor = next("minor")?;
        let build = next("build")?;
        if next("build")?.is_some() {
            return Err(malformed());
        }
        Self::from_parts(major, minor, build)
    }
}

/// Wire representation; components arrive as arbitrary JSON numbers.
#[derive(Serialize, Deserialize)]
struct VersionRepr {
    major: serde_json::Number,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    minor: Option<serde_json::Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    build: Option<serde_json::Number>,
}

impl TryFrom<VersionRepr> for Version {
    type Error = SchemaError;

    fn try_from(repr: VersionRepr) -> Result<Self, Self::Error> {
        let major = number_component("major", &repr.major)?;
        let minor = repr
            .minor
            .as_ref()
            .map(|n| number_component("minor", n))
            .transpose()?;
        let build = repr
            .build
            .as_ref()
            .map(|n| number_component("build", n))
            .transpose()?;
        Self::from_parts(major, minor, build)
    }
}

impl From<Version> for VersionRepr {
    fn from(v: Version) -> Self {
        Self {
            major: v.major.into(),
            minor: v.minor.map(Into::into),
            build: v.build.map(Into::into),
        }
    }
}

/// Accept integers and integral floats (`2.0`) within `[0, MAX_COMPONENT]`.
fn number_component(field: &'static str, n: &serde_json::Number) -> Result<u16, SchemaError> {
    let out_of_range = || SchemaError::Range {
        field,
        reason: format!("{n} is not an integer in [0, {MAX_COMPONENT}]"),
    };
    let value = if let Some(u) = n.as_u64() {
        u
    } else {
        let f = n.as_f64().ok_or_else(out_of_range)?;
        if f.fract() != 0.0 || f < 0.0 || f > f64::from(MAX_COMPONENT) {
            return Err(out_of_range());
        }
        f as u64
    };
    if value > u64::from(MAX_COMPONENT) {
        return Err(out_of_range());
    }
    Ok(value as u16)
}

/// Interval over [`Version`]s with independently inclusive or exclusive bounds.
///
/// `start <= end` always holds. Versions are discrete, so a range can be
/// legal yet contain nothing, e.g. `[1, 1)` or `(1.0.0, 1.0.1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "VersionRangeRepr", into = "VersionRangeRepr")]
pub struct VersionRange {
    start: Version,
    end: Version,
    start_exclusive: bool,
    end_exclusive: bool,
}

impl VersionRange {
    /// Inclusive range `[start, end]`.
    pub fn new(start: Version, end: Version) -> Result<Self, SchemaError> {
        if start > end {
            return Err(SchemaError::Range {
                field: "version_range",
                reason: format!("start {start} is after end {end}"),
            });
        }
        Ok(Self {
            start,
            end,
            start_exclusive: false,
            end_exclusive: false,
        })
    }

    #[must_use]
    pub fn with_start_exclusive(mut self, exclusive: bool) -> Self {
        self.start_exclusive = exclusive;
        self
    }

    #[must_use]
    pub fn with_end_exclusive(mut self, exclusive: bool) -> Self {
        self.end_exclusive = exclusive;
        self
    }

    pub fn start(&self) -> Version {
        self.start
    }

    pub fn end(&self) -> Version {
        self.end
    }

    pub fn start_exclusive(&self) -> bool {
        self.start_exclusive
    }

    pub fn end_exclusive(&self) -> bool {
        self.end_exclusive
    }

    pub fn contains(&self, v: &Version) -> bool {
        let above_start = if self.start_exclusive {
            *v > self.start
        } else {
            *v >= self.start
        };
        let below_end = if self.end_exclusive {
            *v < self.end
        } else {
            *v <= self.end
        };
        above_start && below_end
    }

    /// True when no version lies in the range.
    pub fn is_empty(&self) -> bool {
        let lowest = if self.start_exclusive {
            match self.start.successor() {
                Some(next) => next,
                None => return true,
            }
        } else {
            self.start
        };
        !self.contains(&lowest)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = if self.start_exclusive { '(' } else { '[' };
        let close = if self.end_exclusive { ')' } else { ']' };
        write!(f, "{open}{}, {}{close}", self.start, self.end)
    }
}

#[derive(Serialize, Deserialize)]
struct VersionRangeRepr {
    version_start: Version,
    version_end: Version,
    #[serde(default, skip_serializing_if = "is_false")]
    start_exclusive: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    end_exclusive: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(b: &bool) -> bool {
    !*b
}

impl TryFrom<VersionRangeRepr> for VersionRange {
    type Error = SchemaError;

    fn try_from(repr: VersionRangeRepr) -> Result<Self, Self::Error> {
        Ok(Self::new(repr.version_start, repr.version_end)?
            .with_start_exclusive(repr.start_exclusive)
            .with_end_exclusive(repr.end_exclusive))
    }
}

impl From<VersionRange> for VersionRangeRepr {
    fn from(r: VersionRange) -> Self {
        Self {
            version_start: r.start,
            version_end: r.end,
            start_exclusive: r.start_exclusive,
            end_exclusive: r.end_exclusive,
        }
    }
}
