//! Version parsing and ordering for update decisions.
//!
//! Versions are dotted tuples of non-negative integers of arbitrary arity
//! ("2.1", "2.1.0", "2.1.0.4" are all valid). Comparison is component-wise
//! left to right with missing trailing components treated as 0, so
//! "1.2" and "1.2.0" compare equal.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, UpdateError};

/// A dotted numeric version of arbitrary arity.
#[derive(Debug, Clone, Default)]
pub struct Version {
    components: Vec<u64>,
}

impl Version {
    /// Create a version from its numeric components.
    #[must_use]
    pub fn new(components: Vec<u64>) -> Self {
        Self { components }
    }

    /// The numeric components in order of significance.
    #[must_use]
    pub fn components(&self) -> &[u64] {
        &self.components
    }

    /// Whether this version is strictly greater than `other`.
    ///
    /// This is the update decision rule: equal or lower versions never
    /// qualify, so downgrades are never offered.
    #[must_use]
    pub fn is_newer_than(&self, other: &Self) -> bool {
        self > other
    }

    /// Component at `index`, with missing trailing components read as 0.
    fn component(&self, index: usize) -> u64 {
        self.components.get(index).copied().unwrap_or(0)
    }
}

impl FromStr for Version {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let s = s.strip_prefix('v').unwrap_or(s);

        if s.is_empty() {
            return Err(UpdateError::InvalidVersion(s.to_string()));
        }

        let components = s
            .split('.')
            .map(|part| {
                part.parse::<u64>()
                    .map_err(|_| UpdateError::InvalidVersion(s.to_string()))
            })
            .collect::<Result<Vec<u64>>>()?;

        Ok(Self { components })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for component in &self.components {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{component}")?;
            first = false;
        }
        Ok(())
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        for i in 0..len {
            match self.component(i).cmp(&other.component(i)) {
                Ordering::Equal => {}
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::from_str(s).unwrap()
    }

    #[test]
    fn parse_three_components() {
        assert_eq!(v("1.2.3").components(), &[1, 2, 3]);
    }

    #[test]
    fn parse_arbitrary_arity() {
        assert_eq!(v("7").components(), &[7]);
        assert_eq!(v("1.2.3.4.5").components(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn parse_v_prefix() {
        assert_eq!(v("v2.1.0"), v("2.1.0"));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Version::from_str("").is_err());
        assert!(Version::from_str("abc").is_err());
        assert!(Version::from_str("1..2").is_err());
        assert!(Version::from_str("1.2-beta").is_err());
        assert!(Version::from_str("-1.0").is_err());
    }

    #[test]
    fn missing_trailing_components_are_zero() {
        assert_eq!(v("1.2"), v("1.2.0"));
        assert_eq!(v("1.2"), v("1.2.0.0"));
        assert!(!v("1.0").is_newer_than(&v("1.0.0")));
        assert!(!v("1.0.0").is_newer_than(&v("1.0")));
    }

    #[test]
    fn ordering() {
        assert!(v("2.0.0") > v("1.9.9"));
        assert!(v("1.10.0") > v("1.9.9"));
        assert!(v("2.1.0").is_newer_than(&v("2.0.5")));
        assert!(!v("2.0.5").is_newer_than(&v("2.0.5")));
        assert!(!v("1.9.9").is_newer_than(&v("2.0.0")));
    }

    #[test]
    fn ordering_is_antisymmetric() {
        let cases = ["1.0", "1.0.0", "1.0.1", "2", "0.9.9.9"];
        for a in &cases {
            for b in &cases {
                let (a, b) = (v(a), v(b));
                assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
            }
        }
    }

    #[test]
    fn display_round_trip() {
        assert_eq!(v("2.1.0").to_string(), "2.1.0");
        assert_eq!(v("v1.2").to_string(), "1.2");
    }
}
