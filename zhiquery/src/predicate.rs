//! Composable boolean tests over a [`Record`].
//!
//! A [`Predicate`] is an immutable value: atomic variants test a single field
//! and the two chain variants own their children outright. Compiled once, a
//! predicate is shared read-only by every ingestion worker.
use std::fmt;
use std::str::FromStr;

use crate::errors::SyntaxError;
use crate::record::Record;

/// A boolean test over one record
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Exact zip code match
    ZipCode(u64),
    /// Case-insensitive state match; holds the lower-cased argument
    State(String),
    /// Case-insensitive county match; holds the lower-cased argument
    County(String),
    /// Case-insensitive city match; holds the lower-cased argument
    City(String),
    /// Latest value at or below the bound
    Price(f64),
    /// Growth rate at or above the bound
    GrowthRate(f64),
    /// True when every child is true
    All(Vec<Predicate>),
    /// True when any child is true
    Any(Vec<Predicate>),
}

impl Predicate {
    pub fn zip_code(zip_code: u64) -> Self {
        Self::ZipCode(zip_code)
    }

    pub fn state(state: &str) -> Self {
        Self::State(state.to_lowercase())
    }

    pub fn county(county: &str) -> Self {
        Self::County(county.to_lowercase())
    }

    pub fn city(city: &str) -> Self {
        Self::City(city.to_lowercase())
    }

    pub fn price(ceiling: f64) -> Self {
        Self::Price(ceiling)
    }

    pub fn growth_rate(floor: f64) -> Self {
        Self::GrowthRate(floor)
    }

    /// And-chain over `children`; an empty chain accepts everything
    pub fn all(children: Vec<Predicate>) -> Self {
        Self::All(children)
    }

    /// Or-chain over `children`; an empty chain rejects everything
    pub fn any(children: Vec<Predicate>) -> Self {
        Self::Any(children)
    }

    /// Chains `self and rhs`, extending `self` when it already is an and-chain
    pub fn and(self, rhs: Predicate) -> Self {
        match self {
            Self::All(mut children) => {
                children.push(rhs);
                Self::All(children)
            }
            lhs => Self::all(vec![lhs, rhs]),
        }
    }

    /// Chains `self or rhs`, extending `self` when it already is an or-chain
    pub fn or(self, rhs: Predicate) -> Self {
        match self {
            Self::Any(mut children) => {
                children.push(rhs);
                Self::Any(children)
            }
            lhs => Self::any(vec![lhs, rhs]),
        }
    }

    /// Evaluates the predicate; chains stop at the first deciding child
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::ZipCode(zip_code) => record.zip_code == *zip_code,
            Self::State(state) => record.state.to_lowercase() == *state,
            Self::County(county) => record.county.to_lowercase() == *county,
            Self::City(city) => record.city.to_lowercase() == *city,
            Self::Price(ceiling) => record.latest_value() <= *ceiling,
            Self::GrowthRate(floor) => record.growth_rate >= *floor,
            Self::All(children) => children.iter().all(|child| child.matches(record)),
            Self::Any(children) => children.iter().any(|child| child.matches(record)),
        }
    }
}

impl Default for Predicate {
    /// Accepts every record
    fn default() -> Self {
        Self::All(Vec::new())
    }
}

/// The atomic filter kinds accepted in a `Kind:argument` token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    State,
    County,
    City,
    GrowthRate,
    Price,
    ZipCode,
}

impl FilterKind {
    pub const ALL: [FilterKind; 6] = [
        FilterKind::State,
        FilterKind::County,
        FilterKind::City,
        FilterKind::GrowthRate,
        FilterKind::Price,
        FilterKind::ZipCode,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FilterKind::State => "State",
            FilterKind::County => "County",
            FilterKind::City => "City",
            FilterKind::GrowthRate => "GrowthRate",
            FilterKind::Price => "Price",
            FilterKind::ZipCode => "ZipCode",
        }
    }

    /// Short description of the argument, for help output
    pub fn argument_help(self) -> &'static str {
        match self {
            FilterKind::State => "exact match state (string)",
            FilterKind::County => "exact match county (string)",
            FilterKind::City => "exact match city (string)",
            FilterKind::GrowthRate => "lower bound growth rate (float)",
            FilterKind::Price => "upper bound price (float)",
            FilterKind::ZipCode => "exact match zip code (unsigned integer)",
        }
    }

    /// Builds the atomic predicate of this kind from its textual argument
    pub fn build(self, arg: &str) -> Result<Predicate, SyntaxError> {
        let parse_float = |arg: &str| {
            arg.parse::<f64>().map_err(|source| SyntaxError::InvalidFloat {
                kind: self.name().to_string(),
                arg: arg.to_string(),
                source,
            })
        };

        Ok(match self {
            FilterKind::State => Predicate::state(arg),
            FilterKind::County => Predicate::county(arg),
            FilterKind::City => Predicate::city(arg),
            FilterKind::GrowthRate => Predicate::growth_rate(parse_float(arg)?),
            FilterKind::Price => Predicate::price(parse_float(arg)?),
            FilterKind::ZipCode => {
                let zip_code = arg
                    .parse::<u64>()
                    .map_err(|source| SyntaxError::InvalidZipCode {
                        arg: arg.to_string(),
                        source,
                    })?;
                Predicate::zip_code(zip_code)
            }
        })
    }
}

impl FromStr for FilterKind {
    type Err = SyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| SyntaxError::UnknownKind(s.to_string()))
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
