//! Graduate year listing.

use std::collections::BTreeSet;
use std::str::FromStr;

use super::UnknownFilter;
use crate::models::Graduate;

/// Year selection on the graduates page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YearFilter {
    #[default]
    All,
    Year(i32),
}

impl FromStr for YearFilter {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "all" => Ok(YearFilter::All),
            other => other.parse().map(YearFilter::Year).map_err(|_| UnknownFilter {
                what: "year",
                value: s.to_string(),
            }),
        }
    }
}

/// Distinct graduation years, most recent first.
pub fn graduate_years(graduates: &[Graduate]) -> Vec<i32> {
    let years: BTreeSet<i32> = graduates.iter().map(|g| g.year).collect();
    years.into_iter().rev().collect()
}

pub fn filter_by_year(graduates: &[Graduate], filter: YearFilter) -> Vec<Graduate> {
    match filter {
        YearFilter::All => graduates.to_vec(),
        YearFilter::Year(year) => graduates
            .iter()
            .filter(|g| g.year == year)
            .cloned()
            .collect(),
    }
}
