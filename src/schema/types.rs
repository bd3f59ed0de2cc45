// src/schema/types.rs

/// How the raw strings of a column become typed values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnKind {
    /// `"June, 1962"` style month dates, parsed with the given chrono format.
    MonthDate { format: &'static str },
    /// `"$1,234.50"` amounts, multiplied by `scale` after parsing.
    Currency { scale: f64 },
    /// Integers carrying a unit suffix such as `" mins"`.
    SuffixedInt { suffix: &'static str },
    Float,
    Int,
    Text,
}

/// One renamed column of the film table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSpec {
    /// Header as it appears in the input file.
    pub source: &'static str,
    /// Header in the cleaned output.
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    const fn new(source: &'static str, name: &'static str, kind: ColumnKind) -> Self {
        Self { source, name, kind }
    }
}

pub const RELEASE_DATE: &str = "release_date";
pub const RELEASE_YEAR: &str = "release_year";
pub const MOVIE_TITLE: &str = "movie_title";
pub const BOND_ACTOR: &str = "bond_actor";
pub const FILM_LENGTH: &str = "film_length";
pub const IMDB_AVG: &str = "imdb_avg";
pub const ROTTEN_TOMATOES_AVG: &str = "rotten_tomatoes_avg";
pub const MARTINIS_CONSUMED: &str = "martinis_consumed";
pub const BOND_KILLS: &str = "bond_kills";
pub const CAR_MANUFACTURER: &str = "Bond_Car_MFG";

/// Source header → cleaned header and conversion, in no particular order.
/// Headers missing from this list keep their name and get an inferred type.
pub static FILM_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::new(
        "Release",
        RELEASE_DATE,
        ColumnKind::MonthDate { format: "%B, %Y" },
    ),
    ColumnSpec::new("Movie", MOVIE_TITLE, ColumnKind::Text),
    ColumnSpec::new("Bond", BOND_ACTOR, ColumnKind::Text),
    ColumnSpec::new("US_Gross", "income_usa", ColumnKind::Currency { scale: 1.0 }),
    ColumnSpec::new(
        "World_Gross",
        "income_world",
        ColumnKind::Currency { scale: 1.0 },
    ),
    // the source file states budgets in thousands of dollars
    ColumnSpec::new(
        "Budget ($ 000s)",
        "budget_usd",
        ColumnKind::Currency { scale: 1000.0 },
    ),
    ColumnSpec::new(
        "Film_Length",
        FILM_LENGTH,
        ColumnKind::SuffixedInt { suffix: " mins" },
    ),
    ColumnSpec::new("Avg_User_IMDB", IMDB_AVG, ColumnKind::Float),
    ColumnSpec::new("Avg_User_Rtn_Tom", ROTTEN_TOMATOES_AVG, ColumnKind::Float),
    ColumnSpec::new("Martinis", MARTINIS_CONSUMED, ColumnKind::Int),
    ColumnSpec::new("Kills_Bond", BOND_KILLS, ColumnKind::Int),
];

/// Look up a column by its cleaned name.
pub fn spec_for(name: &str) -> Option<&'static ColumnSpec> {
    FILM_COLUMNS.iter().find(|c| c.name == name)
}

/// Look up a column by its input header.
pub fn spec_for_source(source: &str) -> Option<&'static ColumnSpec> {
    FILM_COLUMNS.iter().find(|c| c.source == source)
}
