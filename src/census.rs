//! Column vocabulary of the UCI Adult census files (`adult.data` / `adult.test`).

use std::fmt;
use std::str::FromStr;

use crate::error::BayesError;

/// Marker the census files use for a missing value.
pub const UNKNOWN: &str = "?";

/// The lower income bracket, treated as the positive class.
pub const POSITIVE_LABEL: &str = "<=50K";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Age,
    Workclass,
    Fnlwgt,
    Education,
    EducationNum,
    MaritalStatus,
    Occupation,
    Relationship,
    Race,
    Sex,
    CapitalGain,
    CapitalLoss,
    HoursPerWeek,
    NativeCountry,
    Income,
}

impl Column {
    pub const ALL: [Column; 15] = [
        Column::Age,
        Column::Workclass,
        Column::Fnlwgt,
        Column::Education,
        Column::EducationNum,
        Column::MaritalStatus,
        Column::Occupation,
        Column::Relationship,
        Column::Race,
        Column::Sex,
        Column::CapitalGain,
        Column::CapitalLoss,
        Column::HoursPerWeek,
        Column::NativeCountry,
        Column::Income,
    ];

    /// Position of the column in a raw census row.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Column::Age => "age",
            Column::Workclass => "workclass",
            Column::Fnlwgt => "fnlwgt",
            Column::Education => "education",
            Column::EducationNum => "education-num",
            Column::MaritalStatus => "marital-status",
            Column::Occupation => "occupation",
            Column::Relationship => "relationship",
            Column::Race => "race",
            Column::Sex => "sex",
            Column::CapitalGain => "capital-gain",
            Column::CapitalLoss => "capital-loss",
            Column::HoursPerWeek => "hours-per-week",
            Column::NativeCountry => "native-country",
            Column::Income => "income",
        }
    }

    pub fn label() -> Column {
        Column::Income
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts the dataset's hyphenated names (case-insensitive, `_` allowed for
/// `-`) or a bare numeric column index.
impl FromStr for Column {
    type Err = BayesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");

        if let Ok(index) = wanted.parse::<usize>() {
            return Column::ALL.get(index).copied().ok_or_else(|| {
                BayesError::InvalidParameter(format!("no census column with index {index}"))
            });
        }

        Column::ALL
            .iter()
            .copied()
            .find(|column| column.name() == wanted)
            .ok_or_else(|| BayesError::InvalidParameter(format!("unknown census column {s:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("age", Column::Age)]
    #[case("education-num", Column::EducationNum)]
    #[case("Hours_Per_Week", Column::HoursPerWeek)]
    #[case("13", Column::NativeCountry)]
    #[case("income", Column::Income)]
    fn parses_names_and_indices(#[case] input: &str, #[case] expected: Column) {
        assert_eq!(input.parse::<Column>().unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_columns() {
        assert!("salary".parse::<Column>().is_err());
        assert!("15".parse::<Column>().is_err());
    }

    #[test]
    fn label_is_the_last_column() {
        assert_eq!(Column::label().index(), Column::ALL.len() - 1);
        for (i, column) in Column::ALL.iter().enumerate() {
            assert_eq!(column.index(), i);
        }
    }
}
