//! Command-line interface definitions and argument parsing

use std::collections::BTreeSet;

use clap::{Parser, ValueEnum};

use crate::data::HEALTH_DATA_URL;
use crate::filter::CaseRange;

/// One of the three chart-and-filter presentations
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum View {
    TreeMap,
    LineChart,
    BubbleChart,
}

/// COVID-19 case distribution explorer for Lebanese towns
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Chart view to render
    #[arg(long, value_enum, default_value = "tree-map")]
    pub view: View,

    /// Dataset location: an http(s) URL or a local CSV path
    #[arg(short, long, default_value = HEALTH_DATA_URL)]
    pub source: String,

    /// Region shown by the tree map view (default: first region in the data)
    #[arg(short, long)]
    pub region: Option<String>,

    /// Comma-separated towns for the line/bubble views (default: all towns)
    #[arg(short, long)]
    pub towns: Option<String>,

    /// Lower bound of the case-count range (inclusive)
    #[arg(long, default_value = "0")]
    pub min_cases: u64,

    /// Upper bound of the case-count range (inclusive)
    #[arg(long, default_value = "100")]
    pub max_cases: u64,

    /// Output path for the rendered chart
    #[arg(short, long, default_value = "chart.png")]
    pub output: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Selected towns, or `None` when every town stays selected
    pub fn parse_towns(&self) -> Option<BTreeSet<String>> {
        self.towns.as_ref().map(|list| {
            list.split(',')
                .map(|town| town.trim().to_string())
                .filter(|town| !town.is_empty())
                .collect()
        })
    }

    /// Case range from the two bounds, rejecting an inverted range
    pub fn case_range(&self) -> crate::Result<CaseRange> {
        if self.min_cases > self.max_cases {
            anyhow::bail!(
                "--min-cases ({}) must not exceed --max-cases ({})",
                self.min_cases,
                self.max_cases
            );
        }
        Ok(CaseRange::new(self.min_cases as f64, self.max_cases as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::DEFAULT_CASE_RANGE;

    #[test]
    fn test_parse_towns() {
        let mut args = Args::parse_from(["covidlens"]);
        assert_eq!(args.parse_towns(), None);

        args.towns = Some("Achrafieh, Hamra ,,Zahle".to_string());
        let towns = args.parse_towns().unwrap();
        assert_eq!(towns.len(), 3);
        assert!(towns.contains("Hamra"));
    }

    #[test]
    fn test_defaults_match_reference_behavior() {
        let args = Args::parse_from(["covidlens"]);
        assert_eq!(args.view, View::TreeMap);
        assert_eq!(args.source, HEALTH_DATA_URL);
        assert_eq!(args.case_range().unwrap(), DEFAULT_CASE_RANGE);
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let args = Args::parse_from(["covidlens", "--min-cases", "200", "--max-cases", "100"]);
        assert!(args.case_range().is_err());
    }

    #[test]
    fn test_view_selection() {
        let args = Args::parse_from(["covidlens", "--view", "bubble-chart"]);
        assert_eq!(args.view, View::BubbleChart);
    }
}
