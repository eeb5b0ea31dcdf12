//! CovidLens: filterable chart views over the Lebanese COVID-19 health dataset
//!
//! This is the main entrypoint that orchestrates data loading, per-view
//! filtering, and chart rendering.

use std::collections::BTreeSet;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use covidlens::{viz, Args, CaseRange, Dataset, FilterSpec, HealthContext, View};

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    if args.verbose {
        println!("CovidLens - COVID-19 case distribution explorer");
        println!("===============================================\n");
    }

    let start_time = Instant::now();

    if args.verbose {
        println!("Loading dataset from: {}", args.source);
    }

    let load_start = Instant::now();
    let ctx = HealthContext::new(&args.source);
    let dataset = ctx.dataset()?;
    let load_time = load_start.elapsed();

    println!("✓ Dataset loaded: {} rows", dataset.len());
    if args.verbose {
        println!("  Loading time: {:.2}s", load_time.as_secs_f64());
        if let Some(max) = dataset.max_case_count() {
            println!("  Selectable case range: 0 to {}", max.floor());
        }
    }

    let range = args.case_range()?;

    let render_start = Instant::now();
    let shown = match args.view {
        View::TreeMap => run_tree_map(&args, &dataset, range)?,
        View::LineChart => run_line_chart(&args, &dataset, range)?,
        View::BubbleChart => run_bubble_chart(&args, &dataset, range)?,
    };
    let render_time = render_start.elapsed();

    println!("✓ View rendered: {} of {} rows shown", shown, dataset.len());
    if args.verbose {
        println!("  Filter + render time: {:.2}s", render_time.as_secs_f64());
    }
    println!("Total time: {:.2}s", start_time.elapsed().as_secs_f64());

    Ok(())
}

/// Tree map view: one region, rows narrowed by the case range
fn run_tree_map(args: &Args, dataset: &Dataset, range: CaseRange) -> Result<usize> {
    let regions = dataset.distinct_regions();
    let region = match &args.region {
        Some(region) => {
            if !regions.contains(&region.as_str()) {
                anyhow::bail!(
                    "unknown region {:?}; expected one of: {}",
                    region,
                    regions.join(", ")
                );
            }
            region.clone()
        }
        // the reference UI preselects the first region in the data
        None => regions
            .first()
            .context("dataset contains no regions")?
            .to_string(),
    };

    let subset = FilterSpec::tree_map(&region, range).apply(dataset);
    viz::render_tree_map(&subset, &region, &args.output)?;
    Ok(subset.len())
}

/// Line chart view: selected towns, rows narrowed by the case range
fn run_line_chart(args: &Args, dataset: &Dataset, range: CaseRange) -> Result<usize> {
    let towns = selected_towns(args, dataset)?;
    let subset = FilterSpec::line_chart(towns, range).apply(dataset);
    viz::render_line_chart(&subset, &args.output)?;
    Ok(subset.len())
}

/// Bubble chart view: same selection as the line chart, sized by the
/// chronic-disease score at render time
fn run_bubble_chart(args: &Args, dataset: &Dataset, range: CaseRange) -> Result<usize> {
    let towns = selected_towns(args, dataset)?;
    let subset = FilterSpec::bubble_chart(towns, range).apply(dataset);
    viz::render_bubble_chart(&subset, &args.output)?;
    Ok(subset.len())
}

/// Towns chosen on the command line, or every town when none were given
fn selected_towns(args: &Args, dataset: &Dataset) -> Result<BTreeSet<String>> {
    let known = dataset.distinct_towns();
    match args.parse_towns() {
        Some(towns) => {
            for town in &towns {
                if !known.contains(&town.as_str()) {
                    anyhow::bail!(
                        "unknown town {:?}; expected one of: {}",
                        town,
                        known.join(", ")
                    );
                }
            }
            Ok(towns)
        }
        None => Ok(known.iter().map(|t| t.to_string()).collect()),
    }
}
