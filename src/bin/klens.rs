/// klens - inspect koru-lens pipelines from the command line
///
/// Loads records from a JSON file, runs one pipeline, and prints the result.
///
/// Usage:
///   klens group <file> --by <path>... [--agg field=kind]... [--sort field] [--desc]
///   klens search <file> [--query text] [--min-price n] [--check-in date] [--sort price:asc]
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use koru_lens::{
    AggregationKind, Filter, FilterCriteria, GroupEngine, GroupSpec, LensConfig, Listing,
    ListingSearch, PriceRange, SearchRequest, SortBy, SortOrder, SortSpec,
};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// klens - group, aggregate and search JSON records
#[derive(Parser)]
#[command(name = "klens")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log pipeline decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Group records and compute aggregates
    ///
    /// Examples:
    ///   klens group bookings.json --by category --agg price=sum
    ///   klens group bookings.json --by category --by location.city --agg nights=avg
    ///   klens group bookings.json --by category --agg price=max --sort price --desc
    ///   klens group bookings.json --by category --where 'price >= 100'
    Group {
        /// JSON file holding an array of records
        file: PathBuf,

        /// Field path to group by (repeat for a composite key)
        #[arg(short, long = "by", required = true)]
        by: Vec<String>,

        /// Aggregation as field=kind, kind one of sum, avg, min, max, count
        #[arg(short, long = "agg")]
        agg: Vec<String>,

        /// Sort groups by this aggregated field
        #[arg(short, long)]
        sort: Option<String>,

        /// Sort descending (default: ascending)
        #[arg(long)]
        desc: bool,

        /// Pre-filter expression (e.g. 'price >= 100'); repeat to AND
        #[arg(short, long = "where")]
        filter: Vec<String>,

        /// Print raw JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Filter, sort and paginate listings
    ///
    /// Examples:
    ///   klens search listings.json --query lisbon
    ///   klens search listings.json --min-price 100 --max-price 150 --amenity Pool
    ///   klens search listings.json --check-in 2025-07 --check-out 2025-08
    ///   klens search listings.json --sort price:desc --then rating:desc --page 2
    Search {
        /// JSON file holding an array of listings
        file: PathBuf,

        /// Case-insensitive text to find in name or city
        #[arg(short, long)]
        query: Option<String>,

        /// Lowest price (inclusive)
        #[arg(long)]
        min_price: Option<f64>,

        /// Highest price (inclusive)
        #[arg(long)]
        max_price: Option<f64>,

        /// Required amenity (repeat to require several)
        #[arg(short, long)]
        amenity: Vec<String>,

        /// Lowest rating (inclusive)
        #[arg(long)]
        min_rating: Option<f64>,

        /// Check-in date: YYYY, YYYY-MM or YYYY-MM-DD
        #[arg(long)]
        check_in: Option<String>,

        /// Check-out date: YYYY, YYYY-MM or YYYY-MM-DD
        #[arg(long)]
        check_out: Option<String>,

        /// Primary sort as field[:asc|desc]
        #[arg(short, long, default_value = "id")]
        sort: String,

        /// Tie-breaking sort as field[:asc|desc]
        #[arg(long)]
        then: Option<String>,

        /// Page number (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Listings per page (default from config)
        #[arg(long)]
        page_size: Option<usize>,

        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => LensConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => LensConfig::default(),
    };

    match cli.command {
        Commands::Group {
            file,
            by,
            agg,
            sort,
            desc,
            filter,
            json,
        } => {
            let records = load_json(&file)?;

            let mut spec = GroupSpec::by_all(by)?.missing_aggregate(config.missing_aggregate);
            for entry in &agg {
                let (field, kind) = entry
                    .split_once('=')
                    .with_context(|| format!("Invalid aggregation '{}': expected field=kind", entry))?;
                spec = spec.aggregate(field.trim(), AggregationKind::parse(field.trim(), kind)?);
            }
            if let Some(field) = sort {
                let order = if desc { SortOrder::Desc } else { SortOrder::Asc };
                spec = spec.sort_by(field, order);
            }
            if !filter.is_empty() {
                let filters = filter
                    .iter()
                    .map(|expr| expr.parse::<Filter>())
                    .collect::<Result<Vec<_>, _>>()?;
                spec = spec.pre_filter(Filter::and(filters));
            }

            let groups = GroupEngine::execute_json(&spec, &records)
                .context("Failed to group records")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&groups)?);
                return Ok(());
            }

            println!(
                "{} ({} {})",
                "Groups:".bold(),
                groups.len(),
                if groups.len() == 1 { "group" } else { "groups" }
            );
            for group in &groups {
                let identity = group
                    .identity
                    .iter()
                    .map(|(name, value)| format!("{}={}", name, value))
                    .collect::<Vec<_>>()
                    .join(", ");
                println!();
                println!("  {} {}", identity.cyan(), format!("({} items)", group.count).bright_black());
                for (field, value) in &group.aggregates {
                    let shown = match value {
                        Some(v) => v.to_string().green(),
                        None => "null".bright_black(),
                    };
                    println!("    {}: {}", field, shown);
                }
            }
            Ok(())
        }

        Commands::Search {
            file,
            query,
            min_price,
            max_price,
            amenity,
            min_rating,
            check_in,
            check_out,
            sort,
            then,
            page,
            page_size,
            json,
        } => {
            let records = load_json(&file)?;
            let listings = Listing::from_json_array(&records)
                .with_context(|| format!("Invalid listings in {}", file.display()))?;

            let mut criteria = FilterCriteria::new().require_amenities(amenity);
            criteria.search = query;
            criteria.min_rating = min_rating;
            criteria.check_in = check_in;
            criteria.check_out = check_out;
            if min_price.is_some() || max_price.is_some() {
                criteria = criteria.price(PriceRange {
                    min: min_price,
                    max: max_price,
                });
            }

            let mut sort_spec = SortSpec::from(sort.parse::<SortBy>()?);
            if let Some(then) = then {
                sort_spec.secondary = Some(then.parse()?);
            }

            let request = SearchRequest {
                criteria,
                sort: sort_spec,
                page_size,
                page_number: Some(page),
            };
            let result = ListingSearch::new(config)
                .run(&listings, &request)
                .context("Failed to search listings")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }

            println!(
                "{} {} matching, page {} of {}",
                "Listings:".bold(),
                result.total_count.to_string().cyan(),
                result.page_number,
                result.total_pages
            );
            for listing in &result.items {
                println!(
                    "  {:>4}  {:<28} {:<14} {:>8.2}  {}",
                    listing.id.to_string().bright_black(),
                    listing.name,
                    listing.city,
                    listing.price,
                    format!("★ {:.1}", listing.rating).yellow()
                );
            }
            if result.items.is_empty() {
                println!("  {}", "(no listings on this page)".bright_black());
            }
            Ok(())
        }
    }
}

/// Install a stderr subscriber honouring RUST_LOG; `--verbose` defaults to debug.
fn init_tracing(verbose: bool) {
    let default = if verbose { "koru_lens=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Read and parse a JSON file.
fn load_json(path: &Path) -> Result<JsonValue> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}
