use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

use outbound_tracker::{
    export, Classifier, Config, ConcentrationLevel, DataQualityEngine, Dataset, FilterSelection,
    FilteredView, ProcessCache, TableLoader,
};

/// Classify outbound investment records by industry and summarize them
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Input CSV (investment tracker export)
    #[arg(short, long)]
    input: PathBuf,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON taxonomy replacing the built-in keyword tables
    #[arg(long)]
    rules: Option<PathBuf>,

    #[command(flatten)]
    filter: FilterArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Industry to include (repeatable); default is the dashboard selection
    #[arg(long = "industry", global = true)]
    industries: Vec<String>,

    /// Include every industry instead of the dashboard selection
    #[arg(long, global = true)]
    all_industries: bool,

    #[arg(long, global = true)]
    from_year: Option<i32>,

    #[arg(long, global = true)]
    to_year: Option<i32>,

    /// Destination country to include (repeatable)
    #[arg(long = "country", global = true)]
    countries: Vec<String>,

    /// Minimum amount in millions USD
    #[arg(long, global = true)]
    min_amount: Option<f64>,

    /// Maximum amount in millions USD
    #[arg(long, global = true)]
    max_amount: Option<f64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Project count, total, mean and country count
    Summary,
    /// Yearly totals per industry
    Trends,
    /// Top destinations for one industry
    Leaderboard {
        industry: String,
        #[arg(short, long)]
        size: Option<usize>,
    },
    /// HHI and top-N share per industry
    Concentration,
    /// Per-industry summary with risk reading
    Insights,
    /// Other sectors by frequency
    Sectors,
    /// Write the filtered rows as CSV
    Export {
        /// Output file, or directory with --by-industry
        output: PathBuf,
        /// One file per industry
        #[arg(long)]
        by_industry: bool,
    },
    /// Load-time data quality report
    Quality,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => Config::default(),
    };

    let rules_path = cli.rules.clone().or_else(|| config.rules_path.clone());
    let classifier = match &rules_path {
        Some(path) => Classifier::from_file(path)
            .with_context(|| format!("Failed to load rules: {}", path.display()))?,
        None => Classifier::builtin(),
    };
    info!("Taxonomy: {}", classifier.target_industries().join(", "));

    let table = TableLoader::new()
        .with_program_column(&config.program_column)
        .load(&cli.input)
        .with_context(|| format!("Failed to load table: {}", cli.input.display()))?;

    if let Command::Quality = cli.command {
        print_quality(&DataQualityEngine::new(), &table);
        return Ok(());
    }

    let mut cache = ProcessCache::new();
    let dataset = cache.get_or_process(&Arc::new(table), &Arc::new(classifier));
    let filter = build_filter(&cli.filter, &dataset, &config);
    let view = FilteredView::new(&dataset, &filter);

    match &cli.command {
        Command::Summary => print_summary(&view),
        Command::Trends => print_trends(&view),
        Command::Leaderboard { industry, size } => {
            print_leaderboard(&view, industry, size.unwrap_or(config.leaderboard_size))
        }
        Command::Concentration => print_concentration(&view, config.top_share_n),
        Command::Insights => print_insights(&view, config.insight_destinations),
        Command::Sectors => print_sectors(&dataset),
        Command::Export { output, by_industry } => {
            if *by_industry {
                let files = export::export_by_industry(&view, output)
                    .with_context(|| format!("Failed to export to {}", output.display()))?;
                println!("✓ Wrote {} industry files to {}", files.len(), output.display());
            } else {
                let count = export::export_view(&view, output)
                    .with_context(|| format!("Failed to export to {}", output.display()))?;
                println!("✓ Wrote {} rows to {}", count, output.display());
            }
        }
        Command::Quality => {}
    }

    Ok(())
}

fn build_filter(args: &FilterArgs, dataset: &Dataset, config: &Config) -> FilterSelection {
    let mut filter = if !args.industries.is_empty() {
        FilterSelection::all().with_industries(args.industries.iter().cloned())
    } else if args.all_industries {
        FilterSelection::all()
    } else {
        FilterSelection::dashboard_default(dataset, config.default_other_sectors)
    };

    if args.from_year.is_some() || args.to_year.is_some() {
        let (lo, hi) = dataset.table().year_span().unwrap_or((i32::MIN, i32::MAX));
        filter = filter.with_years(args.from_year.unwrap_or(lo), args.to_year.unwrap_or(hi));
    }
    if !args.countries.is_empty() {
        filter = filter.with_countries(args.countries.iter().cloned());
    }
    if args.min_amount.is_some() || args.max_amount.is_some() {
        filter = filter.with_amount_range(
            args.min_amount.unwrap_or(0.0),
            args.max_amount.unwrap_or(f64::INFINITY),
        );
    }
    filter
}

fn header(table: &mut Table, columns: &[&str]) {
    table.load_preset(UTF8_FULL);
    table.set_header(
        columns
            .iter()
            .map(|c| Cell::new(c).fg(Color::Cyan))
            .collect::<Vec<_>>(),
    );
}

fn print_summary(view: &FilteredView<'_>) {
    let summary = view.overview();
    println!("📊 Overview");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Total projects:     {}", summary.project_count);
    println!("Total investment:   ${:.1}B", summary.total_amount / 1000.0);
    match summary.mean_amount {
        Some(mean) => println!("Average investment: ${:.1}M", mean),
        None => println!("Average investment: n/a"),
    }
    println!("Countries:          {}", summary.country_count);
}

fn print_trends(view: &FilteredView<'_>) {
    for trend in view.trends() {
        let mut table = Table::new();
        header(&mut table, &["Year", "Investment (M USD)", "Projects"]);
        for point in &trend.points {
            table.add_row(vec![
                Cell::new(point.key),
                Cell::new(format!("{:.1}", point.total_amount)),
                Cell::new(point.count),
            ]);
        }
        println!("📈 {}\n{}\n", trend.industry, table);
    }
}

fn print_leaderboard(view: &FilteredView<'_>, industry: &str, size: usize) {
    let mut table = Table::new();
    header(&mut table, &["Country", "Investment (M USD)", "Projects"]);
    for entry in view.leaderboard(industry, size) {
        table.add_row(vec![
            Cell::new(&entry.key),
            Cell::new(format!("{:.0}", entry.total_amount)),
            Cell::new(entry.count),
        ]);
    }
    println!("🌍 {} - Top {}\n{}", industry, size, table);
}

fn print_concentration(view: &FilteredView<'_>, top_n: usize) {
    let top_label = format!("Top {} Share %", top_n);
    let mut table = Table::new();
    header(
        &mut table,
        &["Industry", "HHI", top_label.as_str(), "Countries", "Top Destination", "Level"],
    );
    for row in view.concentration(top_n) {
        table.add_row(vec![
            Cell::new(&row.industry),
            Cell::new(format!("{:.1}", row.hhi)),
            Cell::new(format!("{:.1}", row.top_share)),
            Cell::new(row.country_count),
            Cell::new(&row.top_destination),
            level_cell(row.level),
        ]);
    }
    println!("🎯 Investment Concentration\n{}", table);
}

fn level_cell(level: ConcentrationLevel) -> Cell {
    let color = match level {
        ConcentrationLevel::Low => Color::Green,
        ConcentrationLevel::Moderate => Color::Yellow,
        ConcentrationLevel::High => Color::Red,
    };
    Cell::new(level.name()).fg(color)
}

fn print_insights(view: &FilteredView<'_>, destinations: usize) {
    println!("💡 Key Insights");
    for insight in view.insights(destinations) {
        println!("\n#### {}", insight.industry);
        println!(
            "- Total investment: ${:.0}M (${:.1}B)",
            insight.total_amount,
            insight.total_amount / 1000.0
        );
        println!("- Projects: {}", insight.project_count);
        if let Some(mean) = insight.mean_amount {
            println!("- Average investment: ${:.0}M", mean);
        }
        if let Some(top) = insight.top_destination() {
            println!("- Top destination: {} (${:.0}M)", top.country, top.amount);
        }
        println!("- Risk: {} (HHI {:.0})", insight.level.risk_note(), insight.hhi);
        for (rank, destination) in insight.destinations.iter().enumerate() {
            println!("  {}. {} ({:.1}%)", rank + 1, destination.country, destination.share);
        }
    }
}

fn print_sectors(dataset: &Dataset) {
    let mut table = Table::new();
    header(&mut table, &["Sector", "Projects"]);
    for (sector, count) in dataset.other_sectors_by_frequency() {
        table.add_row(vec![Cell::new(sector), Cell::new(count)]);
    }
    println!("🎯 Target industries: {}", dataset.target_industries().join(", "));
    println!("📊 Other sectors\n{}", table);
}

fn print_quality(engine: &DataQualityEngine, table: &outbound_tracker::InvestmentTable) {
    let report = engine.assess(table);
    println!("✅ {}", report.summary());
    for issue in &report.issues {
        println!("  [{:?}] {}: {}", issue.severity, issue.field, issue.issue);
        println!("      → {}", issue.recommendation);
    }
}
