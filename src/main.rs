//! rustxplore - IEEE Xplore BibTeX harvester
//!
//! Combines term groups into boolean queries, runs every query against the
//! IEEE Xplore search API and appends the results as BibTeX.
//!
//! ## Usage
//!
//! ```bash
//! rustxplore queries --group "5G|LTE" --group "security|privacy"
//! rustxplore search --group "5G|LTE" --group "security|privacy" --fields abstract,doc-title
//! rustxplore pdf-query paper.pdf --start-page 2
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rustxplore::{
    credentials::{KeyFile, DEFAULT_KEY_FILE},
    paginate, pdf,
    query::{self, FieldMask},
    xplore::{SearchParams, XploreClient, IEEE_SEARCH_URL},
};
use std::path::{Path, PathBuf};
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// IEEE Xplore query builder and BibTeX harvester
#[derive(Parser)]
#[command(name = "rustxplore")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every query combined from the term groups
    Queries {
        #[command(flatten)]
        terms: TermArgs,
    },

    /// Run every combined query and append the results as BibTeX
    Search {
        #[command(flatten)]
        terms: TermArgs,

        /// Fields to scope each query to (abstract, doc-title, pub-title,
        /// authors, affiliations, keywords) or "none"
        #[arg(long, default_value = "abstract,doc-title")]
        fields: FieldMask,

        /// Operator joining the field clauses
        #[arg(long, default_value = query::OR)]
        operator: String,

        /// Records per page
        #[arg(long, default_value_t = 25, value_parser = clap::value_parser!(u32).range(1..=200))]
        max_records: u32,

        /// Only records published in or after this year
        #[arg(long)]
        start_year: Option<i32>,

        /// Output directory
        #[arg(short, long, default_value = "query_results")]
        results_dir: PathBuf,

        /// File holding the API key
        #[arg(long, default_value = DEFAULT_KEY_FILE)]
        key_file: PathBuf,

        /// Search endpoint
        #[arg(long, default_value = IEEE_SEARCH_URL)]
        endpoint: String,

        /// Also append every raw response body to a .json file next to the .bib
        #[arg(long)]
        save_json: bool,
    },

    /// Print the text of a PDF
    PdfText {
        #[command(flatten)]
        pdf: PdfArgs,
    },

    /// Print a lookup query built from the start of a PDF
    PdfQuery {
        #[command(flatten)]
        pdf: PdfArgs,
    },
}

#[derive(Args)]
struct TermArgs {
    /// A group of alternative terms separated by '|'; repeat for each group
    #[arg(short, long = "group")]
    groups: Vec<String>,

    /// JSON file with a list of term groups, e.g. [["5G","LTE"],["security"]]
    #[arg(long)]
    terms_file: Option<PathBuf>,

    /// Operator joining terms from different groups
    #[arg(long, default_value = query::AND)]
    combine_operator: String,
}

impl TermArgs {
    /// Term groups from the terms file followed by the --group flags
    fn load(&self) -> Result<Vec<Vec<String>>> {
        let mut groups: Vec<Vec<String>> = match &self.terms_file {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read terms file {}", path.display()))?;
                serde_json::from_str(&content)
                    .with_context(|| format!("Invalid terms file {}", path.display()))?
            }
            None => Vec::new(),
        };

        groups.extend(self.groups.iter().map(|g| {
            g.split('|')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect()
        }));
        Ok(groups)
    }

    fn queries(&self) -> Result<Vec<String>> {
        let groups = self.load()?;
        query::combine(&groups, &self.combine_operator).context("Cannot build queries")
    }
}

#[derive(Args)]
struct PdfArgs {
    /// Path to the PDF
    pdf: PathBuf,

    /// First page to convert
    #[arg(long)]
    start_page: Option<u32>,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    match cli.command {
        Commands::Queries { terms } => {
            for query in terms.queries()? {
                println!("{}", query);
            }
            Ok(())
        }
        Commands::Search {
            terms,
            fields,
            operator,
            max_records,
            start_year,
            results_dir,
            key_file,
            endpoint,
            save_json,
        } => {
            let options = SearchOptions {
                fields,
                operator,
                max_records,
                start_year,
                results_dir,
                key_file,
                endpoint,
                save_json,
            };
            run_search(&terms, &options).await
        }
        Commands::PdfText { pdf: args } => {
            print!("{}", pdf::convert_pdf_to_txt(&args.pdf, args.start_page)?);
            Ok(())
        }
        Commands::PdfQuery { pdf: args } => {
            let text = pdf::convert_pdf_to_txt(&args.pdf, args.start_page)?;
            println!("{}", pdf::lookup_query(&text));
            Ok(())
        }
    }
}

// ============================================================================
// Search Pipeline
// ============================================================================

struct SearchOptions {
    fields: FieldMask,
    operator: String,
    max_records: u32,
    start_year: Option<i32>,
    results_dir: PathBuf,
    key_file: PathBuf,
    endpoint: String,
    save_json: bool,
}

impl SearchOptions {
    fn params(&self, query: &str) -> SearchParams {
        let raw_dump = self
            .save_json
            .then(|| paginate::output_path(&self.results_dir, query, self.fields.bits(), "json"));

        SearchParams {
            query: query.to_string(),
            field_mask: self.fields.clone(),
            operator: self.operator.clone(),
            start_year: self.start_year,
            max_records: self.max_records,
            raw_dump,
        }
    }
}

async fn run_search(terms: &TermArgs, options: &SearchOptions) -> Result<()> {
    let queries = terms.queries()?;
    std::fs::create_dir_all(&options.results_dir).with_context(|| {
        format!("Failed to create results directory {}", options.results_dir.display())
    })?;

    let api_key = KeyFile::new(&options.key_file).load()?;
    let client = XploreClient::with_endpoint(&options.endpoint, api_key)?;

    info!(
        queries = queries.len(),
        fields = %options.fields,
        mask = options.fields.bits(),
        "Starting IEEE Xplore harvest"
    );
    println!("Running {} queries (fields: {})", queries.len(), options.fields);

    let mut failed = 0usize;
    for query in &queries {
        let params = options.params(query);

        match paginate::run_query(&client, &params, &options.results_dir).await {
            Ok(report) => {
                println!(
                    "Query \"{}\": {} of {} records in {} page(s) -> {}",
                    report.query,
                    report.entries,
                    report.total_records,
                    report.pages,
                    report.path.display()
                );
            }
            Err(e) => {
                error!(query = %query, error = %e, "Query failed");
                eprintln!("Query \"{}\" failed: {}", query, e);
                if e.aborts_run() {
                    return Err(e).with_context(|| format!("Aborting run at query \"{}\"", query));
                }
                failed += 1;
            }
        }
    }

    print_summary(queries.len(), failed, &options.results_dir);
    if failed > 0 {
        anyhow::bail!("{} of {} queries failed", failed, queries.len());
    }
    Ok(())
}

fn print_summary(total: usize, failed: usize, results_dir: &Path) {
    println!(
        "\n✓ {} of {} queries written. Results in: {}",
        total - failed,
        total,
        results_dir.display()
    );
}
