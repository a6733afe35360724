//! CLI command implementation
//!
//! One invocation evaluates one query:
//!
//! 1. Load configuration (file or defaults) and set the log threshold
//! 2. Load the catalog
//! 3. Parse the query file
//! 4. Build the plan (optionally print it)
//! 5. Drive the root operator into the output file
//!
//! Any failure aborts; the output file may then be missing or partial.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::executor::{write_rows, AggregationStrategy};
use crate::observability::{log_event_with_fields, Event, Logger, ObservationScope, Severity};
use crate::planner::{ExplainPlan, PlanOptions, QueryPlanner};
use crate::query::{parse_query_file, Query};

use super::args::Cli;
use super::errors::{CliError, CliResult};
use super::io::{create_output, write_explain};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Insert intermediate projections (optional, default true)
    #[serde(default = "default_eager_projection")]
    pub eager_projection: bool,

    /// Grouped SUM strategy: "rescan" or "hash" (optional, default "rescan")
    #[serde(default = "default_aggregation")]
    pub aggregation: String,

    /// Minimum log severity (optional, default "warn")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_eager_projection() -> bool {
    true
}
fn default_aggregation() -> String {
    AggregationStrategy::default().as_str().to_string()
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            eager_projection: default_eager_projection(),
            aggregation: default_aggregation(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate enumerated fields
    pub fn validate(&self) -> CliResult<()> {
        self.aggregation_strategy()?;
        self.severity()?;
        Ok(())
    }

    /// Parsed `aggregation`
    pub fn aggregation_strategy(&self) -> CliResult<AggregationStrategy> {
        self.aggregation
            .parse::<AggregationStrategy>()
            .map_err(CliError::config_error)
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> CliResult<Severity> {
        self.log_level.parse::<Severity>().map_err(CliError::config_error)
    }

    /// Planner options derived from this configuration
    pub fn plan_options(&self) -> CliResult<PlanOptions> {
        Ok(PlanOptions {
            eager_projection: self.eager_projection,
            aggregation: self.aggregation_strategy()?,
        })
    }
}

/// Options for one evaluation
#[derive(Debug, Clone, Copy, Default)]
pub struct EvaluateOptions {
    pub plan: PlanOptions,
    /// Render the plan into the summary
    pub explain: bool,
}

/// What one evaluation produced
#[derive(Debug)]
pub struct EvaluationSummary {
    /// Lines written to the output file
    pub rows: usize,
    /// Rendered plan, if requested
    pub explain: Option<ExplainPlan>,
}

/// Parse arguments and run
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_cli(cli)
}

/// Run with already-parsed arguments
pub fn run_cli(cli: Cli) -> CliResult<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    Logger::set_level(config.severity()?);

    let source = match &cli.config {
        Some(path) => path.display().to_string(),
        None => "defaults".to_string(),
    };
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("aggregation", config.aggregation.as_str()),
            ("eager_projection", if config.eager_projection { "true" } else { "false" }),
            ("source", source.as_str()),
        ],
    );

    let options = EvaluateOptions {
        plan: config.plan_options()?,
        explain: cli.explain,
    };

    let summary = evaluate(&cli.database_dir, &cli.input_file, &cli.output_file, &options)?;
    if let Some(plan) = &summary.explain {
        write_explain(plan)?;
    }
    Ok(())
}

/// Evaluate the query in `input` against the database in `db_dir`,
/// writing result rows to `output`.
pub fn evaluate(
    db_dir: &Path,
    input: &Path,
    output: &Path,
    options: &EvaluateOptions,
) -> CliResult<EvaluationSummary> {
    let catalog = Catalog::load(db_dir)?;
    let relations = catalog.relation_count().to_string();
    let db_display = db_dir.display().to_string();
    log_event_with_fields(
        Event::CatalogLoaded,
        &[("db_dir", db_display.as_str()), ("relations", relations.as_str())],
    );

    let query = parse_query_file(input)?;
    let query_text = query.to_string();
    log_event_with_fields(Event::QueryParsed, &[("query", query_text.as_str())]);

    let input_display = input.display().to_string();
    let scope = ObservationScope::with_fields("EVALUATION", &[("input", input_display.as_str())]);

    match run_plan(&catalog, &query, output, options) {
        Ok(summary) => {
            let rows = summary.rows.to_string();
            scope.complete_with_fields(&[("rows", rows.as_str())]);
            Ok(summary)
        }
        Err(e) => {
            scope.fail(e.message());
            Err(e)
        }
    }
}

fn run_plan(
    catalog: &Catalog,
    query: &Query,
    output: &Path,
    options: &EvaluateOptions,
) -> CliResult<EvaluationSummary> {
    let planner = QueryPlanner::new(catalog, options.plan);
    let mut plan = planner.plan(query)?;

    let explain = options.explain.then(|| ExplainPlan::from_plan(&plan));

    let mut writer = create_output(output)?;
    let rows = write_rows(plan.root_mut(), &mut writer)?;

    let rows_text = rows.to_string();
    let output_display = output.display().to_string();
    log_event_with_fields(
        Event::OutputWritten,
        &[("output", output_display.as_str()), ("rows", rows_text.as_str())],
    );

    Ok(EvaluationSummary { rows, explain })
}
