//! `produp detect` handler.
//!
//! Runs one detection for a user and prints the result either as the JSON
//! response envelope or as a table of groups with their merge plans.

use std::io::Write;

use clap::{Args, ValueEnum};
use produp_core::{AppConfig, ClusterMode};
use produp_engine::{breakdown, detect_duplicates, CatalogSource, DetectOptions, DetectionResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

#[derive(Debug, Args)]
pub struct DetectArgs {
    /// Owner whose catalogs are scanned
    #[arg(long, env = "PRODUP_USER_ID")]
    pub user_id: Option<String>,
    /// Similarity threshold in (0, 1]; overrides `PRODUP_DETECT_THRESHOLD`
    #[arg(long)]
    pub threshold: Option<f64>,
    /// Grouping strategy: `seed` or `connected`
    #[arg(long)]
    pub mode: Option<ClusterMode>,
    /// Score pairs on the rayon thread pool
    #[arg(long)]
    pub parallel: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
    /// In table output, show each member's per-attribute scores against the
    /// group's first member
    #[arg(long)]
    pub explain: bool,
}

/// Configuration values with command-line overrides applied.
pub(crate) fn detect_options(config: &AppConfig, args: &DetectArgs) -> DetectOptions {
    let mut options = DetectOptions::from_config(config);
    if let Some(threshold) = args.threshold {
        options.threshold = threshold;
    }
    if let Some(mode) = args.mode {
        options.mode = mode;
    }
    if args.parallel {
        options.parallel = true;
    }
    options
}

/// Run duplicate detection against `source` and print the outcome to `out`.
///
/// The response is printed on failure too, so JSON consumers always get an
/// envelope.
///
/// # Errors
///
/// Returns an error if detection fails or the response cannot be written.
pub(crate) async fn run_detect<S, W>(
    source: &S,
    config: &AppConfig,
    args: &DetectArgs,
    out: &mut W,
) -> anyhow::Result<()>
where
    S: CatalogSource + Sync,
    W: Write,
{
    let options = detect_options(config, args);

    let outcome = detect_duplicates(source, args.user_id.as_deref(), &options).await;
    let response = DetectionResponse::from_outcome(outcome);

    match args.format {
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&response)?)?,
        OutputFormat::Table => {
            for line in render_table(&response, args.explain) {
                writeln!(out, "{line}")?;
            }
        }
    }

    if let Some(error) = &response.error {
        anyhow::bail!("duplicate detection failed: {error}");
    }
    Ok(())
}

pub(crate) fn render_table(response: &DetectionResponse, explain: bool) -> Vec<String> {
    let Some(result) = &response.result else {
        return vec![format!(
            "error: {}",
            response.error.as_deref().unwrap_or("unknown failure")
        )];
    };

    let mut lines = vec![format!(
        "{} products scanned, {} duplicate groups, {} removable duplicates",
        result.total_products, result.duplicate_groups, result.total_duplicates
    )];

    if result.duplicates.is_empty() {
        lines.push("no duplicates found".to_string());
        return lines;
    }

    lines.push(format!(
        "{:<7}{:<8}{:<8}{:<55}NAME",
        "GROUP", "SCORE", "ACTION", "RECORD"
    ));
    for (n, group) in result.duplicates.iter().enumerate() {
        let plan = group.merge_plan();
        let first = &group.members()[0];
        for (i, member) in group.members().iter().enumerate() {
            let (label, score) = if i == 0 {
                ((n + 1).to_string(), format!("{:.3}", group.similarity()))
            } else {
                (String::new(), String::new())
            };
            let key = member.key();
            let action = if key == plan.keep { "keep" } else { "remove" };
            lines.push(format!(
                "{:<7}{:<8}{:<8}{:<55}{}",
                label,
                score,
                action,
                key.to_string(),
                member.product().name
            ));

            if explain && i > 0 {
                for part in breakdown(first, member) {
                    let score = part.score.map_or_else(|| "-".to_string(), |s| format!("{s:.3}"));
                    lines.push(format!(
                        "{:<23}{:<10}weight {:.2}  score {}",
                        "",
                        part.attribute.to_string(),
                        part.weight,
                        score
                    ));
                }
            }
        }
    }

    lines
}
