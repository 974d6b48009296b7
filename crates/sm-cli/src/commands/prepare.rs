//! Prepare command implementation

use anyhow::{Context, Result};
use sm_core::{LogSink, ScrubOptions};
use sm_warehouse::{read_inputs, scrub_all, write_prepared};
use std::path::PathBuf;
use std::time::Instant;

use crate::cli::{GlobalArgs, PrepareArgs};
use crate::commands::common::{self, load_project, parse_entities};

/// Execute the prepare command
pub async fn execute(args: &PrepareArgs, global: &GlobalArgs) -> Result<()> {
    let start_time = Instant::now();
    let project = load_project(global)?;
    let entities = parse_entities(args.entities.as_deref())?;

    let inputs = read_inputs(&project.config, &project.root, &entities)
        .context("Failed to read raw inputs")?;
    let options = ScrubOptions::from_config(&project.config);
    let outcomes = scrub_all(&inputs, &options, &mut LogSink);

    let output_dir = match &args.output_dir {
        Some(dir) => PathBuf::from(dir),
        None => project.config.prepared_dir_absolute(&project.root),
    };
    let paths = write_prepared(&outcomes, &output_dir).context("Failed to write prepared files")?;

    let rows: Vec<Vec<String>> = outcomes
        .iter()
        .map(|o| {
            vec![
                o.entity.to_string(),
                o.stats.rows_read.to_string(),
                o.stats.duplicates.to_string(),
                o.stats.rejected.to_string(),
                o.stats.outliers.to_string(),
                o.stats.rows_out().to_string(),
            ]
        })
        .collect();
    common::print_table(
        &["ENTITY", "READ", "DUPLICATES", "REJECTED", "OUTLIERS", "WRITTEN"],
        &rows,
    );

    println!();
    for path in &paths {
        println!("  ✓ {}", path.display());
    }
    println!(
        "\nPrepared {} file(s) in {}ms",
        paths.len(),
        start_time.elapsed().as_millis()
    );
    Ok(())
}
