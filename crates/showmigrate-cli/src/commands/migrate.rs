use super::config::load_config_or_prompt;
use super::progress::{is_interactive, MigrationProgress};
use super::prompts;
use crate::output::{Output, OutputFormat};
use color_eyre::Result;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use serde_json::json;
use showmigrate_config::PathManager;
use showmigrate_core::{write_report, MigrateOptions, Migrator};
use showmigrate_models::{MigrationReport, ShowOutcome};
use showmigrate_sources::{SerializdClient, TraktClient};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Pressing Enter at the confirmation cancels the migration
const PROCEED_BY_DEFAULT: bool = false;

pub struct MigrateArgs {
    pub dry_run: bool,
    /// Where to write the dry-run plan; defaults to the data directory
    pub plan_file: Option<PathBuf>,
    pub yes: bool,
    pub delay_ms: Option<u64>,
}

pub async fn run_migrate(args: MigrateArgs, output: &Output) -> Result<()> {
    tracing::debug!("Migrate command started");

    let path_manager = PathManager::default();
    let mut cred_store = super::config::load_credentials(&path_manager)?;
    let config = load_config_or_prompt(&path_manager, &mut cred_store, output)?;

    let (Some(trakt_config), Some(serializd_config)) = (&config.trakt, &config.serializd) else {
        return Err(color_eyre::eyre::eyre!("Trakt and Serializd must both be configured"));
    };

    output.info("Authenticating with Trakt...");
    let mut trakt = TraktClient::new(trakt_config.client_id.clone(), trakt_config.client_secret.clone())
        .with_base_url(trakt_config.base_url.clone());
    trakt.authenticate(&mut cred_store).await
        .map_err(|e| color_eyre::eyre::eyre!("Trakt authentication failed: {}", e))?;

    output.info("Logging in to Serializd...");
    let mut serializd = SerializdClient::new().with_base_url(serializd_config.base_url.clone());
    serializd.authenticate(&serializd_config.email, &cred_store).await
        .map_err(|e| {
            color_eyre::eyre::eyre!(
                "Serializd login failed: {}. Run 'showmigrate config serializd' to update your credentials.",
                e
            )
        })?;

    if !args.dry_run && !args.yes {
        if !is_interactive() {
            return Err(color_eyre::eyre::eyre!(
                "Refusing to migrate without confirmation in a non-interactive session. Pass --yes to proceed."
            ));
        }
        output.println("");
        output.println("This will migrate your Trakt watch history to Serializd.");
        if !prompts::prompt_yes_no("Do you want to proceed?", Some(PROCEED_BY_DEFAULT), output)? {
            output.info("Migration cancelled.");
            return Ok(());
        }
    }

    let options = MigrateOptions {
        dry_run: args.dry_run,
        delay: args.delay_ms.map(Duration::from_millis).unwrap_or_else(|| config.migration.delay()),
    };
    tracing::info!(dry_run = options.dry_run, delay_ms = options.delay.as_millis() as u64, "Starting migration");

    let progress = Arc::new(MigrationProgress::new(output.is_human()));
    let migrator = Migrator::new(trakt, serializd, options).with_observer(progress.clone());

    let report = match migrator.run().await {
        Ok(report) => {
            progress.finish();
            report
        }
        Err(e) => {
            progress.abandon();
            return Err(color_eyre::eyre::eyre!("Migration failed: {}", e));
        }
    };

    let plan_file = if args.dry_run {
        let path = args.plan_file.unwrap_or_else(|| {
            path_manager.dry_run_file(&report.started_at.format("%Y%m%d-%H%M%S").to_string())
        });
        write_report(&report, &path).map_err(|e| color_eyre::eyre::eyre!("{}", e))?;
        Some(path)
    } else {
        None
    };

    print_summary(&report, plan_file.as_ref(), output);
    Ok(())
}

fn print_summary(report: &MigrationReport, plan_file: Option<&PathBuf>, output: &Output) {
    let duration_seconds = report.duration().num_milliseconds() as f64 / 1000.0;

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return;
            }

            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            let title = if report.dry_run { "Migration Plan (dry run)" } else { "Migration Summary" };
            table.set_header(vec![
                Cell::new(title).fg(comfy_table::Color::Cyan).add_attribute(comfy_table::Attribute::Bold),
                Cell::new(&report.username),
            ]);
            table.add_row(vec![Cell::new("Shows processed"), Cell::new(report.shows.len())]);
            table.add_row(vec![
                Cell::new("Successful"),
                Cell::new(report.successful()).fg(comfy_table::Color::Green),
            ]);
            table.add_row(vec![
                Cell::new("Failed"),
                Cell::new(report.failed()).fg(if report.failed() > 0 { comfy_table::Color::Red } else { comfy_table::Color::Reset }),
            ]);
            table.add_row(vec![Cell::new("  of which skipped"), Cell::new(report.skipped())]);
            table.add_row(vec![Cell::new("Seasons marked watched"), Cell::new(report.seasons_marked())]);
            table.add_row(vec![Cell::new("Episodes logged"), Cell::new(report.episodes_logged())]);
            table.add_row(vec![Cell::new("Duration"), Cell::new(format!("{:.1}s", duration_seconds))]);
            println!("\n{}", table);

            let problems: Vec<(&str, String)> = report
                .shows
                .iter()
                .filter_map(|s| match &s.outcome {
                    ShowOutcome::Skipped { reason } | ShowOutcome::Failed { reason } => {
                        Some((s.title.as_str(), reason.clone()))
                    }
                    ShowOutcome::Migrated { failed_seasons, missing_seasons, .. }
                        if !failed_seasons.is_empty() || !missing_seasons.is_empty() =>
                    {
                        Some((
                            s.title.as_str(),
                            format!("failed seasons {:?}, missing seasons {:?}", failed_seasons, missing_seasons),
                        ))
                    }
                    _ => None,
                })
                .collect();

            if !problems.is_empty() {
                let mut problem_table = Table::new();
                problem_table.load_preset(comfy_table::presets::UTF8_FULL);
                problem_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
                problem_table.set_header(vec!["Show", "Problem"]);
                for (title, problem) in problems {
                    problem_table.add_row(vec![title.to_string(), problem]);
                }
                println!("{}", problem_table);
            }

            if let Some(path) = plan_file {
                println!("\n{} {}", "Dry-run plan written to".bright_white(), path.display().to_string().bright_green());
            }

            if report.failed() == 0 {
                output.success("Migration completed!");
            } else {
                output.warn(format!("Migration completed with {} failed show(s)", report.failed()));
            }
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "success": true,
                "dry_run": report.dry_run,
                "username": report.username,
                "shows": report.shows.len(),
                "successful": report.successful(),
                "failed": report.failed(),
                "skipped": report.skipped(),
                "seasons_marked": report.seasons_marked(),
                "episodes_logged": report.episodes_logged(),
                "duration_seconds": duration_seconds,
                "plan_file": plan_file.map(|p| p.display().to_string()),
            }));
        }
    }
}
