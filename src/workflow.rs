use crate::agents::update::ReportSet;
use crate::agents::{DependencyUpdater, ProjectScannerAgent};
use crate::cli::SelectionArgs;
use crate::config::Settings;
use crate::error::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::path::Path;

/// Execute the update workflow: resolve and rewrite in place
pub fn execute_update(
    project_path: &Path,
    config_path: Option<&Path>,
    args: &SelectionArgs,
    verbose: bool,
) -> Result<()> {
    eprintln!("{}", "Updating Terraform versions...".cyan().bold());
    let reports = run(project_path, config_path, args, verbose, true)?;

    let updates = count_updates(&reports);
    if updates == 0 {
        eprintln!("{}", "✓ Everything is up to date".green());
    } else {
        eprintln!("{}", format!("✓ Applied {updates} update(s)").green());
    }
    print_failures(&reports);

    println!("{}", reports.to_markdown());
    Ok(())
}

/// Execute the check workflow: resolve and report without writing
pub fn execute_check(
    project_path: &Path,
    config_path: Option<&Path>,
    args: &SelectionArgs,
    verbose: bool,
) -> Result<()> {
    eprintln!("{}", "Checking Terraform versions...".cyan().bold());
    let reports = run(project_path, config_path, args, verbose, false)?;

    let updates = count_updates(&reports);
    if updates == 0 {
        eprintln!("{}", "✓ Everything is up to date".green());
    } else {
        eprintln!(
            "{}",
            format!("{updates} update(s) available, run `tf-latest-version update` to apply them")
                .yellow()
        );
    }
    print_failures(&reports);

    println!("{}", reports.to_markdown());
    Ok(())
}

fn run(
    project_path: &Path,
    config_path: Option<&Path>,
    args: &SelectionArgs,
    verbose: bool,
    write: bool,
) -> Result<ReportSet> {
    let settings = Settings::load(project_path, config_path, args)?;

    let project = ProjectScannerAgent::new(&settings.root).scan()?;
    eprintln!(
        "   Found {} Terraform file(s) in {}",
        project.files.len(),
        project.root.display().to_string().bright_cyan()
    );

    let updater = DependencyUpdater::with_settings(
        &settings.resolver,
        settings.provider_selector.clone(),
        settings.chart_selector.clone(),
    )?;

    let progress = progress_bar(project.files.len(), verbose);
    let reports = updater.run(&project.files, write, &progress);
    progress.finish_and_clear();
    reports
}

fn progress_bar(len: usize, verbose: bool) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    // Debug logs and the bar would fight over stderr.
    if verbose {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }
    let style = ProgressStyle::with_template("  [{bar:40}] {pos}/{len} {msg}")
        .map(|style| style.progress_chars("=>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

fn count_updates(reports: &ReportSet) -> usize {
    reports.reports().iter().map(|r| r.updated.len()).sum()
}

fn print_failures(reports: &ReportSet) {
    let failures: usize = reports.reports().iter().map(|r| r.failed.len()).sum();
    if failures > 0 {
        eprintln!(
            "{}",
            format!("⚠ {failures} declaration(s) could not be updated, see the Failed tables").red()
        );
    }
}
