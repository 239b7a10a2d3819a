// src/main.rs - MiVi Special Length Entry Point

use std::process;

use clap::Parser;
use tracing::{debug, info, warn};

use mivi_special_length::{
    cli::Args,
    error::{ErrorReporter, ResultExt, SpecialLengthError, SpecialLengthResult},
    host::{AffineViewport, ToolStateStore},
    init_logging,
    script::{GestureScript, ReplayReport, ScriptRunner},
    tool::{SpecialLengthTool, ToolConfiguration, ToolEventBus},
    VERSION,
};

/// Main entry point for the MiVi special length tool
fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    if let Err(e) = init_logging(args.effective_log_level()) {
        eprintln!("❌ Failed to setup logging: {}", e);
        process::exit(1);
    }

    info!("🚀 Starting MiVi Special Length v{}", VERSION);

    if args.verbose {
        args.print_summary();
    }

    match run(&args) {
        Ok(report) => {
            info!(
                "✅ Replay complete: {} measurements on {}",
                report.measurements.len(),
                report.surface
            );
        }
        Err(e) => {
            ErrorReporter::report(&e);
            process::exit(1);
        }
    }
}

/// Validate, load, replay and write the report
fn run(args: &Args) -> SpecialLengthResult<ReplayReport> {
    args.validate().map_err(SpecialLengthError::validation)?;
    debug!("✅ Command line arguments validated");

    let configuration = load_configuration(args)?;
    let script = GestureScript::load(&args.script)?;
    if script.steps.is_empty() {
        warn!("⚠️ Gesture script {} has no steps", args.script.display());
    }

    let viewport = AffineViewport::new(args.surface.clone(), args.image_info())
        .with_scale(args.zoom)
        .with_translation(args.pan());

    if !args.image_info().has_pixel_spacing() {
        info!("📏 No pixel spacing given, lengths are reported in pixels");
    }

    let tool = SpecialLengthTool::new(viewport, ToolStateStore::shared(), ToolEventBus::default())
        .with_configuration(configuration);

    let report = ScriptRunner::new(tool).run(&script)?;
    write_report(args, &report)?;
    Ok(report)
}

/// Configuration file (explicit or user default) with command line overrides applied
fn load_configuration(args: &Args) -> SpecialLengthResult<ToolConfiguration> {
    let mut configuration = ToolConfiguration::load_or_default(args.config.as_deref())?;
    args.apply_overrides(&mut configuration);
    configuration.validate()?;

    debug!(
        "⚙️ Guide lines: {}, line width: {}, shadow: {}",
        configuration.draw_guide_lines,
        configuration.style.line_width,
        configuration.shadow.enabled
    );
    Ok(configuration)
}

fn write_report(args: &Args, report: &ReplayReport) -> SpecialLengthResult<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context_lazy(|| format!("writing report to {}", path.display()))?;
            info!("💾 Report written to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
