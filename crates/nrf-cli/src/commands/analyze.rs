use super::{load_inputs, progress_handler, resolve_config};
use crate::cli::AnalyzeArgs;
use crate::config::SearchOverrides;
use crate::error::Result;
use crate::export;
use crate::report;
use nrfpairs::engine::progress::ProgressReporter;
use nrfpairs::workflows;
use tracing::{info, warn};

pub fn run(args: AnalyzeArgs, quiet: bool) -> Result<()> {
    if args.plot {
        warn!("Plotting is not supported; --plot is ignored.");
        eprintln!("Warning: plotting is not supported; --plot is ignored.");
    }

    let search = SearchOverrides {
        neighbour_threshold: args.neighbour_threshold,
        top_branched: args.top_branched,
        top_neighbouring: args.top_neighbouring,
    };
    let resolved = resolve_config(&args.inputs, search)?;
    let inputs = load_inputs(&resolved.inputs)?;

    let progress = progress_handler(quiet);
    let reporter = ProgressReporter::with_callback(progress.get_callback());

    print!("{}", report::search_banner(&resolved.analysis));
    info!("Invoking the core analysis workflow...");
    let result = workflows::analyze::run(
        inputs.materials,
        &inputs.database,
        &inputs.attenuation,
        &resolved.analysis,
        &reporter,
    )?;

    print!("{}", report::run_summary(&result.lines));
    print!("{}", report::branched_section(&result));
    print!("{}", report::neighbouring_section(&result));

    if let Some(path) = &args.pairs_csv {
        let records = export::pair_records(&result);
        export::write_csv(path, &records)?;
        println!("\nWrote {} pair(s) to {}", records.len(), path.display());
    }

    Ok(())
}
