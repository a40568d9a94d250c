use super::{load_inputs, progress_handler, resolve_config};
use crate::cli::LinesArgs;
use crate::config::SearchOverrides;
use crate::error::Result;
use crate::export;
use crate::report;
use nrfpairs::engine::progress::ProgressReporter;
use nrfpairs::workflows;
use tracing::info;

pub fn run(args: LinesArgs, quiet: bool) -> Result<()> {
    let resolved = resolve_config(&args.inputs, SearchOverrides::default())?;
    let inputs = load_inputs(&resolved.inputs)?;

    let progress = progress_handler(quiet);
    let reporter = ProgressReporter::with_callback(progress.get_callback());

    info!("Selecting and normalizing lines...");
    let set = workflows::analyze::prepare_lines(
        inputs.materials,
        &inputs.database,
        &inputs.attenuation,
        &resolved.analysis,
        &reporter,
    )?;

    print!("{}", report::run_summary(&set));
    print!("{}", report::lines_table(&set));

    if let Some(path) = &args.csv {
        let records = export::line_records(&set);
        export::write_csv(path, &records)?;
        println!("\nWrote {} line(s) to {}", records.len(), path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use crate::commands::tests::write_fixture;
    use clap::Parser;

    #[test]
    fn lines_exports_every_accepted_line() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = write_fixture(dir.path());
        let csv_path = dir.path().join("lines.csv");

        let cli = Cli::parse_from([
            "nrfpairs",
            "lines",
            "-m",
            fixture.materials.to_str().unwrap(),
            "-d",
            fixture.database.to_str().unwrap(),
            "-a",
            fixture.attenuation.to_str().unwrap(),
            "--detector-max",
            "2.5",
            "--csv",
            csv_path.to_str().unwrap(),
        ]);
        let Commands::Lines(args) = cli.command else {
            panic!("Expected 'lines' subcommand");
        };

        run(args, true).unwrap();

        let content = std::fs::read_to_string(&csv_path).unwrap();
        // Header plus four lines; the 3 MeV line falls outside the detector window.
        assert_eq!(content.lines().count(), 5);
        assert!(content.lines().nth(1).unwrap().starts_with("0,92,238,"));
    }
}
