mod app;
mod cli;
mod color;
mod config;
mod data;
mod error;
mod figure;
mod render;
mod state;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;

use cli::Args;
use figure::prepare::prepare;
use figure::table::{resolve, save_name};
use state::ViewerState;

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        log::error!("Failed to reproduce figure {}: {e:#}", args.figure_num);
        return Err(e);
    }
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    std::fs::create_dir_all(&args.fig_dir)
        .with_context(|| format!("creating {}", args.fig_dir.display()))?;

    let table = config::figure_table(args.config.as_deref())?;
    let fig = resolve(&table, args.figure_num, &args.results_dir)?;
    let prepared = prepare(&fig, data::loader::load_array)?;

    let out_path = args
        .fig_dir
        .join(save_name(args.figure_num, args.format.extension()));
    render::save_figure(&prepared, &out_path)?;

    if args.no_show {
        return Ok(());
    }
    app::show(ViewerState::new(prepared, Some(out_path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    use ndarray::Array1;
    use ndarray_npy::write_npy;

    fn headless_args(
        results: &std::path::Path,
        fig_dir: &std::path::Path,
        extra: &[&str],
    ) -> Args {
        let mut argv: Vec<&OsStr> = vec![
            OsStr::new("learning-figures"),
            OsStr::new("--no-show"),
            OsStr::new("--results-dir"),
            results.as_os_str(),
            OsStr::new("--fig-dir"),
            fig_dir.as_os_str(),
        ];
        argv.extend(extra.iter().map(OsStr::new));
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn figure_4_arrays_load_and_prepare() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("Learning Curves");
        let power_dir = results.join("sum_rate_power");
        std::fs::create_dir_all(&power_dir).unwrap();
        for (val, scale) in [(8, 0.5), (32, 1.0)] {
            let curve = Array1::from_iter((0..11).map(|i| scale * (2.0 + 3.0 * i as f64)));
            write_npy(power_dir.join(format!("{val}.npy")), &curve).unwrap();
        }

        let args = headless_args(&results, dir.path(), &["--figure-num", "4"]);
        let table = config::figure_table(args.config.as_deref()).unwrap();
        let fig = resolve(&table, args.figure_num, &args.results_dir).unwrap();
        let prepared = prepare(&fig, data::loader::load_array).unwrap();

        assert_eq!(prepared.series.len(), 2);
        assert_eq!(prepared.series[1].points[10], (30.0, 32.0));
        assert_eq!(prepared.series[0].label, "M = 8, N = 8, K = 8");
    }

    #[test]
    fn missing_results_are_reported_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let fig_dir = dir.path().join("figs");
        let args = headless_args(dir.path(), &fig_dir, &[]);

        let err = format!("{:#}", run(&args).unwrap_err());
        assert!(err.contains("result.npy"), "{err}");
        // the output directory is created before anything is loaded
        assert!(fig_dir.is_dir());
    }

    #[test]
    fn unconfigured_figure_fails_before_loading() {
        let dir = tempfile::tempdir().unwrap();
        let args = headless_args(dir.path(), dir.path(), &["--figure-num", "8"]);
        let err = run(&args).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<error::FigureError>(),
            Some(error::FigureError::NotConfigured(8))
        ));
    }
}
