//! `deskcopy`: copy the current directory to the desktop, without `node_modules`.

use std::io::Write;
use std::process::ExitCode;

use deskcopy_fs::{ConsolePrompt, EnumProjectCopyOutcome, SpecProjectCopyOptions, copy_project};
use log::Level;

fn init_logging() {
    // Respects RUST_LOG (default: info). Info records print as bare status lines.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| match record.level() {
            Level::Info => writeln!(buf, "{}", record.args()),
            level => writeln!(buf, "[{level}] {}", record.args()),
        })
        .target(env_logger::Target::Stdout)
        .init();
}

fn main() -> ExitCode {
    init_logging();

    let path_dir_src = match std::env::current_dir() {
        Ok(v) => v,
        Err(e) => {
            log::error!("Unable to read the current directory: {e}");
            return ExitCode::FAILURE;
        }
    };

    let spec_options = SpecProjectCopyOptions::default();
    let mut prompt = ConsolePrompt::stdio();
    match copy_project(&path_dir_src, &spec_options, &mut prompt) {
        Ok(EnumProjectCopyOutcome::Done { report, .. }) => {
            log::debug!("{report}");
            ExitCode::SUCCESS
        }
        Ok(EnumProjectCopyOutcome::Cancelled { .. }) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
