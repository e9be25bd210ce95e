use std::process::ExitCode;

use clap::Parser;

use loadforge::args::{LoadforgeArgs, OutputFormat};
use loadforge::config::load_test_definition;
use loadforge::error::AppResult;
use loadforge::report::{LoadTestResult, summary_lines};
use loadforge::runner::run_test;
use loadforge::shutdown::{setup_signal_shutdown_handler, shutdown_channel};

pub(crate) fn run() -> ExitCode {
    let args = match LoadforgeArgs::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let exit = if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            drop(err.print());
            return exit;
        }
    };

    loadforge::logger::init_logging(args.verbose, args.no_color);

    match execute(&args) {
        Ok(result) => {
            print_result(&result, args.output_format());
            if result.success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            tracing::error!("{}", err);
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn execute(args: &LoadforgeArgs) -> AppResult<LoadTestResult> {
    let definition = load_test_definition(&args.test_file)?;
    let settings = args.run_settings();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let (shutdown_tx, _) = shutdown_channel();
        let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);
        let result = run_test(&definition, &settings, &shutdown_tx).await;
        signal_handle.abort();
        result
    })
}

fn print_result(result: &LoadTestResult, format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            for line in summary_lines(result) {
                println!("{}", line);
            }
        }
        OutputFormat::Json => {
            let payload = serde_json::json!({
                "success": result.success(),
                "result": result,
            });
            match serde_json::to_string_pretty(&payload) {
                Ok(text) => println!("{}", text),
                Err(err) => eprintln!("Failed to encode result: {}", err),
            }
        }
    }
}
