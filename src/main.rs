mod entry;

use std::process::ExitCode;

fn main() -> ExitCode {
    entry::run()
}
