use std::process::ExitCode;

fn main() -> ExitCode {
    gendoc::cli::run()
}
