use std::process::ExitCode;

fn main() -> ExitCode {
    umlizer::cli::run()
}
