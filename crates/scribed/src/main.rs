use std::process::ExitCode;

fn main() -> ExitCode {
    match scribed::run_daemon() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("scribed: {error}");
            ExitCode::FAILURE
        }
    }
}
