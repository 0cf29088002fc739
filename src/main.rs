use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match appointment_client::frameworks::cli::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
