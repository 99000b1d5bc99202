use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    remindly_cli::run().await
}
