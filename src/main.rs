use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    entity_export_lib::run().await
}
