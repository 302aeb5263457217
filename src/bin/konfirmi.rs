use anyhow::Result;
use konfirmi::cli::{actions, start};
use std::process::ExitCode;

// Main function
#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Start the program
    let (action, config) = start()?;

    // Handle the action
    let disposition = actions::eval::handle(action, &config).await?;

    Ok(ExitCode::from(disposition.exit_code()))
}
