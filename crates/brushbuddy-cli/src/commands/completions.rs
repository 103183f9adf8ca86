use clap::CommandFactory;
use clap_complete::{generate, Shell};

pub fn run(shell: Shell) -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = crate::Cli::command();
    generate(shell, &mut cmd, "brushbuddy", &mut std::io::stdout());
    Ok(())
}
