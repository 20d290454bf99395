use clap::{Parser, Subcommand};

mod config;
mod generate;
mod inspect;

#[derive(Parser)]
#[command(name = "cubesym")]
#[command(about = "KiCad symbol libraries from the STM32Cube MCU database", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one symbol library per chip family
    #[command(alias = "g")]
    Generate(generate::GenerateArgs),

    /// Print the pin banks of a single MCU definition
    #[command(alias = "i")]
    Inspect(inspect::InspectArgs),
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => generate::execute(args),
        Commands::Inspect(args) => inspect::execute(args),
    }
}
