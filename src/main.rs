use clap::Parser;
use miette::Result;
use litsprite::cli::{Cli, Commands};
use litsprite::output::{init_logging, Printer};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let printer = Printer::new();

    match cli.command {
        Commands::Generate(args) => litsprite::cli::generate::run(args, &printer)?,
        Commands::Preview(args) => {
            litsprite::cli::preview::run(args, &printer)?;
        }
        Commands::Split(args) => {
            litsprite::cli::split::run(args, &printer)?;
        }
        Commands::Watch(args) => litsprite::cli::watch::run(args, &printer)?,
        Commands::Init(args) => litsprite::cli::init::run(args, &printer)?,
        Commands::Completions(args) => litsprite::cli::completions::run(args)?,
    }

    Ok(())
}
