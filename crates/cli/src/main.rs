use backtest_client_core::BacktestSession;
use backtest_client_cli::{interactive, logging, view, Cli, Commands};
use clap::Parser;
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Run(args) => {
            let mut session = BacktestSession::new(args.page.settings());
            args.fill(&mut session);
            tracing::info!(endpoint = %session.settings().endpoint, "submitting backtest");
            session.submit().await;
            print!("{}", view::render_page(&session));
        }
        Commands::Interactive(args) => {
            let mut session = BacktestSession::new(args.settings());
            println!("{}", interactive::HELP);
            let stdin = BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            interactive::run(&mut session, stdin, &mut stdout).await?;
        }
    }

    Ok(())
}
