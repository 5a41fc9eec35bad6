use clap::Parser;
use folio_lib::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Un .env es opcional; las credenciales de Discogs suelen venir de ahí.
  dotenvy::dotenv().ok();

  let cli = Cli::parse();
  folio_lib::init_tracing(cli.verbose);
  folio_lib::run(cli).await
}
