use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "folio", about = "Aggregates every version of a Discogs master into one canonical record", version)]
pub struct Cli {
  /// Traza a nivel debug (RUST_LOG sigue teniendo prioridad si no se pasa).
  #[arg(short, long, global = true)]
  pub verbose: bool,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
  /// Aggregate and save one or more masters, in order.
  Save {
    #[arg(required = true, value_name = "MASTER_ID")]
    master_ids: Vec<u64>,
  },
  /// Print a stored aggregate as JSON.
  Show {
    #[arg(value_name = "MASTER_ID")]
    master_id: u64,
  },
  /// List the stored aggregates of the configured owner.
  List,
  /// Delete a stored aggregate.
  Delete {
    #[arg(value_name = "MASTER_ID")]
    master_id: u64,
  },
  /// Print the effective configuration with secrets redacted.
  Config,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_save_with_several_ids() {
    let cli = Cli::try_parse_from(["folio", "save", "96559", "1143457", "-v"]).unwrap();
    assert!(cli.verbose);
    assert_eq!(cli.command, Command::Save { master_ids: vec![96559, 1143457] });
  }

  #[test]
  fn save_requires_an_id() {
    assert!(Cli::try_parse_from(["folio", "save"]).is_err());
    assert!(Cli::try_parse_from(["folio", "show", "abc"]).is_err());
  }

  #[test]
  fn parses_the_other_commands() {
    assert_eq!(Cli::try_parse_from(["folio", "list"]).unwrap().command, Command::List);
    assert_eq!(Cli::try_parse_from(["folio", "delete", "7"]).unwrap().command, Command::Delete { master_id: 7 });
    assert_eq!(Cli::try_parse_from(["folio", "config"]).unwrap().command, Command::Config);
  }
}
