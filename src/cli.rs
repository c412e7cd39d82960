use clap::Parser;

/// Starts the certificate-transparency observation pipeline.
///
/// No subcommands and no runtime flags: all configuration comes from the
/// environment (see `config.rs`). `--help`/`--version` still work because
/// they're free with `clap::Parser`.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Real-time newly-issued-domain observer over a Certificate Transparency firehose",
    long_about = None
)]
pub struct Cli {}

pub fn parse_cli() -> Cli {
    Cli::parse()
}
