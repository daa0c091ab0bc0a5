use anyhow::bail;
use clap::{Parser, Subcommand};
use muid::{MAX_CAPACITY, UidType, id::layout::MAX_SOURCE};

/// Command-line arguments for the `muid` binary.
///
/// The generator settings can also come from environment variables (or a
/// `.env` file), so one deployment can pin its source code once.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "muid",
    version,
    about = "Mint, decode and inspect compact 64-bit identifiers"
)]
pub struct CliArgs {
    /// Source code embedded in generated identifiers.
    ///
    /// Every process minting identifiers concurrently must use a distinct
    /// source. Range: 0 to 31.
    ///
    /// Environment variable: `MUID_SOURCE`
    #[arg(long, env = "MUID_SOURCE", default_value_t = 0)]
    pub source: u8,

    /// Maximum number of identifiers issued per second.
    ///
    /// Range: 1 to 65536.
    ///
    /// Environment variable: `MUID_CAPACITY`
    #[arg(long, env = "MUID_CAPACITY", default_value_t = MAX_CAPACITY)]
    pub capacity: u32,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Generate fresh identifiers.
    Generate {
        /// Type name, e.g. `band` or `record`. See `muid types`.
        #[arg(short = 't', long = "type")]
        ty: UidType,

        /// How many identifiers to generate.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Print the raw integer instead of the alphanumeric form.
        #[arg(long, default_value_t = false)]
        raw: bool,
    },

    /// Decode identifiers given in alphanumeric or integer form.
    Decode {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Print the storage path of identifiers.
    Path {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// List the registered types and their codes.
    Types,

    /// Intern URLs into a scratch in-memory store and print their ids.
    ///
    /// Repeated URLs within one invocation return the same identifier.
    Intern {
        #[arg(required = true)]
        urls: Vec<String>,
    },
}

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub source: u8,
    pub capacity: u32,
    pub command: Command,
}

impl TryFrom<CliArgs> for CliConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.source > MAX_SOURCE {
            bail!(
                "MUID_SOURCE ({}) exceeds the source field (max = {})",
                args.source,
                MAX_SOURCE
            );
        }

        if args.capacity == 0 || args.capacity > MAX_CAPACITY {
            bail!(
                "MUID_CAPACITY ({}) must be between 1 and {}",
                args.capacity,
                MAX_CAPACITY
            );
        }

        if let Command::Generate { ty, .. } = &args.command {
            if ty.is_url() {
                bail!("url identifiers are only created by `muid intern`");
            }
        }

        Ok(Self {
            source: args.source,
            capacity: args.capacity,
            command: args.command,
        })
    }
}
