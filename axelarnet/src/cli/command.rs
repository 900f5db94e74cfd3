use std::path::PathBuf;

use clap::Parser;

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct AxelarnetCli {
    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// The path to the configuration file.
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        default_value = "config.toml"
    )]
    pub config: PathBuf,

    /// Increase output logging verbosity to TRACE level.
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress all output logging (overrides --verbose).
    #[arg(long, global = true)]
    pub quiet: bool,
}

#[derive(Clone, Debug, Parser)]
pub enum Commands {
    #[command(subcommand)]
    Genesis(GenesisCmd),
    #[command(subcommand)]
    Msg(MsgCmd),
}

#[derive(Clone, Debug, Parser)]
#[command(about = "Inspect the genesis state of the axelarnet module")]
pub enum GenesisCmd {
    /// Print a default genesis state using the configured module parameters.
    Default,
    /// Validate a genesis file, either the module state or a full app state.
    Validate {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[derive(Clone, Debug, Parser)]
#[command(about = "Encode an axelarnet module message as a protobuf `Any`")]
pub enum MsgCmd {
    RegisterIbcPath {
        /// Name of the cosmos chain.
        #[arg(long)]
        chain: String,
        /// The hub side `<port>/<channel>` of the chain's transfer channel.
        #[arg(long)]
        path: String,
    },
    AddCosmosBasedChain {
        #[arg(long)]
        name: String,
        /// Bech32 prefix of the chain's accounts.
        #[arg(long)]
        addr_prefix: String,
        /// Denoms native to the chain; may be repeated.
        #[arg(long = "native-asset")]
        native_assets: Vec<String>,
        #[arg(long)]
        path: String,
    },
    RouteIbcTransfers,
    RetryIbcTransfer {
        #[arg(long)]
        chain: String,
        /// Identifier of the failed transfer.
        #[arg(long)]
        id: u64,
    },
    RegisterAsset {
        /// Name of a chain known to the nexus registry.
        #[arg(long)]
        chain: String,
        #[arg(long)]
        denom: String,
        /// Register the asset as native to the chain.
        #[arg(long)]
        native: bool,
    },
}
