use std::time::Duration;

use anyhow::Context;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tonx_adapter::schema::TupleItem;
use tonx_adapter::{Address, ClientConfig, FamilyKind, Network, TonClient};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum NetworkArg {
    Mainnet,
    Testnet,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FamilyArg {
    Gateway,
    Explorer,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[clap(long, env = "TONX_NETWORK", value_enum, default_value = "mainnet", global = true)]
    network: NetworkArg,
    #[clap(long, env = "TONX_API_KEY", default_value = "", hide_env_values = true, global = true)]
    api_key: String,
    #[clap(long, env = "TONX_FAMILY", value_enum, default_value = "gateway", global = true)]
    family: FamilyArg,
    #[clap(long, env = "TONX_ENDPOINT", global = true)]
    endpoint: Option<Url>,
    #[clap(long, value_parser = humantime::parse_duration, default_value = "30s", global = true)]
    timeout: Duration,
    #[clap(long, value_parser = humantime::parse_duration, default_value = "200ms", global = true)]
    inter_call_delay: Duration,
    #[clap(long, value_parser = humantime::parse_duration, default_value = "1s", global = true)]
    run_method_settle: Duration,
    #[clap(long, env = "TONX_METHOD_PREFIX", global = true)]
    method_prefix: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Latest masterchain block reference
    LastBlock,
    Block {
        seqno: u32,
    },
    BlockByUtime {
        utime: u32,
    },
    Account {
        address: Address,
        #[clap(long)]
        seqno: Option<u32>,
    },
    AccountLite {
        address: Address,
        #[clap(long)]
        seqno: Option<u32>,
    },
    Deployed {
        address: Address,
        #[clap(long)]
        seqno: Option<u32>,
    },
    Changed {
        address: Address,
        lt: u64,
        #[clap(long)]
        seqno: Option<u32>,
    },
    Transactions {
        address: Address,
        lt: u64,
        hash: String,
        #[clap(long)]
        limit: Option<usize>,
    },
    TransactionsParsed {
        address: Address,
        lt: u64,
        hash: String,
        #[clap(long)]
        limit: Option<usize>,
    },
    Config {
        #[clap(required = true)]
        ids: Vec<i32>,
        #[clap(long)]
        seqno: Option<u32>,
    },
    /// Arguments are a JSON array of stack entries, e.g. '[{"type":"int","value":"1"}]'
    RunMethod {
        address: Address,
        method: String,
        #[clap(long, default_value = "[]")]
        args: String,
        #[clap(long)]
        seqno: Option<u32>,
    },
    /// Message BoC as hex or base64
    Send {
        boc: String,
    },
}

impl Args {
    fn config(&self) -> ClientConfig {
        let network = match self.network {
            NetworkArg::Mainnet => Network::Mainnet,
            NetworkArg::Testnet => Network::Testnet,
        };
        let family = match self.family {
            FamilyArg::Gateway => FamilyKind::Gateway,
            FamilyArg::Explorer => FamilyKind::Explorer,
        };

        let mut config = ClientConfig::new(network, self.api_key.clone(), family);
        config.endpoint = self.endpoint.clone();
        config.timeout = self.timeout.as_secs().max(1);
        config.inter_call_delay_ms = self.inter_call_delay.as_millis() as u64;
        config.run_method_settle_ms = self.run_method_settle.as_millis() as u64;
        config.method_prefix = self.method_prefix.clone();

        config
    }
}

async fn seqno_or_last(client: &TonClient, seqno: Option<u32>) -> anyhow::Result<u32> {
    match seqno {
        Some(seqno) => Ok(seqno),
        None => Ok(client.get_last_block().await?.last.seqno),
    }
}

fn decode_boc(boc: &str) -> anyhow::Result<Vec<u8>> {
    hex::decode(boc)
        .or_else(|_| STANDARD.decode(boc))
        .context("boc is neither hex nor base64")
}

fn print(value: impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&value)?);

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .init();

    let client = TonClient::from_config(&args.config())?;

    match args.command {
        Command::LastBlock => print(client.get_last_block().await?),
        Command::Block { seqno } => print(client.get_block(seqno).await?),
        Command::BlockByUtime { utime } => print(client.get_block_by_utime(utime).await?),
        Command::Account { address, seqno } => {
            let seqno = seqno_or_last(&client, seqno).await?;
            print(client.get_account(seqno, &address).await?)
        }
        Command::AccountLite { address, seqno } => {
            let seqno = seqno_or_last(&client, seqno).await?;
            print(client.get_account_lite(seqno, &address).await?)
        }
        Command::Deployed { address, seqno } => {
            let seqno = seqno_or_last(&client, seqno).await?;
            print(client.is_contract_deployed(seqno, &address).await?)
        }
        Command::Changed { address, lt, seqno } => {
            let seqno = seqno_or_last(&client, seqno).await?;
            print(client.is_account_changed(seqno, &address, lt).await?)
        }
        Command::Transactions { address, lt, hash, limit } => {
            print(client.get_account_transactions(&address, lt, &hash, limit).await?)
        }
        Command::TransactionsParsed { address, lt, hash, limit } => {
            print(client.get_account_transactions_parsed(&address, lt, &hash, limit).await?)
        }
        Command::Config { ids, seqno } => {
            let seqno = seqno_or_last(&client, seqno).await?;
            print(client.get_config(seqno, &ids).await?)
        }
        Command::RunMethod { address, method, args, seqno } => {
            let stack: Vec<TupleItem> = serde_json::from_str(&args).context("--args")?;
            let seqno = seqno_or_last(&client, seqno).await?;
            print(client.run_method(seqno, &address, &method, &stack).await?)
        }
        Command::Send { boc } => print(client.send_message(&decode_boc(&boc)?).await?),
    }
}
