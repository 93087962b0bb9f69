use alloy_primitives::{Address, TxHash, U256};
use bridge::{BridgeClient, ChainSide};
use clap::{Parser, Subcommand, ValueEnum};
use config::BridgeConfig;
use tracing::info;

#[derive(Parser)]
#[command(name = "bridge-cli", about = "Plasma bridge client", version)]
struct Cli {
    /// Path to the bridge configuration file
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Signing key; required for state-changing commands
    #[arg(long, env = "BRIDGE_PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Side {
    Root,
    Child,
}

impl From<Side> for ChainSide {
    fn from(side: Side) -> Self {
        match side {
            Side::Root => Self::Root,
            Side::Child => Self::Child,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Query a fungible token balance
    Balance {
        holder: Address,
        token: Address,
        #[arg(long, value_enum, default_value = "child")]
        side: Side,
    },

    /// Query the native currency balance
    NativeBalance {
        address: Address,
        #[arg(long, value_enum, default_value = "child")]
        side: Side,
    },

    /// Resolve the child-chain address mapped to a root token
    MappedToken { token: Address },

    /// Look up the checkpoint header covering a child-chain block
    Header { block_number: u64 },

    /// Deposit native currency to the child chain
    DepositEthers { from: Address, value: U256 },

    /// Approve and deposit fungible tokens to the child chain
    DepositErc20 {
        from: Address,
        user: Address,
        token: Address,
        amount: U256,
    },

    /// Transfer fungible tokens
    Transfer {
        from: Address,
        to: Address,
        token: Address,
        amount: U256,
        #[arg(long, value_enum, default_value = "child")]
        side: Side,
    },

    /// Burn child-chain tokens to start a withdrawal
    StartWithdraw {
        from: Address,
        token: Address,
        amount: U256,
    },

    /// Prove a burnt-token withdrawal against its checkpoint and claim it
    /// on the root chain
    ConfirmWithdraw { from: Address, tx_id: TxHash },

    /// Process matured exits for a root token
    ProcessExits { from: Address, token: Address },
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!(config = %cli.config, "loading bridge configuration");
    let config = BridgeConfig::from_file(&cli.config)?;
    let client = BridgeClient::new(config)?;

    if let Some(key) = cli.private_key.as_deref() {
        client.set_credential(key)?;
    }

    match cli.command {
        Command::Balance {
            holder,
            token,
            side,
        } => {
            let balance = client.balance_of_erc20(holder, token, side.into()).await?;
            println!("{balance}");
        }

        Command::NativeBalance { address, side } => {
            let balance = client.native_balance(address, side.into()).await?;
            println!("{balance}");
        }

        Command::MappedToken { token } => {
            let mapped = client.mapped_token_address(token).await?;
            println!("{mapped}");
        }

        Command::Header { block_number } => match client.header_for_block(block_number).await {
            Some(header) => println!(
                "header {} covers blocks {}..={}",
                header.number, header.start, header.end
            ),
            None => println!("no checkpoint covers block {block_number} yet"),
        },

        Command::DepositEthers { from, value } => {
            let hash = client.deposit_ethers(from, value).await?;
            println!("{hash}");
        }

        Command::DepositErc20 {
            from,
            user,
            token,
            amount,
        } => {
            client.approve_erc20_for_deposit(from, token, amount).await?;
            let hash = client.deposit_erc20(from, user, token, amount).await?;
            println!("{hash}");
        }

        Command::Transfer {
            from,
            to,
            token,
            amount,
            side,
        } => {
            let hash = client
                .transfer_erc20(from, to, token, amount, side.into())
                .await?;
            println!("{hash}");
        }

        Command::StartWithdraw {
            from,
            token,
            amount,
        } => {
            let hash = client.start_withdraw(from, token, amount).await?;
            println!("{hash}");
        }

        Command::ConfirmWithdraw { from, tx_id } => {
            let hash = client.confirm_withdrawal(from, tx_id).await?;
            println!("{hash}");
        }

        Command::ProcessExits { from, token } => {
            let hash = client.process_exits(from, token).await?;
            println!("{hash}");
        }
    }

    Ok(())
}
