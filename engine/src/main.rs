use std::path::PathBuf;

use anyhow::{anyhow, Context};
use avail_da_sender::{
	avail::{
		rpc::AvailRpcClient, AvailSender, BlackholeSender, DaSender, ExtrinsicStatus,
		InclusionLevel,
	},
	common::load_signer,
	settings::{CommandLineOptions, Settings},
};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};

#[derive(ValueEnum, Clone, Copy, Debug)]
enum WaitFor {
	Ready,
	InBlock,
	Finalized,
}

impl From<WaitFor> for InclusionLevel {
	fn from(wait_for: WaitFor) -> Self {
		match wait_for {
			WaitFor::Ready => InclusionLevel::Ready,
			WaitFor::InBlock => InclusionLevel::InBlock,
			WaitFor::Finalized => InclusionLevel::Finalized,
		}
	}
}

#[derive(Parser, Debug)]
#[clap(version, about = "Publishes a block to the Avail data availability chain")]
struct Cli {
	#[clap(flatten)]
	settings_opts: CommandLineOptions,

	#[clap(help = "File holding the serialized block")]
	payload_file: PathBuf,

	#[clap(
		long = "wait-for",
		value_enum,
		help = "Block until the submission reaches this status, instead of returning once it is accepted"
	)]
	wait_for: Option<WaitFor>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	tracing_subscriber::FmtSubscriber::builder()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.try_init()
		.map_err(|e| anyhow!("Failed to set up logging: {e}"))?;

	let settings = Settings::new(cli.settings_opts).context("Error reading settings")?;

	let block = std::fs::read(&cli.payload_file)
		.with_context(|| format!("Failed to read block at {}", cli.payload_file.display()))?;

	let mut sender: Box<dyn DaSender> = if settings.avail.enabled {
		let signer = load_signer(&settings.avail.signing_key_file)?;
		info!(
			account_id = %signer.account_id,
			app_id = settings.avail.app_id,
			ws_endpoint = %settings.avail.ws_endpoint,
			"Publishing block to Avail"
		);

		let rpc_client = AvailRpcClient::connect(&settings.avail.ws_endpoint)
			.await
			.with_context(|| format!("Failed to connect to {}", settings.avail.ws_endpoint))?;

		Box::new(AvailSender::new(rpc_client, settings.avail.app_id, signer))
	} else {
		warn!("Publishing to Avail is disabled, the block will be dropped");
		Box::new(BlackholeSender)
	};

	match cli.wait_for {
		Some(wait_for) => {
			let status = ExtrinsicStatus::from(InclusionLevel::from(wait_for));
			sender.send_and_wait_for_status(&block, status).await?;
			info!(?status, "Block published");
		},
		None => {
			sender.send(&block).await?;
			info!("Block submitted");
		},
	}

	Ok(())
}
