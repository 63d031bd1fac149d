use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = kin_api::Args::parse();
	kin_api::run(args).await
}
