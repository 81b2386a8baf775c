mod bars;
mod board;
mod chart;
mod cli;
mod error;
mod loader;
mod page;
mod record;
mod schema;
mod score;
mod server;
mod session;
mod source;
mod table;
mod util;
mod view;

use anyhow::Context;
use clap::Parser;
use cli::CliArgs;
use error::Result;

use board::Board;
use chart::ChartConfig;
use page::{render_page, PageMode, PRICE_CHART_CONTAINER};

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}

async fn run(args: CliArgs, board: Board) -> Result<()> {
    let dataset = board.dataset().await;
    let mut chart = board.chart(ChartConfig::new(PRICE_CHART_CONTAINER, args.width, args.height));
    board.render_price_chart(&mut chart, &args.metric).await;

    tokio::fs::create_dir_all(&args.out)
        .await
        .with_context(|| format!("creating output directory {}", args.out.display()))?;

    let index = args.out.join("index.html");
    tokio::fs::write(&index, render_page(&dataset, &chart, PageMode::Static))
        .await
        .with_context(|| format!("writing {}", index.display()))?;

    let svg = args.out.join("chart.svg");
    tokio::fs::write(&svg, chart.to_svg())
        .await
        .with_context(|| format!("writing {}", svg.display()))?;

    println!("models: {}", dataset.models.len());
    println!("benchmarks: {}", dataset.schema.benchmarks.join(", "));
    println!("wrote {} and {}", index.display(), svg.display());

    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    let args = CliArgs::parse();

    let result = match args.dataset_loader() {
        Ok(loader) => {
            let board = Board::new(loader);
            if args.serve {
                server::run_preview_server(&args, board).await
            } else {
                run(args, board).await
            }
        }
        Err(error) => Err(error),
    };

    if let Err(error) = result {
        tracing::error!("{error:?}");
        std::process::exit(1);
    }
}
