use clap::{Parser, Subcommand};
use rbysave::tools::{inspect, rename, verify};

#[derive(Parser)]
struct Opts {
    #[command(subcommand)]
    tool: ToolOpts,
}

#[derive(Subcommand)]
enum ToolOpts {
    Inspect(inspect::Opts),
    Verify(verify::Opts),
    Rename(rename::Opts),
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let opts = Opts::parse();
    match opts.tool {
        ToolOpts::Inspect(opts) => inspect::run(opts),
        ToolOpts::Verify(opts) => verify::run(opts),
        ToolOpts::Rename(opts) => rename::run(opts),
    }
}
