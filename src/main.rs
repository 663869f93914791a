use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cfg = fidoscope::config::Config::parse();
    fidoscope::run(cfg)
}
