use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "bff-server", about = "Certification practice BFF gateway")]
pub struct Opt {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    pub config: clio::Input,
}
