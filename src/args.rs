use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Config file (created with defaults if missing)
    #[arg(long, default_value = "lookfit.json")]
    pub config: String,

    /// Camera index, overrides the config
    #[arg(short, long)]
    pub cam_index: Option<u32>,

    /// Do not mirror the camera output
    #[arg(long, default_value_t = false)]
    pub no_mirror: bool,

    /// Print the screen to the terminal instead of opening a window
    #[arg(long, default_value_t = false)]
    pub headless: bool,

    /// Seed for the landmark constellation
    #[arg(long)]
    pub seed: Option<u64>,

    /// List available cameras
    #[arg(long)]
    pub list: bool,
}
