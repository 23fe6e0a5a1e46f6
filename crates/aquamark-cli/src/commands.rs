use aquamark::{BlockShape, PoolMode, WatermarkConfig};

pub use crate::attack::AttackArgs;
pub use crate::embed::EmbedArgs;
pub use crate::extract::ExtractArgs;
pub use crate::recover::RecoverArgs;

#[derive(Debug, clap::Parser)]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub subcommand: Subcommands,
    #[command(flatten)]
    pub globals: GlobalArgs,
}

#[derive(Debug, clap::Args)]
#[non_exhaustive]
pub struct GlobalArgs {
    /// Print debug information; can be repeated.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
    /// Do not print logs to console.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Debug, clap::Subcommand)]
pub enum Subcommands {
    /// Embed a payload into a cover image.
    #[command(short_flag = 'e')]
    Embed(EmbedArgs),
    /// Extract a payload from a watermarked image.
    #[command(short_flag = 'x')]
    Extract(ExtractArgs),
    /// Estimate and undo a crop/scale attack using the original image.
    Recover(RecoverArgs),
    /// Apply a pixel-space attack, for robustness experiments.
    Attack(AttackArgs),
}

/// Keys and tuning shared by embed and extract; both sides must agree.
#[derive(Debug, clap::Args)]
pub struct CodecArgs {
    /// Key scrambling the payload bit order.
    #[arg(long, default_value_t = 1)]
    pub wm_key: u32,
    /// Key deriving the per-block coefficient permutations.
    #[arg(long, default_value_t = 1)]
    pub img_key: u32,
    /// Quantisation step of the leading singular value.
    #[arg(long, default_value_t = 36.0)]
    pub d1: f64,
    /// Quantisation step of the second singular value; 0 disables it.
    #[arg(long, default_value_t = 20.0)]
    pub d2: f64,
    #[arg(long, default_value_t = 4)]
    pub block_height: usize,
    #[arg(long, default_value_t = 4)]
    pub block_width: usize,
    /// Per-block execution strategy.
    #[arg(long, value_enum, default_value_t = PoolArg::Serial)]
    pub pool: PoolArg,
    /// Worker count for the threaded strategies.
    #[arg(long)]
    pub workers: Option<usize>,
}

impl CodecArgs {
    pub fn config(&self) -> WatermarkConfig {
        WatermarkConfig {
            wm_key: self.wm_key,
            img_key: self.img_key,
            d1: self.d1,
            d2: self.d2,
            block: BlockShape::new(self.block_height, self.block_width),
            pool_mode: self.pool.into(),
            workers: self.workers,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PoolArg {
    Serial,
    Threaded,
    Process,
    Vectorized,
}

impl From<PoolArg> for PoolMode {
    fn from(value: PoolArg) -> Self {
        match value {
            PoolArg::Serial => PoolMode::Serial,
            PoolArg::Threaded => PoolMode::Threaded,
            PoolArg::Process => PoolMode::Process,
            PoolArg::Vectorized => PoolMode::Vectorized,
        }
    }
}
