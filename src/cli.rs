use clap::{ArgAction, Parser};
use hbqueue::config::{FPS_CHOICES, RESOLUTION_CHOICES, validate_fps};
use std::path::PathBuf;

const LONG_ABOUT: &str = "\
Create a HandBrake JSON queue for a folder tree of videos.

If DIR_OUT is given and differs from DIR, every file that is not encoded is \
first copied to DIR_OUT, and the directory of every encoded file is created \
there so HandBrake can write into it.

--res auto / auto-half require ffprobe on PATH: each video is probed and the \
output resolution follows the source (halved for auto-half), with portrait \
recordings detected from their rotation tag. Probing every file slows the \
run down.";

#[derive(Parser)]
#[command(name = "hbqueue", version)]
#[command(about = "HandBrake batch queue generator", long_about = LONG_ABOUT)]
pub struct Cli {
    /// Path to input files root (defaults to current directory)
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Path to write encoded files into (defaults to DIR, must already exist)
    #[arg(value_name = "DIR_OUT")]
    pub dir_out: Option<PathBuf>,

    /// Queue file to generate (defaults to DIR_OUT/hb.json)
    #[arg(value_name = "QUEUE_FILE")]
    pub queue_file: Option<PathBuf>,

    /// Allowed video extension, repeat for several; replaces the default list (mp4 mov ts)
    #[arg(short = 'e', value_name = "EXT", action = ArgAction::Append)]
    pub extensions: Vec<String>,

    /// Output frame rate (5, 10, 12, 15, 20 or 25; defaults to 10)
    #[arg(long, value_parser = parse_fps)]
    pub fps: Option<u32>,

    /// Output resolution: auto, auto-half, 1280x720 or 1440x810 (defaults to 1280x720)
    #[arg(long, value_parser = parse_res)]
    pub res: Option<String>,

    /// Print the encoded form of FILE (or stdin) in the built-in template format
    #[arg(
        long = "template-enc",
        value_name = "FILE",
        num_args = 0..=1,
        help_heading = "Template",
        conflicts_with_all = ["template_dec", "init_config", "encode"]
    )]
    pub template_enc: Option<Option<PathBuf>>,

    /// Print the decoded built-in job template
    #[arg(
        long = "template-dec",
        help_heading = "Template",
        conflicts_with_all = ["init_config", "encode"]
    )]
    pub template_dec: bool,

    /// Config file to use instead of the per-user one
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the default config file and exit
    #[arg(long, conflicts_with = "encode")]
    pub init_config: bool,

    /// Run HandBrakeCLI on the queue once it is written
    #[arg(long)]
    pub encode: bool,

    /// Verbose logging (RUST_LOG overrides)
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_fps(s: &str) -> Result<u32, String> {
    let fps: u32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a number", s))?;
    validate_fps(fps).map_err(|_| format!("must be one of {:?}", FPS_CHOICES))
}

fn parse_res(s: &str) -> Result<String, String> {
    if RESOLUTION_CHOICES.contains(&s) {
        Ok(s.to_string())
    } else {
        Err(format!("must be one of {}", RESOLUTION_CHOICES.join(", ")))
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}
