//! Command-line arguments of the `eds` converter.
//!
//! The conversion direction is not an argument: it follows from the
//! extension of the input file.

use clap::Parser;

/// Convert single-line diagrams between packed `.eds` files and YAML
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Input `.eds`, `.yaml` or `.yml` file
    pub input: String,

    /// Output file [default: the input with the other extension]
    #[arg(short, long)]
    pub output: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Do not write embedded sitplan images next to the YAML output
    #[arg(long)]
    pub no_images: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
