use clap::Parser;
use m3u8dl_engine::ProxyType;
use std::path::PathBuf;

/// Define CLI arguments
#[derive(Parser, Debug)]
#[command(
    name = "m3u8dl",
    version,
    about = "Download an m3u8 playlist into a single file",
    long_about = "Downloads every segment of an m3u8 playlist one after another and\n\
                  concatenates them into a single output file.\n\
                  \n\
                  Only <url> is required. Segments that fail are skipped and reported;\n\
                  the exit status is non-zero when any segment failed."
)]
pub struct CliArgs {
    /// Playlist URL
    #[arg(
        required = true,
        value_name = "URL",
        help = "URL of the m3u8 playlist, e.g. http://example.com/somepath/some.m3u8"
    )]
    pub url: String,

    /// Destination directory
    #[arg(
        short,
        long,
        default_value = ".",
        help = "Directory the output file is written to"
    )]
    pub dest: PathBuf,

    /// Output file name
    #[arg(
        short,
        long,
        help = "Output file name (default: derived from the playlist URL)"
    )]
    pub output: Option<String>,

    /// Segment range, half-open
    #[arg(
        short,
        long,
        value_name = "A..B",
        value_parser = crate::utils::parse_range,
        help = "Range of the playlist segments, it's [a, b). Empty b means until the end; values in [0, 1] are fractions"
    )]
    pub range: Option<(f64, f64)>,

    /// Proxy URL; without a value the environment proxy is used
    #[arg(
        short,
        long,
        value_name = "URL",
        num_args = 0..=1,
        help = "Proxy server, e.g. socks5://127.0.0.1:1080. Without a value, http_proxy/https_proxy are used"
    )]
    pub proxy: Option<Option<String>>,

    /// Proxy type override
    #[arg(
        long,
        value_enum,
        help = "Proxy type (default: inferred from the proxy URL scheme)"
    )]
    pub proxy_type: Option<ProxyType>,

    /// Proxy username
    #[arg(long, help = "Username for proxy authentication")]
    pub proxy_user: Option<String>,

    /// Proxy password
    #[arg(long, help = "Password for proxy authentication")]
    pub proxy_pass: Option<String>,

    #[arg(long, help = "Append to the output file instead of truncating it")]
    pub append: bool,

    #[arg(long, help = "Only log warnings and errors", conflicts_with = "debug")]
    pub quiet: bool,

    #[arg(long, help = "Enable detailed debug logging")]
    pub debug: bool,

    /// Custom HTTP headers for download requests
    #[arg(
        long = "header",
        short = 'H',
        help = "Add custom HTTP header to requests (can be used multiple times). Format: 'Name: Value'",
        value_name = "HEADER"
    )]
    pub headers: Vec<String>,

    /// Overall request timeout in seconds
    #[arg(
        long,
        default_value = "0",
        help = "Overall timeout in seconds for HTTP requests (0 disables it)"
    )]
    pub timeout: u64,

    /// Connection timeout in seconds
    #[arg(
        long,
        default_value = "30",
        help = "Connection timeout in seconds (time to establish initial connection)"
    )]
    pub connect_timeout: u64,

    /// Show progress bars
    #[arg(
        short = 'P',
        long = "progress",
        default_value = "false",
        help = "Show progress bars instead of per-chunk progress logs"
    )]
    pub show_progress: bool,

    #[arg(long, help = "Print the parsed playlist as JSON and exit without downloading")]
    pub list: bool,
}
