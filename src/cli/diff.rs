use clap::Parser;

/// Arguments for the diff command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Diff across all trees:\n    wsync diff\n\n\
                  Diff of one element by name or path:\n    wsync diff tools/ros_comm")]
pub struct DiffArgs {
    /// Element local-name or path; all VCS elements when omitted
    pub element: Option<String>,

    /// Maximum number of parallel workers (default: one per element)
    #[arg(long, short = 'j', value_name = "N")]
    pub jobs: Option<usize>,
}
