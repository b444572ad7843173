use clap::Parser;

/// Arguments for the status command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Status across all trees:\n    wsync status\n\n\
                  Status of one element by name or path:\n    wsync status tools/ros_comm\n\n\
                  Include untracked files:\n    wsync status --untracked")]
pub struct StatusArgs {
    /// Element local-name or path; all VCS elements when omitted
    pub element: Option<String>,

    /// Also show files not added to the SCM
    #[arg(long, short = 'u')]
    pub untracked: bool,

    /// Maximum number of parallel workers (default: one per element)
    #[arg(long, short = 'j', value_name = "N")]
    pub jobs: Option<usize>,
}
