use clap::{Parser, Subcommand};

/// p5magic - run p5.js/q5.js sketches written in Python inside notebooks
#[derive(Parser, Debug)]
#[command(name = "p5magic")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the sketch from localhost and embed it in a frame (%%runp5)
    ///
    /// Blocks until the server lease expires, then removes the temp page.
    Run {
        /// Magic arguments: [width] [height] [background] [p5_global] [p5_type]
        /// [p5play_use] [py_type] [py_conf] [js_src] [py_ver]
        #[arg(value_name = "ARGS", trailing_var_arg = true)]
        args: Vec<String>,

        /// The whole magic line as one shell-quoted string (instead of ARGS)
        #[arg(long, value_name = "LINE", conflicts_with = "args")]
        line: Option<String>,

        /// File holding the cell body. Use "-" or omit to read stdin
        #[arg(long, value_name = "FILE")]
        cell: Option<String>,

        /// Emit Jupyter MIME bundles as JSON lines (default: false)
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Show the generated HTML instead of running it (%%genp5)
    Gen {
        /// Magic arguments: [width] [height] [background] [p5_global] [p5_type]
        /// [p5play_use] [py_type] [py_conf] [js_src] [py_ver]
        #[arg(value_name = "ARGS", trailing_var_arg = true)]
        args: Vec<String>,

        /// The whole magic line as one shell-quoted string (instead of ARGS)
        #[arg(long, value_name = "LINE", conflicts_with = "args")]
        line: Option<String>,

        /// File holding the cell body. Use "-" or omit to read stdin
        #[arg(long, value_name = "FILE")]
        cell: Option<String>,

        /// Emit Jupyter MIME bundles as JSON lines (default: false)
        #[arg(long, default_value = "false")]
        json: bool,
    },
}
