//! swx - Command-line mixer for colors, animals, gems and more

use std::process::ExitCode;

use swatchmix::cli;

fn main() -> ExitCode {
    cli::run()
}
