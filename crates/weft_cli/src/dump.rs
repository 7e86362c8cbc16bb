//! `weft dump`: print what every function and update block reads, writes
//! and calls.

use weft_elaborate::{render_report, Elaborated};

use crate::pipeline;
use crate::{DumpArgs, GlobalArgs, ReportFormat};

/// Runs the `weft dump` command.
pub fn run(args: &DumpArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    match pipeline::run(global)? {
        Ok(done) => {
            println!("{}", render(&done, args.format)?);
            Ok(0)
        }
        Err(failure) => {
            failure.render(global.color);
            Ok(1)
        }
    }
}

fn render(done: &Elaborated, format: ReportFormat) -> Result<String, Box<dyn std::error::Error>> {
    Ok(match format {
        ReportFormat::Text => render_report(&done.design, &done.elaborator)?
            .trim_end()
            .to_string(),
        ReportFormat::Json => {
            serde_json::to_string_pretty(&done.elaborator.summary(&done.design)?)?
        }
    })
}
