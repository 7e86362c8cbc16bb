//! `weft check`: build, elaborate and run the legality checker.

use crate::pipeline;
use crate::GlobalArgs;

/// Runs the `weft check` command.
///
/// Returns exit code 0 for a legal design and 1 after rendering the first
/// error otherwise.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    match pipeline::run(global)? {
        Ok(done) => {
            if !global.quiet {
                let agg = done.elaborator.aggregate()?;
                eprintln!(
                    "   Result: {} component(s), {} update block(s), no errors",
                    agg.components().len(),
                    agg.blocks().count()
                );
            }
            Ok(0)
        }
        Err(failure) => {
            failure.render(global.color);
            if !global.quiet {
                eprintln!("   Result: 1 error");
            }
            Ok(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tests::{global_for, project, GOOD, TWO_WRITERS};

    #[test]
    fn legal_design_exits_zero() {
        let tmp = project(GOOD);
        assert_eq!(run(&global_for(tmp.path())).unwrap(), 0);
    }

    #[test]
    fn illegal_design_exits_one() {
        let tmp = project(TWO_WRITERS);
        assert_eq!(run(&global_for(tmp.path())).unwrap(), 1);
    }

    #[test]
    fn missing_project_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let global = global_for(&tmp.path().join("absent"));
        assert_eq!(run(&global).unwrap(), 1);
    }
}
