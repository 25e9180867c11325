//! Execution of the external tools `rlds` depends on.
//!
//! Everything that leaves the process goes through [`CommandRunner`], so the display
//! and settings logic can be driven by canned output in tests.

use std::process::Command;

use thiserror::Error;

/// Error type for running external tools
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to start `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{program}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("`{program}` printed output that is not valid UTF-8")]
    InvalidOutput { program: String },
}

type Result<T = ()> = std::result::Result<T, CommandError>;

/// Runs a program to completion and hands back what it printed on stdout
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<String>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, program: &str, args: &[String]) -> Result<String> {
        (**self).run(program, args)
    }
}

/// Runs commands as blocking child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<String> {
        log::debug!("Running {} {}", program, args.join(" "));

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| CommandError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(CommandError::Failed {
                program: program.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| CommandError::InvalidOutput {
            program: program.to_string(),
        })
    }
}
