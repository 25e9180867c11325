#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;

use rlds::{CommandError, CommandRunner};

/// Answers commands with canned output and records every invocation
#[derive(Default)]
pub struct FakeRunner {
    responses: Vec<(String, Result<String, String>)>,
    calls: RefCell<Vec<String>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers every command line starting with `prefix` with `output`
    pub fn on(mut self, prefix: &str, output: &str) -> Self {
        self.responses
            .push((prefix.to_string(), Ok(output.to_string())));
        self
    }

    /// Makes every command line starting with `prefix` fail
    pub fn fail(mut self, prefix: &str, stderr: &str) -> Self {
        self.responses
            .push((prefix.to_string(), Err(stderr.to_string())));
        self
    }

    /// Command lines run so far, program and arguments joined by spaces
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Command lines that started with `prefix`
    pub fn calls_to(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<String, CommandError> {
        let line = std::iter::once(program.to_string())
            .chain(args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.borrow_mut().push(line.clone());

        match self.responses.iter().find(|(prefix, _)| line.starts_with(prefix)) {
            Some((_, Ok(output))) => Ok(output.clone()),
            Some((_, Err(stderr))) => Err(CommandError::Failed {
                program: program.to_string(),
                status: "exit status: 1".to_string(),
                stderr: stderr.clone(),
            }),
            None => Ok(String::new()),
        }
    }
}

/// Creates an empty directory unique to `name` under the system temp directory
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("rlds-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub const TWO_MONITORS: &str = "\u{1b}[01;32mOutput: \u{1b}[0;0m0 DP-1 enabled connected priority 1 DisplayPort Modes: 0:2560x1440@60 1:1920x1080@60* 2:1280x720@60 Geometry: 0,0 1920x1080 Scale: 1 Rotation: 1
\u{1b}[01;32mOutput: \u{1b}[0;0m1 HDMI-A-1 enabled connected priority 2 HDMI Modes: 0:1920x1080@60 2:2560x1440@60* 3:2560x1440@144 Geometry: 1920,0 2560x1440 Scale: 1 Rotation: 1";
