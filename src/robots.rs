//! Status of the assembly and accession robots on this host.

use crate::config::DorConfig;
use crate::external::CommandExecutor;
use crate::workflows::{ACCESSION_WF, ASSEMBLY_WF};
use anyhow::{bail, Result};

const ACCESSION_ROBOT_STEPS: [&str; 8] = [
    "content-metadata",
    "descriptive-metadata",
    "rights-metadata",
    "remediate-object",
    "publish",
    "shelve",
    "provenance-metadata",
    "cleanup",
];

const ASSEMBLY_ROBOT_STEPS: [&str; 4] = ["jp2-create", "checksum-compute", "exif-collect", "accessioning-initiate"];

/// Processes seen for one workflow's robots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotState {
    pub workflow: &'static str,
    pub processes: usize,
    pub running: bool,
}

impl RobotState {
    pub fn describe(&self) -> String {
        let label = if self.workflow == ACCESSION_WF { "Accession" } else { "Assembly" };
        let state = if self.running { "running" } else { "NOT running" };
        format!("{label} robots are {state}")
    }
}

/// Lines of a process listing that mention `needle`
pub fn count_processes(listing: &str, needle: &str) -> usize {
    listing.lines().filter(|line| line.contains(needle)).count()
}

/// Accession robots count as up once two processes mention the workflow,
/// assembly robots once one does.
pub fn robot_states(listing: &str) -> [RobotState; 2] {
    let accession = count_processes(listing, ACCESSION_WF);
    let assembly = count_processes(listing, ASSEMBLY_WF);
    [
        RobotState {
            workflow: ACCESSION_WF,
            processes: accession,
            running: accession >= 2,
        },
        RobotState {
            workflow: ASSEMBLY_WF,
            processes: assembly,
            running: assembly >= 1,
        },
    ]
}

/// Inspect `ps -ef` on this host and print whether the robots are up
pub async fn robot_status(executor: &dyn CommandExecutor) -> Result<[RobotState; 2]> {
    let output = executor.execute("ps", &["-ef"]).await?;
    if !output.success() {
        bail!("ps failed (exit {}): {}", output.status_code, output.stderr.trim());
    }

    let host = hostname::get()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "this host".to_string());
    println!("Robots on {host}:");

    let states = robot_states(&output.stdout);
    for state in &states {
        println!("{}", state.describe());
    }
    Ok(states)
}

fn start_command(root: &str, environment: &str, workflow: &str, steps: &[&str]) -> String {
    let steps = steps
        .iter()
        .map(|step| format!("{workflow}:{step}"))
        .collect::<Vec<_>>()
        .join(" ");
    format!("cd {root}; ROBOT_ENVIRONMENT={environment} ./bin/run_robot start {steps}")
}

/// Shell commands that start the robots for the configured environment
pub fn start_commands(config: &DorConfig) -> [String; 2] {
    let environment = config.environment.as_str();
    [
        start_command(&config.robots.accession_root, environment, ACCESSION_WF, &ACCESSION_ROBOT_STEPS),
        start_command(&config.robots.assembly_root, environment, ASSEMBLY_WF, &ASSEMBLY_ROBOT_STEPS),
    ]
}

/// Print the start commands; nothing is run
pub fn start_robots(config: &DorConfig) {
    println!("To start robots:");
    for command in start_commands(config) {
        println!("{command}");
    }
}
