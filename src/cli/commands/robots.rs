use crate::cli::RobotsAction;
use crate::config::DorConfig;
use crate::external::ProcessCommandExecutor;
use crate::robots;
use anyhow::Result;

pub struct RobotsCommand {
    pub action: RobotsAction,
}

impl RobotsCommand {
    pub fn new(action: RobotsAction) -> Self {
        Self { action }
    }

    pub async fn execute(&self, config: &DorConfig) -> Result<()> {
        match self.action {
            RobotsAction::Status => {
                robots::robot_status(&ProcessCommandExecutor).await?;
            }
            RobotsAction::Start => robots::start_robots(config),
        }
        Ok(())
    }
}
