use crate::output::{Output, OutputFormat};
use recfeed_core::{Health, RecommenderCore};
use std::io::Write;

impl Output for Health {
    fn write_human<W: Write>(&self, mut writer: W) -> anyhow::Result<()> {
        writeln!(writer, "catalog size:   {}", self.catalog_size)?;
        writeln!(writer, "quality faults: {}", self.fault_count)?;
        writeln!(writer, "live sessions:  {}", self.live_sessions)?;
        Ok(())
    }
}

pub fn handle_health_command(core: &RecommenderCore, format: OutputFormat) -> anyhow::Result<()> {
    format.print(&core.health())
}
