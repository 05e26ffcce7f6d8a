use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, one-line-per-fact output
    Human,
    /// JSON output for scripting
    Json,
}

pub trait Output {
    fn write_human<W: Write>(&self, writer: W) -> anyhow::Result<()>;

    fn write_json<W: Write>(&self, writer: W) -> anyhow::Result<()>
    where
        Self: Serialize,
    {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    fn write<W: Write>(&self, writer: W, format: OutputFormat) -> anyhow::Result<()>
    where
        Self: Serialize,
    {
        match format {
            OutputFormat::Human => self.write_human(writer),
            OutputFormat::Json => self.write_json(writer),
        }
    }
}

impl OutputFormat {
    pub fn print<T: Output + Serialize>(self, data: &T) -> anyhow::Result<()> {
        data.write(io::stdout(), self)?;
        if self == OutputFormat::Json {
            println!();
        }
        Ok(())
    }
}
