use crate::output::{Output, OutputFormat};
use anyhow::Context;
use recfeed_core::{CatalogView, Episode, EpisodeRecord, RecommenderCore};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use uuid::Uuid;

/// Load a catalog fixture: a JSON array of [`EpisodeRecord`]s, validated
/// against `dimension` the same way any production ingestion path would be.
pub fn load_catalog(path: &Path, dimension: usize) -> anyhow::Result<CatalogView> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog file: {}", path.display()))?;
    let records: Vec<EpisodeRecord> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse catalog file: {}", path.display()))?;
    Ok(CatalogView::load(records, dimension))
}

#[derive(Debug, Serialize)]
struct Categories(Vec<String>);

impl Output for Categories {
    fn write_human<W: Write>(&self, mut writer: W) -> anyhow::Result<()> {
        for category in &self.0 {
            writeln!(writer, "{category}")?;
        }
        Ok(())
    }
}

pub fn handle_categories_command(core: &RecommenderCore, format: OutputFormat) -> anyhow::Result<()> {
    format.print(&Categories(core.categories()))
}

impl Output for Episode {
    fn write_human<W: Write>(&self, mut writer: W) -> anyhow::Result<()> {
        writeln!(writer, "{} - {}", self.id, self.series_name)?;
        writeln!(writer, "  published:   {}", self.published_at)?;
        writeln!(writer, "  credibility: {}  insight: {}", self.credibility, self.insight)?;
        writeln!(writer, "  categories:  {}", self.categories.join(", "))?;
        Ok(())
    }
}

pub fn handle_episode_command(core: &RecommenderCore, id: Uuid, format: OutputFormat) -> anyhow::Result<()> {
    let episode = core
        .episode(id)
        .ok_or_else(|| anyhow::anyhow!("no episode with id {id} in the catalog"))?;
    format.print(episode.as_ref())
}
