//! Drives a scripted session lifecycle (S1-S4) against a loaded catalog
//! within a single process - the session pool and engagement log are
//! in-memory only, so there is no notion of a CLI invocation "reconnecting"
//! to state from an earlier one. A scenario file is the unit of a demo or an
//! e2e run: it names a user and a sequence of steps to execute in order.

use crate::output::{Output, OutputFormat};
use anyhow::Context;
use chrono::Utc;
use recfeed_core::{EngagementType, RecommenderCore};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct Scenario {
    #[serde(default = "Uuid::new_v4")]
    user_id: Uuid,
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum Step {
    CreateSession {
        #[serde(default)]
        category_interests: Vec<String>,
        #[serde(default)]
        excluded: Vec<Uuid>,
    },
    LoadMore {
        n: usize,
    },
    AppendEngagement {
        episode_id: Uuid,
        kind: EngagementKind,
    },
    Refresh {
        #[serde(default)]
        category_interests: Vec<String>,
        #[serde(default)]
        excluded: Vec<Uuid>,
    },
    Reset,
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(rename_all = "snake_case")]
enum EngagementKind {
    View,
    Bookmark,
    Dismiss,
}

impl From<EngagementKind> for EngagementType {
    fn from(kind: EngagementKind) -> Self {
        match kind {
            EngagementKind::View => EngagementType::View,
            EngagementKind::Bookmark => EngagementType::Bookmark,
            EngagementKind::Dismiss => EngagementType::Dismiss,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
enum StepOutcome {
    CreateSession {
        session_id: Uuid,
        cold_start: bool,
        first_page: Vec<Uuid>,
        shown_count: usize,
        remaining_count: usize,
        candidates_considered: usize,
        contributing_engagements: usize,
    },
    LoadMore {
        episodes: Vec<Uuid>,
        shown_count: usize,
        remaining_count: usize,
    },
    AppendEngagement {
        episode_id: Uuid,
    },
    Refresh {
        session_id: Uuid,
        first_page: Vec<Uuid>,
    },
    Reset,
}

impl Output for StepOutcome {
    fn write_human<W: Write>(&self, mut writer: W) -> anyhow::Result<()> {
        match self {
            Self::CreateSession {
                session_id,
                cold_start,
                first_page,
                shown_count,
                remaining_count,
                candidates_considered,
                contributing_engagements,
            } => {
                writeln!(writer, "create_session -> {session_id} (cold_start={cold_start})")?;
                writeln!(writer, "  page:      {first_page:?}")?;
                writeln!(writer, "  shown={shown_count} remaining={remaining_count}")?;
                writeln!(
                    writer,
                    "  debug: candidates_considered={candidates_considered} contributing_engagements={contributing_engagements}"
                )?;
            }
            Self::LoadMore {
                episodes,
                shown_count,
                remaining_count,
            } => {
                writeln!(writer, "load_more -> {episodes:?}")?;
                writeln!(writer, "  shown={shown_count} remaining={remaining_count}")?;
            }
            Self::AppendEngagement { episode_id } => {
                writeln!(writer, "append_engagement -> {episode_id}")?;
            }
            Self::Refresh { session_id, first_page } => {
                writeln!(writer, "refresh -> {session_id}")?;
                writeln!(writer, "  page: {first_page:?}")?;
            }
            Self::Reset => {
                writeln!(writer, "reset")?;
            }
        }
        Ok(())
    }
}

pub async fn handle_scenario_command(
    core: &RecommenderCore,
    scenario_path: &Path,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(scenario_path)
        .with_context(|| format!("failed to read scenario file: {}", scenario_path.display()))?;
    let scenario: Scenario = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse scenario file: {}", scenario_path.display()))?;

    let mut session_id: Option<Uuid> = None;
    for step in scenario.steps {
        let now = Utc::now();
        let outcome = match step {
            Step::CreateSession {
                category_interests,
                excluded,
            } => {
                let excluded: HashSet<Uuid> = excluded.into_iter().collect();
                let created = core
                    .create_session(scenario.user_id, &category_interests, &excluded, now)
                    .await?;
                session_id = Some(created.session_id);
                StepOutcome::CreateSession {
                    session_id: created.session_id,
                    cold_start: created.cold_start,
                    first_page: created.first_page.iter().map(|e| e.episode_id).collect(),
                    shown_count: created.shown_count,
                    remaining_count: created.remaining_count,
                    candidates_considered: created.debug.candidates_considered,
                    contributing_engagements: created.debug.contributing_engagements,
                }
            }
            Step::LoadMore { n } => {
                let id = session_id.context("load_more requires a prior create_session or refresh step")?;
                let page = core.load_more(id, n, now)?;
                StepOutcome::LoadMore {
                    episodes: page.episodes.iter().map(|e| e.episode_id).collect(),
                    shown_count: page.shown_count,
                    remaining_count: page.remaining_count,
                }
            }
            Step::AppendEngagement { episode_id, kind } => {
                core.append_engagement(scenario.user_id, episode_id, kind.into(), now);
                StepOutcome::AppendEngagement { episode_id }
            }
            Step::Refresh {
                category_interests,
                excluded,
            } => {
                let excluded: HashSet<Uuid> = excluded.into_iter().collect();
                let created = core
                    .refresh(scenario.user_id, &category_interests, &excluded, now)
                    .await?;
                session_id = Some(created.session_id);
                StepOutcome::Refresh {
                    session_id: created.session_id,
                    first_page: created.first_page.iter().map(|e| e.episode_id).collect(),
                }
            }
            Step::Reset => {
                core.reset_engagements(scenario.user_id);
                session_id = None;
                StepOutcome::Reset
            }
        };
        format.print(&outcome)?;
    }

    Ok(())
}
