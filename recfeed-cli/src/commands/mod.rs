mod catalog;
mod health;
mod session;

pub use catalog::{handle_categories_command, handle_episode_command, load_catalog};
pub use health::handle_health_command;
pub use session::handle_scenario_command;
