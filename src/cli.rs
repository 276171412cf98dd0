use crate::constants::validation::{MAX_YEAR, MIN_YEAR};
use chrono::{Datelike, Utc};
use clap::Parser;
use clap::builder::styling::{AnsiColor, Effects, Styles};

fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .usage(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Yellow.on_default())
        .error(AnsiColor::Red.on_default().effects(Effects::BOLD))
        .valid(AnsiColor::Green.on_default())
        .invalid(AnsiColor::Red.on_default())
}

/// BSM structure extractor
///
/// Fetches all matches of every configured organization for one season
/// and writes the league/team/club structure to data/bsm-structure-<YEAR>.json.
///
/// Paths, delays and the API domain are read from config/settings.toml
/// and BSM_* environment variables.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(styles = get_styles())]
pub struct Args {
    /// Season to extract. Defaults to the current year.
    #[arg(value_parser = clap::value_parser!(i32).range(MIN_YEAR as i64..=MAX_YEAR as i64))]
    pub year: Option<i32>,
}

impl Args {
    /// The requested season, or the current UTC year.
    pub fn resolve_year(&self) -> i32 {
        self.year.unwrap_or_else(|| Utc::now().year())
    }
}
