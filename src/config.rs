use crate::error::{config_error, env_error, SkillResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

/// Default Google Calendar REST endpoint
pub const DEFAULT_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
/// Reference timezone used when none is configured
pub const DEFAULT_TIMEZONE: &str = "America/Los_Angeles";
/// Service account key file used when none is configured
pub const DEFAULT_SERVICE_ACCOUNT_FILE: &str = "creds.json";
/// Optional configuration file
pub const DEFAULT_CONFIG_FILE: &str = "config/skill.toml";
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_LIST_PAGES: usize = 50;

/// Main configuration structure for the skill
#[derive(Debug, Clone)]
pub struct Config {
    /// The one calendar every operation works against
    pub google_calendar_id: String,
    /// Path to the Google service account key
    pub service_account_file: String,
    /// Static bearer token, bypasses the service account flow
    pub google_access_token: Option<String>,
    /// Base URL of the Calendar REST API
    pub calendar_api_base: String,
    /// Reference timezone for slot values and spoken times
    pub timezone: Tz,
    /// Upper bound on pages fetched by a single listing
    pub max_list_pages: usize,
    /// Address the skill endpoint listens on
    pub listen_addr: String,
    /// Expected application id of incoming requests
    pub skill_id: Option<String>,
}

/// Values that may be provided through the TOML file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub google_calendar_id: Option<String>,
    pub service_account_file: Option<String>,
    pub calendar_api_base: Option<String>,
    pub timezone: Option<String>,
    pub max_list_pages: Option<usize>,
    pub listen_addr: Option<String>,
    pub skill_id: Option<String>,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> SkillResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let path = env::var("SKILL_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let file = Self::read_file(Path::new(&path))?;

        Self::from_sources(file, |key| env::var(key).ok())
    }

    /// Read the optional TOML file, a missing file is not an error
    pub fn read_file(path: &Path) -> SkillResult<FileConfig> {
        if !path.exists() {
            return Ok(FileConfig::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Merge defaults, file values and variables, variables win
    pub fn from_sources<F>(file: FileConfig, var: F) -> SkillResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let google_calendar_id = var("GOOGLE_CALENDAR_ID")
            .or(file.google_calendar_id)
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| env_error("GOOGLE_CALENDAR_ID"))?;

        let service_account_file = var("GOOGLE_SERVICE_ACCOUNT_FILE")
            .or(file.service_account_file)
            .unwrap_or_else(|| DEFAULT_SERVICE_ACCOUNT_FILE.to_string());

        let google_access_token = var("GOOGLE_ACCESS_TOKEN").filter(|t| !t.is_empty());

        let calendar_api_base = var("CALENDAR_API_BASE")
            .or(file.calendar_api_base)
            .unwrap_or_else(|| DEFAULT_CALENDAR_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let timezone_name = var("TIMEZONE")
            .or(file.timezone)
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let timezone: Tz = timezone_name
            .parse()
            .map_err(|_| config_error(&format!("Unknown timezone: {}", timezone_name)))?;

        let max_list_pages = match var("MAX_LIST_PAGES") {
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|_| config_error(&format!("Invalid MAX_LIST_PAGES: {}", raw)))?,
            None => file.max_list_pages.unwrap_or(DEFAULT_MAX_LIST_PAGES),
        };
        if max_list_pages == 0 {
            return Err(config_error("MAX_LIST_PAGES must be at least 1"));
        }

        let listen_addr = var("SKILL_ADDR")
            .or(file.listen_addr)
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());

        let skill_id = var("SKILL_ID").or(file.skill_id).filter(|id| !id.is_empty());

        Ok(Config {
            google_calendar_id,
            service_account_file,
            google_access_token,
            calendar_api_base,
            timezone,
            max_list_pages,
            listen_addr,
            skill_id,
        })
    }
}
