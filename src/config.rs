use color_eyre::eyre::eyre;
use color_eyre::Result;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use supports_color::Stream;

use crate::dataset::{Dataset, DatasetPaths};
use crate::views::{Tab, ViewOptions};
use npl_dash_cli::{Args, TabArg};

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get path to a specific config file
    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Write the commented default configuration to config.toml
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path("config.toml");

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;
        std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;

        Ok(config_path)
    }

    /// Load config.toml from this directory; a missing file yields the defaults.
    pub fn load_config(&self) -> Result<AppConfig> {
        let config_path = self.config_path("config.toml");
        let mut config = AppConfig::default();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path).map_err(|e| {
                eyre!(
                    "Failed to read config file at {}: {}",
                    config_path.display(),
                    e
                )
            })?;
            let user: AppConfig = toml::from_str(&content).map_err(|e| {
                eyre!(
                    "Failed to parse config file at {}: {}",
                    config_path.display(),
                    e
                )
            })?;
            config.merge(user);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version
    pub version: String,
    pub data: DataConfig,
    pub display: DisplayConfig,
    pub performance: PerformanceConfig,
    pub theme: ThemeConfig,
    pub logging: LoggingConfig,
    pub branding: BrandingConfig,
    pub debug: DebugConfig,
}

/// Where the five datasets live. Paths are relative to `data_dir`
/// (the working directory when unset).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub data_dir: Option<PathBuf>,
    pub batting: PathBuf,
    pub bowling: PathBuf,
    pub fielding: PathBuf,
    pub partnerships: PathBuf,
    pub final_match: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub top_n: usize,
    pub preview_rows: usize,
    pub final_preview_rows: usize,
    pub top_batsmen: usize,
    pub sidebar_width: u16,
    pub start_tab: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub event_poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub colors: ColorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub primary: String,
    pub secondary: String,
    pub error: String,
    pub warning: String,
    pub dimmed: String,
    pub controls_bg: String,
    pub text_primary: String,
    pub text_secondary: String,
    pub table_header: String,
    pub table_border: String,
    pub tab_active: String,
    pub sidebar_border: String,
    pub sidebar_selected: String,
    pub chart_axis: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    /// off, error, warn, info, debug or trace
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandingConfig {
    pub title: String,
    pub sidebar_title: String,
    pub tagline: String,
    pub image_url: Option<String>,
    pub caption: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            data: DataConfig::default(),
            display: DisplayConfig::default(),
            performance: PerformanceConfig::default(),
            theme: ThemeConfig::default(),
            logging: LoggingConfig::default(),
            branding: BrandingConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            batting: Dataset::Batting.default_path(),
            bowling: Dataset::Bowling.default_path(),
            fielding: Dataset::Fielding.default_path(),
            partnerships: Dataset::Partnerships.default_path(),
            final_match: Dataset::FinalMatch.default_path(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            preview_rows: 10,
            final_preview_rows: 100,
            top_batsmen: 6,
            sidebar_width: 32,
            start_tab: "batting".to_string(),
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            event_poll_interval_ms: 25,
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            colors: ColorConfig::default(),
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            primary: "cyan".to_string(),
            secondary: "yellow".to_string(),
            error: "red".to_string(),
            warning: "yellow".to_string(),
            dimmed: "dark_gray".to_string(),
            controls_bg: "indexed(236)".to_string(),
            text_primary: "white".to_string(),
            text_secondary: "dark_gray".to_string(),
            table_header: "white".to_string(),
            table_border: "cyan".to_string(),
            tab_active: "yellow".to_string(),
            sidebar_border: "cyan".to_string(),
            sidebar_selected: "yellow".to_string(),
            chart_axis: "white".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
        }
    }
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            title: "Nepal Premier League 2024 Dashboard".to_string(),
            sidebar_title: "NPL 2024 Interactive Dashboard".to_string(),
            tagline: "Filter and explore the stats!".to_string(),
            image_url: Some(
                "https://wicketnepal.com/wp-content/uploads/2024/11/468719762_122127843350455690_7601835368897814823_n.jpg"
                    .to_string(),
            ),
            caption: "Developed by Sangam Paudel | Nepal Premier League 2024 Dashboard"
                .to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from all layers (default → user)
    pub fn load(app_name: &str) -> Result<Self> {
        match ConfigManager::new(app_name) {
            Ok(manager) => manager.load_config(),
            Err(_) => Ok(AppConfig::default()),
        }
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }

        self.data.merge(other.data);
        self.display.merge(other.display);
        self.performance.merge(other.performance);
        self.theme.merge(other.theme);
        self.logging.merge(other.logging);
        self.branding.merge(other.branding);
        self.debug.merge(other.debug);
    }

    /// Command-line values override whatever the config file said.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(dir) = &args.data_dir {
            self.data.data_dir = Some(dir.clone());
        }
        if let Some(tab) = args.tab {
            self.display.start_tab = match tab {
                TabArg::Batting => "batting",
                TabArg::Bowling => "bowling",
                TabArg::Fielding => "fielding",
                TabArg::Partnerships => "partnerships",
                TabArg::Final => "final",
            }
            .to_string();
        }
        if args.debug {
            self.debug.enabled = true;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.1") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.1.x",
                self.version
            ));
        }

        if self.display.top_n == 0 {
            return Err(eyre!("top_n must be greater than 0"));
        }

        if self.performance.event_poll_interval_ms == 0 {
            return Err(eyre!("event_poll_interval_ms must be greater than 0"));
        }

        if TabArg::from_name(&self.display.start_tab).is_none() {
            return Err(eyre!(
                "Invalid start_tab: {}. Must be one of batting, bowling, fielding, partnerships, final",
                self.display.start_tab
            ));
        }

        self.logging
            .level
            .parse::<log::LevelFilter>()
            .map_err(|_| eyre!("Invalid logging level: {}", self.logging.level))?;

        let parser = ColorParser::new();
        self.theme.colors.validate(&parser)?;

        Ok(())
    }

    pub fn dataset_paths(&self) -> DatasetPaths {
        let base = self.data.data_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        DatasetPaths::new(base)
            .with(Dataset::Batting, self.data.batting.clone())
            .with(Dataset::Bowling, self.data.bowling.clone())
            .with(Dataset::Fielding, self.data.fielding.clone())
            .with(Dataset::Partnerships, self.data.partnerships.clone())
            .with(Dataset::FinalMatch, self.data.final_match.clone())
    }

    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            top_n: self.display.top_n,
            preview_rows: self.display.preview_rows,
            final_preview_rows: self.display.final_preview_rows,
            top_batsmen: self.display.top_batsmen,
        }
    }

    pub fn start_tab(&self) -> Tab {
        TabArg::from_name(&self.display.start_tab)
            .map(Tab::from)
            .unwrap_or_default()
    }
}

impl DataConfig {
    pub fn merge(&mut self, other: Self) {
        let default = DataConfig::default();
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        if other.batting != default.batting {
            self.batting = other.batting;
        }
        if other.bowling != default.bowling {
            self.bowling = other.bowling;
        }
        if other.fielding != default.fielding {
            self.fielding = other.fielding;
        }
        if other.partnerships != default.partnerships {
            self.partnerships = other.partnerships;
        }
        if other.final_match != default.final_match {
            self.final_match = other.final_match;
        }
    }
}

impl DisplayConfig {
    pub fn merge(&mut self, other: Self) {
        let default = DisplayConfig::default();
        if other.top_n != default.top_n {
            self.top_n = other.top_n;
        }
        if other.preview_rows != default.preview_rows {
            self.preview_rows = other.preview_rows;
        }
        if other.final_preview_rows != default.final_preview_rows {
            self.final_preview_rows = other.final_preview_rows;
        }
        if other.top_batsmen != default.top_batsmen {
            self.top_batsmen = other.top_batsmen;
        }
        if other.sidebar_width != default.sidebar_width {
            self.sidebar_width = other.sidebar_width;
        }
        if other.start_tab != default.start_tab {
            self.start_tab = other.start_tab;
        }
    }
}

impl PerformanceConfig {
    pub fn merge(&mut self, other: Self) {
        let default = PerformanceConfig::default();
        if other.event_poll_interval_ms != default.event_poll_interval_ms {
            self.event_poll_interval_ms = other.event_poll_interval_ms;
        }
    }
}

impl ThemeConfig {
    pub fn merge(&mut self, other: Self) {
        self.colors.merge(other.colors);
    }
}

impl ColorConfig {
    fn fields(&self) -> [(&'static str, &String); 14] {
        [
            ("primary", &self.primary),
            ("secondary", &self.secondary),
            ("error", &self.error),
            ("warning", &self.warning),
            ("dimmed", &self.dimmed),
            ("controls_bg", &self.controls_bg),
            ("text_primary", &self.text_primary),
            ("text_secondary", &self.text_secondary),
            ("table_header", &self.table_header),
            ("table_border", &self.table_border),
            ("tab_active", &self.tab_active),
            ("sidebar_border", &self.sidebar_border),
            ("sidebar_selected", &self.sidebar_selected),
            ("chart_axis", &self.chart_axis),
        ]
    }

    fn validate(&self, parser: &ColorParser) -> Result<()> {
        for (name, value) in self.fields() {
            parser
                .parse(value)
                .map_err(|e| eyre!("Invalid color value for '{}': {}", name, e))?;
        }
        Ok(())
    }

    pub fn merge(&mut self, other: Self) {
        let default = ColorConfig::default();
        macro_rules! take_changed {
            ($($field:ident),*) => {
                $(
                    if other.$field != default.$field {
                        self.$field = other.$field;
                    }
                )*
            };
        }
        take_changed!(
            primary,
            secondary,
            error,
            warning,
            dimmed,
            controls_bg,
            text_primary,
            text_secondary,
            table_header,
            table_border,
            tab_active,
            sidebar_border,
            sidebar_selected,
            chart_axis
        );
    }
}

impl LoggingConfig {
    pub fn merge(&mut self, other: Self) {
        let default = LoggingConfig::default();
        if other.enabled != default.enabled {
            self.enabled = other.enabled;
        }
        if other.level != default.level {
            self.level = other.level;
        }
    }

    /// Effective log level; `--debug` raises it to at least debug.
    pub fn level_filter(&self, debug: bool) -> log::LevelFilter {
        let configured = self.level.parse().unwrap_or(log::LevelFilter::Info);
        if debug {
            configured.max(log::LevelFilter::Debug)
        } else {
            configured
        }
    }
}

impl BrandingConfig {
    pub fn merge(&mut self, other: Self) {
        let default = BrandingConfig::default();
        if other.title != default.title {
            self.title = other.title;
        }
        if other.sidebar_title != default.sidebar_title {
            self.sidebar_title = other.sidebar_title;
        }
        if other.tagline != default.tagline {
            self.tagline = other.tagline;
        }
        if other.image_url != default.image_url {
            self.image_url = other.image_url;
        }
        if other.caption != default.caption {
            self.caption = other.caption;
        }
    }
}

impl DebugConfig {
    pub fn merge(&mut self, other: Self) {
        if other.enabled {
            self.enabled = true;
        }
    }
}

/// Color parser with terminal capability detection
#[derive(Debug, Clone, Copy)]
pub struct ColorParser {
    supports_true_color: bool,
    supports_256: bool,
    no_color: bool,
}

impl ColorParser {
    /// Create a new ColorParser with automatic terminal capability detection
    pub fn new() -> Self {
        let no_color = std::env::var("NO_COLOR").is_ok();
        let support = supports_color::on(Stream::Stdout);

        Self {
            supports_true_color: support.as_ref().map(|s| s.has_16m).unwrap_or(false),
            supports_256: support.as_ref().map(|s| s.has_256).unwrap_or(false),
            no_color,
        }
    }

    /// Parse a color string (hex, indexed(n) or named) into a terminal color
    pub fn parse(&self, s: &str) -> Result<Color> {
        if self.no_color {
            return Ok(Color::Reset);
        }

        let trimmed = s.trim();

        if trimmed.starts_with('#') && trimmed.len() == 7 {
            let (r, g, b) = parse_hex(trimmed)?;
            return Ok(self.rgb(r, g, b));
        }

        if trimmed.to_lowercase().starts_with("indexed(") && trimmed.ends_with(')') {
            let num_str = &trimmed[8..trimmed.len() - 1];
            let num = num_str.parse::<u8>().map_err(|_| {
                eyre!(
                    "Invalid indexed color: '{}'. Expected format: indexed(0-255)",
                    trimmed
                )
            })?;
            return Ok(Color::Indexed(num));
        }

        match trimmed.to_lowercase().as_str() {
            "black" => Ok(Color::Black),
            "red" => Ok(Color::Red),
            "green" => Ok(Color::Green),
            "yellow" => Ok(Color::Yellow),
            "blue" => Ok(Color::Blue),
            "magenta" => Ok(Color::Magenta),
            "cyan" => Ok(Color::Cyan),
            "white" => Ok(Color::White),
            "gray" | "grey" | "dark_gray" | "dark_grey" => Ok(Color::Indexed(8)),
            "light_gray" | "light_grey" => Ok(Color::Indexed(7)),
            "reset" => Ok(Color::Reset),
            _ => Err(eyre!(
                "Unknown color name: '{}'. Supported: basic ANSI colors (red, blue, etc.), \
                 indexed(0-255), or hex colors (#ff0000)",
                trimmed
            )),
        }
    }

    /// Convert RGB values to the best color the terminal can show
    pub fn rgb(&self, r: u8, g: u8, b: u8) -> Color {
        if self.no_color {
            Color::Reset
        } else if self.supports_true_color {
            Color::Rgb(r, g, b)
        } else if self.supports_256 {
            Color::Indexed(rgb_to_256_color(r, g, b))
        } else {
            rgb_to_basic_ansi(r, g, b)
        }
    }
}

impl Default for ColorParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse hex color string (#ff0000) to RGB components
pub fn parse_hex(s: &str) -> Result<(u8, u8, u8)> {
    if !s.starts_with('#') || s.len() != 7 {
        return Err(eyre!(
            "Invalid hex color format: '{}'. Expected format: #rrggbb",
            s
        ));
    }

    let component = |range: std::ops::Range<usize>, name: &str| {
        s.get(range)
            .and_then(|hex| u8::from_str_radix(hex, 16).ok())
            .ok_or_else(|| eyre!("Invalid {} component in hex color: {}", name, s))
    };

    Ok((
        component(1..3, "red")?,
        component(3..5, "green")?,
        component(5..7, "blue")?,
    ))
}

/// Convert RGB to nearest index of the xterm 256-color palette
pub fn rgb_to_256_color(r: u8, g: u8, b: u8) -> u8 {
    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 10 {
        let gray = (r as u16 + g as u16 + b as u16) / 3;
        if gray < 8 {
            return 16;
        } else if gray > 247 {
            return 231;
        } else {
            return 232 + ((gray - 8) * 24 / 240) as u8;
        }
    }

    let r_idx = (r as u16 * 5 / 255) as u8;
    let g_idx = (g as u16 * 5 / 255) as u8;
    let b_idx = (b as u16 * 5 / 255) as u8;

    16 + 36 * r_idx + 6 * g_idx + b_idx
}

/// Convert RGB to nearest basic ANSI color (8 colors)
pub fn rgb_to_basic_ansi(r: u8, g: u8, b: u8) -> Color {
    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 30 {
        let avg = (r as u16 + g as u16 + b as u16) / 3;
        return if avg < 64 { Color::Black } else { Color::White };
    }

    match (r > 128, g > 128, b > 128) {
        (false, false, false) => Color::Black,
        (true, false, false) => Color::Red,
        (false, true, false) => Color::Green,
        (true, true, false) => Color::Yellow,
        (false, false, true) => Color::Blue,
        (true, false, true) => Color::Magenta,
        (false, true, true) => Color::Cyan,
        (true, true, true) => Color::White,
    }
}

/// Theme containing parsed colors ready for use
#[derive(Debug, Clone)]
pub struct Theme {
    pub colors: HashMap<String, Color>,
    parser: ColorParser,
}

impl Theme {
    /// Create a Theme from a ThemeConfig by parsing all color strings
    pub fn from_config(config: &ThemeConfig) -> Result<Self> {
        let parser = ColorParser::new();
        let mut colors = HashMap::new();
        for (name, value) in config.colors.fields() {
            colors.insert(name.to_string(), parser.parse(value)?);
        }
        Ok(Self { colors, parser })
    }

    /// Get a color by name, returns Reset if not found
    pub fn get(&self, name: &str) -> Color {
        self.colors.get(name).copied().unwrap_or(Color::Reset)
    }

    /// Terminal color for an RGB triple (chart color scales).
    pub fn rgb(&self, (r, g, b): (u8, u8, u8)) -> Color {
        self.parser.rgb(r, g, b)
    }

    /// Parse a hex/named color, falling back to the primary color.
    pub fn parse_or_primary(&self, s: &str) -> Color {
        self.parser.parse(s).unwrap_or_else(|_| self.get("primary"))
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config(&ThemeConfig::default()).unwrap_or_else(|_| Self {
            colors: HashMap::new(),
            parser: ColorParser::new(),
        })
    }
}

// Default configuration template
const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../config/default.toml");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        AppConfig::default().validate().unwrap();
    }

    #[test]
    fn test_default_template_parses() {
        let config: AppConfig = toml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.display.top_n, 10);
        assert_eq!(config.data.batting, PathBuf::from("Batting Records/most_runs.csv"));
    }

    #[test]
    fn test_merge_only_takes_changed_values() {
        let mut base = AppConfig::default();
        base.display.preview_rows = 25;
        let mut other = AppConfig::default();
        other.display.top_n = 5;
        base.merge(other);
        assert_eq!(base.display.top_n, 5);
        assert_eq!(base.display.preview_rows, 25);
    }

    #[test]
    fn test_invalid_start_tab_rejected() {
        let mut config = AppConfig::default();
        config.display.start_tab = "umpires".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_level_filter_debug_override() {
        let logging = LoggingConfig {
            enabled: true,
            level: "warn".to_string(),
        };
        assert_eq!(logging.level_filter(false), log::LevelFilter::Warn);
        assert_eq!(logging.level_filter(true), log::LevelFilter::Debug);
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#ff6f61").unwrap(), (255, 111, 97));
        assert!(parse_hex("ff6f61").is_err());
        assert!(parse_hex("#gg0000").is_err());
    }
}
