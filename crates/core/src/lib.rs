pub mod analysis;
pub mod chart;
pub mod domain;
pub mod error;
pub mod llm;
pub mod report;
pub mod service;
pub mod storage;
pub mod style;
pub mod time;

pub mod config {
    use anyhow::{ensure, Context};
    use std::ops::RangeInclusive;
    use std::path::PathBuf;

    const DEFAULT_REPORTS_DIR: &str = "reports";
    const DEFAULT_REPORT_PREFIX: &str = "market_study";
    const DEFAULT_PORT: u16 = 5000;
    const DEFAULT_CHART_DPI: u32 = 150;
    pub const CHART_DPI_RANGE: RangeInclusive<u32> = 30..=600;

    #[derive(Debug, Clone, Default)]
    pub struct Settings {
        pub reports_dir: Option<String>,
        pub report_prefix: Option<String>,
        pub chart_dpi: Option<u32>,
        pub port: Option<u16>,
        pub sentry_dsn: Option<String>,
        pub ollama_host: Option<String>,
        pub ollama_model: Option<String>,
        pub ollama_timeout_secs: Option<u64>,
        pub ollama_temperature: Option<f32>,
        pub ollama_top_p: Option<f32>,
        pub ollama_max_tokens: Option<u32>,
        pub use_llm: bool,
    }

    fn parse_var<T>(key: &str) -> anyhow::Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match std::env::var(key) {
            Ok(s) if !s.trim().is_empty() => {
                let value = s
                    .trim()
                    .parse::<T>()
                    .with_context(|| format!("{key} has an invalid value ({s:?})"))?;
                Ok(Some(value))
            }
            _ => Ok(None),
        }
    }

    fn check_chart_dpi(dpi: Option<u32>) -> anyhow::Result<Option<u32>> {
        if let Some(dpi) = dpi {
            ensure!(
                CHART_DPI_RANGE.contains(&dpi),
                "CHART_DPI must be within {}..={} (got {dpi})",
                CHART_DPI_RANGE.start(),
                CHART_DPI_RANGE.end()
            );
        }
        Ok(dpi)
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                reports_dir: std::env::var("REPORTS_DIR").ok(),
                report_prefix: std::env::var("REPORT_PREFIX").ok(),
                chart_dpi: check_chart_dpi(parse_var("CHART_DPI")?)?,
                port: parse_var("PORT")?,
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                ollama_host: std::env::var("OLLAMA_HOST").ok(),
                ollama_model: std::env::var("OLLAMA_MODEL").ok(),
                ollama_timeout_secs: parse_var("OLLAMA_TIMEOUT_SECS")?,
                ollama_temperature: parse_var("OLLAMA_TEMPERATURE")?,
                ollama_top_p: parse_var("OLLAMA_TOP_P")?,
                ollama_max_tokens: parse_var("OLLAMA_MAX_TOKENS")?,
                use_llm: std::env::var("USE_LLM")
                    .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                    .unwrap_or(false),
            })
        }

        pub fn reports_dir(&self) -> PathBuf {
            PathBuf::from(
                self.reports_dir
                    .as_deref()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or(DEFAULT_REPORTS_DIR),
            )
        }

        pub fn report_prefix(&self) -> &str {
            self.report_prefix
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(DEFAULT_REPORT_PREFIX)
        }

        pub fn port(&self) -> u16 {
            self.port.unwrap_or(DEFAULT_PORT)
        }

        /// Chart resolution, clamped to [`CHART_DPI_RANGE`]. Zero means unset.
        pub fn chart_dpi(&self) -> u32 {
            self.chart_dpi
                .filter(|d| *d > 0)
                .map_or(DEFAULT_CHART_DPI, |d| {
                    d.clamp(*CHART_DPI_RANGE.start(), *CHART_DPI_RANGE.end())
                })
        }

        /// Creates the reports directory if needed and returns it.
        pub fn ensure_reports_dir(&self) -> anyhow::Result<PathBuf> {
            let dir = self.reports_dir();
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create reports directory {}", dir.display()))?;
            Ok(dir)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn defaults_apply_when_unset() {
            let settings = Settings::default();
            assert_eq!(settings.reports_dir(), PathBuf::from("reports"));
            assert_eq!(settings.report_prefix(), "market_study");
            assert_eq!(settings.port(), 5000);
            assert_eq!(settings.chart_dpi(), 150);
        }

        #[test]
        fn blank_values_fall_back_to_defaults() {
            let settings = Settings {
                reports_dir: Some("  ".to_string()),
                report_prefix: Some(" ".to_string()),
                ..Settings::default()
            };
            assert_eq!(settings.reports_dir(), PathBuf::from("reports"));
            assert_eq!(settings.report_prefix(), "market_study");
        }

        #[test]
        fn chart_dpi_is_bounded() {
            let dpi = |v: u32| {
                Settings {
                    chart_dpi: Some(v),
                    ..Settings::default()
                }
                .chart_dpi()
            };
            assert_eq!(dpi(0), 150);
            assert_eq!(dpi(5), 30);
            assert_eq!(dpi(40), 40);
            assert_eq!(dpi(10_000), 600);

            assert!(check_chart_dpi(Some(10_000)).is_err());
            assert!(check_chart_dpi(Some(0)).is_err());
            assert_eq!(check_chart_dpi(Some(300)).unwrap(), Some(300));
            assert_eq!(check_chart_dpi(None).unwrap(), None);
        }
    }
}
