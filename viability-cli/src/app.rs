//! Command implementations shared by the binary and its tests.
//!
//! Every command returns the text to print; `main` owns stdout.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{debug, info, warn};
use viability_ai::{GeminiConfig, GeminiReporter};
use viability_core::store::{MemoryStoreFactory, StoreRegistry};
use viability_core::{
    AnalysisResult, ClientData, ClientEdit, Clock, FixedClock, Formatter, NarrativeReporter,
    ReportSnapshot, Session, SystemClock, ViabilityEngine, generate_or_fallback,
};
use viability_db_sqlite::SqliteStoreFactory;

use crate::config::{ReportSettings, Settings};
use crate::csv_loader;
use crate::render::{self, Renderer};

/// Registry with every backend this binary ships.
pub fn build_registry() -> StoreRegistry {
    let mut registry = StoreRegistry::new();
    registry.register(Box::new(MemoryStoreFactory));
    registry.register(Box::new(SqliteStoreFactory));
    registry
}

/// Pins "today" when `today` is given, else reads the system clock.
pub fn build_engine(today: Option<NaiveDate>) -> ViabilityEngine {
    let clock: Box<dyn Clock> = match today {
        Some(date) => Box::new(FixedClock(date)),
        None => Box::new(SystemClock),
    };
    ViabilityEngine::from_clock(clock.as_ref())
}

pub async fn open_session(
    settings: &Settings,
    engine: ViabilityEngine,
) -> Result<Session> {
    debug!("connecting to {} backend", settings.store.backend);
    let store = build_registry()
        .create(&settings.store)
        .await
        .with_context(|| format!("failed to open '{}' store", settings.store.backend))?;

    Session::open(store, settings.store_key.clone(), engine, settings.rates)
        .await
        .with_context(|| format!("failed to load record '{}'", settings.store_key))
}

/// `None` when no API key is available or the client cannot be built.
pub fn build_reporter(report: &ReportSettings) -> Option<Box<dyn NarrativeReporter>> {
    let Some(mut config) = GeminiConfig::from_env(&report.api_key_env) else {
        warn!(var = %report.api_key_env, "no API key in environment");
        return None;
    };
    if let Some(model) = &report.model {
        config = config.with_model(model.clone());
    }
    if let Some(url) = &report.base_url {
        config = config.with_base_url(url.clone());
    }
    config = config.with_timeout(report.timeout);

    match GeminiReporter::new(config) {
        Ok(reporter) => Some(Box::new(reporter)),
        Err(e) => {
            warn!("cannot build narrative reporter: {e}");
            None
        }
    }
}

/// Options for the dashboard view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShowOptions {
    pub json: bool,
    /// Trajectory rows to print.
    pub weeks: usize,
    pub ansi: bool,
}

pub fn show(
    session: &Session,
    fmt: Formatter,
    options: ShowOptions,
) -> Result<String> {
    render_result(session.analysis(), fmt, options)
}

fn render_result(
    result: &AnalysisResult,
    fmt: Formatter,
    options: ShowOptions,
) -> Result<String> {
    if options.json {
        return render::dashboard_json(result, &fmt).context("failed to serialize analysis");
    }
    Ok(Renderer::new(fmt, options.ansi).dashboard(result, options.weeks))
}

/// Parses every `field=value` first, then applies them in order.
///
/// A malformed assignment rejects the whole command before anything is saved.
pub async fn set(
    session: &mut Session,
    assignments: &[String],
    fmt: Formatter,
    options: ShowOptions,
) -> Result<String> {
    let edits = assignments
        .iter()
        .map(|a| ClientEdit::parse_assignment(a))
        .collect::<Result<Vec<_>, _>>()?;

    info!(count = edits.len(), key = session.key(), "applying edits");
    let result = session
        .apply_all(edits)
        .await
        .context("failed to save client record")?;

    render_result(result, fmt, options)
}

pub async fn reset(session: &mut Session) -> Result<String> {
    let existed = session.reset().await.context("failed to delete client record")?;
    Ok(if existed {
        format!("Reset '{}' to the default record.", session.key())
    } else {
        format!("Nothing stored under '{}'; showing defaults.", session.key())
    })
}

/// Analyses every client in a CSV file with one shared "today".
pub fn batch(
    path: &Path,
    settings: &Settings,
    engine: &ViabilityEngine,
    json: bool,
) -> Result<String> {
    let defaults = ClientData::defaults(engine.today(), &settings.rates);
    let clients = csv_loader::load_from_file(path, &defaults, &settings.rates)
        .with_context(|| format!("failed to load clients from {}", path.display()))?;
    info!(count = clients.len(), "analysing clients");

    let results: Vec<(String, AnalysisResult)> = clients
        .into_iter()
        .map(|client| {
            let result = engine.calculate(&client.data);
            (client.label, result)
        })
        .collect();

    let fmt = Formatter::new(settings.locale);
    if json {
        return render::batch_json(&results, &fmt).context("failed to serialize batch results");
    }
    Ok(Renderer::new(fmt, false).batch_table(&results))
}

/// Requests a narrative for the current record and attaches it to the
/// session. Failures come back as fallback text.
pub async fn report(
    session: &mut Session,
    reporter: Option<&dyn NarrativeReporter>,
    settings: &Settings,
) -> String {
    let fmt = Formatter::new(settings.locale);
    let ticket = session.report_ticket();
    let snapshot = ReportSnapshot::capture(session.data(), session.analysis(), &fmt);

    let text = generate_or_fallback(reporter, &snapshot, settings.report.timeout).await;
    session.attach_report(ticket, text.clone());
    text
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use viability_core::report::MISSING_KEY_FALLBACK;
    use viability_core::{ReportError, TimeInputMode};

    use super::*;
    use crate::config::{Config, Overrides};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn memory_settings() -> Settings {
        Config::default()
            .resolve(Overrides {
                backend: Some("memory".to_string()),
                ..Overrides::default()
            })
            .unwrap()
    }

    fn plain() -> ShowOptions {
        ShowOptions {
            json: false,
            weeks: 0,
            ansi: false,
        }
    }

    struct Canned;

    #[async_trait]
    impl NarrativeReporter for Canned {
        fn name(&self) -> &'static str {
            "canned"
        }

        async fn generate(&self, snapshot: &ReportSnapshot) -> Result<String, ReportError> {
            Ok(format!("<p>{}</p>", snapshot.status))
        }
    }

    // =========================================================================
    // wiring tests
    // =========================================================================

    #[test]
    fn registry_offers_memory_and_sqlite() {
        assert_eq!(build_registry().available_backends(), vec!["memory", "sqlite"]);
    }

    #[test]
    fn fixed_today_pins_engine() {
        assert_eq!(build_engine(Some(today())).today(), today());
    }

    #[tokio::test]
    async fn unknown_backend_is_reported() {
        let mut settings = memory_settings();
        settings.store.backend = "postgres".to_string();

        let err = open_session(&settings, build_engine(Some(today())))
            .await
            .err()
            .unwrap();

        assert!(format!("{err:#}").contains("unknown backend 'postgres'"));
    }

    // =========================================================================
    // command tests
    // =========================================================================

    #[tokio::test]
    async fn show_renders_defaults_when_nothing_stored() {
        let settings = memory_settings();
        let session = open_session(&settings, build_engine(Some(today())))
            .await
            .unwrap();

        let text = show(&session, Formatter::new(settings.locale), plain()).unwrap();

        assert!(text.contains("You have 96.5 weeks of funding for 40.0 weeks of time."));
    }

    #[tokio::test]
    async fn set_applies_all_assignments_in_order() {
        let settings = memory_settings();
        let mut session = open_session(&settings, build_engine(Some(today())))
            .await
            .unwrap();

        set(
            &mut session,
            &[
                "time_input_mode=weeks".to_string(),
                "manual_weeks_remaining=10".to_string(),
                "current_balance=$2,000".to_string(),
            ],
            Formatter::default(),
            plain(),
        )
        .await
        .unwrap();

        assert_eq!(session.data().time_input_mode, TimeInputMode::Weeks);
        assert_eq!(session.data().manual_weeks_remaining, dec!(10));
        assert_eq!(session.data().current_balance, dec!(2000));
    }

    #[tokio::test]
    async fn set_rejects_unknown_field_before_saving() {
        let settings = memory_settings();
        let mut session = open_session(&settings, build_engine(Some(today())))
            .await
            .unwrap();
        let before = session.data().clone();

        let result = set(
            &mut session,
            &["hours_per_week=3".to_string(), "colour=blue".to_string()],
            Formatter::default(),
            plain(),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(session.data(), &before);
    }

    #[tokio::test]
    async fn reset_without_record_reports_nothing_stored() {
        let settings = memory_settings();
        let mut session = open_session(&settings, build_engine(Some(today())))
            .await
            .unwrap();

        let text = reset(&mut session).await.unwrap();

        assert_eq!(text, "Nothing stored under 'ndis-fail-safe-v2'; showing defaults.");
    }

    #[tokio::test]
    async fn report_without_reporter_falls_back() {
        let settings = memory_settings();
        let mut session = open_session(&settings, build_engine(Some(today())))
            .await
            .unwrap();

        let text = report(&mut session, None, &settings).await;

        assert_eq!(text, MISSING_KEY_FALLBACK);
        assert_eq!(session.report(), Some(MISSING_KEY_FALLBACK));
    }

    #[tokio::test]
    async fn report_attaches_generated_text() {
        let settings = memory_settings();
        let mut session = open_session(&settings, build_engine(Some(today())))
            .await
            .unwrap();

        let text = report(&mut session, Some(&Canned as &dyn NarrativeReporter), &settings).await;

        assert_eq!(text, "<p>PLATINUM CLIENT (Safe Surplus)</p>");
        assert_eq!(session.report(), Some(text.as_str()));
    }

    #[test]
    fn build_reporter_without_key_is_none() {
        let settings = ReportSettings {
            api_key_env: "VIABILITY_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..memory_settings().report
        };

        assert!(build_reporter(&settings).is_none());
    }
}
