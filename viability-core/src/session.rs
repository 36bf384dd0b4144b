//! Edit loop: reduce, persist, recompute, invalidate the report overlay.

use tracing::info;

use crate::calculations::ViabilityEngine;
use crate::edit::ClientEdit;
use crate::models::{AnalysisResult, ClientData, RateTable};
use crate::store::{ClientDataStore, StoreError};

/// Identifies the record generation a narrative report was requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportTicket(u64);

/// Owns the current client record and its analysis.
pub struct Session {
    store: Box<dyn ClientDataStore>,
    key: String,
    engine: ViabilityEngine,
    rates: RateTable,
    data: ClientData,
    analysis: AnalysisResult,
    generation: u64,
    report: Option<String>,
}

impl Session {
    /// Loads the record under `key`, or the defaults when nothing is stored.
    pub async fn open(
        store: Box<dyn ClientDataStore>,
        key: impl Into<String>,
        engine: ViabilityEngine,
        rates: RateTable,
    ) -> Result<Self, StoreError> {
        let key = key.into();
        let data = match store.load(&key).await? {
            Some(data) => {
                info!(key = %key, "loaded client record");
                data
            }
            None => {
                info!(key = %key, "no stored client record; using defaults");
                ClientData::defaults(engine.today(), &rates)
            }
        };
        let analysis = engine.calculate(&data);

        Ok(Self {
            store,
            key,
            engine,
            rates,
            data,
            analysis,
            generation: 0,
            report: None,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn data(&self) -> &ClientData {
        &self.data
    }

    pub fn analysis(&self) -> &AnalysisResult {
        &self.analysis
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    /// Applies one edit. On a store failure the session is left unchanged.
    pub async fn apply(
        &mut self,
        edit: ClientEdit,
    ) -> Result<&AnalysisResult, StoreError> {
        let next = self.data.clone().apply(edit, &self.rates);
        self.store.save(&self.key, &next).await?;
        self.replace(next);
        Ok(&self.analysis)
    }

    /// Applies edits in order, persisting after each.
    pub async fn apply_all(
        &mut self,
        edits: impl IntoIterator<Item = ClientEdit>,
    ) -> Result<&AnalysisResult, StoreError> {
        for edit in edits {
            self.apply(edit).await?;
        }
        Ok(&self.analysis)
    }

    /// Deletes the stored record and returns to the defaults.
    ///
    /// Returns `false` when nothing was stored.
    pub async fn reset(&mut self) -> Result<bool, StoreError> {
        let existed = match self.store.delete(&self.key).await {
            Ok(()) => true,
            Err(StoreError::NotFound) => false,
            Err(e) => return Err(e),
        };
        self.replace(ClientData::defaults(self.engine.today(), &self.rates));
        Ok(existed)
    }

    pub fn report_ticket(&self) -> ReportTicket {
        ReportTicket(self.generation)
    }

    /// Stores `text` as the current report unless the record has changed
    /// since `ticket` was issued. Returns whether it was kept.
    pub fn attach_report(
        &mut self,
        ticket: ReportTicket,
        text: String,
    ) -> bool {
        if ticket.0 != self.generation {
            info!("discarding narrative report for a superseded record");
            return false;
        }
        self.report = Some(text);
        true
    }

    pub fn report(&self) -> Option<&str> {
        self.report.as_deref()
    }

    fn replace(
        &mut self,
        data: ClientData,
    ) {
        self.analysis = self.engine.calculate(&data);
        self.data = data;
        self.generation = self.generation.wrapping_add(1);
        self.report = None;
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{SupportLevel, ViabilityStatus};
    use crate::store::MemoryStore;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    async fn open(store: MemoryStore) -> Session {
        Session::open(
            Box::new(store),
            "test",
            ViabilityEngine::new(today()),
            RateTable::default(),
        )
        .await
        .unwrap()
    }

    struct ReadOnlyStore;

    #[async_trait]
    impl ClientDataStore for ReadOnlyStore {
        async fn load(&self, _key: &str) -> Result<Option<ClientData>, StoreError> {
            Ok(None)
        }

        async fn save(&self, _key: &str, _data: &ClientData) -> Result<(), StoreError> {
            Err(StoreError::Database("read-only".to_string()))
        }

        async fn delete(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Database("read-only".to_string()))
        }

        async fn list_keys(&self) -> Result<Vec<String>, StoreError> {
            Ok(Vec::new())
        }
    }

    // =========================================================================
    // open tests
    // =========================================================================

    #[tokio::test]
    async fn open_empty_store_uses_defaults() {
        let session = open(MemoryStore::new()).await;

        assert_eq!(
            session.data(),
            &ClientData::defaults(today(), &RateTable::default())
        );
        assert_eq!(session.analysis().status, ViabilityStatus::Platinum);
    }

    #[tokio::test]
    async fn open_loads_stored_record() {
        let store = MemoryStore::new();
        let mut stored = ClientData::defaults(today(), &RateTable::default());
        stored.hours_per_week = dec!(9);
        store.save("test", &stored).await.unwrap();

        let session = open(store).await;

        assert_eq!(session.data().hours_per_week, dec!(9));
        assert_eq!(session.analysis().weekly_cost, dec!(901.26));
    }

    // =========================================================================
    // apply tests
    // =========================================================================

    #[tokio::test]
    async fn apply_recomputes_analysis() {
        let mut session = open(MemoryStore::new()).await;

        let analysis = session
            .apply(ClientEdit::HoursPerWeek(dec!(2)))
            .await
            .unwrap();

        assert_eq!(analysis.weekly_cost, dec!(200.28));
    }

    #[tokio::test]
    async fn apply_support_level_uses_session_rates() {
        let mut session = open(MemoryStore::new()).await;

        session
            .apply(ClientEdit::SupportLevel(SupportLevel::Level3))
            .await
            .unwrap();

        assert_eq!(session.data().hourly_rate, dec!(190.41));
    }

    #[tokio::test]
    async fn apply_failure_leaves_session_unchanged() {
        let mut session = Session::open(
            Box::new(ReadOnlyStore),
            "test",
            ViabilityEngine::new(today()),
            RateTable::default(),
        )
        .await
        .unwrap();
        let before = session.data().clone();

        let result = session.apply(ClientEdit::HoursPerWeek(dec!(5))).await;

        assert!(result.is_err());
        assert_eq!(session.data(), &before);
    }

    #[tokio::test]
    async fn apply_all_applies_in_order() {
        let mut session = open(MemoryStore::new()).await;

        session
            .apply_all([
                ClientEdit::HoursPerWeek(dec!(2)),
                ClientEdit::HoursPerWeek(dec!(3)),
            ])
            .await
            .unwrap();

        assert_eq!(session.data().hours_per_week, dec!(3));
    }

    // =========================================================================
    // reset tests
    // =========================================================================

    #[tokio::test]
    async fn reset_reports_whether_record_existed() {
        let mut session = open(MemoryStore::new()).await;
        assert!(!session.reset().await.unwrap());

        session
            .apply(ClientEdit::HoursPerWeek(dec!(4)))
            .await
            .unwrap();

        assert!(session.reset().await.unwrap());
        assert_eq!(session.data().hours_per_week, dec!(1.5));
    }

    // =========================================================================
    // Report overlay tests
    // =========================================================================

    #[tokio::test]
    async fn report_for_current_generation_is_kept() {
        let mut session = open(MemoryStore::new()).await;
        let ticket = session.report_ticket();

        assert!(session.attach_report(ticket, "<p>ok</p>".to_string()));
        assert_eq!(session.report(), Some("<p>ok</p>"));
    }

    #[tokio::test]
    async fn report_for_superseded_generation_is_discarded() {
        let mut session = open(MemoryStore::new()).await;
        let ticket = session.report_ticket();

        session
            .apply(ClientEdit::HoursPerWeek(dec!(2)))
            .await
            .unwrap();

        assert!(!session.attach_report(ticket, "<p>stale</p>".to_string()));
        assert_eq!(session.report(), None);
    }

    #[tokio::test]
    async fn edit_clears_attached_report() {
        let mut session = open(MemoryStore::new()).await;
        let ticket = session.report_ticket();
        session.attach_report(ticket, "<p>ok</p>".to_string());

        session
            .apply(ClientEdit::CurrentBalance(dec!(100)))
            .await
            .unwrap();

        assert_eq!(session.report(), None);
    }
}
