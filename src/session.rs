use std::sync::{
    Mutex,
    MutexGuard,
};

use rand::{
    rngs::StdRng,
    SeedableRng,
};

use crate::{
    api::KanjiSource,
    core::{
        KanjiError,
        KanjiRecord,
    },
    navigation::{
        range_for,
        Direction,
        LevelPageIndex,
        NavigationCursor,
        Scope,
        SublevelSummary,
        DEFAULT_PAGE_SIZE,
    },
    validation::{
        AnswerCheck,
        AnswerInputs,
        AttemptPolicy,
        Hint,
        SubmitOutcome,
        ValidAnswerSet,
    },
};

#[derive(Debug, Clone)]
pub struct LevelInfo {
    pub index: LevelPageIndex,
    pub items: Vec<String>,
}

/// The level being studied and where in it we are.
#[derive(Debug, Clone)]
pub struct LevelState {
    pub index: LevelPageIndex,
    pub cursor: NavigationCursor,
}

struct SessionState {
    level: Option<LevelState>,
    record: Option<KanjiRecord>,
    check: Option<AnswerCheck>,
    loading: bool,
    last_error: Option<String>,
    latest_token: u64,
    rng: StdRng,
}

impl SessionState {
    fn begin(&mut self) -> u64 {
        self.latest_token += 1;
        self.loading = true;
        self.last_error = None;
        self.latest_token
    }

    fn fail(&mut self, error: KanjiError) -> KanjiError {
        match error {
            KanjiError::EndOfPage | KanjiError::StartOfPage => log::debug!("{}", error),
            _ => log::error!("{}", error),
        }
        self.last_error = Some(error.to_string());
        error
    }

    fn set_record(&mut self, record: KanjiRecord, policy: AttemptPolicy) {
        self.check = Some(AnswerCheck::new(&record, policy));
        self.record = Some(record);
    }
}

/// One learner's study state: the loaded level, the cursor, the kanji on
/// screen and its attempt state. Operations take `&self`; overlapping loads
/// are resolved by request token so only the newest one is committed.
pub struct StudySession<S> {
    source: S,
    page_size: usize,
    policy: AttemptPolicy,
    state: Mutex<SessionState>,
}

impl<S: KanjiSource> StudySession<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            page_size: DEFAULT_PAGE_SIZE,
            policy: AttemptPolicy::default(),
            state: Mutex::new(SessionState {
                level: None,
                record: None,
                check: None,
                loading: false,
                last_error: None,
                latest_token: 0,
                rng: StdRng::from_os_rng(),
            }),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_policy(mut self, policy: AttemptPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_seed(self, seed: u64) -> Self {
        self.lock().rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin(&self) -> u64 {
        self.lock().begin()
    }

    /// Commits the result of the operation holding `token`, unless a newer
    /// operation started in the meantime.
    fn finish<T, R>(
        &self,
        token: u64,
        result: Result<T, KanjiError>,
        commit: impl FnOnce(&mut SessionState, T) -> R,
    ) -> Result<R, KanjiError> {
        let mut state = self.lock();
        if token != state.latest_token {
            log::debug!("Discarding stale response {} (latest {})", token, state.latest_token);
            return Err(KanjiError::Superseded);
        }

        match result {
            Ok(value) => {
                state.loading = false;
                Ok(commit(&mut *state, value))
            }
            Err(error) => {
                state.loading = false;
                Err(state.fail(error))
            }
        }
    }

    /// Fetches a level's kanji list and computes its sublevels. Does not
    /// touch the session state.
    pub async fn level_info(&self, level_id: &str) -> Result<LevelInfo, KanjiError> {
        let items = self.source.fetch_level(level_id).await?;
        let index = LevelPageIndex::new(level_id, items.len(), self.page_size);
        Ok(LevelInfo { index, items })
    }

    pub async fn sublevels(&self, level_id: &str) -> Result<Vec<SublevelSummary>, KanjiError> {
        Ok(self.level_info(level_id).await?.index.sublevels())
    }

    /// Loads a level, optionally entering one of its sublevels, and shows
    /// its first kanji.
    pub async fn fetch_level(&self, level_id: &str, page: Option<usize>) -> Result<KanjiRecord, KanjiError> {
        let token = self.begin();

        let result = async {
            let info = self.level_info(level_id).await?;
            if let Some(page) = page {
                range_for(&info.items, page, self.page_size)?;
            }

            let scope = Scope::select(info.index.page_count, page);
            let cursor = NavigationCursor::with_scope(info.items.into(), scope, self.page_size)?;
            let record = self.source.fetch_details(cursor.current()).await?;
            Ok::<_, KanjiError>((info.index, cursor, record))
        }
        .await;

        let policy = self.policy;
        self.finish(token, result, |state, (index, cursor, record)| {
            log::info!(
                "Loaded {} ({} kanji, {} sublevels, {:?})",
                index.level_id,
                index.total_items,
                index.page_count,
                cursor.scope()
            );
            state.level = Some(LevelState { index, cursor });
            state.set_record(record.clone(), policy);
            record
        })
    }

    /// Shows a specific kanji without moving the cursor.
    pub async fn fetch_details(&self, character: &str) -> Result<KanjiRecord, KanjiError> {
        let token = self.begin();
        let result = self.source.fetch_details(character).await;

        let policy = self.policy;
        self.finish(token, result, |state, record| {
            state.set_record(record.clone(), policy);
            record
        })
    }

    /// Moves within the active scope. The move only takes effect once the
    /// target kanji has been loaded; on any error the previous kanji and
    /// position stay in place.
    pub async fn navigate(&self, direction: Direction) -> Result<KanjiRecord, KanjiError> {
        let (token, cursor) = {
            let mut state = self.lock();
            state.last_error = None;

            let mut cursor = match &state.level {
                Some(level) => level.cursor.clone(),
                None => return Err(state.fail(KanjiError::NoItemsLoaded)),
            };
            if let Err(error) = cursor.step(direction, &mut state.rng) {
                return Err(state.fail(error));
            }
            (state.begin(), cursor)
        };

        let result = self.source.fetch_details(cursor.current()).await;

        let policy = self.policy;
        self.finish(token, result, move |state, record| {
            if let Some(level) = state.level.as_mut() {
                level.cursor = cursor;
            }
            state.set_record(record.clone(), policy);
            record
        })
    }

    pub fn submit(&self, inputs: &AnswerInputs) -> Result<SubmitOutcome, KanjiError> {
        let mut state = self.lock();
        let check = state.check.as_mut().ok_or(KanjiError::NoItemsLoaded)?;
        Ok(check.submit(inputs))
    }

    /// The hint for the current kanji, once it has been earned.
    pub fn hint(&self) -> Option<Hint> {
        self.lock().check.as_ref().and_then(|check| check.hint().cloned())
    }

    /// Gives up on the current kanji and returns every accepted answer.
    pub fn reveal(&self) -> Option<Vec<ValidAnswerSet>> {
        let mut state = self.lock();
        let check = state.check.as_mut()?;
        check.reveal();
        check.revealed_answers().map(|answers| answers.to_vec())
    }

    pub fn answer_check(&self) -> Option<AnswerCheck> {
        self.lock().check.clone()
    }

    pub fn current_record(&self) -> Option<KanjiRecord> {
        self.lock().record.clone()
    }

    pub fn level(&self) -> Option<LevelState> {
        self.lock().level.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    /// Drops the level, the current kanji and any in-flight result.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.latest_token += 1;
        state.level = None;
        state.record = None;
        state.check = None;
        state.loading = false;
        state.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::{
            HashMap,
            HashSet,
        },
        time::Duration,
    };

    use super::*;
    use crate::{
        core::AnswerField,
        validation::Verdict,
    };

    #[derive(Default)]
    struct FakeSource {
        levels: HashMap<String, Vec<String>>,
        delays_ms: HashMap<String, u64>,
        failing: HashSet<String>,
    }

    impl FakeSource {
        fn with_level(mut self, level_id: &str, count: usize) -> Self {
            let items = (0..count).map(|i| format!("k{i}")).collect();
            self.levels.insert(level_id.to_string(), items);
            self
        }

        fn with_items(mut self, level_id: &str, items: &[&str]) -> Self {
            self.levels.insert(level_id.to_string(), items.iter().map(|s| s.to_string()).collect());
            self
        }

        fn slow(mut self, character: &str, ms: u64) -> Self {
            self.delays_ms.insert(character.to_string(), ms);
            self
        }

        fn failing(mut self, character: &str) -> Self {
            self.failing.insert(character.to_string());
            self
        }
    }

    impl KanjiSource for FakeSource {
        async fn fetch_level(&self, level_id: &str) -> Result<Vec<String>, KanjiError> {
            match self.levels.get(level_id) {
                Some(items) if !items.is_empty() => Ok(items.clone()),
                Some(_) => Err(KanjiError::EmptyLevel(level_id.to_string())),
                None => Err(KanjiError::HttpStatus {
                    status: 404,
                    url: format!("fake://kanji/{level_id}"),
                }),
            }
        }

        async fn fetch_details(&self, character: &str) -> Result<KanjiRecord, KanjiError> {
            if let Some(ms) = self.delays_ms.get(character) {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
            if self.failing.contains(character) {
                return Err(KanjiError::HttpStatus {
                    status: 500,
                    url: format!("fake://kanji/{character}"),
                });
            }

            let mut record = KanjiRecord::new(character);
            record.meanings = vec![format!("meaning {character}")];
            record.on_readings = vec!["オン".to_string()];
            record.kun_readings = vec!["く.ん".to_string()];
            Ok(record)
        }
    }

    fn current(session: &StudySession<FakeSource>) -> String {
        session.current_record().map(|r| r.character).unwrap_or_default()
    }

    #[tokio::test]
    async fn test_fetch_level_without_page_uses_full_level() {
        let session = StudySession::new(FakeSource::default().with_level("jlpt-4", 170));
        let record = session.fetch_level("jlpt-4", None).await.unwrap();

        assert_eq!(record.character, "k0");
        let level = session.level().unwrap();
        assert_eq!(level.index.page_count, 2);
        assert_eq!(level.cursor.scope(), Scope::FullLevel);

        session.navigate(Direction::Previous).await.unwrap();
        assert_eq!(current(&session), "k169");
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_page_scope_boundaries() {
        let session = StudySession::new(FakeSource::default().with_level("jlpt-4", 170));
        let record = session.fetch_level("jlpt-4", Some(2)).await.unwrap();
        assert_eq!(record.character, "k100");
        assert_eq!(session.level().unwrap().cursor.scope(), Scope::Page(2));

        session.navigate(Direction::Next).await.unwrap();
        assert_eq!(current(&session), "k101");

        session.navigate(Direction::Previous).await.unwrap();
        let err = session.navigate(Direction::Previous).await.unwrap_err();
        assert!(matches!(err, KanjiError::StartOfPage));
        assert_eq!(current(&session), "k100");
        assert!(session.last_error().is_some());
    }

    #[tokio::test]
    async fn test_end_of_page() {
        let session = StudySession::new(FakeSource::default().with_level("jlpt-3", 250));
        session.fetch_level("jlpt-3", Some(3)).await.unwrap();

        for _ in 0..49 {
            session.navigate(Direction::Next).await.unwrap();
        }
        assert_eq!(current(&session), "k249");
        assert!(matches!(session.navigate(Direction::Next).await, Err(KanjiError::EndOfPage)));
        assert_eq!(session.level().unwrap().cursor.position(), 49);
    }

    #[tokio::test]
    async fn test_single_page_level_ignores_page_scope() {
        let session = StudySession::new(FakeSource::default().with_items("jlpt-5", &["日", "一", "国"]));
        session.fetch_level("jlpt-5", Some(1)).await.unwrap();
        assert_eq!(session.level().unwrap().cursor.scope(), Scope::FullLevel);

        session.navigate(Direction::Previous).await.unwrap();
        assert_eq!(current(&session), "国");
        session.navigate(Direction::Next).await.unwrap();
        assert_eq!(current(&session), "日");
    }

    #[tokio::test]
    async fn test_navigation_before_load() {
        let session = StudySession::new(FakeSource::default());
        assert!(matches!(session.navigate(Direction::Next).await, Err(KanjiError::NoItemsLoaded)));
        assert_eq!(session.last_error().as_deref(), Some("No kanji loaded"));
        assert!(matches!(session.submit(&AnswerInputs::default()), Err(KanjiError::NoItemsLoaded)));
    }

    #[tokio::test]
    async fn test_invalid_page_keeps_previous_level() {
        let session = StudySession::new(
            FakeSource::default().with_level("jlpt-4", 170).with_level("jlpt-3", 250),
        );
        session.fetch_level("jlpt-3", Some(3)).await.unwrap();

        let err = session.fetch_level("jlpt-4", Some(3)).await.unwrap_err();
        assert!(matches!(err, KanjiError::InvalidPage { page: 3, page_count: 2 }));

        let level = session.level().unwrap();
        assert_eq!(level.index.level_id, "jlpt-3");
        assert_eq!(current(&session), "k200");
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_empty_and_missing_levels() {
        let session = StudySession::new(FakeSource::default().with_level("empty", 0));

        let err = session.fetch_level("empty", None).await.unwrap_err();
        assert!(matches!(err, KanjiError::EmptyLevel(_)));
        assert_eq!(session.last_error().as_deref(), Some("No kanji found for level empty"));

        let err = session.fetch_level("jlpt-9", None).await.unwrap_err();
        assert!(err.is_network());
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_state() {
        let source = FakeSource::default().with_items("jlpt-5", &["a", "b", "c"]).failing("b");
        let session = StudySession::new(source);
        session.fetch_level("jlpt-5", None).await.unwrap();

        let err = session.navigate(Direction::Next).await.unwrap_err();
        assert!(matches!(err, KanjiError::HttpStatus { status: 500, .. }));
        assert_eq!(current(&session), "a");
        assert_eq!(session.level().unwrap().cursor.position(), 0);
        assert!(session.last_error().is_some());
        assert!(!session.is_loading());

        // a new operation clears the previous error
        session.navigate(Direction::Previous).await.unwrap();
        assert_eq!(current(&session), "c");
        assert!(session.last_error().is_none());
    }

    #[tokio::test]
    async fn test_stale_navigation_is_discarded() {
        let source = FakeSource::default().with_items("jlpt-5", &["a", "b", "c"]).slow("b", 200);
        let session = StudySession::new(source);
        session.fetch_level("jlpt-5", None).await.unwrap();

        let (slow, fast) = tokio::join!(session.navigate(Direction::Next), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            session.navigate(Direction::Previous).await
        });

        assert!(matches!(slow, Err(KanjiError::Superseded)));
        assert_eq!(fast.unwrap().character, "c");
        assert_eq!(current(&session), "c");
        assert_eq!(session.level().unwrap().cursor.position(), 2);
        assert!(!session.is_loading());
        assert!(session.last_error().is_none());
    }

    #[tokio::test]
    async fn test_random_navigation_stays_in_page() {
        let session = StudySession::new(FakeSource::default().with_level("jlpt-2", 250)).with_seed(42);
        session.fetch_level("jlpt-2", Some(2)).await.unwrap();

        for _ in 0..20 {
            session.navigate(Direction::Random).await.unwrap();
            let index = session.level().unwrap().cursor.absolute_index();
            assert!((100..200).contains(&index));
        }
    }

    #[tokio::test]
    async fn test_answer_flow_resets_on_navigation() {
        let session = StudySession::new(FakeSource::default().with_items("jlpt-5", &["日", "月"]));
        session.fetch_level("jlpt-5", None).await.unwrap();

        let wrong = AnswerInputs {
            meaning: "nope".to_string(),
            on_reading: "ナイ".to_string(),
            kun_reading: "ない".to_string(),
        };
        session.submit(&wrong).unwrap();
        assert!(session.hint().is_none());
        session.submit(&wrong).unwrap();
        assert!(session.hint().is_some());

        let right = AnswerInputs {
            meaning: "Meaning 日".to_string(),
            on_reading: "オン".to_string(),
            kun_reading: "く".to_string(),
        };
        match session.submit(&right).unwrap() {
            SubmitOutcome::Evaluated(outcome) => {
                assert_eq!(outcome.verdict, Verdict::Correct);
                assert_eq!(outcome.attempt, 3);
            }
            other => panic!("Expected evaluated attempt, got {:?}", other),
        }

        session.navigate(Direction::Next).await.unwrap();
        let check = session.answer_check().unwrap();
        assert_eq!(check.attempts(), 0);
        assert!(session.hint().is_none());

        let answers = session.reveal().unwrap();
        assert!(answers.iter().any(|a| a.field() == AnswerField::KunReading));
    }

    #[tokio::test]
    async fn test_fetch_details_and_reset() {
        let session = StudySession::new(FakeSource::default().with_items("jlpt-5", &["日", "月"]));
        session.fetch_level("jlpt-5", None).await.unwrap();
        session.fetch_details("水").await.unwrap();

        assert_eq!(current(&session), "水");
        assert_eq!(session.level().unwrap().cursor.current(), "日");

        session.reset();
        assert!(session.current_record().is_none());
        assert!(session.level().is_none());
    }

    #[tokio::test]
    async fn test_sublevel_summaries() {
        let session = StudySession::new(FakeSource::default().with_level("jlpt-4", 170));
        let sublevels = session.sublevels("jlpt-4").await.unwrap();
        assert_eq!(sublevels.len(), 2);
        assert_eq!(sublevels[1].count, 70);
        assert!(session.current_record().is_none());
    }
}
