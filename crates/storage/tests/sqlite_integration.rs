use ascetic_core::model::{DayNumber, JournalDraft, ProgramState, Theme, UserId, WeekNumber};
use ascetic_core::time::{fixed_now, fixed_today};
use chrono::Duration;
use storage::repository::{
    JournalRecord, JournalRepository, ProgressRecord, ProgressRepository,
};
use storage::sqlite::SqliteRepository;

fn day(n: u8) -> DayNumber {
    DayNumber::new(n).unwrap()
}

fn seeded_state() -> ProgramState {
    let mut state = ProgramState::new();
    state.start_journey(fixed_today());
    state.mark_day_complete(day(1));
    state.toggle_practice(day(2), WeekNumber::FIRST);
    state.set_theme(Theme::Monastic);
    state
}

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn progress_round_trips_through_sqlite() {
    let repo = connect("memdb_progress_roundtrip").await;
    let user = UserId::local();

    assert!(repo.get_progress(user).await.unwrap().is_none());

    let record = ProgressRecord::from_state(user, &seeded_state(), fixed_now());
    repo.upsert_progress(&record).await.unwrap();

    let fetched = repo.get_progress(user).await.unwrap().expect("row");
    assert_eq!(fetched, record);

    let state = fetched.into_state();
    assert_eq!(state.start_date(), Some(fixed_today()));
    assert!(state.completed_days().contains(&day(1)));
    assert!(state.practices_checked(day(2)).contains(&WeekNumber::FIRST));
    assert_eq!(state.theme(), Theme::Monastic);
}

#[tokio::test]
async fn progress_upsert_is_last_write_wins() {
    let repo = connect("memdb_progress_lww").await;
    let user = UserId::local();

    let first = ProgressRecord::from_state(user, &seeded_state(), fixed_now());
    repo.upsert_progress(&first).await.unwrap();

    let mut later_state = seeded_state();
    later_state.mark_day_complete(day(3));
    later_state.set_theme(Theme::Light);
    let second = ProgressRecord::from_state(
        user,
        &later_state,
        fixed_now() + Duration::seconds(30),
    );
    repo.upsert_progress(&second).await.unwrap();

    let fetched = repo.get_progress(user).await.unwrap().expect("row");
    assert_eq!(fetched, second);
}

#[tokio::test]
async fn journal_rows_upsert_and_delete_through() {
    let repo = connect("memdb_journals").await;
    let user = UserId::local();

    let entry = JournalDraft::new("rose before the sun").sanitize().unwrap();
    let record = JournalRecord::from_entry(user, day(4), &entry, fixed_now());
    repo.upsert_entry(&record).await.unwrap();

    // Overwrite the same (user, day) key; only the latest text survives.
    let revised = JournalDraft::new("rose before the sun, barely")
        .sanitize()
        .unwrap();
    let record = JournalRecord::from_entry(
        user,
        day(4),
        &revised,
        fixed_now() + Duration::seconds(5),
    );
    repo.upsert_entry(&record).await.unwrap();

    let other_day = JournalRecord::from_entry(
        user,
        day(6),
        &JournalDraft::new("fasted at noon").sanitize().unwrap(),
        fixed_now(),
    );
    repo.upsert_entry(&other_day).await.unwrap();

    let entries = repo.list_entries(user).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].day_number, day(4));
    assert_eq!(entries[0].entry().as_str(), "rose before the sun, barely");
    assert_eq!(entries[1].day_number, day(6));

    repo.delete_entries(user).await.unwrap();
    assert!(repo.list_entries(user).await.unwrap().is_empty());
}

#[tokio::test]
async fn rows_are_scoped_per_user() {
    let repo = connect("memdb_scoping").await;
    let local = UserId::local();
    let other: UserId = "8a4f1f3e-0f6a-4c53-9f2b-0d9f6f3a1b2c".parse().unwrap();

    let entry = JournalDraft::new("mine alone").sanitize().unwrap();
    repo.upsert_entry(&JournalRecord::from_entry(local, day(1), &entry, fixed_now()))
        .await
        .unwrap();

    assert!(repo.list_entries(other).await.unwrap().is_empty());
    assert_eq!(repo.list_entries(local).await.unwrap().len(), 1);

    repo.delete_entries(other).await.unwrap();
    assert_eq!(repo.list_entries(local).await.unwrap().len(), 1);
}
