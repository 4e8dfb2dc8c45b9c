#![allow(clippy::unwrap_used)]

use super::*;
use crate::models::User;

fn setup() -> (Database, i64) {
    let mut db = Database::open_in_memory().unwrap();
    let user_id = db
        .create_user(&User::new("jane".into(), "hash".into(), "PHP".into()))
        .unwrap();
    (db, user_id)
}

fn note(user_id: i64, title: &str) -> Notification {
    Notification::new(user_id, title.into(), String::new(), NotificationKind::Info)
}

#[test]
fn test_push_evicts_oldest_first() {
    let mut center = NotificationCenter::new(1, 3);
    for i in 0..3 {
        assert_eq!(center.push(note(1, &format!("n{i}"))), 0);
    }
    assert_eq!(center.push(note(1, "n3")), 1);
    assert_eq!(center.len(), 3);
    let titles: Vec<&str> = center.recent(10).map(|n| n.title.as_str()).collect();
    assert_eq!(titles, vec!["n3", "n2", "n1"]);
}

#[test]
fn test_zero_capacity_is_clamped() {
    let mut center = NotificationCenter::new(1, 0);
    center.push(note(1, "a"));
    center.push(note(1, "b"));
    assert_eq!(center.capacity(), 1);
    assert_eq!(center.len(), 1);
}

#[test]
fn test_history_never_exceeds_default_capacity() {
    let (db, user_id) = setup();
    let mut center = NotificationCenter::new(user_id, DEFAULT_CAPACITY);
    for i in 0..60 {
        center
            .add_notification(&db, &format!("Expense {i}"), "added", NotificationKind::Success)
            .unwrap();
        assert!(center.len() <= DEFAULT_CAPACITY);
    }
    assert_eq!(center.len(), 50);
    // The ten oldest were dropped
    assert_eq!(center.recent(1).next().unwrap().title, "Expense 59");
    assert_eq!(center.recent(50).last().unwrap().title, "Expense 10");
    // The store is held to the same bound
    assert_eq!(db.get_notifications(user_id, 1000).unwrap().len(), 50);
}

#[test]
fn test_load_restores_history() {
    let (db, user_id) = setup();
    {
        let mut center = NotificationCenter::new(user_id, 5);
        for i in 0..7 {
            center
                .add_notification(&db, &format!("n{i}"), "", NotificationKind::Info)
                .unwrap();
        }
    }
    let center = NotificationCenter::load(&db, user_id, 5).unwrap();
    assert_eq!(center.user_id(), user_id);
    assert_eq!(center.len(), 5);
    let titles: Vec<&str> = center.recent(2).map(|n| n.title.as_str()).collect();
    assert_eq!(titles, vec!["n6", "n5"]);
}

#[test]
fn test_mark_read() {
    let (db, user_id) = setup();
    let mut center = NotificationCenter::new(user_id, 10);
    center
        .add_notification(&db, "one", "", NotificationKind::Info)
        .unwrap();
    center
        .add_notification(&db, "two", "", NotificationKind::Warning)
        .unwrap();
    assert_eq!(center.unread_count(), 2);

    let id = center.recent(1).next().unwrap().id.unwrap();
    assert!(center.mark_read(&db, id).unwrap());
    assert_eq!(center.unread_count(), 1);
    assert!(!center.mark_read(&db, 9999).unwrap());

    center.mark_all_read(&db).unwrap();
    assert_eq!(center.unread_count(), 0);
    let reloaded = NotificationCenter::load(&db, user_id, 10).unwrap();
    assert_eq!(reloaded.unread_count(), 0);
}

#[test]
fn test_clear() {
    let (db, user_id) = setup();
    let mut center = NotificationCenter::new(user_id, 10);
    center
        .add_notification(&db, "one", "", NotificationKind::Error)
        .unwrap();
    center.clear(&db).unwrap();
    assert!(center.is_empty());
    assert!(NotificationCenter::load(&db, user_id, 10).unwrap().is_empty());
}

#[test]
fn test_toast_expiry() {
    let now = Instant::now();
    let toast = Toast::new("Saved", NotificationKind::Success, now);
    assert!(!toast.is_expired(now));
    assert!(!toast.is_expired(now + Duration::from_secs(1)));
    assert!(toast.is_expired(now + TOAST_TTL));
}
