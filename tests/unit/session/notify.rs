use super::*;

#[test]
fn latest_notification_replaces_the_previous_one() {
    let mut notifier = Notifier::new();
    assert!(notifier.current().is_none());

    notifier.notify("Uploading selection...");
    notifier.notify_error("Forbidden. Please try again later");

    let current = notifier.current().unwrap();
    assert_eq!(current.message, "Forbidden. Please try again later");
    assert_eq!(current.level, NotificationLevel::Error);
    assert_eq!(notifier.history().len(), 2);
}

#[test]
fn default_timeouts_depend_on_level() {
    let mut notifier = Notifier::new();
    assert_eq!(notifier.notify("ok").timeout_ms, Some(INFO_TIMEOUT_MS));
    assert_eq!(notifier.notify_error("bad").timeout_ms, Some(ERROR_TIMEOUT_MS));
    assert_eq!(notifier.notify_for("Generating...", None).timeout_ms, None);
}

#[test]
fn clear_cancels_the_current_notification() {
    let mut notifier = Notifier::new();
    notifier.notify("Generated!");
    notifier.clear();
    assert!(notifier.current().is_none());
    assert_eq!(notifier.history()[0].message, "Generated!");
}
