use mkwawa_core::{
  Error as CoreError,
  member::Gender,
  notification::{NewSentSms, NotificationQuery, SmsStatus},
  store::ParishStore,
};

use super::{core, member, store};

#[tokio::test]
async fn batch_creates_one_row_per_recipient() {
  let s = store().await;
  let a = member(&s, "Agnes", Gender::Female, "255715000001").await;
  let b = member(&s, "Benedict", Gender::Male, "255715000002").await;
  let deliveries = s
    .create_notifications("Mkutano".into(), "Kesho saa nne".into(), vec![a.id, b.id])
    .await
    .unwrap();
  assert_eq!(deliveries.len(), 2);
  assert_eq!(deliveries[0].full_name, "Agnes");
  assert_eq!(deliveries[1].phone_number, "255715000002");
  assert!(deliveries.iter().all(|d| !d.notification.is_read));

  let for_b = NotificationQuery { recipient_id: Some(b.id), ..Default::default() };
  let listed = s.list_notifications(for_b).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].title, "Mkutano");
}

#[tokio::test]
async fn unknown_recipient_rolls_back_the_batch() {
  let s = store().await;
  let a = member(&s, "Agnes", Gender::Female, "255715000010").await;
  let err = s
    .create_notifications("t".into(), "m".into(), vec![a.id, uuid::Uuid::new_v4()])
    .await
    .unwrap_err();
  assert!(matches!(core(err), CoreError::NotFound { entity: "member", .. }));
  assert!(s.list_notifications(NotificationQuery::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn read_state_and_deletion() {
  let s = store().await;
  let a = member(&s, "Agnes", Gender::Female, "255715000020").await;
  let b = member(&s, "Benedict", Gender::Male, "255715000021").await;
  let first = s
    .create_notifications("Sadaka".into(), "Asante".into(), vec![a.id, b.id])
    .await
    .unwrap();
  s.create_notifications("Ibada".into(), "Jumapili".into(), vec![a.id]).await.unwrap();

  let read = s.mark_notification_read(first[0].notification.id).await.unwrap();
  assert!(read.is_read);
  let unread = NotificationQuery { is_read: Some(false), ..Default::default() };
  assert_eq!(s.list_notifications(unread).await.unwrap().len(), 2);

  assert_eq!(s.delete_notifications_by_title("Sadaka".into()).await.unwrap(), 2);
  assert_eq!(s.delete_notifications_by_title("Sadaka".into()).await.unwrap(), 0);

  let left = s.list_notifications(NotificationQuery::default()).await.unwrap();
  assert_eq!(left.len(), 1);
  s.delete_notification(left[0].id).await.unwrap();
  let err = s.delete_notification(left[0].id).await.unwrap_err();
  assert!(matches!(core(err), CoreError::NotFound { .. }));
}

#[tokio::test]
async fn sms_log_keeps_gateway_status() {
  let s = store().await;
  let a = member(&s, "Agnes", Gender::Female, "255715000030").await;
  s.record_sent_sms(NewSentSms {
    recipient_id: Some(a.id),
    phone_number: a.phone_number.clone(),
    message:      "Habari".into(),
    request_id:   "req-1".into(),
    status:       SmsStatus::Delivered,
  })
  .await
  .unwrap();
  s.record_sent_sms(NewSentSms {
    recipient_id: None,
    phone_number: "255715999999".into(),
    message:      "Habari".into(),
    request_id:   String::new(),
    status:       SmsStatus::Error,
  })
  .await
  .unwrap();

  let log = s.list_sent_sms().await.unwrap();
  assert_eq!(log.len(), 2);
  assert!(log.iter().any(|m| m.status == SmsStatus::Delivered && m.recipient_id == Some(a.id)));
  assert!(log.iter().any(|m| m.status == SmsStatus::Error && m.recipient_id.is_none()));
}
