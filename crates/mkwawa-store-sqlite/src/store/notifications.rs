//! In-app notifications and the outbound SMS log.

use rusqlite::{Connection, OptionalExtension as _, params};
use uuid::Uuid;

use mkwawa_core::{
  Error as CoreError,
  notification::{
    NewSentSms, Notification, NotificationDelivery, NotificationQuery, SentSms,
  },
};

use super::{Filters, touched};
use crate::{
  Result,
  encode::{self, encode_dt, encode_uuid},
};

fn fetch(conn: &Connection, id: Uuid) -> Result<Option<Notification>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM notifications WHERE id = ?1",
    encode::NOTIFICATION_COLUMNS
  ))?;
  encode::first(&mut stmt, params![encode_uuid(id)], encode::notification)
}

/// All recipients or none: an unknown recipient rolls back the batch.
pub(super) fn create_notifications(
  conn: &mut Connection,
  title: &str,
  message: &str,
  recipients: &[Uuid],
) -> Result<Vec<NotificationDelivery>> {
  let tx = conn.transaction()?;
  let created_at = encode::now();
  let mut deliveries = Vec::with_capacity(recipients.len());
  for &recipient in recipients {
    let (full_name, phone_number): (String, String) = tx
      .query_row(
        "SELECT full_name, phone_number FROM members WHERE id = ?1",
        params![encode_uuid(recipient)],
        |r| Ok((r.get(0)?, r.get(1)?)),
      )
      .optional()?
      .ok_or_else(|| CoreError::not_found("member", recipient))?;
    let notification = Notification {
      id: Uuid::new_v4(),
      title: title.to_owned(),
      message: message.to_owned(),
      recipient_id: recipient,
      is_read: false,
      created_at,
    };
    tx.execute(
      "INSERT INTO notifications (id, title, message, recipient_id, is_read, created_at)
       VALUES (?1, ?2, ?3, ?4, 0, ?5)",
      params![
        encode_uuid(notification.id),
        notification.title,
        notification.message,
        encode_uuid(recipient),
        encode_dt(created_at),
      ],
    )?;
    deliveries.push(NotificationDelivery { notification, full_name, phone_number });
  }
  tx.commit()?;
  Ok(deliveries)
}

pub(super) fn list_notifications(
  conn: &mut Connection,
  query: NotificationQuery,
) -> Result<Vec<Notification>> {
  let mut filters = Filters::default();
  filters.uuid("recipient_id", query.recipient_id);
  filters.eq("title", query.title);
  filters.eq("is_read", query.is_read);
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM notifications{} ORDER BY created_at DESC",
    encode::NOTIFICATION_COLUMNS,
    filters.where_sql()
  ))?;
  encode::collect(&mut stmt, filters.args(), encode::notification)
}

pub(super) fn mark_notification_read(conn: &mut Connection, id: Uuid) -> Result<Notification> {
  let changed = conn.execute(
    "UPDATE notifications SET is_read = 1 WHERE id = ?1",
    params![encode_uuid(id)],
  )?;
  touched(changed, "notification", id)?;
  fetch(conn, id)?.ok_or_else(|| CoreError::not_found("notification", id).into())
}

pub(super) fn delete_notification(conn: &mut Connection, id: Uuid) -> Result<()> {
  let changed = conn.execute(
    "DELETE FROM notifications WHERE id = ?1",
    params![encode_uuid(id)],
  )?;
  touched(changed, "notification", id)
}

pub(super) fn delete_notifications_by_title(conn: &mut Connection, title: &str) -> Result<usize> {
  Ok(conn.execute("DELETE FROM notifications WHERE title = ?1", params![title])?)
}

pub(super) fn record_sent_sms(conn: &mut Connection, input: NewSentSms) -> Result<SentSms> {
  let sms = SentSms {
    id:           Uuid::new_v4(),
    recipient_id: input.recipient_id,
    phone_number: input.phone_number,
    message:      input.message,
    request_id:   input.request_id,
    status:       input.status,
    sent_at:      encode::now(),
  };
  conn.execute(
    "INSERT INTO sent_sms (id, recipient_id, phone_number, message, request_id, status, sent_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    params![
      encode_uuid(sms.id),
      sms.recipient_id.map(encode_uuid),
      sms.phone_number,
      sms.message,
      sms.request_id,
      sms.status.to_string(),
      encode_dt(sms.sent_at),
    ],
  )?;
  Ok(sms)
}

pub(super) fn list_sent_sms(conn: &mut Connection) -> Result<Vec<SentSms>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM sent_sms ORDER BY sent_at DESC",
    encode::SMS_COLUMNS
  ))?;
  encode::collect(&mut stmt, [], encode::sent_sms)
}
