//! Merchant notifications.
//!
//! A notification is a side effect of an approval, never part of it: a
//! failed send is logged and forgotten.

use chrono::{DateTime, Datelike, FixedOffset, Offset, Timelike, Utc};
use std::fmt;
use std::future::Future;
use tracing::{info, warn};

use crate::amount::Baht;
use crate::model::{PaymentType, Transaction};

/// Bangkok is UTC+7 all year round.
const BANGKOK_OFFSET_SECS: i32 = 7 * 3600;

/// Buddhist era year = Gregorian year + 543.
const BUDDHIST_ERA_OFFSET: i32 = 543;

/// Bot credentials and the chat to post to.
#[derive(Clone, PartialEq, Eq)]
pub struct NotifyTarget {
    pub bot_token: String,
    pub chat_id: String,
}

impl fmt::Debug for NotifyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifyTarget")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// Sends a message, optionally with a photo, to the merchant.
///
/// Returns whether delivery succeeded. Implementations must not panic on
/// delivery failure.
pub trait Notifier: Send + Sync {
    fn notify(
        &self,
        target: &NotifyTarget,
        message: &str,
        photo: Option<&[u8]>,
    ) -> impl Future<Output = bool> + Send;
}

/// Writes notifications to the log instead of a chat.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn notify(&self, target: &NotifyTarget, message: &str, photo: Option<&[u8]>) -> bool {
        if target.bot_token.is_empty() || target.chat_id.is_empty() {
            warn!("missing bot token or chat id");
            return false;
        }

        info!(
            chat_id = %target.chat_id,
            photo_bytes = photo.map_or(0, <[u8]>::len),
            text = message,
            "notification sent"
        );
        true
    }
}

/// Caption posted once a slip has been verified.
pub fn slip_verified_message(transaction: &Transaction, verified_at: DateTime<Utc>) -> String {
    format!(
        "✅ <b>ได้รับชำระเงินแล้ว!</b>

💰 <b>จำนวนเงิน:</b> {amount}
👤 <b>ผู้รับเงิน:</b> {recipient}
📱 <b>{label}:</b> {target}
🆔 <b>รหัสรายการ:</b> {short_id}
🕐 <b>เวลายืนยัน:</b> {time}

🎉 สลิปถูกตรวจสอบและยืนยันเรียบร้อยแล้ว!",
        amount = Baht(transaction.amount),
        recipient = recipient(transaction),
        label = payment_type_label(transaction.payment_type),
        target = format_target(&transaction.target, transaction.payment_type),
        short_id = short_id(transaction),
        time = thai_timestamp(verified_at),
    )
}

/// Message posted when a payment request is created.
pub fn new_transaction_message(transaction: &Transaction, created_at: DateTime<Utc>) -> String {
    format!(
        "🆕 <b>รายการใหม่!</b>

💰 <b>จำนวนเงิน:</b> {amount}
👤 <b>ผู้รับเงิน:</b> {recipient}
📱 <b>{label}:</b> {target}
🆔 <b>รหัสรายการ:</b> {short_id}
🕐 <b>เวลา:</b> {time}

✅ รอลูกค้าชำระเงินและอัพโหลดสลิป",
        amount = Baht(transaction.amount),
        recipient = recipient(transaction),
        label = payment_type_label(transaction.payment_type),
        target = format_target(&transaction.target, transaction.payment_type),
        short_id = short_id(transaction),
        time = thai_timestamp(created_at),
    )
}

/// `0812345678` -> `081-234-5678`, `1234567890123` -> `1-2345-67890-12-3`.
/// Anything not shaped like the payment type is returned untouched.
pub fn format_target(target: &str, payment_type: PaymentType) -> String {
    let groups: &[usize] = match payment_type {
        PaymentType::Msisdn => &[3, 3, 4],
        PaymentType::NatId => &[1, 4, 5, 2, 1],
    };

    if target.len() != payment_type.target_len() || !target.chars().all(|c| c.is_ascii_digit()) {
        return target.to_string();
    }

    let mut parts = Vec::with_capacity(groups.len());
    let mut start = 0;
    for len in groups {
        parts.push(&target[start..start + len]);
        start += len;
    }
    parts.join("-")
}

fn payment_type_label(payment_type: PaymentType) -> &'static str {
    match payment_type {
        PaymentType::Msisdn => "เบอร์โทรศัพท์",
        PaymentType::NatId => "เลขบัตรประชาชน",
    }
}

fn recipient(transaction: &Transaction) -> &str {
    match transaction.recipient_name_th.trim() {
        "" => "ไม่ระบุ",
        name => name,
    }
}

fn short_id(transaction: &Transaction) -> String {
    transaction.id.to_string().chars().take(8).collect()
}

/// Bangkok local time with a Buddhist era year, e.g. `29/8/2567 09:12:54`.
fn thai_timestamp(at: DateTime<Utc>) -> String {
    let offset = FixedOffset::east_opt(BANGKOK_OFFSET_SECS).unwrap_or_else(|| Utc.fix());
    let local = at.with_timezone(&offset);
    format!(
        "{}/{}/{} {:02}:{:02}:{:02}",
        local.day(),
        local.month(),
        local.year() + BUDDHIST_ERA_OFFSET,
        local.hour(),
        local.minute(),
        local.second()
    )
}
