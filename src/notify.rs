use chrono::Local;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::{info, warn};

use crate::extract::Listing;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

const ERROR_MESSAGE_MAX_CHARS: usize = 200;
const MAX_LISTINGS_IN_MESSAGE: usize = 3;

pub struct Notifier {
    client: Client,
    send_url: String,
    chat_id: String,
}

impl Notifier {
    pub fn new(bot_token: &str, chat_id: &str) -> Self {
        Self::with_api_base(TELEGRAM_API_BASE, bot_token, chat_id)
    }

    /// The API base is injectable so tests can point the notifier at a
    /// local mock server.
    pub fn with_api_base(api_base: &str, bot_token: &str, chat_id: &str) -> Self {
        Notifier {
            client: Client::builder()
                .timeout(SEND_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            send_url: format!("{}/bot{}/sendMessage", api_base, bot_token),
            chat_id: chat_id.to_string(),
        }
    }

    /// Send one HTML-formatted message. All failures degrade to `false`;
    /// a notification is never worth failing the run over.
    pub async fn send(&self, text: &str) -> bool {
        let payload = json!({
            "chat_id": self.chat_id,
            "text": text,
            "parse_mode": "HTML",
            "disable_web_page_preview": false,
        });

        let result = self.client.post(&self.send_url).json(&payload).send().await;

        match result.and_then(|response| response.error_for_status()) {
            Ok(_) => {
                info!("Telegram notification sent");
                true
            }
            Err(e) => {
                warn!("Error sending Telegram notification: {}", e);
                false
            }
        }
    }
}

pub fn change_message(url: &str, new_total: u64, diff: i64, listings: &[Listing]) -> String {
    let mut message = if diff > 0 {
        format!(
            "🚗 <b>רכבים חדשים ביד2!</b>\n\n📊 סה״כ עכשיו: {} ({:+} חדשים)\n",
            new_total, diff
        )
    } else {
        format!(
            "📉 <b>שינוי במספר הרכבים</b>\n\n📊 סה״כ עכשיו: {} ({:+})\n",
            new_total, diff
        )
    };

    message.push_str(&format!("🔗 <a href=\"{}\">לצפייה בכל המודעות</a>\n", url));

    if diff > 0 && !listings.is_empty() {
        message.push_str("\n<b>רכבים חדשים:</b>\n");
        for (i, listing) in listings.iter().take(MAX_LISTINGS_IN_MESSAGE).enumerate() {
            if let Some(title) = &listing.title {
                message.push_str(&format!("\n{}. {}", i + 1, title));
            }
            if let Some(price) = &listing.price {
                message.push_str(&format!("\n   💰 {}", price));
            }
            if let Some(link) = &listing.link {
                message.push_str(&format!("\n   🔗 <a href=\"{}\">צפה במודעה</a>", link));
            }
            message.push('\n');
        }
    }

    message.push_str(&format!(
        "\n⏰ {}",
        Local::now().format("%H:%M - %d/%m/%Y")
    ));

    message
}

pub fn welcome_message(url: &str, total: u64) -> String {
    format!(
        "✅ <b>ניטור יד2 הופעל!</b>\n\n\
         📊 סה״כ רכבים כרגע: {}\n\
         ⏱️ בודק כל 20 דקות (06:00-00:00)\n\
         🔗 <a href=\"{}\">קישור לחיפוש</a>\n\n\
         תקבל התראה כשיתווספו רכבים חדשים! 🚗",
        total, url
    )
}

pub fn counter_warning_message(url: &str) -> String {
    format!(
        "⚠️ <b>בעיה בניטור יד2</b>\n\n\
         לא הצלחתי לקרוא את מספר המודעות.\n\
         הניטור ימשיך בבדיקה הבאה.\n\n\
         🔗 <a href=\"{}\">בדוק ידנית</a>",
        url
    )
}

pub fn status_message(total: u64, check_count: usize) -> String {
    format!(
        "📊 <b>סטטוס ניטור יד2</b>\n\n\
         ✅ המערכת פעילה\n\
         📈 סה״כ רכבים: {}\n\
         🔄 בדיקות שבוצעו: {}\n\
         ⏰ בדיקה אחרונה: {}",
        total,
        check_count,
        Local::now().format("%H:%M")
    )
}

pub fn error_message(error: &str) -> String {
    format!(
        "❌ <b>שגיאה בניטור</b>\n\nError: {}\n\nהניטור ימשיך בבדיקה הבאה.",
        truncate_chars(error, ERROR_MESSAGE_MAX_CHARS)
    )
}

// Truncation on char boundaries; error text may well be Hebrew
fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
