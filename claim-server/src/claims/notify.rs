//! Notification texts and fan-out
//!
//! Every lifecycle transition triggers a best-effort fan-out: each
//! recipient is attempted independently, failures are logged, and the
//! committed transition is never rolled back or re-tried.

use std::sync::Arc;

use futures::future::join_all;

use crate::services::NotificationGateway;
use shared::{ResolutionType, Verdict};

/// Alert to the lab roster when a claim is filed
pub fn new_claim_alert(code: &str, customer_name: &str, agent_name: &str, reason: &str) -> String {
    format!(
        "🚨 *NEW CLAIM PENDING*\n\nCode: *{}*\nCustomer: {}\nAgent: {}\n\n👉 *Reason:* {}\n\nPlease log in to issue your technical verdict.",
        code, customer_name, agent_name, reason
    )
}

/// Customer-facing verdict message
pub fn verdict_customer_message(code: &str, verdict: Verdict) -> String {
    match verdict {
        Verdict::Approved => format!(
            "✅ *GOOD NEWS!*\n\nYour claim *{}* has been reviewed and is APPROVED under warranty.\n\nWe will contact you shortly to arrange the solution.",
            code
        ),
        Verdict::Rejected => format!(
            "❌ *UPDATE*\n\nYour claim *{}* has been reviewed and does NOT qualify under warranty.\n\nYour sales agent will contact you with the details.",
            code
        ),
    }
}

/// Instruction to the filing agent once the lab has ruled
pub fn verdict_agent_message(code: &str, verdict: Verdict) -> String {
    format!(
        "🧪 *VERDICT ISSUED*\n\nClaim *{}* was ruled {} by the lab.\n\nPlease process the administrative closure in the system.",
        code,
        verdict.as_str()
    )
}

/// Summary to the lab roster when the case is closed
pub fn close_summary(code: &str, resolution: ResolutionType, note: &str) -> String {
    format!(
        "✅ *CLAIM FINALIZED*\n\nThe sales agent has processed the administrative closure of case *{}*.\n\n🛠️ *Resolution:* {}\n📝 *Note:* {}",
        code,
        resolution.label(),
        note
    )
}

/// Send `text` to every recipient independently
///
/// Failures are isolated per recipient and logged; the caller never
/// sees them. Recipients are `(chat_id, text)` pairs so callers can
/// vary the message per recipient in one pass.
pub async fn fan_out(gateway: &Arc<dyn NotificationGateway>, recipients: Vec<(String, String)>) {
    let sends = recipients.iter().map(|(chat_id, text)| {
        let gateway = gateway.clone();
        async move {
            if let Err(e) = gateway.send(chat_id, text).await {
                tracing::warn!(
                    target: "notify",
                    chat_id = %chat_id,
                    error = %e,
                    "Notification delivery failed"
                );
            }
        }
    });
    join_all(sends).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::RecordingGateway;

    #[tokio::test]
    async fn test_fan_out_isolates_failures() {
        let recording = Arc::new(RecordingGateway::new());
        recording.fail_for("chat-2");
        let gateway: Arc<dyn NotificationGateway> = recording.clone();

        fan_out(
            &gateway,
            vec![
                ("chat-1".into(), "hello".into()),
                ("chat-2".into(), "hello".into()),
                ("chat-3".into(), "hello".into()),
            ],
        )
        .await;

        // The failing recipient does not stop the others
        assert_eq!(recording.sent_to("chat-1").len(), 1);
        assert_eq!(recording.sent_to("chat-2").len(), 0);
        assert_eq!(recording.sent_to("chat-3").len(), 1);
    }

    #[test]
    fn test_message_contents() {
        let alert = new_claim_alert("ABC001", "Maria Lopez", "Ana Torres", "damaged seal");
        assert!(alert.contains("*ABC001*"));
        assert!(alert.contains("Maria Lopez"));
        assert!(alert.contains("Ana Torres"));
        assert!(alert.contains("damaged seal"));

        assert!(verdict_customer_message("ABC001", Verdict::Approved).contains("APPROVED"));
        assert!(verdict_customer_message("ABC001", Verdict::Rejected).contains("NOT qualify"));
        assert!(verdict_agent_message("ABC001", Verdict::Approved).contains("closure"));

        let summary = close_summary("ABC001", ResolutionType::CreditNote, "credit issued");
        assert!(summary.contains("credit note"));
        assert!(summary.contains("credit issued"));
    }
}
