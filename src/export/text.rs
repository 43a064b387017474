//! Plain-text review queue.

use std::fmt::Write as _;
use std::path::Path;

use super::check_output_path;
use crate::model::email::EnrichedEmail;
use crate::triage::extract::join_set;

/// Render the ranked queue as a human-readable report, one block per email.
pub fn render_report(emails: &[EnrichedEmail]) -> String {
    let mut out = String::new();
    let urgent = emails.iter().filter(|e| e.is_urgent()).count();
    let _ = writeln!(
        out,
        "Support queue: {} email(s), {} urgent\n",
        emails.len(),
        urgent
    );

    for (i, email) in emails.iter().enumerate() {
        let _ = writeln!(out, "{}", "=".repeat(72));
        let _ = writeln!(out, "#{} [{}] [{}]", i + 1, email.priority, email.sentiment);
        let _ = writeln!(out, "Subject: {}", email.raw.subject);
        let _ = writeln!(out, "From:    {}", email.raw.sender);
        if let Some(date) = &email.raw.date {
            let _ = writeln!(out, "Date:    {date}");
        }
        if !email.product.is_empty() {
            let _ = writeln!(out, "Product: {}", email.product);
        }
        if !email.phones.is_empty() {
            let _ = writeln!(out, "Phones:  {}", join_set(&email.phones));
        }
        if !email.emails.is_empty() {
            let _ = writeln!(out, "Emails:  {}", join_set(&email.emails));
        }
        if !email.requirement_summary.is_empty() {
            let _ = writeln!(out, "\nRequirements:\n  {}", email.requirement_summary);
        }

        let _ = writeln!(out, "\n{}", "-".repeat(72));
        if !email.raw.body.is_empty() {
            let _ = writeln!(out, "{}", email.raw.body);
            let _ = writeln!(out, "{}", "-".repeat(72));
        }

        let _ = writeln!(out, "Draft reply:\n\n{}", email.draft_reply.trim_end());
        out.push('\n');
    }

    out
}

/// Write [`render_report`] output to a file.
pub fn export_text(emails: &[EnrichedEmail], output_path: &Path) -> anyhow::Result<()> {
    check_output_path(output_path)?;
    std::fs::write(output_path, render_report(emails))?;
    tracing::info!(path = %output_path.display(), count = emails.len(), "Exported text report");
    Ok(())
}
