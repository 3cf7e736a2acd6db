//! Telegram HTML message bodies.

use crate::{
    messaging::types::ReplyMenu,
    normalize::BaseEmail,
    service::{EmailSummary, GeneratedBatch},
};

pub const GENERATE_BUTTON: &str = "🔢 Generate Alias";
pub const INFO_BUTTON: &str = "ℹ️ Info";

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn main_menu() -> ReplyMenu {
    ReplyMenu::new(vec![vec![
        GENERATE_BUTTON.to_string(),
        INFO_BUTTON.to_string(),
    ]])
}

fn code(text: &str) -> String {
    format!("<code>{}</code>", escape_html(text))
}

fn base_code(base: &BaseEmail) -> String {
    code(&base.key())
}

pub fn welcome() -> String {
    format!(
        "🔥 <b>Gmail Alias Generator Bot</b>\n\n\
1️⃣ Tap <b>{GENERATE_BUTTON}</b>\n\
2️⃣ Send a <b>Gmail</b> address\n\
3️⃣ Choose how many aliases to generate\n\n\
Sending the same address again <b>continues with the next aliases</b> instead of repeating old ones.\n\n\
More commands:\n\
- <code>/statusemail</code> → check alias progress for an address\n\
- <code>/resetemail</code> → reset an address's progress\n\
- <code>/cancel</code> → abort the current step\n\n\
Example: <code>yourname@gmail.com</code>"
    )
}

pub fn info() -> String {
    "ℹ️ <b>Info</b>\n\n\
- Only <code>@gmail.com</code> addresses are supported.\n\
- The bot does <b>not</b> create accounts; it only produces dot-trick aliases.\n\
- Progress is stored per address so aliases are never issued twice.\n\
- Check progress with <code>/statusemail</code>.\n\
- Reset progress with <code>/resetemail</code> (asks for confirmation).\n\n\
Respect the <b>Gmail Terms of Service</b> and those of the sites you use."
        .to_string()
}

pub fn ask_email() -> String {
    "Send your <b>Gmail</b> address.\n\nExample: <code>yourname@gmail.com</code>".to_string()
}

pub fn ask_status_email() -> String {
    "Send the <b>Gmail</b> address whose alias progress you want to check.\n\n\
Example: <code>yourname@gmail.com</code>"
        .to_string()
}

pub fn ask_reset_email() -> String {
    "⚠️ <b>RESET ADDRESS PROGRESS</b>\n\n\
Send the <b>Gmail</b> address whose alias progress should be reset.\n\
Aliases recorded as already sent will be forgotten.\n\n\
Example: <code>yourname@gmail.com</code>"
        .to_string()
}

pub fn invalid_email() -> String {
    "❌ Invalid address or not a <code>@gmail.com</code> address.\n\
Correct example: <code>yourname@gmail.com</code>"
        .to_string()
}

pub fn empty_local_part() -> String {
    "The local part is empty after normalization. Try another address.".to_string()
}

pub fn exhausted() -> String {
    "☑️ Every alias combination for this address has already been generated.\n\n\
Use another address or reset progress with <code>/resetemail</code>."
        .to_string()
}

pub fn email_accepted(s: &EmailSummary, batch_limit: u64) -> String {
    let mut out = format!(
        "📧 Address accepted: {}\n\n\
Possible alias combinations (theoretical): <b>{}</b>",
        base_code(&s.base),
        s.theoretical_total
    );
    if s.offset > 0 {
        out.push_str(&format!(
            "\n\n📌 This address was used before:\n\
- Aliases already sent: <b>{}</b>\n\
- Unique aliases still available: <b>{}</b>",
            s.offset, s.remaining
        ));
    }
    out.push_str(&format!(
        "\n\nNow send how many <b>new</b> aliases you want.\n\
Maximum for this address right now: <b>{}</b>",
        s.remaining.min(batch_limit)
    ));
    out.push_str("\n\nExample: <code>100</code>");
    out
}

pub fn invalid_count() -> String {
    "❌ Invalid number.\nSend a positive whole number, for example: <code>50</code>".to_string()
}

pub fn over_batch_limit(limit: u64) -> String {
    format!("❌ Too many for one request.\nSend at most <b>{limit}</b> at a time.")
}

pub fn too_large(remaining: u64) -> String {
    format!(
        "❌ Too large.\nOnly <b>{remaining}</b> new aliases remain for this address.\n\
Send a number ≤ the remaining amount."
    )
}

pub fn batch_header(b: &GeneratedBatch) -> String {
    format!(
        "📧 <b>Gmail Alias Generator</b>\n\n\
Base address: {}\n\
Alias combinations (theoretical): <b>{}</b>\n\
Aliases sent before this: <b>{}</b>\n\
New aliases requested now: <b>{}</b>\n\
Total aliases sent for this address: <b>{}</b>\n\n\
Aliases arrive one per message (monospace) for easy tap &amp; copy.",
        base_code(&b.base),
        b.theoretical_total,
        b.issued_before,
        b.aliases.len(),
        b.issued_after
    )
}

pub fn alias_line(alias: &str) -> String {
    code(alias)
}

pub fn batch_done(b: &GeneratedBatch) -> String {
    format!(
        "✅ Done sending new aliases.\nUnique aliases still available: <b>{}</b>",
        b.remaining
    )
}

pub fn not_saved_warning() -> String {
    "⚠️ Progress could not be saved to disk. It is kept until the bot restarts.".to_string()
}

pub fn status(s: &EmailSummary) -> String {
    format!(
        "📊 <b>Address Alias Status</b>\n\n\
Base address: {}\n\
Theoretical combinations: <b>{}</b>\n\
Aliases already sent: <b>{}</b>\n\
Unique aliases still available: <b>{}</b>\n\n\
To generate new aliases, tap <b>{GENERATE_BUTTON}</b>.",
        base_code(&s.base),
        s.theoretical_total,
        s.offset,
        s.remaining
    )
}

pub fn nothing_to_reset() -> String {
    "No alias progress is recorded for this address.\nNothing to reset.".to_string()
}

pub fn confirm_reset(s: &EmailSummary) -> String {
    format!(
        "⚠️ <b>Confirm Reset</b>\n\n\
Base address: {}\n\
Theoretical combinations: <b>{}</b>\n\
Aliases already sent: <b>{}</b>\n\
Unique aliases still available: <b>{}</b>\n\n\
If you really want to erase this address's progress, type:\n\
<code>YES RESET</code>\n\n\
Type anything else to cancel.",
        base_code(&s.base),
        s.theoretical_total,
        s.offset,
        s.remaining
    )
}

pub fn reset_done(base: &BaseEmail) -> String {
    format!(
        "✅ Alias progress has been reset for:\n\n{}\n\n\
Generating again will start from the beginning.",
        base_code(base)
    )
}

pub fn reset_cancelled() -> String {
    "❎ Reset cancelled.\nAlias progress is unchanged.".to_string()
}

pub fn cancelled() -> String {
    "❎ Cancelled.".to_string()
}

pub fn idle_hint() -> String {
    format!("Tap <b>{GENERATE_BUTTON}</b> to start, or send /start for help.")
}
