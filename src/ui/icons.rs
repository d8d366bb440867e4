//! Shared UI icons.
//!
//! Emoji with plain-text fallbacks for terminals that cannot render them.

use console::Emoji;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[WARN]");
pub static SKIP: Emoji<'_, '_> = Emoji("⏭️  ", "[SKIP]");
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "*");

// Phase indicators
pub static RUNNING: Emoji<'_, '_> = Emoji("▶️  ", "[>]");
pub static CHAT: Emoji<'_, '_> = Emoji("💬 ", "[I]");
pub static FOLDER: Emoji<'_, '_> = Emoji("📁 ", "");
