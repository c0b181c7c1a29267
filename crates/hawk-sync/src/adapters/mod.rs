//! Host tool adapters.

pub mod antigravity;
pub mod claude;
pub mod codex;
pub mod cursor;
pub mod gemini;
pub mod opencode;

use std::path::Path;

use crate::adapter::ToolAdapter;

pub use antigravity::AntigravityAdapter;
pub use claude::ClaudeAdapter;
pub use codex::CodexAdapter;
pub use cursor::CursorAdapter;
pub use gemini::GeminiAdapter;
pub use opencode::OpencodeAdapter;

/// All adapters in the stable processing order.
pub fn default_adapters(home: &Path) -> Vec<Box<dyn ToolAdapter>> {
    vec![
        Box::new(AntigravityAdapter::new(home)),
        Box::new(ClaudeAdapter::new(home)),
        Box::new(CodexAdapter::new(home)),
        Box::new(CursorAdapter::new(home)),
        Box::new(GeminiAdapter::new(home)),
        Box::new(OpencodeAdapter::new(home)),
    ]
}
