// ABOUTME: Version and banner constants for the interpreter front end

pub const VERSION: &str = "1.0.0";
pub const IDENT_BANNER: &str = "AbstractScript interpreter, written in Rust";
pub const WELCOME_MESSAGE: &str = "AbstractScript v1.0";
pub const WELCOME_HINT: &str = "Type a statement to evaluate it; 'exit' or Ctrl-D leaves.";
pub const PROMPT: &str = "as> ";
pub const HISTORY_FILE: &str = ".abscript_history";
