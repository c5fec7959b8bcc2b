pub mod progress;
pub mod status_line;
pub mod util;
