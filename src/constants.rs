/// Page-level names the web front end relies on.
///
/// The stylesheet and markup shipped with the page own these; the front end
/// only looks them up.
pub const CANVAS_ID: &str = "stage-canvas";
pub const CANVAS_STYLE: &str = "display:block;position:fixed;top:0;left:0;width:100vw;height:100vh";

// Shown while the asset streams in, hidden once it decodes
pub const LOADING_SELECTOR: &str = ".loading";
// Revealed once the stage is ready to scroll
pub const TUTORIAL_SELECTOR: &str = ".tutorial";
pub const TUTORIAL_DISPLAY: &str = "block";

/// Query-string keys forwarded to `StageConfig::apply_override`.
pub const QUERY_OVERRIDES: [&str; 6] = ["asset", "ratio", "damping", "rate", "touch", "mouse"];

// Progress is logged at most once per whole percent
pub const PROGRESS_LOG_STEP_PCT: f64 = 1.0;
