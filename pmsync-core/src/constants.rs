/// Calendar each owner's tasks are mirrored into.
pub const DEFAULT_CALENDAR_NAME: &str = "PM Tool";

/// Attempts per store operation before the engine gives up.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 5;

/// Working window start hour (UTC).
pub const DEFAULT_WORKDAY_START_HOUR: u32 = 9;

/// Working window length, which is also the per-day booking limit.
pub const DEFAULT_HOURS_PER_DAY: f64 = 8.0;

/// Prefix of the tool-private event properties.
pub const EXTENSION_PREFIX: &str = "x-pm-tool-";

/// Category attached to every mirrored event.
pub const TASK_CATEGORY: &str = "PM Tool Task";

/// Upper bound on a task's estimate or duration, about five working years.
pub const MAX_TASK_HOURS: f64 = 10_000.0;

/// Hours below this are treated as zero by the scheduler.
pub const HOURS_EPSILON: f64 = 1e-9;

pub const PRODID: &str = "-//pmsync//Sync Core//EN";
