//! Plain-text rendering of the pool state.
//!
//! One row per worker (failed, ok, running, slot strip), followed by
//! pool totals. Pure: takes stats and views, returns the frame.

use rendergrid_pool::PoolStats;
use rendergrid_worker::WorkerSnapshot;

/// Render one frame of the terminal view.
pub fn render_frame(
    pool_name: &str,
    stats: &PoolStats,
    workers: &[WorkerSnapshot],
    rps: u32,
) -> String {
    let mut out = String::new();

    out.push_str("Failed\tOK\tRunning\tState\n");
    for w in workers {
        out.push_str(&format!(
            " {}\t{}\t{}\t{}\n",
            w.counters.failed,
            w.counters.success,
            w.busy,
            slot_strip(&w.slots)
        ));
    }

    out.push_str(&format!(
        "Pool:\t{pool_name}\tworkers {}\n",
        stats.workers
    ));
    out.push_str(&format!(
        "Slots:\tbusy {}\ttotal {}\t%Util {}\n",
        stats.busy,
        stats.slots,
        percent(stats.utilization)
    ));
    out.push_str(&format!(
        "Jobs:\tok {}\ttotal {}\tfailed {}\n",
        stats.totals.success,
        stats.jobs(),
        stats.totals.failed
    ));
    out.push_str(&format!(
        "Stats:\t%OK: {}\tavgUtil {}\n",
        percent(stats.error_rate.map(|e| 1.0 - e)),
        percent(stats.avg_utilization)
    ));
    out.push_str(&format!("inbound RPS: {rps}\n"));

    out
}

/// `|ab|  |07|`: render ids in hex, blanks for empty slots.
fn slot_strip(slots: &[Option<u8>]) -> String {
    let mut strip = String::from("|");
    for slot in slots {
        match slot {
            Some(id) => strip.push_str(&format!("{id:02x}|")),
            None => strip.push_str("  |"),
        }
    }
    strip
}

fn percent(ratio: Option<f64>) -> String {
    match ratio {
        Some(r) => format!("{:.2}%", r * 100.0),
        None => "-".to_string(),
    }
}
