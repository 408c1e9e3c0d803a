//! Trace export for playback tooling and offline plotting.
//!
//! Columns: `tick,time,x,y,z`, plus `vx,vy,vz` when the outcome carries full snapshots.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::ballistics::engine::{ShotOutcome, TICK_SECONDS};

pub fn write_trace_csv<W: Write>(outcome: &ShotOutcome, writer: W) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);

    if outcome.snapshots.is_empty() {
        out.write_record(["tick", "time", "x", "y", "z"])?;
        for (index, position) in outcome.trace.iter().enumerate() {
            let tick = index + 1;
            out.write_record([
                tick.to_string(),
                format!("{:.2}", tick as f64 * TICK_SECONDS),
                format!("{:.4}", position[0]),
                format!("{:.4}", position[1]),
                format!("{:.4}", position[2]),
            ])?;
        }
    } else {
        out.write_record(["tick", "time", "x", "y", "z", "vx", "vy", "vz"])?;
        for (index, state) in outcome.snapshots.iter().enumerate() {
            out.write_record([
                (index + 1).to_string(),
                format!("{:.2}", state.time),
                format!("{:.4}", state.position.x),
                format!("{:.4}", state.position.y),
                format!("{:.4}", state.position.z),
                format!("{:.4}", state.velocity.x),
                format!("{:.4}", state.velocity.y),
                format!("{:.4}", state.velocity.z),
            ])?;
        }
    }

    out.flush()?;
    Ok(())
}

pub fn export_trace_csv(outcome: &ShotOutcome, path: impl AsRef<Path>) -> Result<(), csv::Error> {
    let file = File::create(path)?;
    write_trace_csv(outcome, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ballistics::engine::{BallisticEngine, BallisticInputs, TraceMode};

    fn shot() -> BallisticInputs {
        BallisticInputs {
            angle_deg: 60.0,
            deflection_deg: 0.0,
            initial_velocity: 40.0,
            shell_weight: 2.0,
            surface_area: 0.01,
            area_of_effect: 0.0,
        }
    }

    #[test]
    fn position_trace_writes_one_row_per_tick() {
        let outcome = BallisticEngine::default().simulate(&shot()).unwrap();
        let mut buffer = Vec::new();
        write_trace_csv(&outcome, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("tick,time,x,y,z"));
        assert_eq!(lines.count() as u32, outcome.ticks);
    }

    #[test]
    fn full_trace_includes_velocity_columns() {
        let outcome = BallisticEngine::default()
            .with_trace_mode(TraceMode::Full)
            .simulate(&shot())
            .unwrap();
        let mut buffer = Vec::new();
        write_trace_csv(&outcome, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("tick,time,x,y,z,vx,vy,vz"));
    }
}
