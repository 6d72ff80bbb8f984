use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::io::Write;

use super::TimelineSink;
use crate::domain::ExportError;
use crate::profiling::Invocation;

/// Chrome Trace Event format
/// Format reference: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU/preview
#[derive(Debug, Clone, Serialize)]
struct ChromeTraceEvent {
    /// Event name (function name or marker label)
    name: String,
    /// Category for filtering/coloring
    cat: &'static str,
    /// Phase: "X" = complete, "I" = instant
    ph: &'static str,
    /// Timestamp in timeline units
    ts: f64,
    /// Duration, complete events only
    #[serde(skip_serializing_if = "Option::is_none")]
    dur: Option<f64>,
    /// Process ID
    pid: u32,
    /// Thread ID
    tid: u32,
    /// Instant event scope ("p" = process)
    #[serde(skip_serializing_if = "Option::is_none")]
    s: Option<&'static str>,
    /// Arguments (metadata)
    args: HashMap<String, JsonValue>,
}

/// Category of function spans
const FUNCTION_CATEGORY: &str = "arm";

/// Category of debug markers
const MARKER_CATEGORY: &str = "dbg";

/// Streams trace events as a JSON array, one event per line
///
/// The array is opened on the first write and closed by
/// [`TimelineSink::finish`], so the output is well-formed even when the run
/// is interrupted.
pub struct ChromeTraceWriter<W: Write> {
    writer: W,
    pid: u32,
    tid: u32,
    started: bool,
    event_count: usize,
}

impl<W: Write> ChromeTraceWriter<W> {
    /// Create a writer emitting all events on process 1, thread 1
    pub fn new(writer: W) -> Self {
        Self { writer, pid: 1, tid: 1, started: false, event_count: 0 }
    }

    /// Get the number of events written
    pub fn event_count(&self) -> usize {
        self.event_count
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn ensure_started(&mut self) -> Result<(), ExportError> {
        if !self.started {
            self.writer.write_all(b"[\n")?;
            self.started = true;
        }
        Ok(())
    }

    fn write_event(&mut self, event: &ChromeTraceEvent) -> Result<(), ExportError> {
        self.ensure_started()?;
        if self.event_count > 0 {
            self.writer.write_all(b",\n")?;
        }
        serde_json::to_writer(&mut self.writer, event)?;
        self.event_count += 1;
        Ok(())
    }
}

impl<W: Write> TimelineSink for ChromeTraceWriter<W> {
    fn write_invocation(&mut self, invocation: &Invocation) -> Result<(), ExportError> {
        let event = ChromeTraceEvent {
            name: invocation.name.clone(),
            cat: FUNCTION_CATEGORY,
            ph: "X", // Complete
            ts: invocation.start,
            dur: Some(invocation.duration),
            pid: self.pid,
            tid: self.tid,
            s: None,
            args: HashMap::new(),
        };
        self.write_event(&event)
    }

    fn write_marker(&mut self, ts: f64, label: &str) -> Result<(), ExportError> {
        let event = ChromeTraceEvent {
            name: label.to_owned(),
            cat: MARKER_CATEGORY,
            ph: "I", // Instant
            ts,
            dur: None,
            pid: self.pid,
            tid: self.tid,
            s: Some("p"),
            args: HashMap::new(),
        };
        self.write_event(&event)
    }

    fn finish(&mut self) -> Result<(), ExportError> {
        self.ensure_started()?;
        self.writer.write_all(b"\n]\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiling::InstructionCounters;

    fn invocation(name: &str, start: f64, duration: f64) -> Invocation {
        Invocation {
            name: name.to_string(),
            start,
            duration,
            counters: InstructionCounters::default(),
        }
    }

    fn finish(writer: ChromeTraceWriter<Vec<u8>>) -> serde_json::Value {
        let mut writer = writer;
        writer.finish().unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        serde_json::from_str(&text).expect("valid JSON")
    }

    #[test]
    fn test_complete_event_fields() {
        let mut writer = ChromeTraceWriter::new(Vec::new());
        writer.write_invocation(&invocation("arm_mat_mult", 1.5, 2.25)).unwrap();
        assert_eq!(writer.event_count(), 1);

        let parsed = finish(writer);
        let event = &parsed[0];
        assert_eq!(event["name"], "arm_mat_mult");
        assert_eq!(event["cat"], "arm");
        assert_eq!(event["ph"], "X");
        assert_eq!(event["ts"], 1.5);
        assert_eq!(event["dur"], 2.25);
        assert_eq!(event["pid"], 1);
        assert_eq!(event["tid"], 1);
        assert!(event["args"].as_object().unwrap().is_empty());
        assert!(event.get("s").is_none());
    }

    #[test]
    fn test_instant_marker_fields() {
        let mut writer = ChromeTraceWriter::new(Vec::new());
        writer.write_marker(3.0, "DBG start conv").unwrap();

        let parsed = finish(writer);
        let event = &parsed[0];
        assert_eq!(event["ph"], "I");
        assert_eq!(event["cat"], "dbg");
        assert_eq!(event["s"], "p");
        assert_eq!(event["name"], "DBG start conv");
        assert!(event.get("dur").is_none());
    }

    #[test]
    fn test_events_in_emission_order() {
        let mut writer = ChromeTraceWriter::new(Vec::new());
        writer.write_invocation(&invocation("inner", 2.0, 1.0)).unwrap();
        writer.write_invocation(&invocation("outer", 1.0, 5.0)).unwrap();

        let parsed = finish(writer);
        let names: Vec<&str> =
            parsed.as_array().unwrap().iter().map(|e| e["name"].as_str().unwrap()).collect();
        assert_eq!(names, ["inner", "outer"]);
    }

    #[test]
    fn test_empty_trace_is_valid_json() {
        let parsed = finish(ChromeTraceWriter::new(Vec::new()));
        assert_eq!(parsed.as_array().unwrap().len(), 0);
    }
}
