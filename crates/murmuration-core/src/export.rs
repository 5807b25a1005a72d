//! Transformation Export
//!
//! Streams transformation records out of a running simulation as JSON lines.
//! The writer remembers how many records it has already exported, so it can
//! be called after every tick and only emits what is new.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::simulation::Simulation;

pub struct TransformationWriter<W: Write> {
    out: W,
    exported: usize,
}

impl TransformationWriter<BufWriter<File>> {
    /// Creates (or truncates) a JSONL file at `path`
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::from_writer(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> TransformationWriter<W> {
    pub fn from_writer(out: W) -> Self {
        Self { out, exported: 0 }
    }

    /// Records written so far
    pub fn exported(&self) -> usize {
        self.exported
    }

    /// Writes every record the simulation produced since the previous call.
    ///
    /// Returns how many records were written.
    pub fn export_new(&mut self, sim: &Simulation) -> io::Result<usize> {
        let total = sim.health().total_transformations;
        let fresh = total.saturating_sub(self.exported);
        if fresh == 0 {
            return Ok(0);
        }

        for record in sim.recent_transformations(fresh) {
            serde_json::to_writer(&mut self.out, &record)?;
            self.out.write_all(b"\n")?;
        }
        self.exported = total;
        Ok(fresh)
    }

    /// Flushes and hands back the underlying writer
    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use murmuration_events::{MemberKind, TransformationRecord};

    fn sim_with_members() -> Simulation {
        let mut sim = Simulation::new(SimulationConfig::default(), 42).unwrap();
        for id in ["raven", "owl", "falcon"] {
            sim.add_member(id, MemberKind::Standard).unwrap();
        }
        sim
    }

    fn parse_lines(bytes: &[u8]) -> Vec<TransformationRecord> {
        String::from_utf8(bytes.to_vec())
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_exports_only_new_records() {
        let mut sim = sim_with_members();
        let mut writer = TransformationWriter::from_writer(Vec::new());
        assert_eq!(writer.export_new(&sim).unwrap(), 0);

        sim.trigger_transformation("owl");
        sim.trigger_transformation("raven");
        assert_eq!(writer.export_new(&sim).unwrap(), 2);
        assert_eq!(writer.export_new(&sim).unwrap(), 0);

        sim.trigger_transformation("falcon");
        assert_eq!(writer.export_new(&sim).unwrap(), 1);
        assert_eq!(writer.exported(), 3);

        let records = parse_lines(&writer.finish().unwrap());
        let nodes: Vec<&str> = records.iter().map(|r| r.node_id.as_str()).collect();
        assert_eq!(nodes, vec!["owl", "raven", "falcon"]);
        assert_eq!(records, sim.recent_transformations(usize::MAX));
    }

    #[test]
    fn test_create_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transformations.jsonl");

        let mut sim = sim_with_members();
        sim.trigger_transformation("owl");

        let mut writer = TransformationWriter::create(&path).unwrap();
        writer.export_new(&sim).unwrap();
        writer.finish().unwrap();

        let contents = std::fs::read(&path).unwrap();
        let records = parse_lines(&contents);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].node_id, "owl");
        assert!(records[0].is_self_triggered());
    }
}
