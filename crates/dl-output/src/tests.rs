//! Integration tests for dl-output.

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use crate::csv::CsvWriter;
    use crate::row::{ResourceUsageRow, StepLogRow};
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn step_row(step: usize) -> StepLogRow {
        StepLogRow {
            step,
            outcome:     "granted".into(),
            process:     "P1".into(),
            resource:    "R1".into(),
            status:      "P1 → R1 granted".into(),
            state:       "running".into(),
            deadlocked:  false,
            cycle:       String::new(),
            explanation: "P1, R1, and a comma".into(),
        }
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("step_log.csv").exists());
        assert!(dir.path().join("resource_usage.csv").exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("step_log.csv")).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(
            headers,
            ["step", "outcome", "process", "resource", "status", "state", "deadlocked", "cycle", "explanation"]
        );

        let mut rdr = csv::Reader::from_path(dir.path().join("resource_usage.csv")).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers, ["step", "resource", "total", "held", "available", "requested"]);
    }

    #[test]
    fn csv_step_row_quotes_commas() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_step(&step_row(1)).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("step_log.csv")).unwrap();
        let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(&records[0][0], "1");
        assert_eq!(&records[0][6], "0");
        assert_eq!(&records[0][8], "P1, R1, and a comma");
    }

    #[test]
    fn csv_usage_rows() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        let rows = vec![
            ResourceUsageRow { step: 1, resource: "R1".into(), total: 2, held: 1, available: 1, requested: 0 },
            ResourceUsageRow { step: 1, resource: "R2".into(), total: 1, held: 1, available: 0, requested: 1 },
        ];
        w.write_resource_usage(&rows).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("resource_usage.csv")).unwrap();
        let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[1][1], "R2");
        assert_eq!(&records[1][5], "1");
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tmp();
        assert!(CsvWriter::new(&dir.path().join("nope")).is_err());
    }
}

#[cfg(test)]
mod observer_tests {
    use tempfile::TempDir;

    use dl_engine::{Engine, EngineObserver};
    use dl_scenario::Catalog;

    use crate::observer::{step_row, usage_rows};
    use crate::writer::OutputWriter;
    use crate::{CsvWriter, StepLogObserver};

    fn engine(name: &str) -> Engine {
        Engine::from_catalog(&Catalog::builtin().unwrap(), name).unwrap()
    }

    #[test]
    fn rows_from_deadlocked_snapshot() {
        let mut e = engine("classic-2x2");
        e.run_to_completion().unwrap();
        let snap = e.snapshot();

        let row = step_row(&snap);
        assert_eq!(row.step, 4);
        assert_eq!(row.outcome, "waiting");
        assert_eq!(row.process, "P2");
        assert_eq!(row.resource, "R1");
        assert_eq!(row.state, "deadlocked");
        assert!(row.deadlocked);
        assert_eq!(row.cycle, "P1 → R2 → P2 → R1");

        let usage = usage_rows(&snap);
        assert_eq!(usage.len(), 2);
        assert!(usage.iter().all(|u| u.held == 1 && u.available == 0 && u.requested == 1));
    }

    #[test]
    fn full_run_writes_one_row_per_step() {
        let dir: TempDir = tempfile::tempdir().unwrap();
        let mut obs = StepLogObserver::new(CsvWriter::new(dir.path()).unwrap());
        let outcome = engine("ring-3x3").run_observed(&mut obs).unwrap();
        assert!(obs.take_error().is_none());
        assert_eq!(outcome.steps_applied, 6);

        let mut rdr = csv::Reader::from_path(dir.path().join("step_log.csv")).unwrap();
        assert_eq!(rdr.records().count(), 6);

        // 3 resources × 6 steps.
        let mut rdr = csv::Reader::from_path(dir.path().join("resource_usage.csv")).unwrap();
        assert_eq!(rdr.records().count(), 18);
    }

    #[test]
    fn finish_through_observer_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut obs = StepLogObserver::new(CsvWriter::new(dir.path()).unwrap());
        let mut e = engine("release-then-grant");
        let outcome = e.run_observed(&mut obs).unwrap();
        obs.on_finish(&outcome);
        assert!(obs.take_error().is_none());

        let mut writer = obs.into_writer();
        writer.finish().unwrap();
        let mut rdr = csv::Reader::from_path(dir.path().join("step_log.csv")).unwrap();
        assert_eq!(rdr.records().count(), 4);
    }
}
