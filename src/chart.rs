//! # Chart descriptions
//!
//! A chart description file lists the charts a renderer should draw, one per line:
//!
//! ```text
//! # name, ref, dt, targets...
//! inner,,,199,299,399
//! moon,399,60,301,-1000
//! ```
//!
//! * `name` – chart name, `"main"` when empty.
//! * `ref` – reference body id, empty for raw paths.
//! * `dt` – resampling step, empty for event-aligned paths.
//! * `targets` – bodies to draw, every loaded body when empty.
//!
//! Lines starting with `#` are comments; lines with fewer than four fields are skipped.
//! A later line reusing a chart name replaces the earlier chart.
//! [`ChartSpec::curves`] turns a chart into the derived paths to draw.

use std::{io::Read, sync::Arc};

use camino::Utf8Path;
use csv::{ReaderBuilder, StringRecord, Trim};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    constants::BodyId,
    derived_path::{DerivedPath, Frame},
    path_cache::PathCache,
    path_errors::PathError,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub name: String,
    pub reference: Option<BodyId>,
    pub dt: Option<f64>,
    pub targets: Option<Vec<BodyId>>,
}

impl ChartSpec {
    pub fn frame(&self) -> Result<Frame, PathError> {
        Frame::from_query(self.reference, self.dt)
    }

    /// Derived paths to draw for this chart, in body order.
    ///
    /// Unavailable combinations are left out.
    ///
    /// Return
    /// ----------
    /// * The `(body, path)` pairs, or [`PathError::UnknownBody`] if a listed target is not
    ///   loaded, [`PathError::InvalidTimeStep`] for a bad `dt`.
    pub fn curves(&self, cache: &PathCache) -> Result<Vec<(BodyId, Arc<DerivedPath>)>, PathError> {
        let frame = self.frame()?;
        let bodies: Vec<BodyId> = match &self.targets {
            Some(targets) => targets.clone(),
            None => cache.bodies().into_iter().collect(),
        };

        let mut curves = Vec::with_capacity(bodies.len());
        for body in bodies {
            match cache.query(body, frame)? {
                Some(path) => curves.push((body, path)),
                None => debug!("chart {}: nothing to draw for body {body}", self.name),
            }
        }
        Ok(curves)
    }
}

/// Parse chart descriptions from a reader.
pub fn parse_charts<R: Read>(reader: R) -> Result<Vec<ChartSpec>, PathError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .trim(Trim::All)
        .from_reader(reader);

    let mut charts: Vec<ChartSpec> = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if record.len() < 4 {
            continue;
        }
        let chart = parse_record(&record)?;
        match charts.iter_mut().find(|c| c.name == chart.name) {
            Some(existing) => {
                debug!("chart {} redefined", chart.name);
                *existing = chart;
            }
            None => charts.push(chart),
        }
    }
    Ok(charts)
}

/// Parse a chart description file.
pub fn parse_chart_file(path: &Utf8Path) -> Result<Vec<ChartSpec>, PathError> {
    parse_charts(std::fs::File::open(path)?)
}

fn parse_record(record: &StringRecord) -> Result<ChartSpec, PathError> {
    let line = record.position().map_or(0, |p| p.line());
    let field = |i: usize| record.get(i).unwrap_or("");

    let name = match field(0) {
        "" => "main".to_string(),
        s => s.to_string(),
    };
    let reference = parse_opt::<BodyId>(field(1), line, "reference")?;
    let dt = parse_opt::<f64>(field(2), line, "dt")?;

    let targets = record
        .iter()
        .skip(3)
        .filter(|s| !s.is_empty())
        .map(|s| parse_field::<BodyId>(s, line, "target"))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ChartSpec {
        name,
        reference,
        dt,
        targets: (!targets.is_empty()).then_some(targets),
    })
}

fn parse_opt<T: std::str::FromStr>(s: &str, line: u64, what: &str) -> Result<Option<T>, PathError> {
    if s.is_empty() {
        Ok(None)
    } else {
        parse_field(s, line, what).map(Some)
    }
}

fn parse_field<T: std::str::FromStr>(s: &str, line: u64, what: &str) -> Result<T, PathError> {
    s.parse()
        .map_err(|_| PathError::InvalidChartLine(format!("line {line}: invalid {what} '{s}'")))
}
