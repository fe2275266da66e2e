use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

use crate::error::Error;

/// Reserved lane name marking the counting line in a configuration.
pub const COUNT_LINE_NAME: &str = "count";

/// On-disk lane record, as written by the lane authoring tool:
/// `[{"name": "...", "points": [[x, y], ...]}, ...]`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LaneRecord {
    pub name: String,
    pub points: Vec<(f32, f32)>,
}

/// Named polyline in the detection coordinate space, immutable after load.
#[derive(Debug, Clone)]
pub struct Lane {
    pub name: String,
    pub points: Vec<na::Point2<f32>>,
}

impl Lane {
    fn from_record(rec: &LaneRecord) -> Option<Self> {
        if rec.points.len() < 2 {
            return None;
        }

        if rec
            .points
            .iter()
            .any(|&(x, y)| !x.is_finite() || !y.is_finite())
        {
            return None;
        }

        Some(Self {
            name: rec.name.clone(),
            points: rec
                .points
                .iter()
                .map(|&(x, y)| na::Point2::new(x, y))
                .collect(),
        })
    }
}

/// Scorable lanes in declaration order, plus the distinguished counting
/// line, which never participates in nearest-lane voting.
#[derive(Debug, Clone)]
pub struct LaneSet {
    pub lanes: Vec<Lane>,
    pub count_line: Lane,
}

impl LaneSet {
    /// A missing or degenerate counting line is fatal; a degenerate scorable
    /// lane is logged and excluded from voting.
    pub fn from_records(records: &[LaneRecord], count_line_name: &str) -> Result<Self, Error> {
        let mut lanes = Vec::new();
        let mut count_line = None;

        for rec in records {
            let lane = Lane::from_record(rec);

            if rec.name == count_line_name {
                count_line =
                    Some(lane.ok_or_else(|| Error::DegenerateCountLine(rec.name.clone()))?);
            } else {
                match lane {
                    Some(lane) => lanes.push(lane),
                    None => log::warn!("lane {:?} has degenerate geometry, excluded", rec.name),
                }
            }
        }

        let count_line =
            count_line.ok_or_else(|| Error::MissingCountLine(count_line_name.to_string()))?;

        Ok(Self { lanes, count_line })
    }

    pub fn from_reader<R: Read>(reader: R, count_line_name: &str) -> Result<Self, Error> {
        let records: Vec<LaneRecord> = serde_json::from_reader(reader)?;

        Self::from_records(&records, count_line_name)
    }

    pub fn load<P: AsRef<Path>>(path: P, count_line_name: &str) -> Result<Self, Error> {
        Self::from_reader(BufReader::new(File::open(path)?), count_line_name)
    }
}
