use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use log::{debug, info};
use crate::data::labels::{self, LabelRegion};
use crate::data::EpgError;
const TIME_COLUMN: &str = "time";
const PRE_COLUMN: &str = "pre_rect";
const POST_COLUMN: &str = "post_rect";
const GENERIC_VOLTAGE_COLUMNS: [&str; 2] = ["voltage", "volts"];
const LABEL_COLUMN: &str = "labels";
const COMMENT_COLUMN: &str = "comments";
/// Which rectifier stage the voltage trace comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Prepost {
    Pre,
    #[default]
    Post,
}
impl Prepost {
    pub fn column(&self) -> &'static str {
        match self {
            Prepost::Pre => PRE_COLUMN,
            Prepost::Post => POST_COLUMN,
        }
    }
}
/// One loaded recording: time, voltages, per-sample labels and comments.
#[derive(Clone, Debug, Default)]
pub struct Recording {
    time: Vec<f64>,
    pre_rect: Option<Vec<f64>>,
    post_rect: Option<Vec<f64>>,
    labels: Vec<Option<String>>,
    comments: Vec<Option<String>>,
}
impl Recording {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EpgError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(file)
    }
    /// Parse a CSV table. Label and comment columns are optional and created
    /// empty when absent.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, EpgError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers: Vec<String> = rdr
            .headers()?
            .iter()
            .map(|h| h.to_ascii_lowercase())
            .collect();
        let find = |name: &str| headers.iter().position(|h| h == name);
        let time_idx = find(TIME_COLUMN).ok_or(EpgError::MissingColumn(TIME_COLUMN))?;
        let pre_idx = find(PRE_COLUMN);
        let post_idx = find(POST_COLUMN);
        let generic_idx = GENERIC_VOLTAGE_COLUMNS.iter().find_map(|name| find(name));
        if pre_idx.is_none() && post_idx.is_none() && generic_idx.is_none() {
            return Err(EpgError::NoVoltageColumn);
        }
        let label_idx = find(LABEL_COLUMN);
        let comment_idx = find(COMMENT_COLUMN);
        let mut recording = Recording {
            pre_rect: pre_idx.map(|_| Vec::new()),
            post_rect: post_idx.or(generic_idx).map(|_| Vec::new()),
            ..Default::default()
        };
        for (row, record) in rdr.records().enumerate() {
            let record = record?;
            let number = |idx: usize, column: &str| -> Result<f64, EpgError> {
                let raw = record.get(idx).unwrap_or("");
                raw.parse::<f64>().map_err(|_| EpgError::InvalidNumber {
                    column: column.to_owned(),
                    row,
                    value: raw.to_owned(),
                })
            };
            let text = |idx: Option<usize>| {
                idx.and_then(|i| record.get(i))
                    .filter(|s| !s.is_empty() && *s != "nan")
                    .map(str::to_owned)
            };
            recording.time.push(number(time_idx, TIME_COLUMN)?);
            if let (Some(idx), Some(col)) = (pre_idx, recording.pre_rect.as_mut()) {
                col.push(number(idx, PRE_COLUMN)?);
            }
            if let (Some(idx), Some(col)) = (post_idx.or(generic_idx), recording.post_rect.as_mut())
            {
                col.push(number(idx, POST_COLUMN)?);
            }
            recording.labels.push(text(label_idx));
            recording.comments.push(text(comment_idx));
        }
        check_monotonic(&recording.time)?;
        Ok(recording)
    }
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), EpgError> {
        let file = File::create(path.as_ref())?;
        self.write_to(file)
    }
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), EpgError> {
        let mut wtr = csv::Writer::from_writer(writer);
        let mut header = vec![TIME_COLUMN];
        if self.pre_rect.is_some() {
            header.push(PRE_COLUMN);
        }
        if self.post_rect.is_some() {
            header.push(POST_COLUMN);
        }
        header.extend([LABEL_COLUMN, COMMENT_COLUMN]);
        wtr.write_record(&header)?;
        for i in 0..self.len() {
            let mut row = vec![self.time[i].to_string()];
            for col in [&self.pre_rect, &self.post_rect].into_iter().flatten() {
                row.push(col[i].to_string());
            }
            row.push(self.labels[i].clone().unwrap_or_default());
            row.push(self.comments[i].clone().unwrap_or_default());
            wtr.write_record(&row)?;
        }
        wtr.flush()?;
        Ok(())
    }
    pub fn len(&self) -> usize {
        self.time.len()
    }
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
    pub fn times(&self) -> &[f64] {
        &self.time
    }
    pub fn labels(&self) -> &[Option<String>] {
        &self.labels
    }
    /// Time of the last sample, zero when empty.
    pub fn duration(&self) -> f64 {
        self.time.last().copied().unwrap_or(0.0)
    }
    /// Voltage trace for `prepost`, falling back to the other stage when absent.
    pub fn volts(&self, prepost: Prepost) -> &[f64] {
        let (wanted, other) = match prepost {
            Prepost::Pre => (&self.pre_rect, &self.post_rect),
            Prepost::Post => (&self.post_rect, &self.pre_rect),
        };
        wanted
            .as_deref()
            .or(other.as_deref())
            .unwrap_or(&[])
    }
    pub fn transitions(&self) -> Vec<(f64, Option<String>)> {
        labels::transitions(&self.time, &self.labels)
    }
    /// Rewrite the label column so every sample takes the label of the last
    /// transition at or before it.
    pub fn set_transitions(&mut self, transitions: &[(f64, Option<String>)]) {
        let mut sorted = transitions.to_vec();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
        let mut next = 0;
        let mut current: Option<String> = None;
        for (time, label) in self.time.iter().zip(self.labels.iter_mut()) {
            while next < sorted.len() && sorted[next].0 <= *time {
                current = sorted[next].1.clone();
                next += 1;
            }
            *label = current.clone();
        }
    }
    pub fn label_regions(&self) -> Vec<LabelRegion> {
        labels::derive_regions(&self.time, &self.labels)
    }
    /// Index of the sample nearest to `t`.
    pub fn nearest_index(&self, t: f64) -> Option<usize> {
        if self.time.is_empty() {
            return None;
        }
        let idx = self.time.partition_point(|&v| v < t);
        if idx == 0 {
            return Some(0);
        }
        if idx == self.time.len() {
            return Some(idx - 1);
        }
        if (t - self.time[idx - 1]).abs() <= (self.time[idx] - t).abs() {
            Some(idx - 1)
        } else {
            Some(idx)
        }
    }
    /// Snapped time and existing comment of the sample nearest to `t`.
    pub fn comment_near(&self, t: f64) -> Option<(f64, Option<&str>)> {
        let idx = self.nearest_index(t)?;
        Some((self.time[idx], self.comments[idx].as_deref()))
    }
    pub fn comments(&self) -> Vec<(f64, String)> {
        self.time
            .iter()
            .zip(&self.comments)
            .filter_map(|(t, c)| c.as_ref().map(|c| (*t, c.clone())))
            .collect()
    }
    /// Attach `text` to the sample nearest `t`. Blank text is ignored.
    ///
    /// Returns the snapped time and the comment it replaced.
    pub fn add_comment(&mut self, t: f64, text: &str) -> Option<(f64, Option<String>)> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let idx = self.nearest_index(t)?;
        let previous = self.comments[idx].replace(text.to_owned());
        debug!("comment at {:.3}s set", self.time[idx]);
        Some((self.time[idx], previous))
    }
    pub fn delete_comment(&mut self, time: f64) -> Option<String> {
        let idx = self.time.iter().position(|&t| t == time)?;
        self.comments[idx].take()
    }
    /// Move the comment at `old_time` to the sample nearest `t`; returns the new time.
    pub fn move_comment(&mut self, old_time: f64, t: f64) -> Option<f64> {
        let text = self.delete_comment(old_time)?;
        let idx = self.nearest_index(t)?;
        self.comments[idx] = Some(text);
        Some(self.time[idx])
    }
}
fn check_monotonic(time: &[f64]) -> Result<(), EpgError> {
    for (row, pair) in time.windows(2).enumerate() {
        if pair[1] < pair[0] {
            return Err(EpgError::NonMonotonicTime {
                row: row + 1,
                previous: pair[0],
                current: pair[1],
            });
        }
    }
    Ok(())
}
/// All loaded recordings, keyed by the path they were loaded from.
#[derive(Default)]
pub struct EpgData {
    dfs: HashMap<String, Recording>,
    current_file: Option<String>,
}
impl EpgData {
    pub fn new() -> Self {
        Self::default()
    }
    /// Load `path` and make it the current file. Reloading replaces the entry.
    pub fn load_data(&mut self, path: impl AsRef<Path>) -> Result<String, EpgError> {
        let path = path.as_ref();
        let recording = Recording::load(path)?;
        let key = path.to_string_lossy().into_owned();
        info!(
            "loaded {} ({} samples, {:.1}s)",
            key,
            recording.len(),
            recording.duration()
        );
        Ok(self.insert(key, recording))
    }
    pub fn insert(&mut self, key: impl Into<String>, recording: Recording) -> String {
        let key = key.into();
        self.dfs.insert(key.clone(), recording);
        self.current_file = Some(key.clone());
        key
    }
    pub fn current_file(&self) -> Option<&str> {
        self.current_file.as_deref()
    }
    pub fn get(&self, file: &str) -> Result<&Recording, EpgError> {
        self.dfs
            .get(file)
            .ok_or_else(|| EpgError::UnknownFile(file.to_owned()))
    }
    pub fn get_mut(&mut self, file: &str) -> Result<&mut Recording, EpgError> {
        self.dfs
            .get_mut(file)
            .ok_or_else(|| EpgError::UnknownFile(file.to_owned()))
    }
    pub fn get_recording(&self, file: &str, prepost: Prepost) -> Result<(&[f64], &[f64]), EpgError> {
        let recording = self.get(file)?;
        Ok((recording.times(), recording.volts(prepost)))
    }
    pub fn get_transitions(&self, file: &str) -> Result<Vec<(f64, Option<String>)>, EpgError> {
        Ok(self.get(file)?.transitions())
    }
    pub fn set_transitions(
        &mut self,
        file: &str,
        transitions: &[(f64, Option<String>)],
    ) -> Result<(), EpgError> {
        self.get_mut(file)?.set_transitions(transitions);
        Ok(())
    }
    pub fn save(&self, file: &str, path: impl AsRef<Path>) -> Result<(), EpgError> {
        self.get(file)?.save(path.as_ref())?;
        info!("saved {} to {}", file, path.as_ref().display());
        Ok(())
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    const CSV: &str = "time,pre_rect,post_rect,labels\n\
        0.0,0.1,1.0,A\n\
        0.5,0.2,2.0,A\n\
        1.0,0.3,3.0,B\n\
        1.5,0.4,4.0,\n";
    fn sample() -> Recording {
        Recording::from_reader(CSV.as_bytes()).unwrap()
    }
    #[test]
    fn loads_columns_and_creates_comments() {
        let rec = sample();
        assert_eq!(rec.len(), 4);
        assert_eq!(rec.volts(Prepost::Pre), &[0.1, 0.2, 0.3, 0.4]);
        assert_eq!(rec.volts(Prepost::Post), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(rec.labels()[3], None);
        assert!(rec.comments().is_empty());
        assert_eq!(rec.duration(), 1.5);
    }
    #[test]
    fn generic_voltage_column_serves_both_stages() {
        let rec = Recording::from_reader("Time,Voltage\n0,5\n1,6\n".as_bytes()).unwrap();
        assert_eq!(rec.volts(Prepost::Pre), &[5.0, 6.0]);
        assert_eq!(rec.volts(Prepost::Post), &[5.0, 6.0]);
    }
    #[test]
    fn rejects_bad_tables() {
        assert!(matches!(
            Recording::from_reader("time,post_rect\n1,0\n0,0\n".as_bytes()),
            Err(EpgError::NonMonotonicTime { row: 1, .. })
        ));
        assert!(matches!(
            Recording::from_reader("post_rect\n1\n".as_bytes()),
            Err(EpgError::MissingColumn("time"))
        ));
        assert!(matches!(
            Recording::from_reader("time,labels\n1,A\n".as_bytes()),
            Err(EpgError::NoVoltageColumn)
        ));
        assert!(matches!(
            Recording::from_reader("time,post_rect\n1,abc\n".as_bytes()),
            Err(EpgError::InvalidNumber { row: 0, .. })
        ));
    }
    #[test]
    fn transitions_round_trip() {
        let mut rec = sample();
        let transitions = rec.transitions();
        assert_eq!(
            transitions,
            vec![
                (0.0, Some("A".to_owned())),
                (1.0, Some("B".to_owned())),
                (1.5, None),
            ]
        );
        rec.set_transitions(&[(0.5, Some("C".to_owned())), (0.0, Some("A".to_owned()))]);
        let labels: Vec<_> = rec.labels().iter().map(|l| l.as_deref()).collect();
        assert_eq!(labels, vec![Some("A"), Some("C"), Some("C"), Some("C")]);
    }
    #[test]
    fn comments_snap_move_and_delete() {
        let mut rec = sample();
        assert_eq!(rec.add_comment(0.6, "   "), None);
        assert_eq!(rec.add_comment(0.6, " probe "), Some((0.5, None)));
        assert_eq!(
            rec.add_comment(0.4, "stylet"),
            Some((0.5, Some("probe".to_owned())))
        );
        assert_eq!(rec.comment_near(0.55), Some((0.5, Some("stylet"))));
        assert_eq!(rec.move_comment(0.5, 1.4), Some(1.5));
        assert_eq!(rec.comments(), vec![(1.5, "stylet".to_owned())]);
        assert_eq!(rec.delete_comment(1.5), Some("stylet".to_owned()));
        assert!(rec.comments().is_empty());
    }
    #[test]
    fn saved_table_loads_back() {
        let mut rec = sample();
        rec.add_comment(1.0, "note, with comma");
        let mut out = Vec::new();
        rec.write_to(&mut out).unwrap();
        let back = Recording::from_reader(out.as_slice()).unwrap();
        assert_eq!(back.times(), rec.times());
        assert_eq!(back.labels(), rec.labels());
        assert_eq!(back.comments(), vec![(1.0, "note, with comma".to_owned())]);
    }
    #[test]
    fn store_reports_unknown_files() {
        let mut store = EpgData::new();
        assert!(matches!(
            store.get_recording("missing.csv", Prepost::Post),
            Err(EpgError::UnknownFile(_))
        ));
        let key = store.insert("a.csv", sample());
        assert_eq!(store.current_file(), Some("a.csv"));
        let (t, v) = store.get_recording(&key, Prepost::Post).unwrap();
        assert_eq!(t.len(), v.len());
        assert_eq!(store.get_transitions(&key).unwrap().len(), 3);
    }
}
