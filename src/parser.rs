use csv::{Reader, StringRecord};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{AnalyzerError, Result};
use crate::schedule::{Match, Slot, TeamRef};

/// Columns a match CSV must carry. Everything else is optional.
const REQUIRED_COLUMNS: [&str; 6] = ["id", "date", "start_time", "end_time", "team_one_id", "team_two_id"];

/// Column positions resolved from the header row
struct Columns {
    id: usize,
    date: usize,
    start_time: usize,
    end_time: usize,
    team_one_id: usize,
    team_two_id: usize,
    team_one_name: Option<usize>,
    team_two_name: Option<usize>,
    venue: Option<usize>,
    round: Option<usize>,
    match_day_id: Option<usize>,
    completed: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| AnalyzerError::MissingColumn {
                column: name.to_string(),
            })
        };

        Ok(Self {
            id: require(REQUIRED_COLUMNS[0])?,
            date: require(REQUIRED_COLUMNS[1])?,
            start_time: require(REQUIRED_COLUMNS[2])?,
            end_time: require(REQUIRED_COLUMNS[3])?,
            team_one_id: require(REQUIRED_COLUMNS[4])?,
            team_two_id: require(REQUIRED_COLUMNS[5])?,
            team_one_name: find("team_one_name"),
            team_two_name: find("team_two_name"),
            venue: find("venue"),
            round: find("round"),
            match_day_id: find("match_day_id"),
            completed: find("completed"),
        })
    }
}

/// Accepted JSON layouts: a bare array or an object with a `matches` field
#[derive(Deserialize)]
#[serde(untagged)]
enum MatchFile {
    List(Vec<Match>),
    Wrapped { matches: Vec<Match> },
}

/// Parses a boolean value from various string representations
fn parse_bool(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    lower == "yes" || lower == "true" || lower == "1"
}

fn field(record: &StringRecord, col: usize) -> String {
    record.get(col).unwrap_or("").trim().to_string()
}

/// Optional text column; blank cells become `None`
fn optional_field(record: &StringRecord, col: Option<usize>) -> Option<String> {
    col.map(|c| field(record, c)).filter(|v| !v.is_empty())
}

/// Loads matches from a `.csv` or `.json` file, chosen by extension
pub fn load_matches<P: AsRef<Path>>(path: P) -> Result<Vec<Match>> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let matches = match extension.as_deref() {
        Some("csv") => load_matches_from_csv_reader(File::open(path)?)?,
        Some("json") => load_matches_from_json(std::fs::read(path)?)?,
        _ => {
            return Err(AnalyzerError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    };

    debug!(path = %path.display(), count = matches.len(), "matches loaded");
    Ok(matches)
}

/// Reads matches from CSV. Columns are looked up by header name, so their order is free.
///
/// Cells are kept as written: malformed dates or times load fine and are reported by the
/// analyzer. A row repeating an earlier id replaces that row in place.
pub fn load_matches_from_csv_reader<R: Read>(input: R) -> Result<Vec<Match>> {
    let mut reader = Reader::from_reader(input);
    let columns = Columns::from_headers(reader.headers()?)?;

    let mut matches: Vec<Match> = Vec::new();
    // Tracks row position per id for handling re-submitted rows
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (line, result) in reader.records().enumerate() {
        let record = result?;

        let id = field(&record, columns.id);
        if id.is_empty() {
            warn!(row = line + 1, "skipping row without a match id");
            continue;
        }

        let team_one_id = field(&record, columns.team_one_id);
        let team_two_id = field(&record, columns.team_two_id);
        let team_one_name = optional_field(&record, columns.team_one_name).unwrap_or_default();
        let team_two_name = optional_field(&record, columns.team_two_name).unwrap_or_default();

        let entry = Match {
            id: id.clone(),
            date: field(&record, columns.date),
            start_time: field(&record, columns.start_time),
            end_time: field(&record, columns.end_time),
            venue: optional_field(&record, columns.venue),
            round: optional_field(&record, columns.round),
            match_day_id: optional_field(&record, columns.match_day_id),
            team_one: TeamRef::new(team_one_id, team_one_name),
            team_two: TeamRef::new(team_two_id, team_two_name),
            completed: columns
                .completed
                .map(|c| parse_bool(record.get(c).unwrap_or("")))
                .unwrap_or(false),
        };

        if let Some(&existing) = positions.get(&id) {
            debug!(match_id = %id, "duplicate match id, keeping the later row");
            matches[existing] = entry;
        } else {
            positions.insert(id, matches.len());
            matches.push(entry);
        }
    }

    Ok(matches)
}

/// Reads matches from JSON (camelCase fields). The bytes must be valid UTF-8.
pub fn load_matches_from_json<B: AsRef<[u8]>>(contents: B) -> Result<Vec<Match>> {
    let file: MatchFile = serde_json::from_slice(contents.as_ref())?;
    Ok(match file {
        MatchFile::List(matches) => matches,
        MatchFile::Wrapped { matches } => matches,
    })
}

/// Reads a JSON array of open slots offered to slot-based fixes
pub fn load_slots<P: AsRef<Path>>(path: P) -> Result<Vec<Slot>> {
    let contents = std::fs::read(path)?;
    Ok(serde_json::from_slice(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    const HEADER: &str =
        "id,date,start_time,end_time,venue,round,match_day_id,team_one_id,team_one_name,team_two_id,team_two_name,completed";

    #[test]
    fn parses_full_rows() {
        let csv = format!(
            "{}\nm1,2024-06-01,10:00,11:00,Field 1,Group A,R1,a,Lions,b,Tigers,no\n\
             m2,2024-06-01,11:30,12:30,,,,a,Lions,c,,yes\n",
            HEADER
        );
        let matches = load_matches_from_csv_reader(csv.as_bytes()).unwrap();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].venue.as_deref(), Some("Field 1"));
        assert_eq!(matches[0].match_day_id.as_deref(), Some("R1"));
        assert_eq!(matches[0].team_two, TeamRef::new("b", "Tigers"));
        assert!(!matches[0].completed);

        assert_eq!(matches[1].venue, None);
        assert_eq!(matches[1].round, None);
        assert_eq!(matches[1].team_two.label(), "c");
        assert!(matches[1].completed);
    }

    #[test]
    fn header_order_and_case_do_not_matter() {
        let csv = "Team_Two_Id,END_TIME,Start_Time,Date,ID,team_one_id\nb,11:00,10:00,2024-06-01,m1,a\n";
        let matches = load_matches_from_csv_reader(csv.as_bytes()).unwrap();

        assert_eq!(matches[0].id, "m1");
        assert_eq!(matches[0].start_time, "10:00");
        assert_eq!(matches[0].team_one.id, "a");
        assert_eq!(matches[0].team_two.id, "b");
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let csv = "id,date,start_time,team_one_id,team_two_id\nm1,2024-06-01,10:00,a,b\n";
        let err = load_matches_from_csv_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, AnalyzerError::MissingColumn { ref column } if column == "end_time"));
    }

    #[test]
    fn malformed_values_are_kept_for_analysis() {
        let csv = format!("{}\nm1,June 1st,10am,11:00,,,,a,,b,,\n", HEADER);
        let matches = load_matches_from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(matches[0].date, "June 1st");
        assert_eq!(matches[0].start_time, "10am");
    }

    #[test]
    fn duplicate_ids_replace_in_place() {
        let csv = format!(
            "{}\nm1,2024-06-01,10:00,11:00,,,,a,,b,,\n\
             m2,2024-06-01,12:00,13:00,,,,c,,d,,\n\
             m1,2024-06-02,10:00,11:00,,,,a,,b,,\n\
             ,2024-06-02,10:00,11:00,,,,x,,y,,\n",
            HEADER
        );
        let matches = load_matches_from_csv_reader(csv.as_bytes()).unwrap();

        let ids: Vec<&str> = matches.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2"]);
        assert_eq!(matches[0].date, "2024-06-02");
    }

    #[test]
    fn json_array_and_wrapped_object() {
        let list = r#"[{"id":"m1","date":"2024-06-01","startTime":"10:00","endTime":"11:00",
            "teamOne":{"id":"a","name":"Lions"},"teamTwo":{"id":"b"}}]"#;
        let matches = load_matches_from_json(list).unwrap();
        assert_eq!(matches[0].start_time, "10:00");
        assert_eq!(matches[0].team_two.name, "");
        assert!(!matches[0].completed);

        let wrapped = format!(r#"{{"matches": {}}}"#, list);
        assert_eq!(load_matches_from_json(&wrapped).unwrap(), matches);
    }

    #[test]
    fn json_with_invalid_utf8_is_an_error() {
        let bytes: &[u8] = b"[{\"id\":\"m1\",\"date\":\"2024-06-01\",\"startTime\":\"10:00\",\"endTime\":\"11:00\",\"teamOne\":{\"id\":\"\xff\"},\"teamTwo\":{\"id\":\"b\"}}]";
        let err = load_matches_from_json(bytes).unwrap_err();
        assert!(matches!(err, AnalyzerError::Json(_)), "{:?}", err);
    }

    #[test]
    fn load_from_file_by_extension() {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        writeln!(file, "m1,2024-06-01,10:00,11:00,,,,a,,b,,").unwrap();

        let matches = load_matches(file.path()).unwrap();
        assert_eq!(matches.len(), 1);

        let other = Builder::new().suffix(".xlsx").tempfile().unwrap();
        assert!(matches!(
            load_matches(other.path()),
            Err(AnalyzerError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn slots_from_json_file() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"day":"2024-06-03","startTime":"10:00","endTime":"11:00","venue":"Field 2"}},
               {{"day":"R4","startTime":"12:00","endTime":"13:00"}}]"#
        )
        .unwrap();

        let slots = load_slots(file.path()).unwrap();
        assert_eq!(slots[0].day, "2024-06-03");
        assert_eq!(slots[0].venue.as_deref(), Some("Field 2"));
        assert_eq!(slots[1].day, "R4");
        assert_eq!(slots[1].venue, None);
    }
}
