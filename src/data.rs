use crate::error::{GraphError, Result};
use serde_json::Value;
use std::io::Read;

/// One category of a count pictogram
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDatum {
    pub label: String,
    pub count: u64,
}

impl CategoryDatum {
    pub fn new(label: impl Into<String>, count: u64) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

/// Chart input. Order is significant everywhere: it drives colors and
/// placement.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    /// Ordered category → count mapping
    Counts(Vec<CategoryDatum>),
    /// Flat numeric sequence
    Values(Vec<f64>),
    /// Groups of series values, for grouped bars
    Groups(Vec<Vec<f64>>),
}

impl ChartData {
    /// Build from `(label, count)` pairs
    pub fn counts<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        ChartData::Counts(
            pairs
                .into_iter()
                .map(|(label, count)| CategoryDatum::new(label, count))
                .collect(),
        )
    }

    /// Create ChartData from JSON: an object of label → count, an array of
    /// numbers, or an array of arrays of numbers
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Object(map) => {
                let mut data = Vec::with_capacity(map.len());
                for (label, count) in map {
                    data.push(CategoryDatum::new(label.clone(), json_count(label, count)?));
                }
                Ok(ChartData::Counts(data))
            }
            Value::Array(items) if items.iter().all(Value::is_array) && !items.is_empty() => {
                let groups = items
                    .iter()
                    .map(|group| json_numbers(group.as_array().map(Vec::as_slice).unwrap_or(&[])))
                    .collect::<Result<Vec<_>>>()?;
                Ok(ChartData::Groups(groups))
            }
            Value::Array(items) => Ok(ChartData::Values(json_numbers(items)?)),
            _ => Err(GraphError::InvalidData(
                "data must be an object of counts or an array of numbers".to_string(),
            )),
        }
    }

    /// Read CSV rows without a header. A single numeric column becomes flat
    /// values, other all-numeric rows become groups of values; otherwise
    /// every row must be `label,count`.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows: Vec<Vec<String>> = Vec::new();
        for result in csv_reader.records() {
            let record = result.map_err(|e| GraphError::InvalidData(format!("CSV parse error: {}", e)))?;
            let row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
            if row.iter().all(|s| s.is_empty()) {
                continue;
            }
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(GraphError::InvalidData("CSV input has no data rows".to_string()));
        }

        let numeric = rows
            .iter()
            .all(|row| row.iter().all(|field| field.parse::<f64>().is_ok()));
        if numeric && rows.iter().all(|row| row.len() == 1) {
            let values = rows
                .iter()
                .filter_map(|row| row[0].parse::<f64>().ok())
                .collect();
            let data = ChartData::Values(values);
            data.validate()?;
            return Ok(data);
        }
        if numeric {
            let groups = rows
                .iter()
                .map(|row| row.iter().filter_map(|f| f.parse::<f64>().ok()).collect())
                .collect();
            let data = ChartData::Groups(groups);
            data.validate()?;
            return Ok(data);
        }

        let mut data = Vec::with_capacity(rows.len());
        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != 2 {
                return Err(GraphError::InvalidData(format!(
                    "row {} must be 'label,count' (found {} fields)",
                    row_idx + 1,
                    row.len()
                )));
            }
            data.push(CategoryDatum::new(row[0].clone(), parse_count(&row[0], &row[1])?));
        }
        Ok(ChartData::Counts(data))
    }

    /// Reject negative or non-finite numbers before any layout runs
    pub fn validate(&self) -> Result<()> {
        let check = |v: f64| {
            if !v.is_finite() {
                Err(GraphError::InvalidData(format!("value {} is not a finite number", v)))
            } else if v < 0.0 {
                Err(GraphError::InvalidData(format!("value {} is negative", v)))
            } else {
                Ok(())
            }
        };
        match self {
            ChartData::Counts(_) => Ok(()),
            ChartData::Values(values) => values.iter().try_for_each(|&v| check(v)),
            ChartData::Groups(groups) => groups.iter().flatten().try_for_each(|&v| check(v)),
        }
    }

    /// Category counts for pictograms. Plain values are accepted when they are
    /// whole numbers; they are labelled from `labels` or by position.
    pub fn to_counts(&self, labels: &[String]) -> Result<Vec<CategoryDatum>> {
        match self {
            ChartData::Counts(data) => Ok(data.clone()),
            ChartData::Values(values) => values
                .iter()
                .enumerate()
                .map(|(i, &v)| {
                    if v.fract() != 0.0 {
                        return Err(GraphError::InvalidData(format!(
                            "count {} at position {} is not a whole number",
                            v, i
                        )));
                    }
                    let label = labels.get(i).cloned().unwrap_or_else(|| i.to_string());
                    Ok(CategoryDatum::new(label, v as u64))
                })
                .collect(),
            ChartData::Groups(_) => Err(GraphError::InvalidData(
                "count charts take a flat list of counts, not groups".to_string(),
            )),
        }
    }

    /// Series groups for bar charts
    pub fn to_groups(&self) -> Vec<Vec<f64>> {
        match self {
            ChartData::Counts(data) => vec![data.iter().map(|d| d.count as f64).collect()],
            ChartData::Values(values) => vec![values.clone()],
            ChartData::Groups(groups) => groups.clone(),
        }
    }

    /// Flat values for pie charts
    pub fn to_values(&self) -> Result<Vec<f64>> {
        match self {
            ChartData::Counts(data) => Ok(data.iter().map(|d| d.count as f64).collect()),
            ChartData::Values(values) => Ok(values.clone()),
            ChartData::Groups(_) => Err(GraphError::InvalidData(
                "pie charts take a flat list of values, not groups".to_string(),
            )),
        }
    }

    /// Category labels carried by the data itself
    pub fn labels(&self) -> Vec<String> {
        match self {
            ChartData::Counts(data) => data.iter().map(|d| d.label.clone()).collect(),
            _ => Vec::new(),
        }
    }
}

fn json_count(label: &str, value: &Value) -> Result<u64> {
    match value {
        Value::Number(n) => {
            if let Some(count) = n.as_u64() {
                return Ok(count);
            }
            match n.as_f64() {
                Some(f) if f < 0.0 => Err(GraphError::InvalidData(format!(
                    "count for '{}' is negative: {}",
                    label, n
                ))),
                Some(f) if f.is_finite() && f.fract() == 0.0 => Ok(f as u64),
                _ => Err(GraphError::InvalidData(format!(
                    "count for '{}' is not a whole number: {}",
                    label, n
                ))),
            }
        }
        Value::String(s) => parse_count(label, s),
        _ => Err(GraphError::InvalidData(format!("count for '{}' is not a number", label))),
    }
}

fn json_numbers(items: &[Value]) -> Result<Vec<f64>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_f64().ok_or_else(|| {
                GraphError::InvalidData(format!("value at position {} is not a number: {}", i, item))
            })
        })
        .collect()
}

fn parse_count(label: &str, raw: &str) -> Result<u64> {
    match raw.trim().parse::<i64>() {
        Ok(n) if n < 0 => Err(GraphError::InvalidData(format!(
            "count for '{}' is negative: {}",
            label, n
        ))),
        Ok(n) => Ok(n as u64),
        Err(_) => Err(GraphError::InvalidData(format!(
            "count for '{}' is not a whole number: '{}'",
            label, raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_object_keeps_order() {
        let data = ChartData::from_json(&json!({ "zebra": 2, "apple": 1, "mango": 0 })).unwrap();
        assert_eq!(
            data,
            ChartData::counts([("zebra", 2), ("apple", 1), ("mango", 0)])
        );
    }

    #[test]
    fn test_from_json_values_and_groups() {
        assert_eq!(
            ChartData::from_json(&json!([5, 2])).unwrap(),
            ChartData::Values(vec![5.0, 2.0])
        );
        assert_eq!(
            ChartData::from_json(&json!([[5, 2], [3.5, 4]])).unwrap(),
            ChartData::Groups(vec![vec![5.0, 2.0], vec![3.5, 4.0]])
        );
    }

    #[test]
    fn test_from_json_rejects_negative_count() {
        let err = ChartData::from_json(&json!({ "red": -1 })).unwrap_err();
        assert!(matches!(err, GraphError::InvalidData(_)));
        assert!(err.to_string().contains("negative"));
    }

    #[test]
    fn test_from_json_rejects_fractional_count() {
        let err = ChartData::from_json(&json!({ "red": 1.5 })).unwrap_err();
        assert!(err.to_string().contains("whole number"));
    }

    #[test]
    fn test_from_json_rejects_non_numeric() {
        assert!(ChartData::from_json(&json!({ "red": true })).is_err());
        assert!(ChartData::from_json(&json!([1, "two"])).is_err());
        assert!(ChartData::from_json(&json!("red")).is_err());
    }

    #[test]
    fn test_from_json_string_counts() {
        let data = ChartData::from_json(&json!({ "red": "3" })).unwrap();
        assert_eq!(data, ChartData::counts([("red", 3)]));
    }

    #[test]
    fn test_validate_rejects_negative_values() {
        assert!(ChartData::Values(vec![1.0, -2.0]).validate().is_err());
        assert!(ChartData::Groups(vec![vec![1.0], vec![f64::NAN]]).validate().is_err());
        assert!(ChartData::Values(vec![0.0, 2.5]).validate().is_ok());
    }

    #[test]
    fn test_to_counts_from_values() {
        let data = ChartData::Values(vec![5.0, 2.0]);
        let labels = vec!["blue".to_string()];
        assert_eq!(
            data.to_counts(&labels).unwrap(),
            vec![CategoryDatum::new("blue", 5), CategoryDatum::new("1", 2)]
        );
        assert!(ChartData::Values(vec![1.5]).to_counts(&[]).is_err());
        assert!(ChartData::Groups(vec![vec![1.0]]).to_counts(&[]).is_err());
    }

    #[test]
    fn test_to_groups_and_values() {
        let counts = ChartData::counts([("a", 3), ("b", 4)]);
        assert_eq!(counts.to_groups(), vec![vec![3.0, 4.0]]);
        assert_eq!(counts.to_values().unwrap(), vec![3.0, 4.0]);
        assert!(ChartData::Groups(vec![vec![1.0]]).to_values().is_err());
    }

    #[test]
    fn test_from_csv_counts() {
        let csv = "red, 3\ngreen,2\n";
        let data = ChartData::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(data, ChartData::counts([("red", 3), ("green", 2)]));
    }

    #[test]
    fn test_from_csv_numeric_rows() {
        let csv = "5,2\n3,4\n";
        let data = ChartData::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(data, ChartData::Groups(vec![vec![5.0, 2.0], vec![3.0, 4.0]]));
    }

    #[test]
    fn test_from_csv_single_column() {
        let data = ChartData::from_csv_reader("3\n2\n".as_bytes()).unwrap();
        assert_eq!(data, ChartData::Values(vec![3.0, 2.0]));
        let counts = data.to_counts(&[]).unwrap();
        assert_eq!(counts, vec![CategoryDatum::new("0", 3), CategoryDatum::new("1", 2)]);

        assert!(ChartData::from_csv_reader("3\n-2\n".as_bytes()).is_err());
    }

    #[test]
    fn test_from_csv_errors() {
        assert!(ChartData::from_csv_reader("".as_bytes()).is_err());
        assert!(ChartData::from_csv_reader("red,-1\n".as_bytes()).is_err());
        assert!(ChartData::from_csv_reader("red,1,2\n".as_bytes()).is_err());
        assert!(ChartData::from_csv_reader("red,lots\n".as_bytes()).is_err());
    }
}
