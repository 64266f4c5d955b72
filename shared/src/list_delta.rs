use crate::Value;

/// A single mutation of an ordered list lane
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListDelta {
    Insert { index: usize, value: Value },
    Update { index: usize, value: Value },
    Remove { index: usize },
    Move { from: usize, to: usize },
    /// Drop the first `n` items
    Drop(usize),
    /// Keep only the first `n` items
    Take(usize),
    Clear,
}

impl ListDelta {
    /// Folds this delta into the tagged body of a list-lane event
    pub fn into_value(self) -> Value {
        match self {
            ListDelta::Insert { index, value } => {
                Value::tagged("insert", vec![index_header("index", index)], value)
            }
            ListDelta::Update { index, value } => {
                Value::tagged("update", vec![index_header("index", index)], value)
            }
            ListDelta::Remove { index } => {
                Value::tagged("remove", vec![index_header("index", index)], Value::Absent)
            }
            ListDelta::Move { from, to } => Value::tagged(
                "move",
                vec![index_header("from", from), index_header("to", to)],
                Value::Absent,
            ),
            ListDelta::Drop(count) => {
                Value::tagged("drop", vec![index_header("count", count)], Value::Absent)
            }
            ListDelta::Take(count) => {
                Value::tagged("take", vec![index_header("count", count)], Value::Absent)
            }
            ListDelta::Clear => Value::tagged("clear", Vec::new(), Value::Absent),
        }
    }
}

fn index_header(name: &str, index: usize) -> (String, Value) {
    let index = i64::try_from(index).unwrap_or(i64::MAX);
    (name.to_string(), Value::Int(index))
}
