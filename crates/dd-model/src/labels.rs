use serde::{Deserialize, Serialize};
use std::fmt;

/// A class label as exported from the training pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassLabel {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassLabel::Bool(true) => f.write_str("True"),
            ClassLabel::Bool(false) => f.write_str("False"),
            ClassLabel::Integer(i) => write!(f, "{}", i),
            ClassLabel::Float(x) => write!(f, "{:?}", x),
            ClassLabel::Text(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_labels() {
        let labels: Vec<ClassLabel> = serde_json::from_str(r#"[0, 1.0, true, "temporary"]"#).unwrap();
        assert_eq!(
            labels,
            vec![
                ClassLabel::Integer(0),
                ClassLabel::Float(1.0),
                ClassLabel::Bool(true),
                ClassLabel::Text("temporary".to_string()),
            ]
        );
        let shown: Vec<String> = labels.iter().map(ToString::to_string).collect();
        assert_eq!(shown, vec!["0", "1.0", "True", "temporary"]);
    }
}
