//! Column types declared in the schema file

use std::fmt;
use std::str::FromStr;

/// Declared type of a relation column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// 64-bit signed integer
    Int,
    /// UTF-8 string
    String,
}

impl ColumnType {
    /// Returns the type name as written in the schema file
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnType::Int => "int",
            ColumnType::String => "string",
        }
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(ColumnType::Int),
            "string" => Ok(ColumnType::String),
            other => Err(format!("unknown column type '{}'", other)),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_column_types() {
        assert_eq!("int".parse::<ColumnType>(), Ok(ColumnType::Int));
        assert_eq!("string".parse::<ColumnType>(), Ok(ColumnType::String));
        assert!("INT".parse::<ColumnType>().is_err());
    }
}
