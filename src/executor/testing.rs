//! Test helpers shared by the operator tests

use std::fs;

use tempfile::TempDir;

use crate::catalog::{Catalog, FILES_DIR, SCHEMA_FILE};
use crate::query::Term;

use super::errors::ExecutorResult;
use super::operator::Operator;
use super::tuple::{Label, Tuple};

/// Writes a database directory: `(name, column types, file content)` per relation.
pub fn database(relations: &[(&str, &str, &str)]) -> (TempDir, Catalog) {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join(FILES_DIR)).unwrap();

    let mut schema = String::new();
    for (name, types, rows) in relations {
        schema.push_str(&format!("{} {}\n", name, types));
        fs::write(
            tmp.path().join(FILES_DIR).join(format!("{}.csv", name)),
            rows,
        )
        .unwrap();
    }
    fs::write(tmp.path().join(SCHEMA_FILE), schema).unwrap();

    let catalog = Catalog::load(tmp.path()).unwrap();
    (tmp, catalog)
}

/// In-memory operator over fixed integer rows.
pub struct Values {
    schema: Vec<Label>,
    rows: Vec<Vec<Term>>,
    pos: usize,
}

impl Values {
    pub fn ints(labels: &[&str], rows: &[&[i64]]) -> Self {
        Self {
            schema: labels.iter().map(|l| Label::var(*l)).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|v| Term::Integer(*v)).collect())
                .collect(),
            pos: 0,
        }
    }

    pub fn terms(labels: &[&str], rows: Vec<Vec<Term>>) -> Self {
        Self {
            schema: labels.iter().map(|l| Label::var(*l)).collect(),
            rows,
            pos: 0,
        }
    }
}

impl Operator for Values {
    fn next(&mut self) -> ExecutorResult<Option<Tuple>> {
        let row = self.rows.get(self.pos).cloned();
        if row.is_some() {
            self.pos += 1;
        }
        Ok(row.map(|values| Tuple::new("V", values)))
    }

    fn reset(&mut self) -> ExecutorResult<()> {
        self.pos = 0;
        Ok(())
    }

    fn schema(&self) -> &[Label] {
        &self.schema
    }

    fn name(&self) -> &'static str {
        "Values"
    }
}

/// Drains an operator into output lines.
pub fn drain(op: &mut dyn Operator) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(tuple) = op.next().unwrap() {
        lines.push(tuple.to_string());
    }
    lines
}
