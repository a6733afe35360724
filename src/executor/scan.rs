//! Full scan of one relation file

use crate::catalog::{Catalog, ColumnType};
use crate::query::{RelationalAtom, Term};
use crate::storage::{RawRecord, RelationReader};

use super::errors::{ExecutorError, ExecutorResult};
use super::operator::Operator;
use super::tuple::{Label, Tuple};

/// Leaf operator emitting every row of a relation in file order.
///
/// The schema names each position after the atom's term: variables keep
/// their name, constants become [`Label::Constant`].
pub struct Scan<'a> {
    relation: String,
    types: &'a [ColumnType],
    schema: Vec<Label>,
    reader: RelationReader,
}

impl<'a> Scan<'a> {
    /// Opens the data file of `atom.name`.
    pub fn new(catalog: &'a Catalog, atom: &RelationalAtom) -> ExecutorResult<Self> {
        let types = catalog
            .schema(&atom.name)
            .map_err(|e| ExecutorError::execution_failed(e.to_string()))?;

        if types.len() != atom.terms.len() {
            return Err(ExecutorError::execution_failed(format!(
                "Atom {} has {} terms but relation declares {} columns",
                atom.name,
                atom.terms.len(),
                types.len()
            )));
        }

        let schema = atom
            .terms
            .iter()
            .map(|term| match term.as_variable() {
                Some(name) => Label::var(name),
                None => Label::Constant,
            })
            .collect();

        let reader = RelationReader::open(&catalog.file_path(&atom.name))?;

        Ok(Self {
            relation: atom.name.clone(),
            types,
            schema,
            reader,
        })
    }

    pub fn relation(&self) -> &str {
        &self.relation
    }

    fn decode(&self, record: RawRecord) -> ExecutorResult<Tuple> {
        if record.fields.len() != self.types.len() {
            return Err(ExecutorError::malformed_row(
                &self.relation,
                record.line,
                format!(
                    "expected {} fields, found {}",
                    self.types.len(),
                    record.fields.len()
                ),
            ));
        }

        let mut values = Vec::with_capacity(record.fields.len());
        for (column, (field, ty)) in record.fields.into_iter().zip(self.types).enumerate() {
            let value = match ty {
                ColumnType::Int => field.parse::<i64>().map(Term::Integer).map_err(|_| {
                    ExecutorError::malformed_row(
                        &self.relation,
                        record.line,
                        format!("column {}: '{}' is not an int", column, field),
                    )
                })?,
                ColumnType::String => Term::String(field),
            };
            values.push(value);
        }

        Ok(Tuple::new(self.relation.clone(), values))
    }
}

impl Operator for Scan<'_> {
    fn next(&mut self) -> ExecutorResult<Option<Tuple>> {
        match self.reader.read_record()? {
            Some(record) => self.decode(record).map(Some),
            None => Ok(None),
        }
    }

    fn reset(&mut self) -> ExecutorResult<()> {
        self.reader.rewind()?;
        Ok(())
    }

    fn schema(&self) -> &[Label] {
        &self.schema
    }

    fn name(&self) -> &'static str {
        "Scan"
    }

    fn detail(&self) -> String {
        self.relation.clone()
    }
}
