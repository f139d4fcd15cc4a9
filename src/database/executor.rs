//! Statement execution: the bridge from a parsed [`Statement`] to tree and
//! cursor operations. Results come back as data; rendering them (row lines,
//! the empty-table message, the duplicate-key error) is the REPL's job.

use eyre::Result;

use crate::btree::InsertOutcome;
use crate::parsing::Statement;
use crate::record::Row;

use super::Database;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecuteResult {
    Inserted,
    DuplicateKey,
    Select { rows: Vec<Row> },
}

impl Database {
    pub fn execute(&mut self, statement: &Statement) -> Result<ExecuteResult> {
        match statement {
            Statement::Insert(row) => match self.tree().insert(row)? {
                InsertOutcome::Inserted => Ok(ExecuteResult::Inserted),
                InsertOutcome::DuplicateKey => Ok(ExecuteResult::DuplicateKey),
            },
            Statement::Select => {
                let mut tree = self.tree();
                let mut cursor = tree.start()?;

                let mut rows = Vec::new();
                while !cursor.end_of_table {
                    rows.push(cursor.row(&mut tree)?);
                    cursor.advance(&mut tree)?;
                }

                Ok(ExecuteResult::Select { rows })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("test.db")).unwrap();
        (db, dir)
    }

    fn insert(db: &mut Database, id: u32, username: &str, email: &str) -> ExecuteResult {
        db.execute(&Statement::Insert(Row::new(id, username, email)))
            .unwrap()
    }

    fn select(db: &mut Database) -> Vec<Row> {
        match db.execute(&Statement::Select).unwrap() {
            ExecuteResult::Select { rows } => rows,
            other => panic!("expected select result, got {:?}", other),
        }
    }

    #[test]
    fn select_on_empty_table_returns_no_rows() {
        let (mut db, _dir) = open_db();

        assert!(select(&mut db).is_empty());
    }

    #[test]
    fn insert_then_select_round_trips() {
        let (mut db, _dir) = open_db();

        assert_eq!(insert(&mut db, 1, "alice", "a@x"), ExecuteResult::Inserted);
        assert_eq!(insert(&mut db, 2, "bob", "b@x"), ExecuteResult::Inserted);

        let rows = select(&mut db);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], Row::new(1, "alice", "a@x"));
        assert_eq!(rows[1], Row::new(2, "bob", "b@x"));
    }

    #[test]
    fn select_returns_rows_in_key_order() {
        let (mut db, _dir) = open_db();

        insert(&mut db, 3, "z", "z@x");
        insert(&mut db, 1, "a", "a@x");
        insert(&mut db, 2, "m", "m@x");

        let ids: Vec<u32> = select(&mut db).into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn duplicate_insert_reports_and_preserves_first_row() {
        let (mut db, _dir) = open_db();

        insert(&mut db, 1, "alice", "a@x");
        assert_eq!(
            insert(&mut db, 1, "alice2", "a2@x"),
            ExecuteResult::DuplicateKey
        );

        let rows = select(&mut db);
        assert_eq!(rows, vec![Row::new(1, "alice", "a@x")]);
    }
}
