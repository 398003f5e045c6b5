pub mod connection;
pub mod deadline;
pub mod error;
pub mod expr;
pub mod macros;
pub mod materialize;
pub mod migration;
pub mod models;
pub mod query;
pub mod repository;
pub mod schema;
pub mod traits;
pub mod write;

#[cfg(test)]
mod test_utils;

pub use connection::{ConnectionOptions, DbConnection};
pub use deadline::Deadline;
pub use error::{DbError, ErrorKind, Result};
pub use query::*;
pub use repository::{CategoryRepository, OrderRepository, ProductRepository, UserRepository};

#[cfg(test)]
mod tests {
    use diesel::{prelude::*, sql_query};

    use super::*;
    use crate::{
        define_entity,
        query::QuerySource,
        models::types::{PaginateReq, SortDirection, SortReq},
        test_utils::TestDb,
        traits::Expression as _,
    };

    define_entity!(
        notes {
            table: "notes",
            alias: "n",
            columns: {
                ID: i64 => "id",
                BODY: String => "body",
                PINNED: i64 => "pinned",
            }
        }
    );

    static NOTES: QuerySource = QuerySource {
        entity: "Note",
        from: notes::FROM,
        document: "json_object('id', n.id, 'body', n.body)",
        sort: SortWhitelist {
            columns: &[("id", notes::ID.name), ("body", notes::BODY.name)],
            default_key: "id",
            default_direction: SortDirection::Asc,
            tiebreaker: notes::ID.name,
        },
    };

    #[derive(Debug, serde::Deserialize)]
    struct Note {
        id: i64,
        body: String,
    }

    struct NoteFilter {
        pinned: bool,
        sort: SortReq,
        paginate: PaginateReq,
    }

    impl FilterRequest for NoteFilter {
        fn predicates(&self) -> Vec<PredicateFragment> {
            if self.pinned {
                vec![PredicateFragment::new(notes::PINNED.eq(1))]
            } else {
                vec![]
            }
        }

        fn sort(&self) -> &SortReq {
            &self.sort
        }

        fn paginate(&self) -> Option<PaginateReq> {
            Some(self.paginate)
        }
    }

    fn setup(db: &mut TestDb) {
        sql_query("CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT NOT NULL, pinned INTEGER NOT NULL)")
            .execute(db.conn())
            .unwrap();
        for (body, pinned) in [("delta", 1), ("alpha", 0), ("charlie", 1), ("bravo", 1)] {
            sql_query("INSERT INTO notes (body, pinned) VALUES (?1, ?2)")
                .bind::<diesel::sql_types::Text, _>(body)
                .bind::<diesel::sql_types::Integer, _>(pinned)
                .execute(db.conn())
                .unwrap();
        }
    }

    #[test]
    fn test_entity_macro_qualifies_columns() {
        assert_eq!(notes::TABLE, "notes");
        assert_eq!(notes::ALIAS, "n");
        assert_eq!(notes::FROM, "notes n");
        assert_eq!(notes::BODY.name, "n.body");
    }

    #[test]
    fn test_select_query_end_to_end() {
        let mut db = TestDb::new();
        setup(&mut db);

        let filter = NoteFilter {
            pinned: true,
            sort: SortReq::new("body", "desc"),
            paginate: PaginateReq::new(1, 2),
        };
        let query = SelectQuery::for_request(&NOTES, &filter);
        let docs = query.fetch_documents(db.conn()).unwrap();
        let notes: Vec<Note> = materialize::materialize("Note", &docs).unwrap();
        let bodies: Vec<&str> = notes.iter().map(|n| n.body.as_str()).collect();
        assert_eq!(bodies, vec!["delta", "charlie"]);
        assert!(notes.iter().all(|n| n.id > 0));

        assert_eq!(query.count(db.conn()).unwrap(), 3);
        // counting twice gives the same answer
        assert_eq!(query.count(db.conn()).unwrap(), 3);
    }

    #[test]
    fn test_fetch_one_document() {
        let mut db = TestDb::new();
        setup(&mut db);

        let doc = SelectQuery::from(&NOTES)
            .filter(PredicateFragment::new(notes::BODY.ilike("ALPH")))
            .fetch_one_document(db.conn())
            .unwrap()
            .unwrap();
        assert_eq!(doc, r#"{"id":2,"body":"alpha"}"#);

        let missing = SelectQuery::from(&NOTES)
            .filter(PredicateFragment::new(notes::ID.eq(99)))
            .fetch_one_document(db.conn())
            .unwrap();
        assert!(missing.is_none());
    }
}
