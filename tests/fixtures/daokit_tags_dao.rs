// Code generated by `daokit gen`. DO NOT EDIT.
// Table: public.daokit_tags

use daokit::chrono;
use daokit::prelude::*;

pub const DAOKIT_TAGS: Table =
    Table::new("public", "daokit_tags", &["id", "name", "note", "updated_at"]);

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct DaokitTags {
    pub id: i32,
    pub name: String,
    pub note: Option<String>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Model for DaokitTags {
    fn value(&self, column: &str) -> Option<Value> {
        match column {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.clone().into()),
            "note" => Some(self.note.clone().into()),
            "updated_at" => Some(self.updated_at.into()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BaseDaokitTags;

impl TableSource for BaseDaokitTags {
    type Row = DaokitTags;

    fn table(&self) -> &Table {
        &DAOKIT_TAGS
    }
}

impl BaseCols for BaseDaokitTags {
    fn insert_cols(&self) -> ColumnList {
        DAOKIT_TAGS.all_columns().except(&["id"])
    }

    fn update_cols(&self) -> ColumnList {
        DAOKIT_TAGS.all_columns().except(&["id"])
    }

    fn all_cols(&self) -> ColumnList {
        DAOKIT_TAGS.all_columns()
    }
}

impl ConflictCols for BaseDaokitTags {
    fn on_conflict_cols(&self) -> ColumnList {
        ColumnList::empty()
    }

    fn update_on_conflict_cols(&self) -> Vec<Assignment> {
        Vec::new()
    }
}

impl PkMatcher for BaseDaokitTags {
    type Pk = i32;

    fn pk_match(&self, pk: &Self::Pk) -> Expr {
        col("id").eq(*pk)
    }
}

impl UpdatedAt for BaseDaokitTags {
    fn touch_updated_at(&self, row: &mut DaokitTags, now: chrono::DateTime<chrono::Utc>) {
        row.updated_at = now;
    }
}
