//! A DAO bound to the CRUD helpers.

use crate::crud;
use crate::dao::Dao;
use crate::error::DaoResult;
use crate::expr::SearchParams;
use crate::session::{Session, with_executor};

/// CRUD for one table, run against whichever [`Session`] is passed in.
///
/// ```rust,ignore
/// let users = Queries::new(BaseUsers);
/// let user = users.get_one(&session, &42).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Queries<D> {
    dao: D,
}

impl<D: Dao> Queries<D> {
    pub fn new(dao: D) -> Self {
        Self { dao }
    }

    pub fn dao(&self) -> &D {
        &self.dao
    }

    pub async fn index(
        &self,
        session: &Session,
        params: Option<&SearchParams>,
    ) -> DaoResult<Vec<D::Row>> {
        with_executor!(session, db => crud::index(&self.dao, params, db).await)
    }

    pub async fn get_one(&self, session: &Session, pk: &D::Pk) -> DaoResult<D::Row> {
        with_executor!(session, db => crud::get_one(&self.dao, pk, db).await)
    }

    pub async fn get_many(&self, session: &Session, pks: &[D::Pk]) -> DaoResult<Vec<D::Row>> {
        with_executor!(session, db => crud::get_many(&self.dao, pks, db).await)
    }

    pub async fn insert(&self, session: &Session, row: &mut D::Row) -> DaoResult<()> {
        with_executor!(session, db => crud::insert(&self.dao, row, db).await)
    }

    pub async fn insert_many(&self, session: &Session, rows: &mut [D::Row]) -> DaoResult<()> {
        with_executor!(session, db => crud::insert_many(&self.dao, rows, db).await)
    }

    pub async fn upsert(&self, session: &Session, row: &mut D::Row) -> DaoResult<()> {
        with_executor!(session, db => crud::upsert(&self.dao, row, db).await)
    }

    pub async fn upsert_many(&self, session: &Session, rows: &mut [D::Row]) -> DaoResult<()> {
        with_executor!(session, db => crud::upsert_many(&self.dao, rows, db).await)
    }

    pub async fn update(&self, session: &Session, row: &mut D::Row, pk: &D::Pk) -> DaoResult<()> {
        with_executor!(session, db => crud::update(&self.dao, row, pk, db).await)
    }

    pub async fn delete(&self, session: &Session, pk: &D::Pk) -> DaoResult<u64> {
        with_executor!(session, db => crud::delete(&self.dao, pk, db).await)
    }
}
