use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::schema::users;

use super::models::{NewUserRow, UserRow};

#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn insert(&self, user: NewUserRow) -> Result<UserRow, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(users::table)
            .values(&user)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row)
    }

    pub fn find_by_id(&self, id: Uuid) -> Result<Option<UserRow>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = users::table
            .filter(users::id.eq(id))
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row)
    }

    pub fn find_by_email(&self, email: &str) -> Result<Option<UserRow>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row)
    }

    /// Whether `lab_id` is already assigned to a lab assistant.
    pub fn lab_id_taken(&self, lab_id: &str) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let count: i64 = users::table
            .filter(users::role.eq("lab_assistant"))
            .filter(users::lab_id.eq(lab_id))
            .count()
            .get_result(&mut conn)?;
        Ok(count > 0)
    }

    pub fn touch_last_login(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        diesel::update(users::table.filter(users::id.eq(id)))
            .set(users::last_login.eq(Utc::now()))
            .execute(&mut conn)?;
        Ok(())
    }

    pub fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        diesel::update(users::table.filter(users::id.eq(id)))
            .set(users::password_hash.eq(password_hash))
            .execute(&mut conn)?;
        Ok(())
    }
}
