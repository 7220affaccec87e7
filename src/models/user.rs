use crate::schema::users;
use diesel::prelude::*;

#[derive(Insertable, Debug)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub real_name: String,
}

impl NewUser {
    pub fn new(username: &str, email: &str) -> Self {
        Self {
            username: username.to_string(),
            email: email.to_string(),
            real_name: String::new(),
        }
    }
}
