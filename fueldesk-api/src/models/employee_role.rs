use diesel::{Insertable, Queryable};

use crate::schema::{employee_roles, employee_stations};

#[derive(Queryable, Debug)]
pub struct EmployeeRole {
    pub employee_id: i32,
    pub role_id: i32,
}

#[derive(Insertable)]
#[diesel(table_name = employee_roles)]
pub struct NewEmployeeRole {
    pub employee_id: i32,
    pub role_id: i32,
}

#[derive(Queryable, Debug)]
pub struct EmployeeStation {
    pub employee_id: i32,
    pub station_id: i32,
}

#[derive(Insertable)]
#[diesel(table_name = employee_stations)]
pub struct NewEmployeeStation {
    pub employee_id: i32,
    pub station_id: i32,
}
