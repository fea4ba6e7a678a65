use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

use crate::models::{NewProduct, Product, ProductInput, UpdateProductRequest};
use crate::orm::audit::log_activity_best_effort;

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

/// Inserts a new product.
pub fn insert_product(
    conn: &mut SqliteConnection,
    input: ProductInput,
    acting_employee_id: Option<i32>,
) -> Result<Product, diesel::result::Error> {
    use crate::schema::products::dsl::*;

    let new_product = NewProduct {
        name: input.name,
        code: input.code,
        category: input.category,
        unit: input.unit,
    };

    diesel::insert_into(products)
        .values(&new_product)
        .execute(conn)?;

    let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
        .get_result::<LastInsertRowId>(conn)?
        .last_insert_rowid;

    let product = products
        .filter(id.eq(last_id as i32))
        .first::<Product>(conn)?;

    log_activity_best_effort(conn, "products", product.id, "create", acting_employee_id);

    Ok(product)
}

/// Gets a product by its unique code.
pub fn get_product_by_code(
    conn: &mut SqliteConnection,
    product_code: &str,
) -> Result<Option<Product>, diesel::result::Error> {
    use crate::schema::products::dsl::*;
    products
        .filter(code.eq(product_code))
        .first::<Product>(conn)
        .optional()
}

/// Gets a single product by ID.
pub fn get_product_by_id(
    conn: &mut SqliteConnection,
    product_id: i32,
) -> Result<Option<Product>, diesel::result::Error> {
    use crate::schema::products::dsl::*;
    products
        .filter(id.eq(product_id))
        .first::<Product>(conn)
        .optional()
}

/// Returns all products in ascending order by id.
pub fn get_all_products(
    conn: &mut SqliteConnection,
) -> Result<Vec<Product>, diesel::result::Error> {
    use crate::schema::products::dsl::*;
    products.order(id.asc()).load::<Product>(conn)
}

/// Updates a product's fields. Only provided fields are touched.
pub fn update_product(
    conn: &mut SqliteConnection,
    product_id: i32,
    update: UpdateProductRequest,
    acting_employee_id: Option<i32>,
) -> Result<Product, diesel::result::Error> {
    use crate::schema::products::dsl::*;

    if let Some(name_val) = update.name {
        diesel::update(products.filter(id.eq(product_id)))
            .set(name.eq(name_val))
            .execute(conn)?;
    }

    if let Some(code_val) = update.code {
        diesel::update(products.filter(id.eq(product_id)))
            .set(code.eq(code_val))
            .execute(conn)?;
    }

    if let Some(category_val) = update.category {
        diesel::update(products.filter(id.eq(product_id)))
            .set(category.eq(category_val))
            .execute(conn)?;
    }

    if let Some(unit_val) = update.unit {
        diesel::update(products.filter(id.eq(product_id)))
            .set(unit.eq(unit_val))
            .execute(conn)?;
    }

    log_activity_best_effort(conn, "products", product_id, "update", acting_employee_id);

    products.filter(id.eq(product_id)).first::<Product>(conn)
}
