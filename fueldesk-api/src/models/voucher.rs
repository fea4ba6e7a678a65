use chrono::{NaiveDate, NaiveDateTime};
use diesel::{Associations, Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::{voucher_items, vouchers};

#[derive(Queryable, Identifiable, Debug, Clone, Serialize, Deserialize, TS)]
#[diesel(table_name = vouchers)]
#[ts(export)]
pub struct Voucher {
    pub id: i32,
    pub voucher_no: String, // Will be unique
    pub voucher_type: String, // journal | payment | receipt
    #[ts(type = "string")]
    pub voucher_date: NaiveDate,
    pub narration: Option<String>,
    pub created_by: Option<i32>,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = vouchers)]
pub struct NewVoucher {
    pub voucher_no: String,
    pub voucher_type: String,
    pub voucher_date: NaiveDate,
    pub narration: Option<String>,
    pub created_by: Option<i32>,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(
    Queryable, Identifiable, Associations, Debug, Clone, Serialize, Deserialize, TS,
)]
#[diesel(belongs_to(Voucher))]
#[diesel(table_name = voucher_items)]
#[ts(export)]
pub struct VoucherItem {
    pub id: i32,
    pub voucher_id: i32,
    pub account: String,
    pub debit: i64,
    pub credit: i64,
}

#[derive(Insertable)]
#[diesel(table_name = voucher_items)]
pub struct NewVoucherItem {
    pub voucher_id: i32,
    pub account: String,
    pub debit: i64,
    pub credit: i64,
}

#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct VoucherItemInput {
    pub account: String,
    pub debit: i64,
    pub credit: i64,
}

/// Payload for creating a voucher with its line items. Debits must balance
/// credits across the items.
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct VoucherInput {
    pub voucher_no: String,
    pub voucher_type: String,
    #[ts(type = "string")]
    pub voucher_date: NaiveDate,
    pub narration: Option<String>,
    pub items: Vec<VoucherItemInput>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct VoucherWithItems {
    #[serde(flatten)]
    pub voucher: Voucher,
    pub items: Vec<VoucherItem>,
}
