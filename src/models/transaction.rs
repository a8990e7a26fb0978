use chrono::{DateTime, Utc};
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types::Text;
use diesel::{Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema,
            AsExpression, FromSqlRow,
        )]
        #[diesel(sql_type = Text)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            pub fn from_str(value: &str) -> Option<Self> {
                match value {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl ToSql<Text, Pg> for $name {
            fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
                <str as ToSql<Text, Pg>>::to_sql(self.as_str(), &mut out.reborrow())
            }
        }

        impl FromSql<Text, Pg> for $name {
            fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
                let value = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
                Self::from_str(&value)
                    .ok_or_else(|| format!(concat!("unrecognized ", stringify!($name), ": {}"), value).into())
            }
        }
    };
}

text_enum!(TransactionMethod {
    Cash => "cash",
    Wallet => "wallet",
    CreditCard => "credit_card",
});

text_enum!(TransactionStatus {
    Pending => "pending",
    Successful => "successful",
    Failed => "failed",
});

text_enum!(TransactionKind {
    Payment => "payment",
    Refund => "refund",
});

#[derive(Queryable, Selectable, Identifiable, Serialize, ToSchema, Debug, Clone)]
#[diesel(table_name = crate::db::schema::transactions)]
#[diesel(primary_key(transaction_id))]
pub struct Transaction {
    pub transaction_id: i32,
    pub order_id: Option<i32>,
    pub payer_id: i32,
    pub payee_id: i32,
    pub amount: f64,
    pub method: TransactionMethod,
    pub status: TransactionStatus,
    pub kind: TransactionKind,
    pub transaction_date: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::db::schema::transactions)]
pub struct NewTransaction {
    pub order_id: Option<i32>,
    pub payer_id: i32,
    pub payee_id: i32,
    pub amount: f64,
    pub method: TransactionMethod,
    pub status: TransactionStatus,
    pub kind: TransactionKind,
}
