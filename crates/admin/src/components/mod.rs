//! Reusable view components.

pub mod data_table;

pub use data_table::{
    DataTableConfig, payment_codes_table_config, payments_table_config, vendors_table_config,
};
