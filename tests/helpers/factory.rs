pub use super::factories::{ColumnFactory, ValuesFactory};

pub struct Factory;

impl Factory {
    pub fn values() -> ValuesFactory {
        ValuesFactory::new()
    }

    pub fn column() -> ColumnFactory {
        ColumnFactory::new()
    }
}
